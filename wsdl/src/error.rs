use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to parse provided URL")]
    UrlParseError(#[from] url::ParseError),

    #[error("unable to convert provided path")]
    PathConversionError(Option<std::io::Error>),

    #[error("unable to open file")]
    FileOpenError(quick_xml::Error),

    #[error("unable to retrieve document from server")]
    RetrievalError(#[from] reqwest::Error),

    #[error("unsupported URL scheme {0}")]
    UnsupportedScheme(String),

    #[error("error parsing XML input")]
    XmlParseError(#[from] quick_xml::Error),

    #[error("<{element}> is missing its `{attribute}` attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("document has no <{0}> section")]
    MissingSection(&'static str),
}
