//! WSDL document loading and interpretation.
//!
//! [`parse`] accepts a filesystem path or a URL, retrieves the document, and
//! builds a [`types::Document`]: the structured view of the service's schema
//! elements, messages, port types, bindings, and endpoint addresses that the
//! signature resolver and the SOAP invoker work from.

use std::path::Path;
use url::Url;

mod parser;

pub mod error;
pub mod registry;
pub mod signature;
pub mod types;

pub use types::Document;

/// Parses the WSDL document at `source`, which may be a local path or an
/// `http(s)`/`file` URL.
pub fn parse<S: AsRef<str>>(source: S) -> Result<types::Document, error::Error> {
    let url = {
        match Url::parse(source.as_ref()) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => to_file_url(source.as_ref())?,
            Err(err) => return Err(err.into()),
        }
    };

    parser::parse(url)
}

/// Parses a WSDL document already held in memory.
///
/// With no base URL, `wsdl:import`/`xsd:import` references with relative
/// locations cannot be fetched and are skipped with a warning.
pub fn parse_str(contents: &str) -> Result<types::Document, error::Error> {
    parser::parse_contents(contents)
}

fn to_file_url(source: &str) -> Result<Url, error::Error> {
    let path = Path::new(source)
        .canonicalize()
        .map_err(|err| error::Error::PathConversionError(Some(err)))?;

    Url::from_file_path(&path).map_err(|()| error::Error::PathConversionError(None))
}
