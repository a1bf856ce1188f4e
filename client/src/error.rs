use std::fmt;

use soapctl_wsdl::signature::SignatureError;
use thiserror::Error;

/// A structured error response from the remote service: a normal, expected
/// outcome of a call, distinct from any transport failure. Code and message
/// are reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    pub code: String,
    pub message: String,
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("operation `{0}` not found in any portType")]
    OperationNotFound(String),

    #[error("no service binding covers operation `{0}`")]
    EndpointNotFound(String),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("argument mismatch: {0}")]
    ArgumentMismatch(String),

    #[error("SOAP fault {0}")]
    Fault(SoapFault),

    #[error("unable to serialize request envelope")]
    Envelope(#[source] quick_xml::Error),

    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    ResponseParse(String),
}
