//! Synchronous SOAP invocation against a parsed WSDL document.
//!
//! One [`Client::invoke`] call performs one blocking HTTP round-trip: the
//! operation's signature and endpoint are resolved from the document, the
//! supplied arguments are bound to parameters, a SOAP 1.1 envelope is
//! serialized and POSTed, and the response is decoded into an [`Outcome`] or
//! a distinct error. There is no retry logic: SOAP operations are not
//! assumed idempotent.

use std::time::Duration;

use bytes::Buf;
use tracing::debug;

use soapctl_wsdl::{
    signature::{self, MethodSignature},
    types::{Document, PartKind, QName},
};

pub mod envelope;
pub mod error;
pub mod value;

pub use error::{InvokeError, SoapFault};
pub use value::{Outcome, Value};

/// Timeout configuration for one call. Both bounds are injectable so a test
/// harness can exercise timeout behavior deterministically.
#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

pub struct Client {
    http: reqwest::blocking::Client,
}

impl Client {
    pub fn new() -> Result<Self, InvokeError> {
        Self::with_options(CallOptions::default())
    }

    pub fn with_options(options: CallOptions) -> Result<Self, InvokeError> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .build()?;

        Ok(Self { http })
    }

    /// Invokes `operation` with positional and/or named arguments. Each
    /// parameter must receive exactly one value; argument binding failures
    /// are reported before any network activity.
    pub fn invoke(
        &self,
        document: &Document,
        operation: &str,
        positional: Vec<Value>,
        named: Vec<(String, Value)>,
    ) -> Result<Outcome, InvokeError> {
        if document.find_operation(operation).is_none() {
            return Err(InvokeError::OperationNotFound(operation.to_owned()));
        }

        let signature = signature::resolve(document, operation)?;

        let endpoint = document
            .resolve_endpoint(operation)
            .ok_or_else(|| InvokeError::EndpointNotFound(operation.to_owned()))?;

        let bound = bind_arguments(&signature, positional, named)?;
        let body_element = input_element(document, operation);
        let request = envelope::build(&body_element, &bound).map_err(InvokeError::Envelope)?;

        debug!(
            operation,
            location = endpoint.location.as_str(),
            style = endpoint.style.as_str(),
            "sending SOAP request"
        );

        let mut builder = self
            .http
            .post(&endpoint.location)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(request);

        if let Some(action) = &endpoint.action {
            builder = builder.header("SOAPAction", format!("\"{}\"", action));
        }

        let response = builder.send()?;
        let status = response.status();

        let payload = envelope::decode(response.bytes()?.reader())
            .map_err(|err| InvokeError::ResponseParse(format!("{} (HTTP {})", err, status)))?;

        match payload {
            envelope::Payload::Fault { code, message } => {
                Err(InvokeError::Fault(SoapFault { code, message }))
            }

            envelope::Payload::Body(children) => {
                if !status.is_success() {
                    return Err(InvokeError::ResponseParse(format!(
                        "HTTP {} without a fault body",
                        status
                    )));
                }

                Ok(decode_outcome(children, signature.returns.as_deref()))
            }
        }
    }
}

/// The element the request body is built around: the input message's
/// referenced element for document-style operations, or the operation name
/// in the target namespace for rpc-style typed parts.
fn input_element(document: &Document, operation: &str) -> QName {
    document
        .find_operation(operation)
        .and_then(|found| found.input.as_ref())
        .and_then(|input| document.find_message(input))
        .and_then(|message| message.parts.first())
        .and_then(|part| match &part.kind {
            PartKind::Element(name) => Some(name.clone()),
            PartKind::Type(_) => None,
        })
        .unwrap_or_else(|| QName::new(document.target_namespace.clone(), operation))
}

fn bind_arguments(
    signature: &MethodSignature,
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
) -> Result<Vec<(String, Value)>, InvokeError> {
    let params = &signature.params;

    if positional.len() > params.len() {
        return Err(InvokeError::ArgumentMismatch(format!(
            "{} positional arguments supplied, but `{}` takes {}",
            positional.len(),
            signature.operation,
            params.len()
        )));
    }

    let mut slots: Vec<Option<Value>> = params.iter().map(|_| None).collect();

    for (index, value) in positional.into_iter().enumerate() {
        slots[index] = Some(value);
    }

    for (name, value) in named {
        let index = params
            .iter()
            .position(|parameter| parameter.name == name)
            .ok_or_else(|| {
                InvokeError::ArgumentMismatch(format!(
                    "`{}` has no parameter named `{}`",
                    signature.operation, name
                ))
            })?;

        if slots[index].is_some() {
            return Err(InvokeError::ArgumentMismatch(format!(
                "parameter `{}` received more than one value",
                name
            )));
        }

        slots[index] = Some(value);
    }

    params
        .iter()
        .zip(slots)
        .map(|(parameter, slot)| {
            slot.map(|value| (parameter.name.clone(), value)).ok_or_else(|| {
                InvokeError::ArgumentMismatch(format!(
                    "missing value for parameter `{}`",
                    parameter.name
                ))
            })
        })
        .collect()
}

fn decode_outcome(mut children: Vec<(String, String)>, returns: Option<&str>) -> Outcome {
    match children.len() {
        0 => Outcome::Empty,

        1 => {
            let (_, text) = children.remove(0);
            Outcome::Value(Value::from_xsd(returns.unwrap_or("string"), &text))
        }

        _ => Outcome::Record(
            children
                .into_iter()
                .map(|(name, text)| {
                    let value = Value::from_xsd("string", &text);
                    (name, value)
                })
                .collect(),
        ),
    }
}
