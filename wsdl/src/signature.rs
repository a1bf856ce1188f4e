//! Derives a callable signature by walking operation → message → part →
//! schema element.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::{
    registry::ElementIndex,
    types::{Document, ElementKind, Message, PartKind, QName},
};

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("operation `{0}` not found in any portType")]
    OperationNotFound(String),

    #[error("message {0} not found")]
    MessageNotFound(QName),

    #[error("schema element {0} not found")]
    ElementNotFound(QName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

/// Ephemeral, derived view of one operation: parameter names and local type
/// names in declaration order, plus the return type. `returns` of `None`
/// renders as the literal `none` so front ends can print signatures for
/// one-way operations without a special case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub operation: String,
    pub params: Vec<Parameter>,
    pub returns: Option<String>,
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operation)?;

        for (index, parameter) in self.params.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{}: {}", parameter.name, parameter.ty)?;
        }

        write!(f, ") -> {}", self.returns.as_deref().unwrap_or("none"))
    }
}

/// Resolves the signature of `operation`, failing fast on the input side
/// (`OperationNotFound`, `MessageNotFound`, `ElementNotFound`). The output
/// side degrades to a `None` return type instead of failing: WSDL documents
/// in the wild frequently omit or mangle their response declarations.
pub fn resolve(document: &Document, operation: &str) -> Result<MethodSignature, SignatureError> {
    let found = document
        .find_operation(operation)
        .ok_or_else(|| SignatureError::OperationNotFound(operation.to_owned()))?;

    let index = ElementIndex::new(document);

    let params = match &found.input {
        Some(input) => {
            let message = document
                .find_message(input)
                .ok_or_else(|| SignatureError::MessageNotFound(input.clone()))?;

            input_parameters(&index, message)?
        }

        None => Vec::new(),
    };

    let returns = found
        .output
        .as_ref()
        .and_then(|output| return_type(document, &index, output));

    Ok(MethodSignature {
        operation: operation.to_owned(),
        params,
        returns,
    })
}

fn input_parameters(
    index: &ElementIndex<'_>,
    message: &Message,
) -> Result<Vec<Parameter>, SignatureError> {
    let part = match message.parts.first() {
        Some(part) => part,
        None => return Ok(Vec::new()),
    };

    match &part.kind {
        PartKind::Element(name) => {
            let element = index
                .resolve(name)
                .ok_or_else(|| SignatureError::ElementNotFound(name.clone()))?;

            Ok(match &element.kind {
                ElementKind::Complex(fields) => fields
                    .iter()
                    .map(|field| Parameter {
                        name: field.name.clone(),
                        ty: field.ty.local.clone(),
                    })
                    .collect(),

                // An element aliasing a simple type wraps no named
                // parameters.
                ElementKind::Simple(_) => Vec::new(),
            })
        }

        // rpc-style message: every typed part is one parameter.
        PartKind::Type(_) => Ok(message
            .parts
            .iter()
            .map(|part| Parameter {
                name: part.name.clone(),
                ty: match &part.kind {
                    PartKind::Type(ty) => ty.local.clone(),
                    PartKind::Element(element) => element.local.clone(),
                },
            })
            .collect()),
    }
}

fn return_type(document: &Document, index: &ElementIndex<'_>, output: &QName) -> Option<String> {
    let message = match document.find_message(output) {
        Some(message) => message,
        None => {
            debug!(%output, "output message not found; reporting no return type");
            return None;
        }
    };

    let part = message.parts.first()?;

    match &part.kind {
        PartKind::Type(ty) => Some(ty.local.clone()),

        PartKind::Element(name) => {
            let element = match index.resolve(name) {
                Some(element) => element,
                None => {
                    debug!(element = %name, "output element not found; reporting no return type");
                    return None;
                }
            };

            match &element.kind {
                ElementKind::Simple(ty) => Some(ty.local.clone()),

                // The conventional `*Result` wrapper: the return type is the
                // first sequence child's type.
                ElementKind::Complex(fields) => fields.first().map(|field| field.ty.local.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter(name: &str, ty: &str) -> Parameter {
        Parameter {
            name: name.to_owned(),
            ty: ty.to_owned(),
        }
    }

    #[test]
    fn renders_parameters_and_return_type() {
        let signature = MethodSignature {
            operation: "GetReading".to_owned(),
            params: vec![parameter("station", "int"), parameter("unit", "string")],
            returns: Some("double".to_owned()),
        };

        assert_eq!(
            signature.to_string(),
            "GetReading(station: int, unit: string) -> double"
        );
    }

    #[test]
    fn renders_missing_return_type_as_none() {
        let signature = MethodSignature {
            operation: "Reset".to_owned(),
            params: Vec::new(),
            returns: None,
        };

        assert_eq!(signature.to_string(), "Reset() -> none");
    }

    #[test]
    fn renders_single_parameter_without_separator() {
        let signature = MethodSignature {
            operation: "Echo".to_owned(),
            params: vec![parameter("x", "string")],
            returns: Some("string".to_owned()),
        };

        assert_eq!(signature.to_string(), "Echo(x: string) -> string");
    }
}
