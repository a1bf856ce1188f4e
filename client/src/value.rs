//! Already-typed scalar values and decoded call outcomes.
//!
//! The invoker consumes values the caller has finished typing; it never
//! re-interprets strings. Response text is coerced by the signature's
//! declared XSD type, falling back to a string when the text does not parse.

use std::fmt;

use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Coerces response text by its declared XSD type name.
    pub fn from_xsd(ty: &str, text: &str) -> Value {
        match ty {
            "int" | "long" | "short" | "byte" | "integer" | "unsignedInt" | "unsignedLong"
            | "unsignedShort" | "unsignedByte" => match text.trim().parse() {
                Ok(value) => Value::Int(value),
                Err(_) => {
                    warn!(ty, text, "response text is not a valid integer; keeping string");
                    Value::Str(text.to_owned())
                }
            },

            "float" | "double" | "decimal" => match text.trim().parse() {
                Ok(value) => Value::Float(value),
                Err(_) => {
                    warn!(ty, text, "response text is not a valid number; keeping string");
                    Value::Str(text.to_owned())
                }
            },

            "boolean" => match text.trim() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                other => {
                    warn!(ty, text = other, "response text is not a valid boolean; keeping string");
                    Value::Str(text.to_owned())
                }
            },

            _ => Value::Str(text.to_owned()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// A decoded, successful call result. `Empty` is success without data —
/// deliberately a different shape from every error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(Value),
    Record(Vec<(String, Value)>),
    Empty,
}
