use structopt::StructOpt;
use thiserror::Error;
use tracing::{info, warn};

use soapctl_client as client;
use soapctl_wsdl as wsdl;

use client::{Client, Outcome, Value};

#[derive(Debug, Error)]
enum Error {
    #[error("error loading WSDL")]
    Parse(#[from] wsdl::error::Error),

    #[error("call failed")]
    Invoke(#[from] client::InvokeError),
}

/// Generic SOAP command-line client: list, inspect, and call the operations
/// a WSDL document describes.
#[derive(StructOpt)]
struct Args {
    /// Log progress details while executing
    #[structopt(short, long)]
    debug: bool,

    /// Path or URL of the WSDL document
    wsdl_source: String,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// List every operation the service exposes
    List,

    /// Show the resolved signature of one operation
    Inspect { operation: String },

    /// Invoke an operation
    Call {
        operation: String,

        /// `value` fills the next positional parameter; `key=value` fills a
        /// parameter by name; a value starting with `file:` is replaced by
        /// that file's contents before coercion
        arguments: Vec<String>,
    },
}

/// int → float → string, in that order. The core receives the result as an
/// already-typed value and never re-interprets it.
fn coerce(value: String) -> Value {
    if let Ok(int) = value.parse::<i64>() {
        return Value::Int(int);
    }

    if let Ok(float) = value.parse::<f64>() {
        return Value::Float(float);
    }

    Value::Str(value)
}

fn expand_file_value(value: String) -> String {
    let path = match value.strip_prefix("file:") {
        Some(path) => path.to_owned(),
        None => return value,
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            info!(path = path.as_str(), length = contents.len(), "read parameter from file");
            contents
        }

        Err(err) => {
            warn!(path = path.as_str(), %err, "unable to read parameter file; keeping literal value");
            value
        }
    }
}

fn split_arguments(raw: Vec<String>) -> (Vec<Value>, Vec<(String, Value)>) {
    let mut positional = Vec::new();
    let mut named = Vec::new();

    for argument in raw {
        match argument.split_once('=') {
            Some((name, value)) => {
                let name = name.to_owned();
                let value = value.to_owned();
                named.push((name, coerce(expand_file_value(value))));
            }

            None => positional.push(coerce(expand_file_value(argument))),
        }
    }

    (positional, named)
}

fn main() {
    let args = Args::from_args();

    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let level = if args.debug {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    match args.command {
        Command::List => match wsdl::parse(&args.wsdl_source) {
            Ok(document) => {
                for name in document.operations() {
                    println!("{}", name);
                }
            }

            Err(err) => eprintln!("failed to load WSDL: {}", err),
        },

        Command::Inspect { operation } => match wsdl::parse(&args.wsdl_source) {
            Ok(document) => match wsdl::signature::resolve(&document, &operation) {
                Ok(signature) => println!("{}", signature),
                Err(err) => println!("no signature for `{}`: {}", operation, err),
            },

            Err(err) => eprintln!("failed to load WSDL: {}", err),
        },

        Command::Call {
            operation,
            arguments,
        } => {
            let document = wsdl::parse(&args.wsdl_source)?;
            let (positional, named) = split_arguments(arguments);

            info!(operation = operation.as_str(), "sending SOAP request");

            let outcome = Client::new()?.invoke(&document, &operation, positional, named)?;

            match outcome {
                Outcome::Value(value) => println!("{}", value),

                Outcome::Record(fields) => {
                    for (name, value) in fields {
                        println!("{}: {}", name, value);
                    }
                }

                Outcome::Empty => println!("(no content)"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn coerces_integers_first() {
        assert_eq!(coerce("42".to_owned()), Value::Int(42));
        assert_eq!(coerce("-7".to_owned()), Value::Int(-7));
    }

    #[test]
    fn coerces_floats_second() {
        assert_eq!(coerce("3.5".to_owned()), Value::Float(3.5));
    }

    #[test]
    fn keeps_everything_else_a_string() {
        assert_eq!(coerce("4x".to_owned()), Value::Str("4x".to_owned()));
        assert_eq!(coerce("".to_owned()), Value::Str(String::new()));
    }

    #[test]
    fn splits_positional_and_named_arguments() {
        let (positional, named) = split_arguments(vec![
            "3".to_owned(),
            "unit=celsius".to_owned(),
            "hello world".to_owned(),
        ]);

        assert_eq!(
            positional,
            vec![Value::Int(3), Value::Str("hello world".to_owned())]
        );
        assert_eq!(
            named,
            vec![("unit".to_owned(), Value::Str("celsius".to_owned()))]
        );
    }

    #[test]
    fn named_values_keep_embedded_equals_signs() {
        let (_, named) = split_arguments(vec!["query=a=b".to_owned()]);

        assert_eq!(named, vec![("query".to_owned(), Value::Str("a=b".to_owned()))]);
    }

    #[test]
    fn file_prefixed_values_read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<payload/>").unwrap();

        let value = expand_file_value(format!("file:{}", file.path().display()));

        assert_eq!(value, "<payload/>");
    }

    #[test]
    fn missing_files_keep_the_literal_value() {
        let literal = "file:/no/such/file".to_owned();

        assert_eq!(expand_file_value(literal.clone()), literal);
    }
}
