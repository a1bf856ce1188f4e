//! SOAP 1.1 envelope construction and response decoding.

use std::io::{BufRead, BufReader, Cursor, Read};

use quick_xml::{
    events::{BytesStart, BytesText, Event},
    Reader, Writer,
};
use thiserror::Error;

use soapctl_wsdl::types::QName;

use crate::value::Value;

pub const ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("error parsing response XML")]
    Xml(#[from] quick_xml::Error),

    #[error("response is not a SOAP envelope")]
    NotAnEnvelope,

    #[error("response envelope ended unexpectedly")]
    Truncated,
}

/// The interesting part of a decoded response: either a fault, or the
/// `(name, text)` children of the body's wrapper element.
#[derive(Debug, PartialEq, Eq)]
pub enum Payload {
    Fault { code: String, message: String },
    Body(Vec<(String, String)>),
}

/// Serializes a request envelope whose body element is `body_element`, with
/// one child per bound argument, in order.
pub fn build(body_element: &QName, fields: &[(String, Value)]) -> Result<Vec<u8>, quick_xml::Error> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    let envelope = BytesStart::owned_name("soapenv:Envelope").with_attributes([
        ("xmlns:soapenv", ENVELOPE_NAMESPACE),
        ("xmlns:tns", body_element.namespace.as_str()),
    ]);
    let body = BytesStart::owned_name("soapenv:Body");
    let operation = BytesStart::owned_name(format!("tns:{}", body_element.local));

    writer.write_event(Event::Start(envelope.to_borrowed()))?;
    writer.write_event(Event::Start(body.to_borrowed()))?;
    writer.write_event(Event::Start(operation.to_borrowed()))?;

    for (name, value) in fields {
        let field = BytesStart::owned_name(format!("tns:{}", name));
        let text = value.to_string();

        writer.write_event(Event::Start(field.to_borrowed()))?;
        writer.write_event(Event::Text(BytesText::from_plain_str(&text)))?;
        writer.write_event(Event::End(field.to_end()))?;
    }

    writer.write_event(Event::End(operation.to_end()))?;
    writer.write_event(Event::End(body.to_end()))?;
    writer.write_event(Event::End(envelope.to_end()))?;

    Ok(writer.into_inner().into_inner())
}

enum Token {
    Start(String),
    End,
    Text(String),
    Eof,
}

fn next_token<B: BufRead>(reader: &mut Reader<B>, buffer: &mut Vec<u8>) -> Result<Token, DecodeError> {
    loop {
        buffer.clear();

        match reader.read_event(buffer)? {
            Event::Start(start) => {
                let (_, local) = split_prefixed(reader.decode(start.name())?);
                return Ok(Token::Start(local.to_owned()));
            }

            Event::End(..) => return Ok(Token::End),

            Event::Text(text) => {
                let unescaped = text.unescaped()?;
                return Ok(Token::Text(reader.decode(unescaped.as_ref())?.to_owned()));
            }

            Event::CData(text) => return Ok(Token::Text(reader.decode(&text)?.to_owned())),

            Event::Eof => return Ok(Token::Eof),

            _ => (),
        }
    }
}

fn split_prefixed(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, prefixed_name),
    }
}

/// Consumes events until the element whose `Start` was just read is closed.
fn skip_subtree<B: BufRead>(reader: &mut Reader<B>, buffer: &mut Vec<u8>) -> Result<(), DecodeError> {
    let mut depth = 0usize;

    loop {
        match next_token(reader, buffer)? {
            Token::Start(_) => depth += 1,

            Token::End => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }

            Token::Text(_) => (),

            Token::Eof => return Err(DecodeError::Truncated),
        }
    }
}

/// Collects the flattened text content of the element whose `Start` was just
/// read, consuming through its `End`.
fn collect_text<B: BufRead>(
    reader: &mut Reader<B>,
    buffer: &mut Vec<u8>,
) -> Result<String, DecodeError> {
    let mut depth = 0usize;
    let mut text = String::new();

    loop {
        match next_token(reader, buffer)? {
            Token::Start(_) => depth += 1,

            Token::End => {
                if depth == 0 {
                    return Ok(text);
                }
                depth -= 1;
            }

            Token::Text(chunk) => text.push_str(&chunk),

            Token::Eof => return Err(DecodeError::Truncated),
        }
    }
}

/// Decodes a response stream into its [`Payload`]. Works by local names only:
/// response documents vary their prefixes freely.
pub fn decode<R: Read>(read: R) -> Result<Payload, DecodeError> {
    let mut reader = Reader::from_reader(BufReader::new(read));
    reader.trim_text(true);
    reader.expand_empty_elements(true);

    let mut buffer = Vec::new();

    match next_token(&mut reader, &mut buffer)? {
        Token::Start(name) if name == "Envelope" => (),
        _ => return Err(DecodeError::NotAnEnvelope),
    }

    // Find the Body among the envelope's children, skipping Header wholesale.
    loop {
        match next_token(&mut reader, &mut buffer)? {
            Token::Start(name) if name == "Body" => break,
            Token::Start(_) => skip_subtree(&mut reader, &mut buffer)?,
            Token::End => return Ok(Payload::Body(Vec::new())),
            Token::Text(_) => (),
            Token::Eof => return Err(DecodeError::Truncated),
        }
    }

    let wrapper = match next_token(&mut reader, &mut buffer)? {
        Token::Start(name) => name,
        Token::End => return Ok(Payload::Body(Vec::new())),
        Token::Text(_) | Token::Eof => return Err(DecodeError::Truncated),
    };

    if wrapper == "Fault" {
        return decode_fault(&mut reader, &mut buffer);
    }

    let mut children = Vec::new();

    loop {
        match next_token(&mut reader, &mut buffer)? {
            Token::Start(name) => {
                let text = collect_text(&mut reader, &mut buffer)?;
                children.push((name, text));
            }

            Token::End => break,

            // Text directly inside the wrapper: a bare scalar response.
            Token::Text(text) => children.push((wrapper.clone(), text)),

            Token::Eof => return Err(DecodeError::Truncated),
        }
    }

    Ok(Payload::Body(children))
}

/// Reads the rest of a `Fault` subtree. Understands both SOAP 1.1
/// (`faultcode`/`faultstring`) and SOAP 1.2 (`Code/Value`, `Reason/Text`)
/// shapes.
fn decode_fault<B: BufRead>(
    reader: &mut Reader<B>,
    buffer: &mut Vec<u8>,
) -> Result<Payload, DecodeError> {
    let mut code = None;
    let mut message = None;
    let mut path: Vec<String> = Vec::new();

    loop {
        match next_token(reader, buffer)? {
            Token::Start(name) => path.push(name),

            Token::Text(text) => {
                let leaf = path.last().map(String::as_str);
                let parent = path
                    .len()
                    .checked_sub(2)
                    .and_then(|index| path.get(index))
                    .map(String::as_str);

                match (parent, leaf) {
                    (_, Some("faultcode")) => code = Some(text),
                    (_, Some("faultstring")) => message = Some(text),
                    (Some("Code"), Some("Value")) => code = Some(text),
                    (Some("Reason"), Some("Text")) => message = Some(text),
                    _ => (),
                }
            }

            Token::End => {
                if path.pop().is_none() {
                    break;
                }
            }

            Token::Eof => return Err(DecodeError::Truncated),
        }
    }

    Ok(Payload::Fault {
        code: code.unwrap_or_default(),
        message: message.unwrap_or_default(),
    })
}
