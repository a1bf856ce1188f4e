use quick_xml::{
    events::{attributes::Attributes, BytesStart, BytesText, Event},
    Reader,
};
use std::{
    collections::HashMap,
    io::{BufRead, BufReader},
    time::Duration,
};
use tracing::{debug, trace, warn};
use url::Url;

use super::{
    error,
    types::{
        Binding, BindingOperation, Document, ElementKind, Message, Operation, Part, PartKind,
        Port, PortType, PrefixSource, QName, SchemaElement, SchemaField, Service,
    },
};

/// Installed when the WSDL root declares no `xmlns` prefixes at all. This is
/// a best-effort guess at the conventional URIs; documents using other URIs
/// will resolve through the local-name fallback instead.
const FALLBACK_PREFIXES: [(&str, &str); 4] = [
    ("wsdl", "http://schemas.xmlsoap.org/wsdl/"),
    ("soap", "http://schemas.xmlsoap.org/wsdl/soap/"),
    ("s", "http://www.w3.org/2001/XMLSchema"),
    ("xsd", "http://www.w3.org/2001/XMLSchema"),
];

const DEFAULT_TARGET_NAMESPACE: &str = "http://tempuri.org/";

fn get_attributes<B: BufRead, const N: usize>(
    reader: &Reader<B>,
    attributes: Attributes<'_>,
    names: [&'static str; N],
) -> Result<[Option<String>; N], error::Error> {
    const INIT: Option<String> = None;
    let mut result = [INIT; N];

    for attribute in attributes {
        let attribute = attribute?;
        let key = reader.decode(attribute.key)?;

        for (index, name) in names.iter().enumerate() {
            if key == *name {
                result[index] = Some(reader.decode(attribute.value.as_ref())?.to_owned());
                break;
            }
        }
    }

    Ok(result)
}

fn split_prefixed(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, prefixed_name),
    }
}

struct Parser {
    base: Option<Url>,

    document: Document,
    prefixes: HashMap<Option<String>, String>,
    target_stack: Vec<String>,
    seen_definitions: bool,
}

#[derive(Debug)]
enum ParseState {
    Definitions,

    Types,
    Schema,
    Element {
        name: String,
        kind: Option<ElementKind>,
    },
    ComplexType {
        name: Option<String>,
        fields: Option<Vec<SchemaField>>,
    },
    Sequence(Vec<SchemaField>),
    SequenceElement {
        name: String,
        ty: Option<QName>,
    },
    SimpleType {
        name: String,
        base: Option<QName>,
    },
    Restriction {
        base: QName,
    },

    Message {
        name: String,
        parts: Vec<Part>,
    },
    Part {
        part: Part,
    },

    PortType {
        name: String,
        operations: Vec<Operation>,
    },
    Operation {
        name: String,
        documentation: Option<String>,
        input: Option<QName>,
        output: Option<QName>,
        faults: Vec<QName>,
    },
    Documentation(Option<String>),
    Input {
        message: QName,
    },
    Output {
        message: QName,
    },
    Fault {
        message: QName,
    },

    Binding {
        name: String,
        port_type: QName,
        transport: Option<String>,
        style: Option<String>,
        operations: Vec<BindingOperation>,
    },
    SoapBinding {
        transport: Option<String>,
        style: Option<String>,
    },
    BindingOperation {
        name: String,
        action: Option<String>,
        style: Option<String>,
    },
    SoapOperation {
        action: Option<String>,
        style: Option<String>,
    },

    Service {
        name: String,
        ports: Vec<Port>,
    },
    Port {
        name: String,
        binding: QName,
        location: Option<String>,
    },
    Address {
        location: String,
    },

    Import,

    Other(String),
}

impl Parser {
    fn new(base: Option<Url>) -> Self {
        Self {
            base,

            document: Document {
                target_namespace: String::new(),
                prefix_source: PrefixSource::Declared,
                elements: Vec::new(),
                messages: Vec::new(),
                port_types: Vec::new(),
                bindings: Vec::new(),
                services: Vec::new(),
            },
            prefixes: HashMap::new(),
            target_stack: Vec::new(),
            seen_definitions: false,
        }
    }

    fn finish(self) -> Result<Document, error::Error> {
        if !self.seen_definitions {
            return Err(error::Error::MissingSection("definitions"));
        }

        Ok(self.document)
    }

    fn current_target(&self) -> String {
        self.target_stack
            .last()
            .cloned()
            .unwrap_or_else(|| DEFAULT_TARGET_NAMESPACE.to_owned())
    }

    fn target_qname(&self, name: String) -> QName {
        QName::new(self.current_target(), name)
    }

    fn declare_prefix(&mut self, prefix: Option<String>, namespace: &str) {
        self.prefixes.insert(prefix, namespace.to_owned());
    }

    fn install_fallback_prefixes(&mut self) {
        warn!("WSDL root declares no namespace prefixes; assuming the default WSDL/SOAP/XSD set");

        for (prefix, namespace) in FALLBACK_PREFIXES {
            self.declare_prefix(Some(prefix.to_owned()), namespace);
        }

        self.document.prefix_source = PrefixSource::FallbackDefaults;
    }

    fn resolve_qname(&self, prefixed_name: &str) -> QName {
        let (prefix, local) = split_prefixed(prefixed_name);

        match prefix {
            Some("tns") => QName::new(self.current_target(), local),

            Some(prefix) => match self.prefixes.get(&Some(prefix.to_owned())) {
                Some(namespace) => QName::new(namespace.clone(), local),
                None => {
                    warn!(
                        name = prefixed_name,
                        "unknown namespace prefix; matching by local name only"
                    );
                    QName::new("", local)
                }
            },

            None => match self.prefixes.get(&None) {
                Some(namespace) => QName::new(namespace.clone(), local),
                None => QName::new("", local),
            },
        }
    }

    fn parse_location(&mut self, url: &Url) -> Result<(), error::Error> {
        debug!(%url, "retrieving WSDL source");

        match url.scheme() {
            "file" => self.parse_xml(
                Reader::from_file(
                    url.to_file_path()
                        .map_err(|()| error::Error::PathConversionError(None))?,
                )
                .map_err(error::Error::FileOpenError)?,
            ),

            "http" | "https" => {
                let client = reqwest::blocking::Client::builder()
                    .connect_timeout(Duration::from_secs(10))
                    .timeout(Duration::from_secs(60))
                    .build()?;

                let response = client.get(url.clone()).send()?;
                self.parse_xml(Reader::from_reader(BufReader::new(response)))
            }

            other => Err(error::Error::UnsupportedScheme(other.into())),
        }
    }

    fn parse_import(&mut self, location: &str) -> Result<(), error::Error> {
        match self.base.clone() {
            Some(base) => {
                let url = base.join(location)?;
                self.parse_location(&url)
            }

            None => {
                warn!(location, "cannot resolve import without a base URL; skipping");
                Ok(())
            }
        }
    }

    fn parse_xml<B: BufRead>(&mut self, mut reader: Reader<B>) -> Result<(), error::Error> {
        reader.trim_text(true);

        let mut stack = Vec::new();
        let mut buffer = Vec::new();

        loop {
            match reader.read_event(&mut buffer)? {
                Event::Decl(..) => (),

                Event::Start(start) => self.handle_start(&mut stack, &reader, start)?,
                Event::End(..) => self.handle_end(&mut stack),

                Event::Empty(start) => {
                    self.handle_start(&mut stack, &reader, start)?;
                    self.handle_end(&mut stack);
                }

                Event::Text(text) => self.handle_text(&mut stack, &reader, text)?,

                Event::Eof => break,

                event => trace!(?event, "skipping event"),
            }

            buffer.clear();
        }

        Ok(())
    }

    fn handle_start<B: BufRead>(
        &mut self,
        stack: &mut Vec<ParseState>,
        reader: &Reader<B>,
        start: BytesStart<'_>,
    ) -> Result<(), error::Error> {
        let (_prefix, local_name) = split_prefixed(reader.decode(start.name())?);

        let mut declared = 0usize;
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = reader.decode(attribute.key)?;
            let (prefix, value) = split_prefixed(key);

            if prefix == Some("xmlns") {
                self.declare_prefix(
                    Some(value.to_owned()),
                    reader.decode(attribute.value.as_ref())?,
                );
                declared += 1;
            } else if prefix.is_none() && value == "xmlns" {
                self.declare_prefix(None, reader.decode(attribute.value.as_ref())?);
                declared += 1;
            }
        }

        let state = stack.pop();
        let mut new_state = Some(ParseState::Other(local_name.to_owned()));

        match state {
            None => {
                if local_name == "definitions" {
                    let [target] =
                        get_attributes(reader, start.attributes(), ["targetNamespace"])?;

                    if !self.seen_definitions && declared == 0 && self.prefixes.is_empty() {
                        self.install_fallback_prefixes();
                    }

                    let target = target.unwrap_or_else(|| {
                        warn!("definitions element has no targetNamespace; using placeholder");
                        DEFAULT_TARGET_NAMESPACE.to_owned()
                    });

                    if self.document.target_namespace.is_empty() {
                        self.document.target_namespace = target.clone();
                    }

                    self.seen_definitions = true;
                    self.target_stack.push(target);

                    new_state = Some(ParseState::Definitions)
                }
            }

            Some(ParseState::Definitions) => match local_name {
                "import" => {
                    let [location] = get_attributes(reader, start.attributes(), ["location"])?;

                    if let Some(location) = location {
                        self.parse_import(&location)?;
                    }

                    new_state = Some(ParseState::Import);
                }

                "types" => new_state = Some(ParseState::Types),

                "message" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "message",
                        attribute: "name",
                    })?;

                    new_state = Some(ParseState::Message {
                        name,
                        parts: Vec::new(),
                    });
                }

                "portType" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "portType",
                        attribute: "name",
                    })?;

                    new_state = Some(ParseState::PortType {
                        name,
                        operations: Vec::new(),
                    });
                }

                "binding" => {
                    let [name, ty] = get_attributes(reader, start.attributes(), ["name", "type"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "binding",
                        attribute: "name",
                    })?;

                    let port_type = ty
                        .map(|ty| self.resolve_qname(&ty))
                        .ok_or(error::Error::MissingAttribute {
                            element: "binding",
                            attribute: "type",
                        })?;

                    new_state = Some(ParseState::Binding {
                        name,
                        port_type,
                        transport: None,
                        style: None,
                        operations: Vec::new(),
                    });
                }

                "service" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "service",
                        attribute: "name",
                    })?;

                    new_state = Some(ParseState::Service {
                        name,
                        ports: Vec::new(),
                    });
                }

                _ => trace!(element = local_name, "skipping element in definitions"),
            },

            Some(ParseState::Types) => match local_name {
                "schema" => {
                    let [target] =
                        get_attributes(reader, start.attributes(), ["targetNamespace"])?;

                    let target = target.unwrap_or_else(|| self.current_target());
                    self.target_stack.push(target);

                    new_state = Some(ParseState::Schema)
                }

                "import" => {
                    let [location] =
                        get_attributes(reader, start.attributes(), ["schemaLocation"])?;

                    if let Some(location) = location {
                        self.parse_import(&location)?;
                    }

                    new_state = Some(ParseState::Import);
                }

                _ => trace!(element = local_name, "skipping element in types"),
            },

            Some(ParseState::Schema) => match local_name {
                "element" => {
                    let [name, ty] = get_attributes(reader, start.attributes(), ["name", "type"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "element",
                        attribute: "name",
                    })?;

                    let kind = ty.map(|ty| ElementKind::Simple(self.resolve_qname(&ty)));

                    new_state = Some(ParseState::Element { name, kind })
                }

                "complexType" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    new_state = Some(ParseState::ComplexType { name, fields: None });
                }

                "simpleType" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "simpleType",
                        attribute: "name",
                    })?;

                    new_state = Some(ParseState::SimpleType { name, base: None })
                }

                "include" | "import" => {
                    let [location] =
                        get_attributes(reader, start.attributes(), ["schemaLocation"])?;

                    if let Some(location) = location {
                        self.parse_import(&location)?;
                    }

                    new_state = Some(ParseState::Import);
                }

                _ => trace!(element = local_name, "skipping element in schema"),
            },

            Some(ParseState::Element { .. }) => match local_name {
                "complexType" => {
                    new_state = Some(ParseState::ComplexType {
                        name: None,
                        fields: None,
                    })
                }

                _ => trace!(element = local_name, "skipping element in element declaration"),
            },

            Some(ParseState::ComplexType { .. }) => match local_name {
                "sequence" | "all" => new_state = Some(ParseState::Sequence(Vec::new())),

                _ => trace!(element = local_name, "skipping element in complexType"),
            },

            Some(ParseState::Sequence(_)) => match local_name {
                "element" => {
                    let [name, ty] = get_attributes(reader, start.attributes(), ["name", "type"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "element",
                        attribute: "name",
                    })?;

                    let ty = ty.map(|ty| self.resolve_qname(&ty));

                    new_state = Some(ParseState::SequenceElement { name, ty });
                }

                _ => trace!(element = local_name, "skipping element in sequence"),
            },

            Some(ParseState::SequenceElement { .. }) => {
                // Inline nested types are outside the flat subset this tool
                // interprets; the field keeps an anyType placeholder.
                trace!(element = local_name, "ignoring inline content of sequence element")
            }

            Some(ParseState::SimpleType { .. }) => match local_name {
                "restriction" => {
                    let [base] = get_attributes(reader, start.attributes(), ["base"])?;

                    let base = base
                        .map(|base| self.resolve_qname(&base))
                        .ok_or(error::Error::MissingAttribute {
                            element: "restriction",
                            attribute: "base",
                        })?;

                    new_state = Some(ParseState::Restriction { base });
                }

                _ => trace!(element = local_name, "skipping element in simpleType"),
            },

            Some(ParseState::Restriction { .. }) => {
                trace!(element = local_name, "skipping element in restriction")
            }

            Some(ParseState::Message { .. }) => match local_name {
                "part" => {
                    let [name, element, ty] =
                        get_attributes(reader, start.attributes(), ["name", "element", "type"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "part",
                        attribute: "name",
                    })?;

                    let kind = if let Some(element) = element {
                        PartKind::Element(self.resolve_qname(&element))
                    } else if let Some(ty) = ty {
                        PartKind::Type(self.resolve_qname(&ty))
                    } else {
                        return Err(error::Error::MissingAttribute {
                            element: "part",
                            attribute: "element",
                        });
                    };

                    new_state = Some(ParseState::Part {
                        part: Part { name, kind },
                    });
                }

                _ => trace!(element = local_name, "skipping element in message"),
            },

            Some(ParseState::Part { .. }) => {
                trace!(element = local_name, "skipping element in part")
            }

            Some(ParseState::PortType { .. }) => match local_name {
                "operation" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "operation",
                        attribute: "name",
                    })?;

                    new_state = Some(ParseState::Operation {
                        name,
                        documentation: None,
                        input: None,
                        output: None,
                        faults: Vec::new(),
                    })
                }

                _ => trace!(element = local_name, "skipping element in portType"),
            },

            Some(ParseState::Operation { .. }) => match local_name {
                "documentation" => new_state = Some(ParseState::Documentation(None)),

                "input" | "output" | "fault" => {
                    let element = match local_name {
                        "input" => "input",
                        "output" => "output",
                        _ => "fault",
                    };

                    let [message] = get_attributes(reader, start.attributes(), ["message"])?;

                    let message = message
                        .map(|message| self.resolve_qname(&message))
                        .ok_or(error::Error::MissingAttribute {
                            element,
                            attribute: "message",
                        })?;

                    new_state = Some(match local_name {
                        "input" => ParseState::Input { message },
                        "output" => ParseState::Output { message },
                        _ => ParseState::Fault { message },
                    })
                }

                _ => trace!(element = local_name, "skipping element in operation"),
            },

            Some(ParseState::Documentation(_)) => {
                trace!(element = local_name, "skipping element in documentation")
            }

            Some(ParseState::Input { .. } | ParseState::Output { .. } | ParseState::Fault { .. }) => {
                trace!(element = local_name, "skipping element in operation message")
            }

            Some(ParseState::Binding { .. }) => match local_name {
                "binding" => {
                    let [transport, style] =
                        get_attributes(reader, start.attributes(), ["transport", "style"])?;

                    new_state = Some(ParseState::SoapBinding { transport, style })
                }

                "operation" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "operation",
                        attribute: "name",
                    })?;

                    new_state = Some(ParseState::BindingOperation {
                        name,
                        action: None,
                        style: None,
                    })
                }

                _ => trace!(element = local_name, "skipping element in binding"),
            },

            Some(ParseState::SoapBinding { .. }) => {
                trace!(element = local_name, "skipping element in soap binding")
            }

            Some(ParseState::BindingOperation { .. }) => match local_name {
                "operation" => {
                    let [action, style] =
                        get_attributes(reader, start.attributes(), ["soapAction", "style"])?;

                    new_state = Some(ParseState::SoapOperation { action, style });
                }

                _ => trace!(element = local_name, "skipping element in binding operation"),
            },

            Some(ParseState::SoapOperation { .. }) => {
                trace!(element = local_name, "skipping element in soap operation")
            }

            Some(ParseState::Service { .. }) => match local_name {
                "port" => {
                    let [name, binding] =
                        get_attributes(reader, start.attributes(), ["name", "binding"])?;

                    let name = name.ok_or(error::Error::MissingAttribute {
                        element: "port",
                        attribute: "name",
                    })?;

                    let binding = binding
                        .map(|binding| self.resolve_qname(&binding))
                        .ok_or(error::Error::MissingAttribute {
                            element: "port",
                            attribute: "binding",
                        })?;

                    new_state = Some(ParseState::Port {
                        name,
                        binding,
                        location: None,
                    });
                }

                _ => trace!(element = local_name, "skipping element in service"),
            },

            Some(ParseState::Port { .. }) => match local_name {
                "address" => {
                    let [location] = get_attributes(reader, start.attributes(), ["location"])?;

                    let location = location.ok_or(error::Error::MissingAttribute {
                        element: "address",
                        attribute: "location",
                    })?;

                    new_state = Some(ParseState::Address { location })
                }

                _ => trace!(element = local_name, "skipping element in port"),
            },

            Some(ParseState::Address { .. }) => {
                trace!(element = local_name, "skipping element in address")
            }

            Some(ParseState::Import) => {
                trace!(element = local_name, "skipping element in import")
            }

            Some(ParseState::Other(ref parent)) => {
                trace!(element = local_name, parent = parent.as_str(), "skipping element")
            }
        }

        stack.extend(state);
        stack.extend(new_state);

        Ok(())
    }

    fn handle_end(&mut self, stack: &mut Vec<ParseState>) {
        let finished = stack.pop();
        let mut parent = stack.pop();

        match finished {
            Some(ParseState::Definitions | ParseState::Schema) => {
                self.target_stack.pop();
            }

            Some(ParseState::Element { name, kind }) => match kind {
                Some(kind) => {
                    let name = self.target_qname(name);
                    self.document.elements.push(SchemaElement { name, kind });
                }

                None => warn!(element = name.as_str(), "element declaration has no usable type"),
            },

            Some(ParseState::ComplexType { name, fields }) => {
                let kind = ElementKind::Complex(fields.unwrap_or_default());

                match (name, &mut parent) {
                    (_, Some(ParseState::Element { kind: el_kind, .. })) => {
                        *el_kind = Some(kind);
                    }

                    (Some(name), _) => {
                        let name = self.target_qname(name);
                        self.document.elements.push(SchemaElement { name, kind });
                    }

                    (None, _) => warn!("discarding anonymous complexType outside an element"),
                }
            }

            Some(ParseState::Sequence(fields)) => match &mut parent {
                Some(ParseState::ComplexType {
                    fields: ct_fields, ..
                }) => *ct_fields = Some(fields),

                _ => warn!("discarding sequence outside a complexType"),
            },

            Some(ParseState::SequenceElement { name, ty }) => match &mut parent {
                Some(ParseState::Sequence(fields)) => fields.push(SchemaField {
                    name,
                    ty: ty.unwrap_or_else(|| QName::new("", "anyType")),
                }),

                _ => warn!("discarding sequence element outside a sequence"),
            },

            Some(ParseState::SimpleType { name, base }) => match base {
                Some(base) => {
                    let name = self.target_qname(name);
                    self.document.elements.push(SchemaElement {
                        name,
                        kind: ElementKind::Simple(base),
                    });
                }

                None => warn!(element = name.as_str(), "simpleType has no restriction base"),
            },

            Some(ParseState::Restriction { base }) => match &mut parent {
                Some(ParseState::SimpleType { base: st_base, .. }) => *st_base = Some(base),
                _ => warn!("discarding restriction outside a simpleType"),
            },

            Some(ParseState::Message { name, parts }) => {
                let name = self.target_qname(name);
                self.document.messages.push(Message { name, parts });
            }

            Some(ParseState::Part { part }) => match &mut parent {
                Some(ParseState::Message { parts, .. }) => parts.push(part),
                _ => warn!("discarding part outside a message"),
            },

            Some(ParseState::PortType { name, operations }) => {
                let name = self.target_qname(name);
                self.document.port_types.push(PortType { name, operations });
            }

            Some(ParseState::Operation {
                name,
                documentation,
                input,
                output,
                faults,
            }) => match &mut parent {
                Some(ParseState::PortType { operations, .. }) => operations.push(Operation {
                    name,
                    documentation,
                    input,
                    output,
                    faults,
                }),

                _ => warn!("discarding operation outside a portType"),
            },

            Some(ParseState::Documentation(text)) => {
                if let Some(ParseState::Operation { documentation, .. }) = &mut parent {
                    *documentation = text;
                }
            }

            Some(ParseState::Input { message }) => match &mut parent {
                Some(ParseState::Operation { input, .. }) if input.is_none() => {
                    *input = Some(message)
                }
                _ => warn!("discarding duplicate or misplaced operation input"),
            },

            Some(ParseState::Output { message }) => match &mut parent {
                Some(ParseState::Operation { output, .. }) if output.is_none() => {
                    *output = Some(message)
                }
                _ => warn!("discarding duplicate or misplaced operation output"),
            },

            Some(ParseState::Fault { message }) => match &mut parent {
                Some(ParseState::Operation { faults, .. }) => faults.push(message),
                _ => warn!("discarding fault outside an operation"),
            },

            Some(ParseState::SoapBinding { transport, style }) => match &mut parent {
                Some(ParseState::Binding {
                    transport: b_transport,
                    style: b_style,
                    ..
                }) => {
                    *b_transport = transport;
                    *b_style = style;
                }

                _ => warn!("discarding soap binding outside a binding"),
            },

            Some(ParseState::Binding {
                name,
                port_type,
                transport,
                style,
                operations,
            }) => {
                let name = self.target_qname(name);
                self.document.bindings.push(Binding {
                    name,
                    port_type,
                    transport,
                    style,
                    operations,
                });
            }

            Some(ParseState::SoapOperation { action, style }) => match &mut parent {
                Some(ParseState::BindingOperation {
                    action: op_action,
                    style: op_style,
                    ..
                }) => {
                    *op_action = action;
                    *op_style = style;
                }

                _ => warn!("discarding soap operation outside a binding operation"),
            },

            Some(ParseState::BindingOperation {
                name,
                action,
                style,
            }) => match &mut parent {
                Some(ParseState::Binding { operations, .. }) => {
                    operations.push(BindingOperation {
                        name,
                        action,
                        style,
                    })
                }

                _ => warn!("discarding operation outside a binding"),
            },

            Some(ParseState::Service { name, ports }) => {
                self.document.services.push(Service { name, ports });
            }

            Some(ParseState::Port {
                name,
                binding,
                location,
            }) => match (location, &mut parent) {
                (Some(location), Some(ParseState::Service { ports, .. })) => ports.push(Port {
                    name,
                    binding,
                    location,
                }),

                _ => warn!(port = name.as_str(), "discarding port without an address"),
            },

            Some(ParseState::Address { location }) => match &mut parent {
                Some(ParseState::Port {
                    location: port_location,
                    ..
                }) => *port_location = Some(location),

                _ => warn!("discarding address outside a port"),
            },

            _ => (),
        }

        stack.extend(parent);
    }

    fn handle_text<B: BufRead>(
        &mut self,
        stack: &mut Vec<ParseState>,
        reader: &Reader<B>,
        text: BytesText<'_>,
    ) -> Result<(), error::Error> {
        let unescaped = text.unescaped()?;
        let text = reader.decode(unescaped.as_ref())?;
        let mut state = stack.pop();

        if let Some(ParseState::Documentation(docs)) = &mut state {
            *docs = Some(text.to_owned());
        }

        stack.extend(state);
        Ok(())
    }
}

pub fn parse(url: Url) -> Result<Document, error::Error> {
    let mut parser = Parser::new(Some(url.clone()));
    parser.parse_location(&url)?;
    parser.finish()
}

pub fn parse_contents(contents: &str) -> Result<Document, error::Error> {
    let mut parser = Parser::new(None);
    parser.parse_xml(Reader::from_reader(contents.as_bytes()))?;
    parser.finish()
}
