//! The parsed document model.
//!
//! Every name that crosses a WSDL indirection (part → element, operation →
//! message, port → binding) is stored as a [`QName`] with its namespace URI
//! already resolved, so lookups never re-interpret prefixes.

use std::fmt;

/// A namespace-qualified name. An empty `namespace` means the reference was
/// unqualified (or its prefix could not be resolved).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: String,
    pub local: String,
}

impl QName {
    pub fn new<N: Into<String>, L: Into<String>>(namespace: N, local: L) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Lenient equality: exact match, or a local-name match when either side
    /// carries no namespace.
    pub fn matches(&self, other: &QName) -> bool {
        if self.local != other.local {
            return false;
        }

        self.namespace == other.namespace
            || self.namespace.is_empty()
            || other.namespace.is_empty()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// Whether the prefix→URI map came from `xmlns` declarations on the WSDL
/// root, or from the built-in default set installed when the root declared
/// none. The fallback is a best-effort heuristic: it assumes the standard
/// WSDL/SOAP/XML-Schema URIs and a `http://tempuri.org/` target namespace,
/// and may mis-resolve documents using non-default URIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixSource {
    Declared,
    FallbackDefaults,
}

/// One `(name, type)` child of a complex type's sequence.
#[derive(Debug, Clone)]
pub struct SchemaField {
    pub name: String,
    pub ty: QName,
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    /// `<element name=".." type=".."/>` or a `simpleType` restriction.
    Simple(QName),
    /// A complex type whose sequence children are the fields, in document
    /// order.
    Complex(Vec<SchemaField>),
}

/// A named `element` or `complexType` declaration from a `<schema>` block.
#[derive(Debug, Clone)]
pub struct SchemaElement {
    pub name: QName,
    pub kind: ElementKind,
}

#[derive(Debug, Clone)]
pub enum PartKind {
    /// `element="tns:Foo"` — references a schema element declaration.
    Element(QName),
    /// `type="xsd:int"` — inlines a type directly.
    Type(QName),
}

#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub kind: PartKind,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub name: QName,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub documentation: Option<String>,
    pub input: Option<QName>,
    pub output: Option<QName>,
    pub faults: Vec<QName>,
}

#[derive(Debug, Clone)]
pub struct PortType {
    pub name: QName,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone)]
pub struct BindingOperation {
    pub name: String,
    pub action: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: QName,
    pub port_type: QName,
    pub transport: Option<String>,
    pub style: Option<String>,
    pub operations: Vec<BindingOperation>,
}

#[derive(Debug, Clone)]
pub struct Port {
    pub name: String,
    pub binding: QName,
    pub location: String,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub ports: Vec<Port>,
}

/// Where and how to send a call for one operation, resolved through
/// service → port → binding → portType.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub location: String,
    pub style: String,
    pub action: Option<String>,
}

/// The root parsed representation of one WSDL source. Immutable once built;
/// every query below is a read-only walk over declaration-ordered lists.
#[derive(Debug, Clone)]
pub struct Document {
    pub target_namespace: String,
    pub prefix_source: PrefixSource,
    pub elements: Vec<SchemaElement>,
    pub messages: Vec<Message>,
    pub port_types: Vec<PortType>,
    pub bindings: Vec<Binding>,
    pub services: Vec<Service>,
}

impl Document {
    /// Operation names across all port types, in declaration order.
    pub fn operations(&self) -> Vec<&str> {
        self.port_types
            .iter()
            .flat_map(|port_type| port_type.operations.iter())
            .map(|operation| operation.name.as_str())
            .collect()
    }

    pub fn find_operation(&self, name: &str) -> Option<&Operation> {
        self.port_types
            .iter()
            .flat_map(|port_type| port_type.operations.iter())
            .find(|operation| operation.name == name)
    }

    pub fn find_message(&self, name: &QName) -> Option<&Message> {
        self.messages
            .iter()
            .find(|message| message.name == *name)
            .or_else(|| self.messages.iter().find(|message| message.name.matches(name)))
    }

    /// Resolves the transport address, effective binding style, and
    /// `soapAction` for one operation. The style declared on the binding
    /// operation wins over the binding default; `document` is assumed when
    /// neither is present.
    pub fn resolve_endpoint(&self, operation: &str) -> Option<Endpoint> {
        for service in &self.services {
            for port in &service.ports {
                let binding = match self
                    .bindings
                    .iter()
                    .find(|binding| binding.name.matches(&port.binding))
                {
                    Some(binding) => binding,
                    None => continue,
                };

                let port_type = match self
                    .port_types
                    .iter()
                    .find(|port_type| port_type.name.matches(&binding.port_type))
                {
                    Some(port_type) => port_type,
                    None => continue,
                };

                if !port_type
                    .operations
                    .iter()
                    .any(|candidate| candidate.name == operation)
                {
                    continue;
                }

                let binding_operation = binding
                    .operations
                    .iter()
                    .find(|candidate| candidate.name == operation);

                let style = binding_operation
                    .and_then(|op| op.style.clone())
                    .or_else(|| binding.style.clone())
                    .unwrap_or_else(|| "document".to_owned());

                return Some(Endpoint {
                    location: port.location.clone(),
                    style,
                    action: binding_operation.and_then(|op| op.action.clone()),
                });
            }
        }

        None
    }
}
