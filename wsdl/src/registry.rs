//! Lookup index over the schema declarations of a parsed document.

use std::collections::HashMap;

use tracing::warn;

use super::types::{Document, QName, SchemaElement};

/// Resolves namespace-qualified names to the `element`/`complexType`
/// declarations collected from every `<schema>` block under `<types>`.
pub struct ElementIndex<'a> {
    exact: HashMap<(&'a str, &'a str), &'a SchemaElement>,
    by_local: HashMap<&'a str, Vec<&'a SchemaElement>>,
}

impl<'a> ElementIndex<'a> {
    pub fn new(document: &'a Document) -> Self {
        let mut exact = HashMap::new();
        let mut by_local: HashMap<&str, Vec<&SchemaElement>> = HashMap::new();

        for element in &document.elements {
            exact
                .entry((element.name.namespace.as_str(), element.name.local.as_str()))
                .or_insert(element);

            by_local
                .entry(element.name.local.as_str())
                .or_default()
                .push(element);
        }

        Self { exact, by_local }
    }

    /// Exact `(namespace, local)` lookup first, then a local-name-only
    /// fallback for documents with sloppy namespace usage. The fallback only
    /// answers when it is unambiguous; a reference must resolve to exactly
    /// one declaration.
    pub fn resolve(&self, name: &QName) -> Option<&'a SchemaElement> {
        if let Some(element) = self
            .exact
            .get(&(name.namespace.as_str(), name.local.as_str()))
            .copied()
        {
            return Some(element);
        }

        match self.by_local.get(name.local.as_str()).map(Vec::as_slice) {
            Some([element]) => Some(*element),

            Some([_, ..]) => {
                warn!(%name, "schema element reference is ambiguous across namespaces");
                None
            }

            _ => None,
        }
    }
}
