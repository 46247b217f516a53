//! Namespaced payload element.
//!
//! # Responsibility
//! - Represent the structured payload carried by an IQ (for example a vCard).
//! - Provide the lookup helpers the request dispatcher needs.
//!
//! # Invariants
//! - `name` is never empty for elements built through constructors.
//! - Child order is preserved exactly as appended.
//!
//! Wire encoding is owned by the outer stream layer. Persisted records use the
//! serde representation of this type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One structured element with optional namespace, attributes, text and children.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an element bound to `namespace`.
    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Sets text content, builder style.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Appends one child, builder style.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn append_element(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn children_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the first child named `name`, regardless of namespace.
    pub fn child_named(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns the first child named `name` bound to `namespace`.
    pub fn child_namespace(&self, name: &str, namespace: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.is(name, namespace))
    }

    /// Returns whether this element has the given name and namespace.
    pub fn is(&self, name: &str, namespace: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }
}
