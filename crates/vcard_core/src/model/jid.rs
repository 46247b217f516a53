//! Entity identity (JID) model.
//!
//! # Responsibility
//! - Parse and render `node@domain/resource` addresses.
//! - Expose the primary-address component used as the storage key.
//!
//! # Invariants
//! - `domain` is never empty.
//! - `node` and `resource`, when present, are never empty.
//! - Node and domain are stored lowercase; resource keeps its case.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static NODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^\s"&'/:<>@]+$"#).expect("valid node regex"));
static DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@/]+$").expect("valid domain regex"));

/// Addressable entity identity.
///
/// Equality compares every component. Ownership checks compare
/// [`Jid::node`] only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid {
    node: Option<String>,
    domain: String,
    resource: Option<String>,
}

impl Jid {
    /// Builds a JID from its components.
    pub fn new(
        node: Option<&str>,
        domain: &str,
        resource: Option<&str>,
    ) -> Result<Self, JidError> {
        let domain = domain.trim().to_ascii_lowercase();
        if domain.is_empty() {
            return Err(JidError::EmptyDomain);
        }
        if !DOMAIN_RE.is_match(&domain) {
            return Err(JidError::InvalidDomain(domain));
        }

        let node = match node {
            Some(value) => {
                let value = value.trim().to_ascii_lowercase();
                if value.is_empty() {
                    return Err(JidError::EmptyNode);
                }
                if !NODE_RE.is_match(&value) {
                    return Err(JidError::InvalidNode(value));
                }
                Some(value)
            }
            None => None,
        };

        let resource = match resource {
            Some(value) if value.is_empty() => return Err(JidError::EmptyResource),
            Some(value) => Some(value.to_string()),
            None => None,
        };

        Ok(Self {
            node,
            domain,
            resource,
        })
    }

    /// Parses the `node@domain/resource` string form.
    pub fn parse(value: &str) -> Result<Self, JidError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(JidError::Empty);
        }

        let (address, resource) = match trimmed.split_once('/') {
            Some((address, resource)) => (address, Some(resource)),
            None => (trimmed, None),
        };
        let (node, domain) = match address.split_once('@') {
            Some((node, domain)) => (Some(node), domain),
            None => (None, address),
        };

        Self::new(node, domain, resource)
    }

    /// Local part; the primary-address component used for ownership.
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Returns whether this address names the server itself.
    pub fn is_server(&self) -> bool {
        self.node.is_none() && self.resource.is_none()
    }

    pub fn is_bare(&self) -> bool {
        self.resource.is_none()
    }

    /// Returns this address without its resource component.
    pub fn to_bare(&self) -> Self {
        Self {
            node: self.node.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }

    /// Returns whether both addresses share the same primary-address component.
    pub fn same_node(&self, other: &Jid) -> bool {
        self.node == other.node
    }
}

impl Display for Jid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(node) = &self.node {
            write!(f, "{node}@")?;
        }
        write!(f, "{}", self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}

impl FromStr for Jid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// JID parse/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JidError {
    Empty,
    EmptyDomain,
    EmptyNode,
    EmptyResource,
    InvalidNode(String),
    InvalidDomain(String),
}

impl Display for JidError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "jid must not be empty"),
            Self::EmptyDomain => write!(f, "jid domain must not be empty"),
            Self::EmptyNode => write!(f, "jid node must not be empty when present"),
            Self::EmptyResource => write!(f, "jid resource must not be empty when present"),
            Self::InvalidNode(value) => write!(f, "jid node contains invalid characters: {value}"),
            Self::InvalidDomain(value) => {
                write!(f, "jid domain contains invalid characters: {value}")
            }
        }
    }
}

impl Error for JidError {}
