//! Info/query request model and response constructors.
//!
//! # Responsibility
//! - Carry one inbound request (kind, addresses, payload elements).
//! - Build the result and error responses routed back to the requester.
//!
//! # Invariants
//! - Responses keep the request `id` and swap `from`/`to`.
//! - A request is never mutated by response construction.

use crate::model::element::Element;
use crate::model::jid::Jid;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// IQ type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IqType {
    Get,
    Set,
    Result,
    Error,
}

impl IqType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Result => "result",
            Self::Error => "error",
        }
    }
}

/// Client-facing failure condition attached to an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StanzaErrorKind {
    BadRequest,
    Forbidden,
    InternalServerError,
}

impl StanzaErrorKind {
    /// Defined condition element name.
    pub fn condition(self) -> &'static str {
        match self {
            Self::BadRequest => "bad-request",
            Self::Forbidden => "forbidden",
            Self::InternalServerError => "internal-server-error",
        }
    }

    /// Error `type` attribute value.
    pub fn error_type(self) -> &'static str {
        match self {
            Self::BadRequest => "modify",
            Self::Forbidden => "auth",
            Self::InternalServerError => "cancel",
        }
    }
}

impl Display for StanzaErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.condition())
    }
}

/// One IQ stanza.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iq {
    id: String,
    kind: IqType,
    from: Jid,
    to: Jid,
    elements: Vec<Element>,
    error: Option<StanzaErrorKind>,
}

impl Iq {
    /// Creates an IQ with a generated id.
    pub fn new(kind: IqType, from: Jid, to: Jid) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), kind, from, to)
    }

    pub fn with_id(id: impl Into<String>, kind: IqType, from: Jid, to: Jid) -> Self {
        Self {
            id: id.into(),
            kind,
            from,
            to,
            elements: Vec::new(),
            error: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> IqType {
        self.kind
    }

    pub fn is_get(&self) -> bool {
        self.kind == IqType::Get
    }

    pub fn is_set(&self) -> bool {
        self.kind == IqType::Set
    }

    pub fn is_result(&self) -> bool {
        self.kind == IqType::Result
    }

    pub fn is_error(&self) -> bool {
        self.kind == IqType::Error
    }

    /// Requester address.
    pub fn from(&self) -> &Jid {
        &self.from
    }

    /// Destination address.
    pub fn to(&self) -> &Jid {
        &self.to
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn error(&self) -> Option<StanzaErrorKind> {
        self.error
    }

    pub fn append_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Appends one payload element, builder style.
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// Returns the first payload element named `name` bound to `namespace`.
    pub fn child_namespace(&self, name: &str, namespace: &str) -> Option<&Element> {
        self.elements
            .iter()
            .find(|element| element.is(name, namespace))
    }

    /// Builds an empty `result` response.
    pub fn result_iq(&self) -> Iq {
        Iq::with_id(
            self.id.clone(),
            IqType::Result,
            self.to.clone(),
            self.from.clone(),
        )
    }

    pub fn bad_request_error(&self) -> Iq {
        self.error_iq(StanzaErrorKind::BadRequest)
    }

    pub fn forbidden_error(&self) -> Iq {
        self.error_iq(StanzaErrorKind::Forbidden)
    }

    pub fn internal_server_error(&self) -> Iq {
        self.error_iq(StanzaErrorKind::InternalServerError)
    }

    /// Builds an `error` response echoing the original payload.
    fn error_iq(&self, kind: StanzaErrorKind) -> Iq {
        Iq {
            id: self.id.clone(),
            kind: IqType::Error,
            from: self.to.clone(),
            to: self.from.clone(),
            elements: self.elements.clone(),
            error: Some(kind),
        }
    }
}
