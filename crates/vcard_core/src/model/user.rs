//! Primary entity record.
//!
//! # Invariants
//! - `username` is the storage key and matches the owning JID node.
//! - `last_presence_at` is only meaningful when `last_presence` is set.

use serde::{Deserialize, Serialize};

/// Account record owning every dependent record family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    /// Last unavailable presence, in its serialized stanza form.
    pub last_presence: Option<String>,
    /// Unix epoch milliseconds of the last presence update.
    pub last_presence_at: Option<i64>,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            last_presence: None,
            last_presence_at: None,
        }
    }
}
