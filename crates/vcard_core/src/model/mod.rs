//! Domain model for the profile-data extension.
//!
//! # Responsibility
//! - Define addresses, payload elements and request stanzas.
//! - Define the persisted account record.
//!
//! # Invariants
//! - Every persisted record is keyed by a JID node (primary-address component).

pub mod element;
pub mod iq;
pub mod jid;
pub mod user;
