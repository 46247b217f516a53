//! Extension modules and their runtime collaborators.
//!
//! # Responsibility
//! - Define the [`IqHandler`] contract every IQ-handling module implements.
//! - Provide the serial executor, router and disco collaborators.
//!
//! # Invariants
//! - A module answers every accepted request with exactly one routed response.
//! - Request handling runs on the module's own serial executor only.

use crate::config::ConfigError;
use crate::model::iq::Iq;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod disco;
pub mod executor;
pub mod router;
pub mod vcard;

use disco::DiscoError;
use executor::ExecutorError;
use router::Router;

/// IQ-handling extension module.
pub trait IqHandler: Send + Sync {
    /// Returns whether this module should process `iq`. Side-effect free.
    fn matches_iq(&self, iq: &Iq) -> bool;

    /// Queues `iq` for processing; the response is delivered through `router`.
    ///
    /// Blocks while the module mailbox is full.
    fn process_iq(&self, iq: Iq, router: Arc<dyn Router>) -> Result<(), ModuleError>;

    /// Stops the module. Queued requests are discarded.
    fn shutdown(&self) -> Result<(), ModuleError>;
}

/// Module construction and lifecycle errors.
#[derive(Debug)]
pub enum ModuleError {
    Config(ConfigError),
    Executor(ExecutorError),
    Disco(DiscoError),
}

impl Display for ModuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Executor(err) => write!(f, "{err}"),
            Self::Disco(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ModuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Executor(err) => Some(err),
            Self::Disco(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ModuleError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ExecutorError> for ModuleError {
    fn from(value: ExecutorError) -> Self {
        Self::Executor(value)
    }
}

impl From<DiscoError> for ModuleError {
    fn from(value: DiscoError) -> Self {
        Self::Disco(value)
    }
}
