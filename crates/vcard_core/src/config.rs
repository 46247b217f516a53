//! Core configuration model.
//!
//! # Responsibility
//! - Describe logging, store and module settings in one JSON document.
//! - Validate settings before any component is constructed.
//!
//! # Invariants
//! - Every field has a default; an empty document `{}` is valid.
//! - Unknown fields are rejected.

use crate::db::StoreConfig;
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default vCard module mailbox capacity.
pub const DEFAULT_MAILBOX_SIZE: usize = 2048;
const MAX_MAILBOX_SIZE: usize = 1 << 20;

/// vCard module settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VCardConfig {
    /// Bounded work-queue capacity; submitters block once it is full.
    pub mailbox_size: usize,
}

impl Default for VCardConfig {
    fn default() -> Self {
        Self {
            mailbox_size: DEFAULT_MAILBOX_SIZE,
        }
    }
}

impl VCardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mailbox_size == 0 {
            return Err(ConfigError::InvalidMailboxSize(self.mailbox_size));
        }
        if self.mailbox_size > MAX_MAILBOX_SIZE {
            return Err(ConfigError::InvalidMailboxSize(self.mailbox_size));
        }
        Ok(())
    }
}

/// Top-level core settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute log directory; logging stays disabled when unset.
    pub log_dir: Option<String>,
    pub store: StoreConfig,
    pub vcard: VCardConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            store: StoreConfig::default(),
            vcard: VCardConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(value: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(value).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::EmptyLogLevel);
        }
        if let Some(dir) = &self.log_dir {
            if dir.trim().is_empty() {
                return Err(ConfigError::EmptyLogDir);
            }
        }
        self.vcard.validate()
    }
}

/// Configuration parse/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    EmptyLogLevel,
    EmptyLogDir,
    InvalidMailboxSize(usize),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid configuration document: {err}"),
            Self::EmptyLogLevel => write!(f, "log_level must not be empty"),
            Self::EmptyLogDir => write!(f, "log_dir must not be empty when set"),
            Self::InvalidMailboxSize(value) => write!(
                f,
                "vcard.mailbox_size must be between 1 and {MAX_MAILBOX_SIZE}, got {value}"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}
