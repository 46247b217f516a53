//! Service discovery feature registry.
//!
//! # Invariants
//! - Feature sets are deduplicated and iterate in sorted order.
//! - Registering an already known feature is a no-op.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Features advertised by the server and by every account.
#[derive(Debug, Default)]
pub struct DiscoInfo {
    server_features: BTreeSet<String>,
    account_features: BTreeSet<String>,
}

impl DiscoInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_server_feature(&mut self, feature: &str) -> Result<(), DiscoError> {
        let feature = normalize_feature(feature)?;
        self.server_features.insert(feature);
        Ok(())
    }

    pub fn register_account_feature(&mut self, feature: &str) -> Result<(), DiscoError> {
        let feature = normalize_feature(feature)?;
        self.account_features.insert(feature);
        Ok(())
    }

    pub fn server_features(&self) -> Vec<&str> {
        self.server_features.iter().map(String::as_str).collect()
    }

    pub fn account_features(&self) -> Vec<&str> {
        self.account_features.iter().map(String::as_str).collect()
    }

    pub fn has_server_feature(&self, feature: &str) -> bool {
        self.server_features.contains(feature)
    }

    pub fn has_account_feature(&self, feature: &str) -> bool {
        self.account_features.contains(feature)
    }
}

fn normalize_feature(feature: &str) -> Result<String, DiscoError> {
    let normalized = feature.trim();
    if normalized.is_empty() {
        return Err(DiscoError::EmptyFeature);
    }
    Ok(normalized.to_string())
}

/// Feature registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoError {
    EmptyFeature,
}

impl Display for DiscoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFeature => write!(f, "disco feature must not be empty"),
        }
    }
}

impl Error for DiscoError {}
