//! Serialized profile-data (vCard) extension core.
//! Requests are handled one at a time per module against a transactional record store.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod module;
pub mod store;

pub use config::{ConfigError, CoreConfig, VCardConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::element::Element;
pub use model::iq::{Iq, IqType, StanzaErrorKind};
pub use model::jid::{Jid, JidError};
pub use model::user::User;
pub use module::disco::DiscoInfo;
pub use module::executor::{ExecutorError, SerialExecutor};
pub use module::router::{ChannelRouter, RouteError, Router};
pub use module::vcard::{VCard, VCARD_NAMESPACE};
pub use module::{IqHandler, ModuleError};
pub use store::{SqliteStore, StoreError, StoreResult, UserStore, VCardStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
