//! Record store contracts.
//!
//! # Responsibility
//! - Define the persistence operations the extension modules depend on.
//! - Keep SQL details behind the [`sqlite`] implementation.
//!
//! # Invariants
//! - Every record is keyed by a JID node (primary-address component).
//! - Absent records are `Ok(None)`, never an error.
//! - Underlying database failures are carried unchanged inside [`StoreError::Db`].
//! - `delete_user` is all-or-nothing across every record family.

use crate::db::DbError;
use crate::model::element::Element;
use crate::model::user::User;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store error.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap failure, preserved as returned by the driver.
    Db(DbError),
    /// Persisted payload could not be encoded or decoded.
    Serialization(serde_json::Error),
    /// Persisted data violates the record model.
    InvalidData(String),
    /// Store handle cannot be used (for example a poisoned connection lock).
    Unavailable(String),
}

impl StoreError {
    /// Returns the driver error when this failure came from SQLite.
    pub fn sqlite_error(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Db(DbError::Sqlite(err)) => Some(err),
            _ => None,
        }
    }

    /// Returns whether retrying the same call may succeed.
    ///
    /// Only lock contention is considered transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.sqlite_error().and_then(rusqlite::Error::sqlite_error_code),
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        )
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "record serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record: {message}"),
            Self::Unavailable(message) => write!(f, "record store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Profile (vCard) record operations.
///
/// Implementations must tolerate concurrent callers; a single extension
/// module only ever calls them serially.
pub trait VCardStore: Send + Sync {
    /// Fetches the record stored for `username`.
    fn fetch_vcard(&self, username: &str) -> StoreResult<Option<Element>>;
    /// Inserts the record for `username`, fully replacing any previous one.
    fn upsert_vcard(&self, vcard: &Element, username: &str) -> StoreResult<()>;
}

/// Account record operations.
pub trait UserStore: Send + Sync {
    fn upsert_user(&self, user: &User) -> StoreResult<()>;
    fn fetch_user(&self, username: &str) -> StoreResult<Option<User>>;
    fn user_exists(&self, username: &str) -> StoreResult<bool>;
    /// Deletes the account and every dependent record family in one transaction.
    ///
    /// On failure nothing is deleted and the driver error is returned unchanged.
    fn delete_user(&self, username: &str) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32) -> StoreError {
        StoreError::from(rusqlite::Error::SqliteFailure(
            ffi::Error::new(code),
            Some("injected".to_string()),
        ))
    }

    #[test]
    fn busy_and_locked_failures_are_transient() {
        assert!(sqlite_failure(ffi::SQLITE_BUSY).is_transient());
        assert!(sqlite_failure(ffi::SQLITE_LOCKED).is_transient());
    }

    #[test]
    fn other_failures_are_permanent() {
        assert!(!sqlite_failure(ffi::SQLITE_CONSTRAINT).is_transient());
        assert!(!StoreError::InvalidData("bad".to_string()).is_transient());
        assert!(!StoreError::Unavailable("poisoned".to_string()).is_transient());
    }

    #[test]
    fn driver_error_is_preserved() {
        let err = sqlite_failure(ffi::SQLITE_IOERR);
        let inner = err.sqlite_error().expect("driver error");
        assert_eq!(
            inner.sqlite_error_code(),
            Some(rusqlite::ErrorCode::SystemIoFailure)
        );
        assert!(err.to_string().contains("injected"));
    }
}
