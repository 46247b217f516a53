//! SQLite-backed record store.
//!
//! # Responsibility
//! - Implement [`VCardStore`] and [`UserStore`] over one migrated connection.
//! - Keep SQL shapes and row parsing inside the store boundary.
//!
//! # Invariants
//! - All statements bind the username as a parameter.
//! - Upserts are single statements, so each call is atomic.
//! - `delete_user` runs inside an immediate transaction and rolls back on the
//!   first failing statement.

use crate::db::migrations::DEPENDENT_TABLES;
use crate::db::{open_db_in_memory, open_db_with_config, StoreConfig};
use crate::model::element::Element;
use crate::model::user::User;
use crate::store::{StoreError, StoreResult, UserStore, VCardStore};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Record store sharing one SQLite connection between callers.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> StoreResult<Self> {
        Ok(Self::new(open_db_with_config(path, config)?))
    }

    /// Opens (and migrates) a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection mutex poisoned".to_string()))
    }
}

impl VCardStore for SqliteStore {
    fn fetch_vcard(&self, username: &str) -> StoreResult<Option<Element>> {
        let conn = self.lock()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT vcard FROM vcards WHERE username = ?1;",
                [username],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };
        let vcard: Element = serde_json::from_str(&payload)?;
        if vcard.name.is_empty() {
            return Err(StoreError::InvalidData(format!(
                "vcards.vcard for `{username}` has an empty element name"
            )));
        }
        Ok(Some(vcard))
    }

    fn upsert_vcard(&self, vcard: &Element, username: &str) -> StoreResult<()> {
        let payload = serde_json::to_string(vcard)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO vcards (username, vcard)
             VALUES (?1, ?2)
             ON CONFLICT (username) DO UPDATE SET
                vcard = excluded.vcard,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![username, payload],
        )?;
        Ok(())
    }
}

impl UserStore for SqliteStore {
    fn upsert_user(&self, user: &User) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (username, password, last_presence, last_presence_at)
             VALUES (
                ?1,
                ?2,
                ?3,
                COALESCE(?4, CASE WHEN ?3 IS NULL THEN NULL ELSE strftime('%s', 'now') * 1000 END)
             )
             ON CONFLICT (username) DO UPDATE SET
                password = excluded.password,
                last_presence = excluded.last_presence,
                last_presence_at = excluded.last_presence_at,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                user.username.as_str(),
                user.password.as_str(),
                user.last_presence.as_deref(),
                user.last_presence_at,
            ],
        )?;
        Ok(())
    }

    fn fetch_user(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                "SELECT username, password, last_presence, last_presence_at
                 FROM users
                 WHERE username = ?1;",
                [username],
                |row| {
                    Ok(User {
                        username: row.get("username")?,
                        password: row.get("password")?,
                        last_presence: row.get("last_presence")?,
                        last_presence_at: row.get("last_presence_at")?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn user_exists(&self, username: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1;",
            [username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn delete_user(&self, username: &str) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        match delete_user_records(&tx, username) {
            Ok(()) => {
                tx.commit()?;
                debug!("event=user_delete module=store status=ok username={username}");
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=user_delete module=store status=rollback username={} error={}",
                    username, err
                );
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=user_delete module=store status=error error_code=rollback_failed username={} error={}",
                        username, rollback_err
                    );
                }
                Err(err.into())
            }
        }
    }
}

fn delete_user_records(tx: &Transaction<'_>, username: &str) -> rusqlite::Result<()> {
    for table in DEPENDENT_TABLES {
        tx.execute(&format!("DELETE FROM {table} WHERE username = ?1;"), [username])?;
    }
    tx.execute("DELETE FROM users WHERE username = ?1;", [username])?;
    Ok(())
}
