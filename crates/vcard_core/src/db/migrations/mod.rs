//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register record-family schema migrations in strictly increasing order.
//! - Apply pending migrations inside one transaction.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - A failed migration leaves `user_version` untouched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "users_vcards",
        sql: include_str!("0001_users_vcards.sql"),
    },
    Migration {
        version: 2,
        name: "dependent_families",
        sql: include_str!("0002_dependent_families.sql"),
    },
];

/// Tables holding records keyed by a user's node, in cascade-delete order.
pub const DEPENDENT_TABLES: &[&str] = &[
    "offline_messages",
    "roster_items",
    "roster_versions",
    "private_storage",
    "vcards",
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }
    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current_version)
    {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        info!(
            "event=db_migrate module=db status=applied version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, MIGRATIONS};
    use rusqlite::Connection;

    #[test]
    fn migration_versions_are_strictly_increasing() {
        let versions: Vec<u32> = MIGRATIONS.iter().map(|migration| migration.version).collect();
        assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(latest_version(), 2);
    }

    #[test]
    fn partial_schema_is_upgraded_to_latest() {
        let mut conn = Connection::open_in_memory().expect("in-memory connection");
        conn.execute_batch(MIGRATIONS[0].sql).expect("first migration");
        conn.execute_batch("PRAGMA user_version = 1;")
            .expect("set version");

        apply_migrations(&mut conn).expect("apply remaining migrations");

        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .expect("read version");
        assert_eq!(version, latest_version());
        let exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'roster_items';",
                [],
                |row| row.get(0),
            )
            .expect("table lookup");
        assert_eq!(exists, 1);
    }
}
