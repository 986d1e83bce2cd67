//! Ledger schema migrations.
//!
//! Versions are mirrored to `PRAGMA user_version` and must stay monotonic.
//! Pending steps run inside one SQLite transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct LedgerMigration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const LEDGER_MIGRATIONS: &[LedgerMigration] = &[LedgerMigration {
    version: 1,
    name: "world_state_and_private_data",
    sql: include_str!("0001_ledger.sql"),
}];

/// Returns the newest ledger schema version this binary can open.
pub fn latest_version() -> u32 {
    LEDGER_MIGRATIONS
        .last()
        .map_or(0, |migration| migration.version)
}

/// Brings the ledger schema up to [`latest_version`].
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer
///   binary.
/// - `DbError::Sqlite` when any step fails; nothing is applied in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&LedgerMigration> = LEDGER_MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=ledger_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    Ok(())
}

/// Reads the ledger schema version recorded on the connection.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
