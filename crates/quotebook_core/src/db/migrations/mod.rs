//! Ordered schema migrations for the key-value store.
//!
//! # Invariants
//! - Each migration runs inside its own transaction together with the
//!   `PRAGMA user_version` bump, so a failure leaves the last good version.
//! - A database newer than this binary is refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// SQL scripts indexed by target version (index 0 migrates to version 1).
const MIGRATION_SCRIPTS: &[&str] = &[include_str!("0001_init.sql")];

/// Versions before and after a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
}

impl MigrationReport {
    pub fn applied(&self) -> u32 {
        self.to_version - self.from_version
    }
}

/// Schema version this binary migrates to.
pub fn latest_version() -> u32 {
    MIGRATION_SCRIPTS.len() as u32
}

/// Brings `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    for (target, script) in (1u32..).zip(MIGRATION_SCRIPTS) {
        if target <= from_version {
            continue;
        }
        let tx = conn.transaction()?;
        tx.execute_batch(script)?;
        tx.pragma_update(None, "user_version", target)?;
        tx.commit()?;
        info!("event=db_migrate module=db status=ok version={target}");
    }

    Ok(MigrationReport {
        from_version,
        to_version: latest,
    })
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, schema_version};
    use rusqlite::Connection;

    #[test]
    fn fresh_database_reports_every_migration() {
        let mut conn = Connection::open_in_memory().unwrap();
        let report = apply_migrations(&mut conn).unwrap();
        assert_eq!(report.from_version, 0);
        assert_eq!(report.applied(), latest_version());
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn second_run_applies_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        let report = apply_migrations(&mut conn).unwrap();
        assert_eq!(report.applied(), 0);
    }
}
