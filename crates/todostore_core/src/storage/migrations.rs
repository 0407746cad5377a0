//! Ordered schema migrations keyed on `PRAGMA user_version`.

use crate::error::AppError;
use rusqlite::Connection;

pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

/// Applied in order; versions must be strictly increasing.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "baseline",
    sql: include_str!("../../migrations/001_baseline.sql"),
}];

pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

pub fn schema_version(conn: &Connection) -> Result<u32, AppError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|err| AppError::store_unavailable(format!("reading schema version: {err}")))
}

/// True when `apply` would change the file. Fails for schemas newer than this build.
pub fn needs_upgrade(conn: &Connection) -> Result<bool, AppError> {
    let current = schema_version(conn)?;
    check_not_newer(current)?;
    Ok(current < latest_version())
}

/// Brings the schema up to `latest_version`, returning how many steps ran.
pub fn apply(conn: &mut Connection) -> Result<usize, AppError> {
    let current = schema_version(conn)?;
    check_not_newer(current)?;

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply_one(conn, migration).map_err(|err| {
            tracing::error!(
                version = migration.version,
                name = migration.name,
                error = %err,
                "schema migration failed"
            );
            AppError::store_unavailable(format!(
                "migration {} ({}) failed: {}",
                migration.version, migration.name, err
            ))
        })?;
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "applied schema migration"
        );
        applied += 1;
    }

    Ok(applied)
}

fn apply_one(conn: &mut Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.pragma_update(None, "user_version", migration.version)?;
    tx.commit()
}

fn check_not_newer(current: u32) -> Result<(), AppError> {
    let latest = latest_version();
    if current > latest {
        return Err(AppError::store_unavailable(format!(
            "schema version {current} is newer than supported version {latest}"
        )));
    }
    Ok(())
}
