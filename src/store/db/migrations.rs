use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Schema scripts in order; entry `n` upgrades `user_version` `n` to `n + 1`.
const MIGRATIONS: &[&str] = &[include_str!("schemas/schema_v1.sql")];

const CURRENT_SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")
}

/// Brings the kv schema up to date inside a single transaction.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let applied = schema_version(conn)?;
    if applied > CURRENT_SCHEMA_VERSION {
        bail!(
            "progress database is at schema v{applied}, this build knows v{CURRENT_SCHEMA_VERSION}"
        );
    }
    if applied == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;
    for (index, script) in MIGRATIONS.iter().enumerate().skip(applied.max(0) as usize) {
        tx.execute_batch(script)
            .with_context(|| format!("failed to apply schema v{}", index + 1))?;
    }
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to record schema version")?;
    tx.commit().context("failed to commit migrations")
}
