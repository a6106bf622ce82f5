use anyhow::{bail, Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::Path;
use std::time::Duration;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Create a read-only SQLite connection pool over the document store.
///
/// The store is populated by an external ingestion job, so a missing file is
/// a startup error rather than something to create.
pub fn open_ro_pool(path: &Path, max_size: u32) -> Result<DbPool> {
    if !path.exists() {
        bail!("document store not found: {}", path.display());
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
        | OpenFlags::SQLITE_OPEN_URI;
    let manager = SqliteConnectionManager::file(path).with_flags(flags);
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_secs(5))
        .build(manager)
        .with_context(|| format!("failed to create DB pool for {}", path.display()))?;

    tracing::info!("Opened document store {} (pool size {max_size})", path.display());
    Ok(pool)
}
