pub mod migrations;
pub mod models;

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

/// Shared handle to the single SQLite connection. All access happens inside
/// spawn_blocking sections that hold the lock for one request's statements.
pub type DbPool = Arc<Mutex<Connection>>;

const DB_FILE: &str = "mmgh.db";

/// Open (creating if absent) the database under `data_dir` and bring the
/// schema to the latest migration.
pub fn init_db(data_dir: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(data_dir)?;

    let path = Path::new(data_dir).join(DB_FILE);
    let mut conn = open_at(&path)?;
    migrations::migrations().to_latest(&mut conn)?;

    tracing::info!(path = %path.display(), "database ready");
    Ok(Arc::new(Mutex::new(conn)))
}

fn open_at(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    // WAL keeps readers unblocked during bulk replaces. The FK pragma is
    // per-connection in SQLite and must be set on every open.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}
