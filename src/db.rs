use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, instrument};

/// Open (creating if needed) the SQLite database at `url` and bring its
/// schema up to date.
///
/// WAL mode lets catalog reads proceed while a checkout holds the write lock.
#[instrument]
pub async fn init_db(url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    debug!("Opening database at {}", url);

    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!("Database opened. Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
