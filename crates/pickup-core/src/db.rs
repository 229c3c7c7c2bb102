use crate::error::CoreError;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::debug;

pub use sqlx::SqlitePool as DbPool;

/// Opens the pickup database at `db_path` and brings the schema up to date.
///
/// Missing parent directories and the file itself are created, so a fresh
/// path yields an empty roster with all pickup tables in place.
pub async fn establish_connection(db_path: &str) -> Result<SqlitePool, CoreError> {
    let path = Path::new(db_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    if !path.exists() {
        tokio::fs::File::create(path).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("sqlite://{}", db_path))
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    debug!(db_path, "pickup schema migrated");

    Ok(pool)
}
