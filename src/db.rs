use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Process-wide connection pool, opened on first use. Concurrent first
/// callers share one in-flight connect instead of racing to open their own;
/// a failed connect leaves the cell empty so the next caller retries.
pub async fn pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = POOL
        .get_or_try_init(|| async {
            PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .context("connect to database")
        })
        .await?;
    Ok(pool.clone())
}
