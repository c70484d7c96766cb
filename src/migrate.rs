use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Create inventory table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventory (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            weight REAL NOT NULL,
            height REAL NOT NULL,
            width REAL NOT NULL,
            depth REAL NOT NULL,
            volume REAL NOT NULL,
            category TEXT NOT NULL,
            source TEXT NOT NULL,
            confidence REAL,
            quantity INTEGER NOT NULL,
            location TEXT NOT NULL,
            notes TEXT,
            added_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_inventory_category ON inventory(category)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_inventory_added_at ON inventory(added_at DESC)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_inventory_name ON inventory(lower(name))")
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(())
}
