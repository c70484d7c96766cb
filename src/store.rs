//! The persisted personal inventory.
//!
//! Records are snapshots of resolved items plus bookkeeping (quantity,
//! location, notes). Used by the `haul add/list/update/remove/stats`
//! commands and the corresponding HTTP endpoints.

use anyhow::{bail, Result};
use sqlx::Row;

use crate::config::Config;
use crate::db;
use crate::models::{InventoryRecord, ResolvedItem};
use crate::resolver::Resolver;

/// Insert a resolved item into the inventory.
///
/// Item names are unique case-insensitively; adding a duplicate is an error
/// rather than a silent second row.
pub async fn add_record(
    config: &Config,
    item: &ResolvedItem,
    quantity: i64,
    location: &str,
    notes: Option<&str>,
) -> Result<InventoryRecord> {
    if quantity < 1 {
        bail!("quantity must be >= 1");
    }

    let pool = db::connect(config).await?;

    let existing: Option<String> =
        sqlx::query_scalar("SELECT id FROM inventory WHERE lower(name) = lower(?)")
            .bind(&item.name)
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        pool.close().await;
        bail!("'{}' is already in the inventory", item.name);
    }

    let record = InventoryRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: item.name.clone(),
        weight: item.weight,
        height: item.height,
        width: item.width,
        depth: item.depth,
        volume: item.volume,
        category: item.category.clone(),
        source: item.source,
        confidence: Some(item.confidence),
        quantity,
        location: location.to_string(),
        notes: notes.map(|n| n.to_string()),
        added_at: chrono::Utc::now().timestamp(),
    };

    sqlx::query(
        r#"
        INSERT INTO inventory
            (id, name, weight, height, width, depth, volume, category,
             source, confidence, quantity, location, notes, added_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(record.weight)
    .bind(record.height)
    .bind(record.width)
    .bind(record.depth)
    .bind(record.volume)
    .bind(&record.category)
    .bind(record.source.as_str())
    .bind(record.confidence)
    .bind(record.quantity)
    .bind(&record.location)
    .bind(&record.notes)
    .bind(record.added_at)
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(record)
}

/// All inventory records, newest first.
pub async fn list_records(config: &Config) -> Result<Vec<InventoryRecord>> {
    let pool = db::connect(config).await?;

    let rows = sqlx::query(
        r#"
        SELECT id, name, weight, height, width, depth, volume, category,
               source, confidence, quantity, location, notes, added_at
        FROM inventory
        ORDER BY added_at DESC, id ASC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let source: String = row.get("source");
        records.push(InventoryRecord {
            id: row.get("id"),
            name: row.get("name"),
            weight: row.get("weight"),
            height: row.get("height"),
            width: row.get("width"),
            depth: row.get("depth"),
            volume: row.get("volume"),
            category: row.get("category"),
            source: source.parse()?,
            confidence: row.get("confidence"),
            quantity: row.get("quantity"),
            location: row.get("location"),
            notes: row.get("notes"),
            added_at: row.get("added_at"),
        });
    }

    pool.close().await;
    Ok(records)
}

/// Update the bookkeeping fields of one record. Returns false when the id
/// does not exist.
pub async fn update_record(
    config: &Config,
    id: &str,
    quantity: Option<i64>,
    location: Option<&str>,
    notes: Option<&str>,
) -> Result<bool> {
    if let Some(q) = quantity {
        if q < 1 {
            bail!("quantity must be >= 1");
        }
    }

    let pool = db::connect(config).await?;

    let result = sqlx::query(
        r#"
        UPDATE inventory SET
            quantity = COALESCE(?, quantity),
            location = COALESCE(?, location),
            notes    = COALESCE(?, notes)
        WHERE id = ?
        "#,
    )
    .bind(quantity)
    .bind(location)
    .bind(notes)
    .bind(id)
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(result.rows_affected() > 0)
}

/// Delete one record. Returns false when the id does not exist.
pub async fn remove_record(config: &Config, id: &str) -> Result<bool> {
    let pool = db::connect(config).await?;

    let result = sqlx::query("DELETE FROM inventory WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(result.rows_affected() > 0)
}

// ============ Aggregates ============

/// Running totals across the whole inventory. Weights and volumes count
/// each record `quantity` times.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InventoryTotals {
    pub records: i64,
    pub items: i64,
    pub weight_kg: f64,
    pub volume_cm3: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub items: i64,
    pub weight_kg: f64,
}

pub async fn totals(config: &Config) -> Result<InventoryTotals> {
    let pool = db::connect(config).await?;

    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS records,
            COALESCE(SUM(quantity), 0) AS items,
            COALESCE(SUM(weight * quantity), 0.0) AS weight_kg,
            COALESCE(SUM(volume * quantity), 0.0) AS volume_cm3
        FROM inventory
        "#,
    )
    .fetch_one(&pool)
    .await?;

    let totals = InventoryTotals {
        records: row.get("records"),
        items: row.get("items"),
        weight_kg: row.get("weight_kg"),
        volume_cm3: row.get("volume_cm3"),
    };

    pool.close().await;
    Ok(totals)
}

pub async fn category_totals(config: &Config) -> Result<Vec<CategoryTotal>> {
    let pool = db::connect(config).await?;

    let rows = sqlx::query(
        r#"
        SELECT category,
               COALESCE(SUM(quantity), 0) AS items,
               COALESCE(SUM(weight * quantity), 0.0) AS weight_kg
        FROM inventory
        GROUP BY category
        ORDER BY weight_kg DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let totals = rows
        .iter()
        .map(|row| CategoryTotal {
            category: row.get("category"),
            items: row.get("items"),
            weight_kg: row.get("weight_kg"),
        })
        .collect();

    pool.close().await;
    Ok(totals)
}

// ============ CLI entry points ============

/// Resolve `text` and add it to the inventory.
pub async fn run_add(
    config: &Config,
    text: &str,
    quantity: i64,
    location: &str,
    notes: Option<&str>,
) -> Result<()> {
    let resolver = Resolver::new(config);

    let item = match resolver.resolve_with_catalog(text).await? {
        Some(item) => item,
        None => {
            println!("A lookup for this text is already in flight; try again shortly.");
            return Ok(());
        }
    };

    let record = add_record(config, &item, quantity, location, notes).await?;

    println!(
        "Added {} × {} — {:.1} kg each ({}, {:.0}% confidence)",
        record.quantity,
        record.name,
        record.weight,
        record.source,
        item.confidence * 100.0
    );
    println!("id: {}", record.id);

    Ok(())
}

pub async fn run_list(config: &Config) -> Result<()> {
    let records = list_records(config).await?;

    if records.is_empty() {
        println!("Inventory is empty.");
        return Ok(());
    }

    println!(
        "{:<38} {:<28} {:>4} {:>9} {:>12}  LOCATION",
        "ID", "NAME", "QTY", "WEIGHT", "ADDED"
    );
    for record in &records {
        println!(
            "{:<38} {:<28} {:>4} {:>7.1}kg {:>12}  {}",
            record.id,
            record.name,
            record.quantity,
            record.weight * record.quantity as f64,
            format_ts(record.added_at),
            record.location
        );
    }

    Ok(())
}

pub async fn run_update(
    config: &Config,
    id: &str,
    quantity: Option<i64>,
    location: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    if quantity.is_none() && location.is_none() && notes.is_none() {
        bail!("nothing to update: pass --quantity, --location, or --notes");
    }

    if update_record(config, id, quantity, location, notes).await? {
        println!("Updated {}.", id);
    } else {
        eprintln!("Error: no inventory record with id {}", id);
        std::process::exit(1);
    }

    Ok(())
}

pub async fn run_remove(config: &Config, id: &str) -> Result<()> {
    if remove_record(config, id).await? {
        println!("Removed {}.", id);
    } else {
        eprintln!("Error: no inventory record with id {}", id);
        std::process::exit(1);
    }

    Ok(())
}

/// Print the inventory summary: record counts, running totals, and the
/// per-category breakdown.
pub async fn run_stats(config: &Config) -> Result<()> {
    let totals = totals(config).await?;
    let by_category = category_totals(config).await?;

    println!("Haulkit — Inventory Stats");
    println!("=========================");
    println!();
    println!("  Database:  {}", config.db.path.display());
    println!();
    println!("  Records:   {}", totals.records);
    println!("  Items:     {}", totals.items);
    println!("  Weight:    {:.1} kg", totals.weight_kg);
    println!("  Volume:    {:.2} m³", totals.volume_cm3 / 1_000_000.0);

    if !by_category.is_empty() {
        println!();
        println!("  By category:");
        println!("  {:<16} {:>6} {:>12}", "CATEGORY", "ITEMS", "WEIGHT");
        println!("  {}", "-".repeat(36));
        for cat in &by_category {
            println!(
                "  {:<16} {:>6} {:>10.1}kg",
                cat.category, cat.items, cat.weight_kg
            );
        }
    }

    println!();
    Ok(())
}

fn format_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}
