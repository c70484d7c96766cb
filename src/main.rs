//! # Haulkit CLI (`haul`)
//!
//! The `haul` binary is the primary interface for Haulkit. It provides
//! commands for database initialization, catalog search, item resolution,
//! inventory management, and starting the JSON API server.
//!
//! ## Usage
//!
//! ```bash
//! haul --config ./config/haul.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `haul init` | Create the SQLite database and run schema migrations |
//! | `haul search "<query>"` | Search the built-in catalog |
//! | `haul resolve "<text>"` | Resolve free text into an item record |
//! | `haul add "<text>"` | Resolve and add an item to the inventory |
//! | `haul list` | List inventory records |
//! | `haul update <id>` | Update quantity/location/notes of a record |
//! | `haul remove <id>` | Remove a record from the inventory |
//! | `haul stats` | Show inventory totals |
//! | `haul serve` | Start the JSON API server |
//!
//! ## Examples
//!
//! ```bash
//! # Search with filters
//! haul search "freezer" --min-weight 50
//!
//! # Skip the catalog and force the external lookup cascade
//! haul resolve "antique gramophone" --web
//!
//! # Add two boxes to the garage
//! haul add "large box" --quantity 2 --location garage
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use haulkit::matcher::SearchFilters;
use haulkit::{config, matcher, migrate, resolver, server, store};

/// Haulkit — a local-first inventory and item-resolution toolkit for
/// planning household moves.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Every setting has a sensible default, so a missing file only
/// matters once you need a non-default database path or backend URL.
#[derive(Parser)]
#[command(
    name = "haul",
    about = "Haulkit — a local-first inventory and item-resolution toolkit for household moves",
    version,
    long_about = "Haulkit resolves free-text item descriptions into structured records \
    (weight, size, volume, category, confidence, provenance) via a catalog-first pipeline \
    with external lookup fallbacks, and maintains a persisted personal inventory with \
    running totals."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/haul.toml`. Database, matcher, lookup, cache,
    /// and server settings are read from this file.
    #[arg(long, global = true, default_value = "./config/haul.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the inventory table. This
    /// command is idempotent — running it multiple times is safe.
    Init,

    /// Search the built-in catalog.
    ///
    /// Runs the strict-to-loose matching cascade and prints ranked matches,
    /// or "did you mean" suggestions when nothing matches.
    Search {
        /// The search query string.
        query: String,

        /// Only include items at or above this weight (kg).
        #[arg(long)]
        min_weight: Option<f64>,

        /// Only include items at or below this weight (kg).
        #[arg(long)]
        max_weight: Option<f64>,

        /// Only include items at or above this volume (cm³).
        #[arg(long)]
        min_volume: Option<f64>,

        /// Only include items at or below this volume (cm³).
        #[arg(long)]
        max_volume: Option<f64>,
    },

    /// Resolve free text into a structured item record.
    ///
    /// Consults the catalog first, then the external lookup cascade
    /// (backend extraction → encyclopedia → heuristic estimation).
    Resolve {
        /// The item description to resolve.
        text: String,

        /// Skip the catalog and go straight to the external lookup cascade.
        #[arg(long)]
        web: bool,
    },

    /// Resolve an item and add it to the inventory.
    Add {
        /// The item description to resolve and store.
        text: String,

        /// How many of this item.
        #[arg(long, default_value_t = 1)]
        quantity: i64,

        /// Where the item lives (room, storage unit, van number).
        #[arg(long, default_value = "unassigned")]
        location: String,

        /// Free-form notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// List all inventory records, newest first.
    List,

    /// Update quantity, location, or notes of an inventory record.
    Update {
        /// Inventory record id.
        id: String,

        /// New quantity.
        #[arg(long)]
        quantity: Option<i64>,

        /// New location.
        #[arg(long)]
        location: Option<String>,

        /// New notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Remove a record from the inventory.
    Remove {
        /// Inventory record id.
        id: String,
    },

    /// Show inventory totals and the per-category breakdown.
    Stats,

    /// Start the JSON API server.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// search, resolve, inventory, and cache endpoints.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing config file falls back to defaults; a present-but-broken
    // one is a hard error.
    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        config::Config::minimal()
    };

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Search {
            query,
            min_weight,
            max_weight,
            min_volume,
            max_volume,
        } => {
            let filters = SearchFilters {
                min_weight,
                max_weight,
                min_volume,
                max_volume,
            };
            matcher::run_search(&cfg, &query, &filters)?;
        }
        Commands::Resolve { text, web } => {
            resolver::run_resolve(&cfg, &text, web).await?;
        }
        Commands::Add {
            text,
            quantity,
            location,
            notes,
        } => {
            store::run_add(&cfg, &text, quantity, &location, notes.as_deref()).await?;
        }
        Commands::List => {
            store::run_list(&cfg).await?;
        }
        Commands::Update {
            id,
            quantity,
            location,
            notes,
        } => {
            store::run_update(&cfg, &id, quantity, location.as_deref(), notes.as_deref()).await?;
        }
        Commands::Remove { id } => {
            store::run_remove(&cfg, &id).await?;
        }
        Commands::Stats => {
            store::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
