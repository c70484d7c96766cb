//! # Haulkit
//!
//! A local-first inventory and item-resolution toolkit for planning
//! household moves.
//!
//! Haulkit turns free-text item descriptions ("chest freezer", "big oak
//! table") into structured records — name, weight, size, volume, category,
//! confidence, provenance — by cascading from a static catalog through
//! external lookups down to pure heuristics, and keeps a persisted personal
//! inventory with running totals.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────────────────────────┐   ┌──────────┐
//! │  Catalog   │──▶│      Lookup Orchestrator       │──▶│ Inventory │
//! │  Matcher   │   │ backend → encyclopedia → est.  │   │  SQLite   │
//! └────────────┘   │   (cache + in-flight guard)    │   └────┬─────┘
//!                  └───────────────────────────────┘        │
//!                       ┌───────────────────────────────────┤
//!                       ▼                                   ▼
//!                  ┌──────────┐                       ┌──────────┐
//!                  │   CLI    │                       │   HTTP   │
//!                  │  (haul)  │                       │  (JSON)  │
//!                  └──────────┘                       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! haul init                        # create the inventory database
//! haul search "freezer"            # search the built-in catalog
//! haul resolve "chest freezer"     # full resolution pipeline
//! haul add "chest freezer" --quantity 1 --location garage
//! haul stats                       # inventory totals
//! haul serve                       # start the JSON API server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`catalog`] | The static reference catalog |
//! | [`matcher`] | Strict-to-loose catalog search cascade |
//! | [`estimate`] | Heuristic weight/size/category estimation |
//! | [`strategy`] | External lookup strategies |
//! | [`resolver`] | The lookup orchestrator |
//! | [`cache`] | Bounded lookup cache |
//! | [`store`] | Persisted inventory CRUD and totals |
//! | [`server`] | JSON HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod estimate;
pub mod matcher;
pub mod migrate;
pub mod models;
pub mod resolver;
pub mod server;
pub mod store;
pub mod strategy;
