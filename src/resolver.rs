//! The lookup orchestrator: free text in, resolved item out.
//!
//! Control flow per request: validate input → consult the cache → take the
//! pending-request guard (a concurrent duplicate for the same normalized
//! text gets an immediate "not ready" instead of a second network
//! round-trip) → run the strategy cascade → validate, backfill, cache, and
//! return. Strategy failures never escape; the only hard error the caller
//! can see is invalid input.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Result};

use crate::cache::{normalize_key, LookupCache};
use crate::catalog::Catalog;
use crate::config::{Config, MatcherConfig};
use crate::estimate;
use crate::matcher::{search_catalog, SearchFilters};
use crate::models::{CatalogItem, LookupHit, LookupOutcome, ResolvedItem, Source};
use crate::strategy::{builtin_strategies, LookupStrategy};

/// Inputs at or past this many characters are rejected outright.
const MAX_INPUT_CHARS: usize = 100;

/// Resolved-item ids start well above the catalog id range.
const FIRST_RESOLVED_ID: i64 = 100_000;

/// Confidence assigned to catalog-backed resolutions.
const CATALOG_CONFIDENCE: f64 = 0.95;

/// Confidence assumed for external results that did not report their own.
const DEFAULT_EXTERNAL_CONFIDENCE: f64 = 0.7;

pub struct Resolver {
    cache: LookupCache,
    pending: Mutex<HashSet<String>>,
    strategies: Vec<Box<dyn LookupStrategy>>,
    matcher: MatcherConfig,
    next_id: AtomicI64,
    min_confidence: f64,
}

impl Resolver {
    /// Build a resolver with the standard strategy cascade.
    pub fn new(config: &Config) -> Self {
        Self::with_strategies(config, builtin_strategies(&config.lookup))
    }

    /// Build a resolver with a custom cascade (used by tests to substitute
    /// strategies without touching the orchestration logic).
    pub fn with_strategies(config: &Config, strategies: Vec<Box<dyn LookupStrategy>>) -> Self {
        Self {
            cache: LookupCache::from_config(&config.cache),
            pending: Mutex::new(HashSet::new()),
            strategies,
            matcher: config.matcher.clone(),
            next_id: AtomicI64::new(FIRST_RESOLVED_ID),
            min_confidence: config.lookup.min_confidence,
        }
    }

    /// The injected cache, exposed for introspection and reset.
    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Resolve with the catalog consulted first — the cheap, synchronous,
    /// highest-confidence path — falling back to the web lookup cascade.
    pub async fn resolve_with_catalog(&self, text: &str) -> Result<Option<ResolvedItem>> {
        validate_input(text)?;

        let outcome = search_catalog(
            Catalog::builtin(),
            text,
            &SearchFilters::default(),
            &self.matcher,
        );

        if let Some(top) = outcome.matches.first() {
            return Ok(Some(self.from_catalog(top, text)));
        }

        self.resolve(text).await
    }

    /// Resolve via the external lookup cascade alone.
    ///
    /// Returns `Err` only for invalid input and `Ok(None)` only while a
    /// lookup for the same normalized text is already in flight.
    pub async fn resolve(&self, text: &str) -> Result<Option<ResolvedItem>> {
        validate_input(text)?;
        let key = normalize_key(text);

        if let Some(cached) = self.cache.get(&key) {
            return Ok(Some(self.finalize(cached, text)));
        }

        // The guard clears the pending marker on every exit path, including
        // panics inside a strategy.
        let _guard = match PendingGuard::acquire(&self.pending, &key) {
            Some(guard) => guard,
            None => return Ok(None),
        };

        for strategy in &self.strategies {
            let hit = match strategy.lookup(text).await {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(e) => {
                    eprintln!("warning: {} lookup failed: {:#}", strategy.name(), e);
                    continue;
                }
            };

            let outcome = self.normalize(hit, text);
            if !self.is_valid(&outcome) {
                eprintln!(
                    "warning: {} returned an implausible result for {:?}, trying next",
                    strategy.name(),
                    text
                );
                continue;
            }

            self.cache.insert(&key, outcome.clone());
            return Ok(Some(self.finalize(outcome, text)));
        }

        // Unreachable with the standard cascade — the estimator cannot fail.
        Ok(None)
    }

    /// Coerce a raw strategy hit into the canonical outcome shape, filling
    /// gaps from the estimator (fed any prose the strategy brought back).
    fn normalize(&self, hit: LookupHit, text: &str) -> LookupOutcome {
        let est = estimate::estimate(text, hit.description.as_deref());

        let name = hit
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| text.trim().to_string());

        LookupOutcome {
            name: estimate::capitalize_words(&name),
            weight: hit.weight.filter(|w| *w > 0.0).unwrap_or(est.weight),
            dimensions: hit.dimensions.unwrap_or(est.dimensions),
            category: hit
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| est.category.to_string()),
            confidence: hit.confidence.unwrap_or(DEFAULT_EXTERNAL_CONFIDENCE),
            source: hit.source,
            description: hit.description,
            specifications: hit.specifications,
        }
    }

    fn is_valid(&self, outcome: &LookupOutcome) -> bool {
        outcome.confidence >= self.min_confidence
            && outcome.weight > 0.0
            && !outcome.name.trim().is_empty()
    }

    /// Stamp an outcome into a resolved item with a fresh id and derived
    /// volume/rank.
    fn finalize(&self, outcome: LookupOutcome, text: &str) -> ResolvedItem {
        let volume = outcome.dimensions.volume();

        ResolvedItem {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: outcome.name,
            weight: outcome.weight,
            height: outcome.dimensions.height,
            width: outcome.dimensions.width,
            depth: outcome.dimensions.depth,
            volume,
            rank: (outcome.weight * 10.0 + volume / 1000.0).round() as i64,
            category: outcome.category,
            confidence: outcome.confidence,
            source: outcome.source,
            original_text: text.trim().to_string(),
            description: outcome.description,
            specifications: outcome.specifications,
        }
    }

    fn from_catalog(&self, item: &CatalogItem, text: &str) -> ResolvedItem {
        ResolvedItem {
            id: item.id,
            name: estimate::capitalize_words(&item.name),
            weight: item.weight,
            height: item.height,
            width: item.width,
            depth: item.depth,
            volume: item.volume,
            rank: item.rank,
            category: estimate::categorize(&item.name).to_string(),
            confidence: CATALOG_CONFIDENCE,
            source: Source::Catalog,
            original_text: text.trim().to_string(),
            description: None,
            specifications: None,
        }
    }
}

/// Reject empty and overlong inputs before they reach cache or network.
fn validate_input(text: &str) -> Result<()> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        bail!("item text must not be empty");
    }

    let chars = trimmed.chars().count();
    if chars >= MAX_INPUT_CHARS {
        bail!(
            "item text too long: {} characters (limit {})",
            chars,
            MAX_INPUT_CHARS
        );
    }

    Ok(())
}

// ============ Pending-request guard ============

/// Marks one normalized key as in flight; removal happens in `Drop` so the
/// marker cannot leak on any exit path.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashSet<String>>,
    key: String,
}

impl<'a> PendingGuard<'a> {
    /// Returns `None` when the key is already in flight.
    fn acquire(pending: &'a Mutex<HashSet<String>>, key: &str) -> Option<Self> {
        let mut set = lock(pending);
        if !set.insert(key.to_string()) {
            return None;
        }
        Some(Self {
            pending,
            key: key.to_string(),
        })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.pending).remove(&self.key);
    }
}

fn lock<'a>(m: &'a Mutex<HashSet<String>>) -> MutexGuard<'a, HashSet<String>> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ============ CLI entry point ============

/// Run a resolution and print the result.
pub async fn run_resolve(config: &Config, text: &str, web: bool) -> Result<()> {
    let resolver = Resolver::new(config);

    let resolved = if web {
        resolver.resolve(text).await?
    } else {
        resolver.resolve_with_catalog(text).await?
    };

    let item = match resolved {
        Some(item) => item,
        None => {
            println!("A lookup for this text is already in flight; try again shortly.");
            return Ok(());
        }
    };

    println!("--- Resolved ---");
    println!("name:        {}", item.name);
    println!("weight:      {:.1} kg", item.weight);
    println!("size:        {}", item.dimensions().label());
    println!("volume:      {:.0} cm³", item.volume);
    println!("category:    {}", item.category);
    println!("confidence:  {:.0}%", item.confidence * 100.0);
    println!("source:      {}", item.source);
    if let Some(ref desc) = item.description {
        println!("description: {}", desc);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_input() {
        assert!(validate_input("sofa").is_ok());
        assert!(validate_input("").is_err());
        assert!(validate_input("   ").is_err());
        assert!(validate_input(&"x".repeat(100)).is_err());
        assert!(validate_input(&"x".repeat(99)).is_ok());
    }

    #[test]
    fn test_pending_guard_blocks_and_releases() {
        let pending = Mutex::new(HashSet::new());

        let guard = PendingGuard::acquire(&pending, "sofa").unwrap();
        assert!(PendingGuard::acquire(&pending, "sofa").is_none());
        assert!(PendingGuard::acquire(&pending, "chair").is_some());

        drop(guard);
        assert!(PendingGuard::acquire(&pending, "sofa").is_some());
    }

    #[tokio::test]
    async fn test_catalog_first_resolution() {
        let config = Config::minimal();
        let resolver = Resolver::new(&config);

        let item = resolver
            .resolve_with_catalog("chest freezer")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(item.source, Source::Catalog);
        assert_eq!(item.name, "Chest Freezer");
        assert_eq!(item.category, "appliances");
        assert!(item.weight >= 60.0 && item.weight <= 95.0);
        assert!(item.confidence >= 0.8);
        // Catalog hits never touch the lookup cache.
        assert_eq!(resolver.cache().len(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_cache() {
        let config = Config::minimal();
        let resolver = Resolver::new(&config);

        assert!(resolver.resolve("").await.is_err());
        assert!(resolver.resolve("   ").await.is_err());
        assert!(resolver.resolve(&"y".repeat(120)).await.is_err());
        assert_eq!(resolver.cache().len(), 0);
    }
}
