//! Lookup strategies and the ordered cascade they form.
//!
//! A [`LookupStrategy`] is one self-contained resolution technique with a
//! uniform signature: given the raw item text, it returns a [`LookupHit`]
//! or nothing. The resolver runs strategies in a fixed order and stops at
//! the first usable result, so every strategy can fail independently
//! without taking the pipeline down.
//!
//! Built-in order:
//! 1. [`BackendStrategy`] — the local content-extraction backend.
//! 2. [`EncyclopediaStrategy`] — title search + summary extraction against
//!    a MediaWiki-style API, over a few derived search terms.
//! 3. [`EstimateStrategy`] — pure heuristics; cannot fail, so the cascade
//!    always terminates with a result.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::LookupConfig;
use crate::estimate;
use crate::models::{Dimensions, LookupHit, Source};

/// One resolution technique in the cascade.
///
/// Implementations must treat their own failures as recoverable: returning
/// `Err` (network trouble, malformed payloads) or `Ok(None)` (nothing
/// usable) both mean "let the next strategy try".
#[async_trait]
pub trait LookupStrategy: Send + Sync {
    /// Short identifier used in diagnostics (e.g. `"backend"`).
    fn name(&self) -> &str;

    /// Which provenance tag results from this strategy carry.
    fn source(&self) -> Source;

    /// Attempt to resolve `text` into a raw hit.
    async fn lookup(&self, text: &str) -> Result<Option<LookupHit>>;
}

/// Build the standard cascade from configuration.
pub fn builtin_strategies(cfg: &LookupConfig) -> Vec<Box<dyn LookupStrategy>> {
    vec![
        Box::new(BackendStrategy::new(cfg)),
        Box::new(EncyclopediaStrategy::new(cfg)),
        Box::new(EstimateStrategy),
    ]
}

// ============ Backend strategy ============

/// Calls the local content-extraction backend: a single `POST` with the
/// item text, bounded by one fixed timeout.
pub struct BackendStrategy {
    url: String,
    timeout: Duration,
}

/// Wire shape of a backend response. Every field is optional — the backend
/// aggregates third-party sources and frequently returns partial data.
#[derive(Debug, Deserialize)]
struct BackendResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    dimensions: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    specifications: Option<serde_json::Value>,
}

impl BackendStrategy {
    pub fn new(cfg: &LookupConfig) -> Self {
        Self {
            url: cfg.backend_url.clone(),
            timeout: Duration::from_secs(cfg.backend_timeout_secs),
        }
    }
}

#[async_trait]
impl LookupStrategy for BackendStrategy {
    fn name(&self) -> &str {
        "backend"
    }

    fn source(&self) -> Source {
        Source::Backend
    }

    async fn lookup(&self, text: &str) -> Result<Option<LookupHit>> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let response = client
            .post(&self.url)
            .json(&serde_json::json!({ "itemText": text }))
            .send()
            .await
            .with_context(|| format!("backend request to {} failed", self.url))?
            .error_for_status()?;

        let body: BackendResponse = response
            .json()
            .await
            .context("backend returned a malformed body")?;

        // A usable backend answer needs at least a name and a positive weight.
        let usable = body.name.as_deref().is_some_and(|n| !n.trim().is_empty())
            && body.weight.is_some_and(|w| w > 0.0);
        if !usable {
            return Ok(None);
        }

        Ok(Some(LookupHit {
            name: body.name,
            weight: body.weight,
            dimensions: body.dimensions.as_deref().and_then(Dimensions::parse_label),
            category: body.category,
            confidence: body.confidence,
            source: Source::Backend,
            description: body.description,
            specifications: body.specifications,
        }))
    }
}

// ============ Encyclopedia strategy ============

/// Resolves via an encyclopedic summary service (MediaWiki API shape):
/// a title search followed by a plain-text summary extraction, repeated
/// over a few derived search terms until a summary is long enough to be
/// worth mining for figures.
pub struct EncyclopediaStrategy {
    api_base: String,
    search_timeout: Duration,
    extract_timeout: Duration,
    min_summary_len: usize,
}

impl EncyclopediaStrategy {
    pub fn new(cfg: &LookupConfig) -> Self {
        Self {
            api_base: cfg.encyclopedia_url.clone(),
            search_timeout: Duration::from_secs(cfg.encyclopedia_search_timeout_secs),
            extract_timeout: Duration::from_secs(cfg.encyclopedia_extract_timeout_secs),
            min_summary_len: cfg.min_summary_len,
        }
    }

    /// Search terms in decreasing specificity: the full phrase, each
    /// significant word, then the two-word prefix.
    fn derived_terms(text: &str) -> Vec<String> {
        let trimmed = text.trim();
        let mut terms = vec![trimmed.to_string()];

        let words: Vec<&str> = trimmed.split_whitespace().collect();
        for word in &words {
            if word.len() >= 4 {
                terms.push(word.to_string());
            }
        }
        if words.len() > 2 {
            terms.push(words[..2].join(" "));
        }

        terms.dedup();
        terms.truncate(4);
        terms
    }

    async fn search_title(&self, client: &reqwest::Client, term: &str) -> Result<Option<String>> {
        let response = client
            .get(&self.api_base)
            .query(&[
                ("action", "opensearch"),
                ("search", term),
                ("limit", "3"),
                ("namespace", "0"),
                ("format", "json"),
            ])
            .timeout(self.search_timeout)
            .send()
            .await?
            .error_for_status()?;

        let json: serde_json::Value = response.json().await?;

        // Opensearch returns [query, [titles], [descriptions], [urls]].
        let title = json
            .get(1)
            .and_then(|titles| titles.as_array())
            .and_then(|titles| titles.first())
            .and_then(|t| t.as_str())
            .map(|t| t.to_string());

        Ok(title)
    }

    async fn fetch_summary(&self, client: &reqwest::Client, title: &str) -> Result<Option<String>> {
        let response = client
            .get(&self.api_base)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "true"),
                ("explaintext", "true"),
                ("titles", title),
                ("format", "json"),
            ])
            .timeout(self.extract_timeout)
            .send()
            .await?
            .error_for_status()?;

        let json: serde_json::Value = response.json().await?;

        let summary = json
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(|pages| pages.as_object())
            .and_then(|pages| pages.values().next())
            .and_then(|page| page.get("extract"))
            .and_then(|e| e.as_str())
            .map(|e| e.to_string());

        Ok(summary)
    }
}

#[async_trait]
impl LookupStrategy for EncyclopediaStrategy {
    fn name(&self) -> &str {
        "encyclopedia"
    }

    fn source(&self) -> Source {
        Source::Encyclopedia
    }

    async fn lookup(&self, text: &str) -> Result<Option<LookupHit>> {
        let client = reqwest::Client::new();
        let mut last_err = None;

        for term in Self::derived_terms(text) {
            let summary = async {
                let title = self.search_title(&client, &term).await?;
                match title {
                    Some(t) => self.fetch_summary(&client, &t).await,
                    None => Ok(None),
                }
            }
            .await;

            let summary = match summary {
                Ok(Some(s)) if s.len() >= self.min_summary_len => s,
                Ok(_) => continue,
                Err(e) => {
                    last_err = Some(e);
                    continue;
                }
            };

            let lower = summary.to_lowercase();
            let weight = estimate::extract_weight(&lower);

            return Ok(Some(LookupHit {
                name: None,
                weight,
                dimensions: estimate::extract_dimensions(&lower),
                category: Some(estimate::categorize_with(text, Some(&summary)).to_string()),
                confidence: Some(if weight.is_some() { 0.9 } else { 0.75 }),
                source: Source::Encyclopedia,
                description: Some(truncate_summary(&summary, 150)),
                specifications: None,
            }));
        }

        match last_err {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}

/// Trim a summary to a display snippet, cutting on a char boundary.
fn truncate_summary(summary: &str, max_chars: usize) -> String {
    if summary.chars().count() <= max_chars {
        return summary.to_string();
    }
    let cut: String = summary.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

// ============ Estimator strategy ============

/// Terminal fallback: wraps the heuristic estimator, which always produces
/// a complete result.
pub struct EstimateStrategy;

#[async_trait]
impl LookupStrategy for EstimateStrategy {
    fn name(&self) -> &str {
        "estimate"
    }

    fn source(&self) -> Source {
        Source::Estimate
    }

    async fn lookup(&self, text: &str) -> Result<Option<LookupHit>> {
        let est = estimate::estimate(text, None);

        Ok(Some(LookupHit {
            name: None,
            weight: Some(est.weight),
            dimensions: Some(est.dimensions),
            category: Some(est.category.to_string()),
            confidence: Some(est.confidence),
            source: Source::Estimate,
            description: Some(format!("Estimated specifications for {}", text.trim())),
            specifications: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_terms_order() {
        let terms = EncyclopediaStrategy::derived_terms("double chest freezer");
        assert_eq!(
            terms,
            vec!["double chest freezer", "double", "chest", "freezer"]
        );
    }

    #[test]
    fn test_derived_terms_short_words_skipped() {
        let terms = EncyclopediaStrategy::derived_terms("big tv");
        assert_eq!(terms, vec!["big tv"]);
    }

    #[test]
    fn test_derived_terms_capped_at_four() {
        let terms = EncyclopediaStrategy::derived_terms("antique oak dining table set");
        assert_eq!(terms.len(), 4);
        assert_eq!(terms[0], "antique oak dining table set");
    }

    #[test]
    fn test_truncate_summary() {
        assert_eq!(truncate_summary("short", 10), "short");
        let long = "x".repeat(200);
        let cut = truncate_summary(&long, 150);
        assert_eq!(cut.chars().count(), 153); // 150 + "..."
    }

    #[tokio::test]
    async fn test_estimate_strategy_always_succeeds() {
        let hit = EstimateStrategy
            .lookup("mystery crate")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.source, Source::Estimate);
        assert!(hit.weight.unwrap() > 0.0);
        assert!(hit.dimensions.is_some());
    }
}
