//! Catalog search: a strict-to-loose matching cascade.
//!
//! Each strategy only runs when every stricter one produced nothing:
//! exact name → substring → synonym/variant table → token overlap →
//! "did you mean" suggestions. Matching never fails; an unmatchable query
//! yields an empty result list plus (at most) a handful of suggestions
//! that share real character evidence with the query.

use std::collections::HashSet;

use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::{Config, MatcherConfig};
use crate::models::CatalogItem;

/// Inclusive numeric filters applied after text matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchFilters {
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub min_volume: Option<f64>,
    pub max_volume: Option<f64>,
}

impl SearchFilters {
    fn accepts(&self, item: &CatalogItem) -> bool {
        if let Some(min) = self.min_weight {
            if item.weight < min {
                return false;
            }
        }
        if let Some(max) = self.max_weight {
            if item.weight > max {
                return false;
            }
        }
        if let Some(min) = self.min_volume {
            if item.volume < min {
                return false;
            }
        }
        if let Some(max) = self.max_volume {
            if item.volume > max {
                return false;
            }
        }
        true
    }
}

/// Matches plus optional "did you mean" suggestions.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub matches: Vec<CatalogItem>,
    pub suggestions: Vec<String>,
}

/// Synonym/variant table: common phrasing → catalog name fragments.
///
/// Each fragment is substring-matched against catalog names. Phrasings that
/// already substring-match a catalog name directly are handled by the
/// earlier cascade stages and deliberately do not appear here.
const VARIANTS: &[(&str, &[&str])] = &[
    ("couch", &["sofa"]),
    ("settee", &["sofa"]),
    ("closet", &["wardrobe"]),
    ("cupboard", &["wardrobe"]),
    ("refrigerator", &["fridge"]),
    ("washer", &["washing machine"]),
    ("dryer", &["tumble dryer"]),
    ("carpet", &["rug"]),
    ("push bike", &["bicycle"]),
    ("spin bike", &["exercise bike"]),
    ("bookshelf", &["bookcase", "book shelf"]),
    ("telly", &["television"]),
    ("king size", &["kingsize"]),
    ("king bed", &["kingsize bed & mattress"]),
    ("king size bed", &["kingsize bed & mattress"]),
];

/// Search the catalog for `query` with the cascade described in the module
/// docs, then apply `filters` and the display cap.
pub fn search_catalog(
    catalog: &Catalog,
    query: &str,
    filters: &SearchFilters,
    cfg: &MatcherConfig,
) -> SearchOutcome {
    let normalized = query.trim().to_lowercase();
    let items = catalog.items();

    if normalized.is_empty() {
        // Blank query lists the whole catalog, still filtered and capped.
        let matches = items
            .iter()
            .filter(|item| filters.accepts(item))
            .take(cfg.match_limit)
            .cloned()
            .collect();
        return SearchOutcome {
            matches,
            suggestions: Vec::new(),
        };
    }

    let mut found: Vec<usize> = exact_matches(items, &normalized);

    if found.is_empty() {
        found = substring_matches(items, &normalized);
    }
    if found.is_empty() {
        found = variant_matches(items, &normalized);
    }
    if found.is_empty() {
        found = token_overlap_matches(items, &normalized, cfg.token_overlap_ratio);
    }

    let suggestions = if found.is_empty() && normalized.len() >= 3 {
        suggest(items, &normalized, cfg)
    } else {
        Vec::new()
    };

    sort_by_relevance(items, &mut found, &normalized);

    let matches = found
        .into_iter()
        .map(|i| &items[i])
        .filter(|item| filters.accepts(item))
        .take(cfg.match_limit)
        .cloned()
        .collect();

    SearchOutcome {
        matches,
        suggestions,
    }
}

fn exact_matches(items: &[CatalogItem], normalized: &str) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.name == normalized)
        .map(|(i, _)| i)
        .collect()
}

fn substring_matches(items: &[CatalogItem], normalized: &str) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.name.contains(normalized) || normalized.contains(&item.name))
        .map(|(i, _)| i)
        .collect()
}

fn variant_matches(items: &[CatalogItem], normalized: &str) -> Vec<usize> {
    let Some((_, fragments)) = VARIANTS.iter().find(|(key, _)| *key == normalized) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for fragment in *fragments {
        for (i, item) in items.iter().enumerate() {
            if (item.name == *fragment || item.name.contains(fragment)) && seen.insert(i) {
                found.push(i);
            }
        }
    }

    found
}

/// Word-by-word matching: the fraction of query words that overlap some
/// item word (either direction of containment) must reach the configured
/// ratio.
fn token_overlap_matches(items: &[CatalogItem], normalized: &str, min_ratio: f64) -> Vec<usize> {
    let query_words: Vec<&str> = normalized
        .split_whitespace()
        .filter(|w| w.len() > 1)
        .collect();

    if query_words.is_empty() {
        return Vec::new();
    }

    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            let item_words: Vec<&str> = item.name.split_whitespace().collect();
            let matched = query_words
                .iter()
                .filter(|qw| {
                    item_words
                        .iter()
                        .any(|iw| iw.contains(*qw) || qw.contains(iw))
                })
                .count();
            matched as f64 / query_words.len() as f64 >= min_ratio
        })
        .map(|(i, _)| i)
        .collect()
}

/// Relevance order: exact name, name containing the query, name starting
/// with the query, shorter names first, catalog order as the final tiebreak.
fn sort_by_relevance(items: &[CatalogItem], found: &mut [usize], normalized: &str) {
    found.sort_by(|&a, &b| {
        let an = &items[a].name;
        let bn = &items[b].name;

        let key = |name: &str, idx: usize| {
            (
                name != normalized,
                !name.contains(normalized),
                !name.starts_with(normalized),
                name.len(),
                idx,
            )
        };

        key(an, a).cmp(&key(bn, b))
    });
}

// ============ Suggestions ============

struct SuggestionCandidate {
    index: usize,
    score: u32,
    fuzzy: bool,
}

/// Generate at most `max_suggestions` "did you mean" strings.
///
/// An item qualifies through character-overlap evidence (shared prefixes,
/// substring containment) or through a bounded fuzzy-distance pass that
/// still demands prefix evidence — so suggestions always share visible
/// text with the query, never arbitrary catalog rows.
fn suggest(items: &[CatalogItem], normalized: &str, cfg: &MatcherConfig) -> Vec<String> {
    let query_words: Vec<&str> = normalized
        .split_whitespace()
        .filter(|w| w.len() >= 3)
        .collect();

    if query_words.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<SuggestionCandidate> = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let score = overlap_score(&item.name, &query_words);
        let fuzzy = fuzzy_evidence(&item.name, normalized, &query_words, cfg.fuzzy_cutoff);

        if score >= cfg.suggestion_min_score || fuzzy {
            candidates.push(SuggestionCandidate {
                index: i,
                score,
                fuzzy,
            });
        }
    }

    // Items the fuzzy pass also vouched for come first.
    candidates.sort_by(|a, b| {
        b.fuzzy
            .cmp(&a.fuzzy)
            .then(b.score.cmp(&a.score))
            .then(a.index.cmp(&b.index))
    });

    candidates
        .into_iter()
        .take(cfg.max_suggestions)
        .map(|c| items[c.index].name.clone())
        .collect()
}

/// Character-overlap relevance between one catalog name and the query words.
fn overlap_score(name: &str, query_words: &[&str]) -> u32 {
    let mut score = 0u32;

    for qw in query_words {
        for iw in name.split_whitespace() {
            let mut overlap = common_prefix_len(qw, iw) as u32;

            if iw.contains(qw) || qw.contains(iw) {
                overlap += 2;
            }

            let min_len = qw.len().min(iw.len());
            if overlap >= 3 || (overlap >= 2 && min_len <= 4) {
                score += overlap;
            }
        }
    }

    score
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

/// Bounded fuzzy-distance check with a prefix-evidence requirement: the
/// name must both be similar enough overall and actually contain the first
/// letters of some query word.
fn fuzzy_evidence(name: &str, normalized: &str, query_words: &[&str], cutoff: f64) -> bool {
    if strsim::jaro_winkler(name, normalized) < cutoff {
        return false;
    }

    query_words.iter().any(|qw| {
        let prefix: String = qw.chars().take(3).collect();
        name.contains(&prefix)
    })
}

// ============ CLI entry point ============

/// Run a catalog search and print the results.
pub fn run_search(config: &Config, query: &str, filters: &SearchFilters) -> Result<()> {
    let outcome = search_catalog(Catalog::builtin(), query, filters, &config.matcher);

    if outcome.matches.is_empty() {
        println!("No matches.");
        if !outcome.suggestions.is_empty() {
            println!("Did you mean: {}?", outcome.suggestions.join(", "));
        }
        return Ok(());
    }

    for (i, item) in outcome.matches.iter().enumerate() {
        println!(
            "{}. {} — {:.1} kg, {} ({:.0} cm³)",
            i + 1,
            item.name,
            item.weight,
            item.dimensions().label(),
            item.volume
        );
    }
    println!();
    println!("{} match(es).", outcome.matches.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatcherConfig;

    fn cfg() -> MatcherConfig {
        MatcherConfig::default()
    }

    fn search(query: &str) -> SearchOutcome {
        search_catalog(
            Catalog::builtin(),
            query,
            &SearchFilters::default(),
            &cfg(),
        )
    }

    #[test]
    fn test_exact_match_is_sole_top_result() {
        let outcome = search("chest freezer");
        assert_eq!(outcome.matches[0].name, "chest freezer");
        assert!(outcome.suggestions.is_empty());
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let outcome = search("  Chest FREEZER ");
        assert_eq!(outcome.matches[0].name, "chest freezer");
    }

    #[test]
    fn test_substring_match() {
        let outcome = search("wardrobe");
        assert!(!outcome.matches.is_empty());
        assert!(outcome.matches.iter().all(|m| m.name.contains("wardrobe")));
    }

    #[test]
    fn test_variant_match_couch() {
        let outcome = search("couch");
        assert!(!outcome.matches.is_empty());
        assert!(outcome.matches.iter().all(|m| m.name.contains("sofa")));
    }

    #[test]
    fn test_variant_match_push_bike() {
        let outcome = search("push bike");
        let names: Vec<&str> = outcome.matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["bicycle"]);
    }

    #[test]
    fn test_token_overlap_match() {
        // "leather three seater" → 2 of 3 words overlap "three seater sofa"
        let outcome = search("leather three seater");
        assert!(outcome
            .matches
            .iter()
            .any(|m| m.name == "three seater sofa"));
    }

    #[test]
    fn test_gibberish_yields_no_matches_and_bounded_suggestions() {
        let outcome = search("xqzvtk");
        assert!(outcome.matches.is_empty());
        assert!(outcome.suggestions.len() <= 3);
    }

    #[test]
    fn test_suggestions_share_evidence_with_query() {
        let outcome = search("freezr");
        assert!(outcome.matches.is_empty());
        assert!(!outcome.suggestions.is_empty());
        for s in &outcome.suggestions {
            assert!(s.contains("fre"), "no shared evidence in {:?}", s);
        }
    }

    #[test]
    fn test_no_suggestions_for_short_queries() {
        let outcome = search("xq");
        assert!(outcome.matches.is_empty());
        assert!(outcome.suggestions.is_empty());
    }

    #[test]
    fn test_exact_match_preempts_substring_matches() {
        // "fridge" is itself a catalog name, so the looser stages never run.
        let outcome = search("fridge");
        let names: Vec<&str> = outcome.matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["fridge"]);
    }

    #[test]
    fn test_ordering_shorter_names_first() {
        let outcome = search("freezer");
        let names: Vec<&str> = outcome.matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["chest freezer", "fridge freezer", "american fridge freezer"]
        );
    }

    #[test]
    fn test_filters_are_inclusive() {
        let filters = SearchFilters {
            min_weight: Some(65.0),
            max_weight: Some(65.0),
            ..Default::default()
        };
        let outcome = search_catalog(Catalog::builtin(), "chest freezer", &filters, &cfg());
        assert_eq!(outcome.matches.len(), 1);

        let filters = SearchFilters {
            max_weight: Some(64.9),
            ..Default::default()
        };
        let outcome = search_catalog(Catalog::builtin(), "chest freezer", &filters, &cfg());
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_blank_query_lists_catalog_capped() {
        let outcome = search("");
        assert!(!outcome.matches.is_empty());
        assert!(outcome.matches.len() <= cfg().match_limit);
        assert!(outcome.suggestions.is_empty());
    }

    #[test]
    fn test_match_cap_applies() {
        let mut small = cfg();
        small.match_limit = 2;
        let outcome = search_catalog(
            Catalog::builtin(),
            "table",
            &SearchFilters::default(),
            &small,
        );
        assert!(outcome.matches.len() <= 2);
    }

    #[test]
    fn test_deterministic_results() {
        let a = search("table");
        let b = search("table");
        let names = |o: &SearchOutcome| {
            o.matches
                .iter()
                .map(|m| m.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&a), names(&b));
    }
}
