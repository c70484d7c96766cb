//! Core data models used throughout Haulkit.
//!
//! These types represent the catalog entries, lookup results, and inventory
//! records that flow through the resolution pipeline and the inventory store.

use serde::{Deserialize, Serialize};

/// A three-dimensional size in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: f64,
    pub width: f64,
    pub depth: f64,
}

impl Dimensions {
    pub fn new(height: f64, width: f64, depth: f64) -> Self {
        Self {
            height,
            width,
            depth,
        }
    }

    /// Volume in cubic centimeters.
    pub fn volume(&self) -> f64 {
        self.height * self.width * self.depth
    }

    /// Scale each axis independently, rounding to whole centimeters.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            height: (self.height * factor).round(),
            width: (self.width * factor).round(),
            depth: (self.depth * factor).round(),
        }
    }

    /// Display label in the `H×W×Dcm` form used by the backend wire format.
    pub fn label(&self) -> String {
        format!("{}×{}×{}cm", self.height, self.width, self.depth)
    }

    /// Parse an `H×W×Dcm` label (`×` or `x` separators, optional unit suffix).
    ///
    /// This is the inverse of [`label`](Dimensions::label) and is used for
    /// the `dimensions` field of backend responses. Free prose is handled
    /// separately by the estimator's extraction.
    pub fn parse_label(s: &str) -> Option<Self> {
        let mut parts = s
            .trim()
            .trim_end_matches("cm")
            .split(['x', '×'])
            .map(|p| p.trim().parse::<f64>());

        let height = parts.next()?.ok()?;
        let width = parts.next()?.ok()?;
        let depth = parts.next()?.ok()?;

        if height <= 0.0 || width <= 0.0 || depth <= 0.0 {
            return None;
        }

        Some(Self {
            height,
            width,
            depth,
        })
    }
}

/// One entry in the static reference catalog.
///
/// Immutable after load; `volume` and `rank` are derived at load time.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    /// Weight in kilograms.
    pub weight: f64,
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    /// Cubic centimeters (height × width × depth).
    pub volume: f64,
    /// Opaque ordering value used for display sorting.
    pub rank: i64,
}

impl CatalogItem {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.height, self.width, self.depth)
    }
}

/// Which resolution strategy produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Matched against the static catalog.
    Catalog,
    /// Returned by the content-extraction backend.
    Backend,
    /// Derived from an encyclopedic summary.
    Encyclopedia,
    /// Synthesized from surface heuristics alone.
    Estimate,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Catalog => "catalog",
            Source::Backend => "backend",
            Source::Encyclopedia => "encyclopedia",
            Source::Estimate => "estimate",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalog" => Ok(Source::Catalog),
            "backend" => Ok(Source::Backend),
            "encyclopedia" => Ok(Source::Encyclopedia),
            "estimate" => Ok(Source::Estimate),
            other => anyhow::bail!("unknown source tag: {}", other),
        }
    }
}

/// Raw result produced by a lookup strategy before normalization.
///
/// Fields a strategy could not determine are left `None`; the resolver
/// backfills them from the estimator before caching.
#[derive(Debug, Clone)]
pub struct LookupHit {
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub category: Option<String>,
    pub confidence: Option<f64>,
    pub source: Source,
    pub description: Option<String>,
    pub specifications: Option<serde_json::Value>,
}

/// Normalized lookup result stored in the cache.
///
/// This is the [`ResolvedItem`] shape without an id: ids are assigned per
/// resolution, while the cached value is shared across repeat requests for
/// the same normalized text.
#[derive(Debug, Clone, Serialize)]
pub struct LookupOutcome {
    pub name: String,
    pub weight: f64,
    pub dimensions: Dimensions,
    pub category: String,
    pub confidence: f64,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<serde_json::Value>,
}

/// The pipeline's universal output: a fully resolved item record.
///
/// Created once per successful resolution and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedItem {
    pub id: i64,
    pub name: String,
    pub weight: f64,
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub volume: f64,
    pub rank: i64,
    pub category: String,
    pub confidence: f64,
    pub source: Source,
    pub original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<serde_json::Value>,
}

impl ResolvedItem {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.height, self.width, self.depth)
    }
}

/// A persisted inventory entry: an item snapshot plus bookkeeping fields.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryRecord {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub volume: f64,
    pub category: String,
    pub source: Source,
    pub confidence: Option<f64>,
    pub quantity: i64,
    pub location: String,
    pub notes: Option<String>,
    pub added_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_volume() {
        let d = Dimensions::new(10.0, 20.0, 30.0);
        assert_eq!(d.volume(), 6000.0);
    }

    #[test]
    fn test_dimensions_label_roundtrip() {
        let d = Dimensions::new(140.0, 70.0, 85.0);
        let parsed = Dimensions::parse_label(&d.label()).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn test_parse_label_ascii_x() {
        let d = Dimensions::parse_label("120x80x75cm").unwrap();
        assert_eq!(d.height, 120.0);
        assert_eq!(d.width, 80.0);
        assert_eq!(d.depth, 75.0);
    }

    #[test]
    fn test_parse_label_rejects_garbage() {
        assert!(Dimensions::parse_label("Variable").is_none());
        assert!(Dimensions::parse_label("120x80").is_none());
        assert!(Dimensions::parse_label("0x80x75cm").is_none());
    }

    #[test]
    fn test_dimensions_scaled_rounds() {
        let d = Dimensions::new(75.0, 140.0, 80.0).scaled(1.4);
        assert_eq!(d.height, 105.0);
        assert_eq!(d.width, 196.0);
        assert_eq!(d.depth, 112.0);
    }

    #[test]
    fn test_source_tags() {
        assert_eq!(Source::Catalog.as_str(), "catalog");
        assert_eq!("estimate".parse::<Source>().unwrap(), Source::Estimate);
        assert!("wiki".parse::<Source>().is_err());
    }
}
