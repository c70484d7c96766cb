//! Surface-heuristic estimation of item specifications.
//!
//! The estimator derives a plausible weight, size, and category from nothing
//! but the input text (plus any prose an external strategy happened to
//! fetch). It is the pipeline's terminal fallback and must always succeed —
//! there is deliberately no error path in this module.
//!
//! Estimation order for weight:
//! 1. Explicit figure extracted from prose or the text itself ("weighs 42 kg").
//! 2. Category base weight × size words × material words.
//! 3. Named heavy-item floors (a piano never comes out under 180 kg).
//! 4. Absolute clamp to a sane range.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Dimensions;

/// Kilograms per pound.
const LB_TO_KG: f64 = 0.453592;

/// Raw extracted figures outside this range are treated as noise.
const EXTRACT_MIN: f64 = 0.5;
const EXTRACT_MAX: f64 = 5000.0;

/// Absolute bounds for computed (non-extracted) weights.
const WEIGHT_FLOOR: f64 = 0.5;
const WEIGHT_CEIL: f64 = 1000.0;

/// Category trigger words, checked in order; first hit wins.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "furniture",
        &[
            "table", "chair", "bed", "sofa", "couch", "cabinet", "wardrobe", "desk", "shelf",
            "drawers", "bookcase", "sideboard",
        ],
    ),
    (
        "appliances",
        &[
            "fridge",
            "freezer",
            "washer",
            "washing machine",
            "dryer",
            "dishwasher",
            "oven",
            "microwave",
            "cooker",
        ],
    ),
    (
        "electronics",
        &[
            "tv", "television", "computer", "laptop", "monitor", "speaker", "phone", "console",
        ],
    ),
    (
        "exercise",
        &[
            "bike",
            "treadmill",
            "weights",
            "bench",
            "elliptical",
            "rowing machine",
            "dumbbell",
        ],
    ),
    (
        "musical",
        &[
            "music",
            "instrument",
            "piano",
            "guitar",
            "drum",
            "keyboard",
            "violin",
        ],
    ),
    (
        "tools",
        &[
            "tool",
            "saw",
            "drill",
            "hammer",
            "screwdriver",
            "workbench",
            "compressor",
            "generator",
        ],
    ),
    (
        "outdoor",
        &[
            "bbq",
            "barbecue",
            "grill",
            "trampoline",
            "shed",
            "greenhouse",
            "gazebo",
            "hot tub",
        ],
    ),
];

/// Canonical dimensions for item types the movers see constantly.
/// Multi-word entries come first so "exercise bike" is not swallowed by a
/// shorter key.
const ITEM_DIMENSIONS: &[(&str, Dimensions)] = &[
    ("exercise bike", dims(140.0, 110.0, 50.0)),
    ("washing machine", dims(85.0, 60.0, 60.0)),
    ("treadmill", dims(140.0, 180.0, 80.0)),
    ("dishwasher", dims(82.0, 60.0, 55.0)),
    ("wardrobe", dims(200.0, 120.0, 60.0)),
    ("cabinet", dims(180.0, 120.0, 60.0)),
    ("piano", dims(110.0, 150.0, 60.0)),
    ("freezer", dims(140.0, 70.0, 85.0)),
    ("fridge", dims(180.0, 60.0, 65.0)),
    ("table", dims(75.0, 140.0, 80.0)),
    ("chair", dims(90.0, 60.0, 50.0)),
    ("sofa", dims(85.0, 180.0, 90.0)),
    ("bed", dims(50.0, 200.0, 140.0)),
    ("tv", dims(70.0, 109.0, 30.0)),
];

/// Size words, substring-matched like the rest of the keyword tables.
const LARGE_WORDS: &[&str] = &["large", "big", "huge", "massive", "giant"];
const SMALL_WORDS: &[&str] = &["small", "mini", "compact", "tiny", "little"];
const DOUBLE_WORDS: &[&str] = &["double", "king"];

const fn dims(height: f64, width: f64, depth: f64) -> Dimensions {
    Dimensions {
        height,
        width,
        depth,
    }
}

static WEIGHT_KG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:(?:weighs?|weight|mass)[\s:]*(?:about|around|approximately|roughly)?\s*)?(\d+(?:\.\d+)?)\s*(?:kg|kilograms?)\b",
    )
    .unwrap()
});

static WEIGHT_LB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:(?:weighs?|weight|mass)[\s:]*(?:about|around|approximately|roughly)?\s*)?(\d+(?:\.\d+)?)\s*(?:lbs?|pounds?)\b",
    )
    .unwrap()
});

static DIMENSION_TRIPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*[x×]\s*(\d+(?:\.\d+)?)\s*[x×]\s*(\d+(?:\.\d+)?)\s*(?:cm|centimeters?)?",
    )
    .unwrap()
});

/// A complete heuristic estimate for one input text.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub weight: f64,
    pub dimensions: Dimensions,
    pub category: &'static str,
    pub confidence: f64,
    /// True when the weight came out of the prose rather than the tables.
    pub weight_extracted: bool,
}

/// Produce an estimate for `text`, optionally informed by fetched prose.
///
/// Always succeeds; the worst case is the generic category defaults.
pub fn estimate(text: &str, prose: Option<&str>) -> Estimate {
    let lower = text.to_lowercase();
    let category = categorize_with_prose(&lower, prose);

    let extracted = prose
        .and_then(extract_weight)
        .or_else(|| extract_weight(&lower));

    let weight = match extracted {
        Some(w) => w,
        None => heuristic_weight(&lower, category),
    };

    let dimensions = prose
        .and_then(extract_dimensions)
        .unwrap_or_else(|| heuristic_dimensions(&lower, category));

    Estimate {
        weight,
        dimensions,
        category,
        confidence: if extracted.is_some() { 0.9 } else { 0.65 },
        weight_extracted: extracted.is_some(),
    }
}

/// Detect a category from the input text alone; "misc" when nothing matches.
pub fn categorize(text: &str) -> &'static str {
    categorize_with(text, None)
}

/// Detect a category from the input text, falling back to prose, then "misc".
pub fn categorize_with(text: &str, prose: Option<&str>) -> &'static str {
    categorize_with_prose(&text.to_lowercase(), prose)
}

fn categorize_with_prose(lower_text: &str, prose: Option<&str>) -> &'static str {
    if let Some(cat) = category_of(lower_text) {
        return cat;
    }
    if let Some(p) = prose {
        if let Some(cat) = category_of(&p.to_lowercase()) {
            return cat;
        }
    }
    "misc"
}

fn category_of(lower: &str) -> Option<&'static str> {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(name, _)| *name)
}

/// Extract an explicit weight figure from prose, normalized to whole kilograms.
///
/// Kilogram phrasings are preferred over pound phrasings. Raw figures outside
/// a plausible range are discarded so shipping-code noise ("item 90001 kg
/// zone") does not leak through.
pub fn extract_weight(text: &str) -> Option<f64> {
    if let Some(caps) = WEIGHT_KG.captures(text) {
        if let Ok(value) = caps[1].parse::<f64>() {
            if (EXTRACT_MIN..=EXTRACT_MAX).contains(&value) {
                return Some(value.round());
            }
        }
    }

    if let Some(caps) = WEIGHT_LB.captures(text) {
        if let Ok(value) = caps[1].parse::<f64>() {
            if (EXTRACT_MIN..=EXTRACT_MAX).contains(&value) {
                return Some((value * LB_TO_KG).round());
            }
        }
    }

    None
}

/// Extract an explicit `W×D×H` dimension triple from prose.
///
/// The original listings write dimensions width-first, so the triple is
/// assigned (width, depth, height) in match order.
pub fn extract_dimensions(text: &str) -> Option<Dimensions> {
    let caps = DIMENSION_TRIPLE.captures(text)?;

    let width = caps[1].parse::<f64>().ok()?;
    let depth = caps[2].parse::<f64>().ok()?;
    let height = caps[3].parse::<f64>().ok()?;

    if width <= 0.0 || depth <= 0.0 || height <= 0.0 {
        return None;
    }

    Some(Dimensions {
        height,
        width,
        depth,
    })
}

/// Table-driven weight: category base × size words × material words,
/// with named heavy-item floors and an absolute clamp.
fn heuristic_weight(lower: &str, category: &str) -> f64 {
    let mut weight = base_weight(category);

    weight *= weight_size_multiplier(lower);
    weight *= material_multiplier(lower);
    weight = heavy_item_floor(lower, weight);

    let clamped = weight.clamp(WEIGHT_FLOOR, WEIGHT_CEIL);
    (clamped * 100.0).round() / 100.0
}

fn base_weight(category: &str) -> f64 {
    match category {
        "furniture" => 35.0,
        "appliances" => 80.0,
        "electronics" => 20.0,
        "exercise" => 50.0,
        "musical" => 40.0,
        "tools" => 15.0,
        "outdoor" => 45.0,
        _ => 20.0,
    }
}

fn weight_size_multiplier(lower: &str) -> f64 {
    let mut factor = 1.0;
    if LARGE_WORDS.iter().any(|w| lower.contains(w)) {
        factor *= 1.5;
    }
    if SMALL_WORDS.iter().any(|w| lower.contains(w)) {
        factor *= 0.6;
    }
    if DOUBLE_WORDS.iter().any(|w| lower.contains(w)) {
        factor *= 1.4;
    }
    factor
}

fn material_multiplier(lower: &str) -> f64 {
    if lower.contains("metal") || lower.contains("steel") || lower.contains("iron") {
        1.8
    } else if lower.contains("wood") || lower.contains("wooden") {
        1.2
    } else if lower.contains("plastic") || lower.contains("lightweight") {
        0.7
    } else if lower.contains("glass") {
        1.4
    } else {
        1.0
    }
}

/// Known heavy items enforce a minimum regardless of the computed value.
fn heavy_item_floor(lower: &str, weight: f64) -> f64 {
    const FLOORS: &[(&str, f64)] = &[
        ("pool table", 300.0),
        ("hot tub", 400.0),
        ("piano", 180.0),
        ("safe", 120.0),
        ("treadmill", 85.0),
        ("freezer", 65.0),
        ("exercise bike", 45.0),
    ];

    FLOORS
        .iter()
        .filter(|(name, _)| lower.contains(name))
        .fold(weight, |w, (_, floor)| w.max(*floor))
}

/// Table-driven dimensions: known item types, then category defaults,
/// scaled by the size words.
fn heuristic_dimensions(lower: &str, category: &str) -> Dimensions {
    let base = ITEM_DIMENSIONS
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, d)| *d)
        .unwrap_or_else(|| category_dimensions(category));

    base.scaled(dimension_size_multiplier(lower))
}

fn category_dimensions(category: &str) -> Dimensions {
    match category {
        "furniture" => dims(80.0, 120.0, 60.0),
        "appliances" => dims(150.0, 60.0, 60.0),
        "electronics" => dims(50.0, 80.0, 30.0),
        "exercise" => dims(120.0, 150.0, 70.0),
        "musical" => dims(110.0, 150.0, 60.0),
        "tools" => dims(60.0, 50.0, 40.0),
        "outdoor" => dims(120.0, 150.0, 80.0),
        _ => dims(80.0, 80.0, 60.0),
    }
}

/// Dimensions use gentler factors than weight — doubling a label from
/// "box" to "large box" does not double its footprint.
fn dimension_size_multiplier(lower: &str) -> f64 {
    if LARGE_WORDS.iter().any(|w| lower.contains(w)) {
        1.4
    } else if SMALL_WORDS.iter().any(|w| lower.contains(w)) {
        0.7
    } else if DOUBLE_WORDS.iter().any(|w| lower.contains(w)) {
        1.3
    } else {
        1.0
    }
}

/// Uppercase the first letter of each word, for display names.
pub fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_weight_kg() {
        assert_eq!(extract_weight("This item weighs 42 kg"), Some(42.0));
        assert_eq!(extract_weight("weight: 12.5 kilograms"), Some(13.0));
        assert_eq!(extract_weight("a 70 kg washing machine"), Some(70.0));
    }

    #[test]
    fn test_extract_weight_pounds_converted() {
        // 10 lb × 0.453592 = 4.53592 → 5 kg
        assert_eq!(extract_weight("weighs 10 lbs"), Some(5.0));
        assert_eq!(extract_weight("about 100 pounds"), Some(45.0));
    }

    #[test]
    fn test_extract_weight_prefers_kg_over_lb() {
        assert_eq!(extract_weight("200 lb frame, ships at 42 kg"), Some(42.0));
    }

    #[test]
    fn test_extract_weight_range_gate() {
        assert_eq!(extract_weight("weighs 0.2 kg"), None);
        assert_eq!(extract_weight("weighs 9000 kg"), None);
        assert_eq!(extract_weight("no figures here"), None);
    }

    #[test]
    fn test_extract_dimensions_triple_preserved() {
        let d = extract_dimensions("spec sheet says 120x80x75cm overall").unwrap();
        let mut values = [d.height, d.width, d.depth];
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(values, [75.0, 80.0, 120.0]);
    }

    #[test]
    fn test_extract_dimensions_unicode_times() {
        let d = extract_dimensions("140 × 70 × 85 cm").unwrap();
        assert_eq!((d.width, d.depth, d.height), (140.0, 70.0, 85.0));
    }

    #[test]
    fn test_categorize() {
        assert_eq!(categorize("chest freezer"), "appliances");
        assert_eq!(categorize("three seater sofa"), "furniture");
        assert_eq!(categorize("upright piano"), "musical");
        assert_eq!(categorize("exercise bike"), "exercise");
        assert_eq!(categorize("mystery crate"), "misc");
    }

    #[test]
    fn test_estimate_freezer_hits_floor() {
        let est = estimate("chest freezer", None);
        assert_eq!(est.category, "appliances");
        assert!(est.weight >= 65.0 && est.weight <= 95.0, "{}", est.weight);
        assert!(!est.weight_extracted);
        assert!((est.confidence - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_piano_floor_beats_multipliers() {
        let est = estimate("small plastic piano", None);
        assert!(est.weight >= 180.0);
    }

    #[test]
    fn test_estimate_size_and_material_multipliers() {
        // furniture base 35 × large 1.5 × metal 1.8 = 94.5
        let est = estimate("large metal table", None);
        assert!((est.weight - 94.5).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_uses_prose_weight() {
        let est = estimate("mystery crate", Some("The crate weighs 42 kg."));
        assert_eq!(est.weight, 42.0);
        assert!(est.weight_extracted);
        assert!((est.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_dimensions_from_item_table() {
        let est = estimate("treadmill", None);
        assert_eq!(
            (est.dimensions.height, est.dimensions.width, est.dimensions.depth),
            (140.0, 180.0, 80.0)
        );
    }

    #[test]
    fn test_estimate_small_scales_dimensions() {
        let base = estimate("bookcase shelf", None).dimensions;
        let small = estimate("small bookcase shelf", None).dimensions;
        assert!(small.height < base.height);
        assert!(small.width < base.width);
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("chest freezer"), "Chest Freezer");
        assert_eq!(capitalize_words("  two  seater sofa "), "Two Seater Sofa");
    }
}
