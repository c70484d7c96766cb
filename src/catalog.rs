//! The static reference catalog of household and moving items.
//!
//! The catalog is an ordered, read-only data set compiled into the binary
//! and loaded exactly once. Each entry carries authoritative weight and
//! dimension figures; volume and rank are derived at load time.

use std::sync::LazyLock;

use crate::models::CatalogItem;

/// Seed data: (name, weight kg, height cm, width cm, depth cm).
///
/// Order matters — it is the deterministic tiebreak for search results.
const CATALOG_DATA: &[(&str, f64, f64, f64, f64)] = &[
    // Beds and mattresses
    ("single bed & mattress", 35.0, 55.0, 190.0, 90.0),
    ("double bed & mattress", 55.0, 60.0, 200.0, 140.0),
    ("kingsize bed & mattress", 70.0, 60.0, 210.0, 160.0),
    ("single mattress", 12.0, 20.0, 190.0, 90.0),
    ("double mattress", 20.0, 25.0, 200.0, 140.0),
    ("kingsize mattress", 28.0, 30.0, 210.0, 160.0),
    // Sofas and seating
    ("two seater sofa", 45.0, 85.0, 150.0, 90.0),
    ("three seater sofa", 60.0, 85.0, 200.0, 95.0),
    ("four seater sofa", 80.0, 90.0, 240.0, 100.0),
    ("sofa bed", 65.0, 90.0, 160.0, 95.0),
    ("armchair", 30.0, 95.0, 85.0, 85.0),
    ("dining chair", 6.0, 90.0, 45.0, 50.0),
    ("office chair", 12.0, 100.0, 65.0, 65.0),
    // Tables and desks
    ("dining table", 35.0, 75.0, 160.0, 90.0),
    ("4 seater dining table", 30.0, 75.0, 120.0, 80.0),
    ("6 seater dining table", 45.0, 75.0, 180.0, 90.0),
    ("coffee table", 15.0, 45.0, 110.0, 60.0),
    ("round coffee table", 14.0, 45.0, 90.0, 90.0),
    ("glass coffee table", 22.0, 45.0, 110.0, 60.0),
    ("side table", 8.0, 55.0, 45.0, 45.0),
    ("bedside table", 10.0, 55.0, 45.0, 40.0),
    ("dressing table", 25.0, 75.0, 120.0, 45.0),
    ("garden table", 12.0, 72.0, 140.0, 85.0),
    ("desk", 25.0, 75.0, 120.0, 60.0),
    ("office desk", 35.0, 75.0, 160.0, 80.0),
    ("corner desk with pedestal", 45.0, 75.0, 160.0, 160.0),
    // Storage furniture
    ("single wardrobe", 40.0, 190.0, 60.0, 55.0),
    ("double wardrobe", 60.0, 200.0, 120.0, 60.0),
    ("triple wardrobe", 85.0, 210.0, 180.0, 60.0),
    ("chest of drawers", 35.0, 90.0, 80.0, 45.0),
    ("sideboard", 45.0, 85.0, 160.0, 45.0),
    ("bookcase", 30.0, 180.0, 90.0, 30.0),
    ("book shelf", 20.0, 120.0, 80.0, 25.0),
    ("filing cabinet", 40.0, 130.0, 40.0, 60.0),
    // Appliances
    ("fridge", 35.0, 85.0, 60.0, 65.0),
    ("fridge freezer", 70.0, 180.0, 60.0, 65.0),
    ("american fridge freezer", 120.0, 180.0, 90.0, 75.0),
    ("chest freezer", 65.0, 85.0, 140.0, 70.0),
    ("washing machine", 70.0, 85.0, 60.0, 60.0),
    ("tumble dryer", 40.0, 85.0, 60.0, 60.0),
    ("dishwasher", 45.0, 82.0, 60.0, 55.0),
    ("microwave oven", 12.0, 30.0, 50.0, 40.0),
    ("cooker", 50.0, 90.0, 60.0, 60.0),
    // Electronics
    ("small television/tv", 8.0, 49.0, 76.0, 17.0),
    ("medium television/tv", 15.0, 70.0, 109.0, 30.0),
    ("large television/tv", 25.0, 90.0, 140.0, 35.0),
    // Boxes, bags, and luggage
    ("large box", 12.0, 50.0, 60.0, 45.0),
    ("medium box", 8.0, 40.0, 45.0, 40.0),
    ("small box", 5.0, 30.0, 35.0, 30.0),
    ("large bag", 8.0, 60.0, 70.0, 35.0),
    ("small bag", 4.0, 35.0, 45.0, 25.0),
    ("shopping bags", 3.0, 35.0, 30.0, 20.0),
    ("suitcase", 12.0, 75.0, 50.0, 30.0),
    ("large suitcase", 18.0, 85.0, 55.0, 35.0),
    // Everything else movers see weekly
    ("bicycle", 15.0, 105.0, 175.0, 60.0),
    ("piano", 210.0, 110.0, 150.0, 60.0),
    ("treadmill", 85.0, 140.0, 180.0, 80.0),
    ("exercise bike", 45.0, 140.0, 110.0, 50.0),
    ("rug", 10.0, 15.0, 160.0, 30.0),
    ("mirror", 8.0, 120.0, 60.0, 5.0),
    ("washing basket", 2.0, 55.0, 45.0, 35.0),
    ("lamp", 4.0, 150.0, 30.0, 30.0),
    ("ironing board", 5.0, 160.0, 40.0, 10.0),
];

static BUILTIN: LazyLock<Catalog> = LazyLock::new(Catalog::from_seed);

/// The in-memory catalog. Owned by the matcher; read-only after load.
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// The compiled-in catalog, loaded on first access.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    fn from_seed() -> Self {
        let items = CATALOG_DATA
            .iter()
            .enumerate()
            .map(|(i, &(name, weight, height, width, depth))| {
                let volume = height * width * depth;
                CatalogItem {
                    id: (i + 1) as i64,
                    name: name.to_string(),
                    weight,
                    height,
                    width,
                    depth,
                    volume,
                    rank: (weight * 10.0 + volume / 1000.0).round() as i64,
                }
            })
            .collect();

        Catalog { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
