//! Oil reference table and ideal quality ranges
//!
//! The table is built once at startup and handed to every calculation by
//! reference. Tests substitute their own small tables via [`OilTable::from_oils`].

use std::collections::HashMap;

use crate::error::CalcError;
use crate::models::{Oil, Qualities, QualityKey};

pub const COCONUT: &str = "coconut";
pub const OLIVE: &str = "olive";
pub const PALM: &str = "palm";
pub const SWEET_ALMOND: &str = "sweet_almond";
pub const AVOCADO: &str = "avocado";
pub const COCOA_BUTTER: &str = "cocoa_butter";

/// Immutable catalog of oils, indexed by id
#[derive(Debug, Clone)]
pub struct OilTable {
    oils: Vec<Oil>,
    index: HashMap<String, usize>,
}

impl OilTable {
    /// Build a table, rejecting duplicate ids
    pub fn from_oils(oils: Vec<Oil>) -> Result<Self, CalcError> {
        let mut index = HashMap::with_capacity(oils.len());
        for (i, oil) in oils.iter().enumerate() {
            if index.insert(oil.id.clone(), i).is_some() {
                return Err(CalcError::DuplicateOil(oil.id.clone()));
            }
        }
        Ok(Self { oils, index })
    }

    /// The built-in catalog
    pub fn standard() -> Self {
        let oils: Vec<Oil> = STANDARD_OILS
            .iter()
            .map(|row| Oil {
                id: row.id.to_string(),
                name: row.name.to_string(),
                description: row.description.to_string(),
                sap: row.sap,
                ins: row.ins,
                qualities: row.qualities,
                default_price: row.price,
            })
            .collect();
        // STANDARD_OILS ids are unique (test_standard_table_ids_unique)
        let index = oils
            .iter()
            .enumerate()
            .map(|(i, oil)| (oil.id.clone(), i))
            .collect();
        Self { oils, index }
    }

    pub fn get(&self, id: &str) -> Option<&Oil> {
        self.index.get(id).map(|&i| &self.oils[i])
    }

    /// Look up by id first, then by case-insensitive display name
    pub fn resolve(&self, id_or_name: &str) -> Option<&Oil> {
        self.get(id_or_name).or_else(|| {
            self.oils
                .iter()
                .find(|o| o.name.eq_ignore_ascii_case(id_or_name))
        })
    }

    pub fn oils(&self) -> &[Oil] {
        &self.oils
    }

    pub fn len(&self) -> usize {
        self.oils.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oils.is_empty()
    }
}

/// Inclusive ideal band for one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityRange {
    pub min: f64,
    pub max: f64,
}

impl QualityRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Ideal bands for every quality axis plus INS
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityRanges {
    pub hardness: QualityRange,
    pub cleansing: QualityRange,
    pub conditioning: QualityRange,
    pub bubbly: QualityRange,
    pub creamy: QualityRange,
    pub ins: QualityRange,
}

impl QualityRanges {
    pub fn get(&self, key: QualityKey) -> QualityRange {
        match key {
            QualityKey::Hardness => self.hardness,
            QualityKey::Cleansing => self.cleansing,
            QualityKey::Conditioning => self.conditioning,
            QualityKey::Bubbly => self.bubbly,
            QualityKey::Creamy => self.creamy,
        }
    }
}

impl Default for QualityRanges {
    fn default() -> Self {
        STANDARD_RANGES
    }
}

pub const STANDARD_RANGES: QualityRanges = QualityRanges {
    hardness: QualityRange::new(29.0, 54.0),
    cleansing: QualityRange::new(12.0, 22.0),
    conditioning: QualityRange::new(44.0, 69.0),
    bubbly: QualityRange::new(14.0, 46.0),
    creamy: QualityRange::new(16.0, 48.0),
    ins: QualityRange::new(120.0, 170.0),
};

struct OilRow {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    sap: f64,
    ins: f64,
    qualities: Qualities,
    price: Option<f64>,
}

// qualities: hardness, cleansing, conditioning, bubbly, creamy
const STANDARD_OILS: &[OilRow] = &[
    OilRow {
        id: COCONUT,
        name: "Coconut Oil",
        description: "Hard bar with big fluffy lather; drying above ~30%",
        sap: 0.190,
        ins: 258.0,
        qualities: Qualities::new(79.0, 67.0, 10.0, 67.0, 12.0),
        price: Some(30.0),
    },
    OilRow {
        id: OLIVE,
        name: "Olive Oil",
        description: "Mild and conditioning; slow to trace",
        sap: 0.135,
        ins: 109.0,
        qualities: Qualities::new(17.0, 0.0, 82.0, 0.0, 17.0),
        price: Some(60.0),
    },
    OilRow {
        id: PALM,
        name: "Palm Oil",
        description: "Hard, long-lasting bar with stable lather",
        sap: 0.141,
        ins: 145.0,
        qualities: Qualities::new(50.0, 1.0, 49.0, 1.0, 49.0),
        price: Some(25.0),
    },
    OilRow {
        id: "palm_kernel",
        name: "Palm Kernel Oil",
        description: "Similar to coconut, slightly milder",
        sap: 0.156,
        ins: 227.0,
        qualities: Qualities::new(70.0, 61.0, 26.0, 61.0, 9.0),
        price: Some(35.0),
    },
    OilRow {
        id: "castor",
        name: "Castor Oil",
        description: "Boosts and stabilises lather; keep under 10%",
        sap: 0.128,
        ins: 95.0,
        qualities: Qualities::new(0.0, 0.0, 98.0, 90.0, 90.0),
        price: Some(40.0),
    },
    OilRow {
        id: "shea_butter",
        name: "Shea Butter",
        description: "Creamy, conditioning butter",
        sap: 0.128,
        ins: 116.0,
        qualities: Qualities::new(45.0, 0.0, 54.0, 0.0, 45.0),
        price: Some(80.0),
    },
    OilRow {
        id: COCOA_BUTTER,
        name: "Cocoa Butter",
        description: "Very hard butter; small amounts firm the bar",
        sap: 0.137,
        ins: 157.0,
        qualities: Qualities::new(61.0, 0.0, 38.0, 0.0, 61.0),
        price: Some(150.0),
    },
    OilRow {
        id: "mango_butter",
        name: "Mango Butter",
        description: "Hard butter with a silky feel",
        sap: 0.137,
        ins: 146.0,
        qualities: Qualities::new(49.0, 0.0, 48.0, 0.0, 49.0),
        price: Some(140.0),
    },
    OilRow {
        id: SWEET_ALMOND,
        name: "Sweet Almond Oil",
        description: "Light, highly conditioning oil",
        sap: 0.136,
        ins: 97.0,
        qualities: Qualities::new(7.0, 0.0, 89.0, 0.0, 7.0),
        price: Some(90.0),
    },
    OilRow {
        id: AVOCADO,
        name: "Avocado Oil",
        description: "Rich, moisturising oil",
        sap: 0.133,
        ins: 99.0,
        qualities: Qualities::new(22.0, 0.0, 70.0, 0.0, 22.0),
        price: Some(120.0),
    },
    OilRow {
        id: "rice_bran",
        name: "Rice Bran Oil",
        description: "Conditioning with a little hardness",
        sap: 0.128,
        ins: 70.0,
        qualities: Qualities::new(25.0, 0.0, 70.0, 0.0, 25.0),
        price: Some(35.0),
    },
    OilRow {
        id: "sunflower",
        name: "Sunflower Oil",
        description: "Inexpensive conditioning oil; shortens shelf life",
        sap: 0.134,
        ins: 63.0,
        qualities: Qualities::new(11.0, 0.0, 87.0, 0.0, 11.0),
        price: Some(20.0),
    },
    OilRow {
        id: "canola",
        name: "Canola Oil",
        description: "Soft, conditioning oil",
        sap: 0.132,
        ins: 56.0,
        qualities: Qualities::new(6.0, 0.0, 91.0, 0.0, 6.0),
        price: Some(18.0),
    },
    OilRow {
        id: "babassu",
        name: "Babassu Oil",
        description: "Coconut substitute with a gentler feel",
        sap: 0.175,
        ins: 230.0,
        qualities: Qualities::new(50.0, 50.0, 30.0, 50.0, 0.0),
        price: Some(110.0),
    },
    OilRow {
        id: "lard",
        name: "Lard",
        description: "Traditional hard fat with creamy lather",
        sap: 0.138,
        ins: 139.0,
        qualities: Qualities::new(42.0, 1.0, 52.0, 1.0, 41.0),
        price: None,
    },
];
