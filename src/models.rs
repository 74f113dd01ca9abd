//! Data models for oils, formulations and derived results

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five quality axes describing finished-soap behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityKey {
    Hardness,
    Cleansing,
    Conditioning,
    Bubbly,
    Creamy,
}

impl QualityKey {
    pub const ALL: [QualityKey; 5] = [
        QualityKey::Hardness,
        QualityKey::Cleansing,
        QualityKey::Conditioning,
        QualityKey::Bubbly,
        QualityKey::Creamy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QualityKey::Hardness => "Hardness",
            QualityKey::Cleansing => "Cleansing",
            QualityKey::Conditioning => "Conditioning",
            QualityKey::Bubbly => "Bubbly",
            QualityKey::Creamy => "Creamy",
        }
    }
}

impl fmt::Display for QualityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value on every quality axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Qualities {
    pub hardness: f64,
    pub cleansing: f64,
    pub conditioning: f64,
    pub bubbly: f64,
    pub creamy: f64,
}

impl Qualities {
    pub const fn new(hardness: f64, cleansing: f64, conditioning: f64, bubbly: f64, creamy: f64) -> Self {
        Self {
            hardness,
            cleansing,
            conditioning,
            bubbly,
            creamy,
        }
    }

    pub fn get(&self, key: QualityKey) -> f64 {
        match key {
            QualityKey::Hardness => self.hardness,
            QualityKey::Cleansing => self.cleansing,
            QualityKey::Conditioning => self.conditioning,
            QualityKey::Bubbly => self.bubbly,
            QualityKey::Creamy => self.creamy,
        }
    }

    pub fn get_mut(&mut self, key: QualityKey) -> &mut f64 {
        match key {
            QualityKey::Hardness => &mut self.hardness,
            QualityKey::Cleansing => &mut self.cleansing,
            QualityKey::Conditioning => &mut self.conditioning,
            QualityKey::Bubbly => &mut self.bubbly,
            QualityKey::Creamy => &mut self.creamy,
        }
    }
}

/// A saponifiable oil or butter from the reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Oil {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Grams of NaOH per gram of oil
    pub sap: f64,
    pub ins: f64,
    pub qualities: Qualities,
    /// Reference price per kilogram
    pub default_price: Option<f64>,
}

/// One line of a formulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaItem {
    pub oil_id: String,
    /// Grams. Zero or negative while editing; only positive weights count.
    pub weight: f64,
}

impl FormulaItem {
    pub fn new(oil_id: impl Into<String>, weight: f64) -> Self {
        Self {
            oil_id: oil_id.into(),
            weight,
        }
    }
}

/// Non-oil ingredient carried along with a formulation (fragrance, colorant, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Additive {
    pub name: String,
    #[serde(default)]
    pub weight: f64,
}

/// Custom price per kilogram keyed by oil id
pub type PriceOverrides = HashMap<String, f64>;

/// Everything derived from a formulation in one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub total_weight: f64,
    pub total_naoh: f64,
    /// Rounded to one decimal
    pub avg_ins: f64,
    /// Each axis rounded to a whole number
    pub qualities: Qualities,
    pub total_cost: f64,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.total_weight <= 0.0
    }
}

/// A recipe the user saved for later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFormula {
    pub id: String,
    pub name: String,
    pub items: Vec<FormulaItem>,
    #[serde(default)]
    pub additives: Vec<Additive>,
    pub water_ratio: f64,
    /// Unix milliseconds
    pub timestamp: i64,
}

/// The active working formulation as persisted by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formulation {
    pub items: Vec<FormulaItem>,
    #[serde(default)]
    pub additives: Vec<Additive>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_get_mut_matches_get() {
        let mut q = Qualities::default();
        for (i, key) in QualityKey::ALL.iter().enumerate() {
            *q.get_mut(*key) = i as f64 + 1.0;
        }
        assert_eq!(q, Qualities::new(1.0, 2.0, 3.0, 4.0, 5.0));
        assert_eq!(q.get(QualityKey::Bubbly), 4.0);
    }

    #[test]
    fn test_formula_item_serializes_camel_case() {
        let json = serde_json::to_string(&FormulaItem::new("olive", 250.0)).unwrap();
        assert_eq!(json, r#"{"oilId":"olive","weight":250.0}"#);
    }

    #[test]
    fn test_formulation_without_additives_deserializes() {
        let f: Formulation = serde_json::from_str(r#"{"items":[{"oilId":"palm","weight":10}]}"#).unwrap();
        assert_eq!(f.items, vec![FormulaItem::new("palm", 10.0)]);
        assert!(f.additives.is_empty());
    }
}
