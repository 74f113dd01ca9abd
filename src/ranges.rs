//! Classification of computed values against their ideal bands

use std::fmt;

use crate::models::{AggregateResult, Oil, QualityKey};
use crate::oils::{OilTable, QualityRange, QualityRanges};

/// Minimum coefficient for an oil to count as a strong supplier of an axis
pub const RECOMMEND_THRESHOLD: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStatus {
    /// Zero, which is what an empty formulation aggregates to
    None,
    Low,
    High,
    Ideal,
}

impl RangeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RangeStatus::None => "-",
            RangeStatus::Low => "low",
            RangeStatus::High => "high",
            RangeStatus::Ideal => "ideal",
        }
    }
}

impl fmt::Display for RangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Place a value relative to an inclusive band
pub fn classify(value: f64, range: QualityRange) -> RangeStatus {
    if value == 0.0 {
        RangeStatus::None
    } else if value < range.min {
        RangeStatus::Low
    } else if value > range.max {
        RangeStatus::High
    } else {
        RangeStatus::Ideal
    }
}

/// Status of every metric of one aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub qualities: Vec<(QualityKey, f64, RangeStatus)>,
    pub ins: RangeStatus,
}

impl QualityReport {
    pub fn status(&self, key: QualityKey) -> RangeStatus {
        self.qualities
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, _, status)| *status)
            .unwrap_or(RangeStatus::None)
    }

    pub fn all_ideal(&self) -> bool {
        self.ins == RangeStatus::Ideal
            && self
                .qualities
                .iter()
                .all(|(_, _, status)| *status == RangeStatus::Ideal)
    }
}

pub fn classify_report(result: &AggregateResult, ranges: &QualityRanges) -> QualityReport {
    let qualities = QualityKey::ALL
        .iter()
        .map(|&key| {
            let value = result.qualities.get(key);
            (key, value, classify(value, ranges.get(key)))
        })
        .collect();

    QualityReport {
        qualities,
        ins: classify(result.avg_ins, ranges.ins),
    }
}

/// Axes that fall below their band in a non-empty formulation
pub fn lacking_keys(result: &AggregateResult, ranges: &QualityRanges) -> Vec<QualityKey> {
    if result.is_empty() {
        return Vec::new();
    }
    QualityKey::ALL
        .into_iter()
        .filter(|&key| result.qualities.get(key) < ranges.get(key).min)
        .collect()
}

/// Oils that strongly supply at least one lacking axis, in table order
pub fn recommended_oils<'a>(table: &'a OilTable, lacking: &[QualityKey]) -> Vec<&'a Oil> {
    table
        .oils()
        .iter()
        .filter(|oil| {
            lacking
                .iter()
                .any(|&key| oil.qualities.get(key) >= RECOMMEND_THRESHOLD)
        })
        .collect()
}
