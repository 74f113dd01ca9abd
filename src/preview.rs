//! "What if" projections for a single hypothetical change
//!
//! A preview copies the formulation, applies one change to the copy and
//! aggregates it. The caller's formulation is only ever borrowed immutably.

use tracing::debug;

use crate::calculator::{aggregate, base_suggest_weight, entry_for};
use crate::models::{AggregateResult, FormulaItem, PriceOverrides, QualityKey};
use crate::oils::OilTable;

/// Weight assumed for an empty slot when previewing a replacement
pub const REPLACEMENT_DEFAULT_WEIGHT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Hypothetical {
    /// Swap the oil in one slot, keeping its weight
    Replace { slot: usize, oil_id: String },
    /// Add grams of an oil; `None` means the default suggestion size
    Add { oil_id: String, delta_g: Option<f64> },
    /// Remove grams of an oil, clamped at zero
    Reduce { oil_id: String, delta_g: f64 },
}

/// The formulation as it would look after the change
pub fn hypothetical_items(
    items: &[FormulaItem],
    change: &Hypothetical,
    table: &OilTable,
    prices: &PriceOverrides,
) -> Vec<FormulaItem> {
    let mut next = items.to_vec();

    match change {
        Hypothetical::Replace { slot, oil_id } => {
            if let Some(item) = next.get_mut(*slot) {
                item.oil_id = oil_id.clone();
                if item.weight == 0.0 || item.weight.is_nan() {
                    item.weight = REPLACEMENT_DEFAULT_WEIGHT;
                }
            }
        }
        Hypothetical::Add { oil_id, delta_g } => {
            let delta = delta_g.unwrap_or_else(|| {
                base_suggest_weight(aggregate(items, table, prices).total_weight)
            });
            match entry_for(&next, oil_id) {
                Some(i) => next[i].weight += delta,
                None if delta > 0.0 => next.push(FormulaItem::new(oil_id.clone(), delta)),
                None => {}
            }
        }
        Hypothetical::Reduce { oil_id, delta_g } => {
            if let Some(i) = entry_for(&next, oil_id) {
                next[i].weight = (next[i].weight - delta_g).max(0.0);
            }
        }
    }

    next
}

/// Aggregate the formulation as if `change` had been applied
pub fn preview(
    items: &[FormulaItem],
    change: &Hypothetical,
    table: &OilTable,
    prices: &PriceOverrides,
) -> AggregateResult {
    debug!(?change, "preview");
    aggregate(&hypothetical_items(items, change, table, prices), table, prices)
}

/// Movement of every metric between two aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDelta {
    pub total_weight: f64,
    pub total_naoh: f64,
    pub avg_ins: f64,
    pub total_cost: f64,
    pub qualities: Vec<(QualityKey, f64)>,
}

pub fn compare(before: &AggregateResult, after: &AggregateResult) -> PreviewDelta {
    PreviewDelta {
        total_weight: after.total_weight - before.total_weight,
        total_naoh: after.total_naoh - before.total_naoh,
        avg_ins: after.avg_ins - before.avg_ins,
        total_cost: after.total_cost - before.total_cost,
        qualities: QualityKey::ALL
            .iter()
            .map(|&key| (key, after.qualities.get(key) - before.qualities.get(key)))
            .collect(),
    }
}
