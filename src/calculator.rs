//! Formulation aggregation logic
//!
//! Turns a list of (oil, grams) entries into totals, weighted-average
//! qualities, INS, lye demand and cost. Everything here is a pure function of
//! its arguments; entries with a non-positive weight or an oil id the table
//! does not know are skipped rather than reported.

use crate::models::{AggregateResult, FormulaItem, Oil, PriceOverrides, Qualities, QualityKey};
use crate::oils::OilTable;

pub const DEFAULT_WATER_RATIO: f64 = 2.3;
pub const MIN_WATER_RATIO: f64 = 1.0;
pub const MAX_WATER_RATIO: f64 = 5.0;

/// Smallest amount an "add" suggestion will propose
pub const MIN_SUGGEST_WEIGHT: f64 = 50.0;

/// Round to the nearest whole number, halves away from zero
pub fn round0(value: f64) -> f64 {
    value.round()
}

/// Round to one decimal place, halves away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Price per kilogram after applying overrides; missing everywhere means free
pub fn price_per_kg(oil: &Oil, prices: &PriceOverrides) -> f64 {
    prices
        .get(&oil.id)
        .copied()
        .or(oil.default_price)
        .unwrap_or(0.0)
}

/// Resolve the entries that take part in aggregation
fn contributing<'a>(
    items: &'a [FormulaItem],
    table: &'a OilTable,
) -> impl Iterator<Item = (&'a FormulaItem, &'a Oil)> + 'a {
    items
        .iter()
        .filter(|item| item.weight > 0.0)
        .filter_map(move |item| table.get(&item.oil_id).map(|oil| (item, oil)))
}

/// Aggregate a formulation into totals and weighted averages
pub fn aggregate(items: &[FormulaItem], table: &OilTable, prices: &PriceOverrides) -> AggregateResult {
    let mut total_weight = 0.0;
    let mut total_naoh = 0.0;
    let mut ins_sum = 0.0;
    let mut total_cost = 0.0;
    let mut quality_sums = Qualities::default();

    for (item, oil) in contributing(items, table) {
        let w = item.weight;
        total_weight += w;
        total_naoh += w * oil.sap;
        ins_sum += w * oil.ins;
        total_cost += w * (price_per_kg(oil, prices) / 1000.0);
        for key in QualityKey::ALL {
            *quality_sums.get_mut(key) += w * oil.qualities.get(key);
        }
    }

    if total_weight <= 0.0 {
        return AggregateResult::default();
    }

    let mut qualities = Qualities::default();
    for key in QualityKey::ALL {
        *qualities.get_mut(key) = round0(quality_sums.get(key) / total_weight);
    }

    AggregateResult {
        total_weight,
        total_naoh,
        avg_ins: round1(ins_sum / total_weight),
        qualities,
        total_cost,
    }
}

/// Water for the lye solution: lye (rounded to 0.1 g) times the ratio, rounded to 0.1 g
pub fn water_for(total_naoh: f64, water_ratio: f64) -> f64 {
    round1(round1(total_naoh) * water_ratio)
}

/// Default increment for "add" suggestions: 10% of the batch, never below 50 g
pub fn base_suggest_weight(total_weight: f64) -> f64 {
    MIN_SUGGEST_WEIGHT.max(round0(total_weight * 0.10))
}

/// Per-entry cost and share of the batch
#[derive(Debug, Clone, PartialEq)]
pub struct CostLine {
    pub oil_id: String,
    pub oil_name: String,
    pub weight: f64,
    /// Percent of total oil weight
    pub share: f64,
    pub price_per_kg: f64,
    pub cost: f64,
    pub naoh: f64,
}

/// Break the formulation down line by line, in formulation order
pub fn cost_breakdown(items: &[FormulaItem], table: &OilTable, prices: &PriceOverrides) -> Vec<CostLine> {
    let total_weight: f64 = contributing(items, table).map(|(item, _)| item.weight).sum();

    contributing(items, table)
        .map(|(item, oil)| {
            let price = price_per_kg(oil, prices);
            CostLine {
                oil_id: oil.id.clone(),
                oil_name: oil.name.clone(),
                weight: item.weight,
                share: if total_weight > 0.0 {
                    item.weight / total_weight * 100.0
                } else {
                    0.0
                },
                price_per_kg: price,
                cost: item.weight * price / 1000.0,
                naoh: item.weight * oil.sap,
            }
        })
        .collect()
}

/// Total positive weight of one oil across all entries
pub fn weight_of(items: &[FormulaItem], oil_id: &str) -> f64 {
    items
        .iter()
        .filter(|item| item.oil_id == oil_id && item.weight > 0.0)
        .map(|item| item.weight)
        .sum()
}

/// Index of the entry that edits to an oil land on: the first one carrying
/// weight, else the first one at all
pub fn entry_for(items: &[FormulaItem], oil_id: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.oil_id == oil_id && item.weight > 0.0)
        .or_else(|| items.iter().position(|item| item.oil_id == oil_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table() -> OilTable {
        OilTable::standard()
    }

    #[test]
    fn test_aggregate_empty() {
        let result = aggregate(&[], &table(), &PriceOverrides::new());
        assert_eq!(result, AggregateResult::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_aggregate_single_oil() {
        let items = vec![FormulaItem::new("coconut", 100.0)];
        let result = aggregate(&items, &table(), &PriceOverrides::new());

        assert_relative_eq!(result.total_weight, 100.0);
        assert_relative_eq!(result.total_naoh, 19.0, epsilon = 1e-9);
        assert_eq!(result.avg_ins, 258.0);
        assert_eq!(result.qualities.hardness, 79.0);
        assert_eq!(result.qualities.cleansing, 67.0);
        // 100 g at 30/kg
        assert_relative_eq!(result.total_cost, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_aggregate_weighted_average() {
        let items = vec![
            FormulaItem::new("coconut", 100.0),
            FormulaItem::new("olive", 100.0),
        ];
        let result = aggregate(&items, &table(), &PriceOverrides::new());

        assert_eq!(result.avg_ins, 183.5);
        assert_eq!(result.qualities.hardness, 48.0);
        assert_relative_eq!(result.total_naoh, 32.5, epsilon = 1e-9);
    }

    #[test]
    fn test_aggregate_skips_unresolved_and_non_positive() {
        let base = vec![
            FormulaItem::new("coconut", 100.0),
            FormulaItem::new("olive", 300.0),
        ];
        let noisy = vec![
            FormulaItem::new("coconut", 100.0),
            FormulaItem::new("olive", 0.0),
            FormulaItem::new("unicorn_tallow", 500.0),
            FormulaItem::new("olive", 300.0),
            FormulaItem::new("palm", -40.0),
        ];
        let prices = PriceOverrides::new();

        assert_eq!(
            aggregate(&base, &table(), &prices),
            aggregate(&noisy, &table(), &prices)
        );
    }

    #[test]
    fn test_aggregate_order_independent() {
        let a = vec![
            FormulaItem::new("palm", 120.0),
            FormulaItem::new("castor", 30.0),
            FormulaItem::new("olive", 250.0),
        ];
        let mut b = a.clone();
        b.reverse();
        let prices = PriceOverrides::new();
        let ra = aggregate(&a, &table(), &prices);
        let rb = aggregate(&b, &table(), &prices);

        assert_eq!(ra.qualities, rb.qualities);
        assert_eq!(ra.avg_ins, rb.avg_ins);
        assert_relative_eq!(ra.total_naoh, rb.total_naoh, epsilon = 1e-9);
    }

    #[test]
    fn test_price_override_and_missing_price() {
        let mut prices = PriceOverrides::new();
        prices.insert("olive".to_string(), 100.0);
        let items = vec![
            FormulaItem::new("olive", 500.0),
            FormulaItem::new("lard", 500.0),
        ];
        let result = aggregate(&items, &table(), &prices);

        // olive overridden to 100/kg, lard has no default price
        assert_relative_eq!(result.total_cost, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round0(47.5), 48.0);
        assert_eq!(round0(-47.5), -48.0);
        assert_eq!(round1(0.25), 0.3);
        assert_eq!(round1(183.5), 183.5);
        assert_eq!(round1(0.04), 0.0);
    }

    #[test]
    fn test_water_for() {
        assert_eq!(water_for(19.0, DEFAULT_WATER_RATIO), 43.7);
        assert_eq!(water_for(32.5, 2.0), 65.0);
        assert_eq!(water_for(19.04, 2.0), 38.0);
        assert_eq!(water_for(0.0, DEFAULT_WATER_RATIO), 0.0);
    }

    #[test]
    fn test_base_suggest_weight() {
        assert_eq!(base_suggest_weight(0.0), 50.0);
        assert_eq!(base_suggest_weight(400.0), 50.0);
        assert_eq!(base_suggest_weight(1000.0), 100.0);
        assert_eq!(base_suggest_weight(1234.0), 123.0);
    }

    #[test]
    fn test_cost_breakdown_shares() {
        let items = vec![
            FormulaItem::new("olive", 300.0),
            FormulaItem::new("nothing", 50.0),
            FormulaItem::new("coconut", 100.0),
        ];
        let lines = cost_breakdown(&items, &table(), &PriceOverrides::new());

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].oil_id, "olive");
        assert_relative_eq!(lines[0].share, 75.0);
        assert_relative_eq!(lines[1].share, 25.0);
        assert_relative_eq!(lines[0].cost, 18.0, epsilon = 1e-9);
    }

    #[test]
    fn test_weight_of_sums_duplicates() {
        let items = vec![
            FormulaItem::new("coconut", 40.0),
            FormulaItem::new("olive", 100.0),
            FormulaItem::new("coconut", 30.0),
            FormulaItem::new("coconut", -5.0),
        ];
        assert_eq!(weight_of(&items, "coconut"), 70.0);
        assert_eq!(weight_of(&items, "palm"), 0.0);
    }

    #[test]
    fn test_entry_for_skips_empty_rows() {
        let items = vec![
            FormulaItem::new("coconut", 0.0),
            FormulaItem::new("olive", 100.0),
            FormulaItem::new("coconut", 200.0),
            FormulaItem::new("palm", 0.0),
        ];
        assert_eq!(entry_for(&items, "coconut"), Some(2));
        assert_eq!(entry_for(&items, "olive"), Some(1));
        assert_eq!(entry_for(&items, "palm"), Some(3));
        assert_eq!(entry_for(&items, "castor"), None);
    }
}
