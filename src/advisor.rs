//! Rule-based diagnosis of a formulation with concrete fixes
//!
//! Rules are checked in a fixed order and each may contribute one
//! [`Advice`]. Every advice carries the gram adjustments that would move the
//! formulation towards its ideal band.

use std::fmt;

use tracing::debug;

use crate::calculator::{base_suggest_weight, entry_for, weight_of};
use crate::models::{AggregateResult, FormulaItem, QualityKey};
use crate::oils::{
    AVOCADO, COCOA_BUTTER, COCONUT, OLIVE, OilTable, PALM, QualityRanges, SWEET_ALMOND,
};

/// An oil above this many grams is a candidate for reduction
pub const REDUCE_THRESHOLD: f64 = 50.0;
/// Grams removed by a reduction suggestion
pub const REDUCE_AMOUNT: f64 = 50.0;
/// Grams of hard butter suggested alongside a hardness fix
pub const BUTTER_TOP_UP: f64 = 30.0;

/// What a piece of advice is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Ins,
    Quality(QualityKey),
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Ins => f.write_str("INS"),
            Metric::Quality(key) => write!(f, "{key}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Add,
    Reduce,
}

/// Add or remove a number of grams of one oil
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedAction {
    pub oil_id: String,
    pub oil_name: String,
    pub delta_g: f64,
    pub kind: ActionKind,
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            ActionKind::Add => "add",
            ActionKind::Reduce => "reduce",
        };
        write!(f, "{} {:.0}g {}", verb, self.delta_g, self.oil_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub message: String,
    pub metric: Metric,
    pub actions: Vec<SuggestedAction>,
}

fn suggest(table: &OilTable, oil_id: &str, delta_g: f64, kind: ActionKind) -> Option<SuggestedAction> {
    table.get(oil_id).map(|oil| SuggestedAction {
        oil_id: oil.id.clone(),
        oil_name: oil.name.clone(),
        delta_g,
        kind,
    })
}

/// Suggest a reduction only when the oil is present in a meaningful amount
fn suggest_reduction(table: &OilTable, items: &[FormulaItem], oil_id: &str) -> Option<SuggestedAction> {
    if weight_of(items, oil_id) > REDUCE_THRESHOLD {
        suggest(table, oil_id, REDUCE_AMOUNT, ActionKind::Reduce)
    } else {
        None
    }
}

/// Diagnose a formulation. Returns nothing for an empty one.
pub fn advise(
    result: &AggregateResult,
    items: &[FormulaItem],
    table: &OilTable,
    ranges: &QualityRanges,
) -> Vec<Advice> {
    let mut advice = Vec::new();
    if result.avg_ins <= 0.0 {
        return advice;
    }

    let base = base_suggest_weight(result.total_weight);
    let q = &result.qualities;

    if result.avg_ins < ranges.ins.min {
        advice.push(Advice {
            message: format!(
                "INS {:.1} is below {:.0}: the bar will be soft and slow to unmould",
                result.avg_ins, ranges.ins.min
            ),
            metric: Metric::Ins,
            actions: [
                suggest(table, COCONUT, base, ActionKind::Add),
                suggest(table, PALM, base, ActionKind::Add),
            ]
            .into_iter()
            .flatten()
            .collect(),
        });
    }

    if result.avg_ins > ranges.ins.max {
        advice.push(Advice {
            message: format!(
                "INS {:.1} is above {:.0}: the bar may be brittle and crack",
                result.avg_ins, ranges.ins.max
            ),
            metric: Metric::Ins,
            actions: [
                suggest(table, OLIVE, base, ActionKind::Add),
                suggest_reduction(table, items, COCONUT),
            ]
            .into_iter()
            .flatten()
            .collect(),
        });
    }

    let cleansing = ranges.get(QualityKey::Cleansing);
    if q.cleansing > cleansing.max {
        advice.push(Advice {
            message: format!(
                "Cleansing {:.0} is above {:.0}: the soap may strip and dry the skin",
                q.cleansing, cleansing.max
            ),
            metric: Metric::Quality(QualityKey::Cleansing),
            actions: [
                suggest(table, SWEET_ALMOND, base, ActionKind::Add),
                suggest_reduction(table, items, COCONUT),
            ]
            .into_iter()
            .flatten()
            .collect(),
        });
    }

    let conditioning = ranges.get(QualityKey::Conditioning);
    if q.conditioning < conditioning.min {
        advice.push(Advice {
            message: format!(
                "Conditioning {:.0} is below {:.0}: not moisturising enough",
                q.conditioning, conditioning.min
            ),
            metric: Metric::Quality(QualityKey::Conditioning),
            actions: [
                suggest(table, OLIVE, base, ActionKind::Add),
                suggest(table, AVOCADO, base, ActionKind::Add),
            ]
            .into_iter()
            .flatten()
            .collect(),
        });
    }

    let hardness = ranges.get(QualityKey::Hardness);
    if q.hardness < hardness.min {
        advice.push(Advice {
            message: format!(
                "Hardness {:.0} is below {:.0}: the bar will be soft and wear quickly",
                q.hardness, hardness.min
            ),
            metric: Metric::Quality(QualityKey::Hardness),
            actions: [
                suggest(table, PALM, base, ActionKind::Add),
                suggest(table, COCOA_BUTTER, BUTTER_TOP_UP, ActionKind::Add),
            ]
            .into_iter()
            .flatten()
            .collect(),
        });
    }

    debug!(count = advice.len(), "advisory pass complete");
    advice
}

/// Apply a suggestion to the working formulation.
///
/// Changes land on the first entry for the oil that carries weight, falling
/// back to its first entry; an add with no entry appends one. Reductions
/// clamp at zero and drop the entry once it reaches zero. An oil the table
/// cannot resolve leaves the formulation untouched.
pub fn apply_action(items: &mut Vec<FormulaItem>, action: &SuggestedAction, table: &OilTable) {
    let Some(oil) = table
        .resolve(&action.oil_id)
        .or_else(|| table.resolve(&action.oil_name))
    else {
        debug!(oil = %action.oil_id, "ignoring suggestion for unknown oil");
        return;
    };

    match (action.kind, entry_for(items, &oil.id)) {
        (ActionKind::Add, Some(i)) => items[i].weight += action.delta_g,
        (ActionKind::Add, None) => {
            if action.delta_g > 0.0 {
                items.push(FormulaItem::new(oil.id.clone(), action.delta_g));
            }
        }
        (ActionKind::Reduce, Some(i)) => {
            let remaining = (items[i].weight - action.delta_g).max(0.0);
            if remaining == 0.0 {
                items.remove(i);
            } else {
                items[i].weight = remaining;
            }
        }
        (ActionKind::Reduce, None) => {}
    }
}
