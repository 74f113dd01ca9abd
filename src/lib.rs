//! Cold-process soap formulation calculator
//!
//! The engine modules (`calculator`, `ranges`, `advisor`, `preview`,
//! `personality`, `report`) are pure functions over a formulation and an
//! injected [`OilTable`]. `db`, `import` and `parse` adapt them to a host.

pub mod advisor;
pub mod calculator;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod oils;
pub mod parse;
pub mod personality;
pub mod preview;
pub mod ranges;
pub mod report;

pub use advisor::{ActionKind, Advice, Metric, SuggestedAction, advise, apply_action};
pub use calculator::{aggregate, cost_breakdown, water_for};
pub use error::CalcError;
pub use models::{
    Additive, AggregateResult, FormulaItem, Formulation, Oil, PriceOverrides, Qualities,
    QualityKey, SavedFormula,
};
pub use oils::{OilTable, QualityRange, QualityRanges};
pub use personality::{Personality, classify_personality};
pub use preview::{Hypothetical, preview};
pub use ranges::{RangeStatus, classify, classify_report};
pub use report::{Analysis, analyze};
