//! Full derivation pipeline and its printable form
//!
//! [`analyze`] runs aggregate, classify and advise in one go. The host calls
//! it again after every change to the formulation, prices or water ratio.

use std::fmt;

use tracing::debug;

use crate::advisor::{Advice, advise};
use crate::calculator::{CostLine, aggregate, cost_breakdown, round1, water_for};
use crate::models::{AggregateResult, FormulaItem, PriceOverrides};
use crate::oils::{OilTable, QualityRanges};
use crate::personality::{Personality, classify_personality};
use crate::ranges::{QualityReport, RangeStatus, classify_report};

/// Everything the host displays for one formulation
#[derive(Debug, Clone)]
pub struct Analysis {
    pub aggregate: AggregateResult,
    pub report: QualityReport,
    pub advice: Vec<Advice>,
    pub personality: Option<Personality>,
    pub lines: Vec<CostLine>,
    pub water_ratio: f64,
    pub water: f64,
    pub ranges: QualityRanges,
}

pub fn analyze(
    items: &[FormulaItem],
    table: &OilTable,
    prices: &PriceOverrides,
    ranges: &QualityRanges,
    water_ratio: f64,
) -> Analysis {
    let aggregate = aggregate(items, table, prices);
    let report = classify_report(&aggregate, ranges);
    let advice = advise(&aggregate, items, table, ranges);
    let personality = classify_personality(&aggregate, ranges);
    debug!(
        total_weight = aggregate.total_weight,
        avg_ins = aggregate.avg_ins,
        advice = advice.len(),
        "recomputed formulation"
    );

    Analysis {
        aggregate,
        report,
        advice,
        personality,
        lines: cost_breakdown(items, table, prices),
        water_ratio,
        water: water_for(aggregate.total_naoh, water_ratio),
        ranges: *ranges,
    }
}

impl Analysis {
    /// Lye, water and oils together
    pub fn batch_weight(&self) -> f64 {
        self.aggregate.total_weight + round1(self.aggregate.total_naoh) + self.water
    }

    /// One-line status for list views
    pub fn headline(&self) -> String {
        match self.personality {
            None => "empty formulation".to_string(),
            Some(p) => format!(
                "{:.0}g oils, INS {:.1} ({}), {}",
                self.aggregate.total_weight, self.aggregate.avg_ins, self.report.ins, p
            ),
        }
    }
}

fn marker(status: RangeStatus) -> &'static str {
    match status {
        RangeStatus::Ideal => "ok",
        RangeStatus::Low => "v ",
        RangeStatus::High => "^ ",
        RangeStatus::None => "  ",
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agg = &self.aggregate;

        writeln!(f, "=== Soap Formulation ===")?;
        if self.lines.is_empty() {
            writeln!(f, "No oils with a positive weight.")?;
            return Ok(());
        }

        writeln!(
            f,
            "{:<22} {:>9} {:>7} {:>9} {:>9}",
            "Oil", "Weight", "%", "NaOH", "Cost"
        )?;
        writeln!(f, "{}", "-".repeat(60))?;
        for line in &self.lines {
            writeln!(
                f,
                "{:<22} {:>8.1}g {:>6.1}% {:>8.2}g {:>9.2}",
                line.oil_name, line.weight, line.share, line.naoh, line.cost
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Production:")?;
        writeln!(f, "  Oils:   {:>8.1}g", agg.total_weight)?;
        writeln!(f, "  NaOH:   {:>8.1}g", round1(agg.total_naoh))?;
        writeln!(f, "  Water:  {:>8.1}g (ratio {:.1})", self.water, self.water_ratio)?;
        writeln!(f, "  Batch:  {:>8.1}g", self.batch_weight())?;
        writeln!(f, "  Cost:   {:>8.2}", agg.total_cost)?;
        writeln!(f)?;

        writeln!(f, "Qualities:")?;
        for (key, value, status) in &self.report.qualities {
            let range = self.ranges.get(*key);
            writeln!(
                f,
                "  {} {:<14} {:>4.0}   ({:.0}-{:.0})",
                marker(*status),
                key.label(),
                value,
                range.min,
                range.max
            )?;
        }
        writeln!(
            f,
            "  {} {:<14} {:>6.1} ({:.0}-{:.0})",
            marker(self.report.ins),
            "INS",
            agg.avg_ins,
            self.ranges.ins.min,
            self.ranges.ins.max
        )?;
        writeln!(f)?;

        if let Some(p) = self.personality {
            writeln!(f, "Character: {}", p)?;
            writeln!(f, "  {}", p.description())?;
            writeln!(f)?;
        }

        if self.advice.is_empty() && self.report.all_ideal() {
            writeln!(f, "All metrics within their ideal ranges.")?;
        } else if self.advice.is_empty() {
            writeln!(f, "No adjustments suggested.")?;
        } else {
            writeln!(f, "Suggestions:")?;
            for (i, advice) in self.advice.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, advice.message)?;
                for (j, action) in advice.actions.iter().enumerate() {
                    writeln!(f, "     {}.{} {}", i + 1, j + 1, action)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::DEFAULT_WATER_RATIO;
    use crate::oils::QualityRange;
    use approx::assert_relative_eq;

    fn run(items: &[FormulaItem]) -> Analysis {
        analyze(
            items,
            &OilTable::standard(),
            &PriceOverrides::new(),
            &QualityRanges::default(),
            DEFAULT_WATER_RATIO,
        )
    }

    #[test]
    fn test_analyze_pipeline() {
        let analysis = run(&[
            FormulaItem::new("coconut", 100.0),
            FormulaItem::new("olive", 100.0),
        ]);

        assert_eq!(analysis.aggregate.avg_ins, 183.5);
        assert_eq!(analysis.report.ins, RangeStatus::High);
        assert_eq!(analysis.lines.len(), 2);
        assert_eq!(analysis.water, water_for(analysis.aggregate.total_naoh, DEFAULT_WATER_RATIO));
        assert!(!analysis.advice.is_empty());
        assert!(analysis.personality.is_some());
    }

    #[test]
    fn test_batch_weight() {
        let analysis = run(&[FormulaItem::new("coconut", 100.0)]);
        // 100 oils + 19.0 lye + 43.7 water
        assert_relative_eq!(analysis.batch_weight(), 162.7, epsilon = 1e-9);
    }

    #[test]
    fn test_report_rendering() {
        let text = run(&[
            FormulaItem::new("olive", 300.0),
            FormulaItem::new("coconut", 100.0),
            FormulaItem::new("palm", 100.0),
        ])
        .to_string();

        assert!(text.contains("Olive Oil"));
        assert!(text.contains("NaOH:"));
        assert!(text.contains("INS"));
        assert!(text.contains("Character:"));
    }

    #[test]
    fn test_report_all_ideal() {
        let wide = QualityRange::new(1.0, 1000.0);
        let ranges = QualityRanges {
            hardness: wide,
            cleansing: wide,
            conditioning: wide,
            bubbly: wide,
            creamy: wide,
            ins: wide,
        };
        let analysis = analyze(
            &[
                FormulaItem::new("coconut", 100.0),
                FormulaItem::new("olive", 100.0),
            ],
            &OilTable::standard(),
            &PriceOverrides::new(),
            &ranges,
            DEFAULT_WATER_RATIO,
        );

        assert!(analysis.advice.is_empty());
        assert!(analysis.to_string().contains("All metrics within their ideal ranges."));
        assert!(run(&[]).to_string().contains("No adjustments suggested."));
    }

    #[test]
    fn test_empty_report() {
        let analysis = run(&[]);
        assert_eq!(analysis.headline(), "empty formulation");
        assert!(analysis.to_string().contains("No oils with a positive weight."));
    }
}
