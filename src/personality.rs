//! Qualitative archetype for a formulation

use std::fmt;

use crate::models::AggregateResult;
use crate::oils::QualityRanges;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Personality {
    Gentle,
    StrongCleansing,
    ExtraHard,
    Balanced,
    /// No rule matched with confidence
    Neutral,
}

impl Personality {
    pub fn label(&self) -> &'static str {
        match self {
            Personality::Gentle => "Gentle / moisturising",
            Personality::StrongCleansing => "Strong cleansing",
            Personality::ExtraHard => "Extra hard / long-lasting",
            Personality::Balanced => "Balanced / stable",
            Personality::Neutral => "Unremarkable",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Personality::Gentle => "Rich in conditioning oils; suits dry or sensitive skin.",
            Personality::StrongCleansing => "Cuts grease well; better for hands or laundry than face.",
            Personality::ExtraHard => "A dense bar that resists wear in the shower.",
            Personality::Balanced => "Hardness and softness in proportion; a good everyday bar.",
            Personality::Neutral => "No trait dominates enough to characterise this bar.",
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label a formulation. First matching rule wins; `None` for an empty formulation.
pub fn classify_personality(result: &AggregateResult, ranges: &QualityRanges) -> Option<Personality> {
    if result.is_empty() {
        return None;
    }

    let q = &result.qualities;
    let personality = if q.conditioning > 60.0 {
        Personality::Gentle
    } else if q.cleansing > 18.0 {
        Personality::StrongCleansing
    } else if q.hardness > 45.0 {
        Personality::ExtraHard
    } else if result.avg_ins >= ranges.ins.min && result.avg_ins <= ranges.ins.max {
        Personality::Balanced
    } else {
        Personality::Neutral
    };
    Some(personality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Qualities;

    fn result(hardness: f64, cleansing: f64, conditioning: f64, ins: f64) -> AggregateResult {
        AggregateResult {
            total_weight: 500.0,
            total_naoh: 70.0,
            avg_ins: ins,
            qualities: Qualities::new(hardness, cleansing, conditioning, 20.0, 20.0),
            total_cost: 0.0,
        }
    }

    fn classify(r: &AggregateResult) -> Option<Personality> {
        classify_personality(r, &QualityRanges::default())
    }

    #[test]
    fn test_empty_has_no_personality() {
        assert_eq!(classify(&AggregateResult::default()), None);
    }

    #[test]
    fn test_rule_order() {
        // conditioning wins even with high cleansing and hardness
        assert_eq!(classify(&result(60.0, 30.0, 61.0, 150.0)), Some(Personality::Gentle));
        assert_eq!(
            classify(&result(60.0, 19.0, 60.0, 150.0)),
            Some(Personality::StrongCleansing)
        );
        assert_eq!(classify(&result(46.0, 18.0, 40.0, 200.0)), Some(Personality::ExtraHard));
        assert_eq!(classify(&result(45.0, 18.0, 40.0, 120.0)), Some(Personality::Balanced));
        assert_eq!(classify(&result(45.0, 18.0, 40.0, 170.0)), Some(Personality::Balanced));
        assert_eq!(classify(&result(30.0, 10.0, 50.0, 110.0)), Some(Personality::Neutral));
    }
}
