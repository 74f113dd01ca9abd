//! Parsing of formulation items and numbers typed on the command line

use anyhow::Result;
use regex::Regex;

use crate::calculator::{MAX_WATER_RATIO, MIN_WATER_RATIO};
use crate::error::CalcError;
use crate::models::FormulaItem;
use crate::oils::OilTable;

/// Parse `<oil>=<grams>` (also `<oil>:<grams>`, optional trailing `g`).
///
/// The oil may be given by id or display name and must exist in the table.
pub fn parse_item(spec: &str, table: &OilTable) -> Result<FormulaItem> {
    let item_re = Regex::new(r"^\s*([\w][\w \-]*?)\s*[=:]\s*(-?\d+(?:\.\d+)?)\s*(?:g|grams?)?\s*$")?;
    let Some(cap) = item_re.captures(spec) else {
        return Err(CalcError::InvalidItemSpec(spec.to_string()).into());
    };

    let oil = table
        .resolve(&cap[1])
        .ok_or_else(|| CalcError::UnknownOil(cap[1].to_string()))?;
    let weight = parse_grams(&cap[2])?;

    Ok(FormulaItem::new(oil.id.clone(), weight))
}

pub fn parse_items(specs: &[String], table: &OilTable) -> Result<Vec<FormulaItem>> {
    specs.iter().map(|s| parse_item(s, table)).collect()
}

/// A gram amount, optionally suffixed with `g`
pub fn parse_grams(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('g').unwrap_or(trimmed).trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CalcError::InvalidNumber(text.to_string()).into())
}

/// A gram amount for an adjustment; negative amounts are rejected
pub fn parse_amount(text: &str) -> Result<f64> {
    let grams = parse_grams(text)?;
    if grams < 0.0 {
        return Err(CalcError::InvalidNumber(text.to_string()).into());
    }
    Ok(grams)
}

pub fn validate_water_ratio(ratio: f64) -> Result<f64, CalcError> {
    if (MIN_WATER_RATIO..=MAX_WATER_RATIO).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(CalcError::WaterRatioOutOfRange(ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err_of<T: std::fmt::Debug>(result: Result<T>) -> CalcError {
        result
            .unwrap_err()
            .downcast::<CalcError>()
            .expect("should be a CalcError")
    }

    #[test]
    fn test_parse_item_forms() {
        let table = OilTable::standard();
        assert_eq!(
            parse_item("olive=300", &table).unwrap(),
            FormulaItem::new("olive", 300.0)
        );
        assert_eq!(
            parse_item(" coconut : 120.5g ", &table).unwrap(),
            FormulaItem::new("coconut", 120.5)
        );
        assert_eq!(
            parse_item("Shea Butter=40 grams", &table).unwrap(),
            FormulaItem::new("shea_butter", 40.0)
        );
    }

    #[test]
    fn test_parse_item_errors() {
        let table = OilTable::standard();
        assert_eq!(
            err_of(parse_item("olive", &table)),
            CalcError::InvalidItemSpec("olive".to_string())
        );
        assert_eq!(
            err_of(parse_item("olive=lots", &table)),
            CalcError::InvalidItemSpec("olive=lots".to_string())
        );
        assert_eq!(
            err_of(parse_item("ghee=100", &table)),
            CalcError::UnknownOil("ghee".to_string())
        );
    }

    #[test]
    fn test_parse_items_stops_at_first_error() {
        let table = OilTable::standard();
        let specs = vec!["olive=300".to_string(), "bad".to_string()];
        assert!(parse_items(&specs, &table).is_err());

        let specs = vec!["olive=300".to_string(), "palm=100".to_string()];
        assert_eq!(parse_items(&specs, &table).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_grams() {
        assert_eq!(parse_grams("50").unwrap(), 50.0);
        assert_eq!(parse_grams("12.5g").unwrap(), 12.5);
        assert!(parse_grams("inf").is_err());
        assert!(parse_grams("").is_err());
    }

    #[test]
    fn test_parse_amount_rejects_negative() {
        assert_eq!(parse_amount("0").unwrap(), 0.0);
        assert_eq!(parse_amount("75g").unwrap(), 75.0);
        assert_eq!(err_of(parse_amount("-500")), CalcError::InvalidNumber("-500".to_string()));
        assert!(parse_amount("abc").is_err());
        // item weights may still go negative while editing
        assert_eq!(parse_grams("-500").unwrap(), -500.0);
    }

    #[test]
    fn test_validate_water_ratio() {
        assert_eq!(validate_water_ratio(2.3), Ok(2.3));
        assert_eq!(validate_water_ratio(1.0), Ok(1.0));
        assert_eq!(validate_water_ratio(5.0), Ok(5.0));
        assert_eq!(validate_water_ratio(0.5), Err(CalcError::WaterRatioOutOfRange(0.5)));
    }
}
