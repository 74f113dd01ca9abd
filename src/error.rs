use thiserror::Error;

/// Errors raised where user or file input enters the calculator.
///
/// The computation itself never fails; these only come from building an oil
/// table, parsing command-line input, or looking up saved recipes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("duplicate oil id: {0}")]
    DuplicateOil(String),

    #[error("unknown oil: {0}")]
    UnknownOil(String),

    #[error("invalid item '{0}': expected <oil>=<grams>")]
    InvalidItemSpec(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("water ratio {0} out of range (expected 1 to 5)")]
    WaterRatioOutOfRange(f64),

    #[error("saved recipe not found: {0}")]
    RecipeNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_error_display() {
        let err = CalcError::InvalidItemSpec("olive:abc".to_string());
        assert_eq!(
            err.to_string(),
            "invalid item 'olive:abc': expected <oil>=<grams>"
        );

        let err = CalcError::WaterRatioOutOfRange(7.5);
        assert_eq!(err.to_string(), "water ratio 7.5 out of range (expected 1 to 5)");

        let err = CalcError::UnknownOil("lard".to_string());
        assert_eq!(err.to_string(), "unknown oil: lard");
    }
}
