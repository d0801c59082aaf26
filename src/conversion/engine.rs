//! Conversion engine
//!
//! Pure conversion, equivalence, and range-mapping functions over the
//! hormone catalog.

use thiserror::Error;

use super::catalog::{Hormone, HormoneCatalog, ReferenceRange, Unit, UnitCategory};

/// Relative tolerance when comparing unit multipliers for equivalence
const MULTIPLIER_EPSILON: f64 = 1e-9;

/// Errors produced by the conversion engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Input text did not parse as a finite decimal number
    #[error("Invalid numeric input: {0:?}")]
    InvalidInput(String),

    /// Unknown hormone identifier
    #[error("Unknown hormone: {0}")]
    HormoneNotFound(String),

    /// Unit symbol absent from the hormone's unit list
    #[error("Unit {symbol} is not defined for hormone {hormone}")]
    UnitNotFound { hormone: String, symbol: String },
}

impl ConvertError {
    /// Stable machine-readable code for tool responses
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::InvalidInput(_) => "invalid_input",
            ConvertError::HormoneNotFound(_) => "hormone_not_found",
            ConvertError::UnitNotFound { .. } => "unit_not_found",
        }
    }
}

/// A reference range's bounds mapped into another unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertedRange {
    pub min: f64,
    pub max: f64,
}

/// Convert a value between two units of the same hormone
///
/// Pivots through the hormone's base unit: `base = value * from.multiplier`,
/// then `result = base / to.multiplier`. No rounding is applied here;
/// formatting is a presentation concern.
pub fn convert_value(
    value: f64,
    from_symbol: &str,
    to_symbol: &str,
    hormone: &Hormone,
) -> Result<f64, ConvertError> {
    let from = resolve_unit(hormone, from_symbol)?;
    let to = resolve_unit(hormone, to_symbol)?;

    let base_value = value * from.multiplier;
    Ok(base_value / to.multiplier)
}

fn resolve_unit<'a>(hormone: &'a Hormone, symbol: &str) -> Result<&'a Unit, ConvertError> {
    hormone
        .find_unit(symbol)
        .ok_or_else(|| ConvertError::UnitNotFound {
            hormone: hormone.id.clone(),
            symbol: symbol.to_string(),
        })
}

/// Check whether two unit symbols represent the same quantity scale
///
/// Identical symbols are always equivalent, even when the symbol is not in
/// the hormone's unit list. Otherwise both symbols must resolve and their
/// multipliers must match within tolerance.
pub fn are_units_equivalent(hormone: &Hormone, unit_a: &str, unit_b: &str) -> bool {
    if unit_a == unit_b {
        return true;
    }

    match (hormone.find_unit(unit_a), hormone.find_unit(unit_b)) {
        (Some(a), Some(b)) => multipliers_equal(a.multiplier, b.multiplier),
        _ => false,
    }
}

fn multipliers_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= MULTIPLIER_EPSILON * a.abs().max(b.abs())
}

/// Convert a reference range's bounds into a target unit
///
/// Returns `None` when either the range's declared unit or the target unit
/// does not resolve; callers fall back to showing the range in its own unit.
pub fn convert_range_to_unit(
    range: &ReferenceRange,
    target_symbol: &str,
    hormone: &Hormone,
) -> Option<ConvertedRange> {
    let from = hormone.find_unit(&range.unit)?;
    let to = hormone.find_unit(target_symbol)?;

    Some(ConvertedRange {
        min: convert_bound(range.min, from, to),
        max: convert_bound(range.max, from, to),
    })
}

fn convert_bound(value: f64, from: &Unit, to: &Unit) -> f64 {
    // An infinite bound is a sentinel for "no upper limit", not a number to scale
    if value.is_infinite() {
        return value;
    }
    value * from.multiplier / to.multiplier
}

/// Parse user input and convert it between two units of a hormone
///
/// The top-level entry point behind the convert tool: trims and parses the
/// raw text, resolves the hormone, then delegates to [`convert_value`].
pub fn perform_conversion(
    raw_input: &str,
    from_unit: &str,
    to_unit: &str,
    hormone_id: &str,
    catalog: &HormoneCatalog,
) -> Result<f64, ConvertError> {
    let value: f64 = raw_input
        .trim()
        .parse()
        .map_err(|_| ConvertError::InvalidInput(raw_input.to_string()))?;

    // f64 parsing accepts "inf" and "NaN"; only finite measurements convert
    if !value.is_finite() {
        return Err(ConvertError::InvalidInput(raw_input.to_string()));
    }

    let hormone = catalog
        .get(hormone_id)
        .ok_or_else(|| ConvertError::HormoneNotFound(hormone_id.to_string()))?;

    convert_value(value, from_unit, to_unit, hormone)
}

/// Pick the target unit offered by default for a given source unit
///
/// Prefers the first common unit not equivalent to the source, then any
/// non-equivalent unit, then the base unit.
pub fn default_target_unit<'a>(hormone: &'a Hormone, from_symbol: &str) -> Option<&'a Unit> {
    hormone
        .units
        .iter()
        .find(|u| {
            u.category == UnitCategory::Common
                && !are_units_equivalent(hormone, from_symbol, &u.symbol)
        })
        .or_else(|| {
            hormone
                .units
                .iter()
                .find(|u| !are_units_equivalent(hormone, from_symbol, &u.symbol))
        })
        .or_else(|| hormone.find_unit(&hormone.base_unit))
        .or_else(|| hormone.units.first())
}

/// Symbols in the hormone's unit list equivalent to `symbol`, excluding itself
pub fn equivalent_units<'a>(hormone: &'a Hormone, symbol: &str) -> Vec<&'a str> {
    hormone
        .units
        .iter()
        .filter(|u| u.symbol != symbol && are_units_equivalent(hormone, symbol, &u.symbol))
        .map(|u| u.symbol.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> HormoneCatalog {
        HormoneCatalog::builtin()
    }

    #[test]
    fn test_identity_conversion_every_unit() {
        let catalog = catalog();
        for hormone in catalog.hormones() {
            for unit in &hormone.units {
                let result = convert_value(100.0, &unit.symbol, &unit.symbol, hormone).unwrap();
                assert!(
                    (result - 100.0).abs() < 1e-9,
                    "{} {}: identity gave {}",
                    hormone.id,
                    unit.symbol,
                    result
                );
            }
        }
    }

    #[test]
    fn test_round_trip_every_unit_pair() {
        let catalog = catalog();
        for hormone in catalog.hormones() {
            for from in &hormone.units {
                for to in &hormone.units {
                    let out = convert_value(123.456, &from.symbol, &to.symbol, hormone).unwrap();
                    let back = convert_value(out, &to.symbol, &from.symbol, hormone).unwrap();
                    assert!(
                        (back - 123.456).abs() < 1e-6,
                        "{} {}->{}: round trip gave {}",
                        hormone.id,
                        from.symbol,
                        to.symbol,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn test_estradiol_pg_ml_to_pmol_l() {
        let catalog = catalog();
        let estradiol = catalog.get("estradiol").unwrap();
        let result = convert_value(100.0, "pg/mL", "pmol/L", estradiol).unwrap();
        assert!((result - 367.1).abs() < 1e-9, "got {}", result);
    }

    #[test]
    fn test_testosterone_ng_dl_to_nmol_l() {
        let catalog = catalog();
        let testosterone = catalog.get("testosterone").unwrap();
        let result = convert_value(300.0, "ng/dL", "nmol/L", testosterone).unwrap();
        assert!((result - 10.402219).abs() < 1e-6, "got {}", result);
    }

    #[test]
    fn test_unit_not_found() {
        let catalog = catalog();
        let estradiol = catalog.get("estradiol").unwrap();

        let err = convert_value(1.0, "mg/dL", "pg/mL", estradiol).unwrap_err();
        assert_eq!(
            err,
            ConvertError::UnitNotFound {
                hormone: "estradiol".to_string(),
                symbol: "mg/dL".to_string(),
            }
        );
        assert_eq!(err.code(), "unit_not_found");

        let err = convert_value(1.0, "pg/mL", "mg/dL", estradiol).unwrap_err();
        assert_eq!(err.code(), "unit_not_found");
    }

    #[test]
    fn test_same_symbol_always_equivalent() {
        let catalog = catalog();
        let estradiol = catalog.get("estradiol").unwrap();
        assert!(are_units_equivalent(estradiol, "pg/mL", "pg/mL"));
        // Symbol equality short-circuits even for symbols not in the list
        assert!(are_units_equivalent(estradiol, "ng/L", "ng/L"));
    }

    #[test]
    fn test_prolactin_equivalence() {
        let catalog = catalog();
        let prolactin = catalog.get("prolactin").unwrap();
        assert!(are_units_equivalent(prolactin, "ng/mL", "μg/L"));
        assert!(are_units_equivalent(prolactin, "μg/L", "ng/mL"));
        assert!(!are_units_equivalent(prolactin, "ng/mL", "mIU/L"));
    }

    #[test]
    fn test_unknown_symbols_not_equivalent() {
        let catalog = catalog();
        let estradiol = catalog.get("estradiol").unwrap();
        assert!(!are_units_equivalent(estradiol, "pg/mL", "ng/L"));
        assert!(!are_units_equivalent(estradiol, "pg/mL", "pmol/L"));
    }

    #[test]
    fn test_range_conversion_unknown_target() {
        let catalog = catalog();
        let estradiol = catalog.get("estradiol").unwrap();
        let range = &estradiol.ranges[0];
        assert!(convert_range_to_unit(range, "mg/dL", estradiol).is_none());
    }

    #[test]
    fn test_range_conversion_values() {
        let catalog = catalog();
        let estradiol = catalog.get("estradiol").unwrap();
        // Male reference range, 8-35 pg/mL
        let range = &estradiol.ranges[0];
        let converted = convert_range_to_unit(range, "ng/dL", estradiol).unwrap();
        assert!((converted.min - 0.8).abs() < 1e-9);
        assert!((converted.max - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_range_conversion_preserves_infinite_bound() {
        let catalog = catalog();
        let estradiol = catalog.get("estradiol").unwrap();
        let open_ended = estradiol
            .ranges
            .iter()
            .find(|r| r.max.is_infinite())
            .unwrap();

        let converted = convert_range_to_unit(open_ended, "pmol/L", estradiol).unwrap();
        assert!((converted.min - 300.0 * 3.671).abs() < 1e-6);
        assert!(converted.max.is_infinite());
        assert!(converted.max.is_sign_positive());
    }

    #[test]
    fn test_perform_conversion_success() {
        let catalog = catalog();
        let result = perform_conversion("100", "pg/mL", "pmol/L", "estradiol", &catalog).unwrap();
        assert!((result - 367.1).abs() < 1e-9);

        // Surrounding whitespace is tolerated
        let result = perform_conversion(" 2.5 ", "ng/mL", "mIU/L", "prolactin", &catalog).unwrap();
        assert!((result - 2.5 / 47.17).abs() < 1e-9);
    }

    #[test]
    fn test_perform_conversion_invalid_input() {
        let catalog = catalog();
        for bad in ["abc", "", "  ", "12abc", "1.2.3"] {
            let err =
                perform_conversion(bad, "pg/mL", "pmol/L", "estradiol", &catalog).unwrap_err();
            assert_eq!(err.code(), "invalid_input", "input {:?}", bad);
        }
    }

    #[test]
    fn test_perform_conversion_rejects_non_finite() {
        let catalog = catalog();
        for bad in ["inf", "-inf", "infinity", "NaN", "nan"] {
            let err =
                perform_conversion(bad, "pg/mL", "pmol/L", "estradiol", &catalog).unwrap_err();
            assert_eq!(err.code(), "invalid_input", "input {:?}", bad);
        }
    }

    #[test]
    fn test_perform_conversion_unknown_hormone() {
        let catalog = catalog();
        let err = perform_conversion("100", "pg/mL", "pmol/L", "cortisol", &catalog).unwrap_err();
        assert_eq!(err, ConvertError::HormoneNotFound("cortisol".to_string()));
        assert_eq!(err.code(), "hormone_not_found");
    }

    #[test]
    fn test_perform_conversion_unknown_unit() {
        let catalog = catalog();
        let err = perform_conversion("100", "pg/mL", "mg/dL", "estradiol", &catalog).unwrap_err();
        assert_eq!(err.code(), "unit_not_found");
    }

    #[test]
    fn test_default_target_unit() {
        let catalog = catalog();

        // First common unit that is not equivalent to the source
        let estradiol = catalog.get("estradiol").unwrap();
        let target = default_target_unit(estradiol, "pg/mL").unwrap();
        assert_eq!(target.symbol, "pmol/L");
        let target = default_target_unit(estradiol, "pmol/L").unwrap();
        assert_eq!(target.symbol, "pg/mL");

        // Equivalent units are skipped even when common
        let prolactin = catalog.get("prolactin").unwrap();
        let target = default_target_unit(prolactin, "μg/L").unwrap();
        assert_eq!(target.symbol, "mIU/L");

        // Falls back to the first non-equivalent unit when no common one fits
        let fsh = catalog.get("fsh").unwrap();
        let target = default_target_unit(fsh, "mIU/mL").unwrap();
        assert_eq!(target.symbol, "IU/L");
    }

    #[test]
    fn test_equivalent_units_listing() {
        let catalog = catalog();
        let prolactin = catalog.get("prolactin").unwrap();
        assert_eq!(equivalent_units(prolactin, "ng/mL"), vec!["μg/L"]);

        let estradiol = catalog.get("estradiol").unwrap();
        assert!(equivalent_units(estradiol, "pg/mL").is_empty());
    }
}
