//! Conversion MCP Tools
//!
//! Tools for converting lab values between units and projecting reference
//! ranges into the units a lab report uses.

use serde::Serialize;

use crate::conversion::{
    are_units_equivalent, convert_range_to_unit, format_range_text, format_value,
    perform_conversion, ConvertError, Hormone, HormoneCatalog,
};
use crate::db::Database;
use crate::models::{Conversion, ConversionCreate};

/// Domain rejection returned to the client as data rather than a tool failure
#[derive(Debug, Serialize)]
pub struct ConversionRejected {
    pub error: String,
    pub code: String,
}

impl From<&ConvertError> for ConversionRejected {
    fn from(err: &ConvertError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

/// Reference range the converted value falls inside
#[derive(Debug, Serialize)]
pub struct MatchingRange {
    pub label: String,
    pub text: String,
    pub unit: String,
    pub color: String,
    pub description: Option<String>,
}

/// Response for convert_value
#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub hormone_id: String,
    pub hormone_name: String,
    pub input: String,
    pub input_value: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub result_value: f64,
    pub result_text: String,
    pub units_equivalent: bool,
    pub matching_ranges: Vec<MatchingRange>,
    pub history_id: i64,
    pub recorded_at: String,
}

/// One rendering of a range's bounds in a specific unit
#[derive(Debug, Serialize)]
pub struct RangeText {
    pub text: String,
    pub unit: String,
}

/// Reference range projected into the requested units
#[derive(Debug, Serialize)]
pub struct RangeDisplay {
    pub label: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub source_name: String,
    pub source_url: String,
    /// Either both requested units, or the range's own unit when the
    /// requested units are equivalent or the range cannot be converted
    pub displays: Vec<RangeText>,
}

/// Response for get_reference_ranges
#[derive(Debug, Serialize)]
pub struct ReferenceRangesResponse {
    pub hormone_id: String,
    pub hormone_name: String,
    pub from_unit: String,
    pub to_unit: String,
    pub units_equivalent: bool,
    pub ranges: Vec<RangeDisplay>,
    pub total: usize,
}

// ============================================================================
// Tool Functions
// ============================================================================

/// Convert a raw lab value string and record the conversion in history
pub fn convert_value_tool(
    db: &Database,
    catalog: &HormoneCatalog,
    hormone_id: &str,
    value: &str,
    from_unit: &str,
    to_unit: &str,
) -> Result<Result<ConversionResponse, ConversionRejected>, String> {
    let hormone = match catalog.get(hormone_id) {
        Some(h) => h,
        None => {
            let err = ConvertError::HormoneNotFound(hormone_id.to_string());
            return Ok(Err(ConversionRejected::from(&err)));
        }
    };

    let trimmed = value.trim();
    let input_value: f64 = match trimmed.parse() {
        Ok(v) => v,
        Err(_) => {
            let err = ConvertError::InvalidInput(value.to_string());
            return Ok(Err(ConversionRejected::from(&err)));
        }
    };

    let result_value = match perform_conversion(value, from_unit, to_unit, hormone_id, catalog) {
        Ok(v) => v,
        Err(err) => return Ok(Err(ConversionRejected::from(&err))),
    };

    let matching_ranges = matching_ranges(hormone, result_value, to_unit);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let record = Conversion::record(
        &conn,
        &ConversionCreate {
            hormone_id: hormone.id.clone(),
            input_value,
            from_unit: from_unit.to_string(),
            to_unit: to_unit.to_string(),
            result_value,
        },
    )
    .map_err(|e| format!("Failed to record conversion: {}", e))?;

    Ok(Ok(ConversionResponse {
        hormone_id: hormone.id.clone(),
        hormone_name: hormone.name.clone(),
        input: trimmed.to_string(),
        input_value,
        from_unit: from_unit.to_string(),
        to_unit: to_unit.to_string(),
        result_value,
        result_text: format_value(result_value),
        units_equivalent: are_units_equivalent(hormone, from_unit, to_unit),
        matching_ranges,
        history_id: record.id,
        recorded_at: record.created_at,
    }))
}

fn matching_ranges(hormone: &Hormone, result_value: f64, to_unit: &str) -> Vec<MatchingRange> {
    hormone
        .ranges
        .iter()
        .filter_map(|range| {
            let converted = convert_range_to_unit(range, to_unit, hormone)?;
            if result_value < converted.min || result_value > converted.max {
                return None;
            }
            Some(MatchingRange {
                label: range.label.clone(),
                text: format_range_text(converted.min, converted.max),
                unit: to_unit.to_string(),
                color: range.color.as_str().to_string(),
                description: range.description.clone(),
            })
        })
        .collect()
}

/// Project every reference range of a hormone into the requested units
///
/// A range is shown in both requested units when they differ on a real
/// scale. When the units are equivalent, or the range cannot be expressed
/// in them, the range falls back to its own declared unit.
pub fn get_reference_ranges(
    catalog: &HormoneCatalog,
    hormone_id: &str,
    from_unit: &str,
    to_unit: &str,
) -> Result<ReferenceRangesResponse, ConversionRejected> {
    let hormone = catalog.get(hormone_id).ok_or_else(|| {
        ConversionRejected::from(&ConvertError::HormoneNotFound(hormone_id.to_string()))
    })?;

    for symbol in [from_unit, to_unit] {
        if hormone.find_unit(symbol).is_none() {
            return Err(ConversionRejected::from(&ConvertError::UnitNotFound {
                hormone: hormone.id.clone(),
                symbol: symbol.to_string(),
            }));
        }
    }

    let units_equivalent = are_units_equivalent(hormone, from_unit, to_unit);

    let ranges: Vec<RangeDisplay> = hormone
        .ranges
        .iter()
        .map(|range| {
            let converted_from = convert_range_to_unit(range, from_unit, hormone);
            let converted_to = convert_range_to_unit(range, to_unit, hormone);

            let displays = match (units_equivalent, converted_from, converted_to) {
                (false, Some(f), Some(t)) => vec![
                    RangeText {
                        text: format_range_text(f.min, f.max),
                        unit: from_unit.to_string(),
                    },
                    RangeText {
                        text: format_range_text(t.min, t.max),
                        unit: to_unit.to_string(),
                    },
                ],
                _ => vec![RangeText {
                    text: format_range_text(range.min, range.max),
                    unit: range.unit.clone(),
                }],
            };

            RangeDisplay {
                label: range.label.clone(),
                description: range.description.clone(),
                color: range.color.as_str().to_string(),
                icon: range.icon.as_str().to_string(),
                source_name: range.source.name.clone(),
                source_url: range.source.url.clone(),
                displays,
            }
        })
        .collect();

    let total = ranges.len();
    Ok(ReferenceRangesResponse {
        hormone_id: hormone.id.clone(),
        hormone_name: hormone.name.clone(),
        from_unit: from_unit.to_string(),
        to_unit: to_unit.to_string(),
        units_equivalent,
        ranges,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_db(name: &str) -> Database {
        let path = std::env::temp_dir().join(format!(
            "huc_convert_{}_{}.db",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let db = Database::new(&path).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn convert_records_history_and_matches_ranges() {
        let db = test_db("happy");
        let catalog = HormoneCatalog::builtin();

        let response = convert_value_tool(&db, &catalog, "estradiol", " 150 ", "pg/mL", "pmol/L")
            .unwrap()
            .unwrap();

        assert_eq!(response.hormone_name, "Estradiol (E2)");
        assert_eq!(response.input, "150");
        assert!((response.result_value - 550.65).abs() < 0.01);
        assert_eq!(response.result_text, "551");
        assert!(!response.units_equivalent);

        let labels: Vec<&str> = response
            .matching_ranges
            .iter()
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(labels, vec!["GAHT target range"]);
        assert_eq!(response.matching_ranges[0].unit, "pmol/L");

        let conn = db.get_conn().unwrap();
        let history = Conversion::list_recent(&conn, 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, response.history_id);
        assert_eq!(history[0].hormone_id, "estradiol");
        assert!((history[0].input_value - 150.0).abs() < 1e-12);
        assert!((history[0].result_value - response.result_value).abs() < 1e-12);
    }

    #[test]
    fn rejected_conversions_are_not_recorded() {
        let db = test_db("rejected");
        let catalog = HormoneCatalog::builtin();

        let bad_value = convert_value_tool(&db, &catalog, "estradiol", "abc", "pg/mL", "pmol/L")
            .unwrap()
            .unwrap_err();
        assert_eq!(bad_value.code, "invalid_input");

        let bad_hormone = convert_value_tool(&db, &catalog, "cortisol", "1", "pg/mL", "pmol/L")
            .unwrap()
            .unwrap_err();
        assert_eq!(bad_hormone.code, "hormone_not_found");

        let bad_unit = convert_value_tool(&db, &catalog, "estradiol", "1", "pg/mL", "mg/dL")
            .unwrap()
            .unwrap_err();
        assert_eq!(bad_unit.code, "unit_not_found");

        let conn = db.get_conn().unwrap();
        assert_eq!(Conversion::count(&conn).unwrap(), 0);
    }

    #[test]
    fn ranges_show_both_units_when_scales_differ() {
        let catalog = HormoneCatalog::builtin();
        let response = get_reference_ranges(&catalog, "estradiol", "pg/mL", "ng/dL").unwrap();

        assert!(!response.units_equivalent);
        assert_eq!(response.total, 4);

        let male = &response.ranges[0];
        assert_eq!(male.label, "Male reference range");
        assert_eq!(male.displays.len(), 2);
        assert_eq!(male.displays[0].text, "8.00–35.0");
        assert_eq!(male.displays[0].unit, "pg/mL");
        assert_eq!(male.displays[1].text, "0.80–3.50");
        assert_eq!(male.displays[1].unit, "ng/dL");
    }

    #[test]
    fn equivalent_units_fall_back_to_own_unit() {
        let catalog = HormoneCatalog::builtin();
        let response = get_reference_ranges(&catalog, "prolactin", "ng/mL", "μg/L").unwrap();

        assert!(response.units_equivalent);
        for range in &response.ranges {
            assert_eq!(range.displays.len(), 1);
            assert_eq!(range.displays[0].unit, "ng/mL");
        }

        let elevated = response
            .ranges
            .iter()
            .find(|r| r.label == "Significant elevation")
            .unwrap();
        assert_eq!(elevated.displays[0].text, "≥ 100");
        assert_eq!(elevated.color, "error");
    }

    #[test]
    fn identical_symbols_fall_back_to_own_unit() {
        let catalog = HormoneCatalog::builtin();
        let response = get_reference_ranges(&catalog, "testosterone", "ng/dL", "ng/dL").unwrap();

        assert!(response.units_equivalent);
        for range in &response.ranges {
            assert_eq!(range.displays.len(), 1);
            assert_eq!(range.displays[0].unit, "ng/dL");
        }
    }

    #[test]
    fn unknown_inputs_are_rejected() {
        let catalog = HormoneCatalog::builtin();

        let err = get_reference_ranges(&catalog, "cortisol", "ng/dL", "ng/dL").unwrap_err();
        assert_eq!(err.code, "hormone_not_found");

        let err = get_reference_ranges(&catalog, "estradiol", "pg/mL", "mg/dL").unwrap_err();
        assert_eq!(err.code, "unit_not_found");
    }
}
