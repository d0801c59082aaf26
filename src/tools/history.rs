//! Conversion history MCP tools
//!
//! Tools for browsing and pruning the stored conversion history.

use serde::Serialize;

use crate::conversion::{format_value, HormoneCatalog};
use crate::db::Database;
use crate::models::Conversion;

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

/// Stored conversion formatted for listing
#[derive(Debug, Serialize)]
pub struct ConversionRecord {
    pub id: i64,
    pub hormone_id: String,
    /// None when the hormone is no longer in the catalog
    pub hormone_name: Option<String>,
    pub input_value: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub result_value: f64,
    pub text: String,
    pub created_at: String,
}

/// Response for list_recent_conversions
#[derive(Debug, Serialize)]
pub struct ListConversionsResponse {
    pub conversions: Vec<ConversionRecord>,
    pub total: usize,
    pub hormone_filter: Option<String>,
}

/// Response for delete operations
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for clear_history
#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    pub deleted_count: i64,
}

/// Returned when clear_history is called without the force flag
#[derive(Debug, Serialize)]
pub struct ClearHistoryBlockedResponse {
    pub error: String,
    pub requires_force: bool,
}

fn record_from(conversion: Conversion, catalog: &HormoneCatalog) -> ConversionRecord {
    let hormone_name = catalog
        .get(&conversion.hormone_id)
        .map(|h| h.name.clone());
    if hormone_name.is_none() {
        tracing::warn!(
            "Stored conversion #{} references hormone '{}' not in the catalog",
            conversion.id,
            conversion.hormone_id
        );
    }
    let text = format!(
        "{} {} = {} {}",
        format_value(conversion.input_value),
        conversion.from_unit,
        format_value(conversion.result_value),
        conversion.to_unit,
    );

    ConversionRecord {
        id: conversion.id,
        hormone_id: conversion.hormone_id,
        hormone_name,
        input_value: conversion.input_value,
        from_unit: conversion.from_unit,
        to_unit: conversion.to_unit,
        result_value: conversion.result_value,
        text,
        created_at: conversion.created_at,
    }
}

// ============================================================================
// Tool Functions
// ============================================================================

/// List recent conversions, optionally filtered to one hormone
pub fn list_recent_conversions(
    db: &Database,
    catalog: &HormoneCatalog,
    hormone: Option<&str>,
    limit: i64,
) -> Result<ListConversionsResponse, String> {
    let limit = if limit <= 0 {
        DEFAULT_HISTORY_LIMIT
    } else {
        limit.min(MAX_HISTORY_LIMIT)
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let conversions = match hormone {
        Some(id) => Conversion::list_by_hormone(&conn, id, limit)
            .map_err(|e| format!("Failed to list conversions: {}", e))?,
        None => Conversion::list_recent(&conn, limit)
            .map_err(|e| format!("Failed to list conversions: {}", e))?,
    };

    let records: Vec<ConversionRecord> = conversions
        .into_iter()
        .map(|c| record_from(c, catalog))
        .collect();

    let total = records.len();
    Ok(ListConversionsResponse {
        conversions: records,
        total,
        hormone_filter: hormone.map(String::from),
    })
}

/// Delete one conversion record
pub fn delete_conversion(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Conversion::delete(&conn, id)
        .map_err(|e| format!("Failed to delete conversion: {}", e))?;

    Ok(DeleteResponse {
        success: deleted,
        deleted_id: id,
    })
}

/// Clear the whole conversion history (requires force flag)
pub fn clear_history(
    db: &Database,
    force: bool,
) -> Result<Result<ClearHistoryResponse, ClearHistoryBlockedResponse>, String> {
    if !force {
        return Ok(Err(ClearHistoryBlockedResponse {
            error: "Clearing the conversion history requires explicit confirmation (force=true)."
                .to_string(),
            requires_force: true,
        }));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted_count = Conversion::clear(&conn)
        .map_err(|e| format!("Failed to clear history: {}", e))?;

    Ok(Ok(ClearHistoryResponse {
        success: true,
        deleted_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::ConversionCreate;

    fn test_db(name: &str) -> Database {
        let path = std::env::temp_dir().join(format!(
            "huc_history_{}_{}.db",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let db = Database::new(&path).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn seed(db: &Database, hormone_id: &str, input: f64, from: &str, to: &str, result: f64) -> i64 {
        let conn = db.get_conn().unwrap();
        let record = Conversion::record(
            &conn,
            &ConversionCreate {
                hormone_id: hormone_id.to_string(),
                input_value: input,
                from_unit: from.to_string(),
                to_unit: to.to_string(),
                result_value: result,
            },
        )
        .unwrap();
        record.id
    }

    #[test]
    fn lists_newest_first_with_formatted_text() {
        let db = test_db("list");
        let catalog = HormoneCatalog::builtin();

        seed(&db, "estradiol", 150.0, "pg/mL", "pmol/L", 550.65);
        let last = seed(&db, "testosterone", 300.0, "ng/dL", "nmol/L", 10.4);

        let listing = list_recent_conversions(&db, &catalog, None, 20).unwrap();
        assert_eq!(listing.total, 2);
        assert_eq!(listing.conversions[0].id, last);
        assert_eq!(listing.conversions[0].text, "300 ng/dL = 10.4 nmol/L");
        assert_eq!(
            listing.conversions[0].hormone_name.as_deref(),
            Some("Testosterone (T)")
        );
    }

    #[test]
    fn hormone_filter_and_limit_apply() {
        let db = test_db("filter");
        let catalog = HormoneCatalog::builtin();

        for i in 0..5 {
            seed(&db, "estradiol", i as f64, "pg/mL", "pmol/L", i as f64 * 3.671);
        }
        seed(&db, "lh", 5.0, "mIU/mL", "IU/L", 0.005);

        let estradiol_only =
            list_recent_conversions(&db, &catalog, Some("estradiol"), 20).unwrap();
        assert_eq!(estradiol_only.total, 5);
        assert_eq!(estradiol_only.hormone_filter.as_deref(), Some("estradiol"));

        let limited = list_recent_conversions(&db, &catalog, None, 3).unwrap();
        assert_eq!(limited.total, 3);

        let oversized = list_recent_conversions(&db, &catalog, None, 10_000).unwrap();
        assert_eq!(oversized.total, 6);
    }

    #[test]
    fn unknown_hormone_keeps_record_without_name() {
        let db = test_db("unknown");
        let catalog = HormoneCatalog::builtin();

        seed(&db, "cortisol", 1.0, "ng/dL", "nmol/L", 0.03);

        let listing = list_recent_conversions(&db, &catalog, None, 20).unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.conversions[0].hormone_name, None);
    }

    #[test]
    fn delete_reports_missing_rows() {
        let db = test_db("delete");

        let id = seed(&db, "estradiol", 1.0, "pg/mL", "ng/dL", 0.1);

        let deleted = delete_conversion(&db, id).unwrap();
        assert!(deleted.success);

        let missing = delete_conversion(&db, id).unwrap();
        assert!(!missing.success);
    }

    #[test]
    fn clear_requires_force() {
        let db = test_db("clear");

        seed(&db, "estradiol", 1.0, "pg/mL", "ng/dL", 0.1);
        seed(&db, "estradiol", 2.0, "pg/mL", "ng/dL", 0.2);

        let blocked = clear_history(&db, false).unwrap().unwrap_err();
        assert!(blocked.requires_force);

        let cleared = clear_history(&db, true).unwrap().unwrap();
        assert_eq!(cleared.deleted_count, 2);

        let conn = db.get_conn().unwrap();
        assert_eq!(Conversion::count(&conn).unwrap(), 0);
    }
}
