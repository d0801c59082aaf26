//! Conversion history model
//!
//! Represents a unit conversion performed through the server and stored in
//! the local history table.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A stored conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    pub id: i64,
    pub hormone_id: String,
    pub input_value: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub result_value: f64,
    pub created_at: String,
}

/// Data for recording a new conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionCreate {
    pub hormone_id: String,
    pub input_value: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub result_value: f64,
}

impl Conversion {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            hormone_id: row.get("hormone_id")?,
            input_value: row.get("input_value")?,
            from_unit: row.get("from_unit")?,
            to_unit: row.get("to_unit")?,
            result_value: row.get("result_value")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Record a new conversion
    pub fn record(conn: &Connection, data: &ConversionCreate) -> DbResult<Self> {
        let created_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

        conn.execute(
            r#"
            INSERT INTO conversions (hormone_id, input_value, from_unit, to_unit, result_value, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.hormone_id,
                data.input_value,
                data.from_unit,
                data.to_unit,
                data.result_value,
                created_at,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a conversion by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM conversions WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(conversion) => Ok(Some(conversion)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List recent conversions, newest first
    pub fn list_recent(conn: &Connection, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM conversions ORDER BY created_at DESC, id DESC LIMIT ?1"
        )?;
        let conversions = stmt
            .query_map([limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(conversions)
    }

    /// List recent conversions for one hormone, newest first
    pub fn list_by_hormone(conn: &Connection, hormone_id: &str, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM conversions WHERE hormone_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"
        )?;
        let conversions = stmt
            .query_map(params![hormone_id, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(conversions)
    }

    /// List every stored conversion, oldest first
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM conversions ORDER BY id")?;
        let conversions = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(conversions)
    }

    /// Rewrite the stored result of a conversion
    pub fn update_result(conn: &Connection, id: i64, result_value: f64) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE conversions SET result_value = ?1 WHERE id = ?2",
            params![result_value, id],
        )?;
        Ok(rows > 0)
    }

    /// Delete a conversion
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM conversions WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Delete all stored conversions, returning how many were removed
    pub fn clear(conn: &Connection) -> DbResult<i64> {
        let rows = conn.execute("DELETE FROM conversions", [])?;
        Ok(rows as i64)
    }

    /// Count stored conversions
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM conversions", [], |row| row.get(0))?;
        Ok(count)
    }
}
