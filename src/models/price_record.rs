//! Price Record model
//!
//! A single observed shelf price. Records are append-only: there is no
//! update or delete path.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::pricing::{normalize, BaseUnit, Unit};
use super::Category;

/// A stored price record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: i64,
    pub date: String,
    pub category: Category,
    pub description: String,
    pub price: f64,
    pub weight: f64,
    pub unit: Unit,
    pub normalized_price: f64,
    pub created_at: String,
}

/// Validated data for creating a new price record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecordCreate {
    pub date: String,
    pub category: Category,
    pub description: String,
    pub price: f64,
    pub weight: f64,
    pub unit: Unit,
}

impl PriceRecordCreate {
    pub fn normalized_price(&self) -> f64 {
        normalize(self.price, self.weight, self.unit)
    }
}

impl PriceRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;
        let unit: String = row.get("unit")?;

        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            category: Category::from_str(&category).ok_or_else(|| invalid_column("category", category.clone()))?,
            description: row.get("description")?,
            price: row.get("price")?,
            weight: row.get("weight")?,
            unit: Unit::from_str(&unit).ok_or_else(|| invalid_column("unit", unit.clone()))?,
            normalized_price: row.get("norm_price")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn base_unit(&self) -> BaseUnit {
        self.unit.base_unit()
    }

    /// Description, or the category name when no description was given
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            self.category.as_str()
        } else {
            &self.description
        }
    }

    /// One-line summary, e.g. `Cheddar ($4.50) -> $9.00/kg`
    pub fn display_line(&self) -> String {
        format!(
            "{} (${:.2}) -> ${:.2}/{}",
            self.label(),
            self.price,
            self.normalized_price,
            self.base_unit()
        )
    }

    /// Insert a new record, computing its normalized price
    pub fn create(conn: &Connection, data: &PriceRecordCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO price_records (
                date, category, description, price, weight, unit, norm_price
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.date,
                data.category.as_str(),
                data.description,
                data.price,
                data.weight,
                data.unit.as_str(),
                data.normalized_price(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM price_records WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The newest `limit` records, newest first
    pub fn list_recent(conn: &Connection, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM price_records ORDER BY id DESC LIMIT ?1"
        )?;

        let records = stmt
            .query_map([limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Every record in insertion order
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM price_records ORDER BY id ASC")?;

        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM price_records", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn invalid_column(column: &str, value: String) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(0, format!("{}={}", column, value), rusqlite::types::Type::Text)
}
