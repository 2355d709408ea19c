//! Price record tools
//!
//! Boundary validation, record entry and the recent view.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::db::{Database, DbError, DbResult};
use crate::models::{Category, PriceRecord, PriceRecordCreate};
use crate::pricing::{normalize, RecentHistory, Unit, RECENT_WINDOW};

/// Raw form input, exactly as typed by the user
#[derive(Debug, Clone, Default)]
pub struct RecordEntry {
    pub price: String,
    pub weight: String,
    pub unit: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// ISO date; today when absent
    pub date: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field}: numbers only")]
    InvalidNumber { field: &'static str },

    #[error("price cannot be negative")]
    NegativePrice,

    #[error("category is required")]
    MissingCategory,

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("unknown unit '{0}' (expected kg, g, L, ml or pcs)")]
    UnknownUnit(String),

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("price per unit is too large to represent")]
    PriceOutOfRange,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// A record as shown in the recent view
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub id: i64,
    pub date: String,
    pub category: Category,
    pub description: String,
    pub price: f64,
    pub weight: f64,
    pub unit: Unit,
    pub normalized_price: f64,
    pub base_unit: &'static str,
    pub display: String,
}

impl From<&PriceRecord> for RecordSummary {
    fn from(record: &PriceRecord) -> Self {
        Self {
            id: record.id,
            date: record.date.clone(),
            category: record.category,
            description: record.description.clone(),
            price: record.price,
            weight: record.weight,
            unit: record.unit,
            normalized_price: record.normalized_price,
            base_unit: record.base_unit().label(),
            display: record.display_line(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddRecordResponse {
    pub success: bool,
    pub record: RecordSummary,
}

#[derive(Debug, Serialize)]
pub struct RecentRecordsResponse {
    pub records: Vec<RecordSummary>,
    pub count: usize,
    pub window: usize,
}

#[derive(Debug, Serialize)]
pub struct PriceQuote {
    pub price: f64,
    pub weight: f64,
    pub unit: Unit,
    pub normalized_price: f64,
    pub base_unit: &'static str,
    pub display: String,
}

fn parse_number(raw: &str, field: &'static str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::InvalidNumber { field })
}

/// A finite price over a tiny quantity can still overflow to infinity
fn check_normalized(normalized_price: f64) -> Result<f64, ValidationError> {
    if normalized_price.is_finite() {
        Ok(normalized_price)
    } else {
        Err(ValidationError::PriceOutOfRange)
    }
}

fn parse_unit(raw: &str) -> Result<Unit, ValidationError> {
    Unit::from_str(raw).ok_or_else(|| ValidationError::UnknownUnit(raw.trim().to_string()))
}

/// Check raw input and turn it into a record ready to store.
///
/// Zero or negative weight is accepted; it normalizes to the 0 sentinel.
pub fn validate_entry(entry: &RecordEntry, today: NaiveDate) -> Result<PriceRecordCreate, ValidationError> {
    let price = parse_number(&entry.price, "price")?;
    let weight = parse_number(&entry.weight, "weight")?;
    if price < 0.0 {
        return Err(ValidationError::NegativePrice);
    }

    let category = match entry.category.as_deref().map(str::trim) {
        None | Some("") => return Err(ValidationError::MissingCategory),
        Some(raw) => Category::from_str(raw).ok_or_else(|| ValidationError::UnknownCategory(raw.to_string()))?,
    };

    let unit = parse_unit(&entry.unit)?;

    let date = match entry.date.as_deref().map(str::trim) {
        None | Some("") => today,
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(raw.to_string()))?,
    };

    let data = PriceRecordCreate {
        date: date.format("%Y-%m-%d").to_string(),
        category,
        description: entry.description.as_deref().unwrap_or("").trim().to_string(),
        price,
        weight,
        unit,
    };
    check_normalized(data.normalized_price())?;
    Ok(data)
}

/// Load the recent view from the store
pub fn load_history(db: &Database) -> DbResult<RecentHistory<PriceRecord>> {
    let newest_first = db.with_conn(|conn| PriceRecord::list_recent(conn, RECENT_WINDOW as i64))?;
    Ok(RecentHistory::from_oldest_first(
        RECENT_WINDOW,
        newest_first.into_iter().rev(),
    ))
}

/// Validate, store and display a new record
pub fn add_record(
    db: &Database,
    history: &mut RecentHistory<PriceRecord>,
    entry: &RecordEntry,
) -> Result<AddRecordResponse, RecordError> {
    let today = chrono::Local::now().date_naive();
    let data = validate_entry(entry, today)?;

    let record = db.with_conn(|conn| PriceRecord::create(conn, &data))?;
    info!(id = record.id, category = %record.category, norm_price = record.normalized_price, "price record added");

    let summary = RecordSummary::from(&record);
    history.push(record);

    Ok(AddRecordResponse {
        success: true,
        record: summary,
    })
}

/// Newest records first, bounded to the history window
pub fn recent_records(history: &RecentHistory<PriceRecord>) -> RecentRecordsResponse {
    let records: Vec<RecordSummary> = history.recent().iter().map(RecordSummary::from).collect();
    debug!(count = records.len(), "recent view rendered");

    RecentRecordsResponse {
        count: records.len(),
        window: history.window(),
        records,
    }
}

/// Normalize a shelf price without storing it
pub fn quote_price(price: f64, weight: f64, unit: &str) -> Result<PriceQuote, ValidationError> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidNumber { field: "price" });
    }
    if !weight.is_finite() {
        return Err(ValidationError::InvalidNumber { field: "weight" });
    }
    if price < 0.0 {
        return Err(ValidationError::NegativePrice);
    }
    let unit = parse_unit(unit)?;
    let normalized_price = check_normalized(normalize(price, weight, unit))?;
    let base_unit = unit.base_unit().label();

    Ok(PriceQuote {
        price,
        weight,
        unit,
        normalized_price,
        base_unit,
        display: format!("${:.2}/{}", normalized_price, base_unit),
    })
}
