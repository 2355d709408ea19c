//! CSV export
//!
//! Writes every stored record to a spreadsheet-compatible file.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::db::{Database, DbError};
use crate::models::PriceRecord;

const HEADER: [&str; 8] = [
    "id", "date", "category", "description", "price", "weight", "unit", "norm_price",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DbError),
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub success: bool,
    pub file_path: String,
    pub records_exported: usize,
}

#[derive(Serialize)]
struct ExportRow<'a> {
    id: i64,
    date: &'a str,
    category: &'a str,
    description: &'a str,
    price: f64,
    weight: f64,
    unit: &'a str,
    norm_price: f64,
}

impl<'a> From<&'a PriceRecord> for ExportRow<'a> {
    fn from(record: &'a PriceRecord) -> Self {
        Self {
            id: record.id,
            date: &record.date,
            category: record.category.as_str(),
            description: &record.description,
            price: record.price,
            weight: record.weight,
            unit: record.unit.as_str(),
            norm_price: record.normalized_price,
        }
    }
}

/// Write records as CSV rows, header first
pub fn write_records<W: std::io::Write>(writer: W, records: &[PriceRecord]) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for record in records {
        csv_writer.serialize(ExportRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn export_to(db: &Database, path: &Path) -> Result<usize, ExportError> {
    let records = db.with_conn(PriceRecord::list_all)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    write_records(file, &records)?;
    Ok(records.len())
}

/// Export all stored records to `path`.
///
/// Failures are logged and returned to the caller.
pub fn export_records(db: &Database, path: &Path) -> Result<ExportResponse, ExportError> {
    match export_to(db, path) {
        Ok(count) => {
            info!(path = %path.display(), records = count, "exported price records");
            Ok(ExportResponse {
                success: true,
                file_path: path.display().to_string(),
                records_exported: count,
            })
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "export failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{Category, PriceRecordCreate};
    use crate::pricing::Unit;

    fn test_db(dir: &Path) -> Database {
        let db = Database::new(dir.join("grocery.db")).unwrap();
        db.with_conn(run_migrations).unwrap();
        db
    }

    fn insert(db: &Database, description: &str, price: f64, weight: f64, unit: Unit) {
        let data = PriceRecordCreate {
            date: "2025-03-01".to_string(),
            category: Category::Pantry,
            description: description.to_string(),
            price,
            weight,
            unit,
        };
        db.with_conn(|conn| PriceRecord::create(conn, &data)).unwrap();
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(dir.path());
        insert(&db, "Rice", 3.0, 2.0, Unit::Kg);
        insert(&db, "Olive oil, extra virgin", 8.0, 500.0, Unit::Ml);
        insert(&db, "Eggs", 4.0, 12.0, Unit::Pcs);

        let path = dir.path().join("out").join("prices.csv");
        let response = export_records(&db, &path).unwrap();
        assert_eq!(response.records_exported, 3);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "id,date,category,description,price,weight,unit,norm_price");
        assert_eq!(lines[1], "1,2025-03-01,pantry,Rice,3.0,2.0,kg,1.5");
        assert_eq!(lines[2], "2,2025-03-01,pantry,\"Olive oil, extra virgin\",8.0,500.0,ml,16.0");
    }

    #[test]
    fn test_export_empty_store_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(dir.path());

        let path = dir.path().join("empty.csv");
        let response = export_records(&db, &path).unwrap();
        assert_eq!(response.records_exported, 0);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim_end(), "id,date,category,description,price,weight,unit,norm_price");
    }

    #[test]
    fn test_export_to_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(dir.path());

        let result = export_records(&db, dir.path());
        assert!(matches!(result, Err(ExportError::Io(_))));
    }
}
