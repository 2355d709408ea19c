//! Status tool
//!
//! Runtime status of the grocery tracker service, plus the usage guide served
//! to MCP clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Price entry instructions for assistants driving the tools
pub const PRICE_ENTRY_INSTRUCTIONS: &str = r#"
# Grocery Price Entry

Each record is one shelf observation: what the item cost and how much of it
you get. The tracker converts it to a price per standard unit so different
package sizes can be compared.

## Fields

| Field | Required | Notes |
|-------|----------|-------|
| price | yes | Shelf price as a number, e.g. "4.49" |
| weight | yes | Package quantity as a number, in `unit` |
| unit | yes | kg, g, L, ml or pcs |
| category | yes | produce, dairy, meat, seafood, bakery, pantry, frozen, beverages, snacks, household, other |
| description | no | Brand / product, e.g. "Cheddar 500g" |
| date | no | YYYY-MM-DD, defaults to today |

## Normalized price

| Unit entered | Compared per |
|--------------|--------------|
| kg, g | kg |
| L, ml | L |
| pcs | piece |

Examples:
- $10 for 500 g -> $20.00/kg
- $5 for 1000 ml -> $5.00/L
- A weight of 0 stores a normalized price of 0 (no meaningful unit price).

## Tools

- `add_price_record` - validate and store an entry
- `recent_price_records` - the five newest records, newest first
- `quote_price` - compute a unit price without storing anything
- `generate_price_chart` - PNG bar chart of the recent records
- `export_price_records` - CSV of every record for a spreadsheet
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct GroceryStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub total_records: Option<i64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status; `total_records` is `None` when the store could not be read
    pub fn get_status(&self, total_records: Option<i64>) -> GroceryStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        GroceryStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            total_records,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
