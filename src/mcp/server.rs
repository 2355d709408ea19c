//! Grocery Tracker MCP Server Implementation
//!
//! Exposes the price tracking tools over MCP.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config;
use crate::db::{Database, DbResult};
use crate::models::PriceRecord;
use crate::pricing::RecentHistory;
use crate::tools::records::{self, RecordEntry, RecordError};
use crate::tools::status::StatusTracker;
use crate::tools::{charts, export};

/// Grocery Tracker MCP Service
#[derive(Clone)]
pub struct GroceryService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    /// Records currently shown in the recent view
    history: Arc<std::sync::Mutex<RecentHistory<PriceRecord>>>,
    tool_router: ToolRouter<GroceryService>,
}

impl GroceryService {
    /// Build the service, seeding the recent view from the store
    pub fn new(database_path: PathBuf, database: Database) -> DbResult<Self> {
        let history = records::load_history(&database)?;
        Ok(Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            history: Arc::new(std::sync::Mutex::new(history)),
            tool_router: Self::tool_router(),
        })
    }

    fn lock_history(&self) -> Result<std::sync::MutexGuard<'_, RecentHistory<PriceRecord>>, McpError> {
        self.history
            .lock()
            .map_err(|_| McpError::internal_error("Recent history lock poisoned", None))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddPriceRecordParams {
    /// Shelf price as entered, e.g. "4.49"
    pub price: String,
    /// Package quantity as entered, e.g. "500"
    pub weight: String,
    /// Unit of the quantity: kg, g, L, ml or pcs
    pub unit: String,
    /// Category: produce, dairy, meat, seafood, bakery, pantry, frozen, beverages, snacks, household, other
    pub category: Option<String>,
    /// Free-text description, e.g. "Cheddar"
    pub description: Option<String>,
    /// Date in ISO format: YYYY-MM-DD (defaults to today)
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QuotePriceParams {
    pub price: f64,
    pub weight: f64,
    /// kg, g, L, ml or pcs
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportPriceRecordsParams {
    /// Destination CSV path (defaults to the data directory)
    pub file_path: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GeneratePriceChartParams {
    /// Destination PNG path (defaults to the data directory)
    pub file_path: Option<String>,
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

fn default_chart_width() -> u32 { 800 }
fn default_chart_height() -> u32 { 400 }

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl GroceryService {
    // --- Status ---

    #[tool(description = "Get the current status of the grocery tracker including build info, database status, and process information")]
    async fn grocery_status(&self) -> Result<CallToolResult, McpError> {
        let total_records = self.database.with_conn(PriceRecord::count).ok();
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status(total_records))
    }

    #[tool(description = "Get instructions for entering grocery prices: fields, units, categories and how normalized prices are computed")]
    fn price_entry_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::PRICE_ENTRY_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(PRICE_ENTRY_INSTRUCTIONS)]))
    }

    // --- Records ---

    #[tool(description = "Add a grocery price record. Computes the price per kg, L or piece and adds it to the recent view.")]
    fn add_price_record(&self, Parameters(p): Parameters<AddPriceRecordParams>) -> Result<CallToolResult, McpError> {
        let entry = RecordEntry {
            price: p.price,
            weight: p.weight,
            unit: p.unit,
            category: p.category,
            description: p.description,
            date: p.date,
        };
        let mut history = self.lock_history()?;
        let result = records::add_record(&self.database, &mut history, &entry).map_err(|e| match e {
            RecordError::Validation(v) => McpError::invalid_params(v.to_string(), None),
            RecordError::Database(d) => McpError::internal_error(d.to_string(), None),
        })?;
        to_json(&result)
    }

    #[tool(description = "List the five most recent price records, newest first")]
    fn recent_price_records(&self) -> Result<CallToolResult, McpError> {
        let history = self.lock_history()?;
        to_json(&records::recent_records(&history))
    }

    #[tool(description = "Compute the normalized price (per kg, L or piece) for a price and quantity without storing it")]
    fn quote_price(&self, Parameters(p): Parameters<QuotePriceParams>) -> Result<CallToolResult, McpError> {
        let quote = records::quote_price(p.price, p.weight, &p.unit)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        to_json(&quote)
    }

    // --- Output ---

    #[tool(description = "Export all price records to a CSV file for spreadsheets")]
    fn export_price_records(&self, Parameters(p): Parameters<ExportPriceRecordsParams>) -> Result<CallToolResult, McpError> {
        let path = p.file_path.map(PathBuf::from).unwrap_or_else(config::default_export_path);
        let result = export::export_records(&self.database, &path)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        to_json(&result)
    }

    #[tool(description = "Render a PNG bar chart of normalized prices for the recent records")]
    fn generate_price_chart(&self, Parameters(p): Parameters<GeneratePriceChartParams>) -> Result<CallToolResult, McpError> {
        charts::check_dimensions(p.width, p.height)
            .map_err(|e| McpError::invalid_params(e, None))?;
        let path = p.file_path.map(PathBuf::from).unwrap_or_else(config::default_chart_path);
        // Render outside the history lock
        let history = self.lock_history()?.clone();
        let result = charts::generate_price_chart(&history, &path, p.width, p.height)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for GroceryService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "grocery-tracker".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("NPI Grocery Tracker".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "NPI Grocery Tracker - grocery price tracking with unit price comparison. \
                 Call price_entry_instructions before entering prices. \
                 Records: add_price_record, recent_price_records, quote_price. \
                 Output: generate_price_chart (PNG), export_price_records (CSV). \
                 Status: grocery_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use rmcp::model::ErrorCode;

    fn test_service(dir: &std::path::Path) -> GroceryService {
        let db_path = dir.join("grocery.db");
        let db = Database::new(&db_path).unwrap();
        db.with_conn(run_migrations).unwrap();
        GroceryService::new(db_path, db).unwrap()
    }

    fn add_params(price: &str) -> AddPriceRecordParams {
        AddPriceRecordParams {
            price: price.to_string(),
            weight: "500".to_string(),
            unit: "g".to_string(),
            category: Some("dairy".to_string()),
            description: Some("Cheddar".to_string()),
            date: None,
        }
    }

    #[test]
    fn test_add_price_record_invalid_input_is_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let err = service.add_price_record(Parameters(add_params("abc"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(service.lock_history().unwrap().is_empty());

        assert!(service.add_price_record(Parameters(add_params("4.50"))).is_ok());
        assert_eq!(service.lock_history().unwrap().len(), 1);
    }

    #[test]
    fn test_export_io_failure_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let params = ExportPriceRecordsParams {
            file_path: Some(dir.path().display().to_string()),
        };
        let err = service.export_price_records(Parameters(params)).unwrap_err();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_chart_dimensions_are_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());
        service.add_price_record(Parameters(add_params("4.50"))).unwrap();

        let params = GeneratePriceChartParams {
            file_path: Some(dir.path().join("chart.png").display().to_string()),
            width: 70000,
            height: 70000,
        };
        let err = service.generate_price_chart(Parameters(params)).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(!dir.path().join("chart.png").exists());
    }

    #[test]
    fn test_quote_price_negative_is_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let service = test_service(dir.path());

        let params = QuotePriceParams { price: -1.0, weight: 1.0, unit: "kg".to_string() };
        let err = service.quote_price(Parameters(params)).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn test_new_seeds_history_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("grocery.db");
        let db = Database::new(&db_path).unwrap();
        db.with_conn(run_migrations).unwrap();

        let mut history = RecentHistory::default();
        let entry = RecordEntry {
            price: "2.00".to_string(),
            weight: "1".to_string(),
            unit: "L".to_string(),
            category: Some("dairy".to_string()),
            description: Some("Milk".to_string()),
            date: None,
        };
        records::add_record(&db, &mut history, &entry).unwrap();

        let service = GroceryService::new(db_path, db).unwrap();
        let seeded = service.lock_history().unwrap().recent();
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].description, "Milk");
    }
}
