//! Export all price records to CSV and print the recent view
//! Usage: cargo run --bin export_records -- [output.csv]

use std::path::PathBuf;

use grocery_tracker::{config, db, models::PriceRecord, pricing::RECENT_WINDOW, tools::export};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("grocery_tracker=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::default_export_path);

    let db_path = config::database_path();
    println!("Database: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = db::Database::new(&db_path)?;
    database.with_conn(db::migrations::run_migrations)?;

    let result = export::export_records(&database, &output)?;
    println!("Exported {} records to {}", result.records_exported, result.file_path);

    let recent = database.with_conn(|conn| PriceRecord::list_recent(conn, RECENT_WINDOW as i64))?;
    if !recent.is_empty() {
        println!("\nMost recent:");
        for record in &recent {
            println!("  {}  {}", record.date, record.display_line());
        }
    }

    Ok(())
}
