//! Runtime configuration
//!
//! Paths come from the environment, falling back to a `data/` directory next to
//! the project root.

use std::path::PathBuf;

/// Overrides the database file location
pub const DATABASE_PATH_VAR: &str = "GROCERY_DATABASE_PATH";
/// Overrides the directory used for the database, exports and charts
pub const DATA_DIR_VAR: &str = "GROCERY_DATA_DIR";

const DATABASE_FILE: &str = "grocery.db";
const EXPORT_FILE: &str = "grocery_prices.csv";
const CHART_FILE: &str = "recent_prices.png";

/// Get the data directory from environment or use default
pub fn data_dir() -> PathBuf {
    std::env::var(DATA_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path
        })
}

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join(DATABASE_FILE))
}

pub fn default_export_path() -> PathBuf {
    data_dir().join(EXPORT_FILE)
}

pub fn default_chart_path() -> PathBuf {
    data_dir().join(CHART_FILE)
}
