//! NPI Grocery Tracker Library
//!
//! Price normalization, record storage, charting and export for grocery price
//! tracking.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod pricing;
pub mod tools;
