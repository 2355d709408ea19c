//! Grocery tracker tools
//!
//! Operations behind the MCP tools. Each takes an explicit store handle.

pub mod charts;
pub mod export;
pub mod records;
pub mod status;
