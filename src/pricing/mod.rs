//! Pricing module
//!
//! Unit normalization and recent-history selection.

pub mod history;
pub mod units;

pub use history::{select_recent, RecentHistory, RECENT_WINDOW};
pub use units::{base_unit_label, normalize, BaseUnit, Unit};
