//! Data models
//!
//! Rust structs representing database entities.

mod category;
mod price_record;

pub use category::Category;
pub use price_record::{PriceRecord, PriceRecordCreate};
