//! Core types shared by the fetcher and its sources

pub mod cache;
pub mod date;
pub mod error;
pub mod log;
pub mod source;
pub mod table;

// Re-export main types for cleaner imports
pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use date::{DateRange, FetchDate};
pub use error::FetchError;
pub use source::{FetchMode, TableSource};
pub use table::{TableRow, TickerData, TickerTable};
