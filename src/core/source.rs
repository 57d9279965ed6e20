//! Table source abstractions

use crate::core::date::DateRange;
use crate::core::error::FetchError;
use crate::core::table::TickerTable;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Display;

/// What kind of table to ask a source for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Latest quote, stamped with the caller's current date.
    Quote { today: NaiveDate },
    /// Historical series within the given bounds.
    History(DateRange),
}

impl FetchMode {
    pub fn endpoint(&self) -> &'static str {
        match self {
            FetchMode::Quote { .. } => "quote",
            FetchMode::History(_) => "history",
        }
    }
}

impl Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch_table(&self, ticker: &str, mode: FetchMode) -> Result<TickerTable, FetchError>;
}
