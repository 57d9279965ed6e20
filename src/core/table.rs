//! Tabular price data

use crate::core::date::{DATE_FORMAT, DateRange};
use crate::core::error::FetchError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// Rows indexed by date with named price columns.
///
/// On the wire a table uses the split layout:
/// `{"columns": [..], "index": ["YYYY-MM-DD", ..], "data": [[..], ..]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "SplitTable", into = "SplitTable")]
pub struct TickerTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SplitTable {
    columns: Vec<String>,
    index: Vec<String>,
    data: Vec<Vec<Option<f64>>>,
}

fn parse_index_date(raw: &str) -> Result<NaiveDate, FetchError> {
    // Accept full timestamps, keep only the date part
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|source| FetchError::Parse {
        input: raw.to_string(),
        source,
    })
}

impl TryFrom<SplitTable> for TickerTable {
    type Error = FetchError;

    fn try_from(split: SplitTable) -> Result<Self, Self::Error> {
        if split.index.len() != split.data.len() {
            return Err(FetchError::MalformedTable(format!(
                "index has {} entries but data has {} rows",
                split.index.len(),
                split.data.len()
            )));
        }

        let rows = split
            .index
            .iter()
            .zip(split.data)
            .map(|(raw_date, values)| {
                if values.len() != split.columns.len() {
                    return Err(FetchError::MalformedTable(format!(
                        "row {raw_date} has {} values for {} columns",
                        values.len(),
                        split.columns.len()
                    )));
                }
                Ok(TableRow {
                    date: parse_index_date(raw_date)?,
                    values,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TickerTable::new(split.columns, rows))
    }
}

impl From<TickerTable> for SplitTable {
    fn from(table: TickerTable) -> Self {
        let (index, data) = table
            .rows
            .into_iter()
            .map(|row| (row.date.format(DATE_FORMAT).to_string(), row.values))
            .unzip();
        SplitTable {
            columns: table.columns,
            index,
            data,
        }
    }
}

impl TickerTable {
    /// Builds a table, ordering rows by date. Rows shorter than `columns` read as missing values.
    pub fn new(columns: Vec<String>, mut rows: Vec<TableRow>) -> Self {
        rows.sort_by_key(|row| row.date);
        Self { columns, rows }
    }

    /// Decodes a JSON payload, naming `context` in the error on failure.
    pub fn from_json_slice(bytes: &[u8], context: &str) -> Result<Self, FetchError> {
        serde_json::from_slice(bytes).map_err(|source| FetchError::Decode {
            context: context.to_string(),
            source,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|row| row.date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|row| row.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.date)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Values of one column in date order. Column lookup ignores case.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.values.get(idx).copied().flatten())
                .collect(),
        )
    }

    pub fn value(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .find(|row| row.date == date)
            .and_then(|row| row.values.get(idx).copied().flatten())
    }

    /// Keeps rows whose date falls inside `range`, bounds inclusive.
    pub fn filter_range(self, range: &DateRange) -> Self {
        if range.is_unbounded() {
            return self;
        }
        Self {
            columns: self.columns,
            rows: self
                .rows
                .into_iter()
                .filter(|row| range.contains(row.date))
                .collect(),
        }
    }
}

/// Result of a fetch: one table, or one table per ticker in request order.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerData {
    Single(TickerTable),
    Many(Vec<(String, TickerTable)>),
}

impl TickerData {
    pub fn as_single(&self) -> Option<&TickerTable> {
        match self {
            TickerData::Single(table) => Some(table),
            TickerData::Many(_) => None,
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerTable> {
        match self {
            TickerData::Single(_) => None,
            TickerData::Many(tables) => tables
                .iter()
                .find(|(name, _)| name == ticker)
                .map(|(_, table)| table),
        }
    }

    /// Ticker names for [`TickerData::Many`], in request order.
    pub fn tickers(&self) -> Vec<&str> {
        match self {
            TickerData::Single(_) => Vec::new(),
            TickerData::Many(tables) => tables.iter().map(|(name, _)| name.as_str()).collect(),
        }
    }

    pub fn tables(&self) -> Vec<&TickerTable> {
        match self {
            TickerData::Single(table) => vec![table],
            TickerData::Many(tables) => tables.iter().map(|(_, table)| table).collect(),
        }
    }
}
