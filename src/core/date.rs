//! Date handling at the API boundary

use crate::core::error::FetchError;
use chrono::NaiveDate;
use std::fmt::Display;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar date accepted by the fetcher. String input is parsed once here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct FetchDate(NaiveDate);

impl FetchDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl Display for FetchDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for FetchDate {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(FetchDate)
            .map_err(|source| FetchError::Parse {
                input: s.to_string(),
                source,
            })
    }
}

impl TryFrom<&str> for FetchDate {
    type Error = FetchError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for FetchDate {
    type Error = FetchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<NaiveDate> for FetchDate {
    type Error = FetchError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        Ok(FetchDate(value))
    }
}

impl From<FetchDate> for NaiveDate {
    fn from(value: FetchDate) -> Self {
        value.0
    }
}

/// Inclusive, optionally open-ended date bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Rejects ranges whose end precedes their start.
    pub fn validate(&self) -> Result<(), FetchError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end < start => Err(FetchError::InvalidArgument(format!(
                "End date {} must not precede start date {}",
                end.format(DATE_FORMAT),
                start.format(DATE_FORMAT)
            ))),
            _ => Ok(()),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        let date: FetchDate = "2020-01-31".parse().unwrap();
        assert_eq!(date.date(), ymd(2020, 1, 31));
        assert_eq!(date.to_string(), "2020-01-31");
    }

    #[test]
    fn test_parse_rejects_malformed_dates() {
        for input in ["2020/01/31", "31-01-2020", "2020-13-01", "", "yesterday"] {
            let err = FetchDate::try_from(input).unwrap_err();
            assert!(
                matches!(err, FetchError::Parse { input: ref i, .. } if i == input),
                "expected parse error for {input:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_range_validation() {
        let ok = DateRange::new(Some(ymd(2020, 1, 1)), Some(ymd(2020, 1, 1)));
        assert!(ok.validate().is_ok());

        let open = DateRange::new(None, Some(ymd(2020, 1, 1)));
        assert!(open.validate().is_ok());

        let inverted = DateRange::new(Some(ymd(2020, 2, 1)), Some(ymd(2020, 1, 1)));
        assert!(matches!(
            inverted.validate(),
            Err(FetchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = DateRange::new(Some(ymd(2020, 1, 1)), Some(ymd(2020, 1, 31)));
        assert!(range.contains(ymd(2020, 1, 1)));
        assert!(range.contains(ymd(2020, 1, 31)));
        assert!(!range.contains(ymd(2019, 12, 31)));
        assert!(!range.contains(ymd(2020, 2, 1)));

        assert!(DateRange::default().contains(ymd(1978, 1, 3)));
    }
}
