use thiserror::Error;

/// Errors surfaced by [`TickerDataFetcher`](crate::fetcher::TickerDataFetcher).
///
/// None of these are retried internally. A multi-ticker fetch fails with the
/// first error raised by any of its requests.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Incompatible flags or an inverted date range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A date string was not in `YYYY-MM-DD` form.
    #[error("Failed to parse date '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The remote API answered with a non-2xx status.
    #[error("Failed to fetch data from {url} with status {status}: {body}")]
    RemoteFetch {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read snapshot {path}: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table: {0}")]
    MalformedTable(String),
}

impl FetchError {
    /// HTTP status for [`FetchError::RemoteFetch`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::RemoteFetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}
