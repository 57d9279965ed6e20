use crate::core::date::DATE_FORMAT;
use crate::core::{FetchError, FetchMode, TableSource, TickerTable};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument};

const TABLE_MEDIA_TYPE: &str = "application/json";

/// Fetches ticker tables from the remote data API.
///
/// Requests go to `{endpoint}/ticker/{quote|history}/{ticker}`.
pub struct RemoteTableSource {
    endpoint: Url,
    client: reqwest::Client,
}

impl RemoteTableSource {
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            FetchError::InvalidArgument(format!("Invalid data endpoint '{endpoint}': {e}"))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(FetchError::InvalidArgument(format!(
                "Data endpoint '{endpoint}' cannot be used as a base URL"
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("tickerdata/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { endpoint, client })
    }

    /// Builds the request URL for `ticker` in the given mode.
    pub fn request_url(&self, ticker: &str, mode: &FetchMode) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["ticker", mode.endpoint(), ticker]);
        }

        match mode {
            FetchMode::Quote { today } => {
                url.query_pairs_mut()
                    .append_pair("start_date", &today.format(DATE_FORMAT).to_string());
            }
            FetchMode::History(range) => {
                if let Some(start) = range.start {
                    url.query_pairs_mut()
                        .append_pair("start_date", &start.format(DATE_FORMAT).to_string());
                }
                if let Some(end) = range.end {
                    url.query_pairs_mut()
                        .append_pair("end_date", &end.format(DATE_FORMAT).to_string());
                }
            }
        }
        url
    }
}

#[async_trait]
impl TableSource for RemoteTableSource {
    #[instrument(
        name = "RemoteTableFetch",
        skip(self),
        fields(ticker = %ticker, mode = %mode)
    )]
    async fn fetch_table(&self, ticker: &str, mode: FetchMode) -> Result<TickerTable, FetchError> {
        let url = self.request_url(ticker, &mode);
        debug!("Requesting ticker data from {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, TABLE_MEDIA_TYPE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(FetchError::RemoteFetch {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Received ticker data response");
        let table = TickerTable::from_json_slice(&bytes, &format!("{mode} response for {ticker}"))?;

        Ok(match mode {
            FetchMode::History(range) => table.filter_range(&range),
            FetchMode::Quote { .. } => table,
        })
    }
}
