use crate::config::AppConfig;
use crate::core::{
    DateRange, FetchDate, FetchError, FetchMode, TableSource, TickerData, TtlCache,
};
use crate::providers::{RemoteTableSource, SnapshotStore};
use chrono::NaiveDate;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Index served by the local snapshot and used when no ticker is given.
pub const BENCHMARK_TICKER: &str = "^GSPC";

/// Arguments of a fetch. Also the cache key, so two equal requests share a result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    tickers: Vec<String>,
    batch: bool,
    wsj: bool,
    quote: bool,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl FetchRequest {
    /// An empty ticker list means the benchmark. Repeated tickers keep their first position.
    ///
    /// Passing more than one ticker asks for a per-ticker mapping, even when
    /// the tickers collapse to a single unique symbol.
    pub fn new<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut given = 0;
        let mut unique: Vec<String> = Vec::new();
        for ticker in tickers.into_iter().map(Into::into) {
            given += 1;
            if !unique.contains(&ticker) {
                unique.push(ticker);
            }
        }
        if unique.is_empty() {
            unique.push(BENCHMARK_TICKER.to_string());
        }

        Self {
            tickers: unique,
            batch: given > 1,
            wsj: false,
            quote: false,
            start: None,
            end: None,
        }
    }

    pub fn benchmark() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Serve the benchmark from the local snapshot instead of the remote API.
    pub fn wsj(mut self, wsj: bool) -> Self {
        self.wsj = wsj;
        self
    }

    /// Ask for the current quote instead of a historical series.
    pub fn quote(mut self, quote: bool) -> Self {
        self.quote = quote;
        self
    }

    pub fn start<D>(mut self, date: D) -> Result<Self, FetchError>
    where
        D: TryInto<FetchDate, Error = FetchError>,
    {
        self.start = Some(date.try_into()?.date());
        Ok(self)
    }

    pub fn end<D>(mut self, date: D) -> Result<Self, FetchError>
    where
        D: TryInto<FetchDate, Error = FetchError>,
    {
        self.end = Some(date.try_into()?.date());
        Ok(self)
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn is_wsj(&self) -> bool {
        self.wsj
    }

    pub fn is_quote(&self) -> bool {
        self.quote
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }

    /// Checks flag and range consistency. Quote requests skip the range check.
    pub fn validate(&self) -> Result<(), FetchError> {
        if !self.quote {
            self.range().validate()?;
        }

        if self.wsj && self.tickers.iter().any(|t| t != BENCHMARK_TICKER) {
            return Err(FetchError::InvalidArgument(format!(
                "Wall Street Journal data is only available for {BENCHMARK_TICKER}, got {}",
                self.tickers.join(", ")
            )));
        }
        Ok(())
    }

    fn mode(&self, today: NaiveDate) -> FetchMode {
        if self.quote {
            FetchMode::Quote { today }
        } else {
            FetchMode::History(self.range())
        }
    }
}

/// Fetches ticker tables and memoizes successful results per [`FetchRequest`].
///
/// Concurrent callers that miss on the same request may each reach the
/// source; whichever finishes last overwrites the cached value.
pub struct TickerDataFetcher {
    source: Arc<dyn TableSource>,
    snapshot: SnapshotStore,
    cache: TtlCache<FetchRequest, Arc<TickerData>>,
}

impl TickerDataFetcher {
    pub fn new(
        source: Arc<dyn TableSource>,
        snapshot: SnapshotStore,
        cache: TtlCache<FetchRequest, Arc<TickerData>>,
    ) -> Self {
        Self {
            source,
            snapshot,
            cache,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let source = RemoteTableSource::new(&config.data_endpoint)?;
        let snapshot = config
            .snapshot_path
            .as_ref()
            .map_or_else(SnapshotStore::bundled, SnapshotStore::new);
        let cache = TtlCache::new(config.cache.ttl(), config.cache.capacity);
        Ok(Self::new(Arc::new(source), snapshot, cache))
    }

    pub fn cache(&self) -> &TtlCache<FetchRequest, Arc<TickerData>> {
        &self.cache
    }

    #[instrument(
        name = "TickerFetch",
        skip(self, request),
        fields(tickers = ?request.tickers(), wsj = request.is_wsj(), quote = request.is_quote())
    )]
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Arc<TickerData>, FetchError> {
        request.validate()?;

        if let Some(cached) = self.cache.get(request).await {
            return Ok(cached);
        }

        let data = if request.wsj {
            TickerData::Single(self.snapshot.load(&request.range()).await?)
        } else {
            self.fetch_remote(request).await?
        };

        let data = Arc::new(data);
        self.cache.put(request.clone(), Arc::clone(&data)).await;
        Ok(data)
    }

    async fn fetch_remote(&self, request: &FetchRequest) -> Result<TickerData, FetchError> {
        let mode = request.mode(chrono::Local::now().date_naive());

        if let (false, [ticker]) = (request.batch, request.tickers()) {
            return Ok(TickerData::Single(
                self.source.fetch_table(ticker, mode).await?,
            ));
        }

        debug!(count = request.tickers().len(), "Fetching tickers concurrently");
        let tables = try_join_all(
            request
                .tickers()
                .iter()
                .map(|ticker| self.source.fetch_table(ticker, mode)),
        )
        .await?;

        Ok(TickerData::Many(
            request.tickers().iter().cloned().zip(tables).collect(),
        ))
    }

    /// Drops the cached result for `request`, if any.
    pub async fn invalidate(&self, request: &FetchRequest) {
        self.cache.remove(request).await;
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}
