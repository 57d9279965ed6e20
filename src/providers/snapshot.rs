use crate::core::{DateRange, FetchError, TickerTable};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Benchmark snapshot compiled into the binary, used when no file is configured.
const BUNDLED_SNAPSHOT: &[u8] = include_bytes!("../../data/HistoricalPrices_SPX.json");

#[derive(Debug, Clone, PartialEq, Eq)]
enum SnapshotSource {
    Bundled,
    File(PathBuf),
}

/// Read-only archival table for the benchmark index.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    source: SnapshotSource,
}

impl SnapshotStore {
    /// Reads the snapshot from `path` on every load.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source: SnapshotSource::File(path.as_ref().to_path_buf()),
        }
    }

    /// Serves the snapshot shipped with the crate.
    pub fn bundled() -> Self {
        Self {
            source: SnapshotSource::Bundled,
        }
    }

    fn describe(&self) -> String {
        match &self.source {
            SnapshotSource::Bundled => "bundled snapshot".to_string(),
            SnapshotSource::File(path) => format!("snapshot {}", path.display()),
        }
    }

    async fn read(&self) -> Result<Cow<'static, [u8]>, FetchError> {
        match &self.source {
            SnapshotSource::Bundled => Ok(Cow::Borrowed(BUNDLED_SNAPSHOT)),
            SnapshotSource::File(path) => tokio::fs::read(path)
                .await
                .map(Cow::Owned)
                .map_err(|source| FetchError::Snapshot {
                    path: path.display().to_string(),
                    source,
                }),
        }
    }

    /// Reads the snapshot and keeps the rows inside `range`.
    #[instrument(name = "SnapshotLoad", skip(self), fields(source = %self.describe()))]
    pub async fn load(&self, range: &DateRange) -> Result<TickerTable, FetchError> {
        let bytes = self.read().await?;
        debug!(bytes = bytes.len(), "Read snapshot");

        let table = TickerTable::from_json_slice(&bytes, &self.describe())?.filter_range(range);

        info!(rows = table.len(), "Loaded benchmark snapshot");
        Ok(table)
    }
}
