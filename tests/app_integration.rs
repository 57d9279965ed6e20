use chrono::NaiveDate;
use std::fs;
use tickerdata::cli::fetch::FetchArgs;
use tickerdata::config::AppConfig;
use tickerdata::{BENCHMARK_TICKER, FetchError, FetchRequest, TickerDataFetcher};
use tracing::info;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils {
    use super::*;

    pub const HISTORY_BODY: &str = r#"{
        "columns": ["Open", "High", "Low", "Close", "Volume"],
        "index": ["2020-01-02", "2020-01-03", "2020-01-06"],
        "data": [
            [74.06, 75.15, 73.80, 75.09, 135480400],
            [74.29, 75.14, 74.13, 74.36, 146322800],
            [73.45, 74.99, 73.19, 74.95, 118387200]
        ]
    }"#;

    pub fn quote_body(price: f64) -> String {
        format!(
            r#"{{"columns": ["Price"], "index": ["{}"], "data": [[{price}]]}}"#,
            chrono::Local::now().date_naive().format("%Y-%m-%d")
        )
    }

    pub async fn mount_json(server: &MockServer, url_path: &str, body: String, times: u64) {
        Mock::given(method("GET"))
            .and(path(url_path))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(times)
            .mount(server)
            .await;
    }

    pub fn config_for(endpoint: &str, snapshot: &std::path::Path) -> AppConfig {
        let yaml = format!(
            r#"
            data_endpoint: "{endpoint}"
            snapshot_path: "{}"
            cache:
              ttl_secs: 3600
              capacity: 8
            "#,
            snapshot.display()
        );
        serde_yaml::from_str(&yaml).expect("Failed to parse test config")
    }
}

fn snapshot_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/HistoricalPrices_SPX.json")
}

#[test_log::test(tokio::test)]
async fn test_wsj_january_2020_from_snapshot() {
    // No mocks mounted: any request would fail with 404
    let mock_server = MockServer::start().await;
    let config = test_utils::config_for(&mock_server.uri(), &snapshot_path());
    let fetcher = TickerDataFetcher::from_config(&config).unwrap();

    let request = FetchRequest::new([BENCHMARK_TICKER])
        .wsj(true)
        .start("2020-01-01")
        .unwrap()
        .end("2020-01-31")
        .unwrap();
    let data = fetcher.fetch(&request).await.unwrap();
    let table = data.as_single().expect("single table");

    let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let last = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
    assert_eq!(table.len(), 7);
    assert!(table.dates().all(|d| d >= first && d <= last));
    assert_eq!(table.last_date(), Some(last));

    let received = mock_server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "wsj path must not hit the network");
}

#[test_log::test(tokio::test)]
async fn test_two_ticker_quote_returns_mapping() {
    let mock_server = MockServer::start().await;
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    for (ticker, price) in [("AAPL", 189.5), ("MSFT", 415.1)] {
        Mock::given(method("GET"))
            .and(path(format!("/ticker/quote/{ticker}")))
            .and(query_param("start_date", today.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(test_utils::quote_body(price)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = test_utils::config_for(&mock_server.uri(), &snapshot_path());
    let fetcher = TickerDataFetcher::from_config(&config).unwrap();

    let request = FetchRequest::new(["AAPL", "MSFT"]).quote(true);
    let data = fetcher.fetch(&request).await.unwrap();
    info!(?data, "Received quotes");

    assert_eq!(data.tickers(), vec!["AAPL", "MSFT"]);
    assert_eq!(
        data.get("AAPL").unwrap().column("price"),
        Some(vec![Some(189.5)])
    );
    assert_eq!(
        data.get("MSFT").unwrap().column("price"),
        Some(vec![Some(415.1)])
    );
}

#[test_log::test(tokio::test)]
async fn test_identical_calls_are_served_from_cache() {
    let mock_server = MockServer::start().await;
    test_utils::mount_json(
        &mock_server,
        "/ticker/history/AAPL",
        test_utils::HISTORY_BODY.to_string(),
        1,
    )
    .await;

    let config = test_utils::config_for(&mock_server.uri(), &snapshot_path());
    let fetcher = TickerDataFetcher::from_config(&config).unwrap();

    let request = FetchRequest::new(["AAPL"])
        .start("2020-01-01")
        .unwrap()
        .end("2020-01-03")
        .unwrap();
    let first = fetcher.fetch(&request).await.unwrap();
    let second = fetcher.fetch(&request).await.unwrap();

    assert_eq!(first, second);
    // Clipped to the requested range even though the server returned more
    assert_eq!(first.as_single().unwrap().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_default_ticker_is_benchmark() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/ticker/history/(\^|%5E)GSPC$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(test_utils::HISTORY_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_utils::config_for(&mock_server.uri(), &snapshot_path());
    let fetcher = TickerDataFetcher::from_config(&config).unwrap();

    let data = fetcher.fetch(&FetchRequest::benchmark()).await.unwrap();
    assert_eq!(data.as_single().unwrap().len(), 3);
}

#[test_log::test(tokio::test)]
async fn test_remote_error_carries_status_and_body() {
    let mock_server = MockServer::start().await;
    // The AAPL request may be dropped once BROKEN fails, so no call count is expected
    Mock::given(method("GET"))
        .and(path("/ticker/history/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string(test_utils::HISTORY_BODY))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ticker/history/BROKEN"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let config = test_utils::config_for(&mock_server.uri(), &snapshot_path());
    let fetcher = TickerDataFetcher::from_config(&config).unwrap();

    let err = fetcher
        .fetch(&FetchRequest::new(["AAPL", "BROKEN"]))
        .await
        .unwrap_err();
    match err {
        FetchError::RemoteFetch { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("Expected RemoteFetch error, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = MockServer::start().await;
    test_utils::mount_json(
        &mock_server,
        "/ticker/history/AAPL",
        test_utils::HISTORY_BODY.to_string(),
        1,
    )
    .await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        data_endpoint: {}
        snapshot_path: "{}"
        "#,
        mock_server.uri(),
        snapshot_path().display()
    );
    fs::write(config_path, &config_content).expect("Failed to write config file");

    let args = FetchArgs {
        tickers: vec!["AAPL".to_string()],
        start: Some("2020-01-01".to_string()),
        ..Default::default()
    };
    let result = tickerdata::run_command(
        tickerdata::AppCommand::Fetch(args),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_rejects_wsj_for_other_ticker() {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(config_file.path(), "data_endpoint: http://127.0.0.1:9\n")
        .expect("Failed to write config file");

    let args = FetchArgs {
        tickers: vec!["AAPL".to_string()],
        wsj: true,
        ..Default::default()
    };
    let result = tickerdata::run_command(
        tickerdata::AppCommand::Fetch(args),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FetchError>(),
        Some(FetchError::InvalidArgument(_))
    ));
}

#[test_log::test(tokio::test)]
async fn test_wsj_without_snapshot_path_uses_bundled_snapshot() {
    // Config lives outside the crate and names no snapshot file
    let config_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = config_dir.path().join("config.yaml");
    fs::write(&config_path, "data_endpoint: http://127.0.0.1:9\n")
        .expect("Failed to write config file");

    let config = AppConfig::load_from_path(&config_path).unwrap();
    assert!(config.snapshot_path.is_none());
    let fetcher = TickerDataFetcher::from_config(&config).unwrap();

    let request = FetchRequest::benchmark()
        .wsj(true)
        .start("2020-01-01")
        .unwrap()
        .end("2020-01-31")
        .unwrap();
    let data = fetcher.fetch(&request).await.unwrap();
    assert_eq!(data.as_single().expect("single table").len(), 7);
}
