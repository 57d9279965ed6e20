use super::ui;
use crate::core::TickerData;
use crate::fetcher::{BENCHMARK_TICKER, FetchRequest, TickerDataFetcher};
use anyhow::{Context, Result};

/// Arguments of the `fetch` command, dates still as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    pub tickers: Vec<String>,
    pub wsj: bool,
    pub quote: bool,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl FetchArgs {
    pub fn to_request(&self) -> Result<FetchRequest> {
        let mut request = FetchRequest::new(self.tickers.iter().cloned())
            .wsj(self.wsj)
            .quote(self.quote);
        if let Some(start) = &self.start {
            request = request
                .start(start.as_str())
                .context("Invalid --start date")?;
        }
        if let Some(end) = &self.end {
            request = request.end(end.as_str()).context("Invalid --end date")?;
        }
        Ok(request)
    }
}

/// Renders fetched data, one titled table per ticker.
pub fn display_ticker_data(request: &FetchRequest, data: &TickerData) -> String {
    let titled: Vec<(&str, _)> = match data {
        TickerData::Single(table) => {
            let name = request
                .tickers()
                .first()
                .map_or(BENCHMARK_TICKER, String::as_str);
            vec![(name, table)]
        }
        TickerData::Many(tables) => tables.iter().map(|(t, table)| (t.as_str(), table)).collect(),
    };

    titled
        .into_iter()
        .map(|(ticker, table)| {
            let title = ui::style_text(ticker, ui::StyleType::Title);
            if table.is_empty() {
                format!(
                    "{title}\n{}",
                    ui::style_text("No rows in range", ui::StyleType::Subtle)
                )
            } else {
                format!("{title}\n{}", ui::render_ticker_table(table))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub async fn run(fetcher: &TickerDataFetcher, args: &FetchArgs) -> Result<()> {
    let request = args.to_request()?;
    match fetcher.fetch(&request).await {
        Ok(data) => {
            println!("{}", display_ticker_data(&request, &data));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
            Err(e).context("Fetch failed")
        }
    }
}
