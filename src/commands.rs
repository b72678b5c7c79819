use crate::render;
use crate::{AnalyzeArgs, CompareArgs, SingleArgs, WindowArgs};
use analytics::{comparison_chart, AnalysisParams, AnalyticsEngine, ComparisonChart};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use configuration::{DataSourceKind, MarketDataSettings, Settings};
use core_types::{find_ticker, PriceField, PriceSeries, Ticker};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use market_data::error::MarketDataError;
use market_data::{CsvSource, PriceSource, YahooClient};
use std::sync::Arc;
use std::time::Duration;

/// Creates the configured price source.
pub fn build_source(
    kind: DataSourceKind,
    settings: &MarketDataSettings,
) -> anyhow::Result<Arc<dyn PriceSource>> {
    let source: Arc<dyn PriceSource> = match kind {
        DataSourceKind::Csv => Arc::new(CsvSource::new(&settings.data_dir)),
        DataSourceKind::Yahoo => Arc::new(
            YahooClient::new(Duration::from_secs(settings.request_timeout_secs))
                .context("failed to build the Yahoo client")?,
        ),
    };
    Ok(source)
}

// ==============================================================================
// Tickers
// ==============================================================================

pub fn handle_tickers(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", render::tickers_table(&settings.universe));
    Ok(())
}

// ==============================================================================
// Single
// ==============================================================================

pub async fn handle_single(
    args: SingleArgs,
    settings: &Settings,
    source: Arc<dyn PriceSource>,
) -> anyhow::Result<()> {
    let (start, end) = resolve_window(args.window, &settings.market_data)?;
    let symbol = resolve_symbol(&settings.universe, &args.symbol);
    let fields = if args.fields.is_empty() {
        vec![PriceField::Close]
    } else {
        dedup_fields(args.fields)
    };

    let series = source
        .fetch_daily(&symbol, start, end)
        .await
        .with_context(|| format!("failed to fetch prices for {}", symbol))?;
    let series = keep_tail(series, args.tail);

    if args.json {
        println!("{}", render::single_json(&series, &fields)?);
    } else {
        if let Some(ticker) = find_ticker(&settings.universe, &symbol) {
            println!("{} ({})", ticker.company, ticker.symbol);
        }
        println!("{}", render::single_table(&series, &fields));
    }
    Ok(())
}

// ==============================================================================
// Compare
// ==============================================================================

pub async fn handle_compare(
    args: CompareArgs,
    settings: &Settings,
    source: Arc<dyn PriceSource>,
) -> anyhow::Result<()> {
    if args.stocks.is_empty() {
        println!("Please select at least one stock to compare.");
        return Ok(());
    }

    let (start, end) = resolve_window(args.window, &settings.market_data)?;
    let tickers = resolve_tickers(&settings.universe, &args.stocks)?;
    let symbols: Vec<String> = tickers.iter().map(|t| t.symbol.clone()).collect();

    let mut series = Vec::with_capacity(symbols.len());
    for (symbol, result) in fetch_all(source, &symbols, start, end).await {
        series.push(result.with_context(|| format!("failed to fetch prices for {}", symbol))?);
    }

    let chart = keep_chart_tail(comparison_chart(&series, args.field), args.tail);

    let names: Vec<&str> = tickers.iter().map(|t| t.display_name.as_str()).collect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
    } else {
        println!("{}", render::comparison_table(&chart, &names));
    }
    Ok(())
}

// ==============================================================================
// Analyze
// ==============================================================================

pub async fn handle_analyze(
    args: AnalyzeArgs,
    settings: &Settings,
    source: Arc<dyn PriceSource>,
) -> anyhow::Result<()> {
    let (start, end) = resolve_window(args.window, &settings.market_data)?;
    let params = resolve_params(&args, settings)?;
    let benchmark_symbol = resolve_symbol(
        &settings.universe,
        args.benchmark.as_deref().unwrap_or(&settings.analysis.benchmark),
    );
    let symbols: Vec<String> = args
        .symbols
        .iter()
        .map(|s| resolve_symbol(&settings.universe, s))
        .collect();

    tracing::info!(
        symbols = ?symbols,
        benchmark = %benchmark_symbol,
        alignment = %params.alignment,
        annualization = %params.annualization,
        "Starting analysis."
    );

    let mut wanted = symbols.clone();
    wanted.push(benchmark_symbol.clone());
    let mut fetched = fetch_all(source, &wanted, start, end).await;

    let (_, benchmark) = fetched.pop().context("benchmark fetch was not scheduled")?;
    let benchmark = Arc::new(
        benchmark.with_context(|| format!("failed to fetch benchmark {}", benchmark_symbol))?,
    );
    let data_window = match (benchmark.first_date(), benchmark.last_date()) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => "no benchmark data".to_string(),
    };
    tracing::debug!(benchmark = %benchmark_symbol, window = %data_window, "Benchmark loaded.");

    // Each instrument is independent, so every analysis gets its own blocking task.
    let engine = AnalyticsEngine::new(params);
    let tasks: Vec<_> = fetched
        .into_iter()
        .map(|(symbol, prices)| {
            let benchmark = Arc::clone(&benchmark);
            tokio::task::spawn_blocking(move || {
                let outcome = match prices {
                    Ok(prices) => engine
                        .analyze(&prices, &benchmark)
                        .map_err(render::AnalysisFailure::Analytics),
                    Err(e) => Err(render::AnalysisFailure::Fetch(e)),
                };
                (symbol, outcome)
            })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(tasks.len());
    for joined in join_all(tasks).await {
        outcomes.push(joined.context("an analysis task panicked")?);
    }

    for (symbol, outcome) in &outcomes {
        if let Err(failure) = outcome {
            tracing::warn!(symbol = %symbol, error = %failure, "Analysis failed.");
        }
    }

    if args.json {
        println!("{}", render::analysis_json(&outcomes)?);
    } else {
        println!(
            "Benchmark: {}  |  data {}  |  risk-free rate {}",
            benchmark_symbol,
            data_window,
            render::format_pct(engine.params().risk_free_rate)
        );
        println!("{}", render::analysis_table(&outcomes));
    }
    Ok(())
}

// ==============================================================================
// Shared helpers
// ==============================================================================

/// Fetches several symbols concurrently, preserving the order of `symbols`.
async fn fetch_all(
    source: Arc<dyn PriceSource>,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<(String, Result<PriceSeries, MarketDataError>)> {
    tracing::info!(
        source = source.name(),
        count = symbols.len(),
        %start,
        %end,
        "Fetching daily prices."
    );

    let progress_bar = ProgressBar::new(symbols.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        progress_bar.set_style(style.progress_chars("#>-"));
    }

    let fetches = symbols.iter().map(|symbol| {
        let source = Arc::clone(&source);
        let pb = progress_bar.clone();
        async move {
            pb.set_message(format!("Fetching {}...", symbol));
            let result = source.fetch_daily(symbol, start, end).await;
            pb.inc(1);
            (symbol.clone(), result)
        }
    });

    let results = join_all(fetches).await;
    progress_bar.finish_and_clear();
    results
}

fn resolve_window(
    window: WindowArgs,
    settings: &MarketDataSettings,
) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let start = window.from.unwrap_or(settings.start_date);
    let end = window.to.unwrap_or(settings.end_date);
    if start > end {
        bail!("--from ({}) must not be after --to ({})", start, end);
    }
    Ok((start, end))
}

fn resolve_params(args: &AnalyzeArgs, settings: &Settings) -> anyhow::Result<AnalysisParams> {
    let analysis = &settings.analysis;
    let params = AnalysisParams {
        trading_days_per_year: args.trading_days.unwrap_or(analysis.trading_days_per_year),
        risk_free_rate: args.risk_free_rate.unwrap_or(analysis.risk_free_rate),
        alignment: args.alignment.unwrap_or(analysis.alignment),
        annualization: args.annualization.unwrap_or(analysis.annualization),
    };
    if params.trading_days_per_year == 0 {
        bail!("--trading-days must be positive");
    }
    if !params.risk_free_rate.is_finite() {
        bail!("--risk-free-rate must be a finite number");
    }
    Ok(params)
}

/// Maps a display name to its symbol; anything outside the universe is used as typed.
fn resolve_symbol(universe: &[Ticker], key: &str) -> String {
    find_ticker(universe, key)
        .map(|t| t.symbol.clone())
        .unwrap_or_else(|| key.trim().to_ascii_uppercase())
}

/// Resolves compare selections, which must come from the universe.
fn resolve_tickers(universe: &[Ticker], keys: &[String]) -> anyhow::Result<Vec<Ticker>> {
    let mut tickers: Vec<Ticker> = Vec::with_capacity(keys.len());
    for key in keys {
        let ticker = find_ticker(universe, key).with_context(|| {
            let known: Vec<&str> = universe.iter().map(|t| t.display_name.as_str()).collect();
            format!("unknown stock '{}' (choose from {})", key, known.join(", "))
        })?;
        if !tickers.iter().any(|t| t.symbol == ticker.symbol) {
            tickers.push(ticker.clone());
        }
    }
    Ok(tickers)
}

fn dedup_fields(fields: Vec<PriceField>) -> Vec<PriceField> {
    let mut unique = Vec::with_capacity(fields.len());
    for field in fields {
        if !unique.contains(&field) {
            unique.push(field);
        }
    }
    unique
}

fn keep_tail(series: PriceSeries, tail: Option<usize>) -> PriceSeries {
    match tail {
        Some(n) => series.last_n(n),
        None => series,
    }
}

fn keep_chart_tail(chart: ComparisonChart, tail: Option<usize>) -> ComparisonChart {
    match tail {
        Some(n) => {
            let from = chart.rows.len().saturating_sub(n);
            ComparisonChart {
                rows: chart.rows[from..].to_vec(),
                ..chart
            }
        }
        None => chart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{default_universe, PriceBar};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn window_defaults_to_configured_dates() {
        let settings = MarketDataSettings::default();
        let (start, end) = resolve_window(WindowArgs { from: None, to: None }, &settings).unwrap();
        assert_eq!(start, settings.start_date);
        assert_eq!(end, settings.end_date);

        let inverted = WindowArgs {
            from: Some(day(5)),
            to: Some(day(1)),
        };
        assert!(resolve_window(inverted, &settings).is_err());
    }

    #[test]
    fn symbols_resolve_through_universe() {
        let universe = default_universe();
        assert_eq!(resolve_symbol(&universe, "Microsoft"), "MSFT");
        assert_eq!(resolve_symbol(&universe, " spy "), "SPY");
    }

    #[test]
    fn compare_selection_must_be_known_and_is_deduplicated() {
        let universe = default_universe();
        let keys = vec!["Google".to_string(), "googl".to_string(), "GameStop".to_string()];
        let tickers = resolve_tickers(&universe, &keys).unwrap();
        let symbols: Vec<_> = tickers.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GOOGL", "GME"]);

        assert!(resolve_tickers(&universe, &["Tesla".to_string()]).is_err());
    }

    #[test]
    fn tail_keeps_most_recent_bars() {
        let bars = (1..=5)
            .map(|d| PriceBar {
                date: day(d),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: d as f64,
                volume: 0.0,
            })
            .collect();
        let series = PriceSeries::new("AAPL", bars).unwrap();

        assert_eq!(keep_tail(series.clone(), Some(2)).closes(), vec![4.0, 5.0]);
        assert_eq!(keep_tail(series.clone(), Some(10)).len(), 5);
        assert!(keep_tail(series.clone(), Some(0)).is_empty());
        assert_eq!(keep_tail(series, None).len(), 5);
    }

    #[test]
    fn compare_tail_keeps_most_recent_rows() {
        let bars = |closes: &[f64]| -> Vec<PriceBar> {
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PriceBar {
                    date: day(i as u32 + 1),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 0.0,
                })
                .collect()
        };
        let series = vec![
            PriceSeries::new("GOOGL", bars(&[1.0, 2.0, 3.0])).unwrap(),
            PriceSeries::new("GME", bars(&[10.0, 20.0, 30.0])).unwrap(),
        ];
        let chart = comparison_chart(&series, PriceField::Close);

        let tail = keep_chart_tail(chart.clone(), Some(2));
        assert_eq!(tail.rows.len(), 2);
        assert_eq!(tail.rows[0].date, day(2));
        assert_eq!(tail.rows[1].values, vec![Some(3.0), Some(30.0)]);
        assert_eq!(tail.symbols, chart.symbols);

        assert_eq!(keep_chart_tail(chart.clone(), Some(5)).rows.len(), 3);
        assert!(keep_chart_tail(chart.clone(), Some(0)).is_empty());
        assert_eq!(keep_chart_tail(chart, None).rows.len(), 3);
    }

    #[test]
    fn repeated_fields_are_shown_once() {
        let fields = dedup_fields(vec![PriceField::Close, PriceField::Open, PriceField::Close]);
        assert_eq!(fields, vec![PriceField::Close, PriceField::Open]);
    }
}
