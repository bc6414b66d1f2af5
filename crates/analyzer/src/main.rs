mod config;
mod source;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use tracing::info;

use market::resolve::default_currency;
use market::yahoo::DEFAULT_BASE_URL;
use market::{CsvListingSource, KrxListingSource, ListingCache, ResolvedSymbol, Resolver, YahooClient};
use report::export::{to_json, write_levels_csv};
use report::text::reading_guide;
use report::chart::{default_chart_name, write_chart_svg};
use report::{PriceFormat, Report, render_text};

use config::{DEFAULT_CACHE_DIR, DEFAULT_DAYS, FileConfig, Overrides};
use source::{SeriesRequest, default_cache_path, load_series};

/// Support and resistance levels from daily closes
#[derive(Parser, Debug)]
#[command(name = "sr-analyze", version)]
struct Args {
    /// Name or code, e.g. 삼성전자, 005930.KS, 애플, AAPL
    ticker: String,
    /// Days of history ending at --end
    #[arg(short, long)]
    days: Option<i64>,
    /// First day, YYYY-MM-DD (overrides --days)
    #[arg(long)]
    start: Option<String>,
    /// Last day, YYYY-MM-DD (default today)
    #[arg(long)]
    end: Option<String>,
    /// Pivot window on each side; larger finds fewer pivots
    #[arg(short, long)]
    order: Option<usize>,
    /// Clustering tolerance as a fraction
    #[arg(short, long)]
    tolerance: Option<f64>,
    /// Levels shown per side
    #[arg(short, long)]
    max_levels: Option<usize>,
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// CSV cache of closes (default data/<symbol>_<start>_<end>.csv)
    #[arg(long)]
    cache: Option<PathBuf>,
    /// Ignore the cache and download again
    #[arg(long, default_value_t = false)]
    refresh: bool,
    /// Take the ticker literally and read the cache only
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Local `Code,Name,Market` listing instead of the KRX portal
    #[arg(long)]
    listing_csv: Option<PathBuf>,
    /// Write the full result as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Write the levels as CSV
    #[arg(long)]
    levels_csv: Option<PathBuf>,
    /// Draw an SVG chart (default <symbol>_support_resistance.svg)
    #[arg(long)]
    chart: Option<Option<PathBuf>>,
}

fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").with_context(|| format!("bad date: {}", date))
}

fn date_range(args: &Args, file: &FileConfig) -> Result<(NaiveDate, NaiveDate)> {
    let end = match &args.end {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };

    let start = match &args.start {
        Some(d) => parse_date(d)?,
        None => {
            let days = args.days.or(file.data.days).unwrap_or(DEFAULT_DAYS);
            if days < 1 {
                bail!("days must be >= 1, got {}", days);
            }
            end - Duration::days(days)
        }
    };

    if start > end {
        bail!("start {} is after end {}", start, end);
    }

    Ok((start, end))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sr_analyze=info,market=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = match &args.config {
        Some(p) => config::load(p)?,
        None => FileConfig::default(),
    };

    let params = config::analysis_params(
        Overrides {
            window_order: args.order,
            tolerance: args.tolerance,
            max_levels: args.max_levels,
        },
        &file,
    );
    params.validate().context("invalid analysis parameters")?;

    let (start, end) = date_range(&args, &file)?;

    let base_url = std::env::var("YAHOO_BASE_URL")
        .ok()
        .or_else(|| file.data.yahoo_base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let yahoo = Arc::new(YahooClient::with_base_url(&base_url).context("yahoo client")?);

    let resolved = if args.offline {
        ResolvedSymbol {
            symbol: args.ticker.clone(),
            display_name: args.ticker.clone(),
            currency: default_currency(&args.ticker).to_string(),
        }
    } else {
        let listing_csv = args
            .listing_csv
            .clone()
            .or_else(|| file.data.listing_csv.as_ref().map(PathBuf::from));
        let listing = match listing_csv {
            Some(p) => ListingCache::new(CsvListingSource::new(p)),
            None => ListingCache::new(KrxListingSource::new()),
        };

        Resolver::standard(yahoo.clone(), Arc::new(listing))
            .resolve(&args.ticker)
            .await
            .with_context(|| format!("could not resolve '{}'", args.ticker))?
    };

    let cache = args.cache.clone().unwrap_or_else(|| {
        let dir = file.data.cache_dir.as_deref().unwrap_or(DEFAULT_CACHE_DIR);
        default_cache_path(dir, &resolved.symbol, start, end)
    });

    let series = load_series(
        yahoo.as_ref(),
        &SeriesRequest {
            symbol: &resolved.symbol,
            start,
            end,
            cache: &cache,
            refresh: args.refresh,
            offline: args.offline,
        },
    )
    .await?;

    if series.is_empty() {
        bail!("no closes for {} between {} and {}", resolved.symbol, start, end);
    }

    info!(
        symbol = %resolved.symbol,
        closes = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        last_close = ?series.last_close(),
        "series ready"
    );

    let result = levels::analyze(&series.closes(), params).context("analysis failed")?;

    let format = PriceFormat::for_symbol(&resolved.currency, &resolved.symbol);
    let report = Report {
        symbol: &resolved.symbol,
        display_name: &resolved.display_name,
        format: &format,
        result: &result,
    };

    print!("{}", render_text(&report));
    println!();
    print!("{}", reading_guide());

    if let Some(p) = &args.json {
        std::fs::write(p, to_json(&report)?)
            .with_context(|| format!("write json failed: {}", p.display()))?;
        info!(path = %p.display(), "wrote json");
    }

    if let Some(p) = &args.levels_csv {
        let f = std::fs::File::create(p)
            .with_context(|| format!("create levels csv failed: {}", p.display()))?;
        write_levels_csv(f, &result).context("write levels csv failed")?;
        info!(path = %p.display(), "wrote levels csv");
    }

    if let Some(p) = &args.chart {
        let p = p
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_chart_name(&resolved.symbol)));
        write_chart_svg(&p, &series, &report)
            .with_context(|| format!("write chart failed: {}", p.display()))?;
        info!(path = %p.display(), "wrote chart");
    }

    Ok(())
}
