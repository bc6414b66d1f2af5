use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use domain::PriceSeries;
use market::YahooClient;
use market::cache::{read_cache, write_cache};
use tracing::info;

/// Where the closes come from
pub struct SeriesRequest<'a> {
    pub symbol: &'a str,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub cache: &'a Path,
    pub refresh: bool,
    pub offline: bool,
}

/// `data/005930.KS_2024-01-01_2024-12-31.csv`, `^` replaced since it is
/// awkward in file names
pub fn default_cache_path(dir: &str, symbol: &str, start: NaiveDate, end: NaiveDate) -> PathBuf {
    let safe: String = symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    Path::new(dir).join(format!("{}_{}_{}.csv", safe, start, end))
}

/// Cached copy clipped to `[start, end]` unless `refresh`, otherwise fetch
/// and cache
pub async fn load_series(yahoo: &YahooClient, req: &SeriesRequest<'_>) -> Result<PriceSeries> {
    if !req.refresh && req.cache.exists() {
        let cached = read_cache(req.cache).context("read cache failed")?;
        let series = cached.clip(req.start, req.end);
        info!(
            path = %req.cache.display(),
            cached = cached.len(),
            closes = series.len(),
            "loaded cached closes"
        );
        return Ok(series);
    }

    if req.offline {
        bail!("offline and no cache at {}", req.cache.display());
    }

    info!(symbol = req.symbol, start = %req.start, end = %req.end, "fetching closes");
    let history = yahoo
        .fetch_history(req.symbol, req.start, req.end)
        .await
        .context("download range failed")?;

    write_cache(req.cache, &history.series).context("write cache failed")?;
    info!(path = %req.cache.display(), closes = history.series.len(), "cached closes");

    Ok(history.series)
}
