//! Optional TOML config file. CLI flags win over file values, file values
//! win over the built-in defaults.
//!
//! ```toml
//! [analysis]
//! window_order = 7
//! tolerance = 0.015
//! max_levels = 5
//!
//! [data]
//! days = 365
//! cache_dir = "data"
//! listing_csv = "data/krx_listing.csv"
//! yahoo_base_url = "https://query1.finance.yahoo.com"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use domain::Ratio;
use levels::AnalysisParams;
use serde::Deserialize;

pub const DEFAULT_WINDOW_ORDER: usize = 7;
pub const DEFAULT_TOLERANCE: f64 = 0.015;
pub const DEFAULT_MAX_LEVELS: usize = 5;
pub const DEFAULT_DAYS: i64 = 365;
pub const DEFAULT_CACHE_DIR: &str = "data";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub analysis: AnalysisSection,
    pub data: DataSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisSection {
    pub window_order: Option<usize>,
    pub tolerance: Option<f64>,
    pub max_levels: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSection {
    pub days: Option<i64>,
    pub cache_dir: Option<String>,
    pub listing_csv: Option<String>,
    pub yahoo_base_url: Option<String>,
}

/// Analysis values given on the command line
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub window_order: Option<usize>,
    pub tolerance: Option<f64>,
    pub max_levels: Option<usize>,
}

pub fn parse(text: &str) -> Result<FileConfig> {
    toml::from_str(text).context("bad config file")
}

pub fn load(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config failed: {}", path.display()))?;
    parse(&text)
}

pub fn analysis_params(cli: Overrides, file: &FileConfig) -> AnalysisParams {
    let a = &file.analysis;
    AnalysisParams {
        window_order: cli
            .window_order
            .or(a.window_order)
            .unwrap_or(DEFAULT_WINDOW_ORDER),
        tolerance: Ratio(cli.tolerance.or(a.tolerance).unwrap_or(DEFAULT_TOLERANCE)),
        max_levels: cli
            .max_levels
            .or(a.max_levels)
            .unwrap_or(DEFAULT_MAX_LEVELS),
    }
}
