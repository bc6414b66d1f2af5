//! Korea Exchange (KRX) stock listing.
//!
//! The full listing is a few thousand rows and changes rarely, so it is
//! loaded at most once per `ListingCache` and reused for every lookup.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::{MarketError, Result};

const KRX_URL: &str = "http://data.krx.co.kr/comm/bldAttendant/getJsonData.cmd";
const KRX_REFERER: &str = "http://data.krx.co.kr/contents/MDC/MDI/mdiLoader";
const KRX_BLD: &str = "dbms/MDC/STAT/standard/MDCSTAT01901";

/// One listed stock
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingEntry {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Market")]
    pub market: String,
}

impl ListingEntry {
    /// Yahoo symbol: KOSDAQ -> `.KQ`, everything else -> `.KS`
    pub fn yahoo_symbol(&self) -> String {
        match self.market.as_str() {
            "KOSDAQ" => format!("{}.KQ", self.code),
            _ => format!("{}.KS", self.code),
        }
    }
}

#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn load(&self) -> Result<Vec<ListingEntry>>;
}

/// Listing from the KRX data portal
pub struct KrxListingSource {
    client: reqwest::Client,
    url: String,
}

impl KrxListingSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: KRX_URL.to_string(),
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Default for KrxListingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct KrxResp {
    #[serde(rename = "OutBlock_1", default)]
    rows: Vec<KrxRow>,
}

#[derive(Debug, Deserialize)]
struct KrxRow {
    #[serde(rename = "ISU_SRT_CD")]
    code: String,
    #[serde(rename = "ISU_ABBRV")]
    name: String,
    #[serde(rename = "MKT_TP_NM")]
    market: String,
}

pub(crate) fn parse_krx(body: &str) -> Result<Vec<ListingEntry>> {
    let resp: KrxResp = serde_json::from_str(body)?;
    Ok(resp
        .rows
        .into_iter()
        .map(|r| ListingEntry {
            code: r.code,
            name: r.name,
            market: r.market,
        })
        .collect())
}

#[async_trait]
impl ListingSource for KrxListingSource {
    async fn load(&self) -> Result<Vec<ListingEntry>> {
        let body = self
            .client
            .post(&self.url)
            .header(reqwest::header::REFERER, KRX_REFERER)
            .form(&[
                ("bld", KRX_BLD),
                ("locale", "ko_KR"),
                ("mktId", "ALL"),
                ("share", "1"),
                ("csvxls_isNo", "false"),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_krx(&body)
    }
}

/// Listing from a local `Code,Name,Market` CSV
pub struct CsvListingSource {
    path: PathBuf,
}

impl CsvListingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

pub(crate) fn read_listing<R: std::io::Read>(rdr: R) -> Result<Vec<ListingEntry>> {
    let mut rdr = csv::Reader::from_reader(rdr);
    let mut out = Vec::new();
    for row in rdr.deserialize::<ListingEntry>() {
        out.push(row?);
    }
    Ok(out)
}

#[async_trait]
impl ListingSource for CsvListingSource {
    async fn load(&self) -> Result<Vec<ListingEntry>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_listing(std::fs::File::open(path)?))
            .await
            .map_err(|e| MarketError::Listing(e.to_string()))?
    }
}

/// Load-once owner of the exchange listing.
///
/// The first call to `entries` loads from the source; concurrent callers
/// wait for that load. A failed load is logged and remembered as an empty
/// listing for the lifetime of the cache.
pub struct ListingCache {
    source: Box<dyn ListingSource>,
    entries: OnceCell<Vec<ListingEntry>>,
}

impl ListingCache {
    pub fn new(source: impl ListingSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            entries: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.initialized()
    }

    pub async fn entries(&self) -> &[ListingEntry] {
        self.entries
            .get_or_init(|| async {
                info!("loading exchange listing");
                match self.source.load().await {
                    Ok(v) => {
                        info!(count = v.len(), "exchange listing loaded");
                        v
                    }
                    Err(e) => {
                        warn!(error = %e, "exchange listing load failed");
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Case-insensitive name substring match, plus exact code match for
    /// all-digit queries. First `limit` hits in listing order.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<ListingEntry> {
        let needle = query.to_lowercase();
        let by_code = !query.is_empty() && query.chars().all(|c| c.is_ascii_digit());

        let mut hits: Vec<ListingEntry> = Vec::new();
        for e in self.entries().await {
            if e.name.to_lowercase().contains(&needle) {
                hits.push(e.clone());
            }
        }
        if by_code {
            for e in self.entries().await {
                if e.code == query && !hits.contains(e) {
                    hits.push(e.clone());
                }
            }
        }

        hits.truncate(limit);
        hits
    }
}
