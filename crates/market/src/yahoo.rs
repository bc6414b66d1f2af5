//! Yahoo Finance chart and search endpoints.
//!
//! Only daily closes are taken from the chart; rows with a missing close are
//! dropped. Symbol search keeps equities and ETFs.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use domain::{Price, PricePoint, PriceSeries};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{MarketError, Result};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SEARCH_KINDS: [&str; 2] = ["EQUITY", "ETF"];

/// Instrument metadata returned with every chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteMeta {
    pub symbol: String,
    pub currency: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
}

impl QuoteMeta {
    /// Long name, then short name
    pub fn display_name(&self) -> Option<&str> {
        self.long_name.as_deref().or(self.short_name.as_deref())
    }
}

/// Fetched daily closes with their metadata
#[derive(Debug, Clone)]
pub struct History {
    pub meta: QuoteMeta,
    pub series: PriceSeries,
}

/// One symbol search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub kind: String,
}

/// Metadata lookup used to verify codes and fill name/currency
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// `None` when the symbol has no recent data
    async fn quote_meta(&self, symbol: &str) -> Result<Option<QuoteMeta>>;
}

/// Remote full-text symbol search
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base: Url,
    max_results: usize,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base: Url::parse(base)?,
            max_results: 5,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| MarketError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_text(&self, url: Url, query: &[(&str, String)]) -> Result<(reqwest::StatusCode, String)> {
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        Ok((status, text))
    }

    /// Daily closes for `[start, end]`, both inclusive
    pub async fn fetch_history(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<History> {
        let period1 = day_start(start);
        let period2 = day_start(end) + 24 * 60 * 60;

        let url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        let (status, body) = self
            .get_text(
                url,
                &[
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("interval", "1d".to_string()),
                ],
            )
            .await?;

        debug!(symbol, %status, bytes = body.len(), "chart response");

        let history = parse_chart(symbol, status, &body)?;
        Ok(History {
            series: history.series.clip(start, end),
            meta: history.meta,
        })
    }

    pub async fn search_symbols(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = self.endpoint(&["v1", "finance", "search"])?;
        let (status, body) = self
            .get_text(
                url,
                &[
                    ("q", query.to_string()),
                    ("quotesCount", self.max_results.to_string()),
                    ("newsCount", "0".to_string()),
                ],
            )
            .await?;

        if !status.is_success() {
            return Err(MarketError::Api {
                code: status.as_u16().to_string(),
                description: body,
            });
        }

        parse_search(&body)
    }
}

#[async_trait]
impl QuoteSource for YahooClient {
    async fn quote_meta(&self, symbol: &str) -> Result<Option<QuoteMeta>> {
        let url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        let (status, body) = self
            .get_text(
                url,
                &[("range", "5d".to_string()), ("interval", "1d".to_string())],
            )
            .await?;

        match parse_chart(symbol, status, &body) {
            Ok(h) => Ok(Some(h.meta)),
            Err(MarketError::NoData(_) | MarketError::Api { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl SymbolSearch for YahooClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.search_symbols(query).await
    }
}

fn day_start(d: NaiveDate) -> i64 {
    d.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

//
// --- Wire format ------------------------------------------------------------
//

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    symbol: String,
    currency: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteRows>,
}

#[derive(Debug, Deserialize)]
struct QuoteRows {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuote {
    symbol: Option<String>,
    #[serde(rename = "shortname")]
    short_name: Option<String>,
    #[serde(rename = "longname")]
    long_name: Option<String>,
    exchange: Option<String>,
    quote_type: Option<String>,
}

pub(crate) fn parse_chart(symbol: &str, status: reqwest::StatusCode, body: &str) -> Result<History> {
    let env: ChartEnvelope = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) if !status.is_success() => {
            return Err(MarketError::Api {
                code: status.as_u16().to_string(),
                description: body.chars().take(200).collect(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(err) = env.chart.error {
        return Err(MarketError::Api {
            code: err.code,
            description: err.description,
        });
    }

    let data = env
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketError::NoData(symbol.to_string()))?;

    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let offset = data.meta.gmtoffset;
    let points: Vec<PricePoint> = data
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let close = close?;
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(PricePoint {
                date,
                close: Price(close),
            })
        })
        .collect();

    if points.is_empty() {
        return Err(MarketError::NoData(symbol.to_string()));
    }

    let meta = QuoteMeta {
        symbol: if data.meta.symbol.is_empty() {
            symbol.to_string()
        } else {
            data.meta.symbol
        },
        currency: data.meta.currency,
        long_name: data.meta.long_name,
        short_name: data.meta.short_name,
    };

    Ok(History {
        meta,
        series: PriceSeries::new(points),
    })
}

pub(crate) fn parse_search(body: &str) -> Result<Vec<SearchHit>> {
    let env: SearchEnvelope = serde_json::from_str(body)?;

    let hits = env
        .quotes
        .into_iter()
        .filter(|q| {
            q.quote_type
                .as_deref()
                .is_some_and(|t| SEARCH_KINDS.contains(&t))
        })
        .filter_map(|q| {
            let symbol = q.symbol?;
            Some(SearchHit {
                name: q.short_name.or(q.long_name).unwrap_or_else(|| symbol.clone()),
                exchange: q.exchange.unwrap_or_default(),
                kind: q.quote_type.unwrap_or_default(),
                symbol,
            })
        })
        .collect();

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "currency": "USD",
                    "symbol": "AAPL",
                    "longName": "Apple Inc.",
                    "shortName": "Apple",
                    "gmtoffset": -14400
                },
                "timestamp": [1709301000, 1709560200, 1709646600],
                "indicators": {
                    "quote": [{ "close": [179.66, null, 170.12] }]
                }
            }],
            "error": null
        }
    }"#;

    const NOT_FOUND: &str = r#"{
        "chart": {
            "result": null,
            "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
        }
    }"#;

    const SEARCH: &str = r#"{
        "quotes": [
            { "symbol": "SSNLF", "shortname": "Samsung Electronics", "exchange": "PNK", "quoteType": "EQUITY" },
            { "symbol": "SAMSUNG", "shortname": "Samsung option", "exchange": "OPR", "quoteType": "OPTION" },
            { "symbol": "005930.KS", "longname": "Samsung Electronics Co., Ltd.", "exchange": "KSC", "quoteType": "EQUITY" }
        ]
    }"#;

    #[test]
    fn chart_skips_missing_closes_and_applies_offset() {
        let h = parse_chart("AAPL", StatusCode::OK, CHART).unwrap();

        assert_eq!(h.series.len(), 2);
        assert_eq!(h.series.closes(), vec![Price(179.66), Price(170.12)]);
        // 1709301000 is 2024-03-01 13:50 UTC
        assert_eq!(h.series.first_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(h.meta.currency.as_deref(), Some("USD"));
        assert_eq!(h.meta.display_name(), Some("Apple Inc."));
    }

    #[test]
    fn chart_error_is_surfaced() {
        let err = parse_chart("XXXX", StatusCode::NOT_FOUND, NOT_FOUND).unwrap_err();
        assert!(matches!(err, MarketError::Api { ref code, .. } if code == "Not Found"));
    }

    #[test]
    fn non_json_failure_becomes_api_error() {
        let err = parse_chart("AAPL", StatusCode::TOO_MANY_REQUESTS, "Too Many Requests").unwrap_err();
        assert!(matches!(err, MarketError::Api { ref code, .. } if code == "429"));
    }

    #[test]
    fn empty_chart_is_no_data() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"X"},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(
            parse_chart("X", StatusCode::OK, body),
            Err(MarketError::NoData(_))
        ));
    }

    #[test]
    fn search_keeps_equities_and_etfs() {
        let hits = parse_search(SEARCH).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].symbol, "SSNLF");
        assert_eq!(hits[1].name, "Samsung Electronics Co., Ltd.");
    }

    #[tokio::test]
    async fn fetch_history_hits_chart_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .and(query_param("interval", "1d"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CHART))
            .mount(&server)
            .await;

        let client = YahooClient::with_base_url(&server.uri()).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let h = client.fetch_history("AAPL", start, end).await.unwrap();

        assert_eq!(h.series.len(), 2);
        assert_eq!(h.meta.symbol, "AAPL");
    }

    #[tokio::test]
    async fn quote_meta_is_none_for_unknown_symbol() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/NOPE"))
            .respond_with(ResponseTemplate::new(404).set_body_string(NOT_FOUND))
            .mount(&server)
            .await;

        let client = YahooClient::with_base_url(&server.uri()).unwrap();
        assert_eq!(client.quote_meta("NOPE").await.unwrap(), None);
    }

    #[tokio::test]
    async fn search_hits_search_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/finance/search"))
            .and(query_param("q", "samsung"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH))
            .mount(&server)
            .await;

        let client = YahooClient::with_base_url(&server.uri()).unwrap();
        let hits = client.search("samsung").await.unwrap();
        assert_eq!(hits.len(), 2);
    }
}
