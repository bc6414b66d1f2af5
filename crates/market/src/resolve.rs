//! Human-entered name or code -> tradable symbol.
//!
//! Strategies are tried in order. Each one either answers, passes
//! (`Ok(None)`), or stops the chain with an error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::aliases::{AliasMatch, AliasTable};
use crate::error::{MarketError, Result};
use crate::listing::ListingCache;
use crate::yahoo::{QuoteSource, SymbolSearch};

const KRX_INDICES: [&str; 2] = ["^KS11", "^KQ11"];
const LISTING_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub symbol: String,
    pub display_name: String,
    /// ISO code, e.g. "KRW"
    pub currency: String,
}

#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, query: &str) -> Result<Option<ResolvedSymbol>>;
}

pub fn is_korean_symbol(symbol: &str) -> bool {
    symbol.ends_with(".KS") || symbol.ends_with(".KQ")
}

pub fn contains_hangul(s: &str) -> bool {
    s.chars().any(|c| ('가'..='힣').contains(&c))
}

/// KRW for Korean listings, USD otherwise
pub fn default_currency(symbol: &str) -> &'static str {
    if is_korean_symbol(symbol) { "KRW" } else { "USD" }
}

/// `^[A-Z0-9]+(\.(KS|KQ))?$`
pub fn looks_like_code(query: &str) -> bool {
    let base = query
        .strip_suffix(".KS")
        .or_else(|| query.strip_suffix(".KQ"))
        .unwrap_or(query);

    !base.is_empty()
        && base
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Name and currency from the quote source, `fallback_name` and
/// `fallback_currency` when it has nothing or fails
async fn describe(
    quotes: &dyn QuoteSource,
    symbol: &str,
    fallback_name: &str,
    fallback_currency: &str,
) -> ResolvedSymbol {
    let meta = match quotes.quote_meta(symbol).await {
        Ok(m) => m,
        Err(e) => {
            warn!(symbol, error = %e, "quote metadata unavailable");
            None
        }
    };

    let display_name = meta
        .as_ref()
        .and_then(|m| m.display_name())
        .unwrap_or(fallback_name)
        .to_string();
    let currency = meta
        .and_then(|m| m.currency)
        .unwrap_or_else(|| fallback_currency.to_string());

    ResolvedSymbol {
        symbol: symbol.to_string(),
        display_name,
        currency,
    }
}

/// Built-in alias table
pub struct AliasStrategy {
    table: AliasTable,
    quotes: Arc<dyn QuoteSource>,
}

impl AliasStrategy {
    pub fn new(table: AliasTable, quotes: Arc<dyn QuoteSource>) -> Self {
        Self { table, quotes }
    }
}

#[async_trait]
impl ResolveStrategy for AliasStrategy {
    fn name(&self) -> &'static str {
        "alias"
    }

    async fn resolve(&self, query: &str) -> Result<Option<ResolvedSymbol>> {
        let Some((hit, symbol)) = self.table.lookup(query) else {
            return Ok(None);
        };

        info!(query, key = hit.key(), symbol, "alias match");

        // exact hits keep the user's spelling, partial hits the table key
        let name = match hit {
            AliasMatch::Exact(_) => query,
            AliasMatch::Partial(key) => key,
        };

        if is_korean_symbol(symbol) {
            return Ok(Some(ResolvedSymbol {
                symbol: symbol.to_string(),
                display_name: name.to_string(),
                currency: "KRW".to_string(),
            }));
        }

        let mut resolved = describe(self.quotes.as_ref(), symbol, name, "USD").await;
        // Korean indices are quoted in points of KRW
        if KRX_INDICES.contains(&symbol) {
            resolved.currency = "KRW".to_string();
        }
        Ok(Some(resolved))
    }
}

/// Query that already is a symbol, verified against recent data
pub struct CodeStrategy {
    quotes: Arc<dyn QuoteSource>,
}

impl CodeStrategy {
    pub fn new(quotes: Arc<dyn QuoteSource>) -> Self {
        Self { quotes }
    }
}

#[async_trait]
impl ResolveStrategy for CodeStrategy {
    fn name(&self) -> &'static str {
        "code"
    }

    async fn resolve(&self, query: &str) -> Result<Option<ResolvedSymbol>> {
        if !looks_like_code(query) {
            return Ok(None);
        }

        let meta = match self.quotes.quote_meta(query).await {
            Ok(Some(m)) => m,
            Ok(None) => {
                warn!(query, "not a valid symbol");
                return Ok(None);
            }
            Err(e) => {
                warn!(query, error = %e, "symbol check failed");
                return Ok(None);
            }
        };

        Ok(Some(ResolvedSymbol {
            symbol: query.to_string(),
            display_name: meta.display_name().unwrap_or(query).to_string(),
            currency: meta
                .currency
                .unwrap_or_else(|| default_currency(query).to_string()),
        }))
    }
}

/// Remote full-text search, non-Hangul queries only
pub struct SearchStrategy {
    search: Arc<dyn SymbolSearch>,
    quotes: Arc<dyn QuoteSource>,
}

impl SearchStrategy {
    pub fn new(search: Arc<dyn SymbolSearch>, quotes: Arc<dyn QuoteSource>) -> Self {
        Self { search, quotes }
    }
}

#[async_trait]
impl ResolveStrategy for SearchStrategy {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn resolve(&self, query: &str) -> Result<Option<ResolvedSymbol>> {
        if contains_hangul(query) {
            return Ok(None);
        }

        let hits = match self.search.search(query).await {
            Ok(h) => h,
            Err(e) => {
                warn!(query, error = %e, "symbol search failed");
                return Ok(None);
            }
        };

        for (i, h) in hits.iter().enumerate() {
            info!(rank = i + 1, symbol = %h.symbol, name = %h.name, exchange = %h.exchange, "search hit");
        }

        let Some(first) = hits.into_iter().next() else {
            return Ok(None);
        };

        let mut resolved = describe(
            self.quotes.as_ref(),
            &first.symbol,
            &first.name,
            default_currency(&first.symbol),
        )
        .await;
        // the search result name is what the user recognised
        resolved.display_name = first.name;
        Ok(Some(resolved))
    }
}

/// National exchange listing, Hangul queries only.
///
/// A Hangul query with no listing hit ends the chain with `NotFound`.
pub struct ListingStrategy {
    listing: Arc<ListingCache>,
}

impl ListingStrategy {
    pub fn new(listing: Arc<ListingCache>) -> Self {
        Self { listing }
    }
}

#[async_trait]
impl ResolveStrategy for ListingStrategy {
    fn name(&self) -> &'static str {
        "listing"
    }

    async fn resolve(&self, query: &str) -> Result<Option<ResolvedSymbol>> {
        if !contains_hangul(query) {
            return Ok(None);
        }

        let hits = self.listing.search(query, LISTING_LIMIT).await;
        for (i, h) in hits.iter().enumerate() {
            info!(rank = i + 1, code = %h.code, name = %h.name, market = %h.market, "listing hit");
        }

        let Some(first) = hits.into_iter().next() else {
            return Err(MarketError::NotFound(query.to_string()));
        };

        Ok(Some(ResolvedSymbol {
            symbol: first.yahoo_symbol(),
            display_name: first.name,
            currency: "KRW".to_string(),
        }))
    }
}

/// Ordered chain of strategies
pub struct Resolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl Resolver {
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// alias table -> symbol code -> remote search -> exchange listing
    pub fn standard<Q>(quotes: Arc<Q>, listing: Arc<ListingCache>) -> Self
    where
        Q: QuoteSource + SymbolSearch + 'static,
    {
        let q: Arc<dyn QuoteSource> = quotes.clone();
        let s: Arc<dyn SymbolSearch> = quotes;

        Self::new(vec![
            Box::new(AliasStrategy::new(AliasTable::default(), q.clone())),
            Box::new(CodeStrategy::new(q.clone())),
            Box::new(SearchStrategy::new(s, q)),
            Box::new(ListingStrategy::new(listing)),
        ])
    }

    pub async fn resolve(&self, query: &str) -> Result<ResolvedSymbol> {
        let query = query.trim();

        for s in &self.strategies {
            if let Some(r) = s.resolve(query).await? {
                info!(query, strategy = s.name(), symbol = %r.symbol, name = %r.display_name, currency = %r.currency, "resolved");
                return Ok(r);
            }
        }

        Err(MarketError::NotFound(query.to_string()))
    }
}
