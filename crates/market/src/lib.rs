pub mod aliases;
pub mod cache;
pub mod error;
pub mod listing;
pub mod resolve;
pub mod yahoo;

pub use error::{MarketError, Result};
pub use listing::{CsvListingSource, KrxListingSource, ListingCache, ListingEntry, ListingSource};
pub use resolve::{ResolvedSymbol, Resolver};
pub use yahoo::{History, QuoteMeta, SearchHit, YahooClient};
