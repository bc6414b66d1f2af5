pub mod series;
pub mod types;

pub use series::{PricePoint, PriceSeries};
pub use types::{Pct, Price, Ratio};
