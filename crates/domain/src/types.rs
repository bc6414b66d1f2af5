//! Core domain types.
//!
//! Goals:
//! - no bare f64 in the analysis code
//! - units are fixed at the type level
//! - a price and a percentage cannot be mixed up by accident

use std::fmt;

use serde::{Deserialize, Serialize};

/// Asset price (closing price in the quote currency)
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub f64);

/// Fraction / coefficient, e.g. clustering tolerance 0.02 = 2%
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratio(pub f64);

/// Percentage, 1.0 = 1%
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pct(pub f64);

//
// --- Conversions & helpers --------------------------------------------------
//

impl Price {
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Signed distance from `reference` in percent of `reference`
    pub fn pct_from(self, reference: Price) -> Pct {
        Pct((self.0 - reference.0) / reference.0 * 100.0)
    }

    /// Arithmetic mean, None for an empty slice
    pub fn mean(prices: &[Price]) -> Option<Price> {
        if prices.is_empty() {
            return None;
        }

        let sum: f64 = prices.iter().map(|p| p.0).sum();
        Some(Price(sum / prices.len() as f64))
    }
}

impl Ratio {
    /// Strictly inside (0, 1); NaN is rejected
    pub fn is_open_unit(self) -> bool {
        self.0 > 0.0 && self.0 < 1.0
    }

    pub fn as_pct(self) -> Pct {
        Pct(self.0 * 100.0)
    }
}

//
// --- Display (logs / report) ------------------------------------------------
//

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.2}%", self.0)
    }
}
