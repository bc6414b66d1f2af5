use domain::Price;
use serde::{Deserialize, Serialize};

use crate::error::{LevelsError, Result};

/// Pivot kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotKind {
    /// Local minimum, a support candidate
    Support,
    /// Local maximum, a resistance candidate
    Resistance,
}

/// Local extremum of the close series
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pivot {
    pub index: usize,
    pub price: Price,
    pub kind: PivotKind,
}

impl PivotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PivotKind::Support => "support",
            PivotKind::Resistance => "resistance",
        }
    }

    /// Inclusive comparison against one neighbour
    fn holds(self, center: f64, other: f64) -> bool {
        match self {
            PivotKind::Support => center <= other,
            PivotKind::Resistance => center >= other,
        }
    }
}

/// Is `series[i]` an extremum of `kind` within `k` neighbours on each side.
///
/// The window is clipped at the series edges, so the first and last closes
/// are compared only against the neighbours that exist.
pub fn is_pivot(series: &[Price], i: usize, k: usize, kind: PivotKind) -> bool {
    let Some(center) = series.get(i) else {
        return false;
    };

    let lo = i.saturating_sub(k);
    let hi = i.saturating_add(k).min(series.len() - 1);

    series[lo..=hi]
        .iter()
        .all(|p| kind.holds(center.0, p.0))
}

/// All pivots of `kind`, ascending by index.
///
/// Equal neighbours all qualify, a flat top of three equal closes gives
/// three adjacent pivots.
pub fn find_pivots(series: &[Price], window_order: usize, kind: PivotKind) -> Result<Vec<Pivot>> {
    if window_order < 1 {
        return Err(LevelsError::invalid("window_order", "must be >= 1"));
    }

    let pivots = (0..series.len())
        .filter(|&i| is_pivot(series, i, window_order, kind))
        .map(|index| Pivot {
            index,
            price: series[index],
            kind,
        })
        .collect();

    Ok(pivots)
}

pub fn pivot_prices(pivots: &[Pivot]) -> Vec<Price> {
    pivots.iter().map(|p| p.price).collect()
}
