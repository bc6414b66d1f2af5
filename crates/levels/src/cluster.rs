use domain::{Price, Ratio};
use serde::{Deserialize, Serialize};

use crate::error::{LevelsError, Result};
use crate::pivot::PivotKind;

/// Price band built from nearby pivots of one kind
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCluster {
    /// Mean of the member pivot prices
    pub price: Price,
    /// Number of pivots merged into the band
    pub touches: usize,
    pub kind: PivotKind,
}

/// Open cluster of the greedy pass
struct OpenCluster {
    sum: f64,
    members: usize,
}

impl OpenCluster {
    fn start(p: Price) -> Self {
        Self {
            sum: p.0,
            members: 1,
        }
    }

    fn mean(&self) -> f64 {
        self.sum / self.members as f64
    }

    /// Relative distance test against the running mean.
    ///
    /// A zero mean has no relative scale: only an exact zero joins it.
    fn accepts(&self, p: Price, tolerance: Ratio) -> bool {
        let mean = self.mean();
        if mean == 0.0 {
            return p.0 == 0.0;
        }

        (p.0 - mean).abs() / mean.abs() <= tolerance.0
    }

    fn push(&mut self, p: Price) {
        self.sum += p.0;
        self.members += 1;
    }

    fn close(self, kind: PivotKind) -> LevelCluster {
        LevelCluster {
            price: Price(self.mean()),
            touches: self.members,
            kind,
        }
    }
}

pub(crate) fn check_tolerance(tolerance: Ratio) -> Result<()> {
    if !tolerance.is_open_unit() {
        return Err(LevelsError::invalid(
            "tolerance",
            format!("must be in (0, 1), got {}", tolerance.0),
        ));
    }
    Ok(())
}

/// Single forward pass over the sorted prices.
///
/// A price joins the open cluster when it lies within `tolerance` of the
/// cluster's running mean, otherwise the cluster is closed and a new one
/// starts at that price. Membership is never revisited. Output is ascending
/// by price.
pub fn cluster_levels(
    prices: &[Price],
    tolerance: Ratio,
    kind: PivotKind,
) -> Result<Vec<LevelCluster>> {
    check_tolerance(tolerance)?;

    let mut sorted = prices.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    let mut open = OpenCluster::start(first);

    for p in iter {
        if open.accepts(p, tolerance) {
            open.push(p);
        } else {
            out.push(open.close(kind));
            open = OpenCluster::start(p);
        }
    }
    out.push(open.close(kind));

    Ok(out)
}
