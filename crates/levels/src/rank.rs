use std::fmt;

use domain::{Pct, Price};
use serde::{Deserialize, Serialize};

use crate::cluster::LevelCluster;
use crate::error::{LevelsError, Result};
use crate::pivot::PivotKind;

/// Qualitative level strength by touch count
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    pub fn from_touches(touches: usize) -> Self {
        match touches {
            0 | 1 => Strength::Weak,
            2 => Strength::Moderate,
            _ => Strength::Strong,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strength::Weak => "weak",
            Strength::Moderate => "moderate",
            Strength::Strong => "strong",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cluster annotated against the current price
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLevel {
    pub price: Price,
    pub touches: usize,
    pub kind: PivotKind,
    /// (price - current) / current * 100
    pub distance_pct: Pct,
    pub strength: Strength,
}

pub(crate) fn check_max_levels(max_levels: usize) -> Result<()> {
    if max_levels < 1 {
        return Err(LevelsError::invalid("max_levels", "must be >= 1"));
    }
    Ok(())
}

/// Most touched first, at most `max_levels`.
///
/// The sort is stable: equal touch counts keep the clusterer's ascending
/// price order.
pub fn rank_levels(
    clusters: &[LevelCluster],
    current_price: Price,
    max_levels: usize,
) -> Result<Vec<RankedLevel>> {
    check_max_levels(max_levels)?;
    if !current_price.is_finite() || current_price.0 == 0.0 {
        return Err(LevelsError::invalid(
            "current_price",
            format!("must be finite and non-zero, got {}", current_price.0),
        ));
    }

    let mut ordered: Vec<&LevelCluster> = clusters.iter().collect();
    ordered.sort_by(|a, b| b.touches.cmp(&a.touches));

    let ranked = ordered
        .into_iter()
        .take(max_levels)
        .map(|c| RankedLevel {
            price: c.price,
            touches: c.touches,
            kind: c.kind,
            distance_pct: c.price.pct_from(current_price),
            strength: Strength::from_touches(c.touches),
        })
        .collect();

    Ok(ranked)
}
