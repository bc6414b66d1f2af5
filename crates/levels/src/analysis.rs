use domain::{Price, Ratio};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::{self, LevelCluster, cluster_levels};
use crate::error::{LevelsError, Result};
use crate::pivot::{PivotKind, find_pivots, pivot_prices};
use crate::rank::{self, RankedLevel, rank_levels};

/// Analysis parameters
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Neighbours on each side a pivot must dominate, e.g. 5
    pub window_order: usize,
    /// Relative band width for clustering, e.g. 0.02 (2%)
    pub tolerance: Ratio,
    /// Levels kept per side, e.g. 5
    pub max_levels: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            window_order: 5,
            tolerance: Ratio(0.02),
            max_levels: 5,
        }
    }
}

impl AnalysisParams {
    pub fn validate(&self) -> Result<()> {
        if self.window_order < 1 {
            return Err(LevelsError::invalid("window_order", "must be >= 1"));
        }
        cluster::check_tolerance(self.tolerance)?;
        rank::check_max_levels(self.max_levels)
    }
}

/// Support and resistance levels of one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    current_price: Price,
    support: Vec<RankedLevel>,
    resistance: Vec<RankedLevel>,
    support_candidates: usize,
    resistance_candidates: usize,
    params: AnalysisParams,
}

impl AnalysisResult {
    /// Last close, the reference for `distance_pct`
    pub fn current_price(&self) -> Price {
        self.current_price
    }

    pub fn support(&self) -> &[RankedLevel] {
        &self.support
    }

    pub fn resistance(&self) -> &[RankedLevel] {
        &self.resistance
    }

    pub fn levels(&self, kind: PivotKind) -> &[RankedLevel] {
        match kind {
            PivotKind::Support => &self.support,
            PivotKind::Resistance => &self.resistance,
        }
    }

    /// Pivot count of `kind` before clustering
    pub fn candidates(&self, kind: PivotKind) -> usize {
        match kind {
            PivotKind::Support => self.support_candidates,
            PivotKind::Resistance => self.resistance_candidates,
        }
    }

    pub fn params(&self) -> AnalysisParams {
        self.params
    }
}

/// Reusable analysis entry point bound to one parameter set
#[derive(Debug, Copy, Clone, Default)]
pub struct AnalysisSession {
    params: AnalysisParams,
}

impl AnalysisSession {
    pub fn new(params: AnalysisParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> AnalysisParams {
        self.params
    }

    pub fn run(&self, series: &[Price]) -> Result<AnalysisResult> {
        analyze(series, self.params)
    }
}

struct SideLevels {
    candidates: usize,
    ranked: Vec<RankedLevel>,
}

fn side(series: &[Price], kind: PivotKind, current: Price, params: AnalysisParams) -> Result<SideLevels> {
    let pivots = find_pivots(series, params.window_order, kind)?;
    let clusters: Vec<LevelCluster> = cluster_levels(&pivot_prices(&pivots), params.tolerance, kind)?;

    debug!(
        kind = kind.as_str(),
        pivots = pivots.len(),
        clusters = clusters.len(),
        "clustered pivots"
    );

    Ok(SideLevels {
        candidates: pivots.len(),
        ranked: rank_levels(&clusters, current, params.max_levels)?,
    })
}

/// Pivots -> clusters -> ranked levels, for both sides.
///
/// The last close is the current price. Either a full result or an error,
/// nothing in between.
pub fn analyze(series: &[Price], params: AnalysisParams) -> Result<AnalysisResult> {
    params.validate()?;

    let Some(&current_price) = series.last() else {
        return Err(LevelsError::EmptySeries);
    };

    if let Some(index) = series.iter().position(|p| !p.is_finite()) {
        return Err(LevelsError::NonFinitePrice { index });
    }

    let support = side(series, PivotKind::Support, current_price, params)?;
    let resistance = side(series, PivotKind::Resistance, current_price, params)?;

    debug!(
        n = series.len(),
        current = %current_price,
        tolerance = %params.tolerance,
        support = support.ranked.len(),
        resistance = resistance.ranked.len(),
        "analysis done"
    );

    Ok(AnalysisResult {
        current_price,
        support: support.ranked,
        resistance: resistance.ranked,
        support_candidates: support.candidates,
        resistance_candidates: resistance.candidates,
        params,
    })
}
