pub mod analysis;
pub mod cluster;
pub mod error;
pub mod pivot;
pub mod rank;

pub use analysis::{AnalysisParams, AnalysisResult, AnalysisSession, analyze};
pub use cluster::{LevelCluster, cluster_levels};
pub use error::{LevelsError, Result};
pub use pivot::{Pivot, PivotKind, find_pivots};
pub use rank::{RankedLevel, Strength, rank_levels};

#[cfg(test)]
mod tests;
