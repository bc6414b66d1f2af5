//! Machine-readable output for chart renderers.

use levels::{AnalysisResult, PivotKind};
use serde::Serialize;

use crate::text::Report;

#[derive(Serialize)]
struct LevelRow<'a> {
    kind: &'a str,
    rank: usize,
    price: f64,
    touches: usize,
    distance_pct: f64,
    strength: &'a str,
}

#[derive(Serialize)]
struct Document<'a> {
    symbol: &'a str,
    name: &'a str,
    unit: &'a str,
    #[serde(flatten)]
    result: &'a AnalysisResult,
}

/// One row per level: kind, rank, price, touches, distance_pct, strength
pub fn write_levels_csv<W: std::io::Write>(w: W, result: &AnalysisResult) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(w);

    for kind in [PivotKind::Resistance, PivotKind::Support] {
        for (i, l) in result.levels(kind).iter().enumerate() {
            wtr.serialize(LevelRow {
                kind: kind.as_str(),
                rank: i + 1,
                price: l.price.0,
                touches: l.touches,
                distance_pct: l.distance_pct.0,
                strength: l.strength.as_str(),
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}

pub fn to_json(report: &Report<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Document {
        symbol: report.symbol,
        name: report.display_name,
        unit: report.format.unit(),
        result: report.result,
    })
}
