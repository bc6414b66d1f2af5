use std::fmt::Write;

use levels::{AnalysisResult, PivotKind, RankedLevel};

use crate::format::PriceFormat;

const RULE_WIDTH: usize = 60;

/// Analysis plus the instrument it belongs to
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub symbol: &'a str,
    pub display_name: &'a str,
    pub format: &'a PriceFormat,
    pub result: &'a AnalysisResult,
}

fn section(out: &mut String, report: &Report<'_>, kind: PivotKind) {
    let (title, tag) = match kind {
        PivotKind::Resistance => ("Resistance levels", 'R'),
        PivotKind::Support => ("Support levels", 'S'),
    };

    let _ = writeln!(out, "\n[{}]", title);
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    let levels: &[RankedLevel] = report.result.levels(kind);
    if levels.is_empty() {
        let _ = writeln!(out, "(none)");
        return;
    }

    for (i, l) in levels.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}{}: {:>15} | vs current: {:>+7.2}% | strength: {} ({} touch{})",
            tag,
            i + 1,
            report.format.format(l.price),
            l.distance_pct.0,
            l.strength,
            l.touches,
            if l.touches == 1 { "" } else { "es" },
        );
    }
}

/// Plain text report, resistance first then support
pub fn render_text(report: &Report<'_>) -> String {
    let r = report.result;
    let params = r.params();
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Symbol: {} ({})", report.display_name, report.symbol);
    let _ = writeln!(out, "Current price: {}", report.format.format(r.current_price()));
    let _ = writeln!(
        out,
        "Window order: {} | Tolerance: {:.2}% | Max levels: {}",
        params.window_order,
        params.tolerance.as_pct().0,
        params.max_levels
    );
    let _ = writeln!(
        out,
        "Pivot candidates: {} support / {} resistance",
        r.candidates(PivotKind::Support),
        r.candidates(PivotKind::Resistance)
    );
    let _ = writeln!(out, "{}", rule);

    section(&mut out, report, PivotKind::Resistance);
    section(&mut out, report, PivotKind::Support);

    let _ = writeln!(out, "{}", rule);
    out
}

/// Short guide printed after the report
pub fn reading_guide() -> &'static str {
    "\
Reading the levels:
- near resistance: upside may stall, consider selling or waiting
- near support: downside may stall, consider buying or waiting
- close above resistance: strong bullish signal
- close below support: strong bearish signal
"
}
