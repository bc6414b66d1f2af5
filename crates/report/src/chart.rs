//! SVG chart: closes, a dashed current-price line, and the ranked levels
//! drawn across the whole range.

use std::path::Path;

use domain::PriceSeries;
use levels::PivotKind;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::text::Report;

pub type ChartError = DrawingAreaErrorKind<std::io::Error>;

const SIZE: (u32, u32) = (1400, 700);

/// `005930.KS_support_resistance.svg`
pub fn default_chart_name(symbol: &str) -> String {
    let safe: String = symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{}_support_resistance.svg", safe)
}

/// Closes and level prices with 5% headroom on both sides
fn y_range(series: &PriceSeries, report: &Report<'_>) -> (f64, f64) {
    let r = report.result;
    let (lo, hi) = series
        .closes()
        .into_iter()
        .chain(r.support().iter().chain(r.resistance()).map(|l| l.price))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));

    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }

    let pad = ((hi - lo) * 0.05).max(hi.abs() * 0.01).max(1e-6);
    (lo - pad, hi + pad)
}

pub fn write_chart_svg(path: &Path, series: &PriceSeries, report: &Report<'_>) -> Result<(), ChartError> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let points = series.points();
    let last = points.len().saturating_sub(1).max(1) as f64;
    let (lo, hi) = y_range(series, report);
    let r = report.result;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} ({}) support / resistance", report.display_name, report.symbol),
            ("sans-serif", 22),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..last, lo..hi)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|x: &f64| {
            points
                .get(x.round() as usize)
                .map(|p| p.date.to_string())
                .unwrap_or_default()
        })
        .y_desc(format!("Price ({})", report.format.unit()))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            points.iter().enumerate().map(|(i, p)| (i as f64, p.close.0)),
            BLUE.stroke_width(2),
        ))?
        .label("Close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    let current = r.current_price().0;
    let dash = (last / 60.0).max(0.5);
    chart
        .draw_series(
            (0u32..)
                .map(|k| k as f64 * dash * 2.0)
                .take_while(|&x| x < last)
                .map(|x| {
                    PathElement::new(
                        vec![(x, current), ((x + dash).min(last), current)],
                        BLACK.stroke_width(2),
                    )
                }),
        )?
        .label(format!("Current {}", report.format.format(r.current_price())))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    for (kind, color, tag) in [
        (PivotKind::Resistance, RED, 'R'),
        (PivotKind::Support, GREEN, 'S'),
    ] {
        for (i, l) in r.levels(kind).iter().enumerate() {
            let y = l.price.0;
            // stronger and higher-ranked levels are bolder
            let style = color
                .mix(0.4 + 0.6 / (i + 1) as f64)
                .stroke_width(1 + l.touches.min(3) as u32);

            chart.draw_series(std::iter::once(PathElement::new(vec![(0.0, y), (last, y)], style)))?;
            chart.draw_series(std::iter::once(Text::new(
                format!("{}{} {}", tag, i + 1, report.format.format(l.price)),
                (0.0, y),
                ("sans-serif", 14).into_font().color(&color),
            )))?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use domain::{Price, PricePoint, Ratio};
    use levels::{AnalysisParams, AnalysisResult, analyze};

    use super::*;
    use crate::format::PriceFormat;

    fn series(raw: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        PriceSeries::new(
            raw.iter()
                .enumerate()
                .map(|(i, &c)| PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    close: Price(c),
                })
                .collect(),
        )
    }

    fn result(s: &PriceSeries) -> AnalysisResult {
        analyze(
            &s.closes(),
            AnalysisParams {
                window_order: 1,
                tolerance: Ratio(0.015),
                max_levels: 5,
            },
        )
        .unwrap()
    }

    #[test]
    fn chart_name_is_file_safe() {
        assert_eq!(default_chart_name("^KS11"), "_KS11_support_resistance.svg");
        assert_eq!(default_chart_name("AAPL"), "AAPL_support_resistance.svg");
    }

    #[test]
    fn flat_series_still_has_a_range() {
        let s = series(&[5.0, 5.0, 5.0]);
        let r = result(&s);
        let (lo, hi) = y_range(
            &s,
            &Report {
                symbol: "X",
                display_name: "X",
                format: &PriceFormat::Usd,
                result: &r,
            },
        );
        assert!(lo < 5.0 && hi > 5.0);
    }

    #[test]
    fn writes_svg_with_level_labels() {
        let s = series(&[10.0, 9.0, 8.0, 9.0, 10.0, 11.0, 10.0, 9.0, 8.0, 9.0, 10.0]);
        let r = result(&s);
        let path = std::env::temp_dir().join(format!("sr-chart-{}.svg", std::process::id()));

        write_chart_svg(
            &path,
            &s,
            &Report {
                symbol: "TEST",
                display_name: "Test Corp",
                format: &PriceFormat::Usd,
                result: &r,
            },
        )
        .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("R1 $10.00"));
        assert!(svg.contains("S1 $8.00"));
        assert!(svg.contains("Price (USD)"));
    }
}
