//! SVG chart of an analysis: observations, fitted line, prediction band,
//! Ele.Flow limits and the recommended F.S.Flux range.
//!
//! Pure presentation. All numbers come from an [`Analysis`].

pub mod layout;

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::Analysis;
use crate::common::types::{ELE_FLOW_COLUMN, FLUX_COLUMN};
use crate::error::{Error, Result};
pub use layout::ChartLayout;

/// Number of samples used to draw the fitted line and the band.
pub const LINE_SAMPLES: usize = 200;

pub const LABEL_INSIDE: &str = "Within prediction interval";
pub const LABEL_OUTSIDE: &str = "Outside prediction interval";
pub const LABEL_REGRESSION: &str = "Regression line";
pub const LABEL_RANGE: &str = "Flat-membrane flux range";
pub const LABEL_UPPER_LIMIT: &str = "Upper limit";
pub const LABEL_LOWER_LIMIT: &str = "Lower limit";
pub const LABEL_NO_RANGE: &str = "No valid range for these bounds";

const INSIDE_COLOR: RGBColor = RGBColor(0, 90, 180);
const OUTSIDE_COLOR: RGBColor = RGBColor(198, 40, 40);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const LIMIT_COLOR: RGBColor = RGBColor(198, 40, 40);
const RANGE_COLOR: RGBColor = RGBColor(46, 125, 50);
const RANGE_TEXT_COLOR: RGBColor = RGBColor(27, 94, 32);
const NO_RANGE_COLOR: RGBColor = RGBColor(183, 28, 28);

/// Radius of the dots marking each intersection.
const DOT_RADIUS: i32 = 2;

/// Output size and optional destination of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    pub output: Option<PathBuf>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 560,
            output: None,
        }
    }
}

/// Legend label of the prediction band, e.g. "95% prediction interval".
pub fn interval_label(prediction_interval_pct: f64) -> String {
    format!("{}% prediction interval", prediction_interval_pct)
}

/// Text of the range annotation, e.g. "Range: 1.58 - 4.34".
pub fn range_label(min_intersection: f64, max_intersection: f64) -> String {
    format!("Range: {:.2} - {:.2}", min_intersection, max_intersection)
}

/// Render the chart as an SVG document.
pub fn render_svg(analysis: &Analysis, settings: &ChartSettings) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (settings.width, settings.height))
            .into_drawing_area();
        draw(&root, analysis)?;
        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}

/// Render the chart and write it to `path`.
pub fn write_svg(analysis: &Analysis, settings: &ChartSettings, path: &Path) -> Result<()> {
    let svg = render_svg(analysis, settings)?;
    std::fs::write(path, svg)?;
    info!(path = %path.display(), "wrote chart");
    Ok(())
}

fn chart_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Chart(e.to_string())
}

fn draw<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, analysis: &Analysis) -> Result<()> {
    let params = &analysis.params;
    let result = &analysis.result;
    let obs = &analysis.observations;
    let layout = ChartLayout::compute(obs, &result.intersection(), params.min_ele_flow, params.max_ele_flow);

    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(layout.x_min..layout.x_max, layout.y_min..layout.y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc(FLUX_COLUMN)
        .y_desc(ELE_FLOW_COLUMN)
        .y_label_formatter(&|v: &f64| format_thousands(*v))
        .label_style(("sans-serif", 15))
        .draw()
        .map_err(chart_err)?;

    let xs = layout.sample_x(LINE_SAMPLES);

    // Shaded band between the linearized envelopes
    let lower = analysis.envelopes.lower;
    let upper = analysis.envelopes.upper;
    let mut band: Vec<(f64, f64)> = xs.iter().map(|&x| (x, upper.value_at(x))).collect();
    band.extend(xs.iter().rev().map(|&x| (x, lower.value_at(x))));
    chart
        .draw_series(std::iter::once(Polygon::new(band, LINE_COLOR.mix(0.25).filled())))
        .map_err(chart_err)?
        .label(interval_label(params.prediction_interval_pct))
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], LINE_COLOR.mix(0.25).filled()));

    let fit = analysis.regression.fit;
    chart
        .draw_series(LineSeries::new(
            xs.iter().map(|&x| (x, fit.predict(x))),
            LINE_COLOR.stroke_width(3),
        ))
        .map_err(chart_err)?
        .label(LABEL_REGRESSION)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], LINE_COLOR.stroke_width(3)));

    let inside = analysis.regression.summary.inside_mask(&obs.y);
    let points = |want_inside: bool| -> Vec<(f64, f64)> {
        obs.x
            .iter()
            .zip(&obs.y)
            .zip(&inside)
            .filter(|(_, is_inside)| **is_inside == want_inside)
            .map(|((&x, &y), _)| (x, y))
            .collect()
    };
    for (want_inside, color, label) in [
        (true, INSIDE_COLOR, LABEL_INSIDE),
        (false, OUTSIDE_COLOR, LABEL_OUTSIDE),
    ] {
        chart
            .draw_series(
                points(want_inside)
                    .into_iter()
                    .map(move |p| Circle::new(p, 5, color.filled())),
            )
            .map_err(chart_err)?
            .label(label)
            .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
    }

    // Ele.Flow limits
    let label_x = layout.x_max - (layout.x_max - layout.x_min) * 0.12;
    for (bound, label) in [
        (params.max_ele_flow, LABEL_UPPER_LIMIT),
        (params.min_ele_flow, LABEL_LOWER_LIMIT),
    ] {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(layout.x_min, bound), (layout.x_max, bound)],
                10,
                6,
                LIMIT_COLOR.stroke_width(2),
            ))
            .map_err(chart_err)?;
        chart
            .draw_series(std::iter::once(Text::new(
                label,
                (label_x, bound),
                ("sans-serif", 16).into_font().color(&LIMIT_COLOR),
            )))
            .map_err(chart_err)?;
    }

    let marker_y = layout.marker_y();
    let label_y = layout.marker_label_y();
    if result.intersection().is_finite() {
        let (lo, hi) = (result.min_intersection, result.max_intersection);
        for x in [lo, hi] {
            chart
                .draw_series(DottedLineSeries::new(
                    vec![(x, layout.y_min), (x, layout.y_max)],
                    0,
                    8,
                    |c: (i32, i32)| Circle::new(c, DOT_RADIUS, RANGE_COLOR.filled()),
                ))
                .map_err(chart_err)?;
        }
        chart
            .draw_series(LineSeries::new(vec![(lo, marker_y), (hi, marker_y)], RANGE_COLOR.stroke_width(12)))
            .map_err(chart_err)?
            .label(LABEL_RANGE)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RANGE_COLOR.stroke_width(6)));
        chart
            .draw_series([lo, hi].into_iter().map(|x| Circle::new((x, marker_y), 6, RANGE_COLOR.filled())))
            .map_err(chart_err)?;
        chart
            .draw_series(std::iter::once(Text::new(
                range_label(lo, hi),
                ((lo + hi) / 2.0, label_y),
                ("sans-serif", 16).into_font().color(&RANGE_TEXT_COLOR),
            )))
            .map_err(chart_err)?;
    } else {
        chart
            .draw_series(std::iter::once(Text::new(
                LABEL_NO_RANGE,
                ((layout.x_min + layout.x_max) / 2.0, label_y),
                ("sans-serif", 16).into_font().color(&NO_RANGE_COLOR),
            )))
            .map_err(chart_err)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", 16))
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()
        .map_err(chart_err)?;

    Ok(())
}

/// Integer tick label with thousands separators, e.g. 13200 -> "13,200".
fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as i64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
