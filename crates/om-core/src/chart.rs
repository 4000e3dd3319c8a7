//! SVG line chart of the daily hourly-average trend.

use crate::summary::{Thresholds, TrendPoint};
use crate::time::format_date;

/// Top of the y axis in mL/hr. Larger values are drawn at the top edge.
pub const Y_AXIS_MAX: f64 = 35.0;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 320.0;
const MARGIN_LEFT: f64 = 48.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 48.0;
const Y_TICKS: [f64; 8] = [0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0];

const GRID_COLOR: &str = "#e5e7eb";
const LOW_COLOR: &str = "#ef4444";
const HIGH_COLOR: &str = "#22c55e";
const LINE_COLOR: &str = "#eab308";

/// Renders the trend as a standalone SVG document.
pub fn render_trend_svg(points: &[TrendPoint], thresholds: &Thresholds) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"sans-serif\" font-size=\"11\">\n"
    ));
    svg.push_str("<title>Daily Hourly Average Trend</title>\n");
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"white\"/>\n"
    ));

    if points.is_empty() {
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"#6b7280\">No data available for trending</text>\n",
            WIDTH / 2.0,
            HEIGHT / 2.0
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    for tick in Y_TICKS {
        let y = y_for(tick);
        svg.push_str(&format!(
            "<line x1=\"{MARGIN_LEFT:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{GRID_COLOR}\"/>\n",
            WIDTH - MARGIN_RIGHT
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" fill=\"#6b7280\">{tick}</text>\n",
            MARGIN_LEFT - 6.0,
            y + 4.0
        ));
    }

    for (value, color) in [
        (thresholds.low_ml_per_hour, LOW_COLOR),
        (thresholds.high_ml_per_hour, HIGH_COLOR),
    ] {
        let y = y_for(value);
        svg.push_str(&format!(
            "<line x1=\"{MARGIN_LEFT:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{color}\" stroke-dasharray=\"4 4\"/>\n",
            WIDTH - MARGIN_RIGHT
        ));
    }

    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, point)| (x_for(i, points.len()), y_for(f64::from(point.hourly_average))))
        .collect();

    if coords.len() > 1 {
        let path = coords
            .iter()
            .map(|(x, y)| format!("{x:.1},{y:.1}"))
            .collect::<Vec<_>>()
            .join(" ");
        svg.push_str(&format!(
            "<polyline points=\"{path}\" fill=\"none\" stroke=\"{LINE_COLOR}\" stroke-width=\"2\"/>\n"
        ));
    }

    for (point, (x, y)) in points.iter().zip(&coords) {
        let label = format_date(point.date);
        svg.push_str(&format!(
            "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"4\" fill=\"{LINE_COLOR}\" stroke=\"white\" stroke-width=\"2\"><title>{label}: {} mL/hr</title></circle>\n",
            point.hourly_average
        ));
        svg.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
            y - 8.0,
            point.hourly_average
        ));
        svg.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"#6b7280\">{label}</text>\n",
            HEIGHT - MARGIN_BOTTOM + 18.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn plot_width() -> f64 {
    WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_height() -> f64 {
    HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

#[allow(clippy::cast_precision_loss)]
fn x_for(index: usize, count: usize) -> f64 {
    if count <= 1 {
        MARGIN_LEFT + plot_width() / 2.0
    } else {
        MARGIN_LEFT + plot_width() * index as f64 / (count - 1) as f64
    }
}

fn y_for(value: f64) -> f64 {
    let clamped = value.clamp(0.0, Y_AXIS_MAX);
    MARGIN_TOP + (1.0 - clamped / Y_AXIS_MAX) * plot_height()
}
