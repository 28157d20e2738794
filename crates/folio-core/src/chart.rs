//! Chart rendering collaborator.
//!
//! Rendering is a pure function from a dated series to image bytes; the
//! pipeline never looks inside the result. The shipped renderer draws a
//! single-series SVG line chart with a monthly time axis and
//! percent-formatted gridlines.

use time::Date;

/// Chart-ready view over a return series.
#[derive(Debug, Clone, Copy)]
pub struct ChartSeries<'a> {
    pub dates: &'a [Date],
    pub values: &'a [f64],
}

/// Rendered image bytes plus their mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// Chart rendering contract.
pub trait ChartRenderer: Send + Sync {
    fn render_line(&self, series: ChartSeries<'_>, title: &str, y_label: &str) -> RenderedChart;
}

const WIDTH: i32 = 576;
const HEIGHT: i32 = 288;
const PADDING: f64 = 36.0;
const LINE_COLOR: &str = "#348dc1";

/// Hand-drawn SVG line charts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgChartRenderer;

impl ChartRenderer for SvgChartRenderer {
    fn render_line(&self, series: ChartSeries<'_>, title: &str, y_label: &str) -> RenderedChart {
        let svg = draw_line_chart(series.dates, series.values, title, y_label);
        RenderedChart {
            bytes: svg.into_bytes(),
            mime: "image/svg+xml",
        }
    }
}

fn draw_line_chart(dates: &[Date], values: &[f64], title: &str, y_label: &str) -> String {
    let width = WIDTH as f64;
    let height = HEIGHT as f64;

    let mut svg = String::new();
    svg.push_str(&svg_header(WIDTH, HEIGHT));
    svg.push_str(&format!(
        r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="13" fill="#333">{title}</text>"##,
        x = width / 2.0,
        y = PADDING - 16.0,
    ));

    if dates.is_empty() || values.is_empty() {
        svg.push_str(svg_footer());
        return svg;
    }

    let xs = x_positions(values.len(), width);
    let (min_v, max_v) = value_extent(values);
    let value_to_y = |v: f64| scale_value(v, min_v, max_v, height);

    // Percent gridlines, zero line emphasized when in range.
    for i in 0..=4 {
        let value = min_v + (max_v - min_v) * (i as f64 / 4.0);
        let y = value_to_y(value);
        let color = if value.abs() < 1e-12 { "#000" } else { "#eeeeee" };
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="1" />"#,
            x1 = PADDING,
            x2 = width - PADDING,
        ));
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="end" fill="#666" dy="-4">{label}</text>"##,
            x = PADDING - 6.0,
            y = y,
            label = format_percentage(value),
        ));
    }

    if min_v <= 0.0 && max_v >= 0.0 {
        let zero_y = value_to_y(0.0);
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#bbbbbb" stroke-width="1" stroke-dasharray="4 3" />"##,
            x1 = PADDING,
            x2 = width - PADDING,
            y = zero_y,
        ));
    }

    let points = xs
        .iter()
        .zip(values.iter())
        .filter(|(_, v)| v.is_finite())
        .map(|(x, v)| format!("{:.2},{:.2}", x, value_to_y(*v)))
        .collect::<Vec<_>>()
        .join(" ");
    svg.push_str(&format!(
        r#"<polyline fill="none" stroke="{LINE_COLOR}" stroke-width="1.8" points="{points}" />"#,
    ));

    add_time_axis(&mut svg, dates, &xs, width, height);

    svg.push_str(&format!(
        r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" fill="#666" transform="rotate(-90 {x:.2} {y:.2})">{y_label}</text>"##,
        x = 12.0,
        y = height / 2.0,
    ));

    svg.push_str(svg_footer());
    svg
}

fn svg_header(width: i32, height: i32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style>"#,
    )
}

fn svg_footer() -> &'static str {
    "</svg>"
}

fn x_positions(len: usize, width: f64) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    if len == 1 {
        return vec![width / 2.0];
    }

    let inner_width = width - 2.0 * PADDING;
    (0..len)
        .map(|i| PADDING + inner_width * (i as f64 / (len - 1) as f64))
        .collect()
}

fn value_extent(values: &[f64]) -> (f64, f64) {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values.iter().copied().filter(|v| v.is_finite()) {
        if v < min_v {
            min_v = v;
        }
        if v > max_v {
            max_v = v;
        }
    }

    if !min_v.is_finite() || !max_v.is_finite() {
        return (-0.5, 0.5);
    }

    if min_v == max_v {
        let adjust = if min_v == 0.0 { 1.0 } else { min_v.abs() * 0.1 }; // widen flat ranges
        min_v -= adjust;
        max_v += adjust;
    }

    (min_v, max_v)
}

fn scale_value(value: f64, min_v: f64, max_v: f64, height: f64) -> f64 {
    if (max_v - min_v).abs() < f64::EPSILON {
        return height / 2.0;
    }

    let inner_height = height - 2.0 * PADDING;
    let norm = (value - min_v) / (max_v - min_v);
    PADDING + (1.0 - norm) * inner_height
}

fn format_percentage(value: f64) -> String {
    let pct = value * 100.0;
    if pct.abs() >= 1000.0 {
        format!("{:.0}K%", pct / 1000.0)
    } else if pct.abs() >= 10.0 {
        format!("{pct:.0}%")
    } else {
        format!("{pct:.1}%")
    }
}

fn add_time_axis(svg: &mut String, dates: &[Date], xs: &[f64], width: f64, height: f64) {
    if dates.is_empty() || xs.is_empty() {
        return;
    }

    let axis_y = height - PADDING + 5.0;
    svg.push_str(&format!(
        r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#000" stroke-width="1" />"##,
        x1 = PADDING,
        x2 = width - PADDING,
        y = axis_y,
    ));

    // One tick per month boundary, thinned so labels never collide.
    let mut boundaries = Vec::new();
    let mut last_month = None;
    for (idx, date) in dates.iter().enumerate() {
        let key = (date.year(), date.month() as u8);
        if last_month == Some(key) {
            continue;
        }
        last_month = Some(key);
        boundaries.push(idx);
    }

    let max_labels = 12;
    let stride = boundaries.len().div_ceil(max_labels).max(1);

    for (position, idx) in boundaries.into_iter().enumerate() {
        if position % stride != 0 || idx >= xs.len() {
            continue;
        }
        let x = xs[idx];
        let date = dates[idx];
        let label = format!("{:04}-{:02}", date.year(), date.month() as u8);

        svg.push_str(&format!(
            r##"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="#ccc" stroke-width="1" />"##,
            y1 = axis_y,
            y2 = axis_y + 4.0,
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            y = axis_y + 16.0,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn renders_svg_with_title_and_polyline() {
        let dates = vec![date!(2024 - 01 - 02), date!(2024 - 01 - 03)];
        let values = vec![0.1, 0.2];
        let chart = SvgChartRenderer.render_line(
            ChartSeries {
                dates: &dates,
                values: &values,
            },
            "Cumulative Portfolio Returns",
            "Cumulative Returns",
        );

        assert_eq!(chart.mime, "image/svg+xml");
        let svg = String::from_utf8(chart.bytes).expect("svg is utf-8");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Cumulative Portfolio Returns"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("2024-01"));
    }

    #[test]
    fn empty_series_still_produces_valid_svg() {
        let chart = SvgChartRenderer.render_line(
            ChartSeries {
                dates: &[],
                values: &[],
            },
            "Daily Portfolio Returns",
            "Daily Returns",
        );

        let svg = String::from_utf8(chart.bytes).expect("svg is utf-8");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let dates = vec![date!(2024 - 01 - 02), date!(2024 - 01 - 03)];
        let values = vec![-0.01, 0.02];
        let series = ChartSeries {
            dates: &dates,
            values: &values,
        };

        let first = SvgChartRenderer.render_line(series, "t", "y");
        let second = SvgChartRenderer.render_line(series, "t", "y");
        assert_eq!(first, second);
    }
}
