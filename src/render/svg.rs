//! SVG builders for the chart surfaces.
//!
//! Two chart shapes cover every surface: grouped vertical bars (with
//! optional two-line category labels) and a donut with a side legend.
//! Builders emit plain SVG 1.1 markup that the raster layer feeds to
//! the SVG engine, so no drawing happens here.

use std::fmt::Write;

const FONT_FAMILY: &str = "sans-serif";
const AXIS_COLOR: &str = "#9e9e9e";
const GRID_COLOR: &str = "#e0e0e0";
const TEXT_COLOR: &str = "#424242";

/// One plotted series across all categories. `values` must be the same
/// length as the category list passed to the builder.
#[derive(Debug, Clone)]
pub struct BarSeries {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
}

/// One donut slice.
#[derive(Debug, Clone)]
pub struct DonutSlice {
    pub label: String,
    pub value: f64,
    pub color: String,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Round the axis ceiling up to a clean step so gridlines land on
/// readable values.
fn nice_ceiling(max: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(max.log10().floor());
    let normalized = max / magnitude;
    let step = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    step * magnitude
}

/// Category label, split on `\n` into stacked tspans.
fn category_label(out: &mut String, x: f64, y: f64, label: &str) {
    let lines: Vec<&str> = label.split('\n').collect();
    let _ = write!(
        out,
        r#"<text x="{x:.1}" y="{y:.1}" font-family="{FONT_FAMILY}" font-size="13" fill="{TEXT_COLOR}" text-anchor="middle">"#
    );
    for (i, line) in lines.iter().enumerate() {
        let dy = if i == 0 { 0.0 } else { 15.0 };
        let _ = write!(
            out,
            r#"<tspan x="{x:.1}" dy="{dy:.1}">{}</tspan>"#,
            escape(line)
        );
    }
    out.push_str("</text>");
}

/// Grouped vertical bar chart with a top legend and a zero-based value
/// axis.
pub fn grouped_bar_chart(
    width: u32,
    height: u32,
    categories: &[String],
    series: &[BarSeries],
) -> String {
    let (w, h) = (width as f64, height as f64);
    let (left, right, top, bottom) = (70.0, 30.0, 50.0, 60.0);
    let plot_w = w - left - right;
    let plot_h = h - top - bottom;

    let max = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0_f64, f64::max);
    let ceiling = nice_ceiling(max);

    let mut out = String::with_capacity(4096);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><rect width="{width}" height="{height}" fill="white"/>"#
    );

    // Legend row across the top.
    let mut legend_x = left;
    for s in series {
        let _ = write!(
            out,
            r#"<rect x="{legend_x:.1}" y="14" width="14" height="14" fill="{}"/><text x="{:.1}" y="26" font-family="{FONT_FAMILY}" font-size="13" fill="{TEXT_COLOR}">{}</text>"#,
            s.color,
            legend_x + 20.0,
            escape(&s.name)
        );
        legend_x += 24.0 + 9.0 * s.name.len() as f64;
    }

    // Horizontal gridlines with value labels.
    for i in 0..=5 {
        let value = ceiling * i as f64 / 5.0;
        let y = top + plot_h - plot_h * i as f64 / 5.0;
        let _ = write!(
            out,
            r#"<line x1="{left:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{GRID_COLOR}" stroke-width="1"/><text x="{:.1}" y="{:.1}" font-family="{FONT_FAMILY}" font-size="12" fill="{TEXT_COLOR}" text-anchor="end">{}</text>"#,
            left + plot_w,
            left - 8.0,
            y + 4.0,
            if ceiling >= 10.0 {
                format!("{value:.0}")
            } else {
                format!("{value:.1}")
            }
        );
    }

    // Bars, grouped per category.
    if !categories.is_empty() && !series.is_empty() {
        let slot_w = plot_w / categories.len() as f64;
        let group_w = slot_w * 0.7;
        let bar_w = group_w / series.len() as f64;
        for (ci, category) in categories.iter().enumerate() {
            let group_x = left + slot_w * ci as f64 + (slot_w - group_w) / 2.0;
            for (si, s) in series.iter().enumerate() {
                let value = s.values.get(ci).copied().unwrap_or(0.0);
                let bar_h = plot_h * (value / ceiling).clamp(0.0, 1.0);
                let _ = write!(
                    out,
                    r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                    group_x + bar_w * si as f64,
                    top + plot_h - bar_h,
                    bar_w.max(1.0),
                    bar_h,
                    s.color
                );
            }
            category_label(
                &mut out,
                left + slot_w * (ci as f64 + 0.5),
                top + plot_h + 20.0,
                category,
            );
        }
    }

    let _ = write!(
        out,
        r#"<line x1="{left:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{AXIS_COLOR}" stroke-width="1"/></svg>"#,
        top + plot_h,
        left + plot_w,
        top + plot_h
    );
    out
}

/// Donut chart with slice percentages in a legend on the right.
pub fn donut_chart(width: u32, height: u32, slices: &[DonutSlice]) -> String {
    let (w, h) = (width as f64, height as f64);
    let cx = w * 0.35;
    let cy = h / 2.0;
    let outer = (h / 2.0 - 40.0).max(10.0);
    let inner = outer * 0.55;
    let total: f64 = slices.iter().map(|s| s.value).sum();

    let mut out = String::with_capacity(2048);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><rect width="{width}" height="{height}" fill="white"/>"#
    );

    let mut angle = -90.0_f64;
    for s in slices {
        if total <= 0.0 || s.value <= 0.0 {
            continue;
        }
        // A sweep of a full turn collapses the arc, so cap just short.
        let sweep = (s.value / total * 360.0).min(359.99);
        let (a0, a1) = (angle.to_radians(), (angle + sweep).to_radians());
        angle += sweep;
        let (x0, y0) = (cx + outer * a0.cos(), cy + outer * a0.sin());
        let (x1, y1) = (cx + outer * a1.cos(), cy + outer * a1.sin());
        let (ix0, iy0) = (cx + inner * a0.cos(), cy + inner * a0.sin());
        let (ix1, iy1) = (cx + inner * a1.cos(), cy + inner * a1.sin());
        let large = i32::from(sweep > 180.0);
        let _ = write!(
            out,
            r#"<path d="M {x0:.2} {y0:.2} A {outer:.2} {outer:.2} 0 {large} 1 {x1:.2} {y1:.2} L {ix1:.2} {iy1:.2} A {inner:.2} {inner:.2} 0 {large} 0 {ix0:.2} {iy0:.2} Z" fill="{}"/>"#,
            s.color
        );
    }

    // Legend with absolute values and shares.
    let legend_x = w * 0.62;
    let mut legend_y = cy - 12.0 * slices.len() as f64;
    for s in slices {
        let share = if total > 0.0 {
            s.value / total * 100.0
        } else {
            0.0
        };
        let _ = write!(
            out,
            r#"<rect x="{legend_x:.1}" y="{:.1}" width="14" height="14" fill="{}"/><text x="{:.1}" y="{:.1}" font-family="{FONT_FAMILY}" font-size="14" fill="{TEXT_COLOR}">{} ({:.0}, {share:.1}%)</text>"#,
            legend_y,
            s.color,
            legend_x + 20.0,
            legend_y + 12.0,
            escape(&s.label),
            s.value
        );
        legend_y += 24.0;
    }

    out.push_str("</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, values: &[f64]) -> BarSeries {
        BarSeries {
            name: name.to_string(),
            color: "#6A1B9A".to_string(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn nice_ceiling_rounds_up_to_clean_steps() {
        assert_eq!(nice_ceiling(0.0), 1.0);
        assert_eq!(nice_ceiling(7.3), 10.0);
        assert_eq!(nice_ceiling(42.0), 50.0);
        assert_eq!(nice_ceiling(100.0), 100.0);
        assert_eq!(nice_ceiling(130.0), 200.0);
    }

    #[test]
    fn bar_chart_emits_one_rect_per_bar() {
        let svg = grouped_bar_chart(
            1200,
            600,
            &["A".to_string(), "B".to_string()],
            &[series("Female", &[30.0, 45.0]), series("Male", &[60.0, 50.0])],
        );
        // Background + 2 legend swatches + 4 bars.
        assert_eq!(svg.matches("<rect").count(), 7);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn two_line_labels_become_tspans() {
        let svg = grouped_bar_chart(
            1200,
            600,
            &["Local\nEngineering".to_string()],
            &[series("2024", &[10.0])],
        );
        assert!(svg.contains(">Local</tspan>"));
        assert!(svg.contains(">Engineering</tspan>"));
    }

    #[test]
    fn donut_skips_zero_slices_and_escapes_labels() {
        let svg = donut_chart(
            1200,
            600,
            &[
                DonutSlice {
                    label: "R&R".to_string(),
                    value: 10.0,
                    color: "#45B7D1".to_string(),
                },
                DonutSlice {
                    label: "None".to_string(),
                    value: 0.0,
                    color: "#FF6B6B".to_string(),
                },
            ],
        );
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains("R&amp;R"));
    }
}
