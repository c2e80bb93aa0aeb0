//! ASCII plotting of trend series for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for tests)
//!
//! Periods are spread evenly across the width (one slot each). Plot elements:
//! - bar chart: `#` columns from zero to the value
//! - line chart: `o` at each value, joined with `-`

use crate::domain::TrendPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Bars,
    Line,
}

/// Render `series` as a small chart with a range header and a period axis.
///
/// Cells that don't parse as numbers keep their slot but draw nothing. A
/// series without any numeric value renders as "nothing to chart".
pub fn render_trend_chart(title: &str, series: &[TrendPoint], style: ChartStyle, width: usize, height: usize) -> String {
    let values: Vec<Option<f64>> = series.iter().map(TrendPoint::numeric).collect();
    if values.iter().all(Option::is_none) {
        return format!("{title}: (nothing to chart)\n");
    }

    let slots = series.len();
    let slot_width = (width / slots).max(3);
    let width = slot_width * slots;
    let height = height.max(3);

    let include_zero = style == ChartStyle::Bars;
    let (y_min, y_max) = y_range(&values, include_zero).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let centers: Vec<usize> = (0..slots).map(|i| i * slot_width + slot_width / 2).collect();

    match style {
        ChartStyle::Bars => {
            let base = map_y(0.0, y_min, y_max, height);
            for (x, v) in centers.iter().zip(&values) {
                let Some(v) = v else { continue };
                let top = map_y(*v, y_min, y_max, height);
                let (from, to) = if top <= base { (top, base) } else { (base, top) };
                for row in grid.iter_mut().take(to + 1).skip(from) {
                    row[*x] = '#';
                }
            }
        }
        ChartStyle::Line => {
            let points: Vec<(usize, usize)> = centers
                .iter()
                .zip(&values)
                .filter_map(|(x, v)| v.map(|v| (*x, map_y(v, y_min, y_max, height))))
                .collect();
            for pair in points.windows(2) {
                draw_line(&mut grid, pair[0].0, pair[0].1, pair[1].0, pair[1].1, '-');
            }
            for (x, y) in points {
                grid[y][x] = 'o';
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{title}: y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let mut axis = String::new();
    for p in series {
        let label: String = p.period.chars().take(slot_width - 1).collect();
        axis.push_str(&format!("{label:^slot_width$}"));
    }
    out.push_str(axis.trim_end());
    out.push('\n');

    out
}

fn y_range(values: &[Option<f64>], include_zero: bool) -> Option<(f64, f64)> {
    let mut min_y = if include_zero { 0.0 } else { f64::INFINITY };
    let mut max_y = if include_zero { 0.0 } else { f64::NEG_INFINITY };

    for v in values.iter().flatten() {
        min_y = min_y.min(*v);
        max_y = max_y.max(*v);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && max_y.is_finite() {
        // Flat series: give it a unit band so it lands mid-chart.
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> Vec<TrendPoint> {
        vec![
            TrendPoint::new("2021", "100"),
            TrendPoint::new("2022", "120"),
            TrendPoint::new("2023", "140"),
        ]
    }

    #[test]
    fn bars_golden_snapshot_small() {
        let txt = render_trend_chart("Total Assets", &assets(), ChartStyle::Bars, 15, 4);
        let expected = concat!(
            "Total Assets: y=[-7.00, 147.00]\n",
            "            #\n",
            "  #    #    #\n",
            "  #    #    #\n",
            "  #    #    #\n",
            "2021 2022 2023\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn line_marks_every_numeric_point() {
        let txt = render_trend_chart("NP", &assets(), ChartStyle::Line, 30, 6);
        assert_eq!(txt.matches('o').count(), 3);
        assert!(txt.contains('-'));
    }

    #[test]
    fn non_numeric_series_has_nothing_to_chart() {
        let series = vec![TrendPoint::new("2021", "n/a"), TrendPoint { period: "2022".to_string(), value: None }];
        assert_eq!(
            render_trend_chart("Net Profit", &series, ChartStyle::Line, 20, 5),
            "Net Profit: (nothing to chart)\n"
        );
        assert_eq!(
            render_trend_chart("Net Profit", &[], ChartStyle::Bars, 20, 5),
            "Net Profit: (nothing to chart)\n"
        );
    }
}
