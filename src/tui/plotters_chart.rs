//! Plotters-powered trend chart widget for Ratatui.
//!
//! Periods are categorical, so the x axis is a segmented integer range: one
//! segment per period, labelled with the period header. Bars are drawn as
//! filled rectangles from zero; the line variant joins segment centres.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// `filled()` lives on plotters' `Color`; ratatui's `Color` is imported by name.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::ChartStyle;

/// A lightweight, render-only chart description.
///
/// Bounds are computed outside the render call (see [`trend_bounds`]).
pub struct TrendChart<'a> {
    pub periods: &'a [String],
    /// One entry per period; `None` keeps the slot empty.
    pub values: &'a [Option<f64>],
    pub style: ChartStyle,
    pub y_bounds: [f64; 2],
    pub fmt_y: fn(f64) -> String,
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 6 {
            buf.set_stringn(
                area.x,
                area.y,
                "Chart too small",
                area.width as usize,
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [y0, y1] = self.y_bounds;
        let n = self.periods.len() as i32;
        if n == 0 || !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d((0..n).into_segmented(), y0..y1)?;

            let periods = self.periods;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(periods.len())
                .y_labels(4)
                .x_label_formatter(&|v| match v {
                    SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                        periods.get(*i as usize).cloned().unwrap_or_default()
                    }
                    SegmentValue::Last => String::new(),
                })
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let points = self
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i as i32, v)));

            match self.style {
                ChartStyle::Bars => {
                    let bar_color = RGBColor(0, 255, 255); // cyan
                    chart.draw_series(points.map(|(i, v)| {
                        Rectangle::new(
                            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                            bar_color.filled(),
                        )
                    }))?;
                }
                ChartStyle::Line => {
                    let line_color = RGBColor(0, 255, 0); // green
                    let line: Vec<_> = points.map(|(i, v)| (SegmentValue::CenterOf(i), v)).collect();
                    chart.draw_series(LineSeries::new(line.iter().cloned(), &line_color))?;
                    // Pixels, not circles: the backend maps circle radii badly.
                    chart.draw_series(line.into_iter().map(|p| Pixel::new(p, WHITE)))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Y bounds for a trend: data range plus zero, padded 5%.
///
/// `None` when there is nothing numeric to draw.
pub fn trend_bounds(values: &[Option<f64>]) -> Option<[f64; 2]> {
    let mut numeric = values.iter().flatten().copied().peekable();
    numeric.peek()?;

    let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
    for v in numeric {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if hi <= lo {
        hi = lo + 1.0;
    }
    let pad = ((hi - lo) * 0.05).max(1e-12);
    Some([lo - pad, hi + pad])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_include_zero() {
        assert_eq!(trend_bounds(&[Some(100.0), None, Some(200.0)]), Some([-10.0, 210.0]));
        let [lo, hi] = trend_bounds(&[Some(-50.0), Some(-10.0)]).unwrap();
        assert!(lo < -50.0 && hi > 0.0);
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content()
            .chunks(buf.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(style: ChartStyle, width: u16, height: u16) -> Buffer {
        let periods = vec!["Mar 23".to_string(), "Mar 22".to_string(), "Mar 21".to_string()];
        let values = vec![Some(140.0), None, Some(-20.0)];
        let y_bounds = trend_bounds(&values).unwrap();
        let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
        let chart = TrendChart {
            periods: &periods,
            values: &values,
            style,
            y_bounds,
            fmt_y: |v| format!("{v:.0}"),
        };
        chart.render(buf.area, &mut buf);
        buf
    }

    #[test]
    fn bars_and_line_draw_into_the_buffer() {
        for style in [ChartStyle::Bars, ChartStyle::Line] {
            let text = buffer_text(&render(style, 60, 20));
            assert!(!text.contains("Chart too small"), "{style:?}");
            assert!(text.chars().any(|c| !c.is_whitespace()), "{style:?} drew nothing");
        }
    }

    #[test]
    fn small_area_shows_hint() {
        let text = buffer_text(&render(ChartStyle::Bars, 30, 4));
        assert!(text.starts_with("Chart too small"));
    }

    #[test]
    fn empty_area_is_a_no_op() {
        let buf = render(ChartStyle::Line, 0, 0);
        assert!(buf.content().is_empty());
    }

    #[test]
    fn no_numbers_no_bounds() {
        assert_eq!(trend_bounds(&[None, None]), None);
        assert_eq!(trend_bounds(&[]), None);
    }
}
