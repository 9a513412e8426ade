use std::collections::HashMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::charts::{ChartSpec, HoverMode, TraceStyle};
use crate::color::SeriesColor;

fn to_color32(c: SeriesColor) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// egui_plot fills with the stroke colour scaled by `fill_alpha`, so the
/// stroke stays opaque and the configured alpha drives the fill.
fn area_stroke_and_alpha(fill: SeriesColor) -> (Color32, f32) {
    let stroke = Color32::from_rgb(fill.r, fill.g, fill.b);
    (stroke, f32::from(fill.a) / 255.0)
}

/// Lines and fills need two points; a single month is drawn as a marker.
fn needs_marker(points: &[[f64; 2]]) -> bool {
    points.len() == 1
}

/// Axis index for `value` if it sits on a category tick.
fn category_index(value: f64, len: usize) -> Option<usize> {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return None;
    }
    let idx = rounded as usize;
    (idx < len).then_some(idx)
}

// ---------------------------------------------------------------------------
// Chart rendering
// ---------------------------------------------------------------------------

/// Render a [`ChartSpec`] on a categorical month axis.
///
/// Each label is placed at its position in [`ChartSpec::category_axis`], so
/// traces with different months still line up where labels match.
pub fn chart_plot(ui: &mut Ui, id: &str, spec: &ChartSpec) {
    let axis = spec.category_axis();
    let position: HashMap<&str, f64> = axis
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i as f64))
        .collect();

    ui.heading(&spec.title);

    let tick_axis = axis.clone();
    let hover_axis = axis.clone();
    let hover_traces: Vec<(String, HashMap<String, u64>)> = spec
        .traces
        .iter()
        .map(|t| {
            let by_label = t.x.iter().cloned().zip(t.y.iter().copied()).collect();
            (t.name.clone(), by_label)
        })
        .collect();
    let hover = spec.hover;

    Plot::new(id)
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label(spec.x_title.clone())
        .y_axis_label(spec.y_title.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .include_y(0.0)
        .x_axis_formatter(move |mark: GridMark, _range| {
            category_index(mark.value, tick_axis.len())
                .map(|i| tick_axis[i].clone())
                .unwrap_or_default()
        })
        .label_formatter(move |name, point| {
            let Some(i) = category_index(point.x.round(), hover_axis.len()) else {
                return String::new();
            };
            let month = &hover_axis[i];
            match hover {
                HoverMode::X => format!("{name}\n{month}: {:.0}", point.y),
                HoverMode::XUnified => {
                    let mut text = month.clone();
                    for (trace, by_label) in &hover_traces {
                        if let Some(count) = by_label.get(month) {
                            text.push_str(&format!("\n{trace}: {count}"));
                        }
                    }
                    text
                }
            }
        })
        .show(ui, |plot_ui| {
            for trace in &spec.traces {
                let points: Vec<[f64; 2]> = trace
                    .x
                    .iter()
                    .zip(trace.y.iter())
                    .filter_map(|(label, &count)| {
                        position.get(label.as_str()).map(|&x| [x, count as f64])
                    })
                    .collect();
                let marker = needs_marker(&points);

                let (line, color) = match trace.style {
                    TraceStyle::Area { fill } => {
                        let (stroke, alpha) = area_stroke_and_alpha(fill);
                        let line = Line::new(PlotPoints::from(points.clone()))
                            .name(&trace.name)
                            .color(stroke)
                            .fill(0.0)
                            .fill_alpha(alpha)
                            .width(1.5);
                        (line, stroke)
                    }
                    TraceStyle::Line { color } => {
                        let color = to_color32(color);
                        let line = Line::new(PlotPoints::from(points.clone()))
                            .name(&trace.name)
                            .color(color)
                            .width(2.0);
                        (line, color)
                    }
                };

                plot_ui.line(line);
                if marker {
                    plot_ui.points(
                        Points::new(PlotPoints::from(points))
                            .name(&trace.name)
                            .color(color)
                            .radius(4.0),
                    );
                }
            }
        });
}
