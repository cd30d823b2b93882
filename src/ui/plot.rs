use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, ScrollArea, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Plot, PlotPoint, Text};

use playstore_dash::dispatch::{ChartKind, ChartSpec, Orientation};

use crate::color::ColorScale;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 380.0;
const PIE_RADIUS: f32 = 170.0;

// ---------------------------------------------------------------------------
// Chart area (central panel)
// ---------------------------------------------------------------------------

/// Render the charts of the current selection in the central panel.
pub fn chart_view(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a catalog to view charts  (File → Open…)");
        });
        return;
    }

    if state.charts.is_empty() {
        let msg = state
            .status_message
            .as_deref()
            .unwrap_or("Nothing to show for this selection.");
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(msg).color(Color32::RED));
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (idx, chart) in state.charts.iter().enumerate() {
                ui.heading(chart.title.as_str());
                match chart.kind {
                    ChartKind::Arc => arc_chart(ui, chart),
                    ChartKind::Bar | ChartKind::LayeredBar => bar_chart(ui, chart, idx),
                }
                ui.add_space(16.0);
            }
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Position of entry `i` on the category axis. Horizontal charts put the
/// first entry on top.
fn slot(i: usize, n: usize, orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Horizontal => (n - 1 - i) as f64,
        Orientation::Vertical => i as f64,
    }
}

fn bar_chart(ui: &mut Ui, chart: &ChartSpec, idx: usize) {
    let n = chart.entries.len();
    if n == 0 {
        ui.label("No data.");
        return;
    }
    let horizontal = chart.orientation == Orientation::Horizontal;
    let scale = ColorScale::for_chart(chart);

    let bars: Vec<Bar> = chart
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Bar::new(slot(i, n, chart.orientation), e.value)
                .name(&e.tooltip)
                .fill(scale.color_for(i, e.value))
                .width(0.7)
        })
        .collect();
    let mut series = BarChart::new(bars)
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| bar.name.clone()));
    if horizontal {
        series = series.horizontal();
    }

    let mut labels = vec![String::new(); n];
    for (i, e) in chart.entries.iter().enumerate() {
        labels[slot(i, n, chart.orientation) as usize] = e.label.clone();
    }
    let category_axis = move |mark: GridMark, _range: &RangeInclusive<f64>| -> String {
        let v = mark.value;
        if v < 0.0 || (v - v.round()).abs() > 1e-6 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    };

    let mut plot = Plot::new(("chart", idx))
        .height(CHART_HEIGHT)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);
    plot = if horizontal {
        plot.x_axis_label(chart.value_axis.as_str())
            .y_axis_label(chart.category_axis.as_str())
            .y_axis_formatter(category_axis)
    } else {
        plot.x_axis_label(chart.category_axis.as_str())
            .y_axis_label(chart.value_axis.as_str())
            .x_axis_formatter(category_axis)
    };

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(series);

        if chart.kind != ChartKind::LayeredBar {
            return;
        }
        for (i, e) in chart.entries.iter().enumerate() {
            let Some(text) = &e.annotation else {
                continue;
            };
            let pos = slot(i, n, chart.orientation);
            let (point, anchor) = if horizontal {
                (PlotPoint::new(e.value, pos), Align2::LEFT_CENTER)
            } else {
                (PlotPoint::new(pos, e.value), Align2::CENTER_BOTTOM)
            };
            plot_ui.text(Text::new(point, RichText::new(format!(" {text} "))).anchor(anchor));
        }
    });
}

// ---------------------------------------------------------------------------
// Arc (pie) chart
// ---------------------------------------------------------------------------

fn arc_chart(ui: &mut Ui, chart: &ChartSpec) {
    let total: f64 = chart.entries.iter().map(|e| e.value).sum();
    if total <= 0.0 {
        ui.label("No data.");
        return;
    }
    let scale = ColorScale::for_chart(chart);

    let size = egui::vec2(ui.available_width(), 2.0 * PIE_RADIUS + 80.0);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let center = response.rect.center();
    let text_color = ui.visuals().text_color();

    // Slices start at twelve o'clock and run clockwise.
    let mut slices: Vec<(f32, f32)> = Vec::with_capacity(chart.entries.len());
    let mut start = -FRAC_PI_2;
    for (i, e) in chart.entries.iter().enumerate() {
        let sweep = (e.value / total) as f32 * TAU;
        for shape in wedge(center, start, sweep, scale.color_for(i, e.value)) {
            painter.add(shape);
        }
        let mid = start + sweep / 2.0;
        let label_pos = center + egui::vec2(mid.cos(), mid.sin()) * (PIE_RADIUS + 20.0);
        painter.text(
            label_pos,
            Align2::CENTER_CENTER,
            &e.label,
            FontId::proportional(16.0),
            text_color,
        );
        slices.push((start, start + sweep));
        start += sweep;
    }

    if let Some(pos) = response.hover_pos() {
        let d = pos - center;
        if d.length() <= PIE_RADIUS {
            let angle = (d.y.atan2(d.x) + FRAC_PI_2).rem_euclid(TAU) - FRAC_PI_2;
            if let Some(i) = slices.iter().position(|&(a, b)| angle >= a && angle < b) {
                response.on_hover_text(chart.entries[i].tooltip.as_str());
            }
        }
    }
}

/// A pie slice as convex fans of at most a quarter turn each.
fn wedge(center: Pos2, start: f32, sweep: f32, fill: Color32) -> Vec<Shape> {
    const SEGMENTS: usize = 16;
    if sweep <= 0.0 {
        return Vec::new();
    }
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / pieces as f32;

    (0..pieces)
        .map(|p| {
            let a0 = start + step * p as f32;
            let mut points = Vec::with_capacity(SEGMENTS + 2);
            points.push(center);
            for s in 0..=SEGMENTS {
                let a = a0 + step * s as f32 / SEGMENTS as f32;
                points.push(center + egui::vec2(a.cos(), a.sin()) * PIE_RADIUS);
            }
            Shape::convex_polygon(points, fill, Stroke::NONE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_slots_run_top_down() {
        assert_eq!(slot(0, 3, Orientation::Horizontal), 2.0);
        assert_eq!(slot(2, 3, Orientation::Horizontal), 0.0);
        assert_eq!(slot(2, 3, Orientation::Vertical), 2.0);
    }

    #[test]
    fn wedges_split_into_quarter_turns() {
        let center = egui::pos2(0.0, 0.0);
        assert_eq!(wedge(center, 0.0, TAU, Color32::RED).len(), 4);
        assert_eq!(wedge(center, 0.0, 0.3, Color32::RED).len(), 1);
        assert!(wedge(center, 0.0, 0.0, Color32::RED).is_empty());
    }
}
