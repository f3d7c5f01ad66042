use std::f32::consts::TAU;

use eframe::egui::{pos2, vec2, Color32, Pos2, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};
use nomi_piacenza::data::model::AggregateRow;

use crate::color::ColorMap;
use crate::state::{AppState, ChartKind, BAR_LIMIT, PIE_LIMIT};

// ---------------------------------------------------------------------------
// Aggregation chart (bottom panel)
// ---------------------------------------------------------------------------

/// Render the bar or pie chart of the current aggregation.
pub fn group_chart(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        return;
    }
    if state.chart_rows.is_empty() {
        ui.label("No data to display for these filters.");
        return;
    }

    match state.chart_kind {
        ChartKind::Bar => bar_chart(ui, state),
        ChartKind::Pie => {
            let rows = &state.chart_rows[..state.chart_rows.len().min(PIE_LIMIT)];
            pie_chart(ui, rows, &state.color_map);
        }
    }
}

fn bar_chart(ui: &mut Ui, state: &AppState) {
    let rows = &state.chart_rows[..state.chart_rows.len().min(BAR_LIMIT)];
    let labels: Vec<String> = rows.iter().map(|r| r.key.to_string()).collect();
    let field = state.group_field;

    Plot::new("group_chart")
        .legend(Legend::default())
        .x_axis_label(field.label())
        .y_axis_label("Occorrenze")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            // One series per group so each gets its own colour and legend entry.
            for (i, row) in rows.iter().enumerate() {
                let color = state.color_map.color_for(&row.key);
                let bar = Bar::new(i as f64, row.total as f64)
                    .width(0.7)
                    .fill(color);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(row.key.to_string())
                        .color(color),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pie chart, painted directly
// ---------------------------------------------------------------------------

/// Largest arc painted as one convex polygon.
const MAX_WEDGE: f32 = TAU / 32.0;

/// Sum of the slice totals, saturating at `u64::MAX`.
fn slice_total(rows: &[AggregateRow]) -> u64 {
    rows.iter().fold(0u64, |acc, r| acc.saturating_add(r.total))
}

fn pie_chart(ui: &mut Ui, rows: &[AggregateRow], colors: &ColorMap) {
    let total = slice_total(rows);
    if total == 0 {
        ui.label("No data to display for these filters.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let side = ui.available_height().min(ui.available_width() * 0.6).max(80.0);
        let (rect, _) = ui.allocate_exact_size(vec2(side, side), Sense::hover());
        let center = rect.center();
        let radius = side * 0.45;
        let painter = ui.painter();

        let mut start = -TAU / 4.0;
        for row in rows {
            let sweep = TAU * row.total as f32 / total as f32;
            let fill = colors.color_for(&row.key);
            let steps = (sweep / MAX_WEDGE).ceil().max(1.0) as usize;
            for s in 0..steps {
                let a0 = start + sweep * s as f32 / steps as f32;
                let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                painter.add(Shape::convex_polygon(
                    vec![center, arc_point(center, radius, a0), arc_point(center, radius, a1)],
                    fill,
                    Stroke::NONE,
                ));
            }
            painter.line_segment(
                [center, arc_point(center, radius, start)],
                Stroke::new(1.0, Color32::WHITE),
            );
            start += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            for row in rows {
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                    ui.painter()
                        .rect_filled(swatch, 2.0, colors.color_for(&row.key));
                    let pct = 100.0 * row.total as f64 / total as f64;
                    ui.label(format!("{}  {} ({pct:.1}%)", row.key, row.total));
                });
            }
        });
    });
}

fn arc_point(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    pos2(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}
