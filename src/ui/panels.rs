use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use nomi_piacenza::data::model::Field;
use nomi_piacenza::data::query::SortOrder;

use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Name contains");
            changed |= ui.text_edit_singleline(&mut state.name_contains).changed();
            ui.add_space(4.0);

            ui.strong("Citizenship");
            changed |= choice_combo(
                ui,
                "citizenship",
                &mut state.citizenship_group,
                dataset.citizenship_groups.iter(),
            );
            ui.add_space(4.0);

            ui.strong("Sex");
            changed |= choice_combo(ui, "sex", &mut state.sex, dataset.sexes.iter());
            ui.add_space(4.0);

            if let Some((lo, hi)) = dataset.year_range {
                ui.strong("Birth year");
                changed |= ui
                    .add(egui::Slider::new(&mut state.year_min, lo..=hi).text("from"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut state.year_max, lo..=hi).text("to"))
                    .changed();
                if state.year_min > state.year_max {
                    ui.label(RichText::new("Empty range").color(Color32::DARK_RED));
                }
            }
            ui.separator();

            ui.strong("Sort by");
            egui::ComboBox::from_id_salt("sort_by")
                .selected_text(state.sort_field.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for field in Field::ALL {
                        changed |= ui
                            .selectable_value(&mut state.sort_field, field, field.label())
                            .changed();
                    }
                });
            ui.horizontal(|ui: &mut Ui| {
                changed |= ui
                    .radio_value(&mut state.sort_order, SortOrder::Descending, "desc")
                    .changed();
                changed |= ui
                    .radio_value(&mut state.sort_order, SortOrder::Ascending, "asc")
                    .changed();
            });
        });

    if changed {
        state.refilter();
    }
}

/// Combo box over `options` plus an empty "All" entry. Returns whether the
/// selection changed.
fn choice_combo<'a>(
    ui: &mut Ui,
    id: &str,
    selected: &mut String,
    options: impl Iterator<Item = &'a String>,
) -> bool {
    let mut changed = false;
    let shown = if selected.is_empty() { "All" } else { selected.as_str() }.to_string();
    egui::ComboBox::from_id_salt(id)
        .selected_text(shown)
        .show_ui(ui, |ui: &mut Ui| {
            changed |= ui
                .selectable_value(selected, String::new(), "All")
                .changed();
            for opt in options {
                changed |= ui
                    .selectable_value(selected, opt.clone(), opt.as_str())
                    .changed();
            }
        });
    changed
}

// ---------------------------------------------------------------------------
// Chart controls
// ---------------------------------------------------------------------------

/// Chart type toggle and aggregation field selector.
pub fn chart_controls(ui: &mut Ui, state: &mut AppState) {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Chart");
        ui.radio_value(&mut state.chart_kind, ChartKind::Bar, "Histogram");
        ui.radio_value(&mut state.chart_kind, ChartKind::Pie, "Pie");
        ui.separator();

        ui.strong("Aggregate by");
        egui::ComboBox::from_id_salt("aggregate_by")
            .selected_text(state.group_field.label())
            .show_ui(ui, |ui: &mut Ui| {
                for field in Field::GROUPABLE {
                    changed |= ui
                        .selectable_value(&mut state.group_field, field, field.label())
                        .changed();
                }
            });
    });

    if changed {
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }
        if let Some(src) = &state.source {
            ui.separator();
            ui.label(RichText::new(src.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open names dataset")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
