use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};
use nomi_piacenza::data::model::Field;

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Render the filtered records as a scrollable table.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a names dataset to begin  (File → Open…)");
        });
        return;
    };

    ui.heading("Filtered data");
    if state.visible_indices.is_empty() {
        ui.label("No data to display for these filters.");
        return;
    }

    let records = dataset.records();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(90.0), 3)
        .column(Column::remainder())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for field in Field::ALL {
                header.col(|ui: &mut Ui| {
                    ui.strong(field.label());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, state.visible_indices.len(), |mut row| {
                let r = &records[state.visible_indices[row.index()]];
                row.col(|ui: &mut Ui| {
                    ui.label(r.name.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(r.citizenship_group.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(r.sex.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(r.birth_year.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(r.occurrences.to_string());
                });
            });
        });
}
