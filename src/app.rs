use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct NomiApp {
    pub state: AppState,
}

impl NomiApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for NomiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: aggregation chart ----
        if self.state.dataset.is_some() {
            egui::TopBottomPanel::bottom("chart_panel")
                .default_height(340.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::chart_controls(ui, &mut self.state);
                    ui.separator();
                    plot::group_chart(ui, &self.state);
                });
        }

        // ---- Central panel: filtered table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::records_table(ui, &self.state);
        });
    }
}
