mod app;
mod color;
mod state;
mod ui;

use app::NomiApp;
use eframe::egui;
use nomi_piacenza::config::Config;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::default();
    match Config::from_env() {
        Ok(config) => state.open(&config.dataset_path),
        Err(e) => log::warn!("Ignoring configuration: {e:#}"),
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Nomi Piacenza",
        options,
        Box::new(|_cc| Ok(Box::new(NomiApp::new(state)))),
    )
}
