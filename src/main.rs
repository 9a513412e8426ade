mod app;
mod charts;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod view;

use app::CallVolumeApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let (config, config_error) = match DashboardConfig::from_env() {
        Ok(config) => (config, None),
        Err(e) => {
            log::error!("Invalid configuration, using defaults: {e:#}");
            (DashboardConfig::default(), Some(format!("Configuração inválida: {e:#}")))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Operação CSF – WhatsApp",
        options,
        Box::new(move |_cc| {
            let mut state = AppState::new(config);
            // The dataset is fetched once, before the first frame.
            state.reload();
            if let Some(msg) = config_error {
                state.status_message = Some(match state.status_message.take() {
                    Some(load_msg) => format!("{msg} | {load_msg}"),
                    None => msg,
                });
            }
            Ok(Box::new(CallVolumeApp { state }))
        }),
    )
}
