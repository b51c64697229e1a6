mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::MnistGalleryApp;
use config::MnistConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = MnistConfig::from_env();
    log::debug!("Using {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "MNIST Gallery",
        options,
        Box::new(move |_cc| Ok(Box::new(MnistGalleryApp::new(config)))),
    )
}
