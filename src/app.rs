use std::time::Duration;

use eframe::egui;

use crate::config::MnistConfig;
use crate::state::{AppState, LoadSource};
use crate::ui::gallery::{self, Thumbnails};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MnistGalleryApp {
    pub state: AppState,
    thumbnails: Thumbnails,
}

impl MnistGalleryApp {
    /// Create the app and start fetching the configured dataset.
    pub fn new(config: MnistConfig) -> Self {
        let mut state = AppState::new(config);
        state.start_load(LoadSource::Remote);
        Self {
            state,
            thumbnails: Thumbnails::default(),
        }
    }
}

impl eframe::App for MnistGalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.poll_load() {
            ctx.request_repaint();
        }
        if self.state.loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: range + label histogram ----
        egui::SidePanel::left("gallery_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: thumbnails ----
        egui::CentralPanel::default().show(ctx, |ui| {
            gallery::gallery(ui, &self.state, &mut self.thumbnails);
        });
    }
}
