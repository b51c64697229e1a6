use eframe::egui::{self, Color32, DragValue, RichText, Ui};

use crate::state::{AppState, LoadSource};
use crate::ui::histogram;

// ---------------------------------------------------------------------------
// Left side panel – gallery range and label distribution
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Gallery");
    ui.separator();

    let count = match &state.dataset {
        Some(ds) => ds.len(),
        None => {
            ui.label(if state.loading {
                "Loading dataset…"
            } else {
                "No dataset loaded."
            });
            return;
        }
    };

    let mut start = state.start;
    let mut size = state.size;

    egui::Grid::new("gallery_range")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("First sample");
            ui.add(DragValue::new(&mut start).range(0..=count).speed(10.0));
            ui.end_row();

            ui.label("Samples shown");
            ui.add(DragValue::new(&mut size).range(0..=count.min(1_000)));
            ui.end_row();
        });

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("◀ Prev").clicked() {
            start = start.saturating_sub(size);
        }
        if ui.small_button("Next ▶").clicked() {
            start = start.saturating_add(size);
        }
    });

    if (start, size) != (state.start, state.size) {
        state.set_range(start, size);
    }

    ui.add_space(8.0);
    ui.strong("Labels in view");
    histogram::label_histogram(ui, state);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.start_load(LoadSource::Remote);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loading {
            ui.spinner();
            ui.label("Loading…");
        } else if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} samples loaded, showing {}..{}",
                ds.len(),
                state.start,
                state.start + state.size
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

/// Pick a folder holding `mnist_images.png` and `mnist_labels_uint8` and
/// load it in the background.
pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open MNIST folder (mnist_images.png + mnist_labels_uint8)")
        .pick_folder();

    if let Some(path) = folder {
        log::info!("Loading MNIST from folder {}", path.display());
        state.start_load(LoadSource::Folder(path));
    }
}
