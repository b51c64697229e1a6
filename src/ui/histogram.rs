use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Plot};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Label distribution of the gallery slice
// ---------------------------------------------------------------------------

/// Bar chart with one bar per digit, coloured like the captions.
pub fn label_histogram(ui: &mut Ui, state: &AppState) {
    let Some(gallery) = &state.gallery else {
        return;
    };

    let bars: Vec<Bar> = gallery
        .class_counts()
        .iter()
        .enumerate()
        .map(|(digit, &count)| {
            Bar::new(digit as f64, count as f64)
                .width(0.8)
                .name(digit)
                .fill(state.palette.color_for(digit as u8))
        })
        .collect();

    Plot::new("label_histogram")
        .height(200.0)
        .x_axis_label("Digit")
        .y_axis_label("Samples")
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
