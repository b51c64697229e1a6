use eframe::egui::{self, ColorImage, RichText, ScrollArea, TextureHandle, TextureOptions, Ui};
use eframe::egui::load::SizedTexture;
use ndarray::ArrayView2;

use crate::state::AppState;

/// On-screen edge length of one thumbnail, in points.
const THUMBNAIL_SIZE: f32 = 56.0;

// ---------------------------------------------------------------------------
// Thumbnail textures
// ---------------------------------------------------------------------------

/// GPU textures for the current gallery slice, rebuilt only when the slice
/// changes.
#[derive(Default)]
pub struct Thumbnails {
    synced_version: Option<u64>,
    entries: Vec<(u8, TextureHandle)>,
}

impl Thumbnails {
    fn sync(&mut self, ctx: &egui::Context, state: &AppState) {
        if self.synced_version == Some(state.gallery_version) {
            return;
        }

        self.entries.clear();
        if let Some(gallery) = &state.gallery {
            for (i, &label) in gallery.labels.iter().enumerate() {
                let texture = ctx.load_texture(
                    format!("digit-{}", state.start + i),
                    to_color_image(gallery.image(i)),
                    TextureOptions::NEAREST,
                );
                self.entries.push((label, texture));
            }
        }
        self.synced_version = Some(state.gallery_version);
    }
}

/// Grayscale `[rows, cols]` intensities in `[0, 1]` → egui image.
pub fn to_color_image(pixels: ArrayView2<'_, f32>) -> ColorImage {
    let (rows, cols) = pixels.dim();
    let gray: Vec<u8> = pixels
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    ColorImage::from_gray([cols, rows], &gray)
}

/// What to show instead of thumbnails, if there is nothing to draw.
fn empty_message(state: &AppState) -> Option<&'static str> {
    match &state.gallery {
        None => Some("No dataset loaded  (File → Reload or Open folder…)"),
        Some(gallery) if gallery.is_empty() => Some("No samples in this range"),
        Some(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Gallery (central panel)
// ---------------------------------------------------------------------------

/// Render the wrapping grid of labelled thumbnails.
pub fn gallery(ui: &mut Ui, state: &AppState, thumbnails: &mut Thumbnails) {
    if state.gallery.is_none() && state.loading {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.spinner();
        });
        return;
    }
    if let Some(message) = empty_message(state) {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(message);
        });
        return;
    }

    thumbnails.sync(ui.ctx(), state);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for (label, texture) in &thumbnails.entries {
                    ui.vertical(|ui: &mut Ui| {
                        ui.image(SizedTexture::new(
                            texture.id(),
                            egui::vec2(THUMBNAIL_SIZE, THUMBNAIL_SIZE),
                        ));
                        ui.label(
                            RichText::new(label.to_string())
                                .strong()
                                .color(state.palette.color_for(*label)),
                        );
                    });
                }
            });
        });
}
