use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::config::NUM_CLASSES;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Digit → Color32
// ---------------------------------------------------------------------------

/// One colour per digit class, used for captions and the histogram.
#[derive(Debug, Clone)]
pub struct DigitPalette {
    colors: Vec<Color32>,
    default_color: Color32,
}

impl Default for DigitPalette {
    fn default() -> Self {
        Self {
            colors: generate_palette(NUM_CLASSES),
            default_color: Color32::GRAY,
        }
    }
}

impl DigitPalette {
    /// Colour for `digit`; grey for anything outside 0–9.
    pub fn color_for(&self, digit: u8) -> Color32 {
        self.colors
            .get(digit as usize)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_get_distinct_colours() {
        let palette = DigitPalette::default();
        let colors: std::collections::HashSet<_> = (0..10u8).map(|d| palette.color_for(d)).collect();
        assert_eq!(colors.len(), 10);
        assert_eq!(palette.color_for(42), Color32::GRAY);
    }

    #[test]
    fn empty_palette() {
        assert!(generate_palette(0).is_empty());
    }
}
