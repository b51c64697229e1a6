use image::{DynamicImage, GenericImage, GenericImageView, ImageFormat, RgbaImage};

use crate::config::MnistShape;

use super::error::{MnistError, Result};

// ---------------------------------------------------------------------------
// Offscreen surface – bounded scratch canvas for one band
// ---------------------------------------------------------------------------

/// A fixed-size RGBA canvas that sub-regions of the sprite sheet are drawn
/// onto and read back from. Its height bounds how much of the sheet is
/// rasterised at once.
pub struct OffscreenSurface {
    canvas: RgbaImage,
}

impl OffscreenSurface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MnistError::Decode(format!(
                "cannot create a {width}x{height} offscreen surface"
            )));
        }
        Ok(Self {
            canvas: RgbaImage::new(width, height),
        })
    }

    /// Draw `[src_x, src_y, src_w, src_h]` of `source` onto the surface with
    /// its top-left corner at `(dst_x, dst_y)`. No scaling is applied.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_region(
        &mut self,
        source: &DynamicImage,
        src_x: u32,
        src_y: u32,
        src_w: u32,
        src_h: u32,
        dst_x: u32,
        dst_y: u32,
    ) -> Result<()> {
        check_region("source image", source.dimensions(), src_x, src_y, src_w, src_h)?;
        check_region("surface", self.canvas.dimensions(), dst_x, dst_y, src_w, src_h)?;

        let region = source.view(src_x, src_y, src_w, src_h).to_image();
        self.canvas
            .copy_from(&region, dst_x, dst_y)
            .map_err(|e| MnistError::Decode(e.to_string()))
    }

    /// Raw RGBA bytes of `[x, y, w, h]`, row-major, 4 bytes per pixel.
    pub fn read_pixels(&self, x: u32, y: u32, w: u32, h: u32) -> Result<Vec<u8>> {
        check_region("surface", self.canvas.dimensions(), x, y, w, h)?;
        Ok(self.canvas.view(x, y, w, h).to_image().into_raw())
    }
}

fn check_region(what: &str, (width, height): (u32, u32), x: u32, y: u32, w: u32, h: u32) -> Result<()> {
    let fits = u64::from(x) + u64::from(w) <= u64::from(width)
        && u64::from(y) + u64::from(h) <= u64::from(height);
    if fits {
        Ok(())
    } else {
        Err(MnistError::Decode(format!(
            "region {w}x{h}+{x}+{y} exceeds {what} bounds {width}x{height}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Windowed red-channel extraction
// ---------------------------------------------------------------------------

/// Copy the red channel of `source` into a flat, row-major `f32` buffer with
/// values in `[0, 1]`, rasterising at most `window_height` rows at a time.
///
/// The output does not depend on `window_height`: each band lands at offset
/// `width * y` of the destination, so bands tile the buffer with no gaps or
/// overlaps. The final band is clipped to the image.
pub fn extract_red_channel(source: &DynamicImage, window_height: u32) -> Result<Vec<f32>> {
    if window_height == 0 {
        return Err(MnistError::Decode("window height must be at least 1".into()));
    }

    let (width, height) = source.dimensions();
    let mut data = vec![0.0f32; width as usize * height as usize];
    if data.is_empty() {
        return Ok(data);
    }

    let mut surface = OffscreenSurface::new(width, window_height.min(height))?;

    for y in (0..height).step_by(window_height as usize) {
        let rows = window_height.min(height - y);
        surface.draw_region(source, 0, y, width, rows, 0, 0)?;

        // Band buffer lives for this iteration only.
        let pixels = surface.read_pixels(0, 0, width, rows)?;

        let offset = width as usize * y as usize;
        let band = &mut data[offset..offset + width as usize * rows as usize];
        for (dst, rgba) in band.iter_mut().zip(pixels.chunks_exact(4)) {
            *dst = f32::from(rgba[0]) / 255.0;
        }

        log::debug!("Decoded band y={y} rows={rows}");
    }

    Ok(data)
}

/// Decode PNG bytes and extract the normalised grayscale buffer for `shape`.
///
/// The sheet may be laid out as one image per pixel row (`784 x count`) or
/// as whole images stacked vertically (`28 x 28*count`); both flatten to the
/// same row-major buffer, so only the total pixel count is checked.
pub fn decode_sprite_sheet(bytes: &[u8], shape: &MnistShape, window_height: u32) -> Result<Vec<f32>> {
    let source = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| MnistError::Decode(e.to_string()))?;

    let expected = shape.total_pixels().ok_or_else(|| {
        MnistError::Geometry(format!("{shape:?} has more pixels than fit in memory"))
    })?;

    let (width, height) = source.dimensions();
    let pixels = width as usize * height as usize;
    if pixels != expected {
        return Err(MnistError::Decode(format!(
            "sprite sheet is {width}x{height} ({pixels} pixels), expected {} images of {}x{}",
            shape.count, shape.image_width, shape.image_height
        )));
    }

    log::debug!("Sprite sheet {width}x{height}, window height {window_height}");
    extract_red_channel(&source, window_height)
}
