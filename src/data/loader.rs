use std::time::Instant;

use ndarray::Array2;

use crate::config::{MnistConfig, MnistShape, NUM_CLASSES};

use super::error::{MnistError, Result};
use super::fetch::Fetch;
use super::model::MnistDataset;
use super::sheet::decode_sprite_sheet;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch the sprite sheet and label file named in `config` and decode them.
///
/// Both files are fetched at the same time; decoding starts once both have
/// arrived. Any failure aborts the whole load. This blocks for the full
/// download and decode, so UI callers run it on a worker thread.
pub fn load<F: Fetch>(config: &MnistConfig, fetcher: &F) -> Result<MnistDataset> {
    let started = Instant::now();
    log::info!(
        "Loading {} MNIST images from {}",
        config.shape.count,
        config.images_url
    );

    let (image_bytes, label_bytes) =
        fetch_both(fetcher, &config.images_url, &config.labels_url)?;
    log::info!(
        "Fetched {} image bytes and {} label bytes in {:.1?}",
        image_bytes.len(),
        label_bytes.len(),
        started.elapsed()
    );

    let dataset = decode(&image_bytes, &label_bytes, &config.shape, config.window_height)?;
    log::info!(
        "Decoded {} samples in {:.1?}",
        dataset.len(),
        started.elapsed()
    );
    Ok(dataset)
}

/// Run the two fetches on separate threads and wait for both.
fn fetch_both<F: Fetch>(fetcher: &F, images_url: &str, labels_url: &str) -> Result<(Vec<u8>, Vec<u8>)> {
    std::thread::scope(|scope| {
        let labels = scope.spawn(|| fetcher.fetch(labels_url));
        let images = fetcher.fetch(images_url);
        let labels = labels
            .join()
            .map_err(|_| MnistError::fetch(labels_url, "fetch thread panicked"))?;
        Ok((images?, labels?))
    })
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Build the dataset from already fetched bytes.
pub fn decode(
    image_bytes: &[u8],
    label_bytes: &[u8],
    shape: &MnistShape,
    window_height: u32,
) -> Result<MnistDataset> {
    let count = shape.count;

    let labels = decode_labels(label_bytes, count)?;
    let classes = Array2::from_shape_vec(
        (count, NUM_CLASSES),
        label_bytes.iter().map(|&b| f32::from(b)).collect(),
    )?;

    let pixels = decode_sprite_sheet(image_bytes, shape, window_height)?;
    let image_size = pixels.len().checked_div(count).unwrap_or(0);
    let images = Array2::from_shape_vec((count, image_size), pixels)?
        .into_shape_with_order((count, shape.image_width, shape.image_height, 1))?;

    MnistDataset::new(images, classes, labels)
}

/// Turn `count` one-hot groups of 10 bytes into class indices.
///
/// The label is the position of the first byte equal to 1. A group without
/// any 1 is rejected rather than mapped to a sentinel.
pub fn decode_labels(bytes: &[u8], count: usize) -> Result<Vec<u8>> {
    let expected = count.checked_mul(NUM_CLASSES).ok_or_else(|| {
        MnistError::Geometry(format!("{count} labels do not fit in memory"))
    })?;
    if bytes.len() != expected {
        return Err(MnistError::LabelLength {
            expected,
            actual: bytes.len(),
        });
    }

    bytes
        .chunks_exact(NUM_CLASSES)
        .enumerate()
        .map(|(row, group)| {
            group
                .iter()
                .position(|&b| b == 1)
                .map(|class| class as u8)
                .ok_or(MnistError::MalformedLabel { row })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetch::MemoryFetcher;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use ndarray::{Axis, array};
    use std::io::Cursor;
    use std::sync::{Barrier, mpsc};
    use std::time::Duration;

    const IMAGES: &str = "mem://mnist_images.png";
    const LABELS: &str = "mem://mnist_labels_uint8";

    fn png(img: RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn one_hot(labels: &[u8]) -> Vec<u8> {
        labels
            .iter()
            .flat_map(|&l| (0..10u8).map(move |c| u8::from(c == l)))
            .collect()
    }

    fn config(count: usize, side: usize, window_height: u32) -> MnistConfig {
        MnistConfig {
            images_url: IMAGES.to_string(),
            labels_url: LABELS.to_string(),
            shape: MnistShape {
                count,
                image_width: side,
                image_height: side,
            },
            window_height,
            cache_dir: None,
        }
    }

    /// Two 2x2 images, one image per sheet row. Green and blue carry junk
    /// that must be ignored.
    fn two_digit_sheet() -> RgbImage {
        let red = [[0u8, 255, 128, 64], [255, 0, 0, 255]];
        RgbImage::from_fn(4, 2, |x, y| Rgb([red[y as usize][x as usize], 17, 230]))
    }

    fn assert_close(actual: ndarray::ArrayView2<f32>, expected: ndarray::Array2<f32>) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-3, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn loads_known_two_image_sheet() {
        let fetcher = MemoryFetcher::new(&[
            (IMAGES, png(two_digit_sheet())),
            (LABELS, one_hot(&[1, 0])),
        ]);
        let dataset = load(&config(2, 2, 5000), &fetcher).unwrap();

        assert_eq!(dataset.labels, vec![1, 0]);
        assert_eq!(dataset.images.dim(), (2, 2, 2, 1));
        assert_eq!(dataset.classes.dim(), (2, 10));
        assert_close(dataset.image(0), array![[0.0, 1.0], [0.502, 0.251]]);
        assert_close(dataset.image(1), array![[1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[test]
    fn stacked_sheet_layout_decodes_identically() {
        let row_per_image = two_digit_sheet();
        let stacked = RgbImage::from_fn(2, 4, |x, y| *row_per_image.get_pixel((y % 2) * 2 + x, y / 2));
        let labels = one_hot(&[1, 0]);

        let a = decode(&png(row_per_image), &labels, &config(2, 2, 1).shape, 1).unwrap();
        let b = decode(&png(stacked), &labels, &config(2, 2, 1).shape, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rows_stay_aligned_and_normalised() {
        let count = 30;
        let digits: Vec<u8> = (0..count).map(|i| ((i * 7) % 10) as u8).collect();
        let sheet = RgbImage::from_fn(9, count as u32, |x, y| Rgb([(x * 13 + y * 5) as u8, 0, 0]));
        let fetcher = MemoryFetcher::new(&[(IMAGES, png(sheet)), (LABELS, one_hot(&digits))]);

        let dataset = load(&config(count, 3, 4), &fetcher).unwrap();
        assert_eq!(dataset.labels, digits);
        for (i, row) in dataset.classes.axis_iter(Axis(0)).enumerate() {
            assert_eq!(row[digits[i] as usize], 1.0);
            assert_eq!(row.sum(), 1.0);
        }
        assert!(dataset.images.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn window_height_does_not_change_dataset() {
        let sheet = RgbImage::from_fn(4, 6, |x, y| Rgb([(x * 40 + y) as u8, 0, 9]));
        let bytes = png(sheet);
        let labels = one_hot(&[0, 1, 2, 3, 4, 5]);
        let shape = config(6, 2, 1).shape;

        let whole = decode(&bytes, &labels, &shape, 6).unwrap();
        assert_eq!(decode(&bytes, &labels, &shape, 3).unwrap(), whole);
        assert_eq!(decode(&bytes, &labels, &shape, 4).unwrap(), whole);
    }

    #[test]
    fn missing_file_fails_the_load() {
        let only_labels = MemoryFetcher::new(&[(LABELS, one_hot(&[1, 0]))]);
        let err = load(&config(2, 2, 10), &only_labels).unwrap_err();
        assert!(matches!(err, MnistError::Fetch { ref location, .. } if location == IMAGES));

        let only_images = MemoryFetcher::new(&[(IMAGES, png(two_digit_sheet()))]);
        let err = load(&config(2, 2, 10), &only_images).unwrap_err();
        assert!(matches!(err, MnistError::Fetch { ref location, .. } if location == LABELS));
    }

    #[test]
    fn first_one_wins_and_empty_groups_fail() {
        let mut bytes = one_hot(&[4, 2]);
        bytes[17] = 1;
        assert_eq!(decode_labels(&bytes, 2).unwrap(), vec![4, 2]);

        bytes[12] = 0;
        bytes[17] = 0;
        let err = decode_labels(&bytes, 2).unwrap_err();
        assert!(matches!(err, MnistError::MalformedLabel { row: 1 }));
    }

    #[test]
    fn label_file_length_is_checked() {
        let err = decode_labels(&[0, 1, 0], 1).unwrap_err();
        assert!(matches!(
            err,
            MnistError::LabelLength {
                expected: 10,
                actual: 3
            }
        ));
    }

    #[test]
    fn huge_label_count_is_an_error_not_a_panic() {
        let err = decode_labels(&[0; 10], usize::MAX / 5).unwrap_err();
        assert!(matches!(err, MnistError::Geometry(_)));

        let shape = MnistShape {
            count: usize::MAX / 5,
            image_width: 28,
            image_height: 28,
        };
        let err = decode_sprite_sheet(&png(two_digit_sheet()), &shape, 10).unwrap_err();
        assert!(matches!(err, MnistError::Geometry(_)));
    }

    /// Each fetch blocks until the other one has started, so only
    /// overlapping fetches can finish.
    struct RendezvousFetcher(Barrier);

    impl Fetch for RendezvousFetcher {
        fn fetch(&self, location: &str) -> Result<Vec<u8>> {
            self.0.wait();
            Ok(location.as_bytes().to_vec())
        }
    }

    #[test]
    fn both_files_are_fetched_at_once() {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let fetcher = RendezvousFetcher(Barrier::new(2));
            let _ = tx.send(fetch_both(&fetcher, IMAGES, LABELS));
        });

        let (images, labels) = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("fetches did not overlap")
            .unwrap();
        assert_eq!(images, IMAGES.as_bytes());
        assert_eq!(labels, LABELS.as_bytes());
    }
}
