use ndarray::s;

use super::error::{MnistError, Result};
use super::model::MnistDataset;

// ---------------------------------------------------------------------------
// Row-range slicing
// ---------------------------------------------------------------------------

/// Copy samples `[start, start + size)` of `dataset` into a new dataset.
///
/// * All three fields are cut over the same range, so row alignment holds.
/// * The source is only read; calling this repeatedly or from several
///   threads is fine.
/// * A range that runs past the end fails with
///   [`MnistError::SliceOutOfRange`] instead of being clamped.
pub fn slice(dataset: &MnistDataset, start: usize, size: usize) -> Result<MnistDataset> {
    let count = dataset.len();
    let end = start
        .checked_add(size)
        .filter(|&end| end <= count)
        .ok_or(MnistError::SliceOutOfRange { start, size, count })?;

    Ok(MnistDataset {
        images: dataset.images.slice(s![start..end, .., .., ..]).to_owned(),
        classes: dataset.classes.slice(s![start..end, ..]).to_owned(),
        labels: dataset.labels[start..end].to_vec(),
    })
}

/// Clamp a requested gallery window to the dataset so it can always be
/// passed to [`slice`].
pub fn clamp_range(count: usize, start: usize, size: usize) -> (usize, usize) {
    let start = start.min(count);
    (start, size.min(count - start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array4, Axis};

    /// Sample `i` has every pixel equal to `i / 100` and label `i % 10`.
    fn numbered_dataset(count: usize) -> MnistDataset {
        let images = Array4::from_shape_fn((count, 3, 3, 1), |(i, _, _, _)| i as f32 / 100.0);
        let labels: Vec<u8> = (0..count).map(|i| (i % 10) as u8).collect();
        let classes = Array2::from_shape_fn((count, 10), |(i, c)| {
            if c == labels[i] as usize { 1.0 } else { 0.0 }
        });
        MnistDataset::new(images, classes, labels).unwrap()
    }

    fn argmax(row: ndarray::ArrayView1<f32>) -> usize {
        row.iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0
    }

    #[test]
    fn slice_copies_the_requested_rows() {
        let dataset = numbered_dataset(40);
        for (start, size) in [(0, 1), (5, 10), (30, 10), (39, 1), (12, 0)] {
            let part = slice(&dataset, start, size).unwrap();
            assert_eq!(part.len(), size);
            assert_eq!(part.labels, dataset.labels[start..start + size]);
            assert_eq!(part.images.len_of(Axis(0)), size);
            assert_eq!(part.classes.nrows(), size);
            for i in 0..size {
                assert_eq!(part.images[[i, 1, 2, 0]], (start + i) as f32 / 100.0);
            }
        }
    }

    #[test]
    fn slice_keeps_rows_aligned() {
        let part = slice(&numbered_dataset(25), 7, 13).unwrap();
        for (i, row) in part.classes.axis_iter(Axis(0)).enumerate() {
            assert_eq!(argmax(row), part.labels[i] as usize);
        }
    }

    #[test]
    fn full_range_equals_source() {
        let dataset = numbered_dataset(12);
        assert_eq!(slice(&dataset, 0, 12).unwrap(), dataset);
    }

    #[test]
    fn slicing_is_idempotent_and_leaves_source_alone() {
        let dataset = numbered_dataset(20);
        let before = dataset.clone();

        let first = dataset.slice(4, 8).unwrap();
        let second = dataset.slice(4, 8).unwrap();
        let _overlapping = dataset.slice(6, 10).unwrap();

        assert_eq!(first, second);
        assert_eq!(dataset, before);
        assert_eq!(dataset.slice(0, 20).unwrap(), before);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let dataset = numbered_dataset(10);
        for (start, size) in [(5, 6), (11, 0), (usize::MAX, 2)] {
            let err = slice(&dataset, start, size).unwrap_err();
            assert!(matches!(err, MnistError::SliceOutOfRange { count: 10, .. }));
        }
        assert!(slice(&dataset, 10, 0).unwrap().is_empty());
    }

    #[test]
    fn clamp_range_always_fits() {
        assert_eq!(clamp_range(100, 1000, 50), (100, 0));
        assert_eq!(clamp_range(100, 80, 50), (80, 20));
        assert_eq!(clamp_range(100, 10, 50), (10, 50));
        assert_eq!(clamp_range(0, 0, 50), (0, 0));
    }
}
