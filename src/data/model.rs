use ndarray::{Array2, Array4, ArrayView2, Axis, s};

use crate::config::NUM_CLASSES;

use super::error::{MnistError, Result};

// ---------------------------------------------------------------------------
// MnistDataset – the complete decoded dataset
// ---------------------------------------------------------------------------

/// Decoded images and labels, aligned by row.
///
/// Row `i` of `images`, `classes` and `labels` always describes the same
/// sample; nothing in this crate reorders one field without the others.
#[derive(Debug, Clone, PartialEq)]
pub struct MnistDataset {
    /// `[count, image_width, image_height, 1]`, grayscale in `[0, 1]`.
    pub images: Array4<f32>,
    /// `[count, 10]` raw one-hot rows.
    pub classes: Array2<f32>,
    /// Digit per row, the index of the 1 in `classes`.
    pub labels: Vec<u8>,
}

impl MnistDataset {
    /// Assemble a dataset, checking that all three fields have one row per
    /// sample.
    pub fn new(images: Array4<f32>, classes: Array2<f32>, labels: Vec<u8>) -> Result<Self> {
        let count = labels.len();
        if images.len_of(Axis(0)) != count
            || classes.nrows() != count
            || classes.ncols() != NUM_CLASSES
        {
            return Err(MnistError::Geometry(format!(
                "misaligned dataset: {} images, {:?} classes, {count} labels",
                images.len_of(Axis(0)),
                classes.dim(),
            )));
        }
        Ok(Self {
            images,
            classes,
            labels,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The single-channel pixels of sample `index`, `[width, height]`.
    pub fn image(&self, index: usize) -> ArrayView2<'_, f32> {
        self.images.slice(s![index, .., .., 0])
    }

    /// Sample counts per digit class.
    pub fn class_counts(&self) -> [usize; NUM_CLASSES] {
        let mut counts = [0; NUM_CLASSES];
        for &label in &self.labels {
            if let Some(slot) = counts.get_mut(label as usize) {
                *slot += 1;
            }
        }
        counts
    }

    /// Copy `[start, start + size)` into a new dataset. See
    /// [`slice`](super::slice::slice).
    pub fn slice(&self, start: usize, size: usize) -> Result<MnistDataset> {
        super::slice::slice(self, start, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_misaligned_fields() {
        let images = Array4::<f32>::zeros((3, 2, 2, 1));
        let classes = Array2::<f32>::zeros((2, 10));
        let err = MnistDataset::new(images, classes, vec![0, 1, 2]).unwrap_err();
        assert!(matches!(err, MnistError::Geometry(_)));
        assert!(err.to_string().starts_with("inconsistent dataset geometry"));
    }

    #[test]
    fn counts_classes() {
        let images = Array4::<f32>::zeros((4, 1, 1, 1));
        let classes = Array2::<f32>::zeros((4, 10));
        let dataset = MnistDataset::new(images, classes, vec![3, 3, 9, 0]).unwrap();
        let counts = dataset.class_counts();
        assert_eq!(counts[3], 2);
        assert_eq!(counts[9], 1);
        assert_eq!(counts[0], 1);
        assert_eq!(counts.iter().sum::<usize>(), 4);
    }
}
