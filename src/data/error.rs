use thiserror::Error;

/// Everything that can abort a dataset load or slice.
///
/// No variant is recovered from inside the data layer: the first failure
/// ends the load and no partial dataset is returned.
#[derive(Error, Debug)]
pub enum MnistError {
    #[error("failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("failed to decode sprite sheet: {0}")]
    Decode(String),

    #[error("inconsistent dataset geometry: {0}")]
    Geometry(String),

    #[error("label row {row} has no byte equal to 1")]
    MalformedLabel { row: usize },

    #[error("label file has {actual} bytes, expected {expected}")]
    LabelLength { expected: usize, actual: usize },

    #[error("slice {start}..{start}+{size} is out of range for {count} samples")]
    SliceOutOfRange {
        start: usize,
        size: usize,
        count: usize,
    },

    #[error("tensor shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MnistError {
    pub fn fetch(location: &str, reason: impl std::fmt::Display) -> Self {
        MnistError::Fetch {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MnistError>;
