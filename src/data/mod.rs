/// Data layer: fetching, decoding and slicing the MNIST dataset.
///
/// Architecture:
/// ```text
///  mnist_images.png      mnist_labels_uint8
///        │                      │
///        ▼                      ▼
///   ┌──────────────────────────────┐
///   │  fetch   │  HTTP / folder, optional byte cache
///   └──────────────────────────────┘
///        │                      │
///        ▼                      ▼
///   ┌──────────┐          ┌──────────┐
///   │  sheet   │          │  loader  │  one-hot → class index
///   └──────────┘          └──────────┘
///   banded red-channel         │
///   extraction → f32           │
///        │                      │
///        ▼                      ▼
///   ┌───────────────────────────────┐
///   │ MnistDataset │ images, classes, labels
///   └───────────────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  slice   │  row range → new MnistDataset
///   └──────────┘
/// ```

pub mod error;
pub mod fetch;
pub mod loader;
pub mod model;
pub mod sheet;
pub mod slice;
