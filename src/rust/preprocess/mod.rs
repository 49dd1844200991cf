//! Image side of the pipeline: EXIF orientation, resizing and tensor normalization.

use ndarray::Array4;

mod normalize;
mod orientation;
mod resize;

pub use normalize::{normalize, Normalizer};
pub use orientation::{apply_orientation, orient, read_orientation, Orientation};
pub use resize::resize_bilinear;

/// Model input: `[1, 3, size, size]` in NCHW layout, normalized per channel.
pub type InputTensor = Array4<f32>;
