use std::borrow::Cow;

use image::{DynamicImage, GenericImageView, RgbImage};
use log::debug;
use ndarray::Array4;

use super::resize::resize_bilinear;
use super::InputTensor;
use crate::classifier::ClassifierError;
use crate::models::ModelCharacteristics;

/// Turns an upright RGB image into the model's input tensor.
///
/// The image is stretched to `input_size` x `input_size` (aspect ratio is not
/// kept), scaled to [0, 1], normalized per channel with the model's mean and
/// standard deviation and laid out as `[1, 3, size, size]` (NCHW).
///
/// Normalization goes through a per-channel lookup table, so equal input bytes
/// always map to bit-identical floats.
#[derive(Debug, Clone)]
pub struct Normalizer {
    input_size: u32,
    lut: [[f32; 256]; 3],
}

impl Normalizer {
    pub fn new(characteristics: &ModelCharacteristics) -> Self {
        let mut lut = [[0.0f32; 256]; 3];
        for (c, table) in lut.iter_mut().enumerate() {
            let mean = characteristics.mean[c];
            let std = characteristics.std[c];
            for (v, slot) in table.iter_mut().enumerate() {
                *slot = (v as f32 / 255.0 - mean) / std;
            }
        }
        Self {
            input_size: characteristics.input_size,
            lut,
        }
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Normalizes `image` into an `InputTensor`.
    ///
    /// # Errors
    /// - `Format` if the image has zero width or height
    /// - `Format` if the image has fewer than 3 colour channels
    pub fn normalize(&self, image: &DynamicImage) -> Result<InputTensor, ClassifierError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ClassifierError::Format(format!(
                "Image is empty ({}x{})",
                width, height
            )));
        }
        let channels = image.color().channel_count();
        if channels < 3 {
            return Err(ClassifierError::Format(format!(
                "Image has {} channel(s), expected RGB",
                channels
            )));
        }

        let rgb: Cow<'_, RgbImage> = match image.as_rgb8() {
            Some(buffer) => Cow::Borrowed(buffer),
            None => Cow::Owned(image.to_rgb8()),
        };

        let size = self.input_size;
        let resized = resize_bilinear(&rgb, size, size);
        debug!("Resized {}x{} image to {}x{}", width, height, size, size);

        let side = size as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let (row, col) = (y as usize, x as usize);
            for c in 0..3 {
                tensor[[0, c, row, col]] = self.lut[c][pixel.0[c] as usize];
            }
        }
        Ok(tensor)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&ModelCharacteristics::default())
    }
}

/// Normalizes `image` with the default model contract.
pub fn normalize(image: &DynamicImage) -> Result<InputTensor, ClassifierError> {
    Normalizer::default().normalize(image)
}
