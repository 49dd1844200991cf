use std::io::Cursor;

use image::{DynamicImage, ImageDecoder, ImageReader};
use log::{debug, warn};

use crate::classifier::ClassifierError;

/// Clockwise rotation that makes a decoded image upright.
///
/// Only the pure rotations of the EXIF orientation tag are honoured. Mirrored
/// orientations (2, 4, 5, 7) and unknown values resolve to `Upright`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Upright,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Orientation {
    pub fn from_exif(tag: u16) -> Self {
        match tag {
            6 => Orientation::Rotate90,
            3 => Orientation::Rotate180,
            8 => Orientation::Rotate270,
            2 | 4 | 5 | 7 => {
                warn!("Mirrored EXIF orientation {} is not supported, treating image as upright", tag);
                Orientation::Upright
            }
            _ => Orientation::Upright,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Orientation::Upright => 0,
            Orientation::Rotate90 => 90,
            Orientation::Rotate180 => 180,
            Orientation::Rotate270 => 270,
        }
    }
}

/// Raw EXIF orientation tag; an unreadable one counts as upright (1).
fn exif_tag(decoder: &mut impl ImageDecoder) -> u16 {
    match decoder.orientation() {
        Ok(orientation) => u16::from(orientation.to_exif()),
        Err(e) => {
            warn!("Unreadable EXIF orientation, assuming upright: {}", e);
            1
        }
    }
}

/// Decodes `bytes` without applying any orientation, returning the pixels as
/// stored together with the EXIF orientation tag.
fn decode(bytes: &[u8]) -> Result<(DynamicImage, Orientation), ClassifierError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ClassifierError::Format(format!("Failed to sniff image format: {}", e)))?;
    let mut decoder = reader.into_decoder()?;

    let tag = exif_tag(&mut decoder);
    let image = DynamicImage::from_decoder(decoder)?;
    Ok((image, Orientation::from_exif(tag)))
}

/// Reads only the orientation of an encoded image.
pub fn read_orientation(bytes: &[u8]) -> Result<Orientation, ClassifierError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ClassifierError::Format(format!("Failed to sniff image format: {}", e)))?;
    let mut decoder = reader.into_decoder()?;
    Ok(Orientation::from_exif(exif_tag(&mut decoder)))
}

/// Rotates the pixels of `image` clockwise by `orientation`.
pub fn apply_orientation(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Upright => image,
        Orientation::Rotate90 => image.rotate90(),
        Orientation::Rotate180 => image.rotate180(),
        Orientation::Rotate270 => image.rotate270(),
    }
}

/// Decodes `bytes` into an upright 8-bit RGB image.
///
/// The decoder does not apply EXIF orientation itself; the tag is read once
/// and the rotation applied here exactly once. The returned image carries no
/// metadata.
///
/// # Errors
/// - `Format` if the bytes are not a decodable image
pub fn orient(bytes: &[u8]) -> Result<DynamicImage, ClassifierError> {
    let (image, orientation) = decode(bytes)?;
    debug!(
        "Decoded {}x{} {:?} image, rotating {} degrees",
        image.width(),
        image.height(),
        image.color(),
        orientation.degrees()
    );

    let rgb = match image {
        DynamicImage::ImageRgb8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };
    Ok(apply_orientation(rgb, orientation))
}
