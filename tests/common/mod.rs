#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use affect::{Classifier, ClassifierError, InferenceModel, InputTensor, LabelTable, ScoreVector};
use env_logger::{Builder, Env};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use ndarray::Axis;

// Initialize test logger
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

/// Fresh, empty scratch directory unique to this test process.
pub fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("affect-test-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn bundled_labels_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets").join("affectnet_labels.txt")
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

pub fn affectnet_labels() -> LabelTable {
    LabelTable::from_file(bundled_labels_path()).unwrap()
}

pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn encoded_bytes(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

pub fn jpeg_bytes(image: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 95)
        .encode_image(image)
        .unwrap();
    bytes
}

/// Encodes `image` as JPEG carrying an EXIF APP1 segment with the given orientation tag.
pub fn jpeg_with_orientation(image: &RgbImage, orientation: u16) -> Vec<u8> {
    // Big-endian TIFF header with a single IFD entry: 0x0112 Orientation, SHORT, count 1.
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2a");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut payload = b"Exif\x00\x00".to_vec();
    payload.extend_from_slice(&tiff);
    jpeg_with_app1(image, &payload)
}

/// Encodes `image` as JPEG with `payload` spliced in as an APP1 segment after SOI.
pub fn jpeg_with_app1(image: &RgbImage, payload: &[u8]) -> Vec<u8> {
    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(payload);

    let jpeg = jpeg_bytes(image);
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Deterministic stand-in for the network: scores are the per-channel means of
/// the input, followed by their negations and two zeros (8 classes).
pub struct ChannelMeanModel;

impl InferenceModel for ChannelMeanModel {
    fn output_dim(&self) -> usize {
        8
    }

    fn forward(&self, input: InputTensor) -> Result<ScoreVector, ClassifierError> {
        let mut means = [0.0f32; 3];
        for (c, mean) in means.iter_mut().enumerate() {
            *mean = input
                .index_axis(Axis(1), c)
                .mean()
                .ok_or_else(|| ClassifierError::Inference("empty channel".into()))?;
        }
        Ok(vec![
            means[0], means[1], means[2], -means[0], -means[1], -means[2], 0.0, 0.0,
        ])
    }
}

/// Returns the same scores for every input.
pub struct FixedModel(pub Vec<f32>);

impl InferenceModel for FixedModel {
    fn output_dim(&self) -> usize {
        self.0.len()
    }

    fn forward(&self, _input: InputTensor) -> Result<ScoreVector, ClassifierError> {
        Ok(self.0.clone())
    }
}

/// Fails the first `failures` forward passes, then behaves like `ChannelMeanModel`.
pub struct FlakyModel {
    pub failures: usize,
    pub calls: AtomicUsize,
}

impl InferenceModel for FlakyModel {
    fn output_dim(&self) -> usize {
        8
    }

    fn forward(&self, input: InputTensor) -> Result<ScoreVector, ClassifierError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(ClassifierError::Inference("simulated runtime failure".into()));
        }
        ChannelMeanModel.forward(input)
    }
}

pub fn stub_classifier() -> Classifier {
    Classifier::builder()
        .with_backend(Arc::new(ChannelMeanModel))
        .unwrap()
        .with_labels(affectnet_labels())
        .build()
        .expect("Failed to create classifier")
}
