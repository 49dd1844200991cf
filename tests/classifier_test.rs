mod common;

use affect::{Classifier, ClassifierError, LabelTable};
use common::{ChannelMeanModel, FixedModel, FlakyModel};
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::thread;

fn gray_png() -> Vec<u8> {
    common::png_bytes(&RgbImage::from_pixel(300, 300, Rgb([128, 128, 128])))
}

#[test]
fn test_gray_image_yields_a_table_label() -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let classifier = common::stub_classifier();

    let prediction = classifier.predict(&gray_png())?;
    assert!(classifier.labels().iter().any(|l| l == prediction.label));
    assert_eq!(prediction.scores.len(), 8);
    // Blue has the largest normalized value for mid gray.
    assert_eq!(prediction.index, 2);
    assert_eq!(prediction.label, "Disgust");
    Ok(())
}

#[test]
fn test_red_image_prediction() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = common::stub_classifier();
    let red = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([255, 0, 0])));
    let prediction = classifier.predict_image(&red)?;
    assert_eq!(prediction.index, 0);
    assert_eq!(prediction.label, "Anger");
    Ok(())
}

#[test]
fn test_deterministic_replay() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = common::stub_classifier();
    let stored = RgbImage::from_fn(123, 77, |x, y| Rgb([(x * 2) as u8, (y * 3) as u8, ((x + y) % 256) as u8]));
    let bytes = common::jpeg_with_orientation(&stored, 6);

    let first = classifier.predict(&bytes)?;
    let second = classifier.predict(&bytes)?;
    assert_eq!(first.index, second.index);
    assert_eq!(first.label, second.label);
    let first_bits: Vec<u32> = first.scores.iter().map(|s| s.to_bits()).collect();
    let second_bits: Vec<u32> = second.scores.iter().map(|s| s.to_bits()).collect();
    assert_eq!(first_bits, second_bits);
    Ok(())
}

#[test]
fn test_tie_break_lowest_index() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = Classifier::builder()
        .with_backend(Arc::new(FixedModel(vec![1.0, 1.0, 0.5])))?
        .with_labels(LabelTable::parse("0:A\n1:B\n2:C\n")?)
        .build()?;

    let prediction = classifier.predict(&gray_png())?;
    assert_eq!(prediction.index, 0);
    assert_eq!(prediction.label, "A");
    assert_eq!(prediction.scores, vec![1.0, 1.0, 0.5]);
    Ok(())
}

#[test]
fn test_label_cardinality_mismatch_fails_startup() {
    let result = Classifier::builder()
        .with_backend(Arc::new(ChannelMeanModel))
        .unwrap()
        .with_labels(LabelTable::parse("0:A\n1:B\n2:C\n").unwrap())
        .build();
    assert!(matches!(
        result,
        Err(ClassifierError::LabelMismatch { labels: 3, outputs: 8 })
    ));
}

#[test]
fn test_format_error_is_recoverable() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = common::stub_classifier();

    let result = classifier.predict(b"not an image at all");
    assert!(matches!(result, Err(ClassifierError::Format(_))));

    assert!(classifier.predict(&gray_png()).is_ok());
    Ok(())
}

#[test]
fn test_inference_error_is_reported_not_retried() -> Result<(), Box<dyn std::error::Error>> {
    let model = Arc::new(FlakyModel {
        failures: 1,
        calls: AtomicUsize::new(0),
    });
    let classifier = Classifier::builder()
        .with_backend(model.clone())?
        .with_labels(common::affectnet_labels())
        .build()?;

    let result = classifier.predict(&gray_png());
    assert!(matches!(result, Err(ClassifierError::Inference(_))));
    assert_eq!(model.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

    // The handle stays usable after a failed forward pass
    let prediction = classifier.predict(&gray_png())?;
    assert_eq!(prediction.label, "Disgust");
    Ok(())
}

#[test]
fn test_missing_image_file_is_io_error() {
    let classifier = common::stub_classifier();
    let result = classifier.predict_file("/nonexistent/face.jpg");
    assert!(matches!(result, Err(ClassifierError::Io(_))));
}

#[test]
fn test_predict_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::test_dir("predict-file");
    let path = dir.join("face.png");
    std::fs::write(&path, gray_png())?;

    let classifier = common::stub_classifier();
    assert_eq!(classifier.predict_file(&path)?, classifier.predict(&gray_png())?);
    Ok(())
}

#[test]
fn test_thread_safety() {
    let classifier = Arc::new(common::stub_classifier());
    let expected = classifier.predict(&gray_png()).unwrap();
    let mut handles = vec![];

    for _ in 0..3 {
        let classifier = Arc::clone(&classifier);
        let handle = thread::spawn(move || classifier.predict(&gray_png()).unwrap());
        handles.push(handle);
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_classifier_info() {
    let classifier = common::stub_classifier();
    let info = classifier.info();
    assert_eq!(info.num_classes, 8);
    assert_eq!(info.input_size, 260);
    assert_eq!(info.class_labels[4], "Happiness");
    assert!(info.model_path.is_none());
}

#[test]
fn test_prediction_serializes_to_json() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = common::stub_classifier();
    let prediction = classifier.predict(&gray_png())?;
    let json: serde_json::Value = serde_json::to_value(&prediction)?;
    assert_eq!(json["index"], 2);
    assert_eq!(json["label"], "Disgust");
    assert_eq!(json["scores"].as_array().map(|a| a.len()), Some(8));
    Ok(())
}
