//! Facial emotion classification from a single image, using an ONNX model.
//!
//! The pipeline is: encoded bytes → EXIF-aware decode to upright RGB → bilinear
//! resize and ImageNet normalization to a `[1, 3, 260, 260]` tensor → one
//! forward pass → argmax over the logits → label from the labels file.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use affect::{Classifier, BuiltinModel};
//!
//! let classifier = Classifier::builder()
//!     .with_model(BuiltinModel::EnetB2Affectnet)?
//!     .build()?;
//!
//! let prediction = classifier.predict_file("face.jpg")?;
//! println!("Predicted emotion: {}", prediction.label);
//! # Ok(())
//! # }
//! ```
//!
//! # Scores
//!
//! `Prediction::scores` holds raw logits. Their ordering decides the label;
//! their magnitudes are not probabilities.
//!
//! # Threading
//!
//! `predict` blocks on CPU work. The classifier is `Send + Sync`, so it can be
//! moved or shared (`Arc`) into a worker thread:
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use affect::{Classifier, BuiltinModel};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let classifier = Arc::new(Classifier::builder()
//!     .with_model(BuiltinModel::EnetB2Affectnet)?
//!     .build()?);
//!
//! let worker = {
//!     let classifier = Arc::clone(&classifier);
//!     thread::spawn(move || classifier.predict_file("face.jpg"))
//! };
//! let prediction = worker.join().unwrap()?;
//! println!("{}", prediction.label);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
mod runtime;
pub mod asset_manager;
pub mod labels;
pub mod models;
pub mod preprocess;

pub use classifier::{
    Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, InferenceModel, OnnxModel,
    Prediction, ScoreVector,
};
pub use runtime::{RuntimeConfig, create_session_builder};
pub use asset_manager::{AssetManager, AssetError, RemoteAsset};
pub use labels::LabelTable;
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo, IMAGENET_MEAN, IMAGENET_STD};
pub use preprocess::{normalize, orient, read_orientation, InputTensor, Normalizer, Orientation};

pub fn init_logger() {
    env_logger::init();
}
