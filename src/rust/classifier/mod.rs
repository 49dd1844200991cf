use serde::Serialize;

mod error;
mod model;
mod classifier;
pub mod builder;
mod utils;

pub use error::ClassifierError;
pub use model::{InferenceModel, OnnxModel, ScoreVector};
pub use classifier::Classifier;
pub use builder::ClassifierBuilder;

/// Result of one classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Index of the winning class in model output order
    pub index: usize,
    /// Label of the winning class, as written in the labels file
    pub label: String,
    /// Raw logits, one per class. Apply a softmax for probabilities.
    pub scores: ScoreVector,
}

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInfo {
    /// Path to the ONNX model file, if loaded from disk
    pub model_path: Option<String>,
    /// Path to the labels file, if loaded from disk
    pub labels_path: Option<String>,
    /// Number of classes the model emits
    pub num_classes: usize,
    /// Labels of the classes, in model output order
    pub class_labels: Vec<String>,
    /// Side of the square model input
    pub input_size: u32,
}
