use ort::Error as OrtError;

use crate::asset_manager::AssetError;

/// Represents the different types of errors that can occur in the emotion classifier.
///
/// Initialization failures (`Io`, `Parse`, `Load`, `LabelMismatch`, `Build`) leave no
/// usable classifier behind. Per-prediction failures (`Format`, `Inference`) do not
/// invalidate the classifier; it can serve the next request.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// An asset or labels file could not be read or materialized
    #[error("IO error: {0}")]
    Io(String),
    /// A labels file line is malformed
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    /// The image could not be decoded or has an unusable pixel layout
    #[error("Format error: {0}")]
    Format(String),
    /// The model artifact is missing, truncated or incompatible with the runtime
    #[error("Load error: {0}")]
    Load(String),
    /// The forward pass failed
    #[error("Inference error: {0}")]
    Inference(String),
    /// The label table and the model disagree on the number of classes
    #[error("Label table has {labels} entries but the model emits {outputs} scores")]
    LabelMismatch { labels: usize, outputs: usize },
    /// The builder was used incorrectly
    #[error("Build error: {0}")]
    Build(String),
}

impl From<OrtError> for ClassifierError {
    fn from(err: OrtError) -> Self {
        ClassifierError::Load(err.to_string())
    }
}

impl From<AssetError> for ClassifierError {
    fn from(err: AssetError) -> Self {
        ClassifierError::Io(err.to_string())
    }
}

impl From<image::ImageError> for ClassifierError {
    fn from(err: image::ImageError) -> Self {
        ClassifierError::Format(err.to_string())
    }
}
