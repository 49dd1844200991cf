use std::fs;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use log::debug;

use super::error::ClassifierError;
use super::model::InferenceModel;
use super::utils::argmax;
use super::{ClassifierInfo, Prediction};
use crate::labels::LabelTable;
use crate::models::ModelCharacteristics;
use crate::preprocess::{orient, Normalizer};

/// An emotion classifier: orientation, normalization, one forward pass and an
/// argmax over the label table.
///
/// A `Classifier` is immutable once built. The label table and the model handle
/// are shared behind `Arc`, so the value can be cloned or wrapped in an `Arc`
/// and handed to a worker thread. Predictions are blocking and CPU bound; run
/// them off any latency-sensitive thread. Concurrent calls on one classifier
/// are serialized inside the model handle.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use affect::{Classifier, BuiltinModel};
///
/// let classifier = Classifier::builder()
///     .with_model(BuiltinModel::EnetB2Affectnet)?
///     .build()?;
///
/// let bytes = std::fs::read("face.jpg")?;
/// let prediction = classifier.predict(&bytes)?;
/// println!("Predicted emotion: {}", prediction.label);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Classifier {
    pub(crate) model_path: Option<String>,
    pub(crate) labels_path: Option<String>,
    pub(crate) model: Arc<dyn InferenceModel>,
    pub(crate) labels: Arc<LabelTable>,
    pub(crate) normalizer: Normalizer,
    pub(crate) model_characteristics: ModelCharacteristics,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("model_path", &self.model_path)
            .field("labels_path", &self.labels_path)
            .field("labels", &self.labels)
            .field("model_characteristics", &self.model_characteristics)
            .finish_non_exhaustive()
    }
}

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            num_classes: self.labels.len(),
            class_labels: self.labels.as_slice().to_vec(),
            input_size: self.normalizer.input_size(),
        }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Classifies an encoded image.
    ///
    /// The bytes are decoded, rotated upright according to their EXIF
    /// orientation, normalized and run through the model. Every successful call
    /// yields a label; there is no abstention.
    ///
    /// # Errors
    /// - `Format` if the bytes cannot be decoded
    /// - `Inference` if the forward pass fails
    pub fn predict(&self, bytes: &[u8]) -> Result<Prediction, ClassifierError> {
        let image = orient(bytes)?;
        self.predict_image(&image)
    }

    /// Reads an image file and classifies it.
    pub fn predict_file<P: AsRef<Path>>(&self, path: P) -> Result<Prediction, ClassifierError> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| ClassifierError::Io(format!("Failed to read image {:?}: {}", path, e)))?;
        self.predict(&bytes)
    }

    /// Classifies an image whose pixels are already upright.
    pub fn predict_image(&self, image: &DynamicImage) -> Result<Prediction, ClassifierError> {
        let input = self.normalizer.normalize(image)?;
        let scores = self.model.forward(input)?;

        let index = argmax(&scores)
            .ok_or_else(|| ClassifierError::Inference("Model returned no usable scores".into()))?;
        let label = self
            .labels
            .get(index)
            .ok_or_else(|| {
                ClassifierError::Inference(format!(
                    "Score index {} is outside the label table ({} labels)",
                    index,
                    self.labels.len()
                ))
            })?
            .to_string();
        debug!("Predicted class {} ({}) from {} scores", index, label, scores.len());

        Ok(Prediction { index, label, scores })
    }
}
