use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{error, info};
use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;

use super::error::ClassifierError;
use crate::models::ModelCharacteristics;
use crate::preprocess::InputTensor;
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Raw per-class scores (logits) in model output order.
///
/// Only the ordering of the entries is meaningful; they are not probabilities.
pub type ScoreVector = Vec<f32>;

/// A loaded classifier network.
///
/// `forward` is synchronous and CPU bound. Implementations must be
/// deterministic: the same tensor yields bit-identical scores.
pub trait InferenceModel: Send + Sync {
    /// Number of scores `forward` returns
    fn output_dim(&self) -> usize;

    /// Square input side the model was loaded for, when it is fixed at load time
    fn input_size(&self) -> Option<u32> {
        None
    }

    /// Runs one forward pass over a `[1, 3, H, W]` tensor.
    fn forward(&self, input: InputTensor) -> Result<ScoreVector, ClassifierError>;
}

/// ONNX Runtime backed model handle.
///
/// The session sits behind a mutex so at most one forward pass runs at a time
/// on a handle, whatever the runtime's own thread-safety guarantees.
pub struct OnnxModel {
    path: PathBuf,
    input_name: String,
    input_size: u32,
    output_dim: usize,
    session: Mutex<Session>,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("path", &self.path)
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("output_dim", &self.output_dim)
            .finish_non_exhaustive()
    }
}

impl OnnxModel {
    /// Loads an ONNX artifact and discovers its output dimension.
    ///
    /// # Errors
    /// - `Load` if the file is missing, truncated or rejected by the runtime
    /// - `Load` if the graph has no inputs or no outputs
    /// - `Load` if the probe forward pass fails
    pub fn load<P: AsRef<Path>>(
        path: P,
        config: &RuntimeConfig,
        characteristics: &ModelCharacteristics,
    ) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ClassifierError::Load(format!("Model file not found: {:?}", path)));
        }

        let session = create_session_builder(config)?
            .commit_from_file(path)
            .map_err(|e| {
                error!("Failed to load model {:?}: {}", path, e);
                ClassifierError::Load(format!("Failed to load model {:?}: {}", path, e))
            })?;

        Self::validate_model(&session)?;
        let input_name = session.inputs[0].name.clone();
        info!("Model structure validated successfully (input '{}')", input_name);

        let mut model = Self {
            path: path.to_path_buf(),
            input_name,
            input_size: characteristics.input_size,
            output_dim: 0,
            session: Mutex::new(session),
        };

        // Infer the number of classes by running a probe input
        let side = characteristics.input_size as usize;
        let probe = Array4::<f32>::zeros((1, 3, side, side));
        let scores = model
            .run(probe)
            .map_err(|e| ClassifierError::Load(format!("Probe inference failed: {}", e)))?;
        if scores.is_empty() {
            return Err(ClassifierError::Load("Model produced an empty output".into()));
        }
        model.output_dim = scores.len();
        info!("Inferred output dimension from model: {}", model.output_dim);

        Ok(model)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.is_empty() {
            return Err(ClassifierError::Load("Model must have at least 1 input".to_string()));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::Load("Model must have at least 1 output for scores".to_string()));
        }
        Ok(())
    }

    fn run(&self, input: InputTensor) -> Result<ScoreVector, ClassifierError> {
        let tensor = Tensor::from_array(input)
            .map_err(|e| ClassifierError::Inference(format!("Failed to create input tensor: {}", e)))?;
        let mut input_tensors = HashMap::new();
        input_tensors.insert(self.input_name.as_str(), tensor);

        let session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("Model session lock poisoned".into()))?;
        let outputs = session
            .run(input_tensors)
            .map_err(|e| ClassifierError::Inference(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Failed to extract output tensor: {}", e)))?;

        Ok(output_tensor.iter().copied().collect())
    }
}

impl InferenceModel for OnnxModel {
    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn input_size(&self) -> Option<u32> {
        Some(self.input_size)
    }

    fn forward(&self, input: InputTensor) -> Result<ScoreVector, ClassifierError> {
        let scores = self.run(input)?;
        if scores.len() != self.output_dim {
            return Err(ClassifierError::Inference(format!(
                "Model returned {} scores, expected {}",
                scores.len(),
                self.output_dim
            )));
        }
        if let Some(pos) = scores.iter().position(|s| !s.is_finite()) {
            return Err(ClassifierError::Inference(format!(
                "Model returned a non-finite score at index {}",
                pos
            )));
        }
        Ok(scores)
    }
}
