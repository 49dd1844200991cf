use std::sync::Arc;
use std::path::Path;
use log::{info, warn, error};

use super::error::ClassifierError;
use super::classifier::Classifier;
use super::model::{InferenceModel, OnnxModel};
use crate::labels::LabelTable;
use crate::preprocess::Normalizer;
use crate::{AssetManager, BuiltinModel, ModelCharacteristics, runtime::RuntimeConfig};

/// A builder for constructing a Classifier with a fluent interface.
///
/// A classifier needs a model and a label table. Both come from
/// [`with_model`](Self::with_model) for the builtin artifact, from
/// [`with_custom_model`](Self::with_custom_model) for files on disk, or from
/// [`with_backend`](Self::with_backend) plus [`with_labels`](Self::with_labels)
/// for any other [`InferenceModel`].
pub struct ClassifierBuilder {
    model_path: Option<String>,
    labels_path: Option<String>,
    model: Option<Arc<dyn InferenceModel>>,
    labels: Option<LabelTable>,
    model_characteristics: ModelCharacteristics,
    runtime_config: RuntimeConfig,
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClassifierBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierBuilder")
            .field("model_path", &self.model_path)
            .field("labels_path", &self.labels_path)
            .field("has_model", &self.model.is_some())
            .field("labels", &self.labels)
            .field("model_characteristics", &self.model_characteristics)
            .field("runtime_config", &self.runtime_config)
            .finish()
    }
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use affect::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            model_path: None,
            labels_path: None,
            model: None,
            labels: None,
            model_characteristics: ModelCharacteristics::default(),
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration for ONNX model execution.
    ///
    /// Must be called before the model is loaded to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Overrides the preprocessing contract (input size, mean, std) used for a
    /// custom model. Builtin models set their own.
    ///
    /// Call it before loading a model file: the model is probed at load time
    /// with the input size in effect then.
    pub fn with_characteristics(mut self, characteristics: ModelCharacteristics) -> Self {
        self.model_characteristics = characteristics;
        self
    }

    /// Loads a builtin model, materializing its files in the default asset cache.
    ///
    /// # Errors
    /// - `Build` if a model is already set
    /// - `Load` if the model artifact cannot be materialized or loaded
    /// - `Io` / `Parse` if the labels file cannot be materialized or parsed
    pub fn with_model(self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        let manager = AssetManager::new_default()
            .map_err(|e| ClassifierError::Io(format!("Failed to create asset manager: {}", e)))?;
        self.with_model_from(&manager, model)
    }

    /// Loads a builtin model, materializing its files through `manager`.
    pub fn with_model_from(
        mut self,
        manager: &AssetManager,
        model: BuiltinModel,
    ) -> Result<Self, ClassifierError> {
        self.ensure_unset()?;
        let info = model.get_model_info();

        let model_path = manager.asset_path(&info.model_file).map_err(|e| {
            error!("Failed to materialize model asset '{}': {}", info.model_file, e);
            ClassifierError::Load(format!("Model asset '{}' unavailable: {}", info.model_file, e))
        })?;
        let labels_path = manager.asset_path(&info.labels_file)?;

        self.model_characteristics = model.characteristics();
        self.load_files(&model_path, &labels_path)?;
        info!("Builtin model '{}' ready", info.name);
        Ok(self)
    }

    /// Loads an ONNX model and labels file from explicit paths.
    ///
    /// # Errors
    /// - `Build` if either path is empty or a model is already set
    /// - `Load` if the model file is missing or cannot be loaded
    /// - `Io` / `Parse` if the labels file cannot be read or parsed
    ///
    /// # Example
    /// ```no_run
    /// use affect::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .with_custom_model("path/to/model.onnx", "path/to/labels.txt");
    /// ```
    pub fn with_custom_model(
        mut self,
        model_path: &str,
        labels_path: &str,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || labels_path.is_empty() {
            return Err(ClassifierError::Build("Model and labels paths cannot be empty".to_string()));
        }
        self.ensure_unset()?;
        self.load_files(Path::new(model_path), Path::new(labels_path))?;
        Ok(self)
    }

    /// Uses an already loaded model instead of an ONNX file.
    pub fn with_backend(mut self, model: Arc<dyn InferenceModel>) -> Result<Self, ClassifierError> {
        self.ensure_unset()?;
        self.model = Some(model);
        Ok(self)
    }

    /// Sets the label table, replacing any loaded from a labels file.
    pub fn with_labels(mut self, labels: LabelTable) -> Self {
        self.labels = Some(labels);
        self.labels_path = None;
        self
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Errors
    /// - `Build` if no model or no label table has been set
    /// - `LabelMismatch` if the label count differs from the model's output dimension
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        let model = self.model
            .ok_or_else(|| ClassifierError::Build("A model must be set".to_string()))?;
        let labels = self.labels
            .ok_or_else(|| ClassifierError::Build("A label table must be set".to_string()))?;

        let input_size = self.model_characteristics.input_size;
        if let Some(loaded) = model.input_size() {
            if loaded != input_size {
                error!("Model was loaded for {}x{} input, characteristics declare {}x{}", loaded, loaded, input_size, input_size);
                return Err(ClassifierError::Build(format!(
                    "Model was loaded for input size {}, but characteristics set {}; call with_characteristics before loading the model",
                    loaded, input_size
                )));
            }
        }

        let outputs = model.output_dim();
        if labels.len() != outputs {
            error!("Label table has {} entries, model emits {} scores", labels.len(), outputs);
            return Err(ClassifierError::LabelMismatch { labels: labels.len(), outputs });
        }
        if outputs != self.model_characteristics.num_classes {
            warn!(
                "Model emits {} scores, its characteristics declare {} classes",
                outputs, self.model_characteristics.num_classes
            );
        }

        Ok(Classifier {
            model_path: self.model_path,
            labels_path: self.labels_path,
            model,
            labels: Arc::new(labels),
            normalizer: Normalizer::new(&self.model_characteristics),
            model_characteristics: self.model_characteristics,
        })
    }

    fn ensure_unset(&self) -> Result<(), ClassifierError> {
        if self.model.is_some() {
            return Err(ClassifierError::Build("Model already set".to_string()));
        }
        Ok(())
    }

    fn load_files(&mut self, model_path: &Path, labels_path: &Path) -> Result<(), ClassifierError> {
        let model = OnnxModel::load(model_path, &self.runtime_config, &self.model_characteristics)?;
        info!("Model loaded from {:?}", model_path);

        let labels = LabelTable::from_file(labels_path)?;
        info!("Loaded {} labels from {:?}", labels.len(), labels_path);

        self.model_path = Some(model_path.to_string_lossy().to_string());
        self.labels_path = Some(labels_path.to_string_lossy().to_string());
        self.model = Some(Arc::new(model));
        self.labels = Some(labels);
        Ok(())
    }
}
