use serde::Serialize;

/// Preprocessing and output contract of a classifier network.
///
/// The input side length, the normalization constants and the class count are
/// training-time properties of the artifact; nothing in the model file declares
/// them, so they travel together here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCharacteristics {
    /// Side of the square RGB input, in pixels
    pub input_size: u32,
    /// Per-channel mean subtracted after scaling to [0, 1], in R, G, B order
    pub mean: [f32; 3],
    /// Per-channel standard deviation, in R, G, B order
    pub std: [f32; 3],
    /// Number of logits the network emits
    pub num_classes: usize,
}

/// File names of the artifacts a builtin model is made of.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub model_file: String,
    pub labels_file: String,
}

pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinModel {
    /// EfficientNet-B2 trained on the 8-class AffectNet taxonomy
    EnetB2Affectnet,
}

impl BuiltinModel {
    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            BuiltinModel::EnetB2Affectnet => ModelCharacteristics {
                input_size: 260,
                mean: IMAGENET_MEAN,
                std: IMAGENET_STD,
                num_classes: 8,
            },
        }
    }

    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            BuiltinModel::EnetB2Affectnet => ModelInfo {
                name: "enet_b2_8_best".to_string(),
                model_file: "enet_b2_8_best.onnx".to_string(),
                labels_file: "affectnet_labels.txt".to_string(),
            },
        }
    }
}

impl Default for ModelCharacteristics {
    fn default() -> Self {
        BuiltinModel::EnetB2Affectnet.characteristics()
    }
}
