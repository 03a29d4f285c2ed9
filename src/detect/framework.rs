//! Model framework inference from file names.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::DetectError;

/// Training framework a model file comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Framework {
    Caffe,
    TensorFlow,
    Torch,
    Darknet,
}

impl Framework {
    /// Guess from the model file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "caffemodel" => Some(Framework::Caffe),
            "pb" => Some(Framework::TensorFlow),
            "t7" | "net" => Some(Framework::Torch),
            "weights" => Some(Framework::Darknet),
            _ => None,
        }
    }

    /// An explicit hint wins; otherwise the model path's extension decides.
    pub fn from_model_path(model: &Path, hint: Option<Framework>) -> Option<Self> {
        hint.or_else(|| {
            model
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(Self::from_extension)
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Framework::Caffe => "caffe",
            Framework::TensorFlow => "tensorflow",
            Framework::Torch => "torch",
            Framework::Darknet => "darknet",
        }
    }

    /// Whether a separate configuration file accompanies the weights.
    pub fn needs_config(self) -> bool {
        matches!(self, Framework::Caffe | Framework::Darknet)
    }
}

impl FromStr for Framework {
    type Err = DetectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "caffe" => Ok(Framework::Caffe),
            "tensorflow" => Ok(Framework::TensorFlow),
            "torch" => Ok(Framework::Torch),
            "darknet" => Ok(Framework::Darknet),
            _ => Err(DetectError::UnknownFrameworkName(s.to_string())),
        }
    }
}

impl core::fmt::Display for Framework {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Model files plus the framework that will load them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSpec {
    pub model: PathBuf,
    pub config: Option<PathBuf>,
    pub framework: Framework,
}

impl ModelSpec {
    pub fn new(
        model: impl Into<PathBuf>,
        config: Option<PathBuf>,
        hint: Option<Framework>,
    ) -> Result<Self, DetectError> {
        let model = model.into();
        let framework = Framework::from_model_path(&model, hint)
            .ok_or_else(|| DetectError::UnknownFramework(model.clone()))?;
        Ok(Self {
            model,
            config,
            framework,
        })
    }
}
