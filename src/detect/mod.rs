//! Detection post-processing for object-detection network outputs.
//!
//! The inference engine and the frame source are external collaborators
//! described by [`InferenceEngine`] and [`FrameSource`]; this module turns
//! their output tensors into [`Detection`]s. The output convention is an
//! explicit [`OutputLayout`] resolved once per model, never re-inspected per
//! frame.

mod engine;
mod framework;
mod layout;
mod nms;

use std::path::{Path, PathBuf};

pub use engine::{Backend, Detector, ExecutionOptions, FrameResult, FrameSource, InferenceEngine, Target};
pub use framework::{Framework, ModelSpec};
pub use layout::{OutputLayout, OutputTensor};
pub use nms::{iou, non_max_suppression};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from detection post-processing and its collaborators.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DetectError {
    #[error("inference engine failed: {0}")]
    Engine(#[source] BoxError),
    #[error("frame source failed: {0}")]
    Capture(#[source] BoxError),
    /// Tensor data length disagrees with its shape.
    #[error("tensor shape {shape:?} needs {expected} values, got {len}")]
    TensorSize {
        shape: Vec<usize>,
        expected: usize,
        len: usize,
    },
    /// Tensor rows are too short for the layout.
    #[error("{layout:?} rows need at least {min} values, tensor shape is {shape:?}")]
    Shape {
        layout: OutputLayout,
        shape: Vec<usize>,
        min: usize,
    },
    #[error("cannot determine the framework of model {}", .0.display())]
    UnknownFramework(PathBuf),
    #[error("unknown framework name {0:?}")]
    UnknownFrameworkName(String),
    #[error("can't read class names from {}: {source}", .path.display())]
    ClassNames {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Axis-aligned box in frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// One detected object.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Index into the class-name list (background already removed).
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    /// Overlay label: `"name: 0.87"`, or just the confidence when the class
    /// has no name.
    pub fn label(&self, class_names: &[String]) -> String {
        match class_names.get(self.class_id as usize) {
            Some(name) => format!("{name}: {:.2}", self.confidence),
            None => format!("{:.2}", self.confidence),
        }
    }
}

/// Read class names, one per line. Trailing empty lines are dropped.
pub fn load_class_names(path: impl AsRef<Path>) -> Result<Vec<String>, DetectError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DetectError::ClassNames {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .trim_end_matches(['\n', '\r'])
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect())
}
