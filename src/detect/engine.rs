//! Collaborator interfaces and the per-frame detection loop.

use std::time::Duration;

use super::{DetectError, Detection, OutputLayout, OutputTensor, non_max_suppression};
use crate::Size;
use crate::pixel::{ImgRef, ImgVec, RGB8};

/// Computation backend requested from an inference engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Default,
    Halide,
    InferenceEngine,
    OpenCv,
}

/// Device requested from an inference engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    Cpu,
    OpenCl,
    OpenClFp16,
    Myriad,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub backend: Backend,
    pub target: Target,
}

/// A loaded network that runs one forward pass per frame.
pub trait InferenceEngine {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Output convention of the loaded network.
    fn output_layout(&self) -> OutputLayout;

    fn set_execution(&mut self, options: ExecutionOptions) -> Result<(), Self::Error> {
        let _ = options;
        Ok(())
    }

    /// Pre-process `frame` into the network input, scaled to `input` when set.
    fn set_input(&mut self, frame: ImgRef<'_, RGB8>, input: Option<Size>) -> Result<(), Self::Error>;

    fn forward(&mut self) -> Result<OutputTensor, Self::Error>;

    /// Time spent in the last forward pass, if the engine measures it.
    fn perf_profile(&self) -> Option<Duration> {
        None
    }
}

/// Camera or video file.
pub trait FrameSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Next frame, or `None` at the end of the stream.
    fn next_frame(&mut self) -> Result<Option<ImgVec<RGB8>>, Self::Error>;
}

/// Detections for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameResult {
    pub detections: Vec<Detection>,
    pub inference_time: Option<Duration>,
}

/// Runs an engine over frames and post-processes its output.
///
/// The output layout is taken from the engine once, at construction.
pub struct Detector<E> {
    engine: E,
    layout: OutputLayout,
    input_size: Option<Size>,
    threshold: f32,
    nms_threshold: Option<f32>,
}

impl<E: InferenceEngine> Detector<E> {
    pub fn new(engine: E) -> Self {
        let layout = engine.output_layout();
        Self {
            engine,
            layout,
            input_size: None,
            threshold: 0.5,
            nms_threshold: None,
        }
    }

    /// Resize frames to this size before inference; defaults to frame size.
    pub fn with_input_size(mut self, size: Size) -> Self {
        self.input_size = Some(size);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Apply per-class NMS after decoding.
    pub fn with_nms(mut self, iou_threshold: f32) -> Self {
        self.nms_threshold = Some(iou_threshold);
        self
    }

    /// Adjust the confidence threshold between frames.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn layout(&self) -> OutputLayout {
        self.layout
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Detect objects in one frame.
    pub fn detect(&mut self, frame: ImgRef<'_, RGB8>) -> Result<FrameResult, DetectError> {
        let frame_size = Size::new(frame.width() as u32, frame.height() as u32);

        self.engine
            .set_input(frame, self.input_size)
            .map_err(|e| DetectError::Engine(Box::new(e)))?;
        let output = self
            .engine
            .forward()
            .map_err(|e| DetectError::Engine(Box::new(e)))?;

        let mut detections = self.layout.decode(&output, frame_size, self.threshold)?;
        if let Some(iou) = self.nms_threshold {
            detections = non_max_suppression(detections, iou);
        }

        let inference_time = self.engine.perf_profile();
        tracing::debug!(
            "{} detections ({:?} layout), inference {inference_time:?}",
            detections.len(),
            self.layout
        );
        Ok(FrameResult {
            detections,
            inference_time,
        })
    }

    /// Pull frames until the source ends, handing each result to `sink`.
    /// Returns the number of frames processed.
    pub fn run<S, F>(&mut self, source: &mut S, mut sink: F) -> Result<usize, DetectError>
    where
        S: FrameSource,
        F: FnMut(&mut Self, &ImgVec<RGB8>, FrameResult),
    {
        let mut frames = 0;
        while let Some(frame) = source
            .next_frame()
            .map_err(|e| DetectError::Capture(Box::new(e)))?
        {
            let result = self.detect(frame.as_ref())?;
            sink(self, &frame, result);
            frames += 1;
        }
        Ok(frames)
    }
}
