//! Output tensor conventions of object-detection networks.

use super::{BoundingBox, DetectError, Detection};
use crate::Size;

/// Network output as a flat row-major `f32` buffer with its shape.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputTensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl OutputTensor {
    /// Fails when `data.len()` is not the product of `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, DetectError> {
        let expected = shape.iter().product::<usize>();
        if shape.is_empty() || expected != data.len() {
            return Err(DetectError::TensorSize {
                shape,
                expected,
                len: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Innermost dimension.
    fn row_len(&self) -> usize {
        self.shape.last().copied().unwrap_or(0)
    }

    fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.row_len().max(1))
    }
}

/// How a network encodes detections in its final output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputLayout {
    /// Two-stage detectors fed an `im_info` input. Rows of
    /// `[batch, class, confidence, left, top, right, bottom]` in pixels,
    /// class 0 being background.
    RegionProposal,
    /// Single-shot detectors. Same rows as `RegionProposal`, with corners
    /// normalized to `[0, 1]`.
    DetectionOutput,
    /// Grid-based single-stage detectors. Rows of
    /// `[center_x, center_y, width, height, objectness, score...]`,
    /// normalized; the class is the highest score.
    GridRegion,
}

impl OutputLayout {
    /// Pick the layout from what the loaded network reports: whether it has
    /// an `im_info` input and the type name of its last layer.
    pub fn resolve(has_im_info_input: bool, last_layer_type: &str) -> Option<Self> {
        if has_im_info_input {
            return Some(OutputLayout::RegionProposal);
        }
        match last_layer_type {
            "DetectionOutput" => Some(OutputLayout::DetectionOutput),
            "Region" => Some(OutputLayout::GridRegion),
            _ => None,
        }
    }

    fn min_row_len(self) -> usize {
        match self {
            OutputLayout::RegionProposal | OutputLayout::DetectionOutput => 7,
            OutputLayout::GridRegion => 6,
        }
    }

    /// Extract detections with confidence strictly above `threshold`.
    ///
    /// `frame` is the size of the image the network saw, used to scale
    /// normalized coordinates back to pixels.
    pub fn decode(
        self,
        tensor: &OutputTensor,
        frame: Size,
        threshold: f32,
    ) -> Result<Vec<Detection>, DetectError> {
        if tensor.row_len() < self.min_row_len() {
            return Err(DetectError::Shape {
                layout: self,
                shape: tensor.shape.clone(),
                min: self.min_row_len(),
            });
        }

        let fw = frame.width as f32;
        let fh = frame.height as f32;
        let mut out = Vec::new();

        for row in tensor.rows() {
            let detection = match self {
                OutputLayout::RegionProposal => tuple_row(row, threshold, 1.0, 1.0),
                OutputLayout::DetectionOutput => tuple_row(row, threshold, fw, fh),
                OutputLayout::GridRegion => grid_row(row, threshold, fw, fh),
            };
            out.extend(detection);
        }
        Ok(out)
    }
}

/// `[batch, class, confidence, left, top, right, bottom]`
fn tuple_row(row: &[f32], threshold: f32, sx: f32, sy: f32) -> Option<Detection> {
    let confidence = row[2];
    if confidence.is_nan() || confidence <= threshold {
        return None;
    }
    // class 0 is background
    let class = row[1] as i64 - 1;
    let class_id = u32::try_from(class).ok()?;
    Some(Detection {
        class_id,
        confidence,
        bbox: BoundingBox {
            left: row[3] * sx,
            top: row[4] * sy,
            right: row[5] * sx,
            bottom: row[6] * sy,
        },
    })
}

/// `[cx, cy, w, h, objectness, scores...]`
fn grid_row(row: &[f32], threshold: f32, fw: f32, fh: f32) -> Option<Detection> {
    let (class_id, confidence) = row[5..]
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((i, score)),
        })?;
    if confidence.is_nan() || confidence <= threshold {
        return None;
    }

    let width = row[2] * fw;
    let height = row[3] * fh;
    let left = row[0] * fw - width / 2.0;
    let top = row[1] * fh - height / 2.0;
    Some(Detection {
        class_id: class_id as u32,
        confidence,
        bbox: BoundingBox {
            left,
            top,
            right: left + width,
            bottom: top + height,
        },
    })
}
