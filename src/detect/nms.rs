//! Greedy per-class non-maximum suppression.

use super::{BoundingBox, Detection};

/// Intersection over union of two boxes; 0 when the union is empty.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let left = a.left.max(b.left);
    let top = a.top.max(b.top);
    let right = a.right.min(b.right);
    let bottom = a.bottom.min(b.bottom);

    let intersection = (right - left).max(0.0) * (bottom - top).max(0.0);
    let union = a.area() + b.area() - intersection;
    if union > 0.0 { intersection / union } else { 0.0 }
}

/// Keep the most confident box of each overlapping same-class cluster.
///
/// A box is dropped when its IoU with an already kept box of the same class
/// is at least `iou_threshold`. Output is sorted by descending confidence.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for det in detections {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == det.class_id && iou(&k.bbox, &det.bbox) >= iou_threshold);
        if !suppressed {
            kept.push(det);
        }
    }
    kept
}
