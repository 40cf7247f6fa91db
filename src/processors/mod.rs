//! Geometry utilities and the region reconciler.

pub mod geometry;
pub mod reconcile;

pub use geometry::{Rect, RectF, iou};
pub use reconcile::{DEDUP_IOU_THRESHOLD, reconcile, reconcile_with_threshold};
