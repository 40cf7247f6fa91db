//! Region reconciliation.
//!
//! Takes the raw hits from every detector and produces the canonical region
//! list: clipped to the image, degenerate boxes dropped, same-kind
//! duplicates suppressed by IoU, stable per-kind identifiers assigned, and
//! ordering made deterministic for identical input.

use crate::domain::{RawRegion, Region};
use crate::processors::geometry::{Rect, iou};
use tracing::debug;

/// Same-kind overlap at or above this IoU is treated as a duplicate.
pub const DEDUP_IOU_THRESHOLD: f32 = 0.5;

/// Reconciles raw detector hits into canonical regions using
/// [`DEDUP_IOU_THRESHOLD`].
///
/// # Arguments
///
/// * `raw` - Hits from all detectors, in any order.
/// * `img_width` / `img_height` - Bounds to clip against.
pub fn reconcile(raw: &[RawRegion], img_width: u32, img_height: u32) -> Vec<Region> {
    reconcile_with_threshold(raw, img_width, img_height, DEDUP_IOU_THRESHOLD)
}

/// Reconciles raw detector hits with an explicit duplicate threshold.
///
/// Candidates are ordered by confidence descending (ties broken by kind and
/// position so equal inputs always reconcile identically), then kept
/// greedily: a candidate is a duplicate if any already-kept region of the
/// same kind overlaps it at `threshold` IoU or more. Different kinds never
/// suppress each other. Kept regions get ids `{kind}_{n}` with `n` counted
/// per kind in kept order.
pub fn reconcile_with_threshold(
    raw: &[RawRegion],
    img_width: u32,
    img_height: u32,
    threshold: f32,
) -> Vec<Region> {
    let mut candidates: Vec<(Rect, &RawRegion)> = raw
        .iter()
        .map(|r| (r.rect.clip(img_width, img_height), r))
        .filter(|(rect, _)| !rect.is_empty())
        .collect();

    candidates.sort_by(|(ra, a), (rb, b)| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
            .then_with(|| (ra.x, ra.y).cmp(&(rb.x, rb.y)))
    });

    let mut kept: Vec<(Rect, &RawRegion)> = Vec::with_capacity(candidates.len());
    for (rect, raw_region) in candidates {
        let duplicate = kept
            .iter()
            .any(|(kept_rect, kept_raw)| {
                kept_raw.kind == raw_region.kind && iou(kept_rect, &rect) >= threshold
            });
        if !duplicate {
            kept.push((rect, raw_region));
        }
    }

    let mut face_seq = 0usize;
    let mut plate_seq = 0usize;
    let regions: Vec<Region> = kept
        .into_iter()
        .map(|(rect, raw_region)| {
            let seq = match raw_region.kind {
                crate::domain::RegionKind::Face => {
                    let n = face_seq;
                    face_seq += 1;
                    n
                }
                crate::domain::RegionKind::LicensePlate => {
                    let n = plate_seq;
                    plate_seq += 1;
                    n
                }
            };
            Region::new(
                format!("{}_{}", raw_region.kind.as_str(), seq),
                rect,
                raw_region.confidence,
                raw_region.kind,
            )
        })
        .collect();

    debug!(
        raw = raw.len(),
        kept = regions.len(),
        "reconciled detector output"
    );
    regions
}
