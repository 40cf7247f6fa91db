//! Region types shared across the pipeline.
//!
//! Detectors emit [`RawRegion`]s in floating-point image space; the
//! reconciler turns them into canonical [`Region`]s with stable identifiers.
//! `Region` serializes to the external wire schema (`detection_type` with
//! flattened geometry), so its fields are private and geometry is immutable
//! after creation.

use crate::processors::geometry::{Rect, RectF};
use serde::Serialize;

/// Prefix required on identifiers of manually injected regions.
pub const MANUAL_PREFIX: &str = "manual_";

/// The category of a detected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// A human face.
    Face,
    /// A vehicle license plate.
    LicensePlate,
}

impl RegionKind {
    /// Wire name of the kind, also used as the id prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Face => "face",
            RegionKind::LicensePlate => "license_plate",
        }
    }
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detector hit before reconciliation: unclipped geometry, confidence,
/// and kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRegion {
    /// Box in floating-point image space; may extend past the image.
    pub rect: RectF,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
    /// Category of the hit.
    pub kind: RegionKind,
}

/// A canonical region after reconciliation.
///
/// Geometry and identity are fixed at creation; only the `enabled` toggle
/// mutates afterwards, which is what lets [`rerender`] restore original
/// pixels exactly for disabled regions.
///
/// [`rerender`]: crate::pipeline::PrivacyPipeline::rerender
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    id: String,
    #[serde(flatten)]
    rect: Rect,
    confidence: f32,
    #[serde(rename = "detection_type")]
    kind: RegionKind,
    enabled: bool,
}

impl Region {
    /// Creates a pipeline-assigned region. Reconciler use only.
    pub(crate) fn new(id: String, rect: Rect, confidence: f32, kind: RegionKind) -> Self {
        Region {
            id,
            rect,
            confidence,
            kind,
            enabled: true,
        }
    }

    /// Creates a manually injected region.
    ///
    /// The identifier is prefixed with `manual_` if the caller did not
    /// already do so, keeping the manual namespace disjoint from
    /// pipeline-assigned `{kind}_{n}` ids. Geometry is clipped to the image
    /// bounds the same way detected regions are; a rect entirely outside
    /// the image comes back empty and is flagged at render time. Manual
    /// regions carry confidence 1.0.
    pub fn manual(
        id: impl Into<String>,
        rect: Rect,
        kind: RegionKind,
        img_width: u32,
        img_height: u32,
    ) -> Self {
        let id = id.into();
        let id = if id.starts_with(MANUAL_PREFIX) {
            id
        } else {
            format!("{MANUAL_PREFIX}{id}")
        };
        let x = rect.x.min(img_width);
        let y = rect.y.min(img_height);
        let right = rect.right().min(img_width);
        let bottom = rect.bottom().min(img_height);
        Region {
            id,
            rect: Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y)),
            confidence: 1.0,
            kind,
            enabled: true,
        }
    }

    /// Stable identifier of the region.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Clipped geometry of the region.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Detector confidence.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Category of the region.
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Whether the region participates in redaction.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Toggles whether the region is redacted on the next render.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// A non-fatal degradation observed during a pipeline run.
///
/// Warnings accompany a successful result so callers can surface partial
/// failures instead of silently dropping them.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// A requested detector did not contribute results.
    DetectorUnavailable {
        /// Name of the detector.
        detector: String,
        /// Why it was unavailable.
        reason: String,
    },
    /// An enabled region could not be rendered; its pixels are unmodified.
    RegionRenderFailed {
        /// Identifier of the affected region.
        region_id: String,
        /// Why rendering failed.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_id_gets_prefixed() {
        let r = Region::manual("face_7", Rect::new(1, 2, 3, 4), RegionKind::Face, 100, 100);
        assert_eq!(r.id(), "manual_face_7");
        assert_eq!(r.confidence(), 1.0);
        assert!(r.enabled());
    }

    #[test]
    fn manual_id_prefix_not_doubled() {
        let r = Region::manual(
            "manual_abc",
            Rect::new(0, 0, 1, 1),
            RegionKind::LicensePlate,
            10,
            10,
        );
        assert_eq!(r.id(), "manual_abc");
    }

    #[test]
    fn manual_rect_is_clipped_to_image() {
        let r = Region::manual("edge", Rect::new(90, 90, 40, 40), RegionKind::Face, 100, 100);
        assert_eq!(r.rect(), Rect::new(90, 90, 10, 10));

        let r = Region::manual("outside", Rect::new(200, 50, 10, 10), RegionKind::Face, 100, 100);
        assert!(r.rect().is_empty());
    }

    #[test]
    fn toggling_enabled_leaves_geometry_fixed() {
        let mut r = Region::new(
            "face_0".to_string(),
            Rect::new(5, 5, 10, 10),
            0.9,
            RegionKind::Face,
        );
        r.set_enabled(false);
        assert!(!r.enabled());
        assert_eq!(r.rect(), Rect::new(5, 5, 10, 10));
        assert_eq!(r.id(), "face_0");
    }

    #[test]
    fn region_serializes_to_wire_schema() {
        let r = Region::new(
            "license_plate_0".to_string(),
            Rect::new(10, 20, 30, 40),
            0.75,
            RegionKind::LicensePlate,
        );
        let json: serde_json::Value = serde_json::to_value(&r).unwrap();
        assert_eq!(json["id"], "license_plate_0");
        assert_eq!(json["x"], 10);
        assert_eq!(json["y"], 20);
        assert_eq!(json["width"], 30);
        assert_eq!(json["height"], 40);
        assert_eq!(json["detection_type"], "license_plate");
        assert_eq!(json["enabled"], true);
    }
}
