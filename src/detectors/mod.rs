//! Detector adapters.
//!
//! Each adapter owns its model session and normalizes that model's raw
//! output into [`RawRegion`]s, so the rest of the pipeline never sees
//! model-specific tensor layouts. The [`RegionDetector`] seam also lets
//! tests substitute stub detectors.

pub mod face;
pub mod vehicle;

pub use face::{FaceDetector, FaceDetectorConfig};
pub use vehicle::{PlateDetector, PlateDetectorConfig};

use crate::core::PrivacyResult;
use crate::domain::RawRegion;
use image::RgbImage;

/// A source of raw detection regions for one category of sensitive content.
pub trait RegionDetector: Send + Sync {
    /// Short stable name of the detector, used in logs and warnings.
    fn name(&self) -> &str;

    /// Runs detection on a decoded image.
    ///
    /// Hits below `min_confidence` are dropped at the adapter. Returned
    /// geometry is in the coordinate space of `image` but may extend past
    /// its bounds; clipping is the reconciler's job.
    fn detect(&self, image: &RgbImage, min_confidence: f32) -> PrivacyResult<Vec<RawRegion>>;
}
