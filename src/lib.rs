//! # Privacy Guard
//!
//! A Rust library that detects sensitive regions (human faces, vehicle
//! license plates) in decoded images and obscures them with a configurable
//! visual treatment, returning both the redacted image and per-region
//! metadata so callers can toggle individual regions without re-running
//! detection.
//!
//! ## Features
//!
//! - Face detection and vehicle-based license-plate estimation via ONNX models
//! - Reconciliation of heterogeneous detector outputs into one canonical
//!   region schema with duplicate suppression
//! - Three redaction modes: gaussian blur, pixelation, and glyph overlay
//! - Per-region enable/disable with exact restoration of original pixels
//! - Batch processing where per-image failures never abort the batch
//! - Optional per-invocation deadlines
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration, and ONNX inference plumbing
//! * [`domain`] - Region types shared across the pipeline
//! * [`detectors`] - Detector adapters normalizing model output into raw regions
//! * [`processors`] - Geometry utilities and the region reconciler
//! * [`redact`] - The redaction engine and its rendering modes
//! * [`pipeline`] - The pipeline orchestrator and result types
//! * [`utils`] - Image decode/encode helpers and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use privacy_guard::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = PrivacyPipeline::builder()
//!     .face_model_path("models/face.onnx")
//!     .plate_model_path("models/yolov8n.onnx")
//!     .build()?;
//!
//! let image = decode_image(&std::fs::read("street.jpg")?)?;
//! let config = BlurConfig::default();
//!
//! let result = pipeline.process(&image, &config, None)?;
//! println!(
//!     "{} regions redacted in {:.1} ms",
//!     result.regions.len(),
//!     result.elapsed_ms
//! );
//!
//! // Toggle a region off and re-render without re-detecting.
//! let mut regions = result.regions;
//! if let Some(region) = regions.first_mut() {
//!     region.set_enabled(false);
//! }
//! let restored = pipeline.rerender(&image, &regions, &config)?;
//! # let _ = restored;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod detectors;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod redact;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use privacy_guard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{BlurConfig, BlurMode, Glyph, PrivacyError, PrivacyResult};
    pub use crate::domain::{PipelineWarning, RawRegion, Region, RegionKind};
    pub use crate::pipeline::{
        BatchOutcome, Deadline, PipelineResult, PrivacyPipeline, PrivacyPipelineBuilder,
    };
    pub use crate::processors::{Rect, RectF, iou};
    pub use crate::utils::{decode_image, encode_png};
}
