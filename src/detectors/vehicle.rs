//! License-plate detector adapter built on a YOLOv8-style vehicle model.
//!
//! Plates themselves are too small for general-purpose detectors to find
//! reliably, so this adapter detects vehicles (COCO classes car, motorcycle,
//! bus, truck) and estimates the plate as a band in the lower-front portion
//! of each vehicle box. The band proportions are a heuristic, tuned on
//! typical rear-facing road photos, not derived geometry.

use crate::core::inference::{ModelSession, OutputTensor};
use crate::core::{PrivacyError, PrivacyResult, ProcessingStage, SimpleError};
use crate::detectors::RegionDetector;
use crate::domain::{RawRegion, RegionKind};
use crate::processors::geometry::RectF;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ndarray::Array4;
use std::path::Path;
use tracing::debug;

/// Default square model input size.
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// COCO class ids treated as vehicles.
pub const VEHICLE_CLASSES: [usize; 4] = [2, 3, 5, 7];

/// Plate band: horizontal offset into the vehicle box, as a width fraction.
pub const PLATE_X_FRAC: f32 = 0.20;
/// Plate band width, as a fraction of vehicle width.
pub const PLATE_W_FRAC: f32 = 0.60;
/// Plate band: vertical offset into the vehicle box, as a height fraction.
pub const PLATE_Y_FRAC: f32 = 0.60;
/// Plate band height, as a fraction of vehicle height.
pub const PLATE_H_FRAC: f32 = 0.25;

const LETTERBOX_FILL: u8 = 114;

/// Configuration for [`PlateDetector`].
#[derive(Debug, Clone)]
pub struct PlateDetectorConfig {
    /// Square model input size in pixels.
    pub input_size: u32,
    /// Number of pooled ORT sessions.
    pub session_pool_size: usize,
}

impl Default for PlateDetectorConfig {
    fn default() -> Self {
        PlateDetectorConfig {
            input_size: DEFAULT_INPUT_SIZE,
            session_pool_size: 1,
        }
    }
}

/// License-plate detector backed by a YOLOv8-style vehicle model.
#[derive(Debug)]
pub struct PlateDetector {
    session: ModelSession,
    config: PlateDetectorConfig,
}

/// Mapping from letterboxed model space back to image space.
#[derive(Debug, Clone, Copy)]
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

impl PlateDetector {
    /// Loads the detector from a model file with default configuration.
    pub fn from_file(model_path: impl AsRef<Path>) -> PrivacyResult<Self> {
        Self::with_config(model_path, PlateDetectorConfig::default())
    }

    /// Loads the detector from a model file with explicit configuration.
    pub fn with_config(
        model_path: impl AsRef<Path>,
        config: PlateDetectorConfig,
    ) -> PrivacyResult<Self> {
        let session =
            ModelSession::with_pool_size(model_path, None, config.session_pool_size)?;
        Ok(PlateDetector { session, config })
    }

    /// Letterboxes the image into a gray-padded square and normalizes to
    /// `[0, 1]` NCHW.
    fn preprocess(&self, image: &RgbImage) -> (Array4<f32>, Letterbox) {
        let size = self.config.input_size;
        let scale = (size as f32 / image.width() as f32)
            .min(size as f32 / image.height() as f32);
        let new_w = ((image.width() as f32 * scale).round() as u32).max(1);
        let new_h = ((image.height() as f32 * scale).round() as u32).max(1);
        let pad_x = ((size - new_w) / 2) as f32;
        let pad_y = ((size - new_h) / 2) as f32;

        let resized = imageops::resize(image, new_w, new_h, FilterType::Triangle);
        let mut canvas = RgbImage::from_pixel(size, size, Rgb([LETTERBOX_FILL; 3]));
        imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

        let s = size as usize;
        let mut input = Array4::<f32>::zeros((1, 3, s, s));
        for (x, y, pixel) in canvas.enumerate_pixels() {
            for c in 0..3 {
                input[[0, c, y as usize, x as usize]] = pixel.0[c] as f32 / 255.0;
            }
        }
        (input, Letterbox { scale, pad_x, pad_y })
    }
}

impl RegionDetector for PlateDetector {
    fn name(&self) -> &str {
        "plate"
    }

    fn detect(&self, image: &RgbImage, min_confidence: f32) -> PrivacyResult<Vec<RawRegion>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PrivacyError::invalid_input("empty image"));
        }
        let (input, letterbox) = self.preprocess(image);
        let outputs = self.session.run(&input)?;
        let output = outputs.first().ok_or_else(|| {
            PrivacyError::processing(
                ProcessingStage::Postprocess,
                "model produced no outputs",
                SimpleError::new("expected one detection tensor"),
            )
        })?;
        let regions = decode_output(output, letterbox, min_confidence)?;
        debug!(
            model = self.session.model_name(),
            regions = regions.len(),
            "plate estimation complete"
        );
        Ok(regions)
    }
}

/// Decodes a YOLOv8 detection tensor and estimates plate bands.
///
/// Accepts either `[1, 4+C, A]` (features-major) or `[1, A, 4+C]` layout,
/// distinguished by which trailing dimension is smaller. Per anchor, the
/// score is the maximum over [`VEHICLE_CLASSES`] only; other classes never
/// produce regions. Boxes are center-form, mapped back through the
/// letterbox, then reduced to the plate band.
fn decode_output(
    output: &OutputTensor,
    letterbox: Letterbox,
    min_confidence: f32,
) -> PrivacyResult<Vec<RawRegion>> {
    if output.shape.len() != 3 {
        return Err(PrivacyError::processing(
            ProcessingStage::Postprocess,
            "unexpected detection tensor rank",
            SimpleError::new(format!("shape {:?}", output.shape)),
        ));
    }
    let d1 = output.shape[1] as usize;
    let d2 = output.shape[2] as usize;
    // Feature count (4 box + C classes) is always the smaller dimension.
    let (features, anchors, features_major) = if d1 <= d2 {
        (d1, d2, true)
    } else {
        (d2, d1, false)
    };
    if features < 8 {
        return Err(PrivacyError::processing(
            ProcessingStage::Postprocess,
            "detection tensor has too few features for vehicle classes",
            SimpleError::new(format!("{features} features")),
        ));
    }
    let at = |anchor: usize, feature: usize| -> f32 {
        if features_major {
            output.data[feature * anchors + anchor]
        } else {
            output.data[anchor * features + feature]
        }
    };

    let mut regions = Vec::new();
    for a in 0..anchors {
        let mut best = 0.0f32;
        for &cls in &VEHICLE_CLASSES {
            let feature = 4 + cls;
            if feature < features {
                best = best.max(at(a, feature));
            }
        }
        if !best.is_finite() || best < min_confidence {
            continue;
        }

        let cx = at(a, 0);
        let cy = at(a, 1);
        let bw = at(a, 2);
        let bh = at(a, 3);
        if bw <= 0.0 || bh <= 0.0 {
            continue;
        }

        // Back out of the letterbox into image space.
        let x1 = (cx - bw / 2.0 - letterbox.pad_x) / letterbox.scale;
        let y1 = (cy - bh / 2.0 - letterbox.pad_y) / letterbox.scale;
        let vw = bw / letterbox.scale;
        let vh = bh / letterbox.scale;

        regions.push(RawRegion {
            rect: plate_band(x1, y1, vw, vh),
            confidence: best,
            kind: RegionKind::LicensePlate,
        });
    }
    Ok(regions)
}

/// Estimates the plate band inside a vehicle box.
fn plate_band(x: f32, y: f32, width: f32, height: f32) -> RectF {
    RectF::from_xywh(
        x + width * PLATE_X_FRAC,
        y + height * PLATE_Y_FRAC,
        width * PLATE_W_FRAC,
        height * PLATE_H_FRAC,
    )
}
