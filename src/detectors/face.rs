//! Face detector adapter for UltraFace-style ONNX models.
//!
//! The model takes a fixed-size RGB input normalized to roughly `[-1, 1]`
//! and emits two tensors: per-anchor class scores `[1, N, 2]` (background,
//! face) and normalized corner boxes `[1, N, 4]`. Outputs are matched by
//! trailing dimension rather than name, since exports differ in naming.

use crate::core::inference::{ModelSession, OutputTensor};
use crate::core::{PrivacyError, PrivacyResult, ProcessingStage, SimpleError};
use crate::detectors::RegionDetector;
use crate::domain::{RawRegion, RegionKind};
use crate::processors::geometry::RectF;
use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::Array4;
use std::path::Path;
use tracing::debug;

/// Default model input width.
pub const DEFAULT_INPUT_WIDTH: u32 = 320;
/// Default model input height.
pub const DEFAULT_INPUT_HEIGHT: u32 = 240;

/// Configuration for [`FaceDetector`].
#[derive(Debug, Clone)]
pub struct FaceDetectorConfig {
    /// Model input width in pixels.
    pub input_width: u32,
    /// Model input height in pixels.
    pub input_height: u32,
    /// Number of pooled ORT sessions.
    pub session_pool_size: usize,
}

impl Default for FaceDetectorConfig {
    fn default() -> Self {
        FaceDetectorConfig {
            input_width: DEFAULT_INPUT_WIDTH,
            input_height: DEFAULT_INPUT_HEIGHT,
            session_pool_size: 1,
        }
    }
}

/// Face detector backed by an UltraFace-style ONNX model.
#[derive(Debug)]
pub struct FaceDetector {
    session: ModelSession,
    config: FaceDetectorConfig,
}

impl FaceDetector {
    /// Loads the detector from a model file with default configuration.
    pub fn from_file(model_path: impl AsRef<Path>) -> PrivacyResult<Self> {
        Self::with_config(model_path, FaceDetectorConfig::default())
    }

    /// Loads the detector from a model file with explicit configuration.
    pub fn with_config(
        model_path: impl AsRef<Path>,
        config: FaceDetectorConfig,
    ) -> PrivacyResult<Self> {
        let session =
            ModelSession::with_pool_size(model_path, None, config.session_pool_size)?;
        Ok(FaceDetector { session, config })
    }

    /// Resizes and normalizes the image into the model's NCHW input.
    fn preprocess(&self, image: &RgbImage) -> Array4<f32> {
        let resized = imageops::resize(
            image,
            self.config.input_width,
            self.config.input_height,
            FilterType::Triangle,
        );
        let (w, h) = (self.config.input_width as usize, self.config.input_height as usize);
        let mut input = Array4::<f32>::zeros((1, 3, h, w));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                input[[0, c, y as usize, x as usize]] = (pixel.0[c] as f32 - 127.0) / 128.0;
            }
        }
        input
    }
}

impl RegionDetector for FaceDetector {
    fn name(&self) -> &str {
        "face"
    }

    fn detect(&self, image: &RgbImage, min_confidence: f32) -> PrivacyResult<Vec<RawRegion>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PrivacyError::invalid_input("empty image"));
        }
        let input = self.preprocess(image);
        let outputs = self.session.run(&input)?;
        let regions = decode_outputs(&outputs, image.width(), image.height(), min_confidence)?;
        debug!(
            model = self.session.model_name(),
            regions = regions.len(),
            "face detection complete"
        );
        Ok(regions)
    }
}

/// Decodes score/box output tensors into raw regions.
///
/// The score tensor is recognized by trailing dimension 2 and the box tensor
/// by trailing dimension 4; both must be rank 3 with matching anchor counts.
/// Box coordinates are normalized corners, denormalized here to the
/// original image's pixel space.
fn decode_outputs(
    outputs: &[OutputTensor],
    img_width: u32,
    img_height: u32,
    min_confidence: f32,
) -> PrivacyResult<Vec<RawRegion>> {
    let scores = outputs
        .iter()
        .find(|t| t.shape.len() == 3 && t.shape[2] == 2)
        .ok_or_else(|| {
            PrivacyError::processing(
                ProcessingStage::Postprocess,
                "no [1, N, 2] score tensor among model outputs",
                SimpleError::new(format!("output shapes: {:?}", shapes(outputs))),
            )
        })?;
    let boxes = outputs
        .iter()
        .find(|t| t.shape.len() == 3 && t.shape[2] == 4)
        .ok_or_else(|| {
            PrivacyError::processing(
                ProcessingStage::Postprocess,
                "no [1, N, 4] box tensor among model outputs",
                SimpleError::new(format!("output shapes: {:?}", shapes(outputs))),
            )
        })?;

    let anchors = scores.shape[1] as usize;
    if boxes.shape[1] as usize != anchors {
        return Err(PrivacyError::processing(
            ProcessingStage::Postprocess,
            "score and box tensors disagree on anchor count",
            SimpleError::new(format!("{} vs {}", anchors, boxes.shape[1])),
        ));
    }

    let w = img_width as f32;
    let h = img_height as f32;
    let mut regions = Vec::new();
    for i in 0..anchors {
        let confidence = scores.data[i * 2 + 1];
        if !confidence.is_finite() || confidence < min_confidence {
            continue;
        }
        let x1 = boxes.data[i * 4] * w;
        let y1 = boxes.data[i * 4 + 1] * h;
        let x2 = boxes.data[i * 4 + 2] * w;
        let y2 = boxes.data[i * 4 + 3] * h;
        if x2 <= x1 || y2 <= y1 {
            continue;
        }
        regions.push(RawRegion {
            rect: RectF { x1, y1, x2, y2 },
            confidence,
            kind: RegionKind::Face,
        });
    }
    Ok(regions)
}

fn shapes(outputs: &[OutputTensor]) -> Vec<Vec<i64>> {
    outputs.iter().map(|t| t.shape.clone()).collect()
}
