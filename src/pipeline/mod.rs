//! The pipeline orchestrator.
//!
//! Wires detectors, the reconciler, and the redaction engine into the three
//! caller-facing operations: [`PrivacyPipeline::process`] for full
//! detect-and-redact, [`PrivacyPipeline::rerender`] for re-applying
//! treatments after toggling regions, and [`PrivacyPipeline::process_batch`]
//! for independent multi-image runs.

use crate::core::{
    BlurConfig, DEFAULT_MIN_CONFIDENCE, PrivacyError, PrivacyResult,
};
use crate::detectors::{FaceDetector, FaceDetectorConfig, PlateDetector, PlateDetectorConfig,
    RegionDetector};
use crate::domain::{PipelineWarning, RawRegion, Region};
use crate::processors::reconcile;
use crate::redact::{REGION_PADDING, RedactionEngine};
use image::RgbImage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A wall-clock budget for one pipeline invocation.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Creates a deadline `budget` from now.
    pub fn from_now(budget: Duration) -> Self {
        Deadline {
            at: Instant::now() + budget,
        }
    }

    /// Returns true once the deadline has passed.
    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time left before the deadline, zero if already past.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}

/// Output of one successful pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    /// The redacted image.
    pub image: RgbImage,
    /// Canonical regions, in deterministic order; all enabled unless the
    /// caller toggled them before a rerender.
    pub regions: Vec<Region>,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: f64,
    /// Non-fatal degradations observed during the run.
    pub warnings: Vec<PipelineWarning>,
}

/// Aggregate outcome of a batch run.
///
/// Per-image failures are carried as entries; they never abort the batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Per-image results, in input order.
    pub results: Vec<PrivacyResult<PipelineResult>>,
    /// Wall-clock duration of the whole batch in milliseconds.
    pub total_elapsed_ms: f64,
    /// Total regions redacted across successful images.
    pub total_regions: usize,
}

impl BatchOutcome {
    /// Number of images that processed successfully.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// Number of images that failed.
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Builder for [`PrivacyPipeline`].
#[derive(Debug, Default)]
pub struct PrivacyPipelineBuilder {
    face_model_path: Option<PathBuf>,
    plate_model_path: Option<PathBuf>,
    face_min_confidence: Option<f32>,
    plate_min_confidence: Option<f32>,
    session_pool_size: Option<usize>,
    padding: Option<u32>,
}

impl PrivacyPipelineBuilder {
    /// Sets the face model path.
    pub fn face_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.face_model_path = Some(path.into());
        self
    }

    /// Sets the vehicle model path used for plate estimation.
    pub fn plate_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.plate_model_path = Some(path.into());
        self
    }

    /// Sets the face confidence floor (default 0.5).
    pub fn face_min_confidence(mut self, confidence: f32) -> Self {
        self.face_min_confidence = Some(confidence);
        self
    }

    /// Sets the plate confidence floor (default 0.5).
    pub fn plate_min_confidence(mut self, confidence: f32) -> Self {
        self.plate_min_confidence = Some(confidence);
        self
    }

    /// Sets the ORT session pool size per model (default 1).
    pub fn session_pool_size(mut self, pool_size: usize) -> Self {
        self.session_pool_size = Some(pool_size);
        self
    }

    /// Sets the blur padding in pixels (default 4).
    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Loads the configured models and builds the pipeline.
    ///
    /// At least one model path must be set.
    pub fn build(self) -> PrivacyResult<PrivacyPipeline> {
        if self.face_model_path.is_none() && self.plate_model_path.is_none() {
            return Err(PrivacyError::config_error(
                "at least one of face_model_path / plate_model_path is required",
            ));
        }
        let pool_size = self.session_pool_size.unwrap_or(1).max(1);

        let face: Option<Arc<dyn RegionDetector>> = match self.face_model_path {
            Some(path) => {
                let config = FaceDetectorConfig {
                    session_pool_size: pool_size,
                    ..FaceDetectorConfig::default()
                };
                Some(Arc::new(FaceDetector::with_config(path, config)?))
            }
            None => None,
        };
        let plate: Option<Arc<dyn RegionDetector>> = match self.plate_model_path {
            Some(path) => {
                let config = PlateDetectorConfig {
                    session_pool_size: pool_size,
                    ..PlateDetectorConfig::default()
                };
                Some(Arc::new(PlateDetector::with_config(path, config)?))
            }
            None => None,
        };

        Ok(PrivacyPipeline {
            face,
            plate,
            face_min_confidence: self.face_min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
            plate_min_confidence: self.plate_min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
            engine: RedactionEngine::with_padding(self.padding.unwrap_or(REGION_PADDING)),
        })
    }
}

/// The privacy redaction pipeline.
pub struct PrivacyPipeline {
    face: Option<Arc<dyn RegionDetector>>,
    plate: Option<Arc<dyn RegionDetector>>,
    face_min_confidence: f32,
    plate_min_confidence: f32,
    engine: RedactionEngine,
}

impl std::fmt::Debug for PrivacyPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivacyPipeline")
            .field("face", &self.face.as_ref().map(|d| d.name()))
            .field("plate", &self.plate.as_ref().map(|d| d.name()))
            .field("face_min_confidence", &self.face_min_confidence)
            .field("plate_min_confidence", &self.plate_min_confidence)
            .finish()
    }
}

impl PrivacyPipeline {
    /// Returns a builder for model-backed pipelines.
    pub fn builder() -> PrivacyPipelineBuilder {
        PrivacyPipelineBuilder::default()
    }

    /// Builds a pipeline from pre-constructed detectors.
    ///
    /// Intended for alternative detector backends and for stub detectors in
    /// tests.
    pub fn from_detectors(
        face: Option<Arc<dyn RegionDetector>>,
        plate: Option<Arc<dyn RegionDetector>>,
    ) -> Self {
        PrivacyPipeline {
            face,
            plate,
            face_min_confidence: DEFAULT_MIN_CONFIDENCE,
            plate_min_confidence: DEFAULT_MIN_CONFIDENCE,
            engine: RedactionEngine::default(),
        }
    }

    /// Detects sensitive regions and redacts them.
    ///
    /// # Arguments
    ///
    /// * `image` - Decoded source image; never mutated.
    /// * `config` - Treatment and detector selection.
    /// * `deadline` - Optional wall-clock budget; exceeding it fails this
    ///   invocation with [`PrivacyError::Timeout`].
    pub fn process(
        &self,
        image: &RgbImage,
        config: &BlurConfig,
        deadline: Option<Deadline>,
    ) -> PrivacyResult<PipelineResult> {
        let start = Instant::now();
        config.validate()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(PrivacyError::invalid_input("empty image"));
        }

        let (raw, mut warnings) = self.run_detectors(image, config, deadline, start)?;
        let regions = reconcile(&raw, image.width(), image.height());

        if let Some(d) = deadline
            && d.expired()
        {
            return Err(PrivacyError::Timeout {
                elapsed_ms: elapsed_ms(start),
            });
        }

        let output = self.engine.redact(image, &regions, config)?;
        warnings.extend(output.failures.into_iter().map(|f| {
            PipelineWarning::RegionRenderFailed {
                region_id: f.region_id,
                reason: f.reason,
            }
        }));

        if let Some(d) = deadline
            && d.expired()
        {
            return Err(PrivacyError::Timeout {
                elapsed_ms: elapsed_ms(start),
            });
        }

        let elapsed = elapsed_ms(start);
        info!(
            regions = regions.len(),
            warnings = warnings.len(),
            elapsed_ms = elapsed,
            "image processed"
        );
        Ok(PipelineResult {
            image: output.image,
            regions,
            elapsed_ms: elapsed,
            warnings,
        })
    }

    /// Re-applies the configured treatment to an already-detected region
    /// list, without running detection again.
    ///
    /// Disabled regions are left as original pixels, which is how toggling
    /// a region off restores them exactly.
    pub fn rerender(
        &self,
        original: &RgbImage,
        regions: &[Region],
        config: &BlurConfig,
    ) -> PrivacyResult<PipelineResult> {
        let start = Instant::now();
        let output = self.engine.redact(original, regions, config)?;
        let warnings = output
            .failures
            .into_iter()
            .map(|f| PipelineWarning::RegionRenderFailed {
                region_id: f.region_id,
                reason: f.reason,
            })
            .collect();
        Ok(PipelineResult {
            image: output.image,
            regions: regions.to_vec(),
            elapsed_ms: elapsed_ms(start),
            warnings,
        })
    }

    /// Processes several images independently.
    ///
    /// A failing image contributes an error entry; the rest of the batch
    /// still runs. The deadline, when given, spans the whole batch.
    pub fn process_batch(
        &self,
        images: &[RgbImage],
        config: &BlurConfig,
        deadline: Option<Deadline>,
    ) -> BatchOutcome {
        let start = Instant::now();
        let mut results = Vec::with_capacity(images.len());
        let mut total_regions = 0usize;
        for (index, image) in images.iter().enumerate() {
            let result = self.process(image, config, deadline);
            match &result {
                Ok(r) => total_regions += r.regions.len(),
                Err(err) => warn!(index, error = %err, "batch image failed"),
            }
            results.push(result);
        }
        BatchOutcome {
            results,
            total_elapsed_ms: elapsed_ms(start),
            total_regions,
        }
    }

    /// Runs the requested detectors, concurrently when both are available.
    ///
    /// Returns the combined raw hits plus warnings for detectors that
    /// failed. Errors only when every requested detector failed: a sole
    /// requested detector stopped by the deadline surfaces as `Timeout`,
    /// any other total failure as `AllDetectorsFailed`.
    fn run_detectors(
        &self,
        image: &RgbImage,
        config: &BlurConfig,
        deadline: Option<Deadline>,
        start: Instant,
    ) -> PrivacyResult<(Vec<RawRegion>, Vec<PipelineWarning>)> {
        let mut failures: Vec<(String, PrivacyError)> = Vec::new();
        let mut requested = 0usize;

        let face = if config.detect_faces {
            requested += 1;
            match &self.face {
                Some(detector) => Some(detector),
                None => {
                    failures.push((
                        "face".to_string(),
                        PrivacyError::detector_unavailable("face", "no face model configured"),
                    ));
                    None
                }
            }
        } else {
            None
        };
        let plate = if config.detect_plates {
            requested += 1;
            match &self.plate {
                Some(detector) => Some(detector),
                None => {
                    failures.push((
                        "plate".to_string(),
                        PrivacyError::detector_unavailable("plate", "no plate model configured"),
                    ));
                    None
                }
            }
        } else {
            None
        };

        let run_one = |detector: &Arc<dyn RegionDetector>,
                       min_confidence: f32|
         -> PrivacyResult<Vec<RawRegion>> {
            if let Some(d) = deadline
                && d.expired()
            {
                return Err(PrivacyError::Timeout {
                    elapsed_ms: elapsed_ms(start),
                });
            }
            detector.detect(image, min_confidence)
        };

        let (face_result, plate_result) = match (face, plate) {
            (Some(f), Some(p)) => {
                let (a, b) = rayon::join(
                    || run_one(f, self.face_min_confidence),
                    || run_one(p, self.plate_min_confidence),
                );
                (Some((f.name().to_string(), a)), Some((p.name().to_string(), b)))
            }
            (Some(f), None) => (
                Some((f.name().to_string(), run_one(f, self.face_min_confidence))),
                None,
            ),
            (None, Some(p)) => (
                None,
                Some((p.name().to_string(), run_one(p, self.plate_min_confidence))),
            ),
            (None, None) => (None, None),
        };

        let mut raw = Vec::new();
        for outcome in [face_result, plate_result].into_iter().flatten() {
            match outcome {
                (_, Ok(regions)) => raw.extend(regions),
                (name, Err(err)) => failures.push((name, err)),
            }
        }

        if requested > 0 && failures.len() == requested {
            if requested == 1
                && matches!(failures[0].1, PrivacyError::Timeout { .. })
                && let Some((_, err)) = failures.pop()
            {
                return Err(err);
            }
            let details: Vec<String> = failures
                .iter()
                .map(|(name, err)| format!("{name}: {err}"))
                .collect();
            return Err(PrivacyError::AllDetectorsFailed {
                details: details.join("; "),
            });
        }

        let warnings = failures
            .into_iter()
            .map(|(detector, err)| {
                warn!(detector = %detector, error = %err, "detector unavailable, continuing degraded");
                PipelineWarning::DetectorUnavailable {
                    detector,
                    reason: err.to_string(),
                }
            })
            .collect();
        Ok((raw, warnings))
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
