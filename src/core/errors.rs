//! Error types for the privacy redaction pipeline.
//!
//! This module defines the errors that can occur while decoding images,
//! running detectors, reconciling regions, and rendering redactions. It also
//! provides utility constructors for creating these errors with appropriate
//! context.

use std::path::Path;
use thiserror::Error;

/// Enum representing different stages of processing in the redaction pipeline.
///
/// This enum is used to identify which stage of the pipeline an error
/// occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred while preparing a model input tensor.
    Preprocess,
    /// Error occurred during model inference.
    Inference,
    /// Error occurred while decoding model output into regions.
    Postprocess,
    /// Error occurred while reconciling detector output.
    Reconcile,
    /// Error occurred while rendering a redaction.
    Render,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Preprocess => write!(f, "preprocessing"),
            ProcessingStage::Inference => write!(f, "inference"),
            ProcessingStage::Postprocess => write!(f, "post-processing"),
            ProcessingStage::Reconcile => write!(f, "reconciliation"),
            ProcessingStage::Render => write!(f, "rendering"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the redaction pipeline.
#[derive(Error, Debug)]
pub enum PrivacyError {
    /// Error occurred while decoding an image.
    #[error("image decode")]
    Decode(#[source] image::ImageError),

    /// A detector could not run (missing model, inference failure, ...).
    #[error("detector '{detector}' unavailable: {reason}")]
    DetectorUnavailable {
        /// Name of the detector that failed.
        detector: String,
        /// A message describing why the detector is unavailable.
        reason: String,
    },

    /// Every requested detector failed for an image.
    #[error("all requested detectors failed: {details}")]
    AllDetectorsFailed {
        /// Per-detector failure descriptions.
        details: String,
    },

    /// A single region could not be rendered.
    #[error("region '{region_id}' render failed: {reason}")]
    RegionRender {
        /// Identifier of the region that failed to render.
        region_id: String,
        /// A message describing the render failure.
        reason: String,
    },

    /// The deadline for an invocation elapsed before work completed.
    #[error("deadline exceeded after {elapsed_ms:.1} ms")]
    Timeout {
        /// Milliseconds elapsed when the deadline was observed.
        elapsed_ms: f64,
    },

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Utility constructors for creating errors with context.
impl PrivacyError {
    /// Creates a PrivacyError for invalid input.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        PrivacyError::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a PrivacyError for a configuration problem.
    pub fn config_error(message: impl Into<String>) -> Self {
        PrivacyError::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a PrivacyError for an unavailable detector.
    pub fn detector_unavailable(detector: impl Into<String>, reason: impl Into<String>) -> Self {
        PrivacyError::DetectorUnavailable {
            detector: detector.into(),
            reason: reason.into(),
        }
    }

    /// Creates a PrivacyError for a failed region render.
    pub fn region_render(region_id: impl Into<String>, reason: impl Into<String>) -> Self {
        PrivacyError::RegionRender {
            region_id: region_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a PrivacyError for a processing failure at a given stage.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PrivacyError::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a PrivacyError for a model that failed to load.
    pub fn model_load(
        path: &Path,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PrivacyError::Processing {
            kind: ProcessingStage::Inference,
            context: format!("failed to load model from '{}'", path.display()),
            source: Box::new(error),
        }
    }
}

impl From<image::ImageError> for PrivacyError {
    fn from(err: image::ImageError) -> Self {
        PrivacyError::Decode(err)
    }
}

/// A simple string-backed error for cases where no structured source exists.
#[derive(Debug)]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new SimpleError from a message.
    pub fn new(message: impl Into<String>) -> Self {
        SimpleError(message.into())
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleError {}

/// Result alias used throughout the crate.
pub type PrivacyResult<T> = Result<T, PrivacyError>;
