//! Core functionality: errors, configuration, and ONNX inference plumbing.

pub mod config;
pub mod errors;
pub mod inference;

pub use config::{BlurConfig, BlurMode, DEFAULT_BLUR_INTENSITY, DEFAULT_MIN_CONFIDENCE, Glyph};
pub use errors::{PrivacyError, PrivacyResult, ProcessingStage, SimpleError};
pub use inference::{ModelSession, OutputTensor};
