//! ONNX Runtime inference engine with session pooling.
//!
//! `ModelSession` owns a pool of ORT sessions for one model file and
//! dispatches `run` calls across them round-robin, so concurrent detector
//! invocations do not serialize on a single session lock. Detection models
//! here are multi-output (scores plus boxes), so `run` extracts every output
//! tensor rather than a single named one.

use crate::core::errors::{PrivacyError, PrivacyResult, ProcessingStage, SimpleError};
use ndarray::Array4;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One extracted model output: name, shape, and flattened f32 data.
#[derive(Debug, Clone)]
pub struct OutputTensor {
    /// Output name as reported by the session.
    pub name: String,
    /// Tensor shape.
    pub shape: Vec<i64>,
    /// Row-major tensor data.
    pub data: Vec<f32>,
}

/// A pooled ONNX Runtime session for one model file.
pub struct ModelSession {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    input_name: String,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for ModelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSession")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl ModelSession {
    /// Creates a ModelSession with a single underlying session.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the ONNX model file.
    /// * `input_name` - Input tensor name; discovered from the session when
    ///   `None`.
    pub fn new(model_path: impl AsRef<Path>, input_name: Option<&str>) -> PrivacyResult<Self> {
        Self::with_pool_size(model_path, input_name, 1)
    }

    /// Creates a ModelSession backed by a pool of sessions for concurrent
    /// predictions.
    pub fn with_pool_size(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
        pool_size: usize,
    ) -> PrivacyResult<Self> {
        let path = model_path.as_ref();
        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let session = Session::builder()?
                .with_log_level(LogLevel::Error)?
                .commit_from_file(path)
                .map_err(|e| PrivacyError::model_load(path, e))?;
            sessions.push(Mutex::new(session));
        }

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        let input_name = match input_name {
            Some(name) => name.to_string(),
            None => Self::discover_input_name(&sessions)?,
        };

        Ok(ModelSession {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_name,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    fn discover_input_name(sessions: &[Mutex<Session>]) -> PrivacyResult<String> {
        let session = sessions
            .first()
            .ok_or_else(|| PrivacyError::invalid_input("empty session pool"))?
            .lock()
            .map_err(|_| PrivacyError::invalid_input("failed to acquire session lock"))?;
        session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                PrivacyError::invalid_input("model declares no inputs - file may be corrupted")
            })
    }

    /// Returns the model path associated with this session.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name (file stem) associated with this session.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Runs inference on an NCHW batch and extracts every output tensor
    /// as f32.
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor, laid out `[batch, channel, height, width]`.
    ///
    /// # Returns
    ///
    /// All model outputs in session declaration order.
    pub fn run(&self, x: &Array4<f32>) -> PrivacyResult<Vec<OutputTensor>> {
        let input_shape = x.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            PrivacyError::processing(
                ProcessingStage::Inference,
                format!(
                    "model '{}': failed to convert input tensor with shape {:?}",
                    self.model_name, input_shape
                ),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            PrivacyError::processing(
                ProcessingStage::Inference,
                format!(
                    "model '{}': failed to acquire session lock {}/{}",
                    self.model_name,
                    idx,
                    self.sessions.len()
                ),
                SimpleError::new("session lock poisoned"),
            )
        })?;

        let output_names: Vec<String> = session_guard
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect();

        let outputs = session_guard.run(inputs).map_err(|e| {
            PrivacyError::processing(
                ProcessingStage::Inference,
                format!(
                    "model '{}': forward pass failed for input '{}' with shape {:?}",
                    self.model_name, self.input_name, input_shape
                ),
                e,
            )
        })?;

        let mut extracted = Vec::with_capacity(output_names.len());
        for name in output_names {
            let (shape, data) = outputs[name.as_str()]
                .try_extract_tensor::<f32>()
                .map_err(|e| {
                    PrivacyError::processing(
                        ProcessingStage::Inference,
                        format!(
                            "model '{}': failed to extract output '{}' as f32",
                            self.model_name, name
                        ),
                        e,
                    )
                })?;
            extracted.push(OutputTensor {
                name,
                shape: shape.to_vec(),
                data: data.to_vec(),
            });
        }

        Ok(extracted)
    }
}
