//! Pooled ONNX Runtime sessions for one graph.

use crate::core::errors::ClassifierError;
use ort::session::Session;
use std::sync::Mutex;

#[path = "ort_infer_builders.rs"]
mod ort_infer_builders;
#[path = "ort_infer_execution.rs"]
mod ort_infer_execution;
#[cfg(test)]
#[path = "ort_infer_tests.rs"]
mod ort_infer_tests;

/// A graph loaded into one or more ONNX Runtime sessions.
///
/// `Session::run` needs exclusive access, so each session sits behind its own
/// mutex and calls are spread round-robin across the pool. A lock is held for
/// exactly one forward pass.
pub struct OrtInfer {
    pub(super) sessions: Vec<Mutex<Session>>,
    pub(super) next_idx: std::sync::atomic::AtomicUsize,
    pub(super) input_names: Vec<String>,
    pub(super) output_names: Vec<String>,
    pub(super) model_path: std::path::PathBuf,
    pub(super) model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_names", &self.input_names)
            .field("output_names", &self.output_names)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Names of the graph's declared inputs, in declaration order.
    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// Names of the graph's declared outputs, in declaration order.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Number of sessions in the pool.
    pub fn pool_size(&self) -> usize {
        self.sessions.len()
    }

    pub(super) fn lock_error(&self, idx: usize) -> ClassifierError {
        ClassifierError::prediction_error(
            &self.model_name,
            format!(
                "failed to acquire session lock for session {}/{}",
                idx,
                self.sessions.len()
            ),
            crate::core::errors::SimpleError::new("session lock poisoned"),
        )
    }
}
