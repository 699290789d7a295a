//! Structures and helpers for ONNX Runtime inference.
//!
//! This module centralizes the session pool shared by the ONNX-backed model
//! adapters along with the helpers that turn an [`OrtSessionConfig`] into a
//! configured session.
//!
//! [`OrtSessionConfig`]: crate::core::config::OrtSessionConfig

pub mod ort_infer;
pub mod session;
#[cfg(test)]
pub(crate) mod test_graphs;

pub use ort_infer::OrtInfer;
pub use session::load_session;
