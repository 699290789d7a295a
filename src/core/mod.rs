//! The core of the classification service.
//!
//! This module contains the fundamental components shared by every model
//! backend:
//! - Configuration management
//! - Error handling
//! - ONNX Runtime session management
//! - Tensor aliases and the raw model output container
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod inference;
pub mod tensor;

pub use errors::{ClassifierError, ClassifierResult, ErrorKind};
pub use tensor::{RawOutput, Tensor2D, Tensor4D, TensorD};
