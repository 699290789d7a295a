//! Configuration management for the classification core.
//!
//! This module provides the service configuration, the artifact load policy and
//! the ONNX Runtime session options.

pub mod loader;
pub mod onnx;
pub mod service;

// Re-export commonly used types
pub use loader::LoaderConfig;
pub use onnx::*;
pub use service::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_TARGET_SIZE, ServiceConfig, StageConfig};
