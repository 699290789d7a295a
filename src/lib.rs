//! # Pox Classifier
//!
//! A Rust library that classifies skin-lesion images with pre-trained neural
//! network models, whatever format the models were exported in.
//!
//! ## Features
//!
//! - Resilient model loading across ONNX graphs, ONNX bundles and TFLite flatbuffers
//! - Output normalization for softmax heads, raw logits and spatial activation maps
//! - Bounded LRU cache of loaded models with single-flight loading
//! - Conditional second-stage model chained on a trigger class
//! - ONNX Runtime and tract integration for CPU inference
//!
//! ## Modules
//!
//! * [`core`] - Configuration, error handling and ONNX session management
//! * [`models`] - Model adapters, the resilient loader and the adapter cache
//! * [`pipeline`] - The classification orchestrator and its result types
//! * [`processors`] - Image preprocessing and output normalization
//! * [`utils`] - Image loading and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pox_classifier::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::from_json_file("config.json")?;
//! let classifier = Classifier::from_config(&config)?;
//!
//! let model = config.resolve_model("classifier.onnx")?;
//! let image = config.resolve_image("lesion.jpg")?;
//! let result = classifier.classify_path(&image, &model.to_string_lossy(), 224)?;
//!
//! println!("{}", serde_json::to_string(&ClassificationResponse::from(result))?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors at the boundary
//!
//! Every failure is a [`core::ClassifierError`]. An HTTP layer maps it with
//! [`core::ClassifierError::status_code`] (404 for missing images or models,
//! 500 otherwise) and uses [`core::ClassifierError::detail`] as the body.

// Core modules
pub mod core;
pub mod models;

pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use pox_classifier::prelude::*;
/// ```
///
/// Included items focus on the most common tasks:
/// - Configuration (`ServiceConfig`)
/// - Classification (`Classifier`, `ClassificationResult`, `ClassificationResponse`)
/// - Essential error and result types (`ClassifierError`, `ClassifierResult`, `ErrorKind`)
/// - Basic image loading (`load_image`)
///
/// For advanced customization (custom loaders, backends, cache sizing),
/// import directly from the respective modules (e.g., `pox_classifier::models`).
pub mod prelude {
    // Configuration
    pub use crate::core::config::ServiceConfig;

    // Classification
    pub use crate::pipeline::{ClassificationResponse, ClassificationResult, Classifier};

    // Error Handling
    pub use crate::core::{ClassifierError, ClassifierResult, ErrorKind};

    // Image Utility
    pub use crate::utils::{init_tracing, load_image};
}
