//! The classification pipeline.
//!
//! This module combines preprocessing, cached model adapters and output
//! normalization into a single request-level operation, and chains the stage
//! model when the primary prediction calls for it.

pub mod classifier;
pub mod labels;
pub mod result;

pub use classifier::{Classifier, DEFAULT_STAGE, StagePolicy};
pub use labels::LabelSet;
pub use result::{ClassProbabilities, ClassificationResponse, ClassificationResult};
