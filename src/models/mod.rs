//! Model adapters for the classification core.
//!
//! A [`ModelAdapter`] wraps one loaded model artifact behind the single
//! [`Predictor::predict`] capability. The backend is chosen once, at load time,
//! by the [`ResilientLoader`]; prediction code never inspects formats.
//!
//! | Backend                  | Artifact                       | Runtime     |
//! |--------------------------|--------------------------------|-------------|
//! | [`PackagedGraphAdapter`] | single `.onnx` / `.ort` file   | ONNX Runtime|
//! | [`SignatureGraphAdapter`]| directory bundle of graphs     | ONNX Runtime|
//! | [`InterpreterAdapter`]   | single `.tflite` file          | tract       |

pub mod cache;
pub mod interpreter;
pub mod loader;
pub mod packaged;
pub mod signature;

pub use cache::AdapterCache;
pub use interpreter::InterpreterAdapter;
pub use loader::{AdapterLoader, BackendFactory, LoadMode, ResilientLoader, RuntimeBackends};
pub use packaged::PackagedGraphAdapter;
pub use signature::{SignatureGraphAdapter, SignatureSpec};

use crate::core::tensor::RawOutput;
use crate::core::{ClassifierError, Tensor4D};
use tracing::error;

/// Something that turns a preprocessed image tensor into a raw model output.
pub trait Predictor: Send + Sync {
    /// Runs one forward pass. Implementations do not retry.
    fn predict(&self, x: &Tensor4D) -> Result<RawOutput, ClassifierError>;
}

/// Which runtime family an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Single-file graph.
    PackagedGraph,
    /// Directory bundle with named signatures.
    SignatureGraph,
    /// Interpreter flatbuffer.
    InterpreterGraph,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::PackagedGraph => write!(f, "packaged graph"),
            BackendKind::SignatureGraph => write!(f, "signature graph"),
            BackendKind::InterpreterGraph => write!(f, "interpreter graph"),
        }
    }
}

/// A loaded model, one variant per backend.
#[derive(Debug)]
pub enum ModelAdapter {
    /// Single-file ONNX graph.
    Packaged(PackagedGraphAdapter),
    /// Directory bundle.
    Signature(SignatureGraphAdapter),
    /// TFLite flatbuffer.
    Interpreter(InterpreterAdapter),
}

impl ModelAdapter {
    /// The backend this adapter was loaded with.
    pub fn backend(&self) -> BackendKind {
        match self {
            ModelAdapter::Packaged(_) => BackendKind::PackagedGraph,
            ModelAdapter::Signature(_) => BackendKind::SignatureGraph,
            ModelAdapter::Interpreter(_) => BackendKind::InterpreterGraph,
        }
    }

    /// Name of the loaded model.
    pub fn model_name(&self) -> &str {
        match self {
            ModelAdapter::Packaged(a) => a.model_name(),
            ModelAdapter::Signature(a) => a.model_name(),
            ModelAdapter::Interpreter(a) => a.model_name(),
        }
    }
}

impl Predictor for ModelAdapter {
    fn predict(&self, x: &Tensor4D) -> Result<RawOutput, ClassifierError> {
        let result = match self {
            ModelAdapter::Packaged(a) => a.predict(x),
            ModelAdapter::Signature(a) => a.predict(x),
            ModelAdapter::Interpreter(a) => a.predict(x),
        };
        result.map_err(|e| self.prediction_failure(e))
    }
}

impl ModelAdapter {
    /// Logs a backend failure and surfaces it as [`ClassifierError::Prediction`].
    fn prediction_failure(&self, e: ClassifierError) -> ClassifierError {
        error!(model = %self.model_name(), backend = %self.backend(), error = %e, "predict failed");
        match e {
            ClassifierError::Prediction { .. } => e,
            other => ClassifierError::prediction_error(
                self.model_name(),
                format!("{} backend failed", self.backend()),
                other,
            ),
        }
    }
}
