//! Error types for the classification core.
//!
//! This module defines the errors that can occur while loading model artifacts,
//! preprocessing images, running inference and assembling classification results.
//! It also provides constructor helpers and the mapping used by an outer service
//! layer to turn an error into a response status.

use std::sync::Arc;
use thiserror::Error;

/// Boxed error used as the source of wrapped backend failures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenient result alias for classification operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Coarse error category exposed to the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced image or model does not exist.
    NotFound,
    /// Any other failure.
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for this category.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Internal => write!(f, "internal error"),
        }
    }
}

/// Enum representing the errors that can occur in the classification core.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The referenced image or model path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that could not be found.
        path: String,
    },

    /// Error indicating invalid input (size, image, path shape).
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Every applicable load strategy failed for a model artifact.
    #[error("failed to load model '{model_path}': {reason}{}", format_attempts(.attempts))]
    ModelLoad {
        /// The artifact reference that failed to load.
        model_path: String,
        /// Short reason description.
        reason: String,
        /// One line per failed attempt, in the order they were tried.
        attempts: Vec<String>,
        /// The last underlying error, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// A backend invocation failed at predict time.
    #[error("prediction failed for model '{model_name}': {context}")]
    Prediction {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: BoxedError,
    },

    /// The model produced an output that cannot be read as class scores.
    #[error("unexpected prediction shape: {shape:?}")]
    OutputShape {
        /// Shape of the offending output.
        shape: Vec<usize>,
    },

    /// Wraps the first failure of a classification request.
    #[error("classification with model '{reference}' failed")]
    Classification {
        /// The primary artifact reference of the request.
        reference: String,
        /// The underlying failure.
        #[source]
        source: Box<ClassifierError>,
    },

    /// Error occurred while loading or decoding an image.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration or manifest.
    #[error("json")]
    Json(#[from] serde_json::Error),

    /// A failure shared by every caller that waited on the same operation.
    #[error(transparent)]
    Shared(Arc<ClassifierError>),
}

fn format_attempts(attempts: &[String]) -> String {
    if attempts.is_empty() {
        String::new()
    } else {
        format!(" (attempts: {})", attempts.join("; "))
    }
}

impl ClassifierError {
    /// Creates a NotFound error for the given path.
    pub fn not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::NotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Creates an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a ModelLoad error for a single failed attempt.
    ///
    /// # Arguments
    /// * `model_path` - Path to the model artifact
    /// * `reason` - Short reason description
    /// * `source` - Optional underlying error
    pub fn model_load_error(
        model_path: impl AsRef<std::path::Path>,
        reason: impl Into<String>,
        source: Option<impl Into<BoxedError>>,
    ) -> Self {
        Self::ModelLoad {
            model_path: model_path.as_ref().display().to_string(),
            reason: reason.into(),
            attempts: Vec::new(),
            source: source.map(Into::into),
        }
    }

    /// Creates a Prediction error with model context.
    pub fn prediction_error(
        model_name: &str,
        context: impl Into<String>,
        error: impl Into<BoxedError>,
    ) -> Self {
        Self::Prediction {
            model_name: model_name.to_string(),
            context: context.into(),
            source: error.into(),
        }
    }

    /// Wraps an error as the failure of a classification request.
    pub fn classification(reference: impl Into<String>, source: ClassifierError) -> Self {
        Self::Classification {
            reference: reference.into(),
            source: Box::new(source),
        }
    }

    /// Returns the boundary category of this error.
    ///
    /// `Classification` and `Shared` wrappers are looked through, so a wrapped
    /// `NotFound` still maps to [`ErrorKind::NotFound`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Classification { source, .. } => source.kind(),
            Self::Shared(inner) => inner.kind(),
            _ => ErrorKind::Internal,
        }
    }

    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Takes a shared error back by value when no one else holds it.
    pub fn from_shared(shared: Arc<ClassifierError>) -> Self {
        Arc::try_unwrap(shared).unwrap_or_else(Self::Shared)
    }

    /// Detail text for a response body: the full chain of error messages.
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(err) = current {
            detail.push_str(": ");
            detail.push_str(&err.to_string());
            current = err.source();
        }
        detail
    }
}

/// A plain message error used as the source of wrapped failures.
#[derive(Debug)]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new SimpleError from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SimpleError {}
