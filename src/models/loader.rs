//! Resilient artifact loading.
//!
//! Model artifacts come out of heterogeneous export pipelines whose options are
//! unknown at serving time. The loader therefore prefers getting *some* working
//! model over strict validation: it picks a backend from the artifact's shape,
//! retries packaged graphs with relaxed options (when the policy allows it) and
//! falls back to the signature backend for directories. Every failed attempt is
//! logged; only exhaustion of all strategies is an error.

use super::{
    BackendKind, InterpreterAdapter, ModelAdapter, PackagedGraphAdapter, SignatureGraphAdapter,
};
use crate::core::ClassifierError;
use crate::core::errors::BoxedError;
use crate::core::config::{LoaderConfig, OrtSessionConfig};
use std::path::Path;
use tracing::{debug, info, warn};

/// Loads adapters from artifact references.
pub trait AdapterLoader: Send + Sync {
    /// The loaded adapter type.
    type Adapter: Send + Sync;

    /// Loads the artifact named by `reference`.
    fn load(&self, reference: &str) -> Result<Self::Adapter, ClassifierError>;
}

/// Option set used for a packaged-graph attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Default decoding and validation.
    Strict,
    /// Permissive decoding; see [`OrtSessionConfig::relaxed`].
    Relaxed,
}

impl std::fmt::Display for LoadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadMode::Strict => write!(f, "strict"),
            LoadMode::Relaxed => write!(f, "relaxed"),
        }
    }
}

/// Opens one artifact with one concrete backend.
pub trait BackendFactory: Send + Sync {
    /// The adapter type produced by every backend.
    type Adapter: Send + Sync;

    /// Opens a single-file graph with the options for `mode`.
    fn open_packaged(&self, path: &Path, mode: LoadMode) -> Result<Self::Adapter, ClassifierError>;

    /// Opens a directory bundle.
    fn open_signature(&self, path: &Path) -> Result<Self::Adapter, ClassifierError>;

    /// Opens an interpreter flatbuffer.
    fn open_interpreter(&self, path: &Path) -> Result<Self::Adapter, ClassifierError>;
}

/// Production backends: ONNX Runtime for graphs and bundles, tract for TFLite.
#[derive(Debug, Clone)]
pub struct RuntimeBackends {
    strict: OrtSessionConfig,
    relaxed: OrtSessionConfig,
    session_pool_size: usize,
}

impl RuntimeBackends {
    /// Takes the session options and pool size from the load policy.
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            strict: config.strict.clone(),
            relaxed: config.relaxed.clone(),
            session_pool_size: config.session_pool_size,
        }
    }
}

impl BackendFactory for RuntimeBackends {
    type Adapter = ModelAdapter;

    fn open_packaged(&self, path: &Path, mode: LoadMode) -> Result<ModelAdapter, ClassifierError> {
        let options = match mode {
            LoadMode::Strict => &self.strict,
            LoadMode::Relaxed => &self.relaxed,
        };
        PackagedGraphAdapter::load(path, options, self.session_pool_size).map(ModelAdapter::Packaged)
    }

    fn open_signature(&self, path: &Path) -> Result<ModelAdapter, ClassifierError> {
        SignatureGraphAdapter::load(path, &self.strict, self.session_pool_size)
            .map(ModelAdapter::Signature)
    }

    fn open_interpreter(&self, path: &Path) -> Result<ModelAdapter, ClassifierError> {
        InterpreterAdapter::load(path).map(ModelAdapter::Interpreter)
    }
}

/// Picks a backend per artifact and works through the load strategies.
#[derive(Debug, Clone)]
pub struct ResilientLoader<F = RuntimeBackends> {
    factory: F,
    config: LoaderConfig,
}

impl ResilientLoader<RuntimeBackends> {
    /// Creates a loader over the production backends.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            factory: RuntimeBackends::from_config(&config),
            config,
        }
    }
}

impl<F: BackendFactory> ResilientLoader<F> {
    /// Creates a loader over a custom backend factory.
    pub fn with_factory(factory: F, config: LoaderConfig) -> Self {
        Self { factory, config }
    }

    /// The active load policy.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Decides which backend owns the artifact at `path`.
    ///
    /// Order: packaged extension, interpreter extension, directory, any other
    /// existing file (treated as packaged). Anything else is `NotFound`.
    pub fn detect_backend(&self, path: &Path) -> Result<BackendKind, ClassifierError> {
        if self.config.is_packaged(path) {
            Ok(BackendKind::PackagedGraph)
        } else if self.config.is_interpreter(path) {
            Ok(BackendKind::InterpreterGraph)
        } else if path.is_dir() {
            Ok(BackendKind::SignatureGraph)
        } else if path.is_file() {
            Ok(BackendKind::PackagedGraph)
        } else {
            Err(ClassifierError::not_found(path))
        }
    }

    fn load_path(&self, path: &Path) -> Result<F::Adapter, ClassifierError> {
        if !path.exists() {
            return Err(ClassifierError::not_found(path));
        }

        let kind = self.detect_backend(path)?;
        debug!(model = %path.display(), backend = %kind, "loading model artifact");

        let mut attempts = Attempts::new(path);
        let adapter = match kind {
            BackendKind::InterpreterGraph => {
                attempts.record("interpreter", self.factory.open_interpreter(path))
            }
            BackendKind::SignatureGraph => {
                attempts.record("signature", self.factory.open_signature(path))
            }
            BackendKind::PackagedGraph => self.load_packaged(path, &mut attempts),
        };

        match adapter {
            Some(adapter) => {
                info!(
                    model = %path.display(),
                    backend = %kind,
                    failed_attempts = attempts.failures.len(),
                    "model loaded"
                );
                Ok(adapter)
            }
            None => Err(attempts.exhausted()),
        }
    }

    fn load_packaged(&self, path: &Path, attempts: &mut Attempts<'_>) -> Option<F::Adapter> {
        if let Some(adapter) =
            attempts.record("strict", self.factory.open_packaged(path, LoadMode::Strict))
        {
            return Some(adapter);
        }

        if self.config.allow_relaxed_load {
            if let Some(adapter) =
                attempts.record("relaxed", self.factory.open_packaged(path, LoadMode::Relaxed))
            {
                warn!(
                    model = %path.display(),
                    "model loaded only with relaxed options"
                );
                return Some(adapter);
            }
        } else {
            info!(model = %path.display(), "relaxed retry disabled by load policy");
            attempts.skip("relaxed", "disabled by load policy");
        }

        if path.is_dir() {
            return attempts.record("signature fallback", self.factory.open_signature(path));
        }
        None
    }
}

impl<F: BackendFactory> AdapterLoader for ResilientLoader<F> {
    type Adapter = F::Adapter;

    fn load(&self, reference: &str) -> Result<F::Adapter, ClassifierError> {
        self.load_path(Path::new(reference))
    }
}

/// Failure log for one load call.
struct Attempts<'a> {
    path: &'a Path,
    failures: Vec<String>,
    last_error: Option<ClassifierError>,
}

impl<'a> Attempts<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            failures: Vec::new(),
            last_error: None,
        }
    }

    fn record<A>(&mut self, strategy: &str, result: Result<A, ClassifierError>) -> Option<A> {
        match result {
            Ok(adapter) => Some(adapter),
            Err(e) => {
                warn!(
                    model = %self.path.display(),
                    attempt = strategy,
                    error = %e.detail(),
                    "model load attempt failed"
                );
                self.failures.push(format!("{strategy}: {}", e.detail()));
                self.last_error = Some(e);
                None
            }
        }
    }

    fn skip(&mut self, strategy: &str, why: &str) {
        self.failures.push(format!("{strategy}: {why}"));
    }

    fn exhausted(self) -> ClassifierError {
        ClassifierError::ModelLoad {
            model_path: self.path.display().to_string(),
            reason: "all load strategies exhausted".to_string(),
            attempts: self.failures,
            source: self.last_error.map(|e| Box::new(e) as BoxedError),
        }
    }
}
