//! Service-level configuration: roots, cache sizing, label sets and the stage model.

use super::loader::LoaderConfig;
use crate::core::errors::{ClassifierError, ClassifierResult};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default capacity of the adapter cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 8;

/// Default upper bound for the preprocessing resolution.
pub const DEFAULT_MAX_TARGET_SIZE: u32 = 4096;

/// Configuration of the optional second-stage model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Primary class label that triggers the stage model.
    pub trigger_label: String,
    /// Artifact reference of the stage model, relative to the models root.
    pub artifact: String,
    /// Stage labels indexed by the stage model's output classes.
    pub labels: Vec<String>,
    /// Stage reported when the stage model is skipped or fails.
    pub default_stage: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            trigger_label: "monkeypox".to_string(),
            artifact: "stages.onnx".to_string(),
            labels: (1..=4).map(|i| format!("stage_{i}")).collect(),
            default_stage: "stage_0".to_string(),
        }
    }
}

/// Top-level configuration for a classification service.
///
/// Usually read from a JSON file at startup; every field has a default, so a
/// partial document is enough.
///
/// ```rust
/// use pox_classifier::core::config::ServiceConfig;
///
/// let config = ServiceConfig::from_json_str(r#"{ "cache_capacity": 4 }"#).unwrap();
/// assert_eq!(config.cache_capacity, 4);
/// assert_eq!(config.class_labels.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory containing model artifacts.
    pub models_root: PathBuf,
    /// Directory containing uploaded images.
    pub uploads_root: PathBuf,
    /// Maximum number of loaded adapters kept in memory.
    pub cache_capacity: usize,
    /// Largest accepted preprocessing resolution.
    pub max_target_size: u32,
    /// Class labels indexed by the primary model's output classes.
    pub class_labels: Vec<String>,
    /// Stage model chaining; `null` disables it.
    pub stage: Option<StageConfig>,
    /// Artifact loading policy.
    pub loader: LoaderConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            models_root: PathBuf::from("./models"),
            uploads_root: PathBuf::from("./uploads"),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_target_size: DEFAULT_MAX_TARGET_SIZE,
            class_labels: ["acne", "chickenpox", "monkeypox", "non-skin", "normal"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            stage: Some(StageConfig::default()),
            loader: LoaderConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> ClassifierResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ClassifierResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ClassifierError::not_found(path));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks the invariants the rest of the crate relies on.
    pub fn validate(&self) -> ClassifierResult<()> {
        if self.cache_capacity == 0 {
            return Err(ClassifierError::config_error(
                "cache_capacity must be greater than 0",
            ));
        }
        if self.max_target_size == 0 {
            return Err(ClassifierError::config_error(
                "max_target_size must be greater than 0",
            ));
        }
        if self.class_labels.is_empty() {
            return Err(ClassifierError::config_error(
                "class_labels must not be empty",
            ));
        }
        if self.loader.session_pool_size == 0 {
            return Err(ClassifierError::config_error(
                "loader.session_pool_size must be greater than 0",
            ));
        }
        if let Some(stage) = &self.stage {
            if stage.artifact.trim().is_empty() {
                return Err(ClassifierError::config_error(
                    "stage.artifact must not be empty",
                ));
            }
            if stage.labels.is_empty() {
                return Err(ClassifierError::config_error(
                    "stage.labels must not be empty",
                ));
            }
        }
        Ok(())
    }

    /// Resolves a model file or directory name under `models_root`.
    pub fn resolve_model(&self, name: &str) -> ClassifierResult<PathBuf> {
        resolve_under(&self.models_root, name)
    }

    /// Resolves an uploaded image name under `uploads_root`.
    pub fn resolve_image(&self, name: &str) -> ClassifierResult<PathBuf> {
        let path = resolve_under(&self.uploads_root, name)?;
        if !path.is_file() {
            return Err(ClassifierError::not_found(&path));
        }
        Ok(path)
    }

    /// Path of the stage artifact, if a stage model is configured.
    ///
    /// The path is not checked for existence; a missing stage model degrades to
    /// the default stage at classification time.
    pub fn stage_artifact(&self) -> Option<PathBuf> {
        self.stage
            .as_ref()
            .map(|stage| self.models_root.join(&stage.artifact))
    }
}

/// Joins `name` under `root`, refusing anything that could escape the root.
fn resolve_under(root: &Path, name: &str) -> ClassifierResult<PathBuf> {
    let relative = Path::new(name);
    if name.is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(ClassifierError::invalid_input(format!(
            "'{name}' is not a plain relative path"
        )));
    }
    let path = root.join(relative);
    if !path.exists() {
        return Err(ClassifierError::not_found(&path));
    }
    Ok(path)
}
