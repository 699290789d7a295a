//! Load policy for model artifacts.

use super::onnx::OrtSessionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Controls how the resilient loader classifies and opens model artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// File extensions (without dot, lowercase) of single-file packaged graphs.
    pub packaged_extensions: Vec<String>,
    /// File extensions (without dot, lowercase) of interpreter-format models.
    pub interpreter_extensions: Vec<String>,
    /// Whether a failed strict load of a packaged graph may be retried with
    /// [`LoaderConfig::relaxed`] options.
    ///
    /// The relaxed options accept graphs the strict pass rejects. Disable this
    /// when artifacts come from untrusted sources.
    pub allow_relaxed_load: bool,
    /// Number of ONNX Runtime sessions kept per loaded graph.
    pub session_pool_size: usize,
    /// Session options for the first attempt.
    pub strict: OrtSessionConfig,
    /// Session options for the permissive retry.
    pub relaxed: OrtSessionConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            packaged_extensions: vec!["onnx".to_string(), "ort".to_string()],
            interpreter_extensions: vec!["tflite".to_string()],
            allow_relaxed_load: true,
            session_pool_size: 1,
            strict: OrtSessionConfig::strict(),
            relaxed: OrtSessionConfig::relaxed(),
        }
    }
}

impl LoaderConfig {
    /// Returns true if the path carries a packaged-graph extension.
    pub fn is_packaged(&self, path: &Path) -> bool {
        has_extension(path, &self.packaged_extensions)
    }

    /// Returns true if the path carries an interpreter-format extension.
    pub fn is_interpreter(&self, path: &Path) -> bool {
        has_extension(path, &self.interpreter_extensions)
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|candidate| *candidate == ext)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        let config = LoaderConfig::default();
        assert!(config.is_packaged(Path::new("models/cls.onnx")));
        assert!(config.is_packaged(Path::new("models/CLS.ONNX")));
        assert!(config.is_interpreter(Path::new("models/cls.tflite")));
        assert!(!config.is_packaged(Path::new("models/cls.tflite")));
        assert!(!config.is_interpreter(Path::new("models/saved_model")));
    }

    #[test]
    fn test_relaxed_load_enabled_by_default() {
        let config = LoaderConfig::default();
        assert!(config.allow_relaxed_load);
        assert_eq!(config.session_pool_size, 1);
    }
}
