//! ONNX Runtime configuration types and utilities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Session config key controlling whether operator sets that ONNX Runtime
/// considers unreleased may be loaded.
pub const ALLOW_RELEASED_OPSETS_ONLY: &str = "session.allow_released_opsets_only";

/// Graph optimization levels for ONNX Runtime.
///
/// This enum represents the different levels of graph optimization that can be applied
/// during ONNX Runtime session creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

/// Configuration for ONNX Runtime sessions.
///
/// Every field is optional; unset fields keep the runtime's own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes
    pub inter_threads: Option<usize>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Enable memory pattern optimization
    pub enable_mem_pattern: Option<bool>,
    /// Session configuration entries (key-value pairs)
    pub session_config_entries: BTreeMap<String, String>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the first, strict load attempt of a packaged graph.
    ///
    /// Full graph optimization and only released operator sets.
    pub fn strict() -> Self {
        Self::new()
            .with_optimization_level(OrtGraphOptimizationLevel::Level3)
            .add_config_entry(ALLOW_RELEASED_OPSETS_ONLY, "1")
    }

    /// Options for the permissive retry of a packaged graph.
    ///
    /// Graph rewrites are disabled and experimental operator sets are accepted,
    /// so graphs from unusual exporters still load. This trades validation for
    /// availability and is only used when the load policy allows it.
    pub fn relaxed() -> Self {
        Self::new()
            .with_optimization_level(OrtGraphOptimizationLevel::DisableAll)
            .with_memory_pattern(false)
            .add_config_entry(ALLOW_RELEASED_OPSETS_ONLY, "0")
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Enables or disables memory pattern optimization.
    pub fn with_memory_pattern(mut self, enable: bool) -> Self {
        self.enable_mem_pattern = Some(enable);
        self
    }

    /// Adds a session configuration entry.
    ///
    /// # Arguments
    ///
    /// * `key` - Configuration key.
    /// * `value` - Configuration value.
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn add_config_entry<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.session_config_entries.insert(key.into(), value.into());
        self
    }

    /// Gets the effective graph optimization level.
    pub fn get_optimization_level(&self) -> OrtGraphOptimizationLevel {
        self.optimization_level.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ort_session_config_new() {
        let config = OrtSessionConfig::new();
        assert!(config.intra_threads.is_none());
        assert!(config.inter_threads.is_none());
        assert!(config.optimization_level.is_none());
        assert!(config.session_config_entries.is_empty());
    }

    #[test]
    fn test_ort_session_config_builder() {
        let config = OrtSessionConfig::new()
            .with_intra_threads(4)
            .with_inter_threads(2)
            .with_optimization_level(OrtGraphOptimizationLevel::Level2)
            .with_memory_pattern(true);

        assert_eq!(config.intra_threads, Some(4));
        assert_eq!(config.inter_threads, Some(2));
        assert_eq!(
            config.get_optimization_level(),
            OrtGraphOptimizationLevel::Level2
        );
        assert_eq!(config.enable_mem_pattern, Some(true));
    }

    #[test]
    fn test_strict_and_relaxed_presets_differ() {
        let strict = OrtSessionConfig::strict();
        let relaxed = OrtSessionConfig::relaxed();

        assert_eq!(
            strict.get_optimization_level(),
            OrtGraphOptimizationLevel::Level3
        );
        assert_eq!(
            relaxed.get_optimization_level(),
            OrtGraphOptimizationLevel::DisableAll
        );
        assert_eq!(
            strict.session_config_entries.get(ALLOW_RELEASED_OPSETS_ONLY),
            Some(&"1".to_string())
        );
        assert_eq!(
            relaxed.session_config_entries.get(ALLOW_RELEASED_OPSETS_ONLY),
            Some(&"0".to_string())
        );
    }

    #[test]
    fn test_optimization_level_defaults() {
        let level = OrtGraphOptimizationLevel::default();
        assert_eq!(level, OrtGraphOptimizationLevel::Level1);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: OrtSessionConfig =
            serde_json::from_str(r#"{"intra_threads": 2, "optimization_level": "Level3"}"#)
                .unwrap();
        assert_eq!(config.intra_threads, Some(2));
        assert_eq!(
            config.get_optimization_level(),
            OrtGraphOptimizationLevel::Level3
        );
        assert!(config.session_config_entries.is_empty());
    }
}
