//! Helpers for working directly with ONNX Runtime sessions.

use crate::core::config::{OrtGraphOptimizationLevel, OrtSessionConfig};
use ort::logging::LogLevel;
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use std::path::Path;

/// Creates a session for the graph at `model_path` with the given options.
///
/// ORT's own logging is kept at `Error`; load failures are reported through
/// the returned error and logged by the caller.
pub fn load_session(
    model_path: impl AsRef<Path>,
    config: &OrtSessionConfig,
) -> Result<Session, ort::Error> {
    let builder = Session::builder()?.with_log_level(LogLevel::Error)?;
    apply_ort_config(builder, config)?.commit_from_file(model_path.as_ref())
}

fn apply_ort_config(
    mut builder: SessionBuilder,
    cfg: &OrtSessionConfig,
) -> Result<SessionBuilder, ort::Error> {
    if let Some(intra) = cfg.intra_threads {
        builder = builder.with_intra_threads(intra)?;
    }
    if let Some(inter) = cfg.inter_threads {
        builder = builder.with_inter_threads(inter)?;
    }
    if let Some(level) = cfg.optimization_level {
        use OrtGraphOptimizationLevel as OG;
        let mapped = match level {
            OG::DisableAll => GraphOptimizationLevel::Disable,
            OG::Level1 => GraphOptimizationLevel::Level1,
            OG::Level2 => GraphOptimizationLevel::Level2,
            OG::Level3 => GraphOptimizationLevel::Level3,
        };
        builder = builder.with_optimization_level(mapped)?;
    }
    if let Some(enable) = cfg.enable_mem_pattern {
        builder = builder.with_memory_pattern(enable)?;
    }
    for (key, value) in &cfg.session_config_entries {
        builder = builder.with_config_entry(key, value)?;
    }
    Ok(builder)
}
