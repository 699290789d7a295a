use super::*;
use crate::core::config::OrtSessionConfig;
use crate::core::inference::session::load_session;
use std::path::Path;

impl OrtInfer {
    /// Loads the graph at `model_path` into `pool_size` sessions built with `config`.
    ///
    /// Input and output names are read from the first session.
    pub fn from_config(
        config: &OrtSessionConfig,
        model_path: impl AsRef<Path>,
        pool_size: usize,
    ) -> Result<Self, ClassifierError> {
        let path = model_path.as_ref();
        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let session = load_session(path, config).map_err(|e| {
                ClassifierError::model_load_error(path, "failed to create ONNX session", Some(e))
            })?;
            sessions.push(session);
        }

        let first = &sessions[0];
        let input_names: Vec<String> = first.inputs.iter().map(|i| i.name.clone()).collect();
        let output_names: Vec<String> = first.outputs.iter().map(|o| o.name.clone()).collect();
        if input_names.is_empty() || output_names.is_empty() {
            return Err(ClassifierError::model_load_error(
                path,
                format!(
                    "graph declares {} inputs and {} outputs",
                    input_names.len(),
                    output_names.len()
                ),
                None::<ort::Error>,
            ));
        }

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        Ok(OrtInfer {
            sessions: sessions.into_iter().map(Mutex::new).collect(),
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_names,
            output_names,
            model_path: path.to_path_buf(),
            model_name,
        })
    }
}
