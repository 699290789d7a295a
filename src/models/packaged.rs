//! Packaged-graph adapter: a single-file ONNX graph.

use crate::core::config::OrtSessionConfig;
use crate::core::inference::OrtInfer;
use crate::core::tensor::RawOutput;
use crate::core::{ClassifierError, Tensor4D};
use std::path::Path;
use tracing::info;

/// Adapter over a self-contained graph file.
///
/// Some exporters emit graphs with several identical image inputs (duplicated
/// branches of the same network). Every declared input receives the same
/// tensor; they are not treated as distinct modalities.
#[derive(Debug)]
pub struct PackagedGraphAdapter {
    inference: OrtInfer,
}

impl PackagedGraphAdapter {
    /// Loads the graph at `path` with the given session options.
    pub fn load(
        path: impl AsRef<Path>,
        options: &OrtSessionConfig,
        session_pool_size: usize,
    ) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let inference = OrtInfer::from_config(options, path, session_pool_size)?;
        info!(
            model = %path.display(),
            inputs = ?inference.input_names(),
            outputs = ?inference.output_names(),
            "packaged graph loaded"
        );
        Ok(Self { inference })
    }

    /// Name of the loaded model.
    pub fn model_name(&self) -> &str {
        self.inference.model_name()
    }

    /// Number of declared graph inputs.
    pub fn input_count(&self) -> usize {
        self.inference.input_names().len()
    }

    pub(crate) fn predict(&self, x: &Tensor4D) -> Result<RawOutput, ClassifierError> {
        let mut outputs = self.inference.run_replicated(
            x,
            self.inference.input_names(),
            self.inference.output_names(),
        )?;
        if outputs.len() == 1 {
            let (_, array) = outputs.remove(0);
            Ok(RawOutput::Single(array))
        } else {
            Ok(RawOutput::Sequence(
                outputs.into_iter().map(|(_, array)| array).collect(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inference::test_graphs;

    #[test]
    fn test_several_outputs_come_back_in_declared_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_graphs::write(
            dir.path(),
            "twin.onnx",
            &test_graphs::add_and_identity(&test_graphs::DYNAMIC),
        );
        let adapter = PackagedGraphAdapter::load(&path, &OrtSessionConfig::strict(), 1).unwrap();
        assert_eq!(adapter.input_count(), 2);

        let x = Tensor4D::from_elem((1, 2, 2, 3), 0.25);
        match adapter.predict(&x).unwrap() {
            RawOutput::Sequence(arrays) => {
                assert_eq!(arrays.len(), 2);
                assert_eq!(arrays[0], Tensor4D::from_elem((1, 2, 2, 3), 0.5).into_dyn());
                assert_eq!(arrays[1], x.into_dyn());
            }
            other => panic!("expected a sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_one_output_is_single() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_graphs::write(
            dir.path(),
            "cast.onnx",
            &test_graphs::cast_to_int64(&test_graphs::DYNAMIC),
        );
        let adapter = PackagedGraphAdapter::load(&path, &OrtSessionConfig::relaxed(), 1).unwrap();
        assert_eq!(adapter.input_count(), 1);
        assert_eq!(adapter.model_name(), "cast");

        let x = Tensor4D::from_elem((1, 3, 3, 3), 4.0);
        match adapter.predict(&x).unwrap() {
            RawOutput::Single(array) => assert_eq!(array, x.into_dyn()),
            other => panic!("expected a single array, got {other:?}"),
        }
    }
}
