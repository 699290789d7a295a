//! Interpreter-based adapter: TFLite flatbuffers run through tract.

use crate::core::tensor::{RawOutput, TensorD};
use crate::core::{ClassifierError, Tensor4D};
use std::path::{Path, PathBuf};
use tracing::info;
use tract_core::prelude::*;

/// Adapter over an interpreter-format model.
///
/// The optimized plan is immutable once built and keeps no per-call state, so
/// concurrent predictions need no lock.
pub struct InterpreterAdapter {
    plan: TypedRunnableModel<TypedModel>,
    input_types: Vec<DatumType>,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for InterpreterAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpreterAdapter")
            .field("input_types", &self.input_types)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl InterpreterAdapter {
    /// Reads and optimizes the model at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let load_error = |reason: &str, e: TractError| {
            ClassifierError::model_load_error(path, reason, Some(Box::<dyn std::error::Error + Send + Sync>::from(e)))
        };

        let model = tract_tflite::tflite()
            .model_for_path(path)
            .map_err(|e| load_error("failed to read interpreter model", e))?;

        let input_types = (0..model.inputs.len())
            .map(|i| model.input_fact(i).map(|fact| fact.datum_type))
            .collect::<TractResult<Vec<_>>>()
            .map_err(|e| load_error("failed to read input declarations", e))?;
        if input_types.is_empty() || model.outputs.is_empty() {
            return Err(ClassifierError::model_load_error(
                path,
                "interpreter model declares no inputs or no outputs",
                None::<ClassifierError>,
            ));
        }

        let plan = model
            .into_optimized()
            .and_then(|m| m.into_runnable())
            .map_err(|e| load_error("failed to prepare interpreter plan", e))?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();
        info!(
            model = %path.display(),
            inputs = input_types.len(),
            "interpreter model loaded"
        );

        Ok(Self {
            plan,
            input_types,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Name of the loaded model.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Declared data type of every input slot.
    pub fn input_types(&self) -> &[DatumType] {
        &self.input_types
    }

    pub(crate) fn predict(&self, x: &Tensor4D) -> Result<RawOutput, ClassifierError> {
        let fail = |context: &str, e: TractError| {
            ClassifierError::prediction_error(
                &self.model_name,
                context,
                Box::<dyn std::error::Error + Send + Sync>::from(e),
            )
        };

        let inputs =
            replicate_input(x, &self.input_types).map_err(|e| fail("failed to build inputs", e))?;
        let outputs = self
            .plan
            .run(inputs)
            .map_err(|e| fail("interpreter invocation failed", e))?;
        let first = outputs.first().ok_or_else(|| {
            ClassifierError::prediction_error(
                &self.model_name,
                "interpreter returned no outputs",
                crate::core::errors::SimpleError::new("empty output list"),
            )
        })?;
        let array = output_to_array(first).map_err(|e| fail("failed to read output as f32", e))?;
        Ok(RawOutput::Single(array))
    }

    /// Path of the loaded model.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

/// One copy of `x` per input slot, cast to that slot's declared type.
fn replicate_input(x: &Tensor4D, input_types: &[DatumType]) -> TractResult<TVec<TValue>> {
    let values: Vec<f32> = x.iter().copied().collect();
    let input = Tensor::from_shape::<f32>(x.shape(), &values)?;
    input_types
        .iter()
        .map(|dt| -> TractResult<TValue> { Ok(input.cast_to_dt(*dt)?.into_owned().into()) })
        .collect()
}

fn output_to_array(value: &Tensor) -> TractResult<TensorD> {
    let as_f32 = value.cast_to::<f32>()?;
    let values = as_f32.as_slice::<f32>()?.to_vec();
    Ok(TensorD::from_shape_vec(ndarray::IxDyn(as_f32.shape()), values)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_load_error() {
        let err = InterpreterAdapter::load("does/not/exist.tflite").unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad { .. }));
    }

    #[test]
    fn test_garbage_model_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.tflite");
        std::fs::write(&path, b"TFL3 but not really a flatbuffer").unwrap();
        let err = InterpreterAdapter::load(&path).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad { .. }));
    }

    #[test]
    fn test_input_is_cast_for_every_slot() {
        let x = Tensor4D::from_shape_fn((1, 1, 2, 2), |(_, _, w, c)| (w * 2 + c) as f32);
        let inputs =
            replicate_input(&x, &[DatumType::F32, DatumType::I64, DatumType::U8]).unwrap();

        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].datum_type(), DatumType::F32);
        assert_eq!(inputs[0].shape(), &[1, 1, 2, 2]);
        assert_eq!(inputs[0].as_slice::<f32>().unwrap(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(inputs[1].as_slice::<i64>().unwrap(), &[0, 1, 2, 3]);
        assert_eq!(inputs[2].as_slice::<u8>().unwrap(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_integer_output_becomes_f32_array() {
        let output = Tensor::from_shape::<i64>(&[1, 3], &[0, 7, 2]).unwrap();
        let array = output_to_array(&output).unwrap();
        assert_eq!(array.shape(), &[1, 3]);
        assert_eq!(array.iter().copied().collect::<Vec<_>>(), vec![0.0, 7.0, 2.0]);
    }
}
