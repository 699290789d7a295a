use super::*;
use crate::core::Tensor4D;
use crate::core::tensor::{TensorD, tensor_from_shape};
use ort::session::{SessionInputValue, SessionInputs};
use ort::value::TensorRef;
use std::borrow::Cow;

impl OrtInfer {
    /// Runs one forward pass, feeding `x` to every name in `input_names`.
    ///
    /// Returns every requested output as `(name, array)` in the order of
    /// `output_names`. Outputs that are not `f32` are cast from `f64`, `i64`
    /// or `i32`.
    pub fn run_replicated(
        &self,
        x: &Tensor4D,
        input_names: &[String],
        output_names: &[String],
    ) -> Result<Vec<(String, TensorD)>, ClassifierError> {
        let input_shape = x.shape().to_vec();

        let mut feed: Vec<(Cow<'_, str>, SessionInputValue<'_>)> =
            Vec::with_capacity(input_names.len());
        for name in input_names {
            let tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
                ClassifierError::prediction_error(
                    &self.model_name,
                    format!("failed to convert input tensor with shape {input_shape:?}"),
                    e,
                )
            })?;
            feed.push((Cow::Borrowed(name.as_str()), tensor.into()));
        }

        let idx = self
            .next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| self.lock_error(idx))?;

        let ort_inputs: SessionInputs<'_, '_, 0> = SessionInputs::ValueMap(feed);
        let outputs = session_guard.run(ort_inputs).map_err(|e| {
            ClassifierError::prediction_error(
                &self.model_name,
                format!("forward pass failed for inputs {input_names:?} with shape {input_shape:?}"),
                e,
            )
        })?;

        let mut results = Vec::with_capacity(output_names.len());
        for name in output_names {
            let value = &outputs[name.as_str()];
            let (shape, data): (Vec<i64>, Vec<f32>) =
                if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                    (shape.iter().copied().collect(), data.to_vec())
                } else if let Ok((shape, data)) = value.try_extract_tensor::<f64>() {
                    (
                        shape.iter().copied().collect(),
                        data.iter().map(|&v| v as f32).collect(),
                    )
                } else if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
                    (
                        shape.iter().copied().collect(),
                        data.iter().map(|&v| v as f32).collect(),
                    )
                } else if let Ok((shape, data)) = value.try_extract_tensor::<i32>() {
                    (
                        shape.iter().copied().collect(),
                        data.iter().map(|&v| v as f32).collect(),
                    )
                } else {
                    return Err(ClassifierError::prediction_error(
                        &self.model_name,
                        format!("output '{name}' is not a numeric tensor"),
                        crate::core::errors::SimpleError::new("unsupported output type"),
                    ));
                };
            let array = tensor_from_shape(&shape, data).map_err(|e| {
                ClassifierError::prediction_error(
                    &self.model_name,
                    format!("output '{name}' has inconsistent shape {shape:?}"),
                    e,
                )
            })?;
            results.push((name.clone(), array));
        }

        Ok(results)
    }
}
