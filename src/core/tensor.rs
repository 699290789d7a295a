//! Tensor aliases and the raw model output container.

use ndarray::{ArrayD, IxDyn};

/// Type alias for 2D tensors (batch, classes).
pub type Tensor2D = ndarray::Array2<f32>;

/// Type alias for 4D tensors (batch, height, width, channels).
pub type Tensor4D = ndarray::Array4<f32>;

/// Type alias for tensors of arbitrary rank.
pub type TensorD = ArrayD<f32>;

/// Output of a model adapter before normalization.
///
/// Backends disagree on the native shape of their outputs: some return a single
/// array, some a positional list, some a name-keyed mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    /// A single output array.
    Single(TensorD),
    /// Outputs in declaration order.
    Sequence(Vec<TensorD>),
    /// Named outputs in insertion order.
    Named(Vec<(String, TensorD)>),
}

impl RawOutput {
    /// Returns the array the normalizer works on: the single array, the first
    /// element of a sequence, or the first value of a mapping.
    pub fn primary(&self) -> Option<&TensorD> {
        match self {
            RawOutput::Single(array) => Some(array),
            RawOutput::Sequence(arrays) => arrays.first(),
            RawOutput::Named(entries) => entries.first().map(|(_, array)| array),
        }
    }
}

/// Builds a dynamic-rank tensor from a flat buffer and an ONNX-style shape.
///
/// Negative (dynamic) dimensions become zero and fail the length check.
pub fn tensor_from_shape(shape: &[i64], data: Vec<f32>) -> Result<TensorD, ndarray::ShapeError> {
    let dims: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
    ArrayD::from_shape_vec(IxDyn(&dims), data)
}

impl From<TensorD> for RawOutput {
    fn from(array: TensorD) -> Self {
        RawOutput::Single(array)
    }
}
