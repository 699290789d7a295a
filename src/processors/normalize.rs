//! Output normalization for classification models.
//!
//! Export pipelines disagree on what a classifier's final layer emits: some
//! graphs end in a softmax, some return raw logits, and some stop at a spatial
//! activation map that still needs global average pooling. [`normalize`] turns
//! all three into a `(batch, num_classes)` probability matrix without being told
//! which one it received.

use crate::core::tensor::{RawOutput, TensorD};
use crate::core::{ClassifierError, Tensor2D};
use ndarray::{Array2, Axis, Ix1, Ix2, Ix4};

/// Converts a raw model output into a `(batch, num_classes)` matrix.
///
/// Steps, in order:
/// 1. a sequence yields its first element, a mapping its first value;
/// 2. a 4-D `(batch, h, w, c)` map is averaged over `h` and `w`, then softmaxed;
/// 3. a 1-D vector gains a leading batch axis;
/// 4. a 2-D matrix with any value below 0 or above 1 is treated as logits and
///    softmaxed along the last axis;
/// 5. any other 2-D matrix is returned unchanged.
///
/// The check in step 4 is a heuristic. A head that emits bounded but
/// unnormalized scores (every value inside `[0, 1]`) passes through as-is, so
/// its rows need not sum to 1. A 1-D or 2-D output containing any NaN is also
/// returned unchanged.
///
/// # Errors
///
/// Returns `OutputShape` for an empty sequence or mapping, for ranks other
/// than 1, 2 or 4, and for a spatial map with an empty spatial axis.
pub fn normalize(raw: &RawOutput) -> Result<Tensor2D, ClassifierError> {
    let array = raw
        .primary()
        .ok_or(ClassifierError::OutputShape { shape: Vec::new() })?;
    normalize_array(array)
}

fn normalize_array(array: &TensorD) -> Result<Tensor2D, ClassifierError> {
    let shape_error = || ClassifierError::OutputShape {
        shape: array.shape().to_vec(),
    };

    match array.ndim() {
        4 => {
            let spatial = array
                .view()
                .into_dimensionality::<Ix4>()
                .map_err(|_| shape_error())?;
            let pooled = spatial
                .mean_axis(Axis(1))
                .and_then(|rows| rows.mean_axis(Axis(1)))
                .ok_or_else(shape_error)?;
            Ok(softmax_rows(pooled))
        }
        1 => {
            let scores = array
                .view()
                .into_dimensionality::<Ix1>()
                .map_err(|_| shape_error())?;
            Ok(apply_logit_heuristic(scores.insert_axis(Axis(0)).to_owned()))
        }
        2 => {
            let matrix = array
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|_| shape_error())?;
            Ok(apply_logit_heuristic(matrix.to_owned()))
        }
        _ => Err(shape_error()),
    }
}

fn apply_logit_heuristic(matrix: Tensor2D) -> Tensor2D {
    // A NaN anywhere makes the range check inconclusive; leave the output as is.
    if matrix.iter().any(|v| v.is_nan()) {
        return matrix;
    }
    if matrix.iter().any(|v| !(0.0..=1.0).contains(v)) {
        softmax_rows(matrix)
    } else {
        matrix
    }
}

/// Numerically stable softmax over the last axis of a 2-D matrix.
///
/// Each row has its maximum subtracted before exponentiation and is then
/// divided by its sum.
pub fn softmax_rows(mut matrix: Array2<f32>) -> Array2<f32> {
    for mut row in matrix.rows_mut() {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        if sum > 0.0 {
            row.mapv_inplace(|v| v / sum);
        }
    }
    matrix
}
