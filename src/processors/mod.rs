//! Tensor processing around model invocation.
//!
//! * `preprocess` - image to input tensor
//! * `normalize` - raw model output to class probabilities

pub mod normalize;
pub mod preprocess;

pub use normalize::{normalize, softmax_rows};
pub use preprocess::{ImagePreprocessor, parse_target_size};
