//! Image preprocessing for classification models.
//!
//! Converts a decoded image of any color mode and size into the fixed-size
//! `(1, size, size, 3)` tensor the classifiers expect, with values in `[0, 1]`.

use crate::core::config::DEFAULT_MAX_TARGET_SIZE;
use crate::core::{ClassifierError, Tensor4D};
use image::DynamicImage;
use image::imageops::FilterType;

/// Resizes and rescales images into NHWC float tensors.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Interpolation filter used for resizing.
    filter: FilterType,
    /// Largest accepted edge length.
    max_target_size: u32,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TARGET_SIZE)
    }
}

impl ImagePreprocessor {
    /// Creates a preprocessor using Lanczos3 resampling.
    pub fn new(max_target_size: u32) -> Self {
        Self {
            filter: FilterType::Lanczos3,
            max_target_size,
        }
    }

    /// Returns the largest accepted edge length.
    pub fn max_target_size(&self) -> u32 {
        self.max_target_size
    }

    /// Converts `image` into a `(1, target_size, target_size, 3)` tensor.
    ///
    /// The image is forced to RGB, resized to a square of `target_size` pixels,
    /// and every channel value is divided by 255.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `target_size` is zero or exceeds the configured
    /// maximum.
    pub fn preprocess(
        &self,
        image: &DynamicImage,
        target_size: u32,
    ) -> Result<Tensor4D, ClassifierError> {
        if target_size == 0 {
            return Err(ClassifierError::invalid_input(
                "target size must be greater than 0",
            ));
        }
        if target_size > self.max_target_size {
            return Err(ClassifierError::invalid_input(format!(
                "target size {} exceeds the maximum of {}",
                target_size, self.max_target_size
            )));
        }

        let rgb = image.to_rgb8();
        let resized = image::imageops::resize(&rgb, target_size, target_size, self.filter);

        let size = target_size as usize;
        let tensor = Tensor4D::from_shape_fn((1, size, size, 3), |(_, y, x, c)| {
            resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        });
        Ok(tensor)
    }
}

/// Converts a signed size coming from a request into a pixel edge length.
pub fn parse_target_size(value: i64) -> Result<u32, ClassifierError> {
    if value <= 0 {
        return Err(ClassifierError::invalid_input(format!(
            "target size must be greater than 0, got {value}"
        )));
    }
    u32::try_from(value).map_err(|_| {
        ClassifierError::invalid_input(format!("target size {value} is out of range"))
    })
}
