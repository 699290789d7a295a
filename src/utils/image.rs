//! Image loading helpers for the classification boundary.

use crate::core::ClassifierError;
use image::DynamicImage;
use std::path::Path;

/// Loads and decodes an image file.
///
/// # Errors
///
/// Returns `NotFound` if `path` is not an existing file, and `ImageLoad` if
/// the file cannot be decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage, ClassifierError> {
    if !path.is_file() {
        return Err(ClassifierError::not_found(path));
    }
    let img = image::open(path).map_err(ClassifierError::ImageLoad)?;
    Ok(img)
}

/// Decodes an image from an in-memory buffer, guessing the format from its
/// magic bytes.
pub fn load_image_from_memory(bytes: &[u8]) -> Result<DynamicImage, ClassifierError> {
    image::load_from_memory(bytes).map_err(ClassifierError::ImageLoad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn test_load_image_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, ClassifierError::NotFound { .. }));
    }

    #[test]
    fn test_load_image_round_trips_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        RgbImage::from_pixel(3, 2, Rgb([10, 20, 30])).save(&path).unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.to_rgb8().get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_undecodable_bytes_are_image_errors() {
        let err = load_image_from_memory(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ClassifierError::ImageLoad(_)));

        let mut png = Vec::new();
        RgbImage::new(1, 1)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        assert!(load_image_from_memory(&png).is_ok());
    }
}
