//! Image decoding and tensor preparation

use std::path::Path;

use image::{imageops, RgbImage};
use ndarray::Array4;

use crate::config::{InferenceConfig, Normalization, TensorLayout};
use crate::error::{ClassrError, Result};

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decode an image file into RGB
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).map_err(|source| ClassrError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

/// Resize, normalize and lay out an image as a batch of one
pub fn image_to_tensor(image: &RgbImage, config: &InferenceConfig) -> Array4<f32> {
    let (height, width) = (config.height(), config.width());
    let resized = imageops::resize(image, width, height, config.resize_filter.into());
    let (h, w) = (height as usize, width as usize);

    let value = |y: usize, x: usize, c: usize| {
        let raw = resized.get_pixel(x as u32, y as u32)[c];
        normalize(raw, c, config.normalization)
    };

    match config.layout {
        TensorLayout::Nhwc => Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| value(y, x, c)),
        TensorLayout::Nchw => Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| value(y, x, c)),
    }
}

fn normalize(raw: u8, channel: usize, normalization: Normalization) -> f32 {
    let x = f32::from(raw);
    match normalization {
        Normalization::Passthrough => x,
        Normalization::Unit => x / 255.0,
        Normalization::Symmetric => x / 127.5 - 1.0,
        Normalization::Imagenet => (x / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn config(normalization: Normalization, layout: TensorLayout) -> InferenceConfig {
        InferenceConfig {
            image_size: [4, 6],
            normalization,
            layout,
            ..Default::default()
        }
    }

    #[test]
    fn test_nhwc_passthrough() {
        let image = RgbImage::from_pixel(32, 16, Rgb([10, 128, 255]));
        let tensor = image_to_tensor(&image, &config(Normalization::Passthrough, TensorLayout::Nhwc));

        assert_eq!(tensor.shape(), &[1, 4, 6, 3]);
        assert_eq!(tensor[[0, 3, 5, 0]], 10.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 128.0);
        assert_eq!(tensor[[0, 2, 1, 2]], 255.0);
    }

    #[test]
    fn test_nchw_layout() {
        let image = RgbImage::from_pixel(8, 8, Rgb([0, 51, 255]));
        let tensor = image_to_tensor(&image, &config(Normalization::Unit, TensorLayout::Nchw));

        assert_eq!(tensor.shape(), &[1, 3, 4, 6]);
        assert_eq!(tensor[[0, 0, 1, 1]], 0.0);
        assert!((tensor[[0, 1, 1, 1]] - 0.2).abs() < 1e-6);
        assert_eq!(tensor[[0, 2, 3, 5]], 1.0);
    }

    #[test]
    fn test_normalization_modes() {
        assert_eq!(normalize(255, 0, Normalization::Symmetric), 1.0);
        assert_eq!(normalize(0, 0, Normalization::Symmetric), -1.0);

        let expected = (1.0 - IMAGENET_MEAN[2]) / IMAGENET_STD[2];
        assert!((normalize(255, 2, Normalization::Imagenet) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_load_image_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(matches!(load_image(&path), Err(ClassrError::Decode { .. })));
    }
}
