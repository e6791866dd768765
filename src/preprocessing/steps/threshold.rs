use crate::error::PreprocessError;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

/// Gaussian adaptive threshold parameters
pub const BLOCK_SIZE: u32 = 51;
const OFFSET: f32 = 0.0;
const MAX_VALUE: u8 = 255;

/// Blend weights for the softened (non-binary) output
const WEIGHT_ORIGINAL: f32 = 0.7;
const WEIGHT_THRESHOLD: f32 = 0.3;
const GAMMA: f32 = 0.0;

/// Apply Gaussian adaptive thresholding
/// With `binary` the mask replaces the image, otherwise mask and image are blended 0.7 / 0.3
pub fn apply(image: GrayImage, binary: bool) -> Result<GrayImage, PreprocessError> {
    if image.width() == 0 || image.height() == 0 {
        return Ok(image);
    }

    let mask = adaptive_threshold_gaussian(&image, BLOCK_SIZE, OFFSET);
    if binary {
        return Ok(mask);
    }

    Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let original = image.get_pixel(x, y).0[0] as f32;
        let threshold = mask.get_pixel(x, y).0[0] as f32;
        let blended = WEIGHT_ORIGINAL * original + WEIGHT_THRESHOLD * threshold + GAMMA;
        Luma([blended.round().clamp(0.0, 255.0) as u8])
    }))
}

/// Pixels brighter than their Gaussian-weighted neighbourhood mean (minus `offset`) become white
fn adaptive_threshold_gaussian(img: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let mean = gaussian_mean(img, block_size);

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let local = mean.get_pixel(x, y).0[0].round() - offset;
        if img.get_pixel(x, y).0[0] as f32 > local {
            Luma([MAX_VALUE])
        } else {
            Luma([0u8])
        }
    })
}

/// Sigma used for a Gaussian kernel of `size` taps when none is given explicitly
pub fn sigma_for_block(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = sigma_for_block(size);
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

type MeanImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Separable Gaussian blur in floating point with replicated edges
fn gaussian_mean(img: &GrayImage, block_size: u32) -> MeanImage {
    let kernel = gaussian_kernel(block_size);
    let src: MeanImage = ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        Luma([img.get_pixel(x, y).0[0] as f32])
    });
    separable_filter_equal(&src, &kernel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let base = if (x / 8 + y / 8) % 2 == 0 { 60 } else { 190 };
            Luma([(base + (x * 3 + y * 5) % 40) as u8])
        })
    }

    #[test]
    fn test_binary_output_only_has_extremes() {
        let result = apply(textured(80, 60), true).unwrap();
        for pixel in result.pixels() {
            assert!(
                pixel.0[0] == 0 || pixel.0[0] == 255,
                "Expected binary pixel, got {}",
                pixel.0[0]
            );
        }
    }

    #[test]
    fn test_blended_output_within_convex_range() {
        let img = textured(80, 60);
        let result = apply(img.clone(), false).unwrap();
        for (src, out) in img.pixels().zip(result.pixels()) {
            let low = (0.7 * src.0[0] as f32).floor();
            let high = (0.7 * src.0[0] as f32 + 0.3 * 255.0).ceil();
            let value = out.0[0] as f32;
            assert!(
                value >= low && value <= high,
                "{} outside [{}, {}]",
                value,
                low,
                high
            );
        }
    }

    #[test]
    fn test_dark_text_on_light_background() {
        let mut img = GrayImage::from_pixel(120, 60, Luma([220]));
        for x in 20..100 {
            img.put_pixel(x, 30, Luma([20]));
        }

        let result = apply(img, true).unwrap();
        assert_eq!(result.get_pixel(60, 30).0[0], 0);
        // Background right above the stroke is brighter than its blurred neighbourhood
        assert_eq!(result.get_pixel(60, 29).0[0], 255);
    }

    #[test]
    fn test_uniform_image_is_not_above_its_mean() {
        let img = GrayImage::from_pixel(70, 70, Luma([128]));
        let binary = apply(img.clone(), true).unwrap();
        assert!(binary.pixels().all(|p| p.0[0] == 0));

        let blended = apply(img, false).unwrap();
        // 0.7 * 128 = 89.6
        assert!(blended.pixels().all(|p| p.0[0] == 90));
    }

    #[test]
    fn test_gaussian_mean_replicates_edges() {
        // Left half dark, right half bright: the edge column sees only its own side far from the step
        let img = GrayImage::from_fn(120, 40, |x, _| Luma([if x < 60 { 40 } else { 200 }]));
        let mean = gaussian_mean(&img, BLOCK_SIZE);
        assert_eq!(mean.dimensions(), (120, 40));
        assert!((mean.get_pixel(0, 0).0[0] - 40.0).abs() < 0.5);
        assert!((mean.get_pixel(119, 39).0[0] - 200.0).abs() < 0.5);
        let at_step = mean.get_pixel(60, 20).0[0];
        assert!(at_step > 40.0 && at_step < 200.0);
    }

    #[test]
    fn test_default_block_sigma() {
        assert!((sigma_for_block(BLOCK_SIZE) - 8.0).abs() < 1e-5);
        let kernel = gaussian_kernel(BLOCK_SIZE);
        assert_eq!(kernel.len(), 51);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }
}
