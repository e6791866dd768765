use crate::config::TagSize;
use crate::error::PreprocessError;
use image::{GrayImage, Luma};

/// Pad the image with half a tag on every side, replicating edge pixels
/// The result is `(width + tag.width, height + tag.height)` for even tag sizes
pub fn apply(image: GrayImage, tag: TagSize) -> Result<GrayImage, PreprocessError> {
    let left = tag.width / 2;
    let top = tag.height / 2;
    Ok(replicate_border(&image, top, top, left, left))
}

/// Replicated border, reading only from inside the source buffer
fn replicate_border(img: &GrayImage, top: u32, bottom: u32, left: u32, right: u32) -> GrayImage {
    let (width, height) = img.dimensions();
    let new_width = width + left + right;
    let new_height = height + top + bottom;

    if width == 0 || height == 0 {
        return GrayImage::new(new_width, new_height);
    }

    GrayImage::from_fn(new_width, new_height, |x, y| {
        let src_x = x.saturating_sub(left).min(width - 1);
        let src_y = y.saturating_sub(top).min(height - 1);
        Luma([img.get_pixel(src_x, src_y).0[0]])
    })
}
