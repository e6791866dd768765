use crate::config::TagSize;
use crate::error::PreprocessError;
use image::{imageops, GrayImage, Luma};
use imageproc::stats::histogram;

const BINS: usize = 256;

/// Contrast limited adaptive histogram equalization
/// Tiles are `tile` pixels in size, lookup tables are blended bilinearly between tile centres
pub fn apply(image: GrayImage, clip_limit: f32, tile: TagSize) -> Result<GrayImage, PreprocessError> {
    if tile.width == 0 || tile.height == 0 {
        return Err(PreprocessError::InvalidParameters(format!(
            "CLAHE tile size must be non-zero, got {}x{}",
            tile.width, tile.height
        )));
    }
    if !clip_limit.is_finite() || clip_limit <= 0.0 {
        return Err(PreprocessError::InvalidParameters(format!(
            "CLAHE clip limit must be positive, got {}",
            clip_limit
        )));
    }

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Ok(image);
    }

    let tiles_x = width.div_ceil(tile.width);
    let tiles_y = height.div_ceil(tile.height);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x_start = tx * tile.width;
            let y_start = ty * tile.height;
            let x_end = (x_start + tile.width).min(width);
            let y_end = (y_start + tile.height).min(height);
            luts.push(tile_lut(&image, x_start, y_start, x_end, y_end, clip_limit));
        }
    }
    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles_x + tx) as usize];

    let inv_tw = 1.0 / tile.width as f32;
    let inv_th = 1.0 / tile.height as f32;

    Ok(GrayImage::from_fn(width, height, |x, y| {
        let pixel = image.get_pixel(x, y).0[0] as usize;

        let (tx1, tx2, xa) = neighbours(x as f32 * inv_tw - 0.5, tiles_x);
        let (ty1, ty2, ya) = neighbours(y as f32 * inv_th - 0.5, tiles_y);

        let top = lut_at(tx1, ty1)[pixel] as f32 * (1.0 - xa) + lut_at(tx2, ty1)[pixel] as f32 * xa;
        let bottom =
            lut_at(tx1, ty2)[pixel] as f32 * (1.0 - xa) + lut_at(tx2, ty2)[pixel] as f32 * xa;
        let value = top * (1.0 - ya) + bottom * ya;

        Luma([value.round().clamp(0.0, 255.0) as u8])
    }))
}

/// Neighbouring tile indices and the blend weight of the second one
fn neighbours(pos: f32, tiles: u32) -> (u32, u32, f32) {
    let first = pos.floor();
    let weight = pos - first;
    let last = tiles as i64 - 1;
    let t1 = (first as i64).clamp(0, last) as u32;
    let t2 = (first as i64 + 1).clamp(0, last) as u32;
    (t1, t2, weight)
}

/// Clipped-histogram equalization table for one tile
fn tile_lut(
    image: &GrayImage,
    x_start: u32,
    y_start: u32,
    x_end: u32,
    y_end: u32,
    clip_limit: f32,
) -> [u8; BINS] {
    let (tile_w, tile_h) = (x_end - x_start, y_end - y_start);
    let tile = imageops::crop_imm(image, x_start, y_start, tile_w, tile_h).to_image();
    let mut counts = histogram(&tile).channels[0];

    let area = tile_w * tile_h;
    let clip = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
    clip_histogram(&mut counts, clip);

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0u32;
    for (bin, count) in counts.iter().enumerate() {
        sum += count;
        lut[bin] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Cut every bin at `clip` and spread the excess evenly over all bins
fn clip_histogram(histogram: &mut [u32; BINS], clip: u32) {
    let mut excess = 0u32;
    for count in histogram.iter_mut() {
        if *count > clip {
            excess += *count - clip;
            *count = clip;
        }
    }

    if excess == 0 {
        return;
    }

    let per_bin = excess / BINS as u32;
    let residual = (excess % BINS as u32) as usize;
    for count in histogram.iter_mut() {
        *count += per_bin;
    }

    if residual > 0 {
        let step = (BINS / residual).max(1);
        for count in histogram.iter_mut().step_by(step).take(residual) {
            *count += 1;
        }
    }
}
