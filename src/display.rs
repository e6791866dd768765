//! Conversion of raw capture frames into display bitmaps for a GUI layer
//!
//! Frames are interleaved 8-bit buffers in capture byte order: BGR for
//! three channels and BGRA for four.

use image::{Rgba, RgbaImage};

/// Grayscale palette for indexed frames, built at compile time
pub const GRAY_RAMP: [u32; 256] = gray_ramp();

const fn gray_ramp() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let v = i as u32;
        table[i] = 0xff00_0000 | (v << 16) | (v << 8) | v;
        i += 1;
    }
    table
}

/// Interleaved 8-bit pixel buffer with an explicit row stride
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    /// Bytes per row, at least `width * channels`
    pub stride: usize,
    pub data: Vec<u8>,
}

impl RawFrame {
    /// Tightly packed frame
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            stride: width as usize * channels as usize,
            data,
        }
    }

    fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * self.channels as usize]
    }

    fn is_consistent(&self) -> bool {
        let row_len = self.width as usize * self.channels as usize;
        if self.stride < row_len {
            return false;
        }
        self.data.len() >= (self.height as usize).saturating_sub(1) * self.stride + row_len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFormat {
    /// Packed `0xffRRGGBB` words
    Rgb32,
    /// Three bytes per pixel in RGB order
    Rgb888,
    /// One palette index per pixel
    Indexed8,
    Invalid,
}

/// Bitmap ready for display
#[derive(Debug, Clone)]
pub struct DisplayImage {
    pub format: DisplayFormat,
    pub width: u32,
    pub height: u32,
    /// Tightly packed pixel bytes for `Rgb888` and `Indexed8`
    pub bytes: Vec<u8>,
    /// Packed pixels for `Rgb32`
    pub words: Vec<u32>,
    pub color_table: Option<&'static [u32; 256]>,
}

impl DisplayImage {
    pub fn invalid() -> Self {
        Self {
            format: DisplayFormat::Invalid,
            width: 0,
            height: 0,
            bytes: Vec::new(),
            words: Vec::new(),
            color_table: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.format != DisplayFormat::Invalid
    }

    /// Colour of the pixel at `(x, y)` as RGBA
    pub fn pixel_rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y as usize * self.width as usize + x as usize;
        match self.format {
            DisplayFormat::Rgb32 => Some(unpack(self.words[i])),
            DisplayFormat::Rgb888 => {
                let p = &self.bytes[i * 3..i * 3 + 3];
                Some([p[0], p[1], p[2], 0xff])
            }
            DisplayFormat::Indexed8 => {
                let table = self.color_table?;
                Some(unpack(table[self.bytes[i] as usize]))
            }
            DisplayFormat::Invalid => None,
        }
    }

    /// Expand into an RGBA image, `None` for an invalid bitmap
    pub fn to_rgba(&self) -> Option<RgbaImage> {
        if !self.is_valid() {
            return None;
        }
        let mut out = RgbaImage::new(self.width, self.height);
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            *pixel = Rgba(self.pixel_rgba(x, y)?);
        }
        Some(out)
    }
}

fn unpack(word: u32) -> [u8; 4] {
    [
        (word >> 16) as u8,
        (word >> 8) as u8,
        word as u8,
        (word >> 24) as u8,
    ]
}

/// Convert a capture frame into a display bitmap
/// Unsupported layouts give an invalid bitmap and a warning
pub fn to_display_image(frame: &RawFrame) -> DisplayImage {
    if frame.width == 0 || frame.height == 0 {
        tracing::warn!(
            width = frame.width,
            height = frame.height,
            "empty frame cannot be displayed"
        );
        return DisplayImage::invalid();
    }

    if !frame.is_consistent() {
        tracing::warn!(
            width = frame.width,
            height = frame.height,
            stride = frame.stride,
            len = frame.data.len(),
            "frame buffer too small for its dimensions"
        );
        return DisplayImage::invalid();
    }

    let pixel_count = frame.width as usize * frame.height as usize;
    let mut image = DisplayImage {
        width: frame.width,
        height: frame.height,
        ..DisplayImage::invalid()
    };

    match frame.channels {
        4 => {
            image.format = DisplayFormat::Rgb32;
            image.words.reserve(pixel_count);
            for y in 0..frame.height {
                image.words.extend(frame.row(y).chunks_exact(4).map(|bgra| {
                    0xff00_0000 | ((bgra[2] as u32) << 16) | ((bgra[1] as u32) << 8) | bgra[0] as u32
                }));
            }
        }
        3 => {
            image.format = DisplayFormat::Rgb888;
            image.bytes.reserve(pixel_count * 3);
            for y in 0..frame.height {
                for bgr in frame.row(y).chunks_exact(3) {
                    image.bytes.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
                }
            }
        }
        1 => {
            image.format = DisplayFormat::Indexed8;
            image.bytes.reserve(pixel_count);
            for y in 0..frame.height {
                image.bytes.extend_from_slice(frame.row(y));
            }
            image.color_table = Some(&GRAY_RAMP);
        }
        channels => {
            tracing::warn!(channels, "pixel layout not handled for display");
            return DisplayImage::invalid();
        }
    }

    image
}
