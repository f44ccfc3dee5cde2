//! RGB pixels and the owned row-major image the cost models read scanlines from.
//!
//! Row `y` of an image is scanline `y` for the engine; column indices are the
//! positions matched along it.

use crate::util::{DpMatchError, DpMatchResult};

pub mod edge;
#[cfg(feature = "image-io")]
pub mod io;

/// 8-bit RGB pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Creates a pixel from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Creates a gray pixel with all channels set to `value`.
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }
}

/// Owned contiguous RGB image.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbImage {
    data: Vec<Rgb>,
    width: usize,
    height: usize,
}

impl RgbImage {
    /// Creates an image from row-major pixels.
    pub fn new(data: Vec<Rgb>, width: usize, height: usize) -> DpMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(DpMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(DpMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(DpMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(DpMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image with every pixel set to `fill`.
    pub fn filled(width: usize, height: usize, fill: Rgb) -> DpMatchResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(DpMatchError::InvalidDimensions { width, height })?;
        Self::new(vec![fill; len], width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major pixel buffer.
    pub fn pixels(&self) -> &[Rgb] {
        &self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Pixel read for coordinates the caller has already bounds-checked.
    #[inline]
    pub(crate) fn at(&self, x: usize, y: usize) -> Rgb {
        self.data[y * self.width + x]
    }

    /// Writes the pixel at `(x, y)`; out-of-bounds writes are rejected.
    pub fn set(&mut self, x: usize, y: usize, value: Rgb) -> DpMatchResult<()> {
        if x >= self.width {
            return Err(DpMatchError::IndexOutOfBounds {
                index: x,
                len: self.width,
                context: "column",
            });
        }
        if y >= self.height {
            return Err(DpMatchError::IndexOutOfBounds {
                index: y,
                len: self.height,
                context: "row",
            });
        }
        self.data[y * self.width + x] = value;
        Ok(())
    }
}
