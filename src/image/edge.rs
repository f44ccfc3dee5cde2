//! Sobel edge extraction on RGB images.
//!
//! The gradient magnitude sums squared horizontal and vertical Sobel responses
//! over the three channels, divides by 9 (integer) and takes the square root,
//! saturated at 255. Magnitudes are computed for `1 <= x < width - 2` and
//! `1 <= y < height - 2`; all other pixels keep magnitude 0 and are never
//! edges.

use crate::image::{Rgb, RgbImage};
use crate::trace::trace_span;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Per-pixel Sobel magnitude plus the threshold that marks edges.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeMap {
    magnitude: Vec<u8>,
    width: usize,
    height: usize,
    threshold: u8,
}

impl EdgeMap {
    /// Computes the edge map, row-parallel when the `rayon` feature is enabled.
    #[cfg(feature = "rayon")]
    pub fn sobel(img: &RgbImage, threshold: u8) -> Self {
        Self::sobel_par(img, threshold)
    }

    /// Computes the edge map, row-parallel when the `rayon` feature is enabled.
    #[cfg(not(feature = "rayon"))]
    pub fn sobel(img: &RgbImage, threshold: u8) -> Self {
        Self::sobel_scalar(img, threshold)
    }

    /// Single-threaded reference implementation.
    pub fn sobel_scalar(img: &RgbImage, threshold: u8) -> Self {
        let _span = trace_span!("sobel", parallel = false).entered();
        let width = img.width();
        let height = img.height();
        let mut magnitude = vec![0u8; width * height];
        for (y, row) in magnitude.chunks_mut(width).enumerate() {
            fill_row(img, y, row);
        }
        Self {
            magnitude,
            width,
            height,
            threshold,
        }
    }

    /// Row-parallel implementation (rayon).
    #[cfg(feature = "rayon")]
    pub fn sobel_par(img: &RgbImage, threshold: u8) -> Self {
        let _span = trace_span!("sobel", parallel = true).entered();
        let width = img.width();
        let height = img.height();
        let mut magnitude = vec![0u8; width * height];
        magnitude
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(img, y, row));
        Self {
            magnitude,
            width,
            height,
            threshold,
        }
    }

    /// Returns the map width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the map height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the edge threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Returns the gradient magnitude at `(x, y)`.
    pub fn magnitude(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.magnitude[y * self.width + x])
    }

    /// Returns true when the magnitude at `(x, y)` exceeds the threshold.
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        self.magnitude(x, y)
            .is_some_and(|value| value > self.threshold)
    }
}

fn fill_row(img: &RgbImage, y: usize, row: &mut [u8]) {
    let width = img.width();
    let height = img.height();
    if width < 3 || y < 1 || y + 2 >= height {
        return;
    }
    for x in 1..width - 2 {
        row[x] = sobel_at(img, x, y);
    }
}

fn sobel_at(img: &RgbImage, x: usize, y: usize) -> u8 {
    let channels: [fn(Rgb) -> i64; 3] = [|p| p.r as i64, |p| p.g as i64, |p| p.b as i64];
    let mut k = 0i64;
    for channel in channels {
        let p = |dx: usize, dy: usize| channel(img.at(x + dx - 1, y + dy - 1));
        let gx = (p(2, 0) - p(0, 0)) + (p(2, 2) - p(0, 2)) + 2 * (p(2, 1) - p(0, 1));
        let gy = (p(0, 2) - p(0, 0)) + (p(2, 2) - p(2, 0)) + 2 * (p(1, 2) - p(1, 0));
        k += gx * gx + gy * gy;
    }
    let k = k / 9;
    (k as f64).sqrt().min(255.0) as u8
}
