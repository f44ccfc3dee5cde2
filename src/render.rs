//! Turning match patterns back into images.

use crate::engine::UNMATCHED;
use crate::image::{Rgb, RgbImage};
use crate::util::{DpMatchError, DpMatchResult};

/// Color of positions without a match in [`disparity_image`].
pub const UNMATCHED_COLOR: Rgb = Rgb::new(255, 0, 0);

fn pattern_shape(patterns: &[Vec<i32>]) -> DpMatchResult<(usize, usize)> {
    let height = patterns.len();
    let width = patterns.first().map_or(0, Vec::len);
    if width == 0 || height == 0 {
        return Err(DpMatchError::InvalidDimensions { width, height });
    }
    if let Some(row) = patterns.iter().find(|row| row.len() != width) {
        return Err(DpMatchError::SizeMismatch {
            context: "match pattern length",
            expected: width,
            got: row.len(),
        });
    }
    Ok((width, height))
}

/// Renders `|match - x|` scaled so that `max_disparity` maps to white.
///
/// One output row per scanline; unmatched positions are drawn in
/// [`UNMATCHED_COLOR`].
pub fn disparity_image(patterns: &[Vec<i32>], max_disparity: usize) -> DpMatchResult<RgbImage> {
    let (width, height) = pattern_shape(patterns)?;
    let scale = 255.0 / max_disparity.max(1) as f64;
    let mut pixels = Vec::with_capacity(width * height);
    for row in patterns {
        pixels.extend(row.iter().enumerate().map(|(x, &m)| {
            if m == UNMATCHED {
                return UNMATCHED_COLOR;
            }
            let disparity = (m as f64 - x as f64).abs();
            Rgb::gray((disparity * scale).min(255.0) as u8)
        }));
    }
    RgbImage::new(pixels, width, height)
}

/// Resamples `reference` along the match patterns: output `(x, row)` is
/// `reference(match, row)`.
///
/// Unmatched or out-of-range positions stay black.
pub fn fuse_reference(patterns: &[Vec<i32>], reference: &RgbImage) -> DpMatchResult<RgbImage> {
    let (width, height) = pattern_shape(patterns)?;
    if height != reference.height() {
        return Err(DpMatchError::SizeMismatch {
            context: "reference height",
            expected: height,
            got: reference.height(),
        });
    }
    let mut out = RgbImage::filled(width, height, Rgb::default())?;
    for (row, pattern) in patterns.iter().enumerate() {
        for (x, &m) in pattern.iter().enumerate() {
            if m < 0 {
                continue;
            }
            if let Some(pixel) = reference.get(m as usize, row) {
                out.set(x, row, pixel)?;
            }
        }
    }
    Ok(out)
}
