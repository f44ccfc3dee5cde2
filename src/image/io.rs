//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{Rgb, RgbImage};
use crate::util::{DpMatchError, DpMatchResult};
use std::path::Path;

/// Creates an owned RGB image from an `image` crate buffer.
pub fn rgb_from_image(img: &image::RgbImage) -> DpMatchResult<RgbImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let pixels = img
        .pixels()
        .map(|p| Rgb::new(p.0[0], p.0[1], p.0[2]))
        .collect();
    RgbImage::new(pixels, width, height)
}

/// Creates an owned RGB image from a dynamic image.
pub fn rgb_from_dynamic_image(img: &image::DynamicImage) -> DpMatchResult<RgbImage> {
    rgb_from_image(&img.to_rgb8())
}

/// Loads an image from disk and converts it to RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> DpMatchResult<RgbImage> {
    let img = image::open(path).map_err(|err| DpMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    rgb_from_dynamic_image(&img)
}

/// Saves an RGB image; the format follows the file extension.
pub fn save_rgb_image<P: AsRef<Path>>(path: P, img: &RgbImage) -> DpMatchResult<()> {
    let width = u32::try_from(img.width()).map_err(|_| DpMatchError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let height = u32::try_from(img.height()).map_err(|_| DpMatchError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let raw: Vec<u8> = img.pixels().iter().flat_map(|p| [p.r, p.g, p.b]).collect();
    let buffer = image::RgbImage::from_raw(width, height, raw).ok_or(
        DpMatchError::BufferTooSmall {
            needed: img.width() * img.height() * 3,
            got: img.pixels().len() * 3,
        },
    )?;
    buffer.save(path).map_err(|err| DpMatchError::ImageIo {
        reason: err.to_string(),
    })
}
