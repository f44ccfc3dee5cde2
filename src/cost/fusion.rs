//! Fusion cost between a sensor image (primary) and a reference image.
//!
//! The reference carries accurate geometry (for example a projected range
//! scan) and the input carries appearance. A match is cheap when both red
//! channels change the same way at the two positions and, once the
//! neighboring scanlines are solved, when it agrees with how the scanline
//! above was stretched.

use crate::cost::{CostModel, ScanlineContext};
use crate::image::RgbImage;
use crate::util::math::gaussian_dissimilarity;
use crate::util::{DpMatchError, DpMatchResult};

/// Parameters of the fusion cost model.
#[derive(Clone, Debug)]
pub struct FusionConfig {
    /// Width of the gradient dissimilarity term.
    pub sigma_c: f64,
    /// Width of the neighbor glue term.
    pub sigma_g: f64,
    /// Scanline stride of the first scheduling pass.
    pub skip: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            sigma_c: 0.01,
            sigma_g: 0.1,
            skip: 8,
        }
    }
}

/// Gradient agreement cost with a glue term toward solved neighbors.
pub struct FusionCost {
    input: RgbImage,
    reference: RgbImage,
    cfg: FusionConfig,
}

impl FusionCost {
    /// Checks that both images share a height and the sigmas are positive.
    pub fn new(input: RgbImage, reference: RgbImage, cfg: FusionConfig) -> DpMatchResult<Self> {
        if input.height() != reference.height() {
            return Err(DpMatchError::SizeMismatch {
                context: "fusion image height",
                expected: input.height(),
                got: reference.height(),
            });
        }
        if input.width() < 2 || reference.width() < 2 {
            return Err(DpMatchError::InvalidInput(
                "fusion images must be at least 2 pixels wide",
            ));
        }
        if !(cfg.sigma_c > 0.0 && cfg.sigma_g > 0.0) {
            return Err(DpMatchError::InvalidInput("fusion sigmas must be positive"));
        }
        Ok(Self {
            input,
            reference,
            cfg,
        })
    }

    /// Returns the configuration the model was built with.
    pub fn config(&self) -> &FusionConfig {
        &self.cfg
    }

    /// Returns the input (primary) image.
    pub fn input(&self) -> &RgbImage {
        &self.input
    }

    /// Returns the reference image that gets resampled.
    pub fn reference(&self) -> &RgbImage {
        &self.reference
    }

    fn glue(&self, y: usize, ctx: &ScanlineContext<'_>) -> f64 {
        let (Some(prev), Some(_)) = (ctx.prev, ctx.next) else {
            return 0.0;
        };
        let Some(&matched) = prev.pattern.get(y) else {
            return 0.0;
        };
        let length = (self.input.width() * self.reference.width()) as f64;
        let stretch = (matched as f64 - y as f64) / length;

        let above = self.reference.at(y, prev.row).r as f64;
        let here = self.reference.at(y, ctx.column).r as f64;
        let similarity = 1.0 - (above - here).abs() / 255.0;

        (stretch * similarity).abs()
    }
}

/// Red-channel finite difference at `x`, backward except at the first pixel.
fn red_gradient(img: &RgbImage, x: usize, row: usize) -> f64 {
    let here = img.at(x, row).r as f64;
    let other = if x == 0 {
        img.at(1, row).r as f64
    } else {
        img.at(x - 1, row).r as f64
    };
    (here - other) / 255.0
}

impl CostModel for FusionCost {
    fn local_cost(&self, x: usize, y: usize, ctx: &ScanlineContext<'_>) -> f64 {
        let f = (red_gradient(&self.input, x, ctx.column)
            - red_gradient(&self.reference, y, ctx.column))
        .abs();
        let g = self.glue(y, ctx);
        gaussian_dissimilarity(f, self.cfg.sigma_c) + gaussian_dissimilarity(g, self.cfg.sigma_g)
    }

    fn vertical_cost(&self, x: usize, y: usize, _column: usize, cost: f64) -> f64 {
        cost + self.stretch_bias(x, y)
    }

    fn horizontal_cost(&self, x: usize, y: usize, _column: usize, cost: f64) -> f64 {
        cost + self.stretch_bias(x, y)
    }
}

impl FusionCost {
    #[inline]
    fn stretch_bias(&self, x: usize, y: usize) -> f64 {
        let bias = (x as f64 - y as f64) / self.input.width() as f64;
        bias * bias
    }
}
