//! Ready-made stereo and fusion pipelines on top of [`DpEngine`].

use crate::cost::{FusionConfig, FusionCost, StereoConfig, StereoCost};
use crate::engine::{DpEngine, DpReport, EngineConfig};
use crate::image::RgbImage;
use crate::render::{disparity_image, fuse_reference};
use crate::util::DpMatchResult;

/// Dense disparity from a rectified left/right pair.
///
/// Scanlines are image rows; each left pixel is matched to a right pixel at
/// most `max_disparity` columns to its left.
pub struct StereoMatcher {
    engine: DpEngine<StereoCost>,
    skip: usize,
    max_disparity: usize,
}

impl StereoMatcher {
    /// Builds the stereo cost and an engine banded to `max_disparity`.
    pub fn new(
        left: RgbImage,
        right: RgbImage,
        cfg: StereoConfig,
        workers: usize,
    ) -> DpMatchResult<Self> {
        let (width, reference_width, rows) = (left.width(), right.width(), left.height());
        let skip = cfg.skip;
        let max_disparity = cfg.max_disparity;
        let cost = StereoCost::new(left, right, cfg)?;
        let window = cost.window();
        let engine_cfg = EngineConfig {
            left_range: window.left_range,
            right_range: window.right_range,
            workers,
            ..EngineConfig::default()
        };
        let engine = DpEngine::new(cost, engine_cfg, width, reference_width, rows)?;
        Ok(Self {
            engine,
            skip,
            max_disparity,
        })
    }

    /// Matches every row.
    pub fn run(&mut self) -> DpMatchResult<DpReport> {
        self.engine.dp(self.skip)
    }

    /// Disparity of the last run as a gray image (unmatched pixels in red).
    pub fn disparity_image(&self) -> DpMatchResult<RgbImage> {
        disparity_image(&self.engine.match_patterns(), self.max_disparity)
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &DpEngine<StereoCost> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DpEngine<StereoCost> {
        &mut self.engine
    }
}

/// Warps a reference image onto the geometry of an input image row by row.
pub struct FusionMatcher {
    engine: DpEngine<FusionCost>,
    skip: usize,
}

impl FusionMatcher {
    /// `input` is the primary sequence set, `reference` the image that is resampled.
    pub fn new(
        input: RgbImage,
        reference: RgbImage,
        cfg: FusionConfig,
        workers: usize,
    ) -> DpMatchResult<Self> {
        let (width, reference_width, rows) = (input.width(), reference.width(), input.height());
        let skip = cfg.skip;
        let cost = FusionCost::new(input, reference, cfg)?;
        let engine_cfg = EngineConfig {
            workers,
            ..EngineConfig::default()
        };
        let engine = DpEngine::new(cost, engine_cfg, width, reference_width, rows)?;
        Ok(Self { engine, skip })
    }

    /// Matches every row.
    pub fn run(&mut self) -> DpMatchResult<DpReport> {
        self.engine.dp(self.skip)
    }

    /// Reference pixels rearranged along the last run's matches.
    pub fn fused_image(&self) -> DpMatchResult<RgbImage> {
        fuse_reference(&self.engine.match_patterns(), self.engine.model().reference())
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &DpEngine<FusionCost> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DpEngine<FusionCost> {
        &mut self.engine
    }
}
