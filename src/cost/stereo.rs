//! Stereo correspondence cost between a left (primary) and right (reference) image.
//!
//! Scanlines are image rows. The local cost is the RGB distance between the
//! two pixels, aggregated vertically along edge pixels of the left image so
//! that matches on textured structure are supported by the rows around them.

use crate::cost::{CostModel, ScanlineContext};
use crate::image::edge::EdgeMap;
use crate::image::RgbImage;
use crate::lattice::Window;
use crate::util::math::rgb_distance;
use crate::util::{DpMatchError, DpMatchResult};

/// Parameters of the stereo cost model.
#[derive(Clone, Debug)]
pub struct StereoConfig {
    /// Largest expected disparity; the search band is `[x - max_disparity, x]`.
    pub max_disparity: usize,
    /// Scale of the squared cost on diagonal moves.
    pub weight: f64,
    /// Number of rows (including the scanline itself) aggregated on each side.
    pub row_width: usize,
    /// Sobel magnitude above which a left pixel counts as an edge.
    pub edge_threshold: u8,
    /// Scanline stride of the first scheduling pass.
    pub skip: usize,
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self {
            max_disparity: 100,
            weight: 13.0,
            row_width: 4,
            edge_threshold: 80,
            skip: 1,
        }
    }
}

/// Edge-aggregated color cost for rectified stereo pairs.
pub struct StereoCost {
    left: RgbImage,
    right: RgbImage,
    edges: EdgeMap,
    cfg: StereoConfig,
}

impl StereoCost {
    /// Builds the model and extracts the left image's edges.
    pub fn new(left: RgbImage, right: RgbImage, cfg: StereoConfig) -> DpMatchResult<Self> {
        if left.height() != right.height() {
            return Err(DpMatchError::SizeMismatch {
                context: "stereo image height",
                expected: left.height(),
                got: right.height(),
            });
        }
        if cfg.row_width == 0 {
            return Err(DpMatchError::InvalidInput("row_width must be at least 1"));
        }
        let edges = EdgeMap::sobel(&left, cfg.edge_threshold);
        Ok(Self {
            left,
            right,
            edges,
            cfg,
        })
    }

    /// One-sided band: a left pixel matches at most `max_disparity` pixels to its left.
    pub fn window(&self) -> Window {
        Window::new(self.cfg.max_disparity, 0)
    }

    /// Returns the configuration the model was built with.
    pub fn config(&self) -> &StereoConfig {
        &self.cfg
    }

    /// Returns the left (primary) image.
    pub fn left(&self) -> &RgbImage {
        &self.left
    }

    /// Returns the right (reference) image.
    pub fn right(&self) -> &RgbImage {
        &self.right
    }

    /// Returns the edge map extracted from the left image.
    pub fn edges(&self) -> &EdgeMap {
        &self.edges
    }

    #[inline]
    fn distance(&self, x: usize, y: usize, row: usize) -> f64 {
        rgb_distance(self.left.at(x, row), self.right.at(y, row))
    }
}

impl CostModel for StereoCost {
    fn local_cost(&self, x: usize, y: usize, ctx: &ScanlineContext<'_>) -> f64 {
        let column = ctx.column;
        let rows = self.left.height();
        let mut total = self.distance(x, y, column);
        let mut count = 1usize;

        for i in 1..self.cfg.row_width {
            let row = column + i;
            if row >= rows || !self.edges.is_edge(x, row) {
                break;
            }
            total += self.distance(x, y, row);
            count += 1;
        }
        for i in 1..self.cfg.row_width {
            let Some(row) = column.checked_sub(i) else {
                break;
            };
            if !self.edges.is_edge(x, row) {
                break;
            }
            total += self.distance(x, y, row);
            count += 1;
        }

        total / count as f64
    }

    fn diagonal_cost(&self, _x: usize, _y: usize, _column: usize, cost: f64) -> f64 {
        self.cfg.weight * cost * cost
    }
}

#[cfg(test)]
mod tests {
    use super::{StereoConfig, StereoCost};
    use crate::cost::{CostModel, ScanlineContext};
    use crate::image::{Rgb, RgbImage};
    use crate::lattice::Window;
    use crate::util::DpMatchError;

    fn ramp(width: usize, height: usize) -> RgbImage {
        let data = (0..height)
            .flat_map(|_| (0..width).map(|x| Rgb::gray((x * 20) as u8)))
            .collect();
        RgbImage::new(data, width, height).unwrap()
    }

    #[test]
    fn rejects_mismatched_heights() {
        let err = StereoCost::new(ramp(8, 4), ramp(8, 5), StereoConfig::default())
            .err()
            .unwrap();
        assert_eq!(
            err,
            DpMatchError::SizeMismatch {
                context: "stereo image height",
                expected: 4,
                got: 5,
            }
        );
    }

    #[test]
    fn identical_pixels_cost_nothing() {
        let cost = StereoCost::new(ramp(8, 4), ramp(8, 4), StereoConfig::default()).unwrap();
        let ctx = ScanlineContext::isolated(2, 1);
        assert_eq!(cost.local_cost(3, 3, &ctx), 0.0);
        let black_white = cost.local_cost(0, 7, &ctx);
        assert!((black_white - (3.0f64 * 140.0 * 140.0).sqrt() / 255.0).abs() < 1e-12);
    }

    #[test]
    fn diagonal_moves_are_weighted() {
        let cfg = StereoConfig {
            weight: 2.0,
            max_disparity: 7,
            ..StereoConfig::default()
        };
        let cost = StereoCost::new(ramp(8, 4), ramp(8, 4), cfg).unwrap();
        assert_eq!(cost.diagonal_cost(1, 1, 0, 0.5), 0.5);
        assert_eq!(cost.vertical_cost(1, 1, 0, 0.5), 0.5);
        assert_eq!(cost.window(), Window::new(7, 0));
    }

    #[test]
    fn aggregation_follows_edge_rows() {
        // A vertical step edge in the left image; rows differ in the right one.
        let (width, height) = (8usize, 8usize);
        let left: Vec<Rgb> = (0..height)
            .flat_map(|_| (0..width).map(|x| Rgb::gray(if x < 4 { 0 } else { 255 })))
            .collect();
        let right: Vec<Rgb> = (0..height)
            .flat_map(|y| (0..width).map(move |_| Rgb::gray(if y == 4 { 255 } else { 0 })))
            .collect();
        let left = RgbImage::new(left, width, height).unwrap();
        let right = RgbImage::new(right, width, height).unwrap();

        let isolated = StereoCost::new(
            left.clone(),
            right.clone(),
            StereoConfig {
                row_width: 1,
                ..StereoConfig::default()
            },
        )
        .unwrap();
        let aggregated = StereoCost::new(left, right, StereoConfig::default()).unwrap();
        assert!(aggregated.edges().is_edge(3, 4));

        let ctx = ScanlineContext::isolated(4, 1);
        // Left (3, 4) is black, right (0, 4) is white: full distance on the scanline.
        let alone = isolated.local_cost(3, 0, &ctx);
        let averaged = aggregated.local_cost(3, 0, &ctx);
        assert!((alone - 3f64.sqrt()).abs() < 1e-12);
        assert!(averaged < alone);
        assert!(averaged > 0.0);
    }
}
