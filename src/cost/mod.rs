//! Cost models plugged into the DP engine.
//!
//! The engine only asks a model for a scalar local cost per lattice cell and,
//! optionally, a per-direction adjustment of that cost. Closures of the form
//! `Fn(x, y, &ScanlineContext) -> f64` implement [`CostModel`] with identity
//! adjustments.

pub mod fusion;
pub mod stereo;

pub use fusion::{FusionConfig, FusionCost};
pub use stereo::{StereoConfig, StereoCost};

/// A scanline solved before the current pass, used as context for the current one.
#[derive(Clone, Copy, Debug)]
pub struct Neighbor<'a> {
    /// Scanline index of the neighbor.
    pub row: usize,
    /// Its match pattern (length `X`).
    pub pattern: &'a [i32],
}

/// Per-call context handed to the cost model.
#[derive(Clone, Copy, Debug)]
pub struct ScanlineContext<'a> {
    /// Scanline being matched.
    pub column: usize,
    /// Distance to the solved scanlines of the current scheduling pass.
    pub skip: usize,
    /// Nearest solved scanline above, when both neighbors exist.
    pub prev: Option<Neighbor<'a>>,
    /// Nearest solved scanline below, when both neighbors exist.
    pub next: Option<Neighbor<'a>>,
}

impl<'a> ScanlineContext<'a> {
    /// Context without neighbor information (full passes).
    pub fn isolated(column: usize, skip: usize) -> Self {
        Self {
            column,
            skip,
            prev: None,
            next: None,
        }
    }

    /// Context with both solved neighbors available.
    pub fn between(column: usize, skip: usize, prev: Neighbor<'a>, next: Neighbor<'a>) -> Self {
        Self {
            column,
            skip,
            prev: Some(prev),
            next: Some(next),
        }
    }
}

/// Local cost and directional bias for candidate correspondences.
pub trait CostModel: Send + Sync {
    /// Cost of matching primary position `x` to reference position `y`.
    fn local_cost(&self, x: usize, y: usize, ctx: &ScanlineContext<'_>) -> f64;

    /// Cost of arriving at `(x, y)` from `(x, y - 1)`.
    fn vertical_cost(&self, _x: usize, _y: usize, _column: usize, cost: f64) -> f64 {
        cost
    }

    /// Cost of arriving at `(x, y)` from `(x - 1, y)`.
    fn horizontal_cost(&self, _x: usize, _y: usize, _column: usize, cost: f64) -> f64 {
        cost
    }

    /// Cost of arriving at `(x, y)` from `(x - 1, y - 1)`.
    fn diagonal_cost(&self, _x: usize, _y: usize, _column: usize, cost: f64) -> f64 {
        cost
    }
}

impl<F> CostModel for F
where
    F: Fn(usize, usize, &ScanlineContext<'_>) -> f64 + Send + Sync,
{
    fn local_cost(&self, x: usize, y: usize, ctx: &ScanlineContext<'_>) -> f64 {
        self(x, y, ctx)
    }
}
