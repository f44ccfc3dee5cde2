//! DpMatch is a scanline dynamic-programming correspondence engine.
//!
//! Every scanline of a primary image is matched against the same scanline of
//! a reference image by a shortest path through a banded `X * Y` lattice. A
//! worker pool solves scanlines in parallel, each worker with its own scratch
//! lattice, and a skip scheduler solves only every `skip`-th scanline in full
//! before interpolating the rest from their solved neighbors.
//!
//! Cost models plug in through [`CostModel`]; [`StereoCost`] (disparity from a
//! rectified pair) and [`FusionCost`] (resampling a reference onto an input)
//! are provided, with [`StereoMatcher`] and [`FusionMatcher`] wiring them to
//! the engine. Sobel edge extraction runs row-parallel with the `rayon`
//! feature; `image-io` adds file loading and `tracing` adds pass spans.

pub mod cost;
pub mod engine;
pub mod image;
pub mod lattice;
pub mod lowlevel;
pub mod matcher;
pub mod pool;
pub mod render;
pub mod solver;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use image::io;

pub use cost::{
    CostModel, FusionConfig, FusionCost, Neighbor, ScanlineContext, StereoConfig, StereoCost,
};
pub use engine::{DpEngine, DpReport, EngineConfig, UNMATCHED};
pub use image::{Rgb, RgbImage};
pub use lattice::Window;
pub use matcher::{FusionMatcher, StereoMatcher};
pub use render::{disparity_image, fuse_reference};
pub use util::{DpMatchError, DpMatchResult};
