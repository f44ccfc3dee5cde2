//! Low-level building blocks for custom scheduling.
//!
//! These expose the lattice, the single-scanline solver and the worker pool
//! behind [`DpEngine`](crate::DpEngine). Most users should prefer the engine
//! or the `StereoMatcher`/`FusionMatcher` pipelines.

pub use crate::image::edge::EdgeMap;
pub use crate::lattice::{Lattice, Node, PathDir, SubRect, Window};
pub use crate::pool::{host_parallelism, WorkerPool};
pub use crate::solver::{solve_scanline, PathSummary};
