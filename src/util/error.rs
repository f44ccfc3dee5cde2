//! Error types for dpmatch.

use thiserror::Error;

/// Result alias for dpmatch operations.
pub type DpMatchResult<T> = std::result::Result<T, DpMatchError>;

/// Errors that can occur when building or running the matching engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DpMatchError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Pixel buffer is shorter than `width * height`.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Paired images disagree on a dimension that must match.
    #[error("image size mismatch: {context} ({expected} vs {got})")]
    SizeMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    /// Index outside the valid range of a collection.
    #[error("{context} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// Scanline stride must be positive.
    #[error("skip must be at least 1, got {skip}")]
    InvalidSkip { skip: usize },
    /// Sub-rectangle violates `sx <= ex < X`, `sy <= ey < Y`.
    #[error("invalid sub-rectangle [{sx},{ex}]x[{sy},{ey}] for a {width}x{height} lattice")]
    InvalidRect {
        sx: usize,
        sy: usize,
        ex: usize,
        ey: usize,
        width: usize,
        height: usize,
    },
    /// The clamped search window does not contain a path to the target cell.
    #[error("scanline {column}: window [{sx},{ex}]x[{sy},{ey}] cannot reach ({x}, {y})")]
    UnreachableTarget {
        column: usize,
        sx: usize,
        sy: usize,
        ex: usize,
        ey: usize,
        x: usize,
        y: usize,
    },
    /// No move direction reproduces the minimum cost at a cell.
    #[error(
        "scanline {column}: inconsistent lattice at ({x}, {y}) in [{sx},{ex}]x[{sy},{ey}]"
    )]
    InconsistentLattice {
        column: usize,
        sx: usize,
        sy: usize,
        ex: usize,
        ey: usize,
        x: usize,
        y: usize,
    },
    /// A worker thread could not be started.
    #[error("failed to spawn worker {worker}: {reason}")]
    WorkerSpawn { worker: usize, reason: String },
    /// One or more tasks panicked since the previous barrier.
    #[error("{count} task(s) panicked in the worker pool")]
    WorkerPanicked { count: usize },
    /// Image decoding or encoding failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}
