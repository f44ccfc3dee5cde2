//! DP lattice storage and the geometry of a single matching call.
//!
//! A [`Lattice`] is a reusable `X * Y` node grid; one is kept per worker and
//! overwritten by every call, so the solver reinitializes each cell of the
//! active band before reading it.

use crate::util::{DpMatchError, DpMatchResult};

/// Move used to arrive at a lattice cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathDir {
    /// From `(x, y - 1)`.
    Vertical,
    /// From `(x - 1, y)`.
    Horizontal,
    /// From `(x - 1, y - 1)`.
    Diagonal,
    /// Not reached in the current call.
    None,
}

impl PathDir {
    /// Short lowercase name, used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            PathDir::Vertical => "vertical",
            PathDir::Horizontal => "horizontal",
            PathDir::Diagonal => "diagonal",
            PathDir::None => "none",
        }
    }
}

/// One lattice cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// Best path cost from the sub-rectangle origin.
    pub cost: f64,
    pub vertical_path_cost: f64,
    pub horizontal_path_cost: f64,
    pub diagonal_path_cost: f64,
    pub selected_path_dir: PathDir,
}

impl Node {
    /// Sentinel cost of an unreached cell.
    pub const MAX_COST: f64 = f64::INFINITY;

    pub(crate) const UNREACHED: Node = Node {
        cost: Self::MAX_COST,
        vertical_path_cost: Self::MAX_COST,
        horizontal_path_cost: Self::MAX_COST,
        diagonal_path_cost: Self::MAX_COST,
        selected_path_dir: PathDir::None,
    };
}

impl Default for Node {
    fn default() -> Self {
        Self::UNREACHED
    }
}

/// Scratch node grid sized to the full correspondence search space.
#[derive(Clone, Debug)]
pub struct Lattice {
    nodes: Vec<Node>,
    width: usize,
    height: usize,
}

impl Lattice {
    /// Allocates a `width * height` lattice (primary length x reference length).
    pub fn new(width: usize, height: usize) -> DpMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(DpMatchError::InvalidDimensions { width, height });
        }
        let len = width
            .checked_mul(height)
            .ok_or(DpMatchError::InvalidDimensions { width, height })?;
        Ok(Self {
            nodes: vec![Node::default(); len],
            width,
            height,
        })
    }

    /// Returns the primary-sequence length `X`.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the reference-sequence length `Y`.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the node at `(x, y)` if it is within bounds.
    pub fn node(&self, x: usize, y: usize) -> Option<&Node> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.nodes.get(y * self.width + x)
    }

    #[inline]
    pub(crate) fn at(&self, x: usize, y: usize) -> &Node {
        &self.nodes[y * self.width + x]
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, x: usize, y: usize) -> &mut Node {
        &mut self.nodes[y * self.width + x]
    }
}

/// Inclusive sub-rectangle `[sx, ex] x [sy, ey]` of the lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubRect {
    pub sx: usize,
    pub sy: usize,
    pub ex: usize,
    pub ey: usize,
}

impl SubRect {
    /// Creates a sub-rectangle from its start and end corners.
    pub fn new(sx: usize, sy: usize, ex: usize, ey: usize) -> Self {
        Self { sx, sy, ex, ey }
    }

    /// The whole `width x height` lattice.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width.saturating_sub(1), height.saturating_sub(1))
    }

    /// Checks `sx <= ex < width` and `sy <= ey < height`.
    pub fn validate(&self, width: usize, height: usize) -> DpMatchResult<()> {
        if self.sx > self.ex || self.ex >= width || self.sy > self.ey || self.ey >= height {
            return Err(DpMatchError::InvalidRect {
                sx: self.sx,
                sy: self.sy,
                ex: self.ex,
                ey: self.ey,
                width,
                height,
            });
        }
        Ok(())
    }
}

/// Search band around the diagonal `y = x`.
///
/// A cell `(x, y)` is inside the band when `x - left_range <= y <= x + right_range`,
/// i.e. the primary position may match up to `left_range` reference cells
/// before it and `right_range` cells after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub left_range: usize,
    pub right_range: usize,
}

impl Window {
    /// Creates a window from its two half-widths.
    pub fn new(left_range: usize, right_range: usize) -> Self {
        Self {
            left_range,
            right_range,
        }
    }

    /// Lowest reference index inside the band at primary position `x`.
    #[inline]
    pub fn min_y(&self, x: usize) -> usize {
        x.saturating_sub(self.left_range)
    }

    /// Highest reference index inside the band at primary position `x`.
    #[inline]
    pub fn max_y(&self, x: usize) -> usize {
        x.saturating_add(self.right_range)
    }

    /// Lowest primary index inside the band at reference position `y`.
    #[inline]
    pub fn min_x(&self, y: usize) -> usize {
        y.saturating_sub(self.right_range)
    }

    /// Highest primary index inside the band at reference position `y`.
    #[inline]
    pub fn max_x(&self, y: usize) -> usize {
        y.saturating_add(self.left_range)
    }

    /// Returns true when `(x, y)` lies inside the band.
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        y >= self.min_y(x) && y <= self.max_y(x)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(40, 40)
    }
}

#[cfg(test)]
mod tests {
    use super::{Lattice, PathDir, SubRect, Window};
    use crate::util::DpMatchError;

    #[test]
    fn window_band_edges() {
        let w = Window::new(2, 1);
        assert!(w.contains(5, 3));
        assert!(!w.contains(5, 2));
        assert!(w.contains(5, 6));
        assert!(!w.contains(5, 7));
        assert_eq!(w.min_y(1), 0);
        assert_eq!(w.min_x(4), 3);
        assert_eq!(w.max_x(4), 6);
    }

    #[test]
    fn sub_rect_validation() {
        assert!(SubRect::new(0, 0, 3, 3).validate(4, 4).is_ok());
        assert_eq!(
            SubRect::new(2, 0, 1, 3).validate(4, 4),
            Err(DpMatchError::InvalidRect {
                sx: 2,
                sy: 0,
                ex: 1,
                ey: 3,
                width: 4,
                height: 4,
            })
        );
        assert!(SubRect::new(0, 0, 3, 4).validate(4, 4).is_err());
    }

    #[test]
    fn fresh_lattice_is_unreached() {
        let lattice = Lattice::new(3, 2).unwrap();
        let node = lattice.node(2, 1).unwrap();
        assert_eq!(node.selected_path_dir, PathDir::None);
        assert!(node.cost.is_infinite());
        assert!(lattice.node(3, 0).is_none());
        assert!(Lattice::new(0, 2).is_err());
    }
}
