//! Windowed shortest-path solver for one scanline.
//!
//! [`solve_scanline`] primes every in-band cell of a sub-rectangle with the
//! cost model, runs the three-move recurrence in row-major order, and walks
//! the selected directions back from the end corner, writing the matched
//! reference index for every visited primary position.
//!
//! The start corner is clamped into the band at `sx` and the end corner into
//! the band at `ex`. Boundary rows are initialized relative to the clamped
//! start corner, so partial sub-rectangles behave like full ones.

use crate::cost::{CostModel, ScanlineContext};
use crate::lattice::{Lattice, Node, PathDir, SubRect, Window};
use crate::trace::trace_warn;
use crate::util::{DpMatchError, DpMatchResult};

/// Outcome of a successful matching call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSummary {
    /// Sub-rectangle after clamping the corners into the band.
    pub rect: SubRect,
    /// Number of cells visited by the backtrace, origin included.
    pub cells: usize,
    /// Path cost at the end corner.
    pub cost: f64,
    /// Cells where the backtrace found no recorded direction and had to guess.
    pub recovered: usize,
}

/// Solves one sub-rectangle of the lattice and writes the path into `pattern`.
///
/// `pattern` is the match pattern of scanline `ctx.column` (length `X`); only
/// positions `sx..=ex` are written, and nothing is written when an error is
/// returned.
pub fn solve_scanline<C>(
    lattice: &mut Lattice,
    model: &C,
    rect: SubRect,
    window: Window,
    ctx: &ScanlineContext<'_>,
    pattern: &mut [i32],
) -> DpMatchResult<PathSummary>
where
    C: CostModel + ?Sized,
{
    let width = lattice.width();
    let height = lattice.height();
    rect.validate(width, height)?;
    if pattern.len() != width {
        return Err(DpMatchError::SizeMismatch {
            context: "match pattern length",
            expected: width,
            got: pattern.len(),
        });
    }

    let column = ctx.column;
    let SubRect { sx, ex, .. } = rect;
    let sy = rect.sy.clamp(window.min_y(sx), window.max_y(sx));
    let ey = rect.ey.clamp(window.min_y(ex), window.max_y(ex));
    if sy > ey || ey >= height {
        return Err(DpMatchError::UnreachableTarget {
            column,
            sx,
            sy,
            ex,
            ey,
            x: ex,
            y: ey.min(height - 1),
        });
    }
    let clamped = SubRect::new(sx, sy, ex, ey);

    let row_span = |y: usize| (sx.max(window.min_x(y)), ex.min(window.max_x(y)));

    // Cost priming; also wipes whatever a previous call left in the band.
    for y in sy..=ey {
        let (x0, x1) = row_span(y);
        if x0 > x1 {
            continue;
        }
        for x in x0..=x1 {
            let cost = model.local_cost(x, y, ctx);
            *lattice.at_mut(x, y) = Node {
                cost: Node::MAX_COST,
                vertical_path_cost: model.vertical_cost(x, y, column, cost),
                horizontal_path_cost: model.horizontal_cost(x, y, column, cost),
                diagonal_path_cost: model.diagonal_cost(x, y, column, cost),
                selected_path_dir: PathDir::None,
            };
        }
    }

    lattice.at_mut(sx, sy).cost = 0.0;

    for x in sx + 1..=ex.min(window.max_x(sy)) {
        let prev = lattice.at(x - 1, sy).cost;
        let node = lattice.at_mut(x, sy);
        node.cost = node.horizontal_path_cost + prev;
        node.selected_path_dir = PathDir::Horizontal;
    }

    for y in sy + 1..=ey.min(window.max_y(sx)) {
        let prev = lattice.at(sx, y - 1).cost;
        let node = lattice.at_mut(sx, y);
        node.cost = node.vertical_path_cost + prev;
        node.selected_path_dir = PathDir::Vertical;
    }

    for y in sy + 1..=ey {
        let (x0, x1) = row_span(y);
        let x0 = x0.max(sx + 1);
        if x0 > x1 {
            continue;
        }
        for x in x0..=x1 {
            let up = if window.contains(x, y - 1) {
                lattice.at(x, y - 1).cost
            } else {
                Node::MAX_COST
            };
            let left = if window.contains(x - 1, y) {
                lattice.at(x - 1, y).cost
            } else {
                Node::MAX_COST
            };
            let diag = lattice.at(x - 1, y - 1).cost;

            let node = lattice.at_mut(x, y);
            let v_cost = node.vertical_path_cost + up;
            let h_cost = node.horizontal_path_cost + left;
            let d_cost = node.diagonal_path_cost + diag;

            // First smallest in (v, h, d) order; NaN in `v` poisons the minimum.
            let mut best = v_cost;
            if h_cost < best {
                best = h_cost;
            }
            if d_cost < best {
                best = d_cost;
            }
            node.cost = best;

            // Ties resolve toward diagonal, then vertical, then horizontal.
            node.selected_path_dir = if best == d_cost {
                PathDir::Diagonal
            } else if best == v_cost {
                PathDir::Vertical
            } else if best == h_cost {
                PathDir::Horizontal
            } else {
                return Err(DpMatchError::InconsistentLattice {
                    column,
                    sx,
                    sy,
                    ex,
                    ey,
                    x,
                    y,
                });
            };
        }
    }

    let cost = lattice.at(ex, ey).cost;
    if cost.is_nan() {
        return Err(DpMatchError::InconsistentLattice {
            column,
            sx,
            sy,
            ex,
            ey,
            x: ex,
            y: ey,
        });
    }
    if cost.is_infinite() {
        return Err(DpMatchError::UnreachableTarget {
            column,
            sx,
            sy,
            ex,
            ey,
            x: ex,
            y: ey,
        });
    }

    let (cells, recovered) = backtrace(lattice, clamped, column, pattern);
    Ok(PathSummary {
        rect: clamped,
        cells,
        cost,
        recovered,
    })
}

fn backtrace(lattice: &Lattice, rect: SubRect, column: usize, pattern: &mut [i32]) -> (usize, usize) {
    let SubRect { sx, sy, ex, ey } = rect;
    let (mut x, mut y) = (ex, ey);
    let mut cells = 0;
    let mut recovered = 0;

    while x > sx || y > sy {
        pattern[x] = y as i32;
        cells += 1;
        match lattice.at(x, y).selected_path_dir {
            PathDir::Vertical if y > sy => y -= 1,
            PathDir::Horizontal if x > sx => x -= 1,
            PathDir::Diagonal if x > sx && y > sy => {
                x -= 1;
                y -= 1;
            }
            dir => {
                trace_warn!(
                    "malformed_backtrace",
                    column = column,
                    x = x,
                    y = y,
                    sx = sx,
                    sy = sy,
                    dir = dir.as_str(),
                );
                recovered += 1;
                if y > sy {
                    y -= 1;
                } else {
                    x -= 1;
                }
            }
        }
    }
    pattern[sx] = sy as i32;
    cells += 1;

    (cells, recovered)
}

#[cfg(test)]
mod tests {
    use super::{backtrace, solve_scanline};
    use crate::cost::ScanlineContext;
    use crate::lattice::{Lattice, PathDir, SubRect, Window};
    use crate::util::DpMatchError;

    fn zero(_x: usize, _y: usize, _ctx: &ScanlineContext<'_>) -> f64 {
        0.0
    }

    #[test]
    fn zero_cost_walks_the_diagonal() {
        let mut lattice = Lattice::new(4, 4).unwrap();
        let mut pattern = vec![-1; 4];
        let ctx = ScanlineContext::isolated(0, 1);
        let summary = solve_scanline(
            &mut lattice,
            &zero,
            SubRect::full(4, 4),
            Window::new(3, 3),
            &ctx,
            &mut pattern,
        )
        .unwrap();
        assert_eq!(pattern, vec![0, 1, 2, 3]);
        assert_eq!(summary.cells, 4);
        assert_eq!(summary.cost, 0.0);
        assert_eq!(summary.recovered, 0);
    }

    #[test]
    fn stale_lattice_contents_do_not_leak() {
        let mut lattice = Lattice::new(6, 6).unwrap();
        let ctx = ScanlineContext::isolated(0, 1);
        let shifted = |x: usize, y: usize, _ctx: &ScanlineContext<'_>| {
            if y + 1 == x || (x == 0 && y == 0) { 0.0 } else { 1.0 }
        };
        let mut first = vec![-1; 6];
        solve_scanline(
            &mut lattice,
            &shifted,
            SubRect::full(6, 6),
            Window::new(6, 6),
            &ctx,
            &mut first,
        )
        .unwrap();

        let mut fresh_lattice = Lattice::new(6, 6).unwrap();
        let mut reused = vec![-1; 6];
        let mut fresh = vec![-1; 6];
        solve_scanline(&mut lattice, &zero, SubRect::full(6, 6), Window::new(1, 1), &ctx, &mut reused)
            .unwrap();
        solve_scanline(
            &mut fresh_lattice,
            &zero,
            SubRect::full(6, 6),
            Window::new(1, 1),
            &ctx,
            &mut fresh,
        )
        .unwrap();
        assert_eq!(reused, fresh);
    }

    #[test]
    fn nan_cost_is_an_internal_error() {
        let mut lattice = Lattice::new(3, 3).unwrap();
        let mut pattern = vec![-1; 3];
        let ctx = ScanlineContext::isolated(7, 1);
        let poisoned = |x: usize, y: usize, _ctx: &ScanlineContext<'_>| {
            if x == 1 && y == 0 { f64::NAN } else { 0.0 }
        };
        let err = solve_scanline(
            &mut lattice,
            &poisoned,
            SubRect::full(3, 3),
            Window::new(3, 3),
            &ctx,
            &mut pattern,
        )
        .unwrap_err();
        assert!(matches!(err, DpMatchError::InconsistentLattice { column: 7, .. }));
        assert_eq!(pattern, vec![-1; 3]);
    }

    #[test]
    fn unreachable_target_is_reported() {
        // Primary much longer than reference with a narrow band.
        let mut lattice = Lattice::new(10, 3).unwrap();
        let mut pattern = vec![-1; 10];
        let ctx = ScanlineContext::isolated(0, 1);
        let err = solve_scanline(
            &mut lattice,
            &zero,
            SubRect::full(10, 3),
            Window::new(2, 2),
            &ctx,
            &mut pattern,
        )
        .unwrap_err();
        assert!(matches!(err, DpMatchError::UnreachableTarget { .. }));
    }

    #[test]
    fn backtrace_recovers_from_missing_directions() {
        // A lattice that was never solved: every direction is None.
        let lattice = Lattice::new(3, 3).unwrap();
        assert_eq!(lattice.node(2, 2).unwrap().selected_path_dir, PathDir::None);
        let mut pattern = vec![-1; 3];
        let (cells, recovered) = backtrace(&lattice, SubRect::full(3, 3), 0, &mut pattern);
        // y is decremented first, then x.
        assert_eq!(pattern, vec![0, 0, 0]);
        assert_eq!(cells, 5);
        assert_eq!(recovered, 4);
    }
}
