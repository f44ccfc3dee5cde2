//! Interpolation pass planning and the per-scanline skip work.

use crate::cost::{CostModel, ScanlineContext};
use crate::lattice::{Lattice, SubRect, Window};
use crate::solver::solve_scanline;
use crate::util::math::offset_disagreement;
use crate::util::DpMatchResult;

/// One scanline targeted by an interpolation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RowPlan {
    pub row: usize,
    /// Nearest scanline above that was solved before the pass.
    pub prev: usize,
    /// Nearest solved scanline below; equals `prev` at the bottom border.
    pub next: usize,
}

impl RowPlan {
    pub(crate) fn has_both_neighbors(&self) -> bool {
        self.prev != self.next
    }
}

/// Plans the pass at `gap`: every unsolved scanline whose index is a multiple
/// of `gap`, paired with the nearest solved scanlines on each side.
///
/// For power-of-two strides this is `gap, 3 * gap, 5 * gap, ...` with
/// neighbors `row - gap` and `row + gap`.
pub(crate) fn plan_interpolation(solved: &[bool], gap: usize) -> Vec<RowPlan> {
    if gap == 0 {
        return Vec::new();
    }
    let n = solved.len();

    let mut below = vec![None; n];
    let mut last = None;
    for (row, &done) in solved.iter().enumerate() {
        if done {
            last = Some(row);
        }
        below[row] = last;
    }
    let mut above = vec![None; n];
    let mut last = None;
    for row in (0..n).rev() {
        if solved[row] {
            last = Some(row);
        }
        above[row] = last;
    }

    (0..n)
        .step_by(gap)
        .filter(|&row| !solved[row])
        .filter_map(|row| {
            let prev = below[row].or(above[row])?;
            let next = above[row].unwrap_or(prev);
            Some(RowPlan { row, prev, next })
        })
        .collect()
}

/// Counters produced by one interpolated scanline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RowOutcome {
    pub interpolated: usize,
    pub partial_solves: usize,
    pub recovered: usize,
}

/// Fills `current` from its solved neighbors.
///
/// Where both neighbors shift `x` by nearly the same amount the match is
/// copied from `prev`; elsewhere the span up to the next position where the
/// neighbors agree exactly is re-solved, anchored at the last known match on
/// the left and the agreed match on the right.
#[allow(clippy::too_many_arguments)]
pub(crate) fn interpolate_row<C>(
    lattice: &mut Lattice,
    model: &C,
    window: Window,
    threshold: i32,
    ctx: &ScanlineContext<'_>,
    prev: &[i32],
    next: &[i32],
    current: &mut [i32],
) -> DpMatchResult<RowOutcome>
where
    C: CostModel + ?Sized,
{
    let width = current.len();
    let last_y = lattice.height() - 1;
    let mut outcome = RowOutcome::default();

    let mut x = 0;
    while x < width {
        if offset_disagreement(prev[x], next[x], x) < threshold {
            current[x] = prev[x];
            outcome.interpolated += 1;
            x += 1;
            continue;
        }

        let sx = x.saturating_sub(1);
        let ex = (x + 1..width)
            .find(|&j| prev[j] == next[j])
            .unwrap_or(width - 1);

        let ey = match prev[ex] {
            m if m >= 0 && m == next[ex] => (m as usize).min(last_y),
            _ => last_y,
        };
        let sy = match current[sx] {
            m if x > 0 && m >= 0 && (m as usize) <= ey => m as usize,
            _ => 0,
        };

        let summary = solve_scanline(
            lattice,
            model,
            SubRect::new(sx, sy, ex, ey),
            window,
            ctx,
            current,
        )?;
        outcome.partial_solves += 1;
        outcome.recovered += summary.recovered;
        x = ex + 1;
    }

    Ok(outcome)
}
