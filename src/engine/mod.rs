//! Scanline DP engine: full passes, interpolation passes and their barriers.
//!
//! [`DpEngine::dp`] first solves every `skip`-th scanline over the whole
//! lattice. It then halves the stride until it reaches 1, filling the
//! scanlines halfway between already solved ones from their neighbors. Each
//! pass is submitted to the worker pool and completes at a barrier before the
//! next pass reads its results.
//!
//! Every worker owns one scratch [`Lattice`], selected by the worker id the
//! pool passes to the task. Match patterns live in per-scanline locks; a task
//! copies its neighbor scanlines out before it locks the scanline it writes.

mod patterns;
mod schedule;

pub use patterns::UNMATCHED;

use crate::cost::{CostModel, Neighbor, ScanlineContext};
use crate::lattice::{Lattice, SubRect, Window};
use crate::pool::{host_parallelism, WorkerPool};
use crate::solver::solve_scanline;
use crate::trace::{trace_event, trace_span};
use crate::util::{DpMatchError, DpMatchResult};
use parking_lot::{Mutex, RwLockReadGuard, RwLockWriteGuard};
use patterns::MatchPatterns;
use schedule::{interpolate_row, plan_interpolation, RowPlan};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Engine parameters independent of the cost model.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Band half-width below the diagonal (`y >= x - left_range`).
    pub left_range: usize,
    /// Band half-width above the diagonal (`y <= x + right_range`).
    pub right_range: usize,
    /// Neighbor offset disagreement below which a match is copied instead of solved.
    pub interpolation_threshold: i32,
    /// Number of worker threads, each with its own lattice.
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            left_range: 40,
            right_range: 40,
            interpolation_threshold: 5,
            workers: host_parallelism(),
        }
    }
}

impl EngineConfig {
    /// Returns the band described by `left_range` and `right_range`.
    pub fn window(&self) -> Window {
        Window::new(self.left_range, self.right_range)
    }
}

/// Work done by one [`DpEngine::dp`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DpReport {
    /// Scanlines solved over the whole lattice.
    pub full_solves: usize,
    /// Sub-rectangle solves issued by interpolation passes.
    pub partial_solves: usize,
    /// Positions copied from a neighbor without solving.
    pub interpolated_pixels: usize,
    /// Scheduling passes, the full pass included.
    pub passes: usize,
    /// Backtrace cells that had no usable direction.
    pub recovered_backtraces: usize,
}

#[derive(Default)]
struct Counters {
    full_solves: AtomicUsize,
    partial_solves: AtomicUsize,
    interpolated_pixels: AtomicUsize,
    recovered_backtraces: AtomicUsize,
}

impl Counters {
    fn report(&self, passes: usize) -> DpReport {
        DpReport {
            full_solves: self.full_solves.load(Ordering::Relaxed),
            partial_solves: self.partial_solves.load(Ordering::Relaxed),
            interpolated_pixels: self.interpolated_pixels.load(Ordering::Relaxed),
            passes,
            recovered_backtraces: self.recovered_backtraces.load(Ordering::Relaxed),
        }
    }
}

/// First task error of a pass; later ones are only counted.
#[derive(Default)]
struct PassFailure {
    first: Mutex<Option<DpMatchError>>,
    count: AtomicUsize,
}

impl PassFailure {
    fn record(&self, err: DpMatchError) {
        self.count.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.first.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    fn take(&self) -> Option<DpMatchError> {
        self.first.lock().take()
    }
}

struct Shared<C> {
    model: C,
    patterns: MatchPatterns,
    lattices: Vec<Mutex<Lattice>>,
    primary_width: usize,
    reference_width: usize,
}

/// Parameters copied into every task of one pass.
#[derive(Clone, Copy)]
struct PassParams {
    window: Window,
    threshold: i32,
}

/// Matches every scanline of a primary sequence set against a reference set.
pub struct DpEngine<C: CostModel + 'static> {
    shared: Arc<Shared<C>>,
    pool: WorkerPool,
    window: Window,
    interpolation_threshold: i32,
}

impl<C: CostModel + 'static> DpEngine<C> {
    /// Creates an engine for `scanlines` scanlines of `primary_width`
    /// positions matched against `reference_width` positions.
    pub fn new(
        model: C,
        config: EngineConfig,
        primary_width: usize,
        reference_width: usize,
        scanlines: usize,
    ) -> DpMatchResult<Self> {
        if primary_width == 0 || reference_width == 0 {
            return Err(DpMatchError::InvalidDimensions {
                width: primary_width,
                height: reference_width,
            });
        }
        if scanlines == 0 {
            return Err(DpMatchError::InvalidInput("scanline count must be at least 1"));
        }
        let pool = WorkerPool::new(config.workers)?;
        let lattices = (0..pool.worker_count())
            .map(|_| Lattice::new(primary_width, reference_width).map(Mutex::new))
            .collect::<DpMatchResult<Vec<_>>>()?;

        Ok(Self {
            shared: Arc::new(Shared {
                model,
                patterns: MatchPatterns::new(scanlines, primary_width),
                lattices,
                primary_width,
                reference_width,
            }),
            pool,
            window: config.window(),
            interpolation_threshold: config.interpolation_threshold,
        })
    }

    /// Matches all scanlines, solving every `skip`-th one in full and
    /// interpolating the rest.
    ///
    /// Previous results are discarded first, so repeated calls with the same
    /// model and parameters produce the same patterns. On error the patterns
    /// are left partially filled.
    pub fn dp(&mut self, skip: usize) -> DpMatchResult<DpReport> {
        if skip == 0 {
            return Err(DpMatchError::InvalidSkip { skip });
        }
        let scanlines = self.shared.patterns.len();
        let _span = trace_span!(
            "dp",
            skip = skip,
            scanlines = scanlines,
            workers = self.pool.worker_count()
        )
        .entered();

        self.shared.patterns.reset();
        let counters = Arc::new(Counters::default());
        let params = PassParams {
            window: self.window,
            threshold: self.interpolation_threshold,
        };

        let rows: Vec<usize> = (0..scanlines).step_by(skip).collect();
        self.full_pass(&rows, skip, params, &counters)?;
        let mut passes = 1;

        let mut solved = vec![false; scanlines];
        for &row in &rows {
            solved[row] = true;
        }

        let mut gap = skip / 2;
        while gap > 0 {
            let plans = plan_interpolation(&solved, gap);
            self.interpolation_pass(&plans, gap, params, &counters)?;
            for plan in &plans {
                solved[plan.row] = true;
            }
            passes += 1;
            gap /= 2;
        }

        let report = counters.report(passes);
        trace_event!(
            "dp_done",
            full_solves = report.full_solves,
            partial_solves = report.partial_solves,
            interpolated_pixels = report.interpolated_pixels,
            passes = report.passes,
            recovered_backtraces = report.recovered_backtraces,
        );
        Ok(report)
    }

    fn full_pass(
        &self,
        rows: &[usize],
        skip: usize,
        params: PassParams,
        counters: &Arc<Counters>,
    ) -> DpMatchResult<()> {
        let _span = trace_span!("full_pass", rows = rows.len(), skip = skip).entered();
        let failure = Arc::new(PassFailure::default());

        for &row in rows {
            let shared = Arc::clone(&self.shared);
            let counters = Arc::clone(counters);
            let failure = Arc::clone(&failure);
            self.pool.submit(move |worker| {
                let shared = &*shared;
                let ctx = ScanlineContext::isolated(row, skip);
                let rect = SubRect::full(shared.primary_width, shared.reference_width);
                let mut lattice = shared.lattices[worker].lock();
                let result = shared.patterns.write(row).and_then(|mut pattern| {
                    solve_scanline(
                        &mut lattice,
                        &shared.model,
                        rect,
                        params.window,
                        &ctx,
                        &mut pattern,
                    )
                });
                match result {
                    Ok(summary) => {
                        counters.full_solves.fetch_add(1, Ordering::Relaxed);
                        counters
                            .recovered_backtraces
                            .fetch_add(summary.recovered, Ordering::Relaxed);
                    }
                    Err(err) => failure.record(err),
                }
            });
        }

        self.finish_pass(&failure)
    }

    fn interpolation_pass(
        &self,
        plans: &[RowPlan],
        gap: usize,
        params: PassParams,
        counters: &Arc<Counters>,
    ) -> DpMatchResult<()> {
        let _span = trace_span!("interpolation_pass", rows = plans.len(), gap = gap).entered();
        let failure = Arc::new(PassFailure::default());

        for &plan in plans {
            let shared = Arc::clone(&self.shared);
            let counters = Arc::clone(counters);
            let failure = Arc::clone(&failure);
            self.pool.submit(move |worker| {
                match interpolate_task(&shared, worker, plan, gap, params) {
                    Ok(outcome) => {
                        counters
                            .partial_solves
                            .fetch_add(outcome.partial_solves, Ordering::Relaxed);
                        counters
                            .interpolated_pixels
                            .fetch_add(outcome.interpolated, Ordering::Relaxed);
                        counters
                            .recovered_backtraces
                            .fetch_add(outcome.recovered, Ordering::Relaxed);
                    }
                    Err(err) => failure.record(err),
                }
            });
        }

        self.finish_pass(&failure)
    }

    /// Barrier at the end of a pass; reports panics first, then task errors.
    fn finish_pass(&self, failure: &PassFailure) -> DpMatchResult<()> {
        self.pool.join()?;
        if let Some(err) = failure.take() {
            trace_event!(
                "pass_failed",
                failed_tasks = failure.count.load(Ordering::Relaxed)
            );
            return Err(err);
        }
        Ok(())
    }

    /// Read access to the match pattern of one scanline.
    pub fn match_pattern(&self, scanline: usize) -> DpMatchResult<RwLockReadGuard<'_, Vec<i32>>> {
        self.shared.patterns.read(scanline)
    }

    /// Write access to the match pattern of one scanline.
    pub fn match_pattern_mut(
        &mut self,
        scanline: usize,
    ) -> DpMatchResult<RwLockWriteGuard<'_, Vec<i32>>> {
        self.shared.patterns.write(scanline)
    }

    /// Copies all match patterns, indexed by scanline.
    pub fn match_patterns(&self) -> Vec<Vec<i32>> {
        (0..self.shared.patterns.len())
            .filter_map(|row| self.shared.patterns.snapshot(row).ok())
            .collect()
    }

    /// Sets the band used by subsequent [`DpEngine::dp`] calls.
    pub fn set_window(&mut self, left_range: usize, right_range: usize) {
        self.window = Window::new(left_range, right_range);
    }

    /// Returns the band used by the next run.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Sets the offset disagreement below which interpolation copies a match.
    pub fn set_interpolation_threshold(&mut self, threshold: i32) {
        self.interpolation_threshold = threshold;
    }

    /// Returns the current interpolation threshold.
    pub fn interpolation_threshold(&self) -> i32 {
        self.interpolation_threshold
    }

    /// Returns the number of workers, which is also the number of lattices.
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Returns the number of scanlines.
    pub fn scanlines(&self) -> usize {
        self.shared.patterns.len()
    }

    /// Returns the primary sequence length `X`.
    pub fn primary_width(&self) -> usize {
        self.shared.patterns.width()
    }

    /// Returns the reference sequence length `Y`.
    pub fn reference_width(&self) -> usize {
        self.shared.reference_width
    }

    /// Returns the cost model.
    pub fn model(&self) -> &C {
        &self.shared.model
    }
}

fn interpolate_task<C: CostModel>(
    shared: &Shared<C>,
    worker: usize,
    plan: RowPlan,
    gap: usize,
    params: PassParams,
) -> DpMatchResult<schedule::RowOutcome> {
    let prev = shared.patterns.snapshot(plan.prev)?;
    let next = shared.patterns.snapshot(plan.next)?;
    let ctx = if plan.has_both_neighbors() {
        ScanlineContext::between(
            plan.row,
            gap,
            Neighbor {
                row: plan.prev,
                pattern: &prev,
            },
            Neighbor {
                row: plan.next,
                pattern: &next,
            },
        )
    } else {
        ScanlineContext::isolated(plan.row, gap)
    };

    let mut lattice = shared.lattices[worker].lock();
    let mut current = shared.patterns.write(plan.row)?;
    interpolate_row(
        &mut lattice,
        &shared.model,
        params.window,
        params.threshold,
        &ctx,
        &prev,
        &next,
        &mut current,
    )
}
