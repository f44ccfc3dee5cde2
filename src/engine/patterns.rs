//! Per-scanline match pattern storage shared between tasks.
//!
//! Every scanline has its own lock. The scheduler guarantees a single writer
//! per scanline within a pass and never reads a scanline that the same pass
//! writes, so the locks are uncontended; they make that ownership explicit.

use crate::util::{DpMatchError, DpMatchResult};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Value of a position that has not been matched.
pub const UNMATCHED: i32 = -1;

pub(crate) struct MatchPatterns {
    rows: Vec<RwLock<Vec<i32>>>,
    width: usize,
}

impl MatchPatterns {
    pub(crate) fn new(scanlines: usize, width: usize) -> Self {
        let rows = (0..scanlines)
            .map(|_| RwLock::new(vec![UNMATCHED; width]))
            .collect();
        Self { rows, width }
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    fn slot(&self, scanline: usize) -> DpMatchResult<&RwLock<Vec<i32>>> {
        self.rows
            .get(scanline)
            .ok_or(DpMatchError::IndexOutOfBounds {
                index: scanline,
                len: self.rows.len(),
                context: "scanline",
            })
    }

    pub(crate) fn read(&self, scanline: usize) -> DpMatchResult<RwLockReadGuard<'_, Vec<i32>>> {
        Ok(self.slot(scanline)?.read())
    }

    pub(crate) fn write(&self, scanline: usize) -> DpMatchResult<RwLockWriteGuard<'_, Vec<i32>>> {
        Ok(self.slot(scanline)?.write())
    }

    /// Copies a scanline out so the caller holds no lock while using it.
    pub(crate) fn snapshot(&self, scanline: usize) -> DpMatchResult<Vec<i32>> {
        Ok(self.slot(scanline)?.read().clone())
    }

    pub(crate) fn reset(&self) {
        for row in &self.rows {
            row.write().fill(UNMATCHED);
        }
    }
}
