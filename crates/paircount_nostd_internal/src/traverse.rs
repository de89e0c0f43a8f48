//! The traversal shared by every pair-counting engine.
//!
//! For each home point, we visit every point of the neighbor sample that
//! lies within the block of cells surrounding the home point's cell. The
//! geometry is supplied by a [`Metric`] and the per-pair action by a
//! [`PairKernel`].
//!
//! The traversal is decomposed by home cell. A caller drives it one cell at a
//! time (possibly from many threads), which lets it decide how partial
//! results get combined.

use crate::cell_index::CellIndex;
use crate::grid::CellGrid;
use crate::kernel::{PairKernel, PairRef};
use crate::metric::Metric;
use alloc::vec::Vec;
use core::ops::ControlFlow;

/// The two indexed samples whose pairs get enumerated.
///
/// Both samples must be indexed on the same grid.
#[derive(Clone, Copy)]
pub struct PairSet<'a> {
    grid: &'a CellGrid,
    home: &'a CellIndex,
    neighbor: &'a CellIndex,
    is_auto: bool,
}

impl<'a> PairSet<'a> {
    /// When `neighbor` is `None`, the pairs are drawn from `home` alone
    /// (an auto-correlation).
    pub fn new(
        grid: &'a CellGrid,
        home: &'a CellIndex,
        neighbor: Option<&'a CellIndex>,
    ) -> Result<PairSet<'a>, &'static str> {
        let n_cells = grid.n_cells_total();
        if home.n_cells() != n_cells || neighbor.is_some_and(|idx| idx.n_cells() != n_cells) {
            return Err("each cell index must be built from the provided grid");
        }
        Ok(PairSet {
            grid,
            home,
            neighbor: neighbor.unwrap_or(home),
            is_auto: neighbor.is_none(),
        })
    }

    pub fn is_auto(&self) -> bool {
        self.is_auto
    }

    pub fn grid(&self) -> &'a CellGrid {
        self.grid
    }

    pub fn home(&self) -> &'a CellIndex {
        self.home
    }

    /// the ids of the home cells that hold at least one point
    pub fn home_cells(&self) -> Vec<usize> {
        self.home.non_empty_cells()
    }

    /// Feeds every pair whose home member lies in `cell` into a single
    /// `state`.
    ///
    /// `scratch` is a buffer reused across calls to avoid reallocating the
    /// list of neighbor cells.
    pub fn reduce_cell<M, K>(
        &self,
        metric: &M,
        kernel: &K,
        cell: usize,
        state: &mut K::State,
        scratch: &mut Vec<usize>,
    ) where
        M: Metric,
        K: PairKernel<M::Key>,
    {
        self.grid.neighbor_cells(cell, scratch);
        for sorted_idx in self.home.cell_range(cell) {
            self.scan_point(metric, kernel, sorted_idx, scratch, state);
        }
    }

    /// Computes a separate state for each home point in `cell` and appends
    /// them to `out` (in the sorted order of the home sample).
    pub fn map_cell<M, K>(
        &self,
        metric: &M,
        kernel: &K,
        cell: usize,
        scratch: &mut Vec<usize>,
        out: &mut Vec<K::State>,
    ) where
        M: Metric,
        K: PairKernel<M::Key>,
    {
        self.grid.neighbor_cells(cell, scratch);
        for sorted_idx in self.home.cell_range(cell) {
            let mut state = kernel.init_state();
            self.scan_point(metric, kernel, sorted_idx, scratch, &mut state);
            out.push(state);
        }
    }

    #[inline]
    fn scan_point<M, K>(
        &self,
        metric: &M,
        kernel: &K,
        home_sorted_idx: usize,
        neighbor_cells: &[usize],
        state: &mut K::State,
    ) where
        M: Metric,
        K: PairKernel<M::Key>,
    {
        let domain = self.grid.domain();
        let home_idx = self.home.original_index(home_sorted_idx);
        let home_pos = self.home.position(home_sorted_idx);

        for &cell in neighbor_cells {
            for sorted_idx in self.neighbor.cell_range(cell) {
                let neighbor_idx = self.neighbor.original_index(sorted_idx);
                if self.is_auto
                    && (neighbor_idx == home_idx || (K::UNIQUE_PAIRS && neighbor_idx < home_idx))
                {
                    continue;
                }
                let displacement = domain.displacement(home_pos, self.neighbor.position(sorted_idx));
                let key = metric.key(&displacement);
                let pair = PairRef {
                    home: home_idx,
                    neighbor: neighbor_idx,
                };
                if let ControlFlow::Break(()) = kernel.consume(state, &key, pair) {
                    return;
                }
            }
        }
    }
}
