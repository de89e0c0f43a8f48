//! Sorts a point set into cell-major order.
//!
//! The original ordering is never lost: we retain the permutation that maps
//! sorted positions back to the original point indices, so that per-point
//! results can be reported in the caller's order.

use crate::grid::CellGrid;
use crate::points::Points;
use alloc::vec::Vec;
use core::ops::Range;

/// Identifies a point that lies outside of a non-periodic domain (or that has
/// a non-finite coordinate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutOfDomain {
    /// index of the point (in the original order)
    pub point: usize,
    pub axis: usize,
    pub value: f64,
    pub length: f64,
}

/// A point set sorted by cell id, with the range of each cell.
#[derive(Clone, Debug)]
pub struct CellIndex {
    /// `order[sorted_idx]` is the original index of the point
    order: Vec<usize>,
    /// the points in cell `c` occupy `cell_starts[c]..cell_starts[c + 1]`
    cell_starts: Vec<usize>,
    /// wrapped positions, in sorted order
    positions: Vec<[f64; 3]>,
}

impl CellIndex {
    /// Assigns each point to a cell of `grid` and sorts the points by cell.
    ///
    /// Coordinates along periodic axes are wrapped into the domain first.
    pub fn build(points: &Points, grid: &CellGrid) -> Result<CellIndex, OutOfDomain> {
        let domain = grid.domain();
        let n_points = points.n_points();

        let mut wrapped: Vec<[f64; 3]> = Vec::with_capacity(n_points);
        let mut cell_ids: Vec<usize> = Vec::with_capacity(n_points);
        for i in 0..n_points {
            let raw = points.position(i);
            let mut pos = [0.0; 3];
            for axis in 0..3 {
                pos[axis] = domain.wrap_coord(axis, raw[axis]).ok_or(OutOfDomain {
                    point: i,
                    axis,
                    value: raw[axis],
                    length: domain.lengths()[axis],
                })?;
            }
            cell_ids.push(grid.linear_id(grid.cell_coords(&pos)));
            wrapped.push(pos);
        }

        // a stable sort keeps points that share a cell in their original order
        let mut order: Vec<usize> = (0..n_points).collect();
        order.sort_by_key(|&i| cell_ids[i]);

        // cells come out in increasing order, so a single pass finds every
        // boundary. Empty cells end up with zero-length ranges
        let n_cells = grid.n_cells_total();
        let mut cell_starts = Vec::with_capacity(n_cells + 1);
        let mut cursor = 0;
        for cell in 0..n_cells {
            cell_starts.push(cursor);
            while cursor < n_points && cell_ids[order[cursor]] == cell {
                cursor += 1;
            }
        }
        cell_starts.push(cursor);
        debug_assert_eq!(cursor, n_points);

        let positions = order.iter().map(|&i| wrapped[i]).collect();

        Ok(CellIndex {
            order,
            cell_starts,
            positions,
        })
    }

    pub fn n_points(&self) -> usize {
        self.order.len()
    }

    pub fn n_cells(&self) -> usize {
        self.cell_starts.len() - 1
    }

    /// the range (in sorted order) of the points within `cell`
    #[inline]
    pub fn cell_range(&self, cell: usize) -> Range<usize> {
        self.cell_starts[cell]..self.cell_starts[cell + 1]
    }

    /// the original index of the point at `sorted_idx`
    #[inline]
    pub fn original_index(&self, sorted_idx: usize) -> usize {
        self.order[sorted_idx]
    }

    /// the wrapped position of the point at `sorted_idx`
    #[inline]
    pub fn position(&self, sorted_idx: usize) -> &[f64; 3] {
        &self.positions[sorted_idx]
    }

    /// the ids of every cell holding at least one point, in increasing order
    pub fn non_empty_cells(&self) -> Vec<usize> {
        (0..self.n_cells())
            .filter(|&c| self.cell_starts[c] < self.cell_starts[c + 1])
            .collect()
    }

    /// Reorders values, provided in sorted order, into the original order of
    /// the points.
    pub fn unsort<T>(&self, sorted: Vec<T>) -> Vec<T> {
        assert_eq!(sorted.len(), self.n_points());
        let mut slots: Vec<Option<T>> = (0..sorted.len()).map(|_| None).collect();
        for (sorted_idx, value) in sorted.into_iter().enumerate() {
            slots[self.order[sorted_idx]] = Some(value);
        }
        slots
            .into_iter()
            .map(|v| v.expect("the permutation must be a bijection"))
            .collect()
    }
}
