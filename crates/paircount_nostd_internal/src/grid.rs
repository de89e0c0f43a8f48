//! The regular lattice of cells that partitions a [`Domain`].
//!
//! The cell width along each axis is chosen to be commensurate with the
//! largest separation that is searched for along that axis. This lets us find
//! every neighbor of a point by only looking at a small block of cells around
//! the cell that holds the point.

use crate::domain::Domain;
use alloc::vec::Vec;

/// Upper limit on the number of cells along a single axis.
///
/// This bounds the memory used to track cell ranges when the search extent
/// is tiny compared to the domain.
pub const MAX_CELLS_PER_AXIS: usize = 128;

/// `floor(x)` for finite, non-negative `x` (`f64::floor` isn't in core)
#[inline]
fn floor_nonneg(x: f64) -> usize {
    x as usize
}

/// `ceil(x)` for finite, non-negative `x`
#[inline]
fn ceil_nonneg(x: f64) -> usize {
    let truncated = x as usize;
    if (truncated as f64) < x {
        truncated + 1
    } else {
        truncated
    }
}

/// Describes the cells along a single axis that lie within the search reach
/// of a given cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AxisSpan {
    /// the reach covers the full axis, so every cell is visited exactly once
    All { n: usize },
    /// contiguous cells, truncated at a non-periodic boundary
    Clipped { start: usize, stop: usize },
    /// `len` cells starting at `start`, wrapping around a periodic boundary
    Wrapped { start: usize, len: usize, n: usize },
}

impl AxisSpan {
    fn new(coord: usize, n: usize, reach: usize, periodic: bool) -> AxisSpan {
        if periodic && 2 * reach + 1 >= n {
            AxisSpan::All { n }
        } else if periodic {
            AxisSpan::Wrapped {
                start: (coord + n - reach) % n,
                len: 2 * reach + 1,
                n,
            }
        } else {
            AxisSpan::Clipped {
                start: coord.saturating_sub(reach),
                stop: core::cmp::min(coord + reach + 1, n),
            }
        }
    }

    fn len(&self) -> usize {
        match *self {
            AxisSpan::All { n } => n,
            AxisSpan::Clipped { start, stop } => stop - start,
            AxisSpan::Wrapped { len, .. } => len,
        }
    }

    #[inline]
    fn get(&self, i: usize) -> usize {
        match *self {
            AxisSpan::All { .. } => i,
            AxisSpan::Clipped { start, .. } => start + i,
            AxisSpan::Wrapped { start, n, .. } => (start + i) % n,
        }
    }
}

/// A regular grid of cells covering a [`Domain`].
///
/// Cells are linearized as `ix + nx * (iy + ny * iz)`.
#[derive(Clone, Debug)]
pub struct CellGrid {
    domain: Domain,
    n_cells: [usize; 3],
    widths: [f64; 3],
    /// the number of cells (along each axis) that must be searched on either
    /// side of a home cell
    reach: [usize; 3],
}

impl CellGrid {
    /// Construct a grid.
    ///
    /// `search_extent` holds the largest separation that will be searched
    /// for along each axis, while `cell_size` holds the approximate cell
    /// width. The number of cells along an axis is `floor(L / cell_size)`
    /// (at least 1, at most [`MAX_CELLS_PER_AXIS`]).
    pub fn new(
        domain: Domain,
        search_extent: [f64; 3],
        cell_size: [f64; 3],
    ) -> Result<CellGrid, &'static str> {
        if search_extent.iter().any(|x| !x.is_finite() || *x < 0.0) {
            return Err("the search extent must be finite and non-negative");
        } else if cell_size.iter().any(|x| !x.is_finite() || *x <= 0.0) {
            return Err("the cell size must be finite and positive");
        }

        let mut n_cells = [1_usize; 3];
        let mut widths = [0.0; 3];
        let mut reach = [0_usize; 3];
        for k in 0..3 {
            let length = domain.lengths()[k];
            let ratio = length / cell_size[k];
            n_cells[k] = if ratio >= MAX_CELLS_PER_AXIS as f64 {
                MAX_CELLS_PER_AXIS
            } else {
                floor_nonneg(ratio).max(1)
            };
            widths[k] = length / (n_cells[k] as f64);
            // two points separated by at most `m * width` never sit more than
            // `m` cells apart. Rounding in `pos / width` can shift a cell
            // boundary by a few ulps, so separations landing exactly on a
            // multiple of the width get one extra cell
            let cells = search_extent[k] / widths[k];
            reach[k] = if cells == 0.0 {
                0
            } else {
                let slack = 8.0 * f64::EPSILON * (n_cells[k] as f64 + cells);
                core::cmp::min(ceil_nonneg(cells + slack), n_cells[k])
            };
        }

        Ok(CellGrid {
            domain,
            n_cells,
            widths,
            reach,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// number of cells along each axis
    pub fn shape(&self) -> &[usize; 3] {
        &self.n_cells
    }

    pub fn cell_widths(&self) -> &[f64; 3] {
        &self.widths
    }

    pub fn reach(&self) -> &[usize; 3] {
        &self.reach
    }

    pub fn n_cells_total(&self) -> usize {
        self.n_cells[0] * self.n_cells[1] * self.n_cells[2]
    }

    /// computes the 3D index of the cell holding `pos`, which must already
    /// be wrapped into the domain.
    ///
    /// A coordinate at the upper boundary maps to the last cell.
    #[inline]
    pub fn cell_coords(&self, pos: &[f64; 3]) -> [usize; 3] {
        let mut out = [0_usize; 3];
        for k in 0..3 {
            let idx = floor_nonneg(pos[k] / self.widths[k]);
            out[k] = core::cmp::min(idx, self.n_cells[k] - 1);
        }
        out
    }

    /// map a 3D cell index to 1D
    #[inline]
    pub fn linear_id(&self, coords: [usize; 3]) -> usize {
        coords[0] + self.n_cells[0] * (coords[1] + self.n_cells[1] * coords[2])
    }

    /// map a 1D cell index to 3D
    #[inline]
    pub fn coords_of(&self, id: usize) -> [usize; 3] {
        let ix = id % self.n_cells[0];
        let iy = (id / self.n_cells[0]) % self.n_cells[1];
        let iz = id / (self.n_cells[0] * self.n_cells[1]);
        [ix, iy, iz]
    }

    /// Overwrites `out` with the linear ids of every cell that may hold a
    /// neighbor of a point in `home` (including `home` itself).
    ///
    /// Along a periodic axis the block wraps around the boundary; along a
    /// non-periodic axis it is truncated. No cell is listed twice.
    pub fn neighbor_cells(&self, home: usize, out: &mut Vec<usize>) {
        out.clear();
        let coords = self.coords_of(home);
        let periodic = self.domain.periodic();
        let spans: [AxisSpan; 3] = core::array::from_fn(|k| {
            AxisSpan::new(coords[k], self.n_cells[k], self.reach[k], periodic[k])
        });
        out.reserve(spans[0].len() * spans[1].len() * spans[2].len());
        for iz in 0..spans[2].len() {
            let z = spans[2].get(iz);
            for iy in 0..spans[1].len() {
                let y = spans[1].get(iy);
                for ix in 0..spans[0].len() {
                    out.push(self.linear_id([spans[0].get(ix), y, z]));
                }
            }
        }
    }
}
