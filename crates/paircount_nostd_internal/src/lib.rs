/*!
Internal machinery of the `paircount` crate (the algorithms, without any
dependence on the standard library).

# Developer Guide

Counting the pairs of points separated by less than some distance is a
neighbor search. Rather than comparing every point against every other point,
we:
1. partition the [`Domain`] into a regular [`CellGrid`] whose cells are about
   as wide as the largest separation of interest,
2. sort each sample by cell ([`CellIndex`]), so that the points in a cell are
   contiguous,
3. for each point, only examine the points within the block of cells that
   surround its own cell ([`PairSet`]).

Each engine of the public crate is a combination of a [`Metric`] (which maps
the displacement of a pair to a key) and a [`PairKernel`] (which consumes
keys). The public crate decides how the home cells get distributed among
threads and how partial results get combined.
*/

#![no_std]
extern crate alloc;

mod cell_index;
mod domain;
mod grid;
mod kernel;
mod metric;
mod points;
mod thresholds;
mod traverse;

pub use cell_index::{CellIndex, OutOfDomain};
pub use domain::Domain;
pub use grid::{CellGrid, MAX_CELLS_PER_AXIS};
pub use kernel::{
    CumulativeCounts, CylindricalIsolation, GridCounts2D, JackknifeCounts, NeighborProjections,
    NeighborSeparations, PairKernel, PairRef, PerObjectCounts, RadiusSquared, SphericalIsolation,
    WeightedCumulativeCounts,
};
pub use metric::{
    Euclidean, LineOfSight, Metric, Projected, ProjectedKey, SMu, SMuKey, TwoComponentKey,
};
pub use points::Points;
pub use thresholds::{Thresholds, cumulate, cumulate_2d, validate_thresholds};
pub use traverse::PairSet;
