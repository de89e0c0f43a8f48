//! The machinery shared by every engine: argument validation, indexing the
//! samples and driving the traversal on an [`Executor`].

use crate::config::CountConfig;
use crate::error::Error;
use crate::executor::{ConfiguredExecutor, Executor};
use paircount_nostd_internal::{
    CellGrid, CellIndex, Domain, LineOfSight, MAX_CELLS_PER_AXIS, Metric, PairKernel, PairSet,
    Points, Thresholds,
};
use tracing::{debug, info_span};

/// The number of home cells handled by a single unit of work.
///
/// This is independent of the number of threads, which keeps the order of
/// floating-point sums independent of the number of threads.
const CHUNK_CELLS: usize = 16;

pub(crate) fn thresholds(who: &'static str, values: &[f64]) -> Result<Thresholds, Error> {
    Thresholds::new(values).map_err(|what| Error::argument(who, what))
}

/// The largest separation searched along each axis when the separation
/// perpendicular to the line of sight may reach `rp_max` and the parallel
/// separation may reach `pi_max`
pub(crate) fn projected_extent(line_of_sight: LineOfSight, rp_max: f64, pi_max: f64) -> [f64; 3] {
    let mut extent = [rp_max; 3];
    extent[line_of_sight.axis()] = pi_max;
    extent
}

/// Check that a per-point array holds one entry per point
pub(crate) fn check_len(who: &'static str, n_points: usize, len: usize) -> Result<(), Error> {
    if n_points == len {
        Ok(())
    } else {
        Err(Error::length_mismatch(who, n_points, len))
    }
}

/// The samples sorted onto a single grid.
pub(crate) struct IndexedSamples {
    grid: CellGrid,
    home: CellIndex,
    // None for an auto-correlation
    neighbor: Option<CellIndex>,
}

impl IndexedSamples {
    /// Builds a grid suited to searching for separations up to
    /// `search_extent` (along each axis) and sorts the samples onto it.
    pub(crate) fn build(
        data1: &Points,
        data2: Option<&Points>,
        domain: &Domain,
        search_extent: [f64; 3],
        config: &CountConfig,
    ) -> Result<Self, Error> {
        let cell_size = config.approx_cell_size().unwrap_or_else(|| {
            core::array::from_fn(|k| {
                if search_extent[k] > 0.0 {
                    search_extent[k]
                } else {
                    // only coincident points need to be found
                    domain.lengths()[k] / MAX_CELLS_PER_AXIS as f64
                }
            })
        });
        let grid = CellGrid::new(*domain, search_extent, cell_size)
            .map_err(|what| Error::argument("search extent", what))?;
        debug!(
            shape = ?grid.shape(),
            reach = ?grid.reach(),
            widths = ?grid.cell_widths(),
            "constructed cell grid"
        );

        let _span = info_span!("CellIndex::build").entered();
        let home = CellIndex::build(data1, &grid).map_err(|err| Error::out_of_domain("data1", err))?;
        let neighbor = match data2 {
            Some(points) => Some(
                CellIndex::build(points, &grid)
                    .map_err(|err| Error::out_of_domain("data2", err))?,
            ),
            None => None,
        };
        Ok(IndexedSamples {
            grid,
            home,
            neighbor,
        })
    }

    pub(crate) fn home(&self) -> &CellIndex {
        &self.home
    }

    fn pair_set(&self) -> Result<PairSet<'_>, Error> {
        PairSet::new(&self.grid, &self.home, self.neighbor.as_ref())
            .map_err(|what| Error::argument("cell index", what))
    }
}

/// Feeds every pair into a single state.
///
/// Each chunk of home cells fills its own partial state. The partial states
/// are merged in chunk order.
pub(crate) fn reduce_pairs<M, K>(
    samples: &IndexedSamples,
    metric: &M,
    kernel: &K,
    config: &CountConfig,
) -> Result<K::State, Error>
where
    M: Metric,
    K: PairKernel<M::Key>,
{
    let executor = ConfiguredExecutor::new(config)?;
    let pairs = samples.pair_set()?;
    let cells = pairs.home_cells();
    let _span = info_span!(
        "reduce_pairs",
        n_home_cells = cells.len(),
        n_threads = executor.num_threads()
    )
    .entered();

    let partial_states = executor.map_chunks(&cells, CHUNK_CELLS, |chunk| {
        let mut state = kernel.init_state();
        let mut scratch = Vec::new();
        for &cell in chunk {
            pairs.reduce_cell(metric, kernel, cell, &mut state, &mut scratch);
        }
        state
    });

    let mut state = kernel.init_state();
    for partial in partial_states {
        kernel.merge(&mut state, partial);
    }
    Ok(state)
}

/// Computes a separate state for every point of the home sample.
///
/// The states are returned in the original order of the home sample.
pub(crate) fn map_home_points<M, K>(
    samples: &IndexedSamples,
    metric: &M,
    kernel: &K,
    config: &CountConfig,
) -> Result<Vec<K::State>, Error>
where
    M: Metric,
    K: PairKernel<M::Key>,
{
    let executor = ConfiguredExecutor::new(config)?;
    let pairs = samples.pair_set()?;
    let cells = pairs.home_cells();
    let _span = info_span!(
        "map_home_points",
        n_home_cells = cells.len(),
        n_threads = executor.num_threads()
    )
    .entered();

    let states_per_chunk = executor.map_chunks(&cells, CHUNK_CELLS, |chunk| {
        let mut states = Vec::new();
        let mut scratch = Vec::new();
        for &cell in chunk {
            pairs.map_cell(metric, kernel, cell, &mut scratch, &mut states);
        }
        states
    });

    // home cells are visited in increasing order, so concatenating the chunks
    // yields the states in the sorted order of the home sample
    let sorted: Vec<K::State> = states_per_chunk.into_iter().flatten().collect();
    Ok(samples.home().unsort(sorted))
}
