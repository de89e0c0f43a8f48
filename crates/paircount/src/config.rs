//! Runtime configuration shared by every engine.
//!
//! None of these settings affect the results of a count. They only control
//! how the work is performed (and the line-of-sight convention).

use crate::error::Error;
use crate::executor::ExecutorChoice;
use paircount_nostd_internal::LineOfSight;

/// Configures an engine call.
///
/// Construct this with [`CountConfigBuilder`] (or use the default).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountConfig {
    num_threads: Option<usize>,
    approx_cell_size: Option<[f64; 3]>,
    line_of_sight: LineOfSight,
}

impl CountConfig {
    /// `None` means that work is distributed over rayon's global thread pool
    pub fn num_threads(&self) -> Option<usize> {
        self.num_threads
    }

    /// `None` means cells are as wide as the largest searched separation
    pub fn approx_cell_size(&self) -> Option<[f64; 3]> {
        self.approx_cell_size
    }

    pub fn line_of_sight(&self) -> LineOfSight {
        self.line_of_sight
    }

    pub(crate) fn executor_choice(&self) -> ExecutorChoice {
        match self.num_threads {
            Some(1) => ExecutorChoice::Serial,
            Some(n) => ExecutorChoice::DedicatedPool(n),
            None => ExecutorChoice::GlobalPool,
        }
    }
}

/// Builds a [`CountConfig`]
///
/// ```
/// use paircount::{CountConfigBuilder, LineOfSight};
/// let config = CountConfigBuilder::new()
///     .num_threads(4)
///     .line_of_sight(LineOfSight::X)
///     .build()
///     .unwrap();
/// assert_eq!(config.num_threads(), Some(4));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CountConfigBuilder {
    num_threads: Option<usize>,
    approx_cell_size: Option<[f64; 3]>,
    line_of_sight: LineOfSight,
}

impl CountConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of threads. A value of 1 runs everything on the calling
    /// thread.
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Specifies the approximate cell width along each axis.
    ///
    /// Cells smaller than the largest separation are allowed: more cells
    /// then get searched around each point.
    pub fn approx_cell_size(mut self, cell_size: [f64; 3]) -> Self {
        self.approx_cell_size = Some(cell_size);
        self
    }

    pub fn line_of_sight(mut self, line_of_sight: LineOfSight) -> Self {
        self.line_of_sight = line_of_sight;
        self
    }

    pub fn build(self) -> Result<CountConfig, Error> {
        if self.num_threads == Some(0) {
            return Err(Error::integer_range("num_threads", 0, 1, i64::MAX));
        }
        if let Some(cell_size) = self.approx_cell_size {
            if cell_size.iter().any(|x| !x.is_finite() || *x <= 0.0) {
                return Err(Error::argument(
                    "approx_cell_size",
                    "each cell width must be finite and positive",
                ));
            }
        }
        Ok(CountConfig {
            num_threads: self.num_threads,
            approx_cell_size: self.approx_cell_size,
            line_of_sight: self.line_of_sight,
        })
    }
}
