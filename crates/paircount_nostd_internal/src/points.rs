use ndarray::ArrayView2;

/// Collection of point properties.
///
/// We place the following constraints on contained arrays:
/// - axis 0 is the slow axis and it corresponds to the spatial components
///   (x, y, z) of each position. It must have a length of 3.
/// - axis 1 is the fast axis. The length along this axis coincides with the
///   number of points.
/// - In other words the shape of `positions` is `(3, n_points)`. A sample
///   with no points is perfectly valid.
#[derive(Clone, Debug)]
pub struct Points<'a> {
    positions: ArrayView2<'a, f64>,
    weights: Option<&'a [f64]>,
    n_points: usize,
}

impl<'a> Points<'a> {
    /// create a new instance
    pub fn new(
        positions: ArrayView2<'a, f64>,
        weights: Option<&'a [f64]>,
    ) -> Result<Points<'a>, &'static str> {
        let n_points = positions.shape()[1];
        if positions.shape()[0] != 3 {
            Err("positions must have 3 spatial components along axis 0")
        } else if weights.is_some_and(|w| w.len() != n_points) {
            Err("weights must have the same number of points as positions")
        } else {
            Ok(Self {
                positions,
                weights,
                n_points,
            })
        }
    }

    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn is_empty(&self) -> bool {
        self.n_points == 0
    }

    #[inline]
    pub fn position(&self, idx: usize) -> [f64; 3] {
        [
            self.positions[[0, idx]],
            self.positions[[1, idx]],
            self.positions[[2, idx]],
        ]
    }

    pub fn weights(&self) -> Option<&'a [f64]> {
        self.weights
    }

    /// If no weights are provided, returns 1.0, i.e., weights are just counts.
    #[inline]
    pub fn get_weight(&self, idx: usize) -> f64 {
        if let Some(weights) = self.weights {
            weights[idx]
        } else {
            1.0
        }
    }
}
