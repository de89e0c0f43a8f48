//! Implements the separation thresholds used for cumulative pair counts.
//!
//! A cumulative count at threshold `r_k` holds the number of pairs with a
//! separation `≤ r_k`. Rather than checking every threshold for every pair,
//! kernels record the smallest threshold that a pair satisfies (see
//! [`Thresholds::first_satisfied`]) in a "first-hit" histogram, which is later
//! converted to cumulative counts with a prefix sum ([`cumulate`]). This
//! produces results identical to checking every threshold.

use alloc::vec::Vec;
use core::ops::AddAssign;

/// Check that `thresholds` is a valid list of separations.
///
/// An empty list is valid (it produces empty outputs).
pub fn validate_thresholds(thresholds: &[f64]) -> Result<(), &'static str> {
    if thresholds.iter().any(|x| !x.is_finite()) {
        return Err("thresholds must be finite");
    } else if thresholds.iter().any(|x| *x < 0.0) {
        return Err("thresholds must not be negative");
    } else if thresholds.iter().any(|x| !(x * x).is_finite()) {
        // distinct thresholds would collapse onto the same squared value
        return Err("thresholds are too large to be squared");
    }
    for i in 1..thresholds.len() {
        if thresholds[i] <= thresholds[i - 1] {
            return Err("thresholds must be in strictly increasing order");
        }
    }
    Ok(())
}

/// An ascending list of separation thresholds (stored squared).
#[derive(Clone, Debug, PartialEq)]
pub struct Thresholds {
    squared: Vec<f64>,
}

impl Thresholds {
    pub fn new(thresholds: &[f64]) -> Result<Thresholds, &'static str> {
        validate_thresholds(thresholds)?;
        Ok(Thresholds {
            squared: thresholds.iter().map(|x| x * x).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.squared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squared.is_empty()
    }

    /// the square of the largest threshold (`None` when there are none)
    pub fn max_squared(&self) -> Option<f64> {
        self.squared.last().copied()
    }

    /// Returns the index of the smallest threshold `r_k` satisfying
    /// `value ≤ r_k²`, or `None` if `value` exceeds every threshold.
    ///
    /// `value` is a squared separation.
    #[inline]
    pub fn first_satisfied(&self, value_squared: f64) -> Option<usize> {
        // thresholds are sorted, so the elements smaller than value form a
        // prefix
        let idx = self.squared.partition_point(|&edge| edge < value_squared);
        if idx == self.squared.len() {
            None
        } else {
            Some(idx)
        }
    }
}

/// In-place prefix sum, converting a first-hit histogram into cumulative
/// counts.
pub fn cumulate<T: AddAssign + Copy>(hist: &mut [T]) {
    for i in 1..hist.len() {
        let prev = hist[i - 1];
        hist[i] += prev;
    }
}

/// In-place 2D prefix sum over a row-major `(n_outer, n_inner)` histogram.
pub fn cumulate_2d<T: AddAssign + Copy>(hist: &mut [T], n_outer: usize, n_inner: usize) {
    debug_assert_eq!(hist.len(), n_outer * n_inner);
    if n_inner == 0 {
        return;
    }
    for row in hist.chunks_exact_mut(n_inner) {
        cumulate(row);
    }
    for i in 1..n_outer {
        for j in 0..n_inner {
            let prev = hist[(i - 1) * n_inner + j];
            hist[i * n_inner + j] += prev;
        }
    }
}
