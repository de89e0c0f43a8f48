//! Define the per-pair accumulation machinery
//!
//! # Kernels
//!
//! Every pair-counting engine shares the same traversal (see
//! [`crate::PairSet`]) and differs only in what happens to each pair. That
//! per-pair action is encapsulated by the [`PairKernel`] trait. Like a
//! reducer, a kernel isn't itself an accumulator: it provides the logic for
//! working with accumulator state, which is owned by the code driving the
//! traversal.
//! - A *global* engine (e.g. a histogram) feeds every pair of a chunk of home
//!   cells into a single state, then merges the per-chunk states.
//! - A *per-point* engine (e.g. an isolation test) creates a fresh state for
//!   each home point.
//!
//! Kernels receive the metric key of a pair and the original indices of the
//! two points (so that auxiliary data like weights or jackknife labels can be
//! looked up).

use crate::metric::TwoComponentKey;
use crate::thresholds::Thresholds;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::ControlFlow;

/// The original indices of the two members of a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairRef {
    /// index within the home sample (`data1`)
    pub home: usize,
    /// index within the neighbor sample (`data2`)
    pub neighbor: usize,
}

/// The per-pair action of a pair-counting engine.
pub trait PairKernel<K>: Sync {
    /// When `true` and the samples are identical, each unordered pair of
    /// distinct points is seen exactly once (we skip pairs where the
    /// neighbor's original index doesn't exceed the home point's index).
    /// When `false`, every neighbor of a home point is seen, except for the
    /// home point itself.
    const UNIQUE_PAIRS: bool;

    type State: Send;

    /// creates a zero-initialized state
    fn init_state(&self) -> Self::State;

    /// Updates `state` with a single pair.
    ///
    /// Returning [`ControlFlow::Break`] stops the search over the remaining
    /// neighbors of the current home point.
    fn consume(&self, state: &mut Self::State, key: &K, pair: PairRef) -> ControlFlow<()>;

    /// merge the state information tracked by `state` and `other`, and
    /// update `state` accordingly
    fn merge(&self, state: &mut Self::State, other: Self::State);
}

#[inline]
fn merge_sum<T: core::ops::AddAssign + Copy>(state: &mut [T], other: &[T]) {
    debug_assert_eq!(state.len(), other.len());
    for (a, b) in state.iter_mut().zip(other) {
        *a += *b;
    }
}

/// Counts pairs by the smallest 3D separation threshold they satisfy.
pub struct CumulativeCounts<'a> {
    thresholds: &'a Thresholds,
}

impl<'a> CumulativeCounts<'a> {
    pub fn new(thresholds: &'a Thresholds) -> Self {
        CumulativeCounts { thresholds }
    }
}

impl PairKernel<f64> for CumulativeCounts<'_> {
    const UNIQUE_PAIRS: bool = true;
    type State = Vec<u64>;

    fn init_state(&self) -> Vec<u64> {
        vec![0; self.thresholds.len()]
    }

    #[inline(always)]
    fn consume(&self, state: &mut Vec<u64>, s_squared: &f64, _: PairRef) -> ControlFlow<()> {
        if let Some(k) = self.thresholds.first_satisfied(*s_squared) {
            state[k] += 1;
        }
        ControlFlow::Continue(())
    }

    fn merge(&self, state: &mut Vec<u64>, other: Vec<u64>) {
        merge_sum(state, &other)
    }
}

/// Sums the product of the weights of each pair by the smallest 3D separation
/// threshold it satisfies.
pub struct WeightedCumulativeCounts<'a> {
    thresholds: &'a Thresholds,
    weights_home: Option<&'a [f64]>,
    weights_neighbor: Option<&'a [f64]>,
}

impl<'a> WeightedCumulativeCounts<'a> {
    /// Missing weights are treated as 1.0
    pub fn new(
        thresholds: &'a Thresholds,
        weights_home: Option<&'a [f64]>,
        weights_neighbor: Option<&'a [f64]>,
    ) -> Self {
        WeightedCumulativeCounts {
            thresholds,
            weights_home,
            weights_neighbor,
        }
    }
}

#[inline(always)]
fn weight_product(a: Option<&[f64]>, b: Option<&[f64]>, pair: PairRef) -> f64 {
    let w_a = a.map_or(1.0, |w| w[pair.home]);
    let w_b = b.map_or(1.0, |w| w[pair.neighbor]);
    w_a * w_b
}

impl PairKernel<f64> for WeightedCumulativeCounts<'_> {
    const UNIQUE_PAIRS: bool = true;
    type State = Vec<f64>;

    fn init_state(&self) -> Vec<f64> {
        vec![0.0; self.thresholds.len()]
    }

    #[inline(always)]
    fn consume(&self, state: &mut Vec<f64>, s_squared: &f64, pair: PairRef) -> ControlFlow<()> {
        if let Some(k) = self.thresholds.first_satisfied(*s_squared) {
            state[k] += weight_product(self.weights_home, self.weights_neighbor, pair);
        }
        ControlFlow::Continue(())
    }

    fn merge(&self, state: &mut Vec<f64>, other: Vec<f64>) {
        merge_sum(state, &other)
    }
}

/// Counts pairs in a row-major `(n_outer, n_inner)` first-hit histogram,
/// keyed by two separation components.
///
/// This is used for `(rp, π)` and for `(s, mu)` counts.
pub struct GridCounts2D<'a> {
    outer: &'a Thresholds,
    inner: &'a Thresholds,
}

impl<'a> GridCounts2D<'a> {
    pub fn new(outer: &'a Thresholds, inner: &'a Thresholds) -> Self {
        GridCounts2D { outer, inner }
    }
}

impl<K: TwoComponentKey> PairKernel<K> for GridCounts2D<'_> {
    const UNIQUE_PAIRS: bool = true;
    type State = Vec<u64>;

    fn init_state(&self) -> Vec<u64> {
        vec![0; self.outer.len() * self.inner.len()]
    }

    #[inline(always)]
    fn consume(&self, state: &mut Vec<u64>, key: &K, _: PairRef) -> ControlFlow<()> {
        if let Some(k) = self.outer.first_satisfied(key.outer_squared()) {
            if let Some(l) = self.inner.first_satisfied(key.inner_squared()) {
                state[k * self.inner.len() + l] += 1;
            }
        }
        ControlFlow::Continue(())
    }

    fn merge(&self, state: &mut Vec<u64>, other: Vec<u64>) {
        merge_sum(state, &other)
    }
}

/// Counts the neighbors of a single home point by the smallest 3D separation
/// threshold they satisfy.
pub struct PerObjectCounts<'a> {
    thresholds: &'a Thresholds,
}

impl<'a> PerObjectCounts<'a> {
    pub fn new(thresholds: &'a Thresholds) -> Self {
        PerObjectCounts { thresholds }
    }
}

impl PairKernel<f64> for PerObjectCounts<'_> {
    const UNIQUE_PAIRS: bool = false;
    type State = Vec<u64>;

    fn init_state(&self) -> Vec<u64> {
        vec![0; self.thresholds.len()]
    }

    #[inline(always)]
    fn consume(&self, state: &mut Vec<u64>, s_squared: &f64, _: PairRef) -> ControlFlow<()> {
        if let Some(k) = self.thresholds.first_satisfied(*s_squared) {
            state[k] += 1;
        }
        ControlFlow::Continue(())
    }

    fn merge(&self, state: &mut Vec<u64>, other: Vec<u64>) {
        merge_sum(state, &other)
    }
}

/// Weighted pair counts for the full sample and for each jackknife subsample.
///
/// Subsample `s` (in `1..=n_regions`) excludes every pair with a member
/// labeled `s`. The state is a row-major `(n_regions + 1, n)` first-hit
/// histogram, where row 0 holds the full sample and row `s` holds subsample
/// `s`. Every row is accumulated directly (rather than derived from the full
/// sample by subtraction), so rows don't lose precision when the weights
/// span many orders of magnitude.
pub struct JackknifeCounts<'a> {
    thresholds: &'a Thresholds,
    labels_home: &'a [u32],
    labels_neighbor: &'a [u32],
    weights_home: Option<&'a [f64]>,
    weights_neighbor: Option<&'a [f64]>,
    n_regions: usize,
}

impl<'a> JackknifeCounts<'a> {
    /// Labels must lie in `[1, n_regions]`; this isn't checked here.
    pub fn new(
        thresholds: &'a Thresholds,
        labels_home: &'a [u32],
        labels_neighbor: &'a [u32],
        weights_home: Option<&'a [f64]>,
        weights_neighbor: Option<&'a [f64]>,
        n_regions: usize,
    ) -> Self {
        JackknifeCounts {
            thresholds,
            labels_home,
            labels_neighbor,
            weights_home,
            weights_neighbor,
            n_regions,
        }
    }

    pub fn n_regions(&self) -> usize {
        self.n_regions
    }
}

impl PairKernel<f64> for JackknifeCounts<'_> {
    const UNIQUE_PAIRS: bool = true;
    type State = Vec<f64>;

    fn init_state(&self) -> Vec<f64> {
        vec![0.0; (self.n_regions + 1) * self.thresholds.len()]
    }

    #[inline(always)]
    fn consume(&self, state: &mut Vec<f64>, s_squared: &f64, pair: PairRef) -> ControlFlow<()> {
        let Some(k) = self.thresholds.first_satisfied(*s_squared) else {
            return ControlFlow::Continue(());
        };
        let n = self.thresholds.len();
        let w = weight_product(self.weights_home, self.weights_neighbor, pair);
        let a = self.labels_home[pair.home] as usize;
        let b = self.labels_neighbor[pair.neighbor] as usize;
        for s in 0..=self.n_regions {
            if s != a && s != b {
                state[s * n + k] += w;
            }
        }
        ControlFlow::Continue(())
    }

    fn merge(&self, state: &mut Vec<f64>, other: Vec<f64>) {
        merge_sum(state, &other)
    }
}

/// The isolation radius applied to each home point.
#[derive(Clone, Copy, Debug)]
pub enum RadiusSquared<'a> {
    Uniform(f64),
    PerPoint(&'a [f64]),
}

impl RadiusSquared<'_> {
    #[inline(always)]
    pub fn get(&self, home: usize) -> f64 {
        match self {
            RadiusSquared::Uniform(r2) => *r2,
            RadiusSquared::PerPoint(r2) => r2[home],
        }
    }
}

/// Flags a home point as soon as any neighbor lies within a sphere.
///
/// The state is `true` once the home point is known to NOT be isolated.
pub struct SphericalIsolation<'a> {
    r_squared: RadiusSquared<'a>,
}

impl<'a> SphericalIsolation<'a> {
    pub fn new(r_squared: RadiusSquared<'a>) -> Self {
        SphericalIsolation { r_squared }
    }
}

impl PairKernel<f64> for SphericalIsolation<'_> {
    const UNIQUE_PAIRS: bool = false;
    type State = bool;

    fn init_state(&self) -> bool {
        false
    }

    #[inline(always)]
    fn consume(&self, state: &mut bool, s_squared: &f64, pair: PairRef) -> ControlFlow<()> {
        if *s_squared <= self.r_squared.get(pair.home) {
            *state = true;
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn merge(&self, state: &mut bool, other: bool) {
        *state |= other;
    }
}

/// Flags a home point as soon as any neighbor lies within a cylinder aligned
/// with the line of sight.
pub struct CylindricalIsolation<'a> {
    rp_squared: RadiusSquared<'a>,
    pi_squared: RadiusSquared<'a>,
}

impl<'a> CylindricalIsolation<'a> {
    pub fn new(rp_squared: RadiusSquared<'a>, pi_squared: RadiusSquared<'a>) -> Self {
        CylindricalIsolation {
            rp_squared,
            pi_squared,
        }
    }
}

impl PairKernel<crate::metric::ProjectedKey> for CylindricalIsolation<'_> {
    const UNIQUE_PAIRS: bool = false;
    type State = bool;

    fn init_state(&self) -> bool {
        false
    }

    #[inline(always)]
    fn consume(
        &self,
        state: &mut bool,
        key: &crate::metric::ProjectedKey,
        pair: PairRef,
    ) -> ControlFlow<()> {
        if key.rp_squared <= self.rp_squared.get(pair.home)
            && key.pi_squared <= self.pi_squared.get(pair.home)
        {
            *state = true;
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn merge(&self, state: &mut bool, other: bool) {
        *state |= other;
    }
}

/// Records every neighbor of a home point within a maximum separation, as
/// `(neighbor index, squared separation)`.
pub struct NeighborSeparations {
    r_max_squared: f64,
}

impl NeighborSeparations {
    pub fn new(r_max_squared: f64) -> Self {
        NeighborSeparations { r_max_squared }
    }
}

impl PairKernel<f64> for NeighborSeparations {
    const UNIQUE_PAIRS: bool = false;
    type State = Vec<(usize, f64)>;

    fn init_state(&self) -> Vec<(usize, f64)> {
        Vec::new()
    }

    #[inline(always)]
    fn consume(
        &self,
        state: &mut Vec<(usize, f64)>,
        s_squared: &f64,
        pair: PairRef,
    ) -> ControlFlow<()> {
        if *s_squared <= self.r_max_squared {
            state.push((pair.neighbor, *s_squared));
        }
        ControlFlow::Continue(())
    }

    fn merge(&self, state: &mut Vec<(usize, f64)>, other: Vec<(usize, f64)>) {
        state.extend(other);
    }
}

/// Records every neighbor of a home point within a cylinder aligned with
/// the line of sight, as `(neighbor index, projected key)`.
pub struct NeighborProjections {
    rp_max_squared: f64,
    pi_max_squared: f64,
}

impl NeighborProjections {
    pub fn new(rp_max_squared: f64, pi_max_squared: f64) -> Self {
        NeighborProjections {
            rp_max_squared,
            pi_max_squared,
        }
    }
}

impl PairKernel<crate::metric::ProjectedKey> for NeighborProjections {
    const UNIQUE_PAIRS: bool = false;
    type State = Vec<(usize, crate::metric::ProjectedKey)>;

    fn init_state(&self) -> Self::State {
        Vec::new()
    }

    #[inline(always)]
    fn consume(
        &self,
        state: &mut Self::State,
        key: &crate::metric::ProjectedKey,
        pair: PairRef,
    ) -> ControlFlow<()> {
        if key.rp_squared <= self.rp_max_squared && key.pi_squared <= self.pi_max_squared {
            state.push((pair.neighbor, *key));
        }
        ControlFlow::Continue(())
    }

    fn merge(&self, state: &mut Self::State, other: Self::State) {
        state.extend(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: PairRef = PairRef {
        home: 0,
        neighbor: 1,
    };

    #[test]
    fn cumulative_counts_consume_and_merge() {
        let thresholds = Thresholds::new(&[1.0, 2.0, 3.0]).unwrap();
        let kernel = CumulativeCounts::new(&thresholds);
        let mut state = kernel.init_state();
        let _ = kernel.consume(&mut state, &0.25, PAIR);
        let _ = kernel.consume(&mut state, &4.0, PAIR);
        let _ = kernel.consume(&mut state, &16.0, PAIR);
        assert_eq!(state, [1, 1, 0]);

        let mut other = kernel.init_state();
        let _ = kernel.consume(&mut other, &9.0, PAIR);
        kernel.merge(&mut state, other);
        assert_eq!(state, [1, 1, 1]);
    }

    #[test]
    fn weighted_counts() {
        let thresholds = Thresholds::new(&[1.0]).unwrap();
        let weights_a = [2.0, 3.0];
        let weights_b = [0.5, 4.0];
        let kernel = WeightedCumulativeCounts::new(&thresholds, Some(&weights_a), Some(&weights_b));
        let mut state = kernel.init_state();
        let _ = kernel.consume(&mut state, &0.5, PAIR);
        assert_eq!(state, [8.0]);

        let kernel = WeightedCumulativeCounts::new(&thresholds, None, Some(&weights_b));
        let mut state = kernel.init_state();
        let _ = kernel.consume(&mut state, &0.5, PAIR);
        assert_eq!(state, [4.0]);
    }

    #[test]
    fn grid_counts_2d() {
        let rp = Thresholds::new(&[1.0, 2.0]).unwrap();
        let pi = Thresholds::new(&[1.0, 2.0, 3.0]).unwrap();
        let kernel = GridCounts2D::new(&rp, &pi);
        let mut state = PairKernel::<crate::metric::ProjectedKey>::init_state(&kernel);
        let key = crate::metric::ProjectedKey {
            rp_squared: 2.0,
            pi_squared: 0.5,
        };
        let _ = kernel.consume(&mut state, &key, PAIR);
        assert_eq!(state, [0, 0, 0, 1, 0, 0]);

        // pi exceeds every threshold
        let key = crate::metric::ProjectedKey {
            rp_squared: 0.0,
            pi_squared: 10.0,
        };
        let _ = kernel.consume(&mut state, &key, PAIR);
        assert_eq!(state, [0, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn jackknife_excludes_touching_pairs() {
        let thresholds = Thresholds::new(&[1.0]).unwrap();
        let labels_a = [1, 2];
        let labels_b = [3, 2];
        let kernel = JackknifeCounts::new(&thresholds, &labels_a, &labels_b, None, None, 3);
        let mut state = kernel.init_state();
        // labels (1, 2)
        let _ = kernel.consume(&mut state, &0.5, PAIR);
        // labels (2, 2)
        let _ = kernel.consume(&mut state, &0.5, PairRef { home: 1, neighbor: 1 });
        assert_eq!(state, [2.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn jackknife_rows_keep_small_weights() {
        let thresholds = Thresholds::new(&[1.0]).unwrap();
        let labels = [1, 2, 3];
        let weights = [1e16, 1.0, 1.0];
        let kernel = JackknifeCounts::new(
            &thresholds,
            &labels,
            &labels,
            Some(&weights),
            Some(&weights),
            3,
        );
        let mut state = kernel.init_state();
        for (home, neighbor) in [(0, 1), (0, 2), (1, 2)] {
            let _ = kernel.consume(&mut state, &0.25, PairRef { home, neighbor });
        }
        // dropping region 1 leaves the unit-weight pair (1, 2)
        assert_eq!(state[1], 1.0);
        assert_eq!(&state[2..], [1e16, 1e16]);
    }

    #[test]
    fn isolation_breaks_early() {
        let kernel = SphericalIsolation::new(RadiusSquared::Uniform(1.0));
        let mut state = kernel.init_state();
        assert_eq!(kernel.consume(&mut state, &4.0, PAIR), ControlFlow::Continue(()));
        assert!(!state);
        assert_eq!(kernel.consume(&mut state, &1.0, PAIR), ControlFlow::Break(()));
        assert!(state);

        let radii = [0.0, 9.0];
        let kernel = SphericalIsolation::new(RadiusSquared::PerPoint(&radii));
        let mut state = kernel.init_state();
        let _ = kernel.consume(&mut state, &4.0, PAIR);
        assert!(!state);
        let _ = kernel.consume(&mut state, &4.0, PairRef { home: 1, neighbor: 0 });
        assert!(state);
    }

    #[test]
    fn neighbor_projections() {
        let kernel = NeighborProjections::new(4.0, 1.0);
        let mut state = kernel.init_state();
        let inside = crate::metric::ProjectedKey {
            rp_squared: 4.0,
            pi_squared: 0.25,
        };
        let outside = crate::metric::ProjectedKey {
            rp_squared: 1.0,
            pi_squared: 2.0,
        };
        let _ = kernel.consume(&mut state, &outside, PAIR);
        let _ = kernel.consume(&mut state, &inside, PairRef { home: 0, neighbor: 3 });
        assert_eq!(state, [(3, inside)]);
    }

    #[test]
    fn cylindrical_isolation() {
        let kernel =
            CylindricalIsolation::new(RadiusSquared::Uniform(1.0), RadiusSquared::Uniform(4.0));
        let mut state = kernel.init_state();
        let outside = crate::metric::ProjectedKey {
            rp_squared: 0.5,
            pi_squared: 5.0,
        };
        let _ = kernel.consume(&mut state, &outside, PAIR);
        assert!(!state);
        let inside = crate::metric::ProjectedKey {
            rp_squared: 1.0,
            pi_squared: 4.0,
        };
        let _ = kernel.consume(&mut state, &inside, PAIR);
        assert!(state);
    }
}
