//! Testing helpers: seeded random catalogs and brute-force (`O(N²)`)
//! reference implementations of every pair-counting engine.
//!
//! The references examine every pair directly, without any spatial
//! partitioning, so they're only suitable for small catalogs.

use ndarray::{Array2, ArrayView2, Axis};
use paircount_nostd_internal::Points;
use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

/// A random catalog of points with weights and jackknife labels.
pub struct Catalog {
    positions: Array2<f64>,
    weights: Vec<f64>,
    labels: Vec<u32>,
}

impl Catalog {
    /// Draws `n_points` positions uniformly from `[0, L)` along each axis.
    ///
    /// Weights are drawn uniformly from `[0.5, 2.0)`. Labels split the box
    /// into `n_regions` slabs along the x-axis (labels start at 1).
    pub fn from_random(n_points: usize, lengths: [f64; 3], n_regions: u32, seed: u64) -> Catalog {
        assert!(n_regions > 0);
        let mut my_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut positions = Array2::<f64>::zeros([3, n_points]);
        for (dim, length) in lengths.iter().enumerate() {
            let dist = Uniform::try_from(0.0..*length).unwrap();
            for i in 0..n_points {
                positions[[dim, i]] = dist.sample(&mut my_rng);
            }
        }

        let weight_dist = Uniform::try_from(0.5..2.0).unwrap();
        let weights = (0..n_points)
            .map(|_| weight_dist.sample(&mut my_rng))
            .collect();

        let labels = positions
            .index_axis(Axis(0), 0)
            .iter()
            .map(|x| {
                let slab = (x / lengths[0] * (n_regions as f64)) as u32;
                slab.min(n_regions - 1) + 1
            })
            .collect();

        Catalog {
            positions,
            weights,
            labels,
        }
    }

    /// Builds a catalog from explicit positions (with a shape of `(3, n)`),
    /// unit weights and a single jackknife region.
    pub fn from_positions(positions: ArrayView2<f64>) -> Catalog {
        assert_eq!(positions.len_of(Axis(0)), 3);
        let n_points = positions.len_of(Axis(1));
        Catalog {
            positions: positions.to_owned(),
            weights: vec![1.0; n_points],
            labels: vec![1; n_points],
        }
    }

    pub fn n_points(&self) -> usize {
        self.positions.len_of(Axis(1))
    }

    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.positions.view()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// the catalog's points, without weights
    pub fn points(&self) -> Points<'_> {
        Points::new(self.positions.view(), None).unwrap()
    }

    /// the catalog's points, with weights
    pub fn weighted_points(&self) -> Points<'_> {
        Points::new(self.positions.view(), Some(&self.weights)).unwrap()
    }
}

/// A box that may be periodic along each axis, used by the brute-force
/// references.
#[derive(Clone, Copy, Debug)]
pub struct BruteForce {
    pub lengths: [f64; 3],
    pub periodic: [bool; 3],
    /// axis treated as the line of sight
    pub los_axis: usize,
}

impl BruteForce {
    pub fn new(lengths: [f64; 3], periodic: [bool; 3]) -> Self {
        BruteForce {
            lengths,
            periodic,
            los_axis: 2,
        }
    }

    fn wrapped(&self, positions: ArrayView2<f64>, i: usize) -> [f64; 3] {
        std::array::from_fn(|k| {
            let x = positions[[k, i]];
            if self.periodic[k] {
                let wrapped = x.rem_euclid(self.lengths[k]);
                if wrapped >= self.lengths[k] { 0.0 } else { wrapped }
            } else {
                x
            }
        })
    }

    /// the minimum-image displacement from `a` to `b`
    pub fn displacement(&self, a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
        std::array::from_fn(|k| {
            let d = b[k] - a[k];
            let half = 0.5 * self.lengths[k];
            if !self.periodic[k] {
                d
            } else if d > half {
                d - self.lengths[k]
            } else if d < -half {
                d + self.lengths[k]
            } else {
                d
            }
        })
    }

    /// Calls `f(i, j, displacement)` for each pair.
    ///
    /// When `pos2` is `None`, pairs are drawn from `pos1`: self-pairs are
    /// skipped, and each pair is visited once when `unique` is true (in
    /// both orders otherwise).
    pub fn for_each_pair(
        &self,
        pos1: ArrayView2<f64>,
        pos2: Option<ArrayView2<f64>>,
        unique: bool,
        mut f: impl FnMut(usize, usize, [f64; 3]),
    ) {
        let other = match pos2.as_ref() {
            Some(p) => p.view(),
            None => pos1.view(),
        };
        let n1 = pos1.len_of(Axis(1));
        let n2 = other.len_of(Axis(1));
        for i in 0..n1 {
            let a = self.wrapped(pos1, i);
            for j in 0..n2 {
                if pos2.is_none() && (j == i || (unique && j < i)) {
                    continue;
                }
                let b = self.wrapped(other, j);
                f(i, j, self.displacement(a, b));
            }
        }
    }

    fn perp_squared(&self, d: &[f64; 3]) -> f64 {
        (0..3)
            .filter(|k| *k != self.los_axis)
            .map(|k| d[k] * d[k])
            .sum()
    }

    pub fn npairs_3d(
        &self,
        pos1: ArrayView2<f64>,
        pos2: Option<ArrayView2<f64>>,
        rbins: &[f64],
    ) -> Vec<u64> {
        let mut counts = vec![0; rbins.len()];
        self.for_each_pair(pos1, pos2, true, |_, _, d| {
            let s_squared = squared_norm(&d);
            for (k, r) in rbins.iter().enumerate() {
                if s_squared <= r * r {
                    counts[k] += 1;
                }
            }
        });
        counts
    }

    pub fn weighted_npairs_3d(
        &self,
        pos1: ArrayView2<f64>,
        weights1: &[f64],
        pos2: Option<(ArrayView2<f64>, &[f64])>,
        rbins: &[f64],
    ) -> Vec<f64> {
        let weights2 = pos2.map_or(weights1, |(_, w)| w);
        let mut counts = vec![0.0; rbins.len()];
        self.for_each_pair(pos1, pos2.map(|(p, _)| p), true, |i, j, d| {
            let s_squared = squared_norm(&d);
            for (k, r) in rbins.iter().enumerate() {
                if s_squared <= r * r {
                    counts[k] += weights1[i] * weights2[j];
                }
            }
        });
        counts
    }

    pub fn npairs_xy_z(
        &self,
        pos1: ArrayView2<f64>,
        pos2: Option<ArrayView2<f64>>,
        rp_bins: &[f64],
        pi_bins: &[f64],
    ) -> Array2<u64> {
        let mut counts = Array2::zeros((rp_bins.len(), pi_bins.len()));
        self.for_each_pair(pos1, pos2, true, |_, _, d| {
            let rp_squared = self.perp_squared(&d);
            let pi_squared = d[self.los_axis] * d[self.los_axis];
            for (k, rp) in rp_bins.iter().enumerate() {
                for (l, pi) in pi_bins.iter().enumerate() {
                    if rp_squared <= rp * rp && pi_squared <= pi * pi {
                        counts[[k, l]] += 1;
                    }
                }
            }
        });
        counts
    }

    pub fn npairs_s_mu(
        &self,
        pos1: ArrayView2<f64>,
        pos2: Option<ArrayView2<f64>>,
        s_bins: &[f64],
        mu_bins: &[f64],
    ) -> Array2<u64> {
        let mut counts = Array2::zeros((s_bins.len(), mu_bins.len()));
        self.for_each_pair(pos1, pos2, true, |_, _, d| {
            let s_squared = squared_norm(&d);
            let pi_squared = d[self.los_axis] * d[self.los_axis];
            let mu_squared = if s_squared == 0.0 {
                0.0
            } else {
                pi_squared / s_squared
            };
            for (k, s) in s_bins.iter().enumerate() {
                for (l, mu) in mu_bins.iter().enumerate() {
                    if s_squared <= s * s && mu_squared <= mu * mu {
                        counts[[k, l]] += 1;
                    }
                }
            }
        });
        counts
    }

    pub fn npairs_per_object_3d(
        &self,
        pos1: ArrayView2<f64>,
        pos2: Option<ArrayView2<f64>>,
        rbins: &[f64],
    ) -> Array2<u64> {
        let mut counts = Array2::zeros((pos1.len_of(Axis(1)), rbins.len()));
        self.for_each_pair(pos1, pos2, false, |i, _, d| {
            let s_squared = squared_norm(&d);
            for (k, r) in rbins.iter().enumerate() {
                if s_squared <= r * r {
                    counts[[i, k]] += 1;
                }
            }
        });
        counts
    }

    /// Row `s` only includes pairs where neither label is `s`.
    #[allow(clippy::too_many_arguments)]
    pub fn npairs_jackknife_3d(
        &self,
        pos1: ArrayView2<f64>,
        weights1: &[f64],
        labels1: &[u32],
        pos2: Option<(ArrayView2<f64>, &[f64], &[u32])>,
        n_regions: usize,
        rbins: &[f64],
    ) -> Array2<f64> {
        let weights2 = pos2.map_or(weights1, |(_, w, _)| w);
        let labels2 = pos2.map_or(labels1, |(_, _, l)| l);
        let mut counts = Array2::zeros((n_regions + 1, rbins.len()));
        self.for_each_pair(pos1, pos2.map(|(p, _, _)| p), true, |i, j, d| {
            let s_squared = squared_norm(&d);
            let w = weights1[i] * weights2[j];
            for s in 0..=n_regions {
                if s > 0 && (labels1[i] as usize == s || labels2[j] as usize == s) {
                    continue;
                }
                for (k, r) in rbins.iter().enumerate() {
                    if s_squared <= r * r {
                        counts[[s, k]] += w;
                    }
                }
            }
        });
        counts
    }

    /// `true` for points without a neighbor within `r_max[i]`
    pub fn spherical_isolation(
        &self,
        pos1: ArrayView2<f64>,
        pos2: Option<ArrayView2<f64>>,
        r_max: &[f64],
    ) -> Vec<bool> {
        let mut isolated = vec![true; pos1.len_of(Axis(1))];
        self.for_each_pair(pos1, pos2, false, |i, _, d| {
            if squared_norm(&d) <= r_max[i] * r_max[i] {
                isolated[i] = false;
            }
        });
        isolated
    }

    pub fn cylindrical_isolation(
        &self,
        pos1: ArrayView2<f64>,
        pos2: Option<ArrayView2<f64>>,
        rp_max: &[f64],
        pi_max: &[f64],
    ) -> Vec<bool> {
        let mut isolated = vec![true; pos1.len_of(Axis(1))];
        self.for_each_pair(pos1, pos2, false, |i, _, d| {
            let pi_squared = d[self.los_axis] * d[self.los_axis];
            if self.perp_squared(&d) <= rp_max[i] * rp_max[i] && pi_squared <= pi_max[i] * pi_max[i]
            {
                isolated[i] = false;
            }
        });
        isolated
    }

    /// every `(i, j, distance)` with `distance ≤ r_max`, sorted by `i` then `j`
    pub fn pairwise_distance_3d(
        &self,
        pos1: ArrayView2<f64>,
        pos2: Option<ArrayView2<f64>>,
        r_max: f64,
    ) -> Vec<(usize, usize, f64)> {
        let mut out = Vec::new();
        self.for_each_pair(pos1, pos2, false, |i, j, d| {
            let s_squared = squared_norm(&d);
            if s_squared <= r_max * r_max {
                out.push((i, j, s_squared.sqrt()));
            }
        });
        out
    }

    /// every `(i, j, rp, pi)` with `rp ≤ rp_max` and `pi ≤ pi_max`, sorted by
    /// `i` then `j`
    pub fn pairwise_distance_xy_z(
        &self,
        pos1: ArrayView2<f64>,
        pos2: Option<ArrayView2<f64>>,
        rp_max: f64,
        pi_max: f64,
    ) -> Vec<(usize, usize, f64, f64)> {
        let mut out = Vec::new();
        self.for_each_pair(pos1, pos2, false, |i, j, d| {
            let rp_squared = self.perp_squared(&d);
            let pi_squared = d[self.los_axis] * d[self.los_axis];
            if rp_squared <= rp_max * rp_max && pi_squared <= pi_max * pi_max {
                out.push((i, j, rp_squared.sqrt(), d[self.los_axis].abs()));
            }
        });
        out
    }
}

fn squared_norm(d: &[f64; 3]) -> f64 {
    d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
}
