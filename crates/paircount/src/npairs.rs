//! Engines that count the pairs of a sample (or of two samples) as a
//! function of separation.
//!
//! Every count is cumulative: the entry associated with the threshold `r_k`
//! holds the number of pairs separated by no more than `r_k`. In an
//! auto-correlation (`data2` is `None`) each unique pair is counted once and a
//! point is never paired with itself. In a cross-correlation every `(i, j)`
//! combination is considered.

use crate::config::CountConfig;
use crate::engine::{IndexedSamples, projected_extent, reduce_pairs, thresholds};
use crate::error::Error;
use ndarray::Array2;
use paircount_nostd_internal::{
    CumulativeCounts, Domain, Euclidean, GridCounts2D, Metric, Points, Projected,
    SMu, Thresholds, TwoComponentKey, WeightedCumulativeCounts, cumulate, cumulate_2d,
};
use tracing::info_span;

fn n_points2(data1: &Points, data2: Option<&Points>) -> usize {
    data2.map_or(data1.n_points(), |d| d.n_points())
}

/// Counts the pairs separated (in 3D) by no more than each threshold in
/// `rbins`.
///
/// The output holds one entry per threshold.
///
/// ```
/// use ndarray::ArrayView2;
/// use paircount::{CountConfig, Domain, Points, npairs_3d};
/// #[rustfmt::skip]
/// let positions = [
///     0.0, 0.0,
///     0.0, 0.0,
///     0.0, 5.0,
/// ];
/// let points = Points::new(ArrayView2::from_shape((3, 2), &positions).unwrap(), None).unwrap();
/// let domain = Domain::non_periodic([10.0; 3]).unwrap();
/// let counts = npairs_3d(
///     &points, None, &[3.0, 6.0, 10.0], &domain, &CountConfig::default()
/// ).unwrap();
/// assert_eq!(counts, [0, 1, 1]);
/// ```
pub fn npairs_3d(
    data1: &Points,
    data2: Option<&Points>,
    rbins: &[f64],
    domain: &Domain,
    config: &CountConfig,
) -> Result<Vec<u64>, Error> {
    let _span = info_span!(
        "npairs_3d",
        n1 = data1.n_points(),
        n2 = n_points2(data1, data2),
        n_rbins = rbins.len()
    )
    .entered();
    let rbins = thresholds("rbins", rbins)?;
    let Some(r_max_squared) = rbins.max_squared() else {
        return Ok(Vec::new());
    };
    let r_max = r_max_squared.sqrt();
    let samples = IndexedSamples::build(data1, data2, domain, [r_max; 3], config)?;
    let mut counts = reduce_pairs(&samples, &Euclidean, &CumulativeCounts::new(&rbins), config)?;
    cumulate(&mut counts);
    Ok(counts)
}

/// Like [`npairs_3d`], but each pair contributes the product of the weights
/// of its members (points without weights have a weight of 1).
pub fn weighted_npairs_3d(
    data1: &Points,
    data2: Option<&Points>,
    rbins: &[f64],
    domain: &Domain,
    config: &CountConfig,
) -> Result<Vec<f64>, Error> {
    let _span = info_span!(
        "weighted_npairs_3d",
        n1 = data1.n_points(),
        n2 = n_points2(data1, data2),
        n_rbins = rbins.len()
    )
    .entered();
    let rbins = thresholds("rbins", rbins)?;
    let Some(r_max_squared) = rbins.max_squared() else {
        return Ok(Vec::new());
    };
    let samples = IndexedSamples::build(data1, data2, domain, [r_max_squared.sqrt(); 3], config)?;
    let kernel = WeightedCumulativeCounts::new(
        &rbins,
        data1.weights(),
        data2.map_or(data1.weights(), |d| d.weights()),
    );
    let mut counts = reduce_pairs(&samples, &Euclidean, &kernel, config)?;
    cumulate(&mut counts);
    Ok(counts)
}

/// Counts the pairs with a separation perpendicular to the line of sight no
/// larger than each threshold in `rp_bins`, and a separation parallel to the
/// line of sight no larger than `pi_max`.
pub fn npairs_projected(
    data1: &Points,
    data2: Option<&Points>,
    rp_bins: &[f64],
    pi_max: f64,
    domain: &Domain,
    config: &CountConfig,
) -> Result<Vec<u64>, Error> {
    let _span = info_span!(
        "npairs_projected",
        n1 = data1.n_points(),
        n2 = n_points2(data1, data2),
        n_rp_bins = rp_bins.len(),
        pi_max
    )
    .entered();
    let rp_bins = thresholds("rp_bins", rp_bins)?;
    let pi_bins = thresholds("pi_max", &[pi_max])?;
    // a (n_rp, 1) histogram is laid out exactly like a 1D histogram
    count_projected(data1, data2, &rp_bins, &pi_bins, domain, config)
}

/// Counts the pairs separated by no more than each combination of the
/// thresholds perpendicular to (`rp_bins`) and along (`pi_bins`) the line of
/// sight.
///
/// Entry `(k, l)` of the output holds the number of pairs with `rp ≤ rp_k`
/// and `π ≤ π_l`.
pub fn npairs_xy_z(
    data1: &Points,
    data2: Option<&Points>,
    rp_bins: &[f64],
    pi_bins: &[f64],
    domain: &Domain,
    config: &CountConfig,
) -> Result<Array2<u64>, Error> {
    let _span = info_span!(
        "npairs_xy_z",
        n1 = data1.n_points(),
        n2 = n_points2(data1, data2),
        n_rp_bins = rp_bins.len(),
        n_pi_bins = pi_bins.len()
    )
    .entered();
    let rp_bins = thresholds("rp_bins", rp_bins)?;
    let pi_bins = thresholds("pi_bins", pi_bins)?;
    let counts = count_projected(data1, data2, &rp_bins, &pi_bins, domain, config)?;
    Ok(to_array2(rp_bins.len(), pi_bins.len(), &counts))
}

fn count_projected(
    data1: &Points,
    data2: Option<&Points>,
    rp_bins: &Thresholds,
    pi_bins: &Thresholds,
    domain: &Domain,
    config: &CountConfig,
) -> Result<Vec<u64>, Error> {
    let (Some(rp_max_squared), Some(pi_max_squared)) =
        (rp_bins.max_squared(), pi_bins.max_squared())
    else {
        return Ok(vec![0; rp_bins.len() * pi_bins.len()]);
    };
    let line_of_sight = config.line_of_sight();
    let extent = projected_extent(line_of_sight, rp_max_squared.sqrt(), pi_max_squared.sqrt());
    let samples = IndexedSamples::build(data1, data2, domain, extent, config)?;
    let metric = Projected { line_of_sight };
    count_grid_2d(&samples, &metric, rp_bins, pi_bins, config)
}

/// Fills a 2D first-hit histogram and converts it to cumulative counts.
fn count_grid_2d<M>(
    samples: &IndexedSamples,
    metric: &M,
    outer: &Thresholds,
    inner: &Thresholds,
    config: &CountConfig,
) -> Result<Vec<u64>, Error>
where
    M: Metric,
    M::Key: TwoComponentKey,
{
    let kernel = GridCounts2D::new(outer, inner);
    let mut counts = reduce_pairs(samples, metric, &kernel, config)?;
    cumulate_2d(&mut counts, outer.len(), inner.len());
    Ok(counts)
}

fn to_array2(n_outer: usize, n_inner: usize, counts: &[u64]) -> Array2<u64> {
    Array2::from_shape_fn((n_outer, n_inner), |(k, l)| counts[k * n_inner + l])
}

/// Counts pairs as a function of the redshift-space separation, `s`, and
/// `mu`, the cosine of the angle between the separation vector and the line
/// of sight.
///
/// Entry `(k, l)` of the output holds the number of pairs with `s ≤ s_k` and
/// `mu ≤ mu_l`. `mu` is defined as 0 for coincident points. Every threshold
/// in `mu_bins` must lie in `[0, 1]`.
pub fn npairs_s_mu(
    data1: &Points,
    data2: Option<&Points>,
    s_bins: &[f64],
    mu_bins: &[f64],
    domain: &Domain,
    config: &CountConfig,
) -> Result<Array2<u64>, Error> {
    let _span = info_span!(
        "npairs_s_mu",
        n1 = data1.n_points(),
        n2 = n_points2(data1, data2),
        n_s_bins = s_bins.len(),
        n_mu_bins = mu_bins.len()
    )
    .entered();
    if mu_bins.iter().any(|mu| *mu > 1.0) {
        return Err(Error::argument(
            "mu_bins",
            "thresholds must lie between 0 and 1 (inclusive)",
        ));
    }
    let s_bins = thresholds("s_bins", s_bins)?;
    let mu_bins = thresholds("mu_bins", mu_bins)?;
    let shape = (s_bins.len(), mu_bins.len());
    let s_max_squared = match s_bins.max_squared() {
        Some(s_max_squared) if !mu_bins.is_empty() => s_max_squared,
        _ => return Ok(Array2::zeros(shape)),
    };

    let samples = IndexedSamples::build(data1, data2, domain, [s_max_squared.sqrt(); 3], config)?;
    let metric = SMu {
        line_of_sight: config.line_of_sight(),
    };
    let counts = count_grid_2d(&samples, &metric, &s_bins, &mu_bins, config)?;
    Ok(to_array2(shape.0, shape.1, &counts))
}

/// Converts cumulative counts into the number of pairs in each interval
/// between consecutive thresholds.
///
/// The first entry is left unchanged (it counts the pairs separated by no
/// more than the first threshold).
pub fn exclusive_counts<T>(cumulative: &[T]) -> Vec<T>
where
    T: Copy + core::ops::Sub<Output = T>,
{
    let mut out = Vec::with_capacity(cumulative.len());
    if let Some(first) = cumulative.first() {
        out.push(*first);
    }
    for window in cumulative.windows(2) {
        out.push(window[1] - window[0]);
    }
    out
}
