use crate::config::CountConfig;
use crate::engine::{IndexedSamples, map_home_points, thresholds};
use crate::error::Error;
use ndarray::Array2;
use paircount_nostd_internal::{Domain, Euclidean, PerObjectCounts, Points, cumulate};
use tracing::info_span;

/// Counts, for every point of `data1`, the neighbors separated by no more
/// than each threshold in `rbins`.
///
/// Row `i` of the `(n1, n_rbins)` output corresponds to point `i` of `data1`
/// (in the caller's order). Neighbors are drawn from `data2` (or from `data1`
/// when `data2` is `None`, in which case a point is never its own neighbor).
pub fn npairs_per_object_3d(
    data1: &Points,
    data2: Option<&Points>,
    rbins: &[f64],
    domain: &Domain,
    config: &CountConfig,
) -> Result<Array2<u64>, Error> {
    let _span = info_span!(
        "npairs_per_object_3d",
        n1 = data1.n_points(),
        n2 = data2.map_or(data1.n_points(), |d| d.n_points()),
        n_rbins = rbins.len()
    )
    .entered();
    let rbins = thresholds("rbins", rbins)?;
    let n_rbins = rbins.len();
    let Some(r_max_squared) = rbins.max_squared() else {
        return Ok(Array2::zeros((data1.n_points(), 0)));
    };

    let samples = IndexedSamples::build(data1, data2, domain, [r_max_squared.sqrt(); 3], config)?;
    let mut rows = map_home_points(&samples, &Euclidean, &PerObjectCounts::new(&rbins), config)?;
    for row in rows.iter_mut() {
        cumulate(row);
    }
    Ok(Array2::from_shape_fn(
        (data1.n_points(), n_rbins),
        |(i, k)| rows[i][k],
    ))
}
