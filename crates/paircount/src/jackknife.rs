//! Pair counts for jackknife resampling.
//!
//! Each point carries a label identifying the spatial region it belongs to.
//! The jackknife subsample `s` omits region `s`: it holds every pair where
//! neither member is labeled `s`. Every subsample is accumulated in the same
//! pass over the pairs as the full sample.

use crate::config::CountConfig;
use crate::engine::{IndexedSamples, check_len, reduce_pairs, thresholds};
use crate::error::Error;
use ndarray::Array2;
use paircount_nostd_internal::{Domain, Euclidean, JackknifeCounts, Points, cumulate};
use tracing::info_span;

fn check_labels(sample: &'static str, labels: &[u32], n_regions: usize) -> Result<(), Error> {
    match labels
        .iter()
        .enumerate()
        .find(|(_, label)| **label == 0 || **label as usize > n_regions)
    {
        Some((index, label)) => Err(Error::jackknife_label(sample, index, *label, n_regions)),
        None => Ok(()),
    }
}

/// Computes weighted cumulative pair counts for the full sample and for each
/// jackknife subsample.
///
/// `labels1` (and `labels2`, which must be provided exactly when `data2` is
/// provided) assign each point to a region in `[1, n_regions]`. Pairs
/// contribute the product of the weights of their members.
///
/// Row 0 of the `(n_regions + 1, n_rbins)` output holds the counts of the
/// full sample, and row `s` holds the counts of the subsample that omits
/// region `s`.
#[allow(clippy::too_many_arguments)]
pub fn npairs_jackknife_3d(
    data1: &Points,
    data2: Option<&Points>,
    rbins: &[f64],
    labels1: &[u32],
    labels2: Option<&[u32]>,
    n_regions: usize,
    domain: &Domain,
    config: &CountConfig,
) -> Result<Array2<f64>, Error> {
    let _span = info_span!(
        "npairs_jackknife_3d",
        n1 = data1.n_points(),
        n2 = data2.map_or(data1.n_points(), |d| d.n_points()),
        n_rbins = rbins.len(),
        n_regions
    )
    .entered();
    let rbins = thresholds("rbins", rbins)?;
    if n_regions == 0 {
        return Err(Error::integer_range("n_regions", 0, 1, i64::MAX));
    }
    check_len("labels1", data1.n_points(), labels1.len())?;
    check_labels("data1", labels1, n_regions)?;
    let labels2 = match (data2, labels2) {
        (Some(points), Some(labels)) => {
            check_len("labels2", points.n_points(), labels.len())?;
            check_labels("data2", labels, n_regions)?;
            labels
        }
        (None, None) => labels1,
        (Some(_), None) => {
            return Err(Error::argument(
                "labels2",
                "labels must be provided for data2",
            ));
        }
        (None, Some(_)) => {
            return Err(Error::argument(
                "labels2",
                "labels2 can only be provided alongside data2",
            ));
        }
    };

    let n_rbins = rbins.len();
    let Some(r_max_squared) = rbins.max_squared() else {
        return Ok(Array2::zeros((n_regions + 1, 0)));
    };

    let samples = IndexedSamples::build(data1, data2, domain, [r_max_squared.sqrt(); 3], config)?;
    let kernel = JackknifeCounts::new(
        &rbins,
        labels1,
        labels2,
        data1.weights(),
        data2.map_or(data1.weights(), |d| d.weights()),
        n_regions,
    );
    let mut counts = reduce_pairs(&samples, &Euclidean, &kernel, config)?;
    for row in counts.chunks_exact_mut(n_rbins) {
        cumulate(row);
    }
    Ok(Array2::from_shape_fn((n_regions + 1, n_rbins), |(s, k)| {
        counts[s * n_rbins + k]
    }))
}
