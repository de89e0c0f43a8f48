use crate::config::CountConfig;
use crate::engine::{IndexedSamples, map_home_points, projected_extent, thresholds};
use crate::error::Error;
use paircount_nostd_internal::{
    Domain, Euclidean, NeighborProjections, NeighborSeparations, Points, Projected,
};
use tracing::info_span;

/// A pair of points separated by no more than the search radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairSeparation {
    /// index of the point in `data1`
    pub i: usize,
    /// index of the point in `data2` (or in `data1`, for an auto-correlation)
    pub j: usize,
    pub distance: f64,
}

/// A pair of points that lies within the search cylinder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairProjection {
    /// index of the point in `data1`
    pub i: usize,
    /// index of the point in `data2` (or in `data1`, for an auto-correlation)
    pub j: usize,
    /// separation perpendicular to the line of sight
    pub rp: f64,
    /// absolute separation along the line of sight
    pub pi: f64,
}

/// Lists every pair of points separated (in 3D) by no more than `r_max`.
///
/// This is a sparse representation of the matrix of pairwise distances. The
/// pairs are sorted by `i`, then by `j`. For an auto-correlation both `(i, j)`
/// and `(j, i)` are listed (a point is never paired with itself).
pub fn pairwise_distance_3d(
    data1: &Points,
    data2: Option<&Points>,
    r_max: f64,
    domain: &Domain,
    config: &CountConfig,
) -> Result<Vec<PairSeparation>, Error> {
    let _span = info_span!(
        "pairwise_distance_3d",
        n1 = data1.n_points(),
        n2 = data2.map_or(data1.n_points(), |d| d.n_points()),
        r_max
    )
    .entered();
    thresholds("r_max", &[r_max])?;

    let samples = IndexedSamples::build(data1, data2, domain, [r_max; 3], config)?;
    let kernel = NeighborSeparations::new(r_max * r_max);
    let per_point = map_home_points(&samples, &Euclidean, &kernel, config)?;

    let mut out = Vec::new();
    for (i, mut neighbors) in per_point.into_iter().enumerate() {
        neighbors.sort_unstable_by_key(|(j, _)| *j);
        out.extend(neighbors.into_iter().map(|(j, s_squared)| PairSeparation {
            i,
            j,
            distance: s_squared.sqrt(),
        }));
    }
    Ok(out)
}

/// Lists every pair of points with a separation perpendicular to the line of
/// sight no larger than `rp_max`, and a separation along the line of sight no
/// larger than `pi_max`.
///
/// The output is ordered like the output of [`pairwise_distance_3d`].
pub fn pairwise_distance_xy_z(
    data1: &Points,
    data2: Option<&Points>,
    rp_max: f64,
    pi_max: f64,
    domain: &Domain,
    config: &CountConfig,
) -> Result<Vec<PairProjection>, Error> {
    let _span = info_span!(
        "pairwise_distance_xy_z",
        n1 = data1.n_points(),
        n2 = data2.map_or(data1.n_points(), |d| d.n_points()),
        rp_max,
        pi_max
    )
    .entered();
    thresholds("rp_max", &[rp_max])?;
    thresholds("pi_max", &[pi_max])?;

    let line_of_sight = config.line_of_sight();
    let extent = projected_extent(line_of_sight, rp_max, pi_max);
    let samples = IndexedSamples::build(data1, data2, domain, extent, config)?;
    let kernel = NeighborProjections::new(rp_max * rp_max, pi_max * pi_max);
    let per_point = map_home_points(&samples, &Projected { line_of_sight }, &kernel, config)?;

    let mut out = Vec::new();
    for (i, mut neighbors) in per_point.into_iter().enumerate() {
        neighbors.sort_unstable_by_key(|(j, _)| *j);
        out.extend(neighbors.into_iter().map(|(j, key)| PairProjection {
            i,
            j,
            rp: key.rp_squared.sqrt(),
            pi: key.pi_squared.sqrt(),
        }));
    }
    Ok(out)
}
