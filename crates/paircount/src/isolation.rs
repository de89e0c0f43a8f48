//! Isolation criteria: is a point free of neighbors within some volume?
//!
//! Both tests stop searching around a point as soon as the first neighbor is
//! found.

use crate::config::CountConfig;
use crate::engine::{IndexedSamples, check_len, map_home_points, projected_extent};
use crate::error::Error;
use paircount_nostd_internal::{
    CylindricalIsolation, Domain, Euclidean, Points, Projected, RadiusSquared, SphericalIsolation,
};
use tracing::info_span;

/// The size of the volume searched around each point of `data1`.
#[derive(Clone, Copy, Debug)]
pub enum IsolationRadius<'a> {
    /// the same radius for every point
    Uniform(f64),
    /// one radius per point of `data1`
    PerPoint(&'a [f64]),
}

impl IsolationRadius<'_> {
    /// checks the radius and computes the squared values (and the largest
    /// radius)
    fn squared<'s>(
        &self,
        who: &'static str,
        n_points: usize,
        storage: &'s mut Vec<f64>,
    ) -> Result<(RadiusSquared<'s>, f64), Error> {
        let valid = |r: f64| r.is_finite() && r >= 0.0;
        match *self {
            IsolationRadius::Uniform(r) => {
                if !valid(r) {
                    return Err(Error::argument(who, "the radius must be finite and non-negative"));
                }
                Ok((RadiusSquared::Uniform(r * r), r))
            }
            IsolationRadius::PerPoint(radii) => {
                check_len(who, n_points, radii.len())?;
                if !radii.iter().all(|r| valid(*r)) {
                    return Err(Error::argument(who, "each radius must be finite and non-negative"));
                }
                storage.extend(radii.iter().map(|r| r * r));
                let max = radii.iter().copied().fold(0.0, f64::max);
                Ok((RadiusSquared::PerPoint(storage.as_slice()), max))
            }
        }
    }
}

/// Tests whether each point of `data1` is isolated: whether no point of
/// `data2` lies within a sphere of radius `r_max` centered on it.
///
/// When `data2` is `None`, neighbors are drawn from `data1` (a point doesn't
/// count as its own neighbor). The output is `true` for isolated points and
/// follows the order of `data1`.
pub fn spherical_isolation(
    data1: &Points,
    data2: Option<&Points>,
    r_max: IsolationRadius,
    domain: &Domain,
    config: &CountConfig,
) -> Result<Vec<bool>, Error> {
    let _span = info_span!(
        "spherical_isolation",
        n1 = data1.n_points(),
        n2 = data2.map_or(data1.n_points(), |d| d.n_points())
    )
    .entered();
    let mut storage = Vec::new();
    let (r_squared, r_max) = r_max.squared("r_max", data1.n_points(), &mut storage)?;

    let samples = IndexedSamples::build(data1, data2, domain, [r_max; 3], config)?;
    let has_neighbor = map_home_points(
        &samples,
        &Euclidean,
        &SphericalIsolation::new(r_squared),
        config,
    )?;
    Ok(has_neighbor.into_iter().map(|found| !found).collect())
}

/// Tests whether each point of `data1` is isolated: whether no point of
/// `data2` lies within a cylinder centered on it. The cylinder is aligned
/// with the line of sight, with a radius of `rp_max` and a half-length of
/// `pi_max`.
///
/// Otherwise, this behaves just like [`spherical_isolation`].
pub fn cylindrical_isolation(
    data1: &Points,
    data2: Option<&Points>,
    rp_max: IsolationRadius,
    pi_max: IsolationRadius,
    domain: &Domain,
    config: &CountConfig,
) -> Result<Vec<bool>, Error> {
    let _span = info_span!(
        "cylindrical_isolation",
        n1 = data1.n_points(),
        n2 = data2.map_or(data1.n_points(), |d| d.n_points())
    )
    .entered();
    let n1 = data1.n_points();
    let (mut rp_storage, mut pi_storage) = (Vec::new(), Vec::new());
    let (rp_squared, rp_max) = rp_max.squared("rp_max", n1, &mut rp_storage)?;
    let (pi_squared, pi_max) = pi_max.squared("pi_max", n1, &mut pi_storage)?;

    let line_of_sight = config.line_of_sight();
    let extent = projected_extent(line_of_sight, rp_max, pi_max);
    let samples = IndexedSamples::build(data1, data2, domain, extent, config)?;
    let has_neighbor = map_home_points(
        &samples,
        &Projected { line_of_sight },
        &CylindricalIsolation::new(rp_squared, pi_squared),
        config,
    )?;
    Ok(has_neighbor.into_iter().map(|found| !found).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_validation() {
        let mut storage = Vec::new();
        assert!(IsolationRadius::Uniform(-1.0).squared("r", 2, &mut storage).is_err());
        assert!(IsolationRadius::Uniform(f64::NAN).squared("r", 2, &mut storage).is_err());
        let radii = [1.0, 2.0, 3.0];
        assert!(IsolationRadius::PerPoint(&radii).squared("r", 2, &mut storage).is_err());
        let radii = [1.0, -2.0];
        assert!(IsolationRadius::PerPoint(&radii).squared("r", 2, &mut storage).is_err());

        let mut storage = Vec::new();
        let radii = [1.0, 3.0];
        let (squared, max) = IsolationRadius::PerPoint(&radii)
            .squared("r", 2, &mut storage)
            .unwrap();
        assert_eq!(max, 3.0);
        assert_eq!(squared.get(1), 9.0);
    }
}
