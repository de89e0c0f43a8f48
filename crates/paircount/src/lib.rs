/*!
Provides parallelized cell-list engines for counting the pairs of points in
(possibly periodic) 3D boxes, as a function of separation.

# High-Level: Pair Counts

Pair counts are the raw ingredient of
[2-point correlation function](https://en.wikipedia.org/wiki/Correlation_function_(astronomy))
estimators for galaxy clustering. Given one sample of points (an
auto-correlation) or two samples (a cross-correlation), the engines of this
crate count the pairs separated by no more than each of a list of
thresholds. Variants measure separation in 3D ([`npairs_3d`]), perpendicular
to and along a line of sight ([`npairs_projected`], [`npairs_xy_z`]), or in
terms of `s` and `mu` ([`npairs_s_mu`]). Others count neighbors per point
([`npairs_per_object_3d`]), count pairs for jackknife subsamples
([`npairs_jackknife_3d`]), or test whether points are isolated
([`spherical_isolation`], [`cylindrical_isolation`]).

Every count is cumulative: the output entry associated with the threshold
`r_k` holds the number of pairs separated by `≤ r_k`. Use
[`exclusive_counts`] to recover the number of pairs between consecutive
thresholds.

# User Guide

Positions are supplied as a `(3, n_points)` array (see [`Points`]), while the
box is described by a [`Domain`]. Along a periodic axis, coordinates are
wrapped into the box and separations use the minimum-image convention.

```
use ndarray::ArrayView2;
use paircount::{CountConfigBuilder, Domain, Points, npairs_3d};

#[rustfmt::skip]
let positions = [
    0.0, 0.0,
    0.0, 0.0,
    0.0, 9.0,
];
let points = Points::new(ArrayView2::from_shape((3, 2), &positions).unwrap(), None).unwrap();
let domain = Domain::periodic_cube(10.0).unwrap();
let config = CountConfigBuilder::new().num_threads(2).build().unwrap();
let counts = npairs_3d(&points, None, &[0.5, 1.5], &domain, &config).unwrap();
assert_eq!(counts, [0, 1]);
```

The work is distributed over threads with [rayon](https://docs.rs/rayon)
(see [`CountConfig`]). Results are bitwise identical regardless of the
number of threads. Progress is reported through [tracing](https://docs.rs/tracing)
spans and events.

# Developer Guide

See the crate-level documentation for [`paircount_nostd_internal`].

*/

#![deny(rustdoc::broken_intra_doc_links)]

// inform build-system of the crates in this package
mod config;
mod engine;
mod error;
mod executor;
mod isolation;
mod jackknife;
mod npairs;
mod pairwise_distance;
mod per_object;

// pull in symbols that visible outside of the package
pub use config::{CountConfig, CountConfigBuilder};
pub use error::{Error, ErrorCategory};
pub use executor::{Executor, RayonExecutor, SerialExecutor};
pub use isolation::{IsolationRadius, cylindrical_isolation, spherical_isolation};
pub use jackknife::npairs_jackknife_3d;
pub use npairs::{
    exclusive_counts, npairs_3d, npairs_projected, npairs_s_mu, npairs_xy_z, weighted_npairs_3d,
};
pub use paircount_nostd_internal::{Domain, LineOfSight, Points};
pub use pairwise_distance::{
    PairProjection, PairSeparation, pairwise_distance_3d, pairwise_distance_xy_z,
};
pub use per_object::npairs_per_object_3d;
