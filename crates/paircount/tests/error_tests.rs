use ndarray::ArrayView2;
use paircount::{
    CountConfig, CountConfigBuilder, Domain, ErrorCategory, IsolationRadius, Points,
    cylindrical_isolation, npairs_3d, npairs_jackknife_3d, npairs_projected, npairs_s_mu,
    pairwise_distance_3d, spherical_isolation,
};

mod common;

#[rustfmt::skip]
static POSITIONS: [f64; 9] = [
    1.0, 2.0, 3.0,
    1.0, 2.0, 3.0,
    1.0, 2.0, 3.0,
];

fn points() -> Points<'static> {
    Points::new(ArrayView2::from_shape((3, 3), &POSITIONS).unwrap(), None).unwrap()
}

fn domain() -> Domain {
    Domain::non_periodic([10.0; 3]).unwrap()
}

#[test]
fn bad_thresholds() {
    common::init_tracing();
    let config = CountConfig::default();
    for rbins in [
        &[2.0, 1.0][..],
        &[1.0, 1.0][..],
        &[-1.0, 1.0][..],
        &[1.0, f64::NAN][..],
        &[1.0, f64::INFINITY][..],
        &[1e155, 2e155][..],
    ] {
        let err = npairs_3d(&points(), None, rbins, &domain(), &config).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("rbins"), "{err}");
    }

    let err = npairs_projected(&points(), None, &[1.0], -1.0, &domain(), &config).unwrap_err();
    assert!(err.to_string().contains("pi_max"), "{err}");

    let err = npairs_s_mu(&points(), None, &[1.0], &[0.5, 1.5], &domain(), &config).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(err.to_string().contains("mu_bins"), "{err}");

    let err = pairwise_distance_3d(&points(), None, f64::NAN, &domain(), &config).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn points_outside_domain() {
    common::init_tracing();
    let config = CountConfig::default();
    #[rustfmt::skip]
    let positions = [
        1.0, 2.0,
        1.0, 2.0,
        1.0, 10.5,
    ];
    let outside = Points::new(ArrayView2::from_shape((3, 2), &positions).unwrap(), None).unwrap();

    let err = npairs_3d(&outside, None, &[1.0], &domain(), &config).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Domain);
    let msg = err.to_string();
    assert!(msg.contains("point 1 of data1"), "{msg}");

    let err = npairs_3d(&points(), Some(&outside), &[1.0], &domain(), &config).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Domain);
    assert!(err.to_string().contains("data2"));

    // the same points are fine when z is periodic
    let periodic_z = Domain::new([10.0; 3], [false, false, true]).unwrap();
    assert!(npairs_3d(&outside, None, &[1.0], &periodic_z, &config).is_ok());

    // non-finite coordinates are never allowed
    let positions = [1.0, 1.0, f64::NAN];
    let bad = Points::new(ArrayView2::from_shape((3, 1), &positions).unwrap(), None).unwrap();
    let periodic = Domain::periodic_cube(10.0).unwrap();
    let err = npairs_3d(&bad, None, &[1.0], &periodic, &config).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Domain);
}

#[test]
fn bad_shapes() {
    let positions = [0.0; 6];
    assert!(Points::new(ArrayView2::from_shape((2, 3), &positions).unwrap(), None).is_err());
    let weights = [1.0; 3];
    assert!(
        Points::new(
            ArrayView2::from_shape((3, 2), &positions).unwrap(),
            Some(&weights)
        )
        .is_err()
    );
    assert!(Domain::new([10.0, 0.0, 10.0], [true; 3]).is_err());
}

#[test]
fn bad_jackknife_arguments() {
    common::init_tracing();
    let config = CountConfig::default();
    let rbins = [1.0];

    let err = npairs_jackknife_3d(&points(), None, &rbins, &[1, 2, 3], None, 2, &domain(), &config)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(err.to_string().contains("point 2 of data1"), "{err}");

    let err = npairs_jackknife_3d(&points(), None, &rbins, &[0, 1, 1], None, 2, &domain(), &config)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);

    let err = npairs_jackknife_3d(&points(), None, &rbins, &[1, 1], None, 2, &domain(), &config)
        .unwrap_err();
    assert!(err.to_string().contains("labels1"), "{err}");

    assert!(
        npairs_jackknife_3d(&points(), None, &rbins, &[1, 1, 1], None, 0, &domain(), &config)
            .is_err()
    );

    // labels2 must accompany data2
    let err = npairs_jackknife_3d(
        &points(),
        Some(&points()),
        &rbins,
        &[1, 1, 1],
        None,
        1,
        &domain(),
        &config,
    )
    .unwrap_err();
    assert!(err.to_string().contains("labels2"), "{err}");
    assert!(
        npairs_jackknife_3d(
            &points(),
            None,
            &rbins,
            &[1, 1, 1],
            Some(&[1, 1, 1][..]),
            1,
            &domain(),
            &config,
        )
        .is_err()
    );
}

#[test]
fn bad_isolation_radii() {
    common::init_tracing();
    let config = CountConfig::default();
    let radii = [1.0, 2.0];
    let err = spherical_isolation(
        &points(),
        None,
        IsolationRadius::PerPoint(&radii),
        &domain(),
        &config,
    )
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(err.to_string().contains("r_max"), "{err}");

    let err = cylindrical_isolation(
        &points(),
        None,
        IsolationRadius::Uniform(1.0),
        IsolationRadius::Uniform(-1.0),
        &domain(),
        &config,
    )
    .unwrap_err();
    assert!(err.to_string().contains("pi_max"), "{err}");
}

#[test]
fn bad_config() {
    let err = CountConfigBuilder::new().num_threads(0).build().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(err.to_string().contains("num_threads"));

    let err = CountConfigBuilder::new()
        .approx_cell_size([1.0, -1.0, 1.0])
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("approx_cell_size"));
}
