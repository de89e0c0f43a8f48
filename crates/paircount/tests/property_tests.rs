use ndarray::Array2;
use paircount::{
    CountConfig, CountConfigBuilder, Domain, IsolationRadius, Points, npairs_3d,
    npairs_per_object_3d, npairs_xy_z, spherical_isolation,
};
use paircount_test::BruteForce;
use proptest::prelude::*;

mod common;

const LENGTH: f64 = 16.0;
const RBINS: [f64; 4] = [1.2, 2.7, 5.3, 7.9];

/// positions on a half-integer lattice, so that shifting them is exact
fn arb_positions(max_points: usize) -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec([0u32..32, 0u32..32, 0u32..32], 0..max_points)
        .prop_map(|points| {
            points
                .into_iter()
                .map(|p| p.map(|x| 0.5 * x as f64))
                .collect()
        })
}

fn to_array(points: &[[f64; 3]]) -> Array2<f64> {
    Array2::from_shape_fn((3, points.len()), |(k, i)| points[i][k])
}

fn view(positions: &Array2<f64>) -> Points<'_> {
    Points::new(positions.view(), None).unwrap()
}

fn config(num_threads: usize) -> CountConfig {
    CountConfigBuilder::new()
        .num_threads(num_threads)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn counts_ignore_point_order(points in arb_positions(60), periodic in any::<[bool; 3]>()) {
        common::init_tracing();
        let domain = Domain::new([LENGTH; 3], periodic).unwrap();
        let positions = to_array(&points);
        let reversed: Vec<[f64; 3]> = points.iter().rev().copied().collect();
        let reversed_positions = to_array(&reversed);

        let counts = npairs_3d(&view(&positions), None, &RBINS, &domain, &config(1)).unwrap();
        let reversed_counts =
            npairs_3d(&view(&reversed_positions), None, &RBINS, &domain, &config(2)).unwrap();
        prop_assert_eq!(&counts, &reversed_counts);

        // per-object rows follow the points around
        let per_object =
            npairs_per_object_3d(&view(&positions), None, &RBINS, &domain, &config(1)).unwrap();
        let reversed_per_object =
            npairs_per_object_3d(&view(&reversed_positions), None, &RBINS, &domain, &config(3))
                .unwrap();
        let n = points.len();
        for i in 0..n {
            prop_assert_eq!(per_object.row(i), reversed_per_object.row(n - 1 - i));
        }
    }

    #[test]
    fn counts_are_cumulative(points in arb_positions(60)) {
        common::init_tracing();
        let domain = Domain::periodic_cube(LENGTH).unwrap();
        let positions = to_array(&points);
        let counts = npairs_3d(&view(&positions), None, &RBINS, &domain, &config(2)).unwrap();
        prop_assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        let n = points.len() as u64;
        prop_assert!(counts[3] <= n * n.saturating_sub(1) / 2);
    }

    #[test]
    fn periodic_shift_invariance(
        points in arb_positions(50),
        shift in [0u32..32, 0u32..32, 0u32..32],
    ) {
        common::init_tracing();
        let domain = Domain::periodic_cube(LENGTH).unwrap();
        let shifted: Vec<[f64; 3]> = points
            .iter()
            .map(|p| std::array::from_fn(|k| p[k] + 0.5 * shift[k] as f64))
            .collect();
        let positions = to_array(&points);
        let shifted_positions = to_array(&shifted);

        let counts = npairs_3d(&view(&positions), None, &RBINS, &domain, &config(1)).unwrap();
        let shifted_counts =
            npairs_3d(&view(&shifted_positions), None, &RBINS, &domain, &config(1)).unwrap();
        prop_assert_eq!(counts, shifted_counts);
    }

    #[test]
    fn matches_brute_force(
        points1 in arb_positions(40),
        points2 in arb_positions(40),
        periodic in any::<[bool; 3]>(),
        cell_size in 0.5f64..20.0,
    ) {
        common::init_tracing();
        let domain = Domain::new([LENGTH; 3], periodic).unwrap();
        let reference = BruteForce::new([LENGTH; 3], periodic);
        let positions1 = to_array(&points1);
        let positions2 = to_array(&points2);
        let config = CountConfigBuilder::new()
            .approx_cell_size([cell_size; 3])
            .build()
            .unwrap();

        let expected = reference.npairs_3d(positions1.view(), Some(positions2.view()), &RBINS);
        let actual = npairs_3d(
            &view(&positions1), Some(&view(&positions2)), &RBINS, &domain, &config
        ).unwrap();
        prop_assert_eq!(actual, expected);

        let rp_bins = [1.0, 3.0];
        let pi_bins = [0.5, 2.0, 9.0];
        let expected = reference.npairs_xy_z(positions1.view(), None, &rp_bins, &pi_bins);
        let actual = npairs_xy_z(
            &view(&positions1), None, &rp_bins, &pi_bins, &domain, &config
        ).unwrap();
        prop_assert_eq!(actual, expected);

        let n1 = points1.len();
        let expected = reference.spherical_isolation(positions1.view(), None, &vec![2.0; n1]);
        let actual = spherical_isolation(
            &view(&positions1), None, IsolationRadius::Uniform(2.0), &domain, &config
        ).unwrap();
        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn empty_lattice() {
    let positions = to_array(&[]);
    assert_eq!(positions.shape(), [3, 0]);
    assert!(view(&positions).is_empty());
}
