use ndarray::Array2;
use proptest::prelude::*;
use segmenta::stats::f_distribution_p_value;
use segmenta::{silhouette_samples, standardize, FeatureMatrix, KMeans};

fn matrix(rows: usize, cols: usize) -> impl Strategy<Value = Array2<f64>> {
    prop::collection::vec(-50.0f64..50.0, rows * cols)
        .prop_map(move |v| Array2::from_shape_vec((rows, cols), v).unwrap())
}

fn sized_matrix() -> impl Strategy<Value = Array2<f64>> {
    (4usize..20, 1usize..6).prop_flat_map(|(rows, cols)| matrix(rows, cols))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scaled_columns_have_zero_mean_unit_sd(data in sized_matrix()) {
        let features = FeatureMatrix::from_array(data).unwrap();
        // Continuous random draws never produce a constant column
        let scaled = standardize(&features).unwrap();
        let view = scaled.view();
        let m = view.nrows() as f64;

        for column in view.columns() {
            let mean = column.sum() / m;
            let var = column.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (m - 1.0);
            prop_assert!(mean.abs() < 1e-9);
            prop_assert!((var.sqrt() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn labels_stay_in_range(data in sized_matrix(), k in 1usize..4, seed in any::<u64>()) {
        let solution = KMeans::new(k).n_init(3).random_state(seed).fit(data.view()).unwrap();

        prop_assert_eq!(solution.labels.len(), data.nrows());
        prop_assert!(solution.labels.iter().all(|&l| l < k));
        prop_assert!(solution.cluster_sizes().iter().all(|&s| s > 0));
    }

    #[test]
    fn fit_is_reproducible(data in sized_matrix(), seed in any::<u64>()) {
        let engine = KMeans::new(2).n_init(4).random_state(seed);
        let a = engine.fit(data.view()).unwrap();
        let b = engine.fit(data.view()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn best_inertia_bounds_every_restart(data in sized_matrix(), seed in any::<u64>()) {
        let engine = KMeans::new(3).n_init(5).random_state(seed);
        let best = engine.fit(data.view()).unwrap();
        for solution in engine.fit_all(data.view()).unwrap() {
            prop_assert!(best.inertia <= solution.inertia);
        }
    }

    #[test]
    fn silhouettes_are_bounded(data in sized_matrix(), seed in any::<u64>()) {
        let solution = KMeans::new(2).n_init(2).random_state(seed).fit(data.view()).unwrap();
        let samples = silhouette_samples(data.view(), solution.labels.view(), 2).unwrap();
        prop_assert!(samples.iter().all(|&s| (-1.0..=1.0).contains(&s)));
    }

    #[test]
    fn f_p_values_are_probabilities(f in 0.0f64..1e4, df1 in 1usize..60, df2 in 1usize..500) {
        let p = f_distribution_p_value(f, df1, df2);
        prop_assert!((0.0..=1.0).contains(&p), "p = {p} for F = {f} on ({df1}, {df2})");
    }
}
