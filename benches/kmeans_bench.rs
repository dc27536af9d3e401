use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::prelude::*;
use segmenta::{diagnostic_curve, silhouette_score, InitMethod, KMeans};

fn generate_survey_scores(n_samples: usize, n_features: usize, n_segments: usize) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    let centers: Vec<Vec<f64>> = (0..n_segments)
        .map(|_| (0..n_features).map(|_| rng.gen_range(1.0..7.0)).collect())
        .collect();

    let mut data = Vec::with_capacity(n_samples * n_features);
    for i in 0..n_samples {
        let center = &centers[i % n_segments];
        for &c in center {
            data.push(c + rng.gen_range(-0.8..0.8));
        }
    }

    Array2::from_shape_vec((n_samples, n_features), data).unwrap()
}

fn bench_kmeans_init(c: &mut Criterion) {
    let data = generate_survey_scores(300, 7, 4);

    let mut group = c.benchmark_group("kmeans_init");

    for &n_clusters in &[2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("random_init", n_clusters),
            &n_clusters,
            |b, &k| {
                let kmeans = KMeans::new(k)
                    .init_method(InitMethod::Random)
                    .random_state(42)
                    .n_init(1);

                b.iter(|| black_box(kmeans.fit(black_box(data.view())).unwrap()));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("kmeans_plus_plus", n_clusters),
            &n_clusters,
            |b, &k| {
                let kmeans = KMeans::new(k)
                    .init_method(InitMethod::KMeansPlusPlus)
                    .random_state(42)
                    .n_init(1);

                b.iter(|| black_box(kmeans.fit(black_box(data.view())).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_restarts(c: &mut Criterion) {
    let data = generate_survey_scores(500, 7, 4);

    let mut group = c.benchmark_group("restarts");

    for &n_init in &[1, 10, 25] {
        group.bench_with_input(BenchmarkId::new("parallel", n_init), &n_init, |b, &r| {
            let kmeans = KMeans::new(4).random_state(42).n_init(r);
            b.iter(|| black_box(kmeans.fit(black_box(data.view())).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("sequential", n_init), &n_init, |b, &r| {
            let kmeans = KMeans::new(4).random_state(42).n_init(r).n_jobs(1);
            b.iter(|| black_box(kmeans.fit(black_box(data.view())).unwrap()));
        });
    }

    group.finish();
}

fn bench_diagnostics(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnostics");

    for &n_samples in &[100, 300] {
        let data = generate_survey_scores(n_samples, 7, 4);
        let labels = KMeans::new(4)
            .random_state(42)
            .fit_predict(data.view())
            .unwrap();

        group.bench_with_input(BenchmarkId::new("silhouette", n_samples), &data, |b, data| {
            b.iter(|| black_box(silhouette_score(data.view(), labels.view(), 4).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("curve_2_to_8", n_samples), &data, |b, data| {
            b.iter(|| black_box(diagnostic_curve(data.view(), 2..=8, 42).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kmeans_init, bench_restarts, bench_diagnostics);
criterion_main!(benches);
