//! Multi-restart k-means (Lloyd's algorithm)

use crate::distance::squared_euclidean;
use crate::error::{Error, Result};
use crate::initialization::{initialize_centroids, InitMethod};
use crate::utils::{
    assign_points_to_centroids, assignments_equal, calculate_inertia, cluster_sizes,
    compute_means, validate_data, validate_parameters,
};
use ndarray::{Array1, Array2, ArrayView2};
use rand::prelude::*;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// K-means clustering engine.
///
/// Every restart `r` draws its initial centroids from an RNG seeded with
/// `random_state + r`, so results depend only on the data and parameters,
/// never on scheduling.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KMeans {
    /// Number of clusters
    pub n_clusters: usize,
    /// Initialization method
    pub init_method: InitMethod,
    /// Maximum number of Lloyd iterations per restart
    pub max_iter: usize,
    /// Number of independent restarts
    pub n_init: usize,
    /// Random seed for reproducibility
    pub random_state: Option<u64>,
    /// Number of parallel jobs (`Some(1)` forces sequential restarts)
    pub n_jobs: Option<usize>,
}

/// A fitted clustering solution
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterSolution {
    /// Cluster id for each input row, in `[0, k)`
    pub labels: Array1<usize>,
    /// Final centroids, `k x n_features`
    pub centroids: Array2<f64>,
    /// Sum of squared distances from each row to its centroid
    pub inertia: f64,
    /// Number of iterations performed
    pub n_iter: usize,
    /// Index of the restart that produced this solution
    pub restart: usize,
    /// Whether assignments stopped changing before the iteration cap
    pub converged: bool,
}

impl ClusterSolution {
    /// Number of clusters
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    /// Number of rows assigned to each cluster
    pub fn cluster_sizes(&self) -> Vec<usize> {
        cluster_sizes(self.labels.view(), self.n_clusters())
    }

    /// Assign new (already scaled) rows to their nearest centroid
    pub fn predict(&self, data: ArrayView2<f64>) -> Result<Array1<usize>> {
        if data.ncols() != self.centroids.ncols() {
            return Err(Error::DimensionMismatch {
                expected: self.centroids.ncols(),
                actual: data.ncols(),
            });
        }
        assign_points_to_centroids(data, self.centroids.view())
    }
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            n_clusters: 8,
            init_method: InitMethod::Random,
            max_iter: 300,
            n_init: 25,
            random_state: None,
            n_jobs: None,
        }
    }
}

impl KMeans {
    /// Create a new k-means clusterer with specified number of clusters
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Default::default()
        }
    }

    /// Set the initialization method
    pub fn init_method(mut self, method: InitMethod) -> Self {
        self.init_method = method;
        self
    }

    /// Set the maximum number of iterations
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of restarts
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the random seed for reproducibility
    pub fn random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Set the number of parallel jobs
    pub fn n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    /// Fit the model and return the lowest-inertia solution over all restarts
    pub fn fit(&self, data: ArrayView2<f64>) -> Result<ClusterSolution> {
        self.fit_with_rng::<StdRng>(data)
    }

    /// Like [`KMeans::fit`], drawing initial centroids from a caller-chosen RNG type
    pub fn fit_with_rng<R>(&self, data: ArrayView2<f64>) -> Result<ClusterSolution>
    where
        R: Rng + SeedableRng,
    {
        let solutions = self.fit_all_with_rng::<R>(data)?;
        let best = select_best(solutions)?;

        tracing::debug!(
            k = self.n_clusters,
            restart = best.restart,
            inertia = best.inertia,
            n_iter = best.n_iter,
            "selected best restart"
        );
        Ok(best)
    }

    /// Run every restart and return all solutions in restart order
    pub fn fit_all(&self, data: ArrayView2<f64>) -> Result<Vec<ClusterSolution>> {
        self.fit_all_with_rng::<StdRng>(data)
    }

    fn fit_all_with_rng<R>(&self, data: ArrayView2<f64>) -> Result<Vec<ClusterSolution>>
    where
        R: Rng + SeedableRng,
    {
        self.validate_input(data)?;

        let seed = self.random_state.unwrap_or(0);
        let run = |restart: usize| -> Result<ClusterSolution> {
            let mut rng = R::seed_from_u64(seed.wrapping_add(restart as u64));
            let centroids =
                initialize_centroids(data, self.n_clusters, self.init_method, &mut rng)?;
            self.lloyd(data, centroids, restart)
        };

        // Ordered collect keeps restart order regardless of completion order
        let results: Vec<Result<ClusterSolution>> = if self.should_use_parallel() {
            (0..self.n_init).into_par_iter().map(run).collect()
        } else {
            (0..self.n_init).map(run).collect()
        };

        results.into_iter().collect()
    }

    /// Run a single Lloyd pass from caller-supplied initial centroids
    pub fn fit_from_centroids(
        &self,
        data: ArrayView2<f64>,
        initial_centroids: ArrayView2<f64>,
    ) -> Result<ClusterSolution> {
        let k = initial_centroids.nrows();
        validate_data(data)?;
        if k != self.n_clusters {
            return Err(Error::invalid_parameter(format!(
                "expected {} initial centroids, got {k}",
                self.n_clusters
            )));
        }
        if k == 0 || k > data.nrows() {
            return Err(Error::InvalidK {
                k,
                n_samples: data.nrows(),
            });
        }
        if initial_centroids.ncols() != data.ncols() {
            return Err(Error::DimensionMismatch {
                expected: data.ncols(),
                actual: initial_centroids.ncols(),
            });
        }
        if self.max_iter == 0 {
            return Err(Error::invalid_parameter("max_iter must be > 0"));
        }

        self.lloyd(data, initial_centroids.to_owned(), 0)
    }

    /// Fit the model and return only the cluster assignments
    pub fn fit_predict(&self, data: ArrayView2<f64>) -> Result<Array1<usize>> {
        let result = self.fit(data)?;
        Ok(result.labels)
    }

    /// One restart of Lloyd's algorithm
    fn lloyd(
        &self,
        data: ArrayView2<f64>,
        initial_centroids: Array2<f64>,
        restart: usize,
    ) -> Result<ClusterSolution> {
        let k = initial_centroids.nrows();

        let mut labels = assign_points_to_centroids(data, initial_centroids.view())?;
        let mut reseeded = reseed_empty_clusters(data, initial_centroids.view(), &mut labels, k);

        let mut n_iter = 0;
        let mut converged = false;

        for iter in 0..self.max_iter {
            n_iter = iter + 1;

            let centroids = compute_means(data, labels.view(), k);
            let mut new_labels = assign_points_to_centroids(data, centroids.view())?;
            reseeded += reseed_empty_clusters(data, centroids.view(), &mut new_labels, k);

            if assignments_equal(labels.view(), new_labels.view()) {
                converged = true;
                break;
            }

            labels = new_labels;
            tracing::trace!(restart, iteration = n_iter, "assignments changed");
        }

        let centroids = compute_means(data, labels.view(), k);
        let inertia = calculate_inertia(data, centroids.view(), labels.view())?;

        tracing::debug!(
            restart,
            n_iter,
            converged,
            inertia,
            reseeded,
            "restart finished"
        );

        Ok(ClusterSolution {
            labels,
            centroids,
            inertia,
            n_iter,
            restart,
            converged,
        })
    }

    /// Validate input parameters and data
    fn validate_input(&self, data: ArrayView2<f64>) -> Result<()> {
        validate_data(data)?;

        if self.n_clusters == 0 || self.n_clusters > data.nrows() {
            return Err(Error::InvalidK {
                k: self.n_clusters,
                n_samples: data.nrows(),
            });
        }

        validate_parameters(self.n_clusters, self.max_iter, self.n_init)
    }

    /// Determine if parallel processing should be used
    fn should_use_parallel(&self) -> bool {
        match self.n_jobs {
            Some(1) => false,
            Some(_) => true,
            None => self.n_init > 1,
        }
    }
}

/// Move a point into every empty cluster.
///
/// For each empty cluster (ascending id) the point farthest from its own
/// centroid, taken from a cluster with at least two members, becomes the
/// sole member of the empty cluster. Since `k <= n_rows`, such a point
/// always exists. Returns the number of clusters reseeded.
fn reseed_empty_clusters(
    data: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
    labels: &mut Array1<usize>,
    n_clusters: usize,
) -> usize {
    let mut sizes = cluster_sizes(labels.view(), n_clusters);
    let mut reseeded = 0;

    for cluster in 0..n_clusters {
        if sizes[cluster] > 0 {
            continue;
        }

        let mut farthest: Option<(usize, f64)> = None;
        for (i, point) in data.rows().into_iter().enumerate() {
            let own = labels[i];
            if sizes[own] < 2 {
                continue;
            }
            let d = squared_euclidean(point, centroids.row(own));
            if farthest.map_or(true, |(_, best)| d > best) {
                farthest = Some((i, d));
            }
        }

        if let Some((point, distance)) = farthest {
            sizes[labels[point]] -= 1;
            labels[point] = cluster;
            sizes[cluster] = 1;
            reseeded += 1;
            tracing::debug!(cluster, point, distance, "reseeded empty cluster");
        }
    }

    reseeded
}

/// Lowest inertia wins; exact ties go to the lowest restart index
fn select_best(solutions: Vec<ClusterSolution>) -> Result<ClusterSolution> {
    let mut best: Option<ClusterSolution> = None;

    for solution in solutions {
        let better = match &best {
            None => true,
            Some(current) => {
                solution.inertia < current.inertia
                    || (solution.inertia == current.inertia && solution.restart < current.restart)
            }
        };
        if better {
            best = Some(solution);
        }
    }

    best.ok_or_else(|| Error::computation_error("No successful runs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn blobs() -> Array2<f64> {
        arr2(&[
            [0.0, 0.0],
            [0.2, 0.1],
            [0.1, 0.3],
            [5.0, 5.0],
            [5.2, 4.9],
            [4.9, 5.1],
            [10.0, 0.0],
            [10.1, 0.2],
            [9.8, 0.1],
        ])
    }

    #[test]
    fn test_kmeans_creation() {
        let kmeans = KMeans::new(3);
        assert_eq!(kmeans.n_clusters, 3);
        assert_eq!(kmeans.n_init, 25);
        assert_eq!(kmeans.init_method, InitMethod::Random);
    }

    #[test]
    fn test_kmeans_builder_pattern() {
        let kmeans = KMeans::new(5)
            .init_method(InitMethod::KMeansPlusPlus)
            .max_iter(50)
            .n_init(5)
            .random_state(42)
            .n_jobs(1);

        assert_eq!(kmeans.n_clusters, 5);
        assert_eq!(kmeans.init_method, InitMethod::KMeansPlusPlus);
        assert_eq!(kmeans.max_iter, 50);
        assert_eq!(kmeans.n_init, 5);
        assert_eq!(kmeans.random_state, Some(42));
        assert!(!kmeans.should_use_parallel());
    }

    #[test]
    fn test_separated_blobs() {
        let data = blobs();
        let result = KMeans::new(3).random_state(42).fit(data.view()).unwrap();

        assert_eq!(result.labels.len(), 9);
        assert_eq!(result.cluster_sizes(), vec![3, 3, 3]);
        for group in [[0, 1, 2], [3, 4, 5], [6, 7, 8]] {
            assert_eq!(result.labels[group[0]], result.labels[group[1]]);
            assert_eq!(result.labels[group[1]], result.labels[group[2]]);
        }
        assert!(result.converged);
        assert!(result.inertia < 1.0);
    }

    #[test]
    fn test_deterministic_given_seed() {
        let data = blobs();
        let kmeans = KMeans::new(3).random_state(7).n_init(10);

        let a = kmeans.fit(data.view()).unwrap();
        let b = kmeans.fit(data.view()).unwrap();
        let c = kmeans.clone().n_jobs(1).fit(data.view()).unwrap();

        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_best_is_minimum_over_restarts() {
        let data = blobs();
        let kmeans = KMeans::new(4).random_state(3).n_init(8);

        let all = kmeans.fit_all(data.view()).unwrap();
        let best = kmeans.fit(data.view()).unwrap();

        assert_eq!(all.len(), 8);
        for (i, solution) in all.iter().enumerate() {
            assert_eq!(solution.restart, i);
            assert!(best.inertia <= solution.inertia);
        }
        assert_eq!(&all[best.restart], &best);
    }

    #[test]
    fn test_tie_prefers_lowest_restart() {
        let data = blobs();
        // Every restart reaches the same optimum, so restart 0 must win
        let best = KMeans::new(1).n_init(4).fit(data.view()).unwrap();
        assert_eq!(best.restart, 0);
    }

    #[test]
    fn test_single_cluster_centroid_is_mean() {
        let data = arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let result = KMeans::new(1).n_init(1).fit(data.view()).unwrap();

        assert_eq!(result.centroids, arr2(&[[3.0, 4.0]]));
        assert_eq!(result.labels, arr1(&[0, 0, 0]));
        assert!((result.inertia - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_k_equals_rows() {
        let data = arr2(&[[1.0], [2.0], [4.0]]);
        let result = KMeans::new(3).n_init(3).random_state(1).fit(data.view()).unwrap();

        assert_eq!(result.cluster_sizes(), vec![1, 1, 1]);
        assert_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_empty_cluster_is_reseeded() {
        let data = arr2(&[[0.0], [1.0], [10.0], [11.0]]);
        // Clusters 0 and 2 start far from every point and empty immediately
        let initial = arr2(&[[100.0], [0.5], [200.0]]);

        let result = KMeans::new(3)
            .fit_from_centroids(data.view(), initial.view())
            .unwrap();

        assert_eq!(result.cluster_sizes(), vec![1, 2, 1]);
        assert_eq!(result.labels, arr1(&[1, 1, 2, 0]));
        assert_eq!(result.centroids, arr2(&[[11.0], [0.5], [10.0]]));
        assert!(result.converged);
    }

    #[test]
    fn test_initial_centroid_count_must_match_k() {
        let data = arr2(&[[0.0], [1.0], [10.0], [11.0]]);
        let initial = arr2(&[[0.5], [10.5]]);

        assert!(matches!(
            KMeans::new(3).fit_from_centroids(data.view(), initial.view()),
            Err(Error::InvalidParameter { .. })
        ));
        let result = KMeans::new(2)
            .fit_from_centroids(data.view(), initial.view())
            .unwrap();
        assert_eq!(result.labels, arr1(&[0, 0, 1, 1]));
    }

    #[test]
    fn test_reseed_reports_count() {
        let data = arr2(&[[0.0], [1.0], [10.0], [11.0]]);
        let centroids = arr2(&[[100.0], [0.5], [200.0]]);
        let mut labels = arr1(&[1, 1, 1, 1]);

        let reseeded = reseed_empty_clusters(data.view(), centroids.view(), &mut labels, 3);
        assert_eq!(reseeded, 2);
        assert_eq!(cluster_sizes(labels.view(), 3), vec![1, 2, 1]);

        // Nothing to do once every cluster has a member
        assert_eq!(
            reseed_empty_clusters(data.view(), centroids.view(), &mut labels, 3),
            0
        );
    }

    #[test]
    fn test_duplicate_points_keep_k_clusters() {
        let data = arr2(&[[1.0], [1.0], [1.0], [1.0]]);
        let result = KMeans::new(2).n_init(2).max_iter(10).fit(data.view()).unwrap();

        assert!(result.cluster_sizes().iter().all(|&s| s > 0));
        assert_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_iteration_cap() {
        let data = blobs();
        let result = KMeans::new(3).max_iter(1).n_init(1).fit(data.view()).unwrap();
        assert_eq!(result.n_iter, 1);
    }

    #[test]
    fn test_predict() {
        let data = blobs();
        let result = KMeans::new(3).random_state(42).fit(data.view()).unwrap();

        let new_points = arr2(&[[0.1, 0.1], [9.9, 0.0]]);
        let predicted = result.predict(new_points.view()).unwrap();
        assert_eq!(predicted[0], result.labels[0]);
        assert_eq!(predicted[1], result.labels[6]);

        assert!(result.predict(arr2(&[[1.0]]).view()).is_err());
    }

    #[test]
    fn test_invalid_k() {
        let data = arr2(&[[1.0], [2.0]]);

        assert_eq!(
            KMeans::new(3).fit(data.view()).unwrap_err(),
            Error::InvalidK { k: 3, n_samples: 2 }
        );
        assert_eq!(
            KMeans::new(0).fit(data.view()).unwrap_err(),
            Error::InvalidK { k: 0, n_samples: 2 }
        );
    }

    #[test]
    fn test_empty_data() {
        let data = Array2::<f64>::zeros((0, 2));
        assert!(KMeans::new(1).fit(data.view()).is_err());
    }

    #[test]
    fn test_fit_predict() {
        let data = blobs();
        let labels = KMeans::new(2).random_state(42).fit_predict(data.view()).unwrap();

        assert_eq!(labels.len(), 9);
        assert!(labels.iter().all(|&label| label < 2));
    }
}
