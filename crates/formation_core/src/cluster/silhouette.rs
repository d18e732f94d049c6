//! Silhouette coefficient on a precomputed distance matrix.

use crate::formation::DistanceMatrix;

/// Per-sample silhouette `(b - a) / max(a, b)`.
///
/// `a` is the mean distance to the other members of the sample's cluster, `b`
/// the smallest mean distance to any other cluster. Samples in singleton
/// clusters score 0, as do samples with `a = b = 0`.
pub fn silhouette_samples(matrix: &DistanceMatrix, labels: &[usize]) -> Vec<f64> {
    let k = labels.iter().max().map_or(0, |&l| l + 1);
    let mut sizes = vec![0usize; k];
    for &l in labels {
        sizes[l] += 1;
    }

    (0..labels.len())
        .map(|i| {
            let own = labels[i];
            if sizes[own] <= 1 {
                return 0.0;
            }

            let mut sums = vec![0.0; k];
            for (j, &l) in labels.iter().enumerate() {
                if j != i {
                    sums[l] += matrix.distance(i, j);
                }
            }

            let a = sums[own] / (sizes[own] - 1) as f64;
            let b = (0..k)
                .filter(|&l| l != own && sizes[l] > 0)
                .map(|l| sums[l] / sizes[l] as f64)
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            if denom > 0.0 && b.is_finite() {
                (b - a) / denom
            } else {
                0.0
            }
        })
        .collect()
}

/// Mean silhouette, defined only for `2 <= clusters <= n - 1`.
pub fn silhouette_score(matrix: &DistanceMatrix, labels: &[usize]) -> Option<f64> {
    let n = labels.len();
    let mut distinct: Vec<usize> = labels.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < 2 || distinct.len() >= n {
        return None;
    }
    let samples = silhouette_samples(matrix, labels);
    Some(samples.iter().sum::<f64>() / n as f64)
}
