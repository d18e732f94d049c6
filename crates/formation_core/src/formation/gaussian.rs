//! # Gaussian Wasserstein-2 Costs
//!
//! For 2-D Gaussians N(mu_a, S_a) and N(mu_b, S_b):
//!
//! `W^2 = |mu_a - mu_b|^2 + tr S_a + tr S_b - 2 tr((S_a^1/2 S_b S_a^1/2)^1/2)`
//!
//! The eigenvalues of `S_a^1/2 S_b S_a^1/2` equal those of `S_a S_b`, so for
//! 2x2 matrices the last trace is `sqrt(tr(S_a S_b) + 2 sqrt(det S_a det S_b))`.
//! No matrix square roots or decompositions are needed.
//!
//! Scaling A by k and B by 1/k leaves the cross term unchanged, which lets
//! [`GaussianCostTerms`] precompute everything that does not depend on k and
//! evaluate all 121 slot pairs per scale in one pass.

use nalgebra::{Matrix2, Vector2};

use super::{Formation, SlotCosts, SLOTS};

/// `tr((S_a^1/2 S_b S_a^1/2)^1/2)` for symmetric positive semi-definite 2x2 matrices.
#[inline]
pub fn sqrt_product_trace(a: &Matrix2<f64>, b: &Matrix2<f64>) -> f64 {
    let trace = (a * b).trace();
    let det = (a.determinant().max(0.0) * b.determinant().max(0.0)).sqrt();
    (trace + 2.0 * det).max(0.0).sqrt()
}

/// Wasserstein-2 distance between two 2-D Gaussians.
pub fn wasserstein2(
    mean_a: &Vector2<f64>,
    cov_a: &Matrix2<f64>,
    mean_b: &Vector2<f64>,
    cov_b: &Matrix2<f64>,
) -> f64 {
    let squared = (mean_a - mean_b).norm_squared() + cov_a.trace() + cov_b.trace()
        - 2.0 * sqrt_product_trace(cov_a, cov_b);
    squared.max(0.0).sqrt()
}

/// Scale-independent pieces of the 11x11 cost matrix between two formations.
///
/// With k = 2^s, `W^2(p, q) = k^2 ea[p] + eb[q] / k^2 - 2 coupling[p][q]`.
#[derive(Debug, Clone)]
pub struct GaussianCostTerms {
    /// `|mu_p|^2 + tr S_p` for A's slots
    energy_a: [f64; SLOTS],
    /// `|mu_q|^2 + tr S_q` for B's slots
    energy_b: [f64; SLOTS],
    /// `mu_p . mu_q + tr((S_p^1/2 S_q S_p^1/2)^1/2)`
    coupling: [[f64; SLOTS]; SLOTS],
}

impl GaussianCostTerms {
    /// Terms for `a` against `b`; both are re-centered first.
    pub fn new(a: &Formation, b: &Formation) -> Self {
        let a = a.centered();
        let b = b.centered();

        let energy = |f: &Formation| -> [f64; SLOTS] {
            std::array::from_fn(|p| f.means[p].norm_squared() + f.covariances[p].trace())
        };
        let coupling = std::array::from_fn(|p| {
            std::array::from_fn(|q| {
                a.means[p].dot(&b.means[q])
                    + sqrt_product_trace(&a.covariances[p], &b.covariances[q])
            })
        });

        Self {
            energy_a: energy(&a),
            energy_b: energy(&b),
            coupling,
        }
    }

    /// Cost matrix at log-scale `s` (A scaled by 2^s, B by 2^-s).
    pub fn costs(&self, log_scale: f64) -> SlotCosts {
        let k2 = (2.0 * log_scale).exp2();
        let inv_k2 = 1.0 / k2;
        let mut costs = [[0.0; SLOTS]; SLOTS];
        for (p, row) in costs.iter_mut().enumerate() {
            let ea = k2 * self.energy_a[p];
            for (q, cost) in row.iter_mut().enumerate() {
                let squared = ea + inv_k2 * self.energy_b[q] - 2.0 * self.coupling[p][q];
                *cost = squared.max(0.0).sqrt();
            }
        }
        costs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spd(a: f64, b: f64, c: f64) -> Matrix2<f64> {
        Matrix2::new(a, b, b, c)
    }

    #[test]
    fn test_identical_gaussians_have_zero_distance() {
        let m = Vector2::new(3.0, -1.0);
        let c = spd(2.0, 0.5, 1.0);
        assert!(wasserstein2(&m, &c, &m, &c) < 1e-6);
    }

    #[test]
    fn test_point_masses_reduce_to_euclidean() {
        let z = Matrix2::zeros();
        let d = wasserstein2(&Vector2::new(0.0, 0.0), &z, &Vector2::new(3.0, 4.0), &z);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_commuting_covariances_match_closed_form() {
        // Diagonal covariances: W^2 = |dm|^2 + sum (sqrt(a_i) - sqrt(b_i))^2
        let a = spd(4.0, 0.0, 9.0);
        let b = spd(1.0, 0.0, 16.0);
        let d = wasserstein2(&Vector2::zeros(), &a, &Vector2::new(1.0, 0.0), &b);
        let expected = (1.0f64 + (2.0 - 1.0f64).powi(2) + (3.0 - 4.0f64).powi(2)).sqrt();
        assert!((d - expected).abs() < 1e-12);
    }

    #[test]
    fn test_sqrt_product_trace_against_eigen_decomposition() {
        let a = spd(2.0, 0.7, 1.5);
        let b = spd(0.8, -0.3, 2.2);

        // sqrt(A) via nalgebra's symmetric eigen decomposition
        let eig = a.symmetric_eigen();
        let sqrt_a = eig.eigenvectors
            * Matrix2::from_diagonal(&eig.eigenvalues.map(f64::sqrt))
            * eig.eigenvectors.transpose();
        let inner = sqrt_a * b * sqrt_a;
        let inner_eig = inner.symmetric_eigen();
        let expected: f64 = inner_eig.eigenvalues.iter().map(|l| l.max(0.0).sqrt()).sum();

        assert!((sqrt_product_trace(&a, &b) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_batched_costs_match_pairwise_formula() {
        let means = std::array::from_fn(|i| Vector2::new(i as f64 * 3.0 - 15.0, (i % 3) as f64 * 7.0));
        let covs = std::array::from_fn(|i| spd(1.0 + i as f64 * 0.1, 0.05, 0.6));
        let a = Formation::new(means, covs);
        let b = a.permuted(&[3, 1, 4, 0, 5, 9, 2, 6, 10, 8, 7]).scaled(1.1);

        let s: f64 = 0.07;
        let k = s.exp2();
        let costs = GaussianCostTerms::new(&a, &b).costs(s);

        let (ac, bc) = (a.centered().scaled(k), b.centered().scaled(1.0 / k));
        for p in 0..SLOTS {
            for q in 0..SLOTS {
                let direct = wasserstein2(
                    &ac.means[p],
                    &ac.covariances[p],
                    &bc.means[q],
                    &bc.covariances[q],
                );
                assert!((costs[p][q] - direct).abs() < 1e-6, "pair ({p}, {q})");
            }
        }
    }
}
