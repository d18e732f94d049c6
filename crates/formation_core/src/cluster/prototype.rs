//! # Cluster Prototypes
//!
//! Average shape of the formations in one cluster.
//!
//! Slot order differs between formations, so members are first aligned to a
//! reference member (the lowest formation index in the cluster) through the
//! stored reference -> member correspondence, then averaged slot by slot.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::formation::{DistanceMatrix, Formation, SLOTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    /// Canonical cluster label (1 = largest)
    pub label: usize,
    pub size: usize,
    /// Formation index whose slot order the prototype uses
    pub reference: usize,
    pub members: Vec<usize>,
    /// Mean of the aligned, re-centered member means
    pub means: [Vector2<f64>; SLOTS],
    /// Mean of the aligned member covariances
    pub covariances: [Matrix2<f64>; SLOTS],
    /// Sample covariance of the aligned member means per slot (zero for one member)
    pub spread: [Matrix2<f64>; SLOTS],
}

impl Prototype {
    /// `members` must be non-empty and ascending; the first is the reference.
    pub fn build(
        label: usize,
        members: &[usize],
        formations: &[Formation],
        matrix: &DistanceMatrix,
    ) -> Option<Prototype> {
        let &reference = members.first()?;
        let aligned: Vec<Formation> = members
            .iter()
            .map(|&m| {
                let corr = matrix.correspondence(reference, m);
                formations[m].centered().permuted(corr.as_array())
            })
            .collect();

        let n = aligned.len() as f64;
        let means: [Vector2<f64>; SLOTS] =
            std::array::from_fn(|p| aligned.iter().map(|f| f.means[p]).sum::<Vector2<f64>>() / n);
        let covariances: [Matrix2<f64>; SLOTS] = std::array::from_fn(|p| {
            aligned.iter().map(|f| f.covariances[p]).sum::<Matrix2<f64>>() / n
        });
        let spread: [Matrix2<f64>; SLOTS] = std::array::from_fn(|p| {
            if aligned.len() < 2 {
                return Matrix2::zeros();
            }
            aligned
                .iter()
                .map(|f| {
                    let d = f.means[p] - means[p];
                    d * d.transpose()
                })
                .sum::<Matrix2<f64>>()
                / (n - 1.0)
        });

        Some(Prototype {
            label,
            size: members.len(),
            reference,
            members: members.to_vec(),
            means,
            covariances,
            spread,
        })
    }

    pub fn formation(&self) -> Formation {
        Formation::new(self.means, self.covariances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::DistanceMatrixBuilder;

    fn base() -> Formation {
        let means = [
            (-40.0, 0.0),
            (-25.0, -20.0),
            (-27.0, -7.0),
            (-27.0, 7.0),
            (-25.0, 20.0),
            (-5.0, -18.0),
            (-8.0, 0.0),
            (-5.0, 18.0),
            (12.0, -15.0),
            (15.0, 0.0),
            (12.0, 15.0),
        ]
        .map(|(x, y)| Vector2::new(x, y));
        let covariances = std::array::from_fn(|p| Matrix2::new(2.0 + p as f64, 0.0, 0.0, 1.0));
        Formation::new(means, covariances)
    }

    #[test]
    fn test_relabeled_members_average_back_to_reference_order() {
        let a = base();
        let order = [5, 2, 9, 0, 10, 1, 7, 3, 8, 4, 6];
        let mut b = a.permuted(&order);
        for m in b.means.iter_mut() {
            *m += Vector2::new(30.0, -3.0);
        }
        let formations = vec![a.clone(), b];
        let matrix = DistanceMatrixBuilder::default().build(&formations);

        let proto = Prototype::build(1, &[0, 1], &formations, &matrix).unwrap();
        assert_eq!(proto.reference, 0);
        assert_eq!(proto.size, 2);
        for p in 0..SLOTS {
            assert!((proto.means[p] - a.means[p] + a.centroid()).norm() < 1e-9);
            assert!((proto.covariances[p] - a.covariances[p]).norm() < 1e-9);
            assert!(proto.spread[p].norm() < 1e-9);
        }
    }

    #[test]
    fn test_single_member_has_zero_spread() {
        let formations = vec![base()];
        let matrix = DistanceMatrixBuilder::default().build(&formations);
        let proto = Prototype::build(2, &[0], &formations, &matrix).unwrap();
        assert_eq!(proto.label, 2);
        assert!(proto.spread.iter().all(|s| *s == Matrix2::zeros()));
        assert_eq!(proto.formation().means, base().centered().means);
    }

    #[test]
    fn test_spread_reflects_member_variation() {
        let a = base();
        let mut b = a.clone();
        // widen the back line slightly; slot order unchanged
        b.means[1].y -= 2.0;
        b.means[4].y += 2.0;
        let formations = vec![a, b];
        let matrix = DistanceMatrixBuilder::default().build(&formations);

        let proto = Prototype::build(1, &[0, 1], &formations, &matrix).unwrap();
        assert!(proto.spread[1][(1, 1)] > 1.0);
        assert!(proto.spread[6].norm() < 0.5);
    }

    #[test]
    fn test_empty_members() {
        let matrix = DistanceMatrix::new(0);
        assert!(Prototype::build(1, &[], &[], &matrix).is_none());
    }
}
