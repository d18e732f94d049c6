//! # Formation Extraction
//!
//! Reduces a window's `(T, 11, 2)` coordinates to a [`Formation`].
//!
//! ## Algorithm
//! 1. Per frame, subtract that frame's own 11-slot centroid
//! 2. `mean[p]` = time average of the centered slot positions
//! 3. `covariance[p]` = sample covariance (denominator T-1) of the centered
//!    slot time series; zero when T = 1
//!
//! Scale and slot order are left alone; both are handled by the distance.

use nalgebra::{Matrix2, Vector2};

use super::{Formation, SLOTS};
use crate::error::{FormationError, Result};
use crate::segment::SideWindow;

/// Frames with each frame's slot centroid moved to the origin.
pub fn center_frames(frames: &[[Vector2<f64>; SLOTS]]) -> Vec<[Vector2<f64>; SLOTS]> {
    frames
        .iter()
        .map(|row| {
            let centroid = row.iter().sum::<Vector2<f64>>() / SLOTS as f64;
            row.map(|p| p - centroid)
        })
        .collect()
}

pub fn extract_formation(frames: &[[Vector2<f64>; SLOTS]]) -> Result<Formation> {
    if frames.is_empty() {
        return Err(FormationError::EmptyWindow);
    }
    let centered = center_frames(frames);
    let n = centered.len() as f64;

    let means: [Vector2<f64>; SLOTS] =
        std::array::from_fn(|p| centered.iter().map(|row| row[p]).sum::<Vector2<f64>>() / n);

    let covariances: [Matrix2<f64>; SLOTS] = std::array::from_fn(|p| {
        if centered.len() < 2 {
            return Matrix2::zeros();
        }
        let scatter = centered
            .iter()
            .map(|row| {
                let d = row[p] - means[p];
                d * d.transpose()
            })
            .sum::<Matrix2<f64>>();
        scatter / (n - 1.0)
    });

    Ok(Formation::new(means, covariances))
}

impl Formation {
    pub fn from_window(side: &SideWindow) -> Result<Formation> {
        extract_formation(&side.coords)
    }
}
