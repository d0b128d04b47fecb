// src/gating/visibility.rs
//! Visibility gate
//!
//! Counting only proceeds while the torso and legs are comfortably inside
//! the frame. Landmarks hugging the image border are where detectors
//! extrapolate rather than observe, so the band excludes a margin on every
//! edge.

use crate::config::constants::geometry;
use crate::landmark::{SkeletonSample, VISIBILITY_LANDMARKS};

/// Every landmark in the visibility subset lies within the central band on
/// both axes
pub fn is_fully_visible(sample: &SkeletonSample) -> bool {
    VISIBILITY_LANDMARKS.iter().all(|&index| {
        let lm = sample.get(index);
        in_band(lm.x) && in_band(lm.y)
    })
}

fn in_band(coord: f32) -> bool {
    (geometry::VISIBILITY_BAND_MIN..=geometry::VISIBILITY_BAND_MAX).contains(&coord)
}
