// src/features/mod.rs
//! Geometric feature extraction
//!
//! Pure, total functions over skeleton samples. Angles are computed on the
//! normalized image plane; the depth coordinate only travels on the wire.

use crate::landmark::{Landmark, LandmarkIndex, SkeletonSample};
use serde::{Deserialize, Serialize};

/// Three landmarks defining a joint angle: the vertex and two limb endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointTriple {
    /// The joint the angle is measured at
    pub vertex: LandmarkIndex,
    /// First limb endpoint
    pub end_a: LandmarkIndex,
    /// Second limb endpoint
    pub end_b: LandmarkIndex,
}

impl JointTriple {
    /// Build a triple from the anatomical chain order: endpoint, vertex,
    /// endpoint (e.g. hip, knee, ankle for the knee angle)
    pub fn new(end_a: LandmarkIndex, vertex: LandmarkIndex, end_b: LandmarkIndex) -> Self {
        Self {
            vertex,
            end_a,
            end_b,
        }
    }
}

/// Angle at `triple.vertex` in degrees, always within [0, 180].
///
/// Degenerate input (a zero-length limb vector) yields 180.0; the joint is
/// treated as fully extended rather than erroring out.
pub fn joint_angle(sample: &SkeletonSample, triple: JointTriple) -> f32 {
    let vertex = sample.get(triple.vertex);
    let a = sample.get(triple.end_a);
    let b = sample.get(triple.end_b);
    angle_between(vertex, a, b)
}

/// Angle formed at `vertex` by the segments toward `a` and `b`
pub fn angle_between(vertex: Landmark, a: Landmark, b: Landmark) -> f32 {
    let (ax, ay) = (a.x - vertex.x, a.y - vertex.y);
    let (bx, by) = (b.x - vertex.x, b.y - vertex.y);

    let norm_a = (ax * ax + ay * ay).sqrt();
    let norm_b = (bx * bx + by * by).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 180.0;
    }

    let cos = ((ax * bx + ay * by) / (norm_a * norm_b)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Maximum absolute vertical change across the transport subset.
///
/// Drives the send gate: a frame that barely moved versus the last sent
/// frame is not worth a round trip.
pub fn motion_delta(current: &[Landmark], previous: &[Landmark]) -> f32 {
    current
        .iter()
        .zip(previous)
        .map(|(cur, prev)| (cur.y - prev.y).abs())
        .fold(0.0, f32::max)
}
