// src/transport/wire.rs
//! Wire types for the prediction service
//!
//! The service speaks loosely-typed JSON with more than one spelling for the
//! same concept; everything inbound is normalized into [`PredictionUpdate`]
//! at this boundary so the rest of the crate never sees wire quirks.

use crate::landmark::Landmark;
use serde::{Deserialize, Serialize};

/// Outbound frame: the 12-point transport subset plus a send timestamp that
/// the service echoes back for latency measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMessage {
    /// Keypoints as `[x, y, z]` triples in wire order
    pub keypoints: Vec<[f32; 3]>,
    /// Send time, epoch milliseconds
    pub timestamp: u64,
}

impl FrameMessage {
    /// Build a frame from transport-subset landmarks
    pub fn new(points: &[Landmark], timestamp: u64) -> Self {
        Self {
            keypoints: points.iter().map(|lm| [lm.x, lm.y, lm.z]).collect(),
            timestamp,
        }
    }
}

/// Structural validity of a transport subset: full length, finite
/// coordinates, and strictly positive planar coordinates (a zero means the
/// detector filled the point in rather than observed it)
pub fn is_structurally_valid(points: &[Landmark]) -> bool {
    points.len() == crate::landmark::TRANSPORT_LANDMARKS.len()
        && points
            .iter()
            .all(|lm| lm.is_finite() && lm.x > 0.0 && lm.y > 0.0)
}

/// Raw classification response as it appears on the wire.
///
/// Every field is optional: error replies carry an empty exercise, older
/// service builds spell the rep count `reps`, newer ones `rep_count`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPrediction {
    #[serde(default)]
    pub exercise: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub rep_count: Option<i64>,
    #[serde(default)]
    pub reps: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Normalized classification result ready to apply to session state
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionUpdate {
    /// Label and confidence, present only when both are usable
    pub classification: Option<(String, f32)>,
    /// Authoritative rep count, present only when positive
    pub reps: Option<u32>,
    /// Round-trip latency derived from the echoed timestamp
    pub latency_ms: Option<u64>,
}

/// Map accepted wire fields onto the internal update.
///
/// Precedence: `rep_count` over `reps`. A label is usable when non-empty
/// with a finite, non-negative confidence; anything else leaves the prior
/// displayed values untouched rather than resetting them.
pub fn normalize(raw: RawPrediction, now_ms: u64) -> PredictionUpdate {
    let classification = match (raw.exercise, raw.confidence) {
        (Some(label), Some(confidence))
            if !label.is_empty() && confidence.is_finite() && confidence >= 0.0 =>
        {
            Some((label, confidence as f32))
        }
        _ => None,
    };

    let reps = raw
        .rep_count
        .or(raw.reps)
        .filter(|&count| count > 0)
        .map(|count| count as u32);

    let latency_ms = raw.timestamp.map(|sent| now_ms.saturating_sub(sent));

    PredictionUpdate {
        classification,
        reps,
        latency_ms,
    }
}
