// src/landmark/source.rs
//! Landmark source seam
//!
//! The detector that produces skeleton samples is an external collaborator;
//! the core only pulls one frame of opportunity per tick through
//! [`SkeletonSource`]. A scripted playback implementation is provided for
//! demos and integration tests.

use crate::landmark::types::{Landmark, SkeletonSample, LANDMARK_COUNT};
use async_trait::async_trait;
use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// Landmark source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// The capture device or detector is unavailable
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// A finite playback script has no more frames
    #[error("playback script exhausted")]
    Exhausted,
}

/// Per-frame skeleton provider.
///
/// One call per frame tick; `Ok(None)` means the detector ran but found no
/// body in the frame.
#[async_trait]
pub trait SkeletonSource: Send {
    /// Pull the next frame's detection result
    async fn next_frame(&mut self) -> Result<Option<SkeletonSample>, SourceError>;
}

/// Scripted playback source for demos and tests.
///
/// Replays a fixed sequence of frames at a configurable pace, optionally
/// perturbing planar coordinates with uniform jitter to approximate detector
/// noise.
pub struct ScriptedSource {
    frames: VecDeque<Option<SkeletonSample>>,
    frame_interval: Duration,
    jitter_amplitude: f32,
}

impl ScriptedSource {
    /// Create a playback source over the given frames
    pub fn new(frames: Vec<Option<SkeletonSample>>) -> Self {
        Self {
            frames: frames.into(),
            frame_interval: Duration::ZERO,
            jitter_amplitude: 0.0,
        }
    }

    /// Pace playback at a fixed frame interval
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Add uniform planar jitter of up to `amplitude` per coordinate
    pub fn with_jitter(mut self, amplitude: f32) -> Self {
        self.jitter_amplitude = amplitude.max(0.0);
        self
    }

    /// Frames remaining in the script
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    fn perturb(&self, sample: SkeletonSample) -> SkeletonSample {
        if self.jitter_amplitude == 0.0 {
            return sample;
        }
        let mut rng = rand::thread_rng();
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for (slot, lm) in landmarks.iter_mut().zip(sample.landmarks()) {
            *slot = Landmark::new(
                lm.x + rng.gen_range(-self.jitter_amplitude..=self.jitter_amplitude),
                lm.y + rng.gen_range(-self.jitter_amplitude..=self.jitter_amplitude),
                lm.z,
            );
        }
        // Jitter keeps coordinates finite, so the invariant holds
        SkeletonSample::from_landmarks(landmarks).unwrap_or(sample)
    }
}

#[async_trait]
impl SkeletonSource for ScriptedSource {
    async fn next_frame(&mut self) -> Result<Option<SkeletonSample>, SourceError> {
        let frame = self.frames.pop_front().ok_or(SourceError::Exhausted)?;
        if !self.frame_interval.is_zero() {
            tokio::time::sleep(self.frame_interval).await;
        }
        Ok(frame.map(|sample| self.perturb(sample)))
    }
}
