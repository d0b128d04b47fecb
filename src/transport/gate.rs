// src/transport/gate.rs
//! Send gating
//!
//! Every candidate frame runs through three checks before it is allowed to
//! cost a network round trip: a minimum interval since the last send,
//! structural validity of the transport subset, and a minimum amount of
//! actual motion versus the last frame that went out. The first valid frame
//! after a reset only seeds the motion baseline and is not sent.

use crate::config::TransportTuning;
use crate::features::motion_delta;
use crate::landmark::{Landmark, SkeletonSample, TRANSPORT_LANDMARKS};
use crate::transport::wire::{is_structurally_valid, FrameMessage};
use crate::utils::time::TimeProvider;
use std::sync::Arc;

/// Outcome of evaluating one frame against the send gate
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// The frame is eligible; the payload is ready to hand to the transport
    Send(FrameMessage),
    /// First valid frame after a reset: recorded as baseline, not sent
    BaselineRecorded,
    /// The minimum send interval has not elapsed
    TooSoon,
    /// The frame barely moved versus the last sent one
    BelowMotionThreshold,
    /// The transport subset is structurally unusable
    Invalid,
}

/// Stateful send gate; owns the last-sent baseline
pub struct SendGate {
    min_interval_ms: u64,
    motion_threshold: f32,
    baseline: Option<[Landmark; TRANSPORT_LANDMARKS.len()]>,
    last_send_at: Option<u64>,
    time: Arc<dyn TimeProvider>,
}

impl SendGate {
    /// Gate with no baseline; the first valid frame will seed it
    pub fn new(tuning: &TransportTuning, time: Arc<dyn TimeProvider>) -> Self {
        Self {
            min_interval_ms: tuning.min_send_interval_ms,
            motion_threshold: tuning.motion_delta_threshold,
            baseline: None,
            last_send_at: None,
            time,
        }
    }

    /// Evaluate one frame; on `Send` the baseline and send clock advance
    pub fn evaluate(&mut self, sample: &SkeletonSample) -> GateDecision {
        let points = sample.transport_points();
        if !is_structurally_valid(&points) {
            return GateDecision::Invalid;
        }

        let Some(baseline) = &self.baseline else {
            self.baseline = Some(points);
            return GateDecision::BaselineRecorded;
        };

        let now = self.time.now_millis();
        if let Some(last) = self.last_send_at {
            if now.saturating_sub(last) < self.min_interval_ms {
                return GateDecision::TooSoon;
            }
        }

        if motion_delta(&points, baseline) <= self.motion_threshold {
            return GateDecision::BelowMotionThreshold;
        }

        self.baseline = Some(points);
        self.last_send_at = Some(now);
        GateDecision::Send(FrameMessage::new(&points, now))
    }

    /// Forget the baseline and send clock (exercise change)
    pub fn reset(&mut self) {
        self.baseline = None;
        self.last_send_at = None;
    }
}
