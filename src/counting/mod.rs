// src/counting/mod.rs
//! Rep-counting state machine
//!
//! Consumes gated, filtered angle signal and advances a monotonic rep
//! counter. The counter owns its stage and stability window exclusively;
//! other components only read the derived [`FrameReport`].
//!
//! One frame is processed atomically: gate evaluation, window update and
//! stage transition all happen inside [`RepCounter::process`] with no
//! suspension points, preserving frame order by construction.

use crate::config::exercise::{ExerciseConfig, SpatialGateConfig};
use crate::features::joint_angle;
use crate::gating::{
    check_upright_posture, is_fully_visible, PoseStatus, StabilityFilter,
};
use crate::landmark::SkeletonSample;
use tracing::debug;

/// Direction commitment within a rep cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepStage {
    /// No direction committed
    Neutral,
    /// Bottom position reached
    Down,
    /// Top position reached; equivalent to neutral for transitions but marks
    /// a completed cycle
    Up,
}

/// Cycle boundary at which the secondary spatial gate is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Down,
    Up,
}

/// Per-frame pipeline result
#[derive(Debug, Clone, Copy)]
pub struct FrameReport {
    /// Trust verdict for this frame
    pub status: PoseStatus,
    /// Stage after processing the frame
    pub stage: RepStage,
    /// Rep count after processing the frame
    pub count: u32,
    /// Tracked angle, when one could be computed
    pub angle: Option<f32>,
    /// Whether this frame completed a rep
    pub counted: bool,
    /// Whether the target ceiling has been reached
    pub target_reached: bool,
}

/// Per-exercise rep counter
pub struct RepCounter {
    exercise: ExerciseConfig,
    target: Option<u32>,
    stage: RepStage,
    count: u32,
    stability: StabilityFilter,
}

impl RepCounter {
    /// Create a counter for one exercise, optionally capped at a target
    pub fn new(exercise: ExerciseConfig, target: Option<u32>) -> Self {
        Self {
            exercise,
            target,
            stage: RepStage::Neutral,
            count: 0,
            stability: StabilityFilter::default(),
        }
    }

    /// Current rep count
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Current stage
    pub fn stage(&self) -> RepStage {
        self.stage
    }

    /// The exercise this counter is configured for
    pub fn exercise(&self) -> &ExerciseConfig {
        &self.exercise
    }

    /// Whether the configured target has been reached
    pub fn target_reached(&self) -> bool {
        matches!(self.target, Some(target) if self.count >= target)
    }

    /// Process one frame's detection result.
    ///
    /// `None` means the detector found no body; that is the strongest form
    /// of "not visible" and resets the cycle like any visibility loss.
    pub fn process(&mut self, sample: Option<&SkeletonSample>) -> FrameReport {
        if self.target_reached() {
            // Counting is over; further angle evidence is ignored
            self.stage = RepStage::Neutral;
            return self.report(PoseStatus::Ready, None, false);
        }

        let Some(sample) = sample else {
            self.stability.clear();
            self.stage = RepStage::Neutral;
            return self.report(PoseStatus::NotVisible, None, false);
        };

        let angle = joint_angle(sample, self.exercise.joint);
        if !angle.is_finite() {
            // Malformed angle input: skip the frame without touching state
            return self.report(PoseStatus::Ready, None, false);
        }

        if !is_fully_visible(sample) {
            self.stability.clear();
            self.stage = RepStage::Neutral;
            return self.report(PoseStatus::NotVisible, Some(angle), false);
        }

        self.stability.push(angle);

        if angle < self.exercise.down_threshold_deg {
            if self.stage != RepStage::Down && self.boundary_gate_holds(sample, Boundary::Down) {
                self.stage = RepStage::Down;
                debug!(exercise = %self.exercise.name, angle, "bottom position committed");
            }
            return self.report(PoseStatus::Ready, Some(angle), false);
        }

        if angle > self.exercise.up_threshold_deg {
            return self.process_upright_reference(sample, angle);
        }

        // Mid-range: no boundary crossed this frame
        self.report(PoseStatus::Ready, Some(angle), false)
    }

    /// Evaluate the upright reference point of the cycle.
    ///
    /// Posture and stability are only consulted here; a failure suppresses
    /// the cycle advance even though the angle condition was met.
    fn process_upright_reference(
        &mut self,
        sample: &SkeletonSample,
        angle: f32,
    ) -> FrameReport {
        if let Some(violation) = check_upright_posture(sample) {
            debug!(exercise = %self.exercise.name, ?violation, "upright posture rejected");
            self.stability.clear();
            self.stage = RepStage::Neutral;
            return self.report(PoseStatus::InvalidPosture, Some(angle), false);
        }

        if !self.stability.is_stable() {
            // History is kept: stability self-resolves as samples accumulate
            self.stage = RepStage::Neutral;
            return self.report(PoseStatus::Unstable, Some(angle), false);
        }

        let mut counted = false;
        if self.stage == RepStage::Down {
            if self.boundary_gate_holds(sample, Boundary::Up) {
                self.count += 1;
                self.stage = RepStage::Up;
                counted = true;
                debug!(exercise = %self.exercise.name, count = self.count, "rep completed");
            }
            // Gate failure keeps the down commitment: a partial raise must
            // not consume the cycle
        } else {
            self.stage = RepStage::Up;
        }

        self.report(PoseStatus::Ready, Some(angle), counted)
    }

    fn boundary_gate_holds(&self, sample: &SkeletonSample, boundary: Boundary) -> bool {
        let Some(gate) = &self.exercise.spatial_gate else {
            return true;
        };
        spatial_gate_holds(gate, sample, boundary)
    }

    /// Reset count, stage and stability history (exercise change)
    pub fn reset(&mut self) {
        self.count = 0;
        self.stage = RepStage::Neutral;
        self.stability.clear();
    }

    /// Adopt a remote-delivered rep count.
    ///
    /// The remote predictor is authoritative when it speaks; the adopted
    /// value may move the count in either direction, which shows up as a
    /// visible jump under network jitter. Stage and history are untouched.
    pub fn adopt_remote_count(&mut self, count: u32) {
        self.count = count;
    }

    /// Debug/QA bypass: write the count directly, skipping the gated state
    /// machine entirely. Jumps to the target when one is set, otherwise
    /// advances by one.
    pub fn force_complete(&mut self) {
        self.count = match self.target {
            Some(target) => target,
            None => self.count + 1,
        };
        self.stage = RepStage::Neutral;
    }

    fn report(&self, status: PoseStatus, angle: Option<f32>, counted: bool) -> FrameReport {
        FrameReport {
            status,
            stage: self.stage,
            count: self.count,
            angle,
            counted,
            target_reached: self.target_reached(),
        }
    }
}

fn spatial_gate_holds(
    gate: &SpatialGateConfig,
    sample: &SkeletonSample,
    boundary: Boundary,
) -> bool {
    let wrist = sample.get(gate.wrist);
    let shoulder = sample.get(gate.shoulder);
    // Image Y grows downward: positive rise means the wrist is above the
    // shoulder
    let rise = shoulder.y - wrist.y;

    match boundary {
        // Start position: the raise has not happened yet
        Boundary::Down => rise < gate.min_rise,
        // Top position: the wrist cleared the shoulder and stayed aligned
        Boundary::Up => {
            rise >= gate.min_rise && (wrist.x - shoulder.x).abs() <= gate.max_horizontal_offset
        }
    }
}
