// src/config/exercise.rs
//! Per-exercise counting configuration
//!
//! Every exercise family tracks one joint angle through a down/up cycle;
//! raise-type movements add a secondary spatial gate on the wrist/shoulder
//! relationship. These are configuration differences, not different
//! algorithms; the counter itself is exercise-agnostic.

use crate::config::constants::counting;
use crate::features::JointTriple;
use crate::landmark::LandmarkIndex;
use serde::{Deserialize, Serialize};

/// Secondary spatial gate for raise-type exercises
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialGateConfig {
    /// The wrist landmark being tracked
    pub wrist: LandmarkIndex,
    /// The shoulder landmark it is measured against
    pub shoulder: LandmarkIndex,
    /// Minimum vertical rise of the wrist above the shoulder at the up
    /// boundary, as a fraction of frame height
    pub min_rise: f32,
    /// Maximum horizontal wrist/shoulder offset at the up boundary
    pub max_horizontal_offset: f32,
}

/// Counting parameters for one exercise family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseConfig {
    /// Exercise identifier, e.g. "squat"; filled from the table key when
    /// loaded as an override
    #[serde(default)]
    pub name: String,
    /// Crossing below this angle commits the down stage
    pub down_threshold_deg: f32,
    /// Crossing above this angle while down completes the cycle
    pub up_threshold_deg: f32,
    /// The joint angle tracked through the cycle
    pub joint: JointTriple,
    /// Optional secondary gate checked at both cycle boundaries
    #[serde(default)]
    pub spatial_gate: Option<SpatialGateConfig>,
}

impl ExerciseConfig {
    /// Built-in configuration for a known exercise identifier
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "squat" => Some(Self {
                name: name.to_string(),
                down_threshold_deg: counting::SQUAT_DOWN_THRESHOLD_DEG,
                up_threshold_deg: counting::SQUAT_UP_THRESHOLD_DEG,
                joint: JointTriple::new(
                    LandmarkIndex::LeftHip,
                    LandmarkIndex::LeftKnee,
                    LandmarkIndex::LeftAnkle,
                ),
                spatial_gate: None,
            }),
            "shoulder_press" => Some(Self {
                name: name.to_string(),
                down_threshold_deg: counting::PRESS_DOWN_THRESHOLD_DEG,
                up_threshold_deg: counting::PRESS_UP_THRESHOLD_DEG,
                joint: JointTriple::new(
                    LandmarkIndex::LeftShoulder,
                    LandmarkIndex::LeftElbow,
                    LandmarkIndex::LeftWrist,
                ),
                spatial_gate: Some(SpatialGateConfig {
                    wrist: LandmarkIndex::LeftWrist,
                    shoulder: LandmarkIndex::LeftShoulder,
                    min_rise: counting::PRESS_MIN_WRIST_RISE,
                    max_horizontal_offset: counting::PRESS_MAX_HORIZONTAL_OFFSET,
                }),
            }),
            "pushup" => Some(Self {
                name: name.to_string(),
                down_threshold_deg: counting::PUSHUP_DOWN_THRESHOLD_DEG,
                up_threshold_deg: counting::PUSHUP_UP_THRESHOLD_DEG,
                joint: JointTriple::new(
                    LandmarkIndex::LeftShoulder,
                    LandmarkIndex::LeftElbow,
                    LandmarkIndex::LeftWrist,
                ),
                spatial_gate: None,
            }),
            _ => None,
        }
    }

    /// Validate threshold and gate parameters, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("exercise name must not be empty".to_string());
        }
        if !(0.0..180.0).contains(&self.down_threshold_deg) {
            errors.push(format!(
                "down threshold ({}) must be within [0, 180)",
                self.down_threshold_deg
            ));
        }
        if !(0.0..=180.0).contains(&self.up_threshold_deg) {
            errors.push(format!(
                "up threshold ({}) must be within [0, 180]",
                self.up_threshold_deg
            ));
        }
        if self.down_threshold_deg >= self.up_threshold_deg {
            errors.push(format!(
                "down threshold ({}) must be below up threshold ({})",
                self.down_threshold_deg, self.up_threshold_deg
            ));
        }
        if let Some(gate) = &self.spatial_gate {
            if gate.min_rise <= 0.0 {
                errors.push(format!(
                    "spatial gate min_rise ({}) must be positive",
                    gate.min_rise
                ));
            }
            if gate.max_horizontal_offset <= 0.0 {
                errors.push(format!(
                    "spatial gate max_horizontal_offset ({}) must be positive",
                    gate.max_horizontal_offset
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_squat_tracks_knee() {
        let config = ExerciseConfig::builtin("squat").unwrap();
        assert_eq!(config.joint.vertex, LandmarkIndex::LeftKnee);
        assert!(config.spatial_gate.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builtin_press_has_spatial_gate() {
        let config = ExerciseConfig::builtin("shoulder_press").unwrap();
        assert!(config.spatial_gate.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_exercise_is_none() {
        assert!(ExerciseConfig::builtin("deadlift").is_none());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = ExerciseConfig::builtin("squat").unwrap();
        config.down_threshold_deg = 170.0;
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("below up threshold")));
    }
}
