// src/config/mod.rs
//! Configuration management for a pose session
//!
//! The core consumes its configuration from the host; it never owns it.
//! Everything has a sensible default except the predictor base URL, whose
//! absence is a fatal startup error rather than a silent degradation.

pub mod constants;
pub mod exercise;
pub mod loader;

pub use exercise::{ExerciseConfig, SpatialGateConfig};
pub use loader::ConfigError;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete session configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SystemConfig {
    /// Session identity and goal
    #[serde(default)]
    pub session: SessionSettings,
    /// Remote predictor endpoints
    #[serde(default)]
    pub predictor: PredictorConfig,
    /// Transport tuning knobs
    #[serde(default)]
    pub transport: TransportTuning,
    /// Per-exercise overrides keyed by exercise identifier
    #[serde(default)]
    pub exercises: HashMap<String, exercise::ExerciseConfig>,
}

/// Session identity and target
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionSettings {
    /// Active exercise identifier
    #[serde(default = "defaults::exercise")]
    pub exercise: String,

    /// Optional rep ceiling; reaching it completes the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<u32>,

    /// Host-side user identifier echoed in the completion report
    #[serde(default)]
    pub user_id: String,

    /// Host-side schedule slot echoed in the completion report
    #[serde(default)]
    pub slot_id: String,
}

/// Remote predictor endpoints
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PredictorConfig {
    /// Base URL of the prediction service. Required.
    #[serde(default)]
    pub base_url: String,

    /// Address of the persistent socket channel; derived from the base URL
    /// host when not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_addr: Option<String>,
}

/// Transport tuning; defaults match the production service contract
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TransportTuning {
    /// Minimum interval between two sends
    #[serde(default = "defaults::min_send_interval_ms")]
    pub min_send_interval_ms: u64,

    /// Minimum vertical motion versus the last sent frame
    #[serde(default = "defaults::motion_delta_threshold")]
    pub motion_delta_threshold: f32,

    /// Consecutive socket failures before permanent fallback
    #[serde(default = "defaults::socket_failure_threshold")]
    pub socket_failure_threshold: u32,

    /// Reconnect backoff floor
    #[serde(default = "defaults::backoff_floor_ms")]
    pub backoff_floor_ms: u64,

    /// Reconnect backoff ceiling
    #[serde(default = "defaults::backoff_ceiling_ms")]
    pub backoff_ceiling_ms: u64,

    /// Fallback HTTP request timeout
    #[serde(default = "defaults::http_timeout_ms")]
    pub http_timeout_ms: u64,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::transport;

    pub fn exercise() -> String {
        "squat".to_string()
    }
    pub fn min_send_interval_ms() -> u64 {
        transport::MIN_SEND_INTERVAL_MS
    }
    pub fn motion_delta_threshold() -> f32 {
        transport::MOTION_DELTA_THRESHOLD
    }
    pub fn socket_failure_threshold() -> u32 {
        transport::SOCKET_FAILURE_THRESHOLD
    }
    pub fn backoff_floor_ms() -> u64 {
        transport::BACKOFF_FLOOR_MS
    }
    pub fn backoff_ceiling_ms() -> u64 {
        transport::BACKOFF_CEILING_MS
    }
    pub fn http_timeout_ms() -> u64 {
        transport::HTTP_TIMEOUT_MS
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            exercise: defaults::exercise(),
            target_reps: None,
            user_id: String::new(),
            slot_id: String::new(),
        }
    }
}

impl Default for TransportTuning {
    fn default() -> Self {
        Self {
            min_send_interval_ms: defaults::min_send_interval_ms(),
            motion_delta_threshold: defaults::motion_delta_threshold(),
            socket_failure_threshold: defaults::socket_failure_threshold(),
            backoff_floor_ms: defaults::backoff_floor_ms(),
            backoff_ceiling_ms: defaults::backoff_ceiling_ms(),
            http_timeout_ms: defaults::http_timeout_ms(),
        }
    }
}

impl PredictorConfig {
    /// Full URL of the fallback prediction endpoint
    pub fn predict_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            constants::transport::PREDICT_PATH
        )
    }

    /// Address of the persistent socket channel.
    ///
    /// Falls back to the base URL's host with the default socket port when
    /// not configured explicitly.
    pub fn socket_addr(&self) -> String {
        if let Some(addr) = &self.socket_addr {
            return addr.clone();
        }
        let stripped = self
            .base_url
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        let host_port = stripped.split('/').next().unwrap_or_default();
        if host_port.contains(':') {
            host_port.to_string()
        } else {
            format!(
                "{}:{}",
                host_port,
                constants::transport::DEFAULT_SOCKET_PORT
            )
        }
    }
}

impl SystemConfig {
    /// Validate configuration consistency, collecting every problem.
    ///
    /// A missing base URL is reported through the dedicated fatal variant so
    /// callers cannot mistake it for a tunable warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.predictor.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }

        let mut errors = Vec::new();

        if self.session.target_reps == Some(0) {
            errors.push("target_reps must be positive when set".to_string());
        }
        if self.transport.min_send_interval_ms == 0 {
            errors.push("min_send_interval_ms must be positive".to_string());
        }
        if self.transport.socket_failure_threshold == 0 {
            errors.push("socket_failure_threshold must be positive".to_string());
        }
        if self.transport.backoff_floor_ms > self.transport.backoff_ceiling_ms {
            errors.push(format!(
                "backoff floor ({} ms) exceeds ceiling ({} ms)",
                self.transport.backoff_floor_ms, self.transport.backoff_ceiling_ms
            ));
        }
        if !(self.transport.motion_delta_threshold > 0.0) {
            errors.push("motion_delta_threshold must be positive".to_string());
        }

        for name in self.exercises.keys() {
            if let Ok(exercise) = self.resolve_exercise(name) {
                if let Err(exercise_errors) = exercise.validate() {
                    for error in exercise_errors {
                        errors.push(format!("exercise '{name}': {error}"));
                    }
                }
            }
        }

        match self.resolve_exercise(&self.session.exercise) {
            Ok(exercise) => {
                if let Err(exercise_errors) = exercise.validate() {
                    for error in exercise_errors {
                        errors.push(format!(
                            "exercise '{}': {error}",
                            self.session.exercise
                        ));
                    }
                }
            }
            Err(_) => errors.push(format!(
                "unknown exercise '{}' and no override provided",
                self.session.exercise
            )),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Resolve an exercise identifier against overrides, then built-ins
    pub fn resolve_exercise(&self, name: &str) -> Result<ExerciseConfig, ConfigError> {
        if let Some(entry) = self.exercises.get(name) {
            let mut resolved = entry.clone();
            resolved.name = name.to_string();
            return Ok(resolved);
        }
        ExerciseConfig::builtin(name).ok_or_else(|| ConfigError::UnknownExercise(name.to_string()))
    }
}
