// src/config/constants.rs
//! System-wide configuration constants

/// Frame-geometry gating constants
pub mod geometry {
    /// Lower edge of the central visibility band (both axes)
    pub const VISIBILITY_BAND_MIN: f32 = 0.05;
    /// Upper edge of the central visibility band (both axes)
    pub const VISIBILITY_BAND_MAX: f32 = 0.95;
    /// Minimum shoulder-to-hip vertical separation, as a fraction of frame
    /// height
    pub const TORSO_MIN_SEPARATION: f32 = 0.15;
    /// Maximum left/right shoulder vertical asymmetry, as a fraction of
    /// frame height
    pub const SHOULDER_SYMMETRY_TOLERANCE: f32 = 0.08;
}

/// Stability filter constants
pub mod stability {
    /// Sliding window capacity in samples
    pub const WINDOW_CAPACITY: usize = 5;
    /// Maximum adjacent-sample angle delta considered steady
    pub const MAX_ADJACENT_DELTA_DEG: f32 = 6.0;
    /// Fewer samples than this counts as unstable
    pub const MIN_SAMPLES: usize = 2;
}

/// Streaming transport constants
pub mod transport {
    /// Minimum interval between two sends
    pub const MIN_SEND_INTERVAL_MS: u64 = 100;
    /// Minimum per-landmark vertical delta versus the last sent sample
    pub const MOTION_DELTA_THRESHOLD: f32 = 0.003;
    /// Consecutive socket failures before switching permanently to fallback
    pub const SOCKET_FAILURE_THRESHOLD: u32 = 3;
    /// Reconnect backoff floor
    pub const BACKOFF_FLOOR_MS: u64 = 1_000;
    /// Reconnect backoff ceiling
    pub const BACKOFF_CEILING_MS: u64 = 10_000;
    /// Socket connect timeout
    pub const CONNECT_TIMEOUT_MS: u64 = 3_000;
    /// Fallback HTTP request timeout
    pub const HTTP_TIMEOUT_MS: u64 = 5_000;
    /// Prediction endpoint path appended to the base URL
    pub const PREDICT_PATH: &str = "/predict";
    /// Default port for the persistent socket channel
    pub const DEFAULT_SOCKET_PORT: u16 = 9750;
    /// Capacity of the frame channel into the transport actor; overflow is
    /// dropped, never queued against the frame pipeline
    pub const FRAME_CHANNEL_CAPACITY: usize = 8;
}

/// Counting defaults shared by the built-in exercise table
pub mod counting {
    /// Default squat knee-angle thresholds
    pub const SQUAT_DOWN_THRESHOLD_DEG: f32 = 100.0;
    /// Knee angle above which a squat cycle completes
    pub const SQUAT_UP_THRESHOLD_DEG: f32 = 160.0;
    /// Default press elbow-angle thresholds
    pub const PRESS_DOWN_THRESHOLD_DEG: f32 = 70.0;
    /// Elbow angle above which a press cycle completes
    pub const PRESS_UP_THRESHOLD_DEG: f32 = 160.0;
    /// Default pushup elbow-angle thresholds
    pub const PUSHUP_DOWN_THRESHOLD_DEG: f32 = 90.0;
    /// Elbow angle above which a pushup cycle completes
    pub const PUSHUP_UP_THRESHOLD_DEG: f32 = 160.0;
    /// Default wrist-above-shoulder rise for press-type spatial gates
    pub const PRESS_MIN_WRIST_RISE: f32 = 0.10;
    /// Default horizontal wrist/shoulder alignment tolerance
    pub const PRESS_MAX_HORIZONTAL_OFFSET: f32 = 0.12;
}
