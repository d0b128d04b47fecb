//! Pose-Core: real-time exercise classification and rep-counting core
//!
//! This library turns a live stream of body keypoints into a classified
//! exercise label and a locally counted repetition total. It features:
//!
//! - A gated, jitter-resistant rep-counting state machine
//! - A resilient streaming transport with socket-to-HTTP failover
//! - Per-sample visibility and posture gating
//! - Comprehensive configuration management
//! - A scripted landmark source for demos and tests
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pose_core::config::SystemConfig;
//! use pose_core::session::SessionController;
//! use pose_core::utils::time::SystemTimeProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SystemConfig::load("pose-core.toml")?;
//!     let mut session = SessionController::connect(config, None, Arc::new(SystemTimeProvider))?;
//!
//!     // Feed one detection result per captured frame
//!     let report = session.process_frame(None);
//!     println!("status: {:?}, reps: {}", report.status, report.count);
//!
//!     session.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod counting;
pub mod error;
pub mod features;
pub mod gating;
pub mod landmark;
pub mod session;
pub mod transport;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ExerciseConfig, SystemConfig};
pub use counting::{FrameReport, RepCounter, RepStage};
pub use error::{PoseError, PoseResult};
pub use gating::PoseStatus;
pub use landmark::{Landmark, LandmarkIndex, SkeletonSample, SkeletonSource};
pub use session::{CompletionReport, ExerciseStatus, HostBridge, SessionController};
pub use transport::{SessionSnapshot, TransportMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
