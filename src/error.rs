// src/error.rs
//! Unified error handling for pose-core
//!
//! Each subsystem defines its own error enum next to the code that raises
//! it; this module ties them together into one crate-level error so callers
//! that drive a whole session can propagate with `?` regardless of which
//! layer failed.
//!
//! The taxonomy mirrors the recovery policy: configuration errors are fatal
//! at startup, source errors abort the capture loop, transport errors are
//! absorbed by the failover policy and only reach this type when a transport
//! cannot even be constructed.

use thiserror::Error;

use crate::config::ConfigError;
use crate::landmark::SourceError;
use crate::transport::TransportError;

/// Crate-level error type
#[derive(Debug, Error)]
pub enum PoseError {
    /// Configuration loading or validation failed; the session must not start
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The landmark source failed; counting and transport are never entered
    #[error("capture source error: {0}")]
    Source(#[from] SourceError),

    /// The streaming transport could not be set up
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias for pose-core operations
pub type PoseResult<T> = Result<T, PoseError>;
