// src/transport/socket.rs
//! Socket mode: persistent newline-delimited JSON channel
//!
//! Connection management follows a strict policy: every close, error or
//! failed connect counts as one consecutive failure; a successful open
//! resets the counter and the backoff; hitting the failure threshold
//! abandons socket mode entirely until the caller re-arms it.

use crate::config::constants::transport as transport_constants;
use crate::config::TransportTuning;
use crate::transport::TransportError;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};

/// Maximum accepted line length for inbound messages
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Framed socket stream carrying one JSON document per line
pub type SocketStream = Framed<TcpStream, LinesCodec>;

/// Open the persistent channel to the predictor
pub async fn connect(addr: &str) -> Result<SocketStream, TransportError> {
    let timeout = Duration::from_millis(transport_constants::CONNECT_TIMEOUT_MS);
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| TransportError::Connect(format!("connect to {addr} timed out")))?
        .map_err(|err| TransportError::Connect(format!("connect to {addr} failed: {err}")))?;

    Ok(Framed::new(
        stream,
        LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
    ))
}

/// What to do after one more socket failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureVerdict {
    /// Schedule a single reconnect attempt after this delay
    RetryAfter(Duration),
    /// The failure threshold was reached: no further automatic attempts
    SwitchToFallback,
}

/// Consecutive-failure counter with exponential reconnect backoff
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    failure_threshold: u32,
    floor_ms: u64,
    ceiling_ms: u64,
    consecutive_failures: u32,
    next_backoff_ms: u64,
}

impl ReconnectPolicy {
    /// Policy with zero recorded failures and the backoff at its floor
    pub fn new(tuning: &TransportTuning) -> Self {
        Self {
            failure_threshold: tuning.socket_failure_threshold,
            floor_ms: tuning.backoff_floor_ms,
            ceiling_ms: tuning.backoff_ceiling_ms,
            consecutive_failures: 0,
            next_backoff_ms: tuning.backoff_floor_ms,
        }
    }

    /// A connection opened: failures and backoff reset
    pub fn on_open(&mut self) {
        self.consecutive_failures = 0;
        self.next_backoff_ms = self.floor_ms;
    }

    /// One more consecutive failure; returns the action to take
    pub fn on_failure(&mut self) -> FailureVerdict {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.failure_threshold {
            return FailureVerdict::SwitchToFallback;
        }
        let delay = Duration::from_millis(self.next_backoff_ms);
        self.next_backoff_ms = (self.next_backoff_ms * 2).min(self.ceiling_ms);
        FailureVerdict::RetryAfter(delay)
    }

    /// Manual re-arm: forget all failure history
    pub fn reset(&mut self) {
        self.on_open();
    }

    /// Consecutive failures recorded so far
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
