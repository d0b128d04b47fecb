//! Common utilities for the pose-core system
//!
//! Currently this is limited to time management: wall-clock millisecond
//! timestamps for the wire protocol, and an injectable [`TimeProvider`] so
//! interval-sensitive logic (the transport send gate) can be tested
//! deterministically.

pub mod time;

pub use time::{current_timestamp_millis, MockTimeProvider, SystemTimeProvider, TimeProvider};
