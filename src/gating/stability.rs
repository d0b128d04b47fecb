// src/gating/stability.rs
//! Stability filter
//!
//! A fixed-capacity sliding window over the tracked angle. At camera frame
//! rates genuine movement changes the angle a few degrees per frame, while a
//! landmark glitch jumps tens of degrees in one step, so the maximum
//! adjacent-sample delta separates the two. The window is appended on every
//! visibility-passing frame and consulted at the upright reference point.

use crate::config::constants::stability;
use std::collections::VecDeque;

/// Sliding window of recent tracked-angle values
#[derive(Debug, Clone)]
pub struct StabilityFilter {
    window: VecDeque<f32>,
    capacity: usize,
    max_adjacent_delta: f32,
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self::new(stability::WINDOW_CAPACITY, stability::MAX_ADJACENT_DELTA_DEG)
    }
}

impl StabilityFilter {
    /// Create a filter with explicit capacity and delta threshold
    pub fn new(capacity: usize, max_adjacent_delta: f32) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            max_adjacent_delta,
        }
    }

    /// Append an angle, dropping the oldest sample beyond capacity
    pub fn push(&mut self, angle: f32) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(angle);
    }

    /// Whether the windowed signal is steady enough to trust.
    ///
    /// Fewer than two samples is not enough history and counts as unstable.
    pub fn is_stable(&self) -> bool {
        if self.window.len() < stability::MIN_SAMPLES {
            return false;
        }
        self.window
            .iter()
            .zip(self.window.iter().skip(1))
            .all(|(prev, next)| (next - prev).abs() < self.max_adjacent_delta)
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// True when no history is held
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
