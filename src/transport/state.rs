// src/transport/state.rs
//! Shared session state
//!
//! The frame pipeline and the transport actor both write here; a single
//! mutex makes every update atomic with respect to the other writer, and a
//! closed flag keeps late-arriving results from mutating a torn-down
//! session.

use crate::transport::wire::PredictionUpdate;
use parking_lot::Mutex;

/// Active transport mode, surfaced as a passive indicator only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Persistent push-based socket channel
    Socket,
    /// Pull-based request/response fallback
    Fallback,
}

/// Point-in-time view of the session state
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Last classified exercise label ("" until the predictor speaks)
    pub exercise: String,
    /// Confidence of the last classification
    pub confidence: f32,
    /// Current rep count (local, possibly overwritten by the predictor)
    pub rep_count: u32,
    /// Last measured round-trip latency
    pub latency_ms: Option<u64>,
    /// Current transport mode
    pub transport_mode: TransportMode,
}

#[derive(Debug)]
struct Inner {
    exercise: String,
    confidence: f32,
    rep_count: u32,
    latency_ms: Option<u64>,
    mode: TransportMode,
    pending_remote: Option<u32>,
    closed: bool,
}

/// Session state shared between the frame pipeline and the transport actor
#[derive(Debug)]
pub struct SharedSessionState {
    inner: Mutex<Inner>,
}

impl Default for SharedSessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedSessionState {
    /// Fresh state for a new session; starts in socket mode
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                exercise: String::new(),
                confidence: 0.0,
                rep_count: 0,
                latency_ms: None,
                mode: TransportMode::Socket,
                pending_remote: None,
                closed: false,
            }),
        }
    }

    /// Apply a normalized prediction result.
    ///
    /// No-op on a closed session. A usable classification replaces label and
    /// confidence together; an unusable one retains the prior values. A
    /// positive remote rep count overwrites the displayed count and is
    /// queued for the counter to adopt at the next frame boundary.
    pub fn apply_prediction(&self, update: PredictionUpdate) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        if let Some((label, confidence)) = update.classification {
            inner.exercise = label;
            inner.confidence = confidence;
        }
        if let Some(reps) = update.reps {
            inner.rep_count = reps;
            inner.pending_remote = Some(reps);
        }
        if let Some(latency) = update.latency_ms {
            inner.latency_ms = Some(latency);
        }
    }

    /// Record the locally counted reps (frame pipeline writer)
    pub fn set_local_count(&self, count: u32) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.rep_count = count;
    }

    /// Take the remote count queued by the last prediction, if any
    pub fn take_pending_remote(&self) -> Option<u32> {
        self.inner.lock().pending_remote.take()
    }

    /// Current transport mode
    pub fn mode(&self) -> TransportMode {
        self.inner.lock().mode
    }

    /// Record a transport mode change (transport actor writer)
    pub fn set_mode(&self, mode: TransportMode) {
        self.inner.lock().mode = mode;
    }

    /// Reset per-exercise values for a fresh session on the same transport
    pub fn reset_for_exercise(&self) {
        let mut inner = self.inner.lock();
        inner.rep_count = 0;
        inner.pending_remote = None;
    }

    /// Mark the session torn down; all later writes become no-ops
    pub fn mark_closed(&self) {
        self.inner.lock().closed = true;
    }

    /// Whether the session has been torn down
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Copy out the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock();
        SessionSnapshot {
            exercise: inner.exercise.clone(),
            confidence: inner.confidence,
            rep_count: inner.rep_count,
            latency_ms: inner.latency_ms,
            transport_mode: inner.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(
        classification: Option<(&str, f32)>,
        reps: Option<u32>,
        latency_ms: Option<u64>,
    ) -> PredictionUpdate {
        PredictionUpdate {
            classification: classification.map(|(label, c)| (label.to_string(), c)),
            reps,
            latency_ms,
        }
    }

    #[test]
    fn test_classification_updates_together() {
        let state = SharedSessionState::new();
        state.apply_prediction(update(Some(("squat", 0.92)), None, None));

        let snap = state.snapshot();
        assert_eq!(snap.exercise, "squat");
        assert_eq!(snap.confidence, 0.92);
    }

    #[test]
    fn test_unusable_classification_retains_prior() {
        let state = SharedSessionState::new();
        state.apply_prediction(update(Some(("squat", 0.92)), None, None));
        state.apply_prediction(update(None, None, Some(30)));

        let snap = state.snapshot();
        assert_eq!(snap.exercise, "squat");
        assert_eq!(snap.confidence, 0.92);
        assert_eq!(snap.latency_ms, Some(30));
    }

    #[test]
    fn test_remote_reps_overwrite_and_queue() {
        let state = SharedSessionState::new();
        state.set_local_count(2);
        state.apply_prediction(update(None, Some(5), None));

        assert_eq!(state.snapshot().rep_count, 5);
        assert_eq!(state.take_pending_remote(), Some(5));
        assert_eq!(state.take_pending_remote(), None);
    }

    #[test]
    fn test_closed_session_ignores_writes() {
        let state = SharedSessionState::new();
        state.set_local_count(3);
        state.mark_closed();

        state.apply_prediction(update(Some(("squat", 0.9)), Some(9), None));
        state.set_local_count(7);

        let snap = state.snapshot();
        assert_eq!(snap.rep_count, 3);
        assert_eq!(snap.exercise, "");
    }

    #[test]
    fn test_reset_for_exercise_clears_counts() {
        let state = SharedSessionState::new();
        state.apply_prediction(update(Some(("squat", 0.9)), Some(4), None));
        state.reset_for_exercise();

        assert_eq!(state.snapshot().rep_count, 0);
        assert_eq!(state.take_pending_remote(), None);
    }
}
