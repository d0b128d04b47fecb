// src/session/mod.rs
//! Session orchestration
//!
//! Binds an exercise identity to the counter, the transport and the shared
//! state, enforces target completion, and reports the terminal outcome to
//! the host exactly once. The host bridge is optional: a missing bridge
//! turns the notification into a no-op, never an error.

use crate::config::SystemConfig;
use crate::counting::{FrameReport, RepCounter};
use crate::error::PoseResult;
use crate::gating::PoseStatus;
use crate::landmark::SkeletonSample;
use crate::transport::{
    self, SessionSnapshot, SharedSessionState, TransportConfig, TransportHandle, TransportMode,
};
use crate::utils::time::TimeProvider;
use std::sync::Arc;
use tracing::info;

/// Terminal session outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseStatus {
    /// Target reached or the user confirmed completion
    Done,
    /// The user explicitly deferred; reps were counted but the set is open
    InProgress,
    /// The session ended with nothing counted and no explicit action
    NoPerformance,
}

/// Terminal notification delivered to the host collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    /// Host-side user identifier
    pub user_id: String,
    /// Host-side schedule slot
    pub slot_id: String,
    /// Terminal outcome tag
    pub exercise_status: ExerciseStatus,
    /// Reps counted when the session ended
    pub reps_done: u32,
}

/// Host-side completion sink
pub trait HostBridge: Send + Sync {
    /// Receive the terminal outcome; called at most once per session
    fn notify_completion(&self, report: &CompletionReport);
}

/// Orchestrates one exercise session
pub struct SessionController {
    config: SystemConfig,
    counter: RepCounter,
    shared: Arc<SharedSessionState>,
    transport: TransportHandle,
    bridge: Option<Arc<dyn HostBridge>>,
    outcome_sent: bool,
    closed: bool,
}

impl SessionController {
    /// Build a session with a production transport.
    ///
    /// Must run inside a tokio runtime; validates the configuration first so
    /// a missing predictor base URL aborts before anything is spawned.
    pub fn connect(
        config: SystemConfig,
        bridge: Option<Arc<dyn HostBridge>>,
        time: Arc<dyn TimeProvider>,
    ) -> PoseResult<Self> {
        config.validate()?;
        let shared = Arc::new(SharedSessionState::new());
        let transport = transport::spawn_default(
            TransportConfig::from_system(&config),
            shared.clone(),
            time,
        );
        Self::with_transport(config, transport, shared, bridge)
    }

    /// Build a session around an existing transport (tests inject mocks here)
    pub fn with_transport(
        config: SystemConfig,
        transport: TransportHandle,
        shared: Arc<SharedSessionState>,
        bridge: Option<Arc<dyn HostBridge>>,
    ) -> PoseResult<Self> {
        config.validate()?;
        let exercise = config.resolve_exercise(&config.session.exercise)?;
        let counter = RepCounter::new(exercise, config.session.target_reps);
        info!(
            exercise = %config.session.exercise,
            target = ?config.session.target_reps,
            "session started"
        );
        Ok(Self {
            config,
            counter,
            shared,
            transport,
            bridge,
            outcome_sent: false,
            closed: false,
        })
    }

    /// Process one frame through the counting pipeline and the transport.
    ///
    /// Runs synchronously and atomically with respect to the frame stream;
    /// the transport offer never blocks.
    pub fn process_frame(&mut self, sample: Option<SkeletonSample>) -> FrameReport {
        if self.closed {
            return self.idle_report();
        }

        // The remote predictor is authoritative when it speaks; adopt its
        // count at the frame boundary so stage/history stay counter-owned
        if let Some(remote) = self.shared.take_pending_remote() {
            self.counter.adopt_remote_count(remote);
        }

        let report = self.counter.process(sample.as_ref());
        if report.counted {
            self.shared.set_local_count(report.count);
        }

        if !self.outcome_sent {
            if let Some(sample) = &sample {
                self.transport.offer(sample);
            }
        }

        if report.target_reached {
            self.finish(ExerciseStatus::Done);
        }

        report
    }

    /// Switch to a different exercise: counts, stage, stability history,
    /// send-gate baseline and the terminal flag all reset
    pub fn change_exercise(&mut self, name: &str) -> PoseResult<()> {
        let exercise = self.config.resolve_exercise(name)?;
        self.config.session.exercise = name.to_string();
        self.counter = RepCounter::new(exercise, self.config.session.target_reps);
        self.transport.reset_gate();
        self.shared.reset_for_exercise();
        self.outcome_sent = false;
        info!(exercise = %name, "exercise changed; session state reset");
        Ok(())
    }

    /// The user explicitly confirmed the set is complete
    pub fn confirm_completion(&mut self) {
        self.finish(ExerciseStatus::Done);
    }

    /// The user explicitly deferred finishing the set
    pub fn defer_completion(&mut self) {
        self.finish(ExerciseStatus::InProgress);
    }

    /// Debug/QA bypass: complete the session without the gated state
    /// machine. Not part of the counting contract.
    pub fn force_complete(&mut self) {
        self.counter.force_complete();
        self.shared.set_local_count(self.counter.count());
        self.finish(ExerciseStatus::Done);
    }

    /// Manual transport recovery; the next send re-establishes socket mode
    pub fn rearm_socket(&self) {
        self.transport.rearm_socket();
    }

    /// Current transport mode
    pub fn transport_mode(&self) -> TransportMode {
        self.transport.mode()
    }

    /// Current session state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshot()
    }

    /// The shared state this session publishes to; result delivery from a
    /// custom transport goes through here
    pub fn shared_state(&self) -> Arc<SharedSessionState> {
        self.shared.clone()
    }

    /// Tear the session down: emit the terminal outcome if none was sent,
    /// close the transport, and block late results from mutating state.
    ///
    /// Idempotent; also runs on drop.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if !self.outcome_sent {
            let status = if self.shared.snapshot().rep_count == 0 {
                ExerciseStatus::NoPerformance
            } else {
                ExerciseStatus::InProgress
            };
            self.finish(status);
        }

        self.shared.mark_closed();
        self.transport.shutdown();
        info!("session closed");
    }

    fn finish(&mut self, status: ExerciseStatus) {
        if self.outcome_sent {
            return;
        }
        self.outcome_sent = true;

        let report = CompletionReport {
            user_id: self.config.session.user_id.clone(),
            slot_id: self.config.session.slot_id.clone(),
            exercise_status: status,
            reps_done: self.shared.snapshot().rep_count,
        };
        info!(?status, reps = report.reps_done, "session outcome");
        if let Some(bridge) = &self.bridge {
            bridge.notify_completion(&report);
        }
    }

    fn idle_report(&self) -> FrameReport {
        FrameReport {
            status: PoseStatus::Ready,
            stage: self.counter.stage(),
            count: self.counter.count(),
            angle: None,
            counted: false,
            target_reached: self.counter.target_reached(),
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.close();
    }
}
