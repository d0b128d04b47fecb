// src/transport/mod.rs
//! Streaming transport to the remote predictor
//!
//! An owned, explicitly constructed transport with its own lifecycle: one
//! instance per active session, no ambient globals. The frame pipeline
//! offers samples through a non-blocking gate; an independent actor task
//! owns the socket, the reconnect timer and the fallback client, so a slow
//! or dead network can never stall frame processing.

pub mod fallback;
pub mod gate;
pub mod socket;
pub mod state;
pub mod wire;

pub use fallback::{FallbackClient, FallbackHttp, UreqHttp};
pub use gate::{GateDecision, SendGate};
pub use socket::{FailureVerdict, ReconnectPolicy};
pub use state::{SessionSnapshot, SharedSessionState, TransportMode};
pub use wire::{normalize, FrameMessage, PredictionUpdate, RawPrediction};

use crate::config::{SystemConfig, TransportTuning};
use crate::landmark::SkeletonSample;
use crate::utils::time::TimeProvider;
use futures::{SinkExt, StreamExt};
use socket::SocketStream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Streaming transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Establishing the socket connection failed
    #[error("socket connect failed: {0}")]
    Connect(String),

    /// The live socket failed mid-stream
    #[error("socket error: {0}")]
    Socket(String),

    /// The fallback endpoint answered with a non-success status
    #[error("http status {0}")]
    HttpStatus(u16),

    /// The fallback call failed below the HTTP layer
    #[error("http transport error: {0}")]
    Http(String),
}

/// Endpoints and tuning for one transport instance
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Address of the persistent socket channel
    pub socket_addr: String,
    /// Full URL of the fallback prediction endpoint
    pub predict_url: String,
    /// Gating and failover tuning
    pub tuning: TransportTuning,
}

impl TransportConfig {
    /// Derive a transport config from the loaded system configuration
    pub fn from_system(config: &SystemConfig) -> Self {
        Self {
            socket_addr: config.predictor.socket_addr(),
            predict_url: config.predictor.predict_url(),
            tuning: config.transport.clone(),
        }
    }
}

/// What happened to a frame offered to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferResult {
    /// Handed to the transport actor
    Sent,
    /// Recorded as the motion baseline, not sent
    Baseline,
    /// Rejected by the minimum send interval
    Throttled,
    /// Rejected by the motion threshold
    NoMotion,
    /// Rejected as structurally invalid
    Invalid,
    /// Eligible, but the actor channel was full
    Dropped,
}

enum TransportCommand {
    RearmSocket,
    Shutdown,
}

/// Caller-side handle to a spawned transport actor.
///
/// All methods are non-blocking; the frame pipeline may call them from its
/// synchronous context.
pub struct TransportHandle {
    frame_tx: mpsc::Sender<FrameMessage>,
    command_tx: mpsc::UnboundedSender<TransportCommand>,
    gate: parking_lot::Mutex<SendGate>,
    shared: Arc<SharedSessionState>,
}

impl TransportHandle {
    /// Offer one skeleton sample; the gate decides whether it goes out
    pub fn offer(&self, sample: &SkeletonSample) -> OfferResult {
        let decision = self.gate.lock().evaluate(sample);
        match decision {
            GateDecision::Send(frame) => match self.frame_tx.try_send(frame) {
                Ok(()) => OfferResult::Sent,
                Err(_) => {
                    debug!("transport channel full; frame dropped");
                    OfferResult::Dropped
                }
            },
            GateDecision::BaselineRecorded => OfferResult::Baseline,
            GateDecision::TooSoon => OfferResult::Throttled,
            GateDecision::BelowMotionThreshold => OfferResult::NoMotion,
            GateDecision::Invalid => OfferResult::Invalid,
        }
    }

    /// Manual recovery: clear failure history, cancel any pending reconnect,
    /// force fallback off and close the live socket so the next send
    /// re-establishes socket mode
    pub fn rearm_socket(&self) {
        let _ = self.command_tx.send(TransportCommand::RearmSocket);
    }

    /// Forget the send-gate baseline (exercise change)
    pub fn reset_gate(&self) {
        self.gate.lock().reset();
    }

    /// Current transport mode
    pub fn mode(&self) -> TransportMode {
        self.shared.mode()
    }

    /// Ask the actor to stop; the socket closes and timers are dropped
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(TransportCommand::Shutdown);
    }
}

/// Spawn a transport actor onto the current tokio runtime
pub fn spawn(
    config: TransportConfig,
    shared: Arc<SharedSessionState>,
    http: Arc<dyn FallbackHttp>,
    time: Arc<dyn TimeProvider>,
) -> TransportHandle {
    let (frame_tx, frame_rx) =
        mpsc::channel(crate::config::constants::transport::FRAME_CHANNEL_CAPACITY);
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let gate = parking_lot::Mutex::new(SendGate::new(&config.tuning, time.clone()));
    let fallback = FallbackClient::new(
        config.predict_url.clone(),
        http,
        shared.clone(),
        time.clone(),
    );

    let actor = Actor {
        addr: config.socket_addr.clone(),
        policy: ReconnectPolicy::new(&config.tuning),
        shared: shared.clone(),
        fallback,
        time,
    };
    tokio::spawn(run_actor(actor, frame_rx, command_rx));

    TransportHandle {
        frame_tx,
        command_tx,
        gate,
        shared,
    }
}

/// Convenience constructor using the production HTTP client
pub fn spawn_default(
    config: TransportConfig,
    shared: Arc<SharedSessionState>,
    time: Arc<dyn TimeProvider>,
) -> TransportHandle {
    let http = Arc::new(UreqHttp::new(Duration::from_millis(
        config.tuning.http_timeout_ms,
    )));
    spawn(config, shared, http, time)
}

type ReconnectTimer = Pin<Box<tokio::time::Sleep>>;

struct Actor {
    addr: String,
    policy: ReconnectPolicy,
    shared: Arc<SharedSessionState>,
    fallback: FallbackClient,
    time: Arc<dyn TimeProvider>,
}

async fn run_actor(
    mut actor: Actor,
    mut frame_rx: mpsc::Receiver<FrameMessage>,
    mut command_rx: mpsc::UnboundedReceiver<TransportCommand>,
) {
    let mut conn: Option<SocketStream> = None;
    let mut reconnect: Option<ReconnectTimer> = None;

    loop {
        tokio::select! {
            maybe_frame = frame_rx.recv() => {
                let Some(frame) = maybe_frame else { break };
                actor.handle_frame(frame, &mut conn, &mut reconnect).await;
            }
            maybe_command = command_rx.recv() => {
                match maybe_command {
                    Some(TransportCommand::RearmSocket) => {
                        actor.rearm(&mut conn, &mut reconnect);
                    }
                    Some(TransportCommand::Shutdown) | None => break,
                }
            }
            inbound = async { conn.as_mut().unwrap().next().await }, if conn.is_some() => {
                actor.handle_inbound(inbound, &mut conn, &mut reconnect);
            }
            _ = async { reconnect.as_mut().unwrap().as_mut().await }, if reconnect.is_some() => {
                reconnect = None;
                actor.attempt_connect(&mut conn, &mut reconnect).await;
            }
        }
    }

    debug!("transport actor stopped");
}

impl Actor {
    async fn handle_frame(
        &mut self,
        frame: FrameMessage,
        conn: &mut Option<SocketStream>,
        reconnect: &mut Option<ReconnectTimer>,
    ) {
        match self.shared.mode() {
            TransportMode::Fallback => {
                self.fallback.dispatch(frame);
            }
            TransportMode::Socket => {
                if conn.is_none() && reconnect.is_none() {
                    self.attempt_connect(conn, reconnect).await;
                }
                let Some(stream) = conn.as_mut() else {
                    // Disconnected and waiting on backoff: drop the frame
                    return;
                };
                let line = match serde_json::to_string(&frame) {
                    Ok(line) => line,
                    Err(err) => {
                        debug!(%err, "frame encode failed; dropped");
                        return;
                    }
                };
                if let Err(err) = stream.send(line).await {
                    warn!(%err, "socket send failed");
                    self.register_failure(conn, reconnect);
                }
            }
        }
    }

    fn handle_inbound(
        &mut self,
        inbound: Option<Result<String, tokio_util::codec::LinesCodecError>>,
        conn: &mut Option<SocketStream>,
        reconnect: &mut Option<ReconnectTimer>,
    ) {
        match inbound {
            Some(Ok(line)) => match serde_json::from_str::<RawPrediction>(&line) {
                Ok(raw) => {
                    let update = normalize(raw, self.time.now_millis());
                    self.shared.apply_prediction(update);
                }
                Err(err) => debug!(%err, "malformed socket message dropped"),
            },
            Some(Err(err)) => {
                warn!(%err, "socket read error");
                self.register_failure(conn, reconnect);
            }
            None => {
                info!("socket closed by server");
                self.register_failure(conn, reconnect);
            }
        }
    }

    async fn attempt_connect(
        &mut self,
        conn: &mut Option<SocketStream>,
        reconnect: &mut Option<ReconnectTimer>,
    ) {
        match socket::connect(&self.addr).await {
            Ok(stream) => {
                self.policy.on_open();
                self.shared.set_mode(TransportMode::Socket);
                *conn = Some(stream);
                info!(addr = %self.addr, "socket connected");
            }
            Err(err) => {
                warn!(%err, "socket connect failed");
                self.register_failure(conn, reconnect);
            }
        }
    }

    fn register_failure(
        &mut self,
        conn: &mut Option<SocketStream>,
        reconnect: &mut Option<ReconnectTimer>,
    ) {
        *conn = None;
        match self.policy.on_failure() {
            FailureVerdict::SwitchToFallback => {
                *reconnect = None;
                self.shared.set_mode(TransportMode::Fallback);
                info!("socket failure threshold reached; switching to fallback mode");
            }
            FailureVerdict::RetryAfter(delay) => {
                warn!(
                    ?delay,
                    failures = self.policy.consecutive_failures(),
                    "socket failure; reconnect scheduled"
                );
                if reconnect.is_none() {
                    *reconnect = Some(Box::pin(tokio::time::sleep(delay)));
                }
            }
        }
    }

    fn rearm(&mut self, conn: &mut Option<SocketStream>, reconnect: &mut Option<ReconnectTimer>) {
        self.policy.reset();
        *reconnect = None;
        *conn = None;
        self.shared.set_mode(TransportMode::Socket);
        info!("socket mode re-armed");
    }
}
