// src/transport/fallback.rs
//! Fallback mode: one request/response call per eligible frame
//!
//! At most one call may be in flight at any time. A frame arriving while a
//! call is outstanding is dropped, never queued; the next eligible frame
//! carries fresher data anyway.

use crate::transport::state::SharedSessionState;
use crate::transport::wire::{normalize, FrameMessage, RawPrediction};
use crate::transport::TransportError;
use crate::utils::time::TimeProvider;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Blocking HTTP seam; injectable for tests
pub trait FallbackHttp: Send + Sync {
    /// POST one frame to the prediction endpoint and parse the reply
    fn post_frame(&self, url: &str, frame: &FrameMessage) -> Result<RawPrediction, TransportError>;
}

/// Production HTTP client
pub struct UreqHttp {
    timeout: Duration,
}

impl UreqHttp {
    /// Client with the given per-request timeout
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl FallbackHttp for UreqHttp {
    fn post_frame(&self, url: &str, frame: &FrameMessage) -> Result<RawPrediction, TransportError> {
        let response = ureq::post(url)
            .timeout(self.timeout)
            .send_json(frame)
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => TransportError::HttpStatus(code),
                ureq::Error::Transport(transport) => TransportError::Http(transport.to_string()),
            })?;

        response
            .into_json::<RawPrediction>()
            .map_err(|err| TransportError::Http(format!("response parse failed: {err}")))
    }
}

/// Dispatches eligible frames as independent HTTP calls
pub struct FallbackClient {
    url: String,
    http: Arc<dyn FallbackHttp>,
    in_flight: Arc<AtomicBool>,
    shared: Arc<SharedSessionState>,
    time: Arc<dyn TimeProvider>,
}

impl FallbackClient {
    /// Build a dispatcher for the given prediction endpoint
    pub fn new(
        url: String,
        http: Arc<dyn FallbackHttp>,
        shared: Arc<SharedSessionState>,
        time: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            url,
            http,
            in_flight: Arc::new(AtomicBool::new(false)),
            shared,
            time,
        }
    }

    /// Fire one call for this frame unless one is already outstanding.
    ///
    /// Returns whether the frame was dispatched. The call runs on the
    /// blocking pool; a non-success response is discarded without touching
    /// session state.
    pub fn dispatch(&self, frame: FrameMessage) -> bool {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("fallback call in flight; frame dropped");
            return false;
        }

        let url = self.url.clone();
        let http = self.http.clone();
        let in_flight = self.in_flight.clone();
        let shared = self.shared.clone();
        let time = self.time.clone();

        tokio::task::spawn_blocking(move || {
            match http.post_frame(&url, &frame) {
                Ok(raw) => {
                    let update = normalize(raw, time.now_millis());
                    shared.apply_prediction(update);
                }
                Err(err) => {
                    warn!(%err, "fallback prediction call failed");
                }
            }
            in_flight.store(false, Ordering::Release);
        });

        true
    }

    /// Whether a call is currently outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;
    use crate::utils::time::MockTimeProvider;
    use std::sync::atomic::AtomicU32;
    use std::sync::mpsc;
    use std::sync::Mutex;

    fn frame() -> FrameMessage {
        FrameMessage::new(&[Landmark::new(0.5, 0.5, 0.0); 12], 1_000)
    }

    /// Mock that blocks each call until released through a channel
    struct BlockingHttp {
        calls: AtomicU32,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl FallbackHttp for BlockingHttp {
        fn post_frame(
            &self,
            _url: &str,
            _frame: &FrameMessage,
        ) -> Result<RawPrediction, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self
                .release
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5));
            Ok(RawPrediction {
                exercise: Some("squat".to_string()),
                confidence: Some(0.9),
                ..RawPrediction::default()
            })
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_single_call_in_flight() {
        let (release_tx, release_rx) = mpsc::channel();
        let http = Arc::new(BlockingHttp {
            calls: AtomicU32::new(0),
            release: Mutex::new(release_rx),
        });
        let shared = Arc::new(SharedSessionState::new());
        let client = FallbackClient::new(
            "http://localhost/predict".to_string(),
            http.clone(),
            shared.clone(),
            Arc::new(MockTimeProvider::new(0)),
        );

        assert!(client.dispatch(frame()));

        // Wait for the blocking call to start
        while http.calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // A second eligible frame mid-flight is dropped, not queued
        assert!(!client.dispatch(frame()));
        assert_eq!(http.calls.load(Ordering::SeqCst), 1);

        release_tx.send(()).unwrap();
        while client.is_in_flight() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Only the first call ever ran, and its result was applied
        assert_eq!(http.calls.load(Ordering::SeqCst), 1);
        assert_eq!(shared.snapshot().exercise, "squat");

        // The slot is free again for the next eligible frame
        assert!(client.dispatch(frame()));
        release_tx.send(()).unwrap();
    }

    /// Mock that fails with a non-success status
    struct RejectingHttp;

    impl FallbackHttp for RejectingHttp {
        fn post_frame(
            &self,
            _url: &str,
            _frame: &FrameMessage,
        ) -> Result<RawPrediction, TransportError> {
            Err(TransportError::HttpStatus(422))
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_non_success_discarded() {
        let shared = Arc::new(SharedSessionState::new());
        let client = FallbackClient::new(
            "http://localhost/predict".to_string(),
            Arc::new(RejectingHttp),
            shared.clone(),
            Arc::new(MockTimeProvider::new(0)),
        );

        assert!(client.dispatch(frame()));
        while client.is_in_flight() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let snap = shared.snapshot();
        assert_eq!(snap.exercise, "");
        assert_eq!(snap.rep_count, 0);
    }
}
