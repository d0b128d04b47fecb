// ================================================================================
// Integration tests for streaming transport failover
// File: tests/transport_failover_tests.rs
// ================================================================================

#[cfg(test)]
mod tests {
    use futures::{SinkExt, StreamExt};
    use pose_core::config::TransportTuning;
    use pose_core::landmark::{LandmarkIndex, SkeletonSample, LANDMARK_COUNT};
    use pose_core::transport::{
        self, FallbackHttp, FrameMessage, OfferResult, RawPrediction, SharedSessionState,
        TransportConfig, TransportError, TransportMode,
    };
    use pose_core::utils::time::MockTimeProvider;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_util::codec::{Framed, LinesCodec};

    /// HTTP stub for tests where only the socket path matters
    struct NoopHttp;

    impl FallbackHttp for NoopHttp {
        fn post_frame(
            &self,
            _url: &str,
            _frame: &FrameMessage,
        ) -> Result<RawPrediction, TransportError> {
            Ok(RawPrediction::default())
        }
    }

    fn sample_at(y: f32) -> SkeletonSample {
        let mut points = vec![[0.5, 0.5, 0.0]; LANDMARK_COUNT];
        points[LandmarkIndex::LeftWrist as usize] = [0.5, y, 0.0];
        SkeletonSample::from_points(&points).unwrap()
    }

    fn config_for(addr: SocketAddr) -> TransportConfig {
        TransportConfig {
            socket_addr: addr.to_string(),
            predict_url: format!("http://{addr}/predict"),
            tuning: TransportTuning::default(),
        }
    }

    async fn wait_for<F: Fn() -> bool>(what: &str, condition: F) {
        tokio::time::timeout(Duration::from_secs(120), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
    }

    /// Reserve a loopback address with nothing listening on it
    async fn dead_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_consecutive_failures_switch_to_fallback() {
        let shared = Arc::new(SharedSessionState::new());
        let clock = Arc::new(MockTimeProvider::new(0));
        let handle = transport::spawn(
            config_for(dead_addr().await),
            shared.clone(),
            Arc::new(NoopHttp),
            clock.clone(),
        );

        assert_eq!(handle.offer(&sample_at(0.5)), OfferResult::Baseline);
        clock.advance_by(150);
        assert_eq!(handle.offer(&sample_at(0.6)), OfferResult::Sent);

        // Failure 1 on the send attempt, failures 2 and 3 from the
        // reconnect timer; after that no further automatic attempts
        wait_for("fallback mode", || {
            shared.mode() == TransportMode::Fallback
        })
        .await;

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_rearm_restores_socket_mode() {
        let shared = Arc::new(SharedSessionState::new());
        let clock = Arc::new(MockTimeProvider::new(0));
        let addr = dead_addr().await;
        let handle = transport::spawn(
            config_for(addr),
            shared.clone(),
            Arc::new(NoopHttp),
            clock.clone(),
        );

        // Drive the transport into fallback
        handle.offer(&sample_at(0.5));
        clock.advance_by(150);
        handle.offer(&sample_at(0.6));
        wait_for("fallback mode", || {
            shared.mode() == TransportMode::Fallback
        })
        .await;

        // Bring a real server up on the same address, then re-arm
        let listener = TcpListener::bind(addr).await.unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(stream, LinesCodec::new());

            let line = framed.next().await.unwrap().unwrap();
            let frame: serde_json::Value = serde_json::from_str(&line).unwrap();
            assert_eq!(frame["keypoints"].as_array().unwrap().len(), 12);
            assert_eq!(frame["keypoints"][0].as_array().unwrap().len(), 3);
            let echoed = frame["timestamp"].as_u64().unwrap();

            let reply = serde_json::json!({
                "exercise": "squat",
                "confidence": 0.91,
                "rep_count": 2,
                "timestamp": echoed,
            });
            framed.send(reply.to_string()).await.unwrap();

            // Drain until the client closes
            while let Some(Ok(_)) = framed.next().await {}
        });

        handle.rearm_socket();
        wait_for("socket mode restored", || {
            shared.mode() == TransportMode::Socket
        })
        .await;

        // Keep offering frames until the server's classification lands;
        // frames offered before the lazy reconnect completes are dropped,
        // so one offer is not guaranteed to arrive
        let mut y = 0.7;
        tokio::time::timeout(Duration::from_secs(120), async {
            while shared.snapshot().exercise != "squat" {
                clock.advance_by(150);
                y = if y > 0.75 { 0.7 } else { 0.8 };
                handle.offer(&sample_at(y));
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        })
        .await
        .expect("timed out waiting for prediction");
        let snap = shared.snapshot();
        assert!((snap.confidence - 0.91).abs() < 1e-4);
        assert_eq!(snap.rep_count, 2);
        assert_eq!(shared.take_pending_remote(), Some(2));
        assert_eq!(snap.transport_mode, TransportMode::Socket);

        handle.shutdown();
        let _ = server.await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_inbound_messages_are_dropped() {
        let shared = Arc::new(SharedSessionState::new());
        let clock = Arc::new(MockTimeProvider::new(0));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(stream, LinesCodec::new());
            let _ = framed.next().await;

            framed.send("not json at all".to_string()).await.unwrap();
            framed
                .send(
                    serde_json::json!({"exercise": "pushup", "confidence": 0.8}).to_string(),
                )
                .await
                .unwrap();
            while let Some(Ok(_)) = framed.next().await {}
        });

        let handle = transport::spawn(
            config_for(addr),
            shared.clone(),
            Arc::new(NoopHttp),
            clock.clone(),
        );

        handle.offer(&sample_at(0.5));

        // The malformed line is ignored; the valid one still applies
        let mut y = 0.6;
        tokio::time::timeout(Duration::from_secs(120), async {
            while shared.snapshot().exercise != "pushup" {
                clock.advance_by(150);
                y = if y > 0.65 { 0.6 } else { 0.7 };
                handle.offer(&sample_at(y));
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        })
        .await
        .expect("timed out waiting for prediction");
        assert_eq!(shared.mode(), TransportMode::Socket);

        handle.shutdown();
        let _ = server.await;
    }
}
