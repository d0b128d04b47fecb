// ================================================================================
// Integration tests for session orchestration
// File: tests/session_flow_tests.rs
// ================================================================================

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use pose_core::config::SystemConfig;
    use pose_core::landmark::{LandmarkIndex, SkeletonSample, LANDMARK_COUNT};
    use pose_core::session::{CompletionReport, ExerciseStatus, HostBridge, SessionController};
    use pose_core::transport::PredictionUpdate;
    use pose_core::utils::time::SystemTimeProvider;
    use std::sync::Arc;

    struct RecordingBridge {
        reports: Mutex<Vec<CompletionReport>>,
    }

    impl RecordingBridge {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                reports: Mutex::new(Vec::new()),
            })
        }
    }

    impl HostBridge for RecordingBridge {
        fn notify_completion(&self, report: &CompletionReport) {
            self.reports.lock().push(report.clone());
        }
    }

    fn squat_sample(knee_angle_deg: f32) -> SkeletonSample {
        let mut points = vec![[0.5, 0.5, 0.0]; LANDMARK_COUNT];
        points[LandmarkIndex::LeftShoulder as usize] = [0.45, 0.30, 0.0];
        points[LandmarkIndex::RightShoulder as usize] = [0.55, 0.30, 0.0];
        points[LandmarkIndex::LeftHip as usize] = [0.45, 0.55, 0.0];
        points[LandmarkIndex::RightHip as usize] = [0.55, 0.55, 0.0];

        let knee = [0.45, 0.70];
        let theta = knee_angle_deg.to_radians();
        let ankle = [knee[0] + 0.15 * theta.sin(), knee[1] - 0.15 * theta.cos()];
        points[LandmarkIndex::LeftKnee as usize] = [knee[0], knee[1], 0.0];
        points[LandmarkIndex::LeftAnkle as usize] = [ankle[0], ankle[1], 0.0];
        points[LandmarkIndex::RightKnee as usize] = [knee[0] + 0.1, knee[1], 0.0];
        points[LandmarkIndex::RightAnkle as usize] = [ankle[0] + 0.1, ankle[1], 0.0];

        SkeletonSample::from_points(&points).unwrap()
    }

    /// Frames for one full squat at frame-rate-realistic angle velocity
    fn squat_cycle_frames() -> Vec<SkeletonSample> {
        let mut frames = Vec::new();
        let mut angle = 170.0_f32;
        while angle > 95.0 {
            angle -= 4.0;
            frames.push(squat_sample(angle.max(95.0)));
        }
        while angle < 170.0 {
            angle += 4.0;
            frames.push(squat_sample(angle.min(170.0)));
        }
        frames
    }

    fn test_config(target: Option<u32>) -> SystemConfig {
        let mut config = SystemConfig::default();
        // Unreachable predictor: local counting must be unaffected
        config.predictor.base_url = "http://127.0.0.1:1".to_string();
        config.session.target_reps = target;
        config.session.user_id = "user-9".to_string();
        config.session.slot_id = "slot-2".to_string();
        config
    }

    #[tokio::test]
    async fn test_target_completion_reports_done_once() {
        let bridge = RecordingBridge::new();
        let mut session = SessionController::connect(
            test_config(Some(2)),
            Some(bridge.clone()),
            Arc::new(SystemTimeProvider),
        )
        .unwrap();

        for _ in 0..3 {
            session.process_frame(Some(squat_sample(170.0)));
        }
        let mut completed = false;
        for _ in 0..4 {
            for frame in squat_cycle_frames() {
                let report = session.process_frame(Some(frame));
                completed |= report.target_reached;
            }
        }
        assert!(completed);
        assert_eq!(session.snapshot().rep_count, 2);

        session.close();
        let reports = bridge.reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].exercise_status, ExerciseStatus::Done);
        assert_eq!(reports[0].reps_done, 2);
        assert_eq!(reports[0].slot_id, "slot-2");
    }

    #[tokio::test]
    async fn test_remote_count_can_complete_the_session() {
        let bridge = RecordingBridge::new();
        let mut session = SessionController::connect(
            test_config(Some(5)),
            Some(bridge.clone()),
            Arc::new(SystemTimeProvider),
        )
        .unwrap();

        // Simulate the predictor speaking with an authoritative count
        let shared_update = PredictionUpdate {
            classification: Some(("squat".to_string(), 0.95)),
            reps: Some(7),
            latency_ms: Some(40),
        };
        // Results are applied through the shared state, exactly as the
        // transport actor does it
        session_apply(&session, shared_update);

        let report = session.process_frame(Some(squat_sample(170.0)));
        assert_eq!(report.count, 7);
        assert!(report.target_reached);

        session.close();
        let reports = bridge.reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].exercise_status, ExerciseStatus::Done);
        assert_eq!(reports[0].reps_done, 7);
    }

    /// Apply an update the way the transport actor would
    fn session_apply(session: &SessionController, update: PredictionUpdate) {
        session.shared_state().apply_prediction(update);
    }

    #[tokio::test]
    async fn test_counting_survives_dead_predictor() {
        let bridge = RecordingBridge::new();
        let mut session = SessionController::connect(
            test_config(None),
            Some(bridge.clone()),
            Arc::new(SystemTimeProvider),
        )
        .unwrap();

        for _ in 0..3 {
            session.process_frame(Some(squat_sample(170.0)));
        }
        for _ in 0..3 {
            for frame in squat_cycle_frames() {
                session.process_frame(Some(frame));
            }
        }

        // Transport failures never corrupt the local count
        assert_eq!(session.snapshot().rep_count, 3);
        session.close();
        assert_eq!(
            bridge.reports.lock()[0].exercise_status,
            ExerciseStatus::InProgress
        );
    }
}
