//! Demo binary: run a scripted squat session end-to-end
//!
//! Loads `pose-core.toml` (or the path given as the first argument), then
//! plays a synthetic squat recording through the full pipeline. Reps are
//! counted locally while frames stream to the configured predictor; with no
//! predictor reachable the transport degrades to fallback mode and the
//! session still completes.

use pose_core::config::SystemConfig;
use pose_core::landmark::{
    LandmarkIndex, ScriptedSource, SkeletonSample, SkeletonSource, SourceError, LANDMARK_COUNT,
};
use pose_core::session::SessionController;
use pose_core::utils::time::SystemTimeProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Upright body with the left knee bent to the requested angle
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

    SkeletonSample::from_points(&points).expect("demo geometry is finite")
}

/// Three squat cycles at frame-rate-realistic angle velocity
fn demo_frames() -> Vec<Option<SkeletonSample>> {
    let mut frames = Vec::new();
    for _ in 0..10 {
        frames.push(Some(squat_sample(170.0)));
    }
    for _ in 0..3 {
        let mut angle: f32 = 170.0;
        while angle > 95.0 {
            angle -= 3.0;
            frames.push(Some(squat_sample(angle.max(95.0))));
        }
        while angle < 170.0 {
            angle += 3.0;
            frames.push(Some(squat_sample(angle.min(170.0))));
        }
    }
    frames
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "pose-core.toml".to_string());

    let config = match SystemConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, path = %config_path, "cannot start session");
            std::process::exit(1);
        }
    };

    let mut session =
        match SessionController::connect(config, None, Arc::new(SystemTimeProvider)) {
            Ok(session) => session,
            Err(err) => {
                error!(%err, "session setup failed");
                std::process::exit(1);
            }
        };

    let mut source = ScriptedSource::new(demo_frames())
        .with_frame_interval(Duration::from_millis(33))
        .with_jitter(0.001);

    loop {
        match source.next_frame().await {
            Ok(frame) => {
                let report = session.process_frame(frame);
                if report.counted {
                    info!(count = report.count, "rep counted");
                }
                if report.target_reached {
                    break;
                }
            }
            Err(SourceError::Exhausted) => break,
            Err(err) => {
                error!(%err, "capture failed");
                break;
            }
        }
    }

    let snapshot = session.snapshot();
    info!(
        exercise = %snapshot.exercise,
        reps = snapshot.rep_count,
        mode = ?snapshot.transport_mode,
        latency_ms = ?snapshot.latency_ms,
        "session finished"
    );
    session.close();
}
