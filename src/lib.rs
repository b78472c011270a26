pub mod camera;
pub mod config;
pub mod keyboard;
pub mod remote;
pub mod session;
pub mod speech;
pub mod ui;

use std::sync::Arc;

use anyhow::Result;
use log::warn;

use camera::CameraFeed;
use config::AppConfig;
use remote::HttpGazeService;
use session::{SessionController, POLL_DELAY};

/// Brings up a session against the configured service, runs the terminal
/// demo until the user quits, and tears the session down on every exit
/// path (loop cancelled, camera released).
pub async fn run(config: AppConfig) -> Result<()> {
    let service = Arc::new(HttpGazeService::new(&config.backend_url));
    let controller = SessionController::new(service, POLL_DELAY);

    controller.initialize().await;

    match CameraFeed::acquire(&config.camera).await {
        Ok(feed) => controller.attach_camera(Arc::new(feed)).await,
        Err(err) => {
            warn!("webcam error: {err}");
            controller.camera_failed(&err).await;
        }
    }

    let result = ui::run(controller.clone()).await;
    controller.shutdown().await;
    result
}
