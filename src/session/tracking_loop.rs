//! The poll loop driving a tracking session.
//!
//! One iteration captures the latest camera frame, normalizes it for
//! upload, posts it to the frame endpoint, applies whatever the service
//! reported, and relays any recognized command. Iterations run strictly in
//! sequence — the body is awaited to completion before the fixed delay and
//! the next pass, so at most one poll is ever in flight no matter how slow
//! the service is. Every failure is logged and dropped; the next tick
//! simply tries again.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{watch, Mutex};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::camera::FrameSource;
use crate::remote::GazeService;

use super::state::SessionState;

/// Delay between the end of one poll and the start of the next. Fixed
/// interval, no backoff.
pub const POLL_DELAY: Duration = Duration::from_millis(100);

pub(crate) struct LoopContext {
    pub service: Arc<dyn GazeService>,
    pub frames: Arc<dyn FrameSource>,
    pub state: Arc<Mutex<SessionState>>,
    pub updates: Arc<watch::Sender<SessionState>>,
}

pub(crate) async fn tracking_loop(
    activation: String,
    context: LoopContext,
    poll_delay: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = poll_once(&context) => {}
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(poll_delay) => {}
        }
    }
    debug!("tracking loop {activation} stopped");
}

async fn poll_once(context: &LoopContext) {
    let Some(image) = context.frames.snapshot_data_url().await else {
        debug!("no frame available yet");
        return;
    };

    let report = match context.service.process_frame(&image).await {
        Ok(report) => report,
        Err(err) => {
            warn!("frame upload failed: {err}");
            return;
        }
    };

    if let Some(message) = &report.error {
        warn!("frame processing error from service: {message}");
        return;
    }
    if let Some(status) = &report.status {
        debug!("service status: {status}");
    }

    let command = report.command.clone();
    {
        let mut state = context.state.lock().await;
        state.apply_frame(&report);
        let _ = context.updates.send(state.clone());
    }

    // A recognized command is relayed to the composer before the next poll
    // is scheduled; its response is the newest authoritative state.
    if let Some(action) = command {
        match context.service.send_action(&action).await {
            Ok(outcome) => {
                let mut state = context.state.lock().await;
                state.apply_compose(&outcome);
                let _ = context.updates.send(state.clone());
            }
            Err(err) => warn!("command relay failed for {action:?}: {err}"),
        }
    }
}
