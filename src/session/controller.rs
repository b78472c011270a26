//! Owns the gaze session: camera handle, tracking loop lifecycle, and the
//! single lock-guarded `SessionState` every server response is applied to.
//! UI layers observe the session through a watch channel of state snapshots.

use std::sync::Arc;

use anyhow::{bail, Result};
use log::{info, warn};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::camera::{CameraError, FrameSource};
use crate::keyboard::KeyboardLayout;
use crate::remote::GazeService;
use crate::speech;

use super::state::SessionState;
use super::tracking_loop::{tracking_loop, LoopContext};

struct LoopHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    service: Arc<dyn GazeService>,
    frames: Arc<Mutex<Option<Arc<dyn FrameSource>>>>,
    updates: Arc<watch::Sender<SessionState>>,
    worker: Arc<Mutex<Option<LoopHandle>>>,
    poll_delay: Duration,
}

impl SessionController {
    pub fn new(service: Arc<dyn GazeService>, poll_delay: Duration) -> Self {
        let state = SessionState::new(KeyboardLayout::fallback());
        let (updates, _) = watch::channel(state.clone());
        Self {
            state: Arc::new(Mutex::new(state)),
            service,
            frames: Arc::new(Mutex::new(None)),
            updates: Arc::new(updates),
            worker: Arc::new(Mutex::new(None)),
            poll_delay,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// One-shot session bootstrap: fetch the keyboard layout (fallback kept
    /// on any failure, never retried) and push the initial sensitivity so
    /// the service starts from the slider's default.
    pub async fn initialize(&self) {
        match self.service.keyboard_layout().await {
            Ok(keys) if !keys.is_empty() => {
                let mut state = self.state.lock().await;
                state.keys = keys;
                self.publish(&state);
            }
            Ok(_) => warn!("service returned an empty keyboard layout, keeping fallback"),
            Err(err) => warn!("keyboard layout fetch failed, keeping fallback: {err}"),
        }

        let sensitivity = self.state.lock().await.sensitivity;
        if let Err(err) = self.service.update_sensitivity(sensitivity).await {
            warn!("initial sensitivity push failed: {err}");
        }
    }

    /// Hands the session exclusive ownership of the camera feed.
    pub async fn attach_camera(&self, source: Arc<dyn FrameSource>) {
        *self.frames.lock().await = Some(source);
        let mut state = self.state.lock().await;
        state.webcam_active = true;
        state.camera_notice = None;
        self.publish(&state);
    }

    /// Records a failed acquisition; the session stays up in a degraded
    /// state where tracking cannot start and the notice is shown in place
    /// of the video panel.
    pub async fn camera_failed(&self, err: &CameraError) {
        let mut state = self.state.lock().await;
        state.webcam_active = false;
        state.camera_notice = Some(err.to_string());
        self.publish(&state);
    }

    pub async fn toggle_tracking(&self) -> Result<bool> {
        let active = self.state.lock().await.tracking;
        self.set_tracking(!active).await
    }

    /// Transitions the tracking session. Each edge notifies the remote
    /// service (fire-and-forget); entering `true` spawns the poll loop and
    /// entering `false` cancels it before the notification goes out.
    pub async fn set_tracking(&self, active: bool) -> Result<bool> {
        if self.state.lock().await.tracking == active {
            return Ok(active);
        }

        if active {
            let frames = self
                .frames
                .lock()
                .await
                .clone();
            let Some(frames) = frames else {
                bail!("tracking requires an active camera");
            };

            let mut worker = self.worker.lock().await;
            if worker.is_some() {
                bail!("tracking already active");
            }

            self.notify_toggle().await;

            let activation = Uuid::new_v4().to_string();
            info!("tracking session {activation} started");
            {
                let mut state = self.state.lock().await;
                state.set_tracking(true);
                self.publish(&state);
            }

            let cancel = CancellationToken::new();
            let context = LoopContext {
                service: Arc::clone(&self.service),
                frames,
                state: Arc::clone(&self.state),
                updates: Arc::clone(&self.updates),
            };
            let handle = tokio::spawn(tracking_loop(
                activation,
                context,
                self.poll_delay,
                cancel.clone(),
            ));
            *worker = Some(LoopHandle { cancel, handle });
        } else {
            self.stop_worker().await;
            {
                let mut state = self.state.lock().await;
                state.set_tracking(false);
                self.publish(&state);
            }
            self.notify_toggle().await;
            info!("tracking session stopped");
        }

        Ok(active)
    }

    /// Round trip to the clear endpoint; the response is the new
    /// authoritative composed-text state.
    pub async fn clear_text(&self) {
        match self.service.clear_text().await {
            Ok(outcome) => {
                let mut state = self.state.lock().await;
                state.apply_compose(&outcome);
                self.publish(&state);
            }
            Err(err) => warn!("clear text failed: {err}"),
        }
    }

    /// Posts a named action to the composer and applies the full returned
    /// state. Used by the poll loop for server-detected commands and by UI
    /// actions such as the cursor reset.
    pub async fn relay_action(&self, action: &str) {
        match self.service.send_action(action).await {
            Ok(outcome) => {
                let mut state = self.state.lock().await;
                state.apply_compose(&outcome);
                self.publish(&state);
            }
            Err(err) => warn!("action relay failed for {action:?}: {err}"),
        }
    }

    pub async fn reset_cursor(&self) {
        self.relay_action("RESET_CURSOR").await;
    }

    /// Clamps, applies locally right away (optimistic), then pushes the
    /// stored value outward in exactly one request.
    pub async fn update_sensitivity(&self, value: f32) {
        let applied = {
            let mut state = self.state.lock().await;
            let applied = state.set_sensitivity(value);
            self.publish(&state);
            applied
        };
        if let Err(err) = self.service.update_sensitivity(applied).await {
            warn!("sensitivity push failed: {err}");
        }
    }

    /// Steps sensitivity by `delta`, rounded to the slider's 0.1 grid.
    pub async fn adjust_sensitivity(&self, delta: f32) {
        let current = self.state.lock().await.sensitivity;
        let stepped = ((current + delta) * 10.0).round() / 10.0;
        self.update_sensitivity(stepped).await;
    }

    /// Local-only: submits the composed text to the speech facility. No
    /// network call, no state mutation.
    pub async fn speak(&self) {
        let text = self.state.lock().await.text.trim().to_string();
        if text.is_empty() {
            return;
        }
        speech::speak(&text);
    }

    /// Session teardown: stop the loop so no poll fires afterwards and
    /// release the camera. Runs on every exit path.
    pub async fn shutdown(&self) {
        self.stop_worker().await;
        if let Some(frames) = self.frames.lock().await.take() {
            frames.release().await;
        }
        let mut state = self.state.lock().await;
        if state.tracking {
            state.set_tracking(false);
        }
        state.webcam_active = false;
        self.publish(&state);
    }

    async fn stop_worker(&self) {
        if let Some(worker) = self.worker.lock().await.take() {
            worker.cancel.cancel();
            if let Err(err) = worker.handle.await {
                warn!("tracking loop failed to join: {err}");
            }
        }
    }

    async fn notify_toggle(&self) {
        // Fire-and-forget by policy: the error is logged and discarded, the
        // local flag stays authoritative for the loop.
        if let Err(err) = self.service.toggle_tracking().await {
            warn!("tracking toggle notification failed: {err}");
        }
    }

    fn publish(&self, state: &SessionState) {
        let _ = self.updates.send(state.clone());
    }
}
