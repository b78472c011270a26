//! Camera acquisition and the live frame feed.
//!
//! The webcam is read through an external grabber process (`ffmpeg` by
//! default) streaming MJPEG to stdout; a reader task keeps only the most
//! recent complete frame. The feed is owned exclusively by the session and
//! must be released explicitly — teardown kills the grabber and stops the
//! reader on every exit path.

mod encode;
mod feed;

pub use encode::{to_data_url, FRAME_HEIGHT, FRAME_WIDTH, JPEG_QUALITY};

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, info, warn};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;

const GRABBER_CANDIDATES: &[&str] = &["ffmpeg"];
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);
/// Reader buffer cap; anything larger than this without a frame boundary
/// means the stream is not MJPEG and is dropped wholesale.
const MAX_PENDING_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
}

#[derive(Debug, Clone, Default)]
pub struct CameraConfig {
    /// Device passed to the grabber; platform default when unset.
    pub device: Option<String>,
    /// Explicit grabber binary; otherwise located on PATH.
    pub grabber: Option<PathBuf>,
}

impl CameraConfig {
    pub fn device(&self) -> &str {
        self.device.as_deref().unwrap_or(default_device())
    }
}

fn default_device() -> &'static str {
    if cfg!(target_os = "macos") {
        "0"
    } else {
        "/dev/video0"
    }
}

/// A source of upload-ready frames. The session polls for a snapshot of
/// the current frame; tests substitute an in-memory source.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Most recent complete frame, normalized and wrapped as a JPEG data
    /// URL ready for upload.
    async fn snapshot_data_url(&self) -> Option<String>;
    /// Stop capture and release the device. Idempotent.
    async fn release(&self);
}

/// Live webcam feed backed by a grabber process.
pub struct CameraFeed {
    child: Mutex<Option<Child>>,
    frames: watch::Receiver<Option<Vec<u8>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl CameraFeed {
    /// Opens the device at 640×480 and waits for the first frame. Failure is
    /// classified as `PermissionDenied` or `DeviceUnavailable` from the
    /// grabber's stderr; either way the spawned process is cleaned up.
    pub async fn acquire(config: &CameraConfig) -> Result<Self, CameraError> {
        let binary = locate_grabber(config)?;
        let device = config.device().to_string();

        let mut command = Command::new(&binary);
        command
            .args(grabber_args(&device))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|err| {
            CameraError::DeviceUnavailable(format!(
                "failed to launch {}: {err}",
                binary.display()
            ))
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            CameraError::DeviceUnavailable("grabber stdout was not captured".to_string())
        })?;
        let stderr = child.stderr.take();

        let cancel = CancellationToken::new();
        let (frame_tx, frame_rx) = watch::channel(None);
        let diagnostics = Arc::new(Mutex::new(String::new()));

        let mut workers = Vec::new();
        workers.push(tokio::spawn(read_frames(stdout, frame_tx, cancel.clone())));
        if let Some(stderr) = stderr {
            let diagnostics = Arc::clone(&diagnostics);
            workers.push(tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("grabber: {line}");
                    let mut buffer = diagnostics.lock().unwrap();
                    buffer.push_str(&line);
                    buffer.push('\n');
                }
            }));
        }

        let feed = Self {
            child: Mutex::new(Some(child)),
            frames: frame_rx,
            workers: Mutex::new(workers),
            cancel,
        };

        if !feed.wait_for_first_frame().await {
            feed.release().await;
            let stderr_text = diagnostics.lock().unwrap().clone();
            return Err(classify_failure(&device, &stderr_text));
        }

        info!("camera feed active ({device} via {})", binary.display());
        Ok(feed)
    }

    async fn wait_for_first_frame(&self) -> bool {
        let mut frames = self.frames.clone();
        let arrived = timeout(FIRST_FRAME_TIMEOUT, async {
            loop {
                if frames.borrow_and_update().is_some() {
                    return true;
                }
                if frames.changed().await.is_err() {
                    return false;
                }
            }
        })
        .await;
        matches!(arrived, Ok(true))
    }
}

#[async_trait]
impl FrameSource for CameraFeed {
    async fn snapshot_data_url(&self) -> Option<String> {
        let frame = self.frames.borrow().as_ref().cloned()?;
        // JPEG decode/re-encode is CPU-bound; keep it off the executor.
        let encoded = tokio::task::spawn_blocking(move || to_data_url(&frame)).await;
        match encoded {
            Ok(Ok(image)) => Some(image),
            Ok(Err(err)) => {
                warn!("frame encoding failed: {err:#}");
                None
            }
            Err(err) => {
                warn!("frame encoding worker failed to join: {err}");
                None
            }
        }
    }

    async fn release(&self) {
        self.cancel.cancel();
        let child = self.child.lock().unwrap().take();
        if let Some(mut child) = child {
            if let Err(err) = child.kill().await {
                warn!("failed to kill grabber: {err}");
            }
            info!("camera feed released");
        }
        let workers = std::mem::take(&mut *self.workers.lock().unwrap());
        for worker in workers {
            worker.abort();
        }
    }
}

fn locate_grabber(config: &CameraConfig) -> Result<PathBuf, CameraError> {
    if let Some(binary) = &config.grabber {
        return Ok(binary.clone());
    }
    GRABBER_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| {
            CameraError::DeviceUnavailable(format!(
                "no frame grabber found on PATH (looked for {})",
                GRABBER_CANDIDATES.join(", ")
            ))
        })
}

fn grabber_args(device: &str) -> Vec<String> {
    let input_format = if cfg!(target_os = "macos") {
        "avfoundation"
    } else {
        "v4l2"
    };
    let video_size = format!("{FRAME_WIDTH}x{FRAME_HEIGHT}");
    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        input_format,
        "-framerate",
        "30",
        "-video_size",
        video_size.as_str(),
        "-i",
        device,
        "-f",
        "mjpeg",
        "-q:v",
        "7",
        "pipe:1",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}

fn classify_failure(device: &str, stderr_text: &str) -> CameraError {
    let lowered = stderr_text.to_lowercase();
    let denied = ["permission denied", "not permitted", "not authorized"]
        .iter()
        .any(|needle| lowered.contains(needle));

    let detail = stderr_text
        .lines()
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| format!("no frames from {device}"));

    if denied {
        CameraError::PermissionDenied(detail)
    } else {
        CameraError::DeviceUnavailable(detail)
    }
}

async fn read_frames(
    stdout: ChildStdout,
    frames: watch::Sender<Option<Vec<u8>>>,
    cancel: CancellationToken,
) {
    let mut stdout = stdout;
    let mut pending: Vec<u8> = Vec::with_capacity(64 * 1024);
    let mut chunk = [0u8; 8192];

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            read = stdout.read(&mut chunk) => match read {
                Ok(0) => {
                    debug!("camera stream ended");
                    break;
                }
                Ok(count) => {
                    pending.extend_from_slice(&chunk[..count]);
                    while let Some(frame) = feed::take_frame(&mut pending) {
                        let _ = frames.send(Some(frame));
                    }
                    if pending.len() > MAX_PENDING_BYTES {
                        warn!("discarding {} unframed bytes from grabber", pending.len());
                        pending.clear();
                    }
                }
                Err(err) => {
                    warn!("camera read failed: {err}");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grabber_args_request_fixed_resolution() {
        let args = grabber_args("/dev/video9");
        assert!(args.contains(&"640x480".to_string()));
        assert!(args.contains(&"/dev/video9".to_string()));
        assert!(args.contains(&"mjpeg".to_string()));
    }

    #[test]
    fn failure_classification() {
        let denied = classify_failure("0", "avfoundation: operation not permitted\n");
        assert!(matches!(denied, CameraError::PermissionDenied(_)));

        let missing = classify_failure("/dev/video0", "no such file or directory\n");
        assert!(matches!(missing, CameraError::DeviceUnavailable(_)));

        let silent = classify_failure("/dev/video0", "");
        assert!(matches!(silent, CameraError::DeviceUnavailable(_)));
    }

    #[test]
    fn locating_grabber_honors_override() {
        let config = CameraConfig {
            device: None,
            grabber: Some(PathBuf::from("/opt/tools/ffmpeg")),
        };
        let binary = locate_grabber(&config).unwrap();
        assert_eq!(binary, PathBuf::from("/opt/tools/ffmpeg"));
    }
}
