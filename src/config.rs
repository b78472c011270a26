//! Command-line configuration. Session state itself is never persisted —
//! everything here is ambient plumbing: where the service lives, which
//! device to capture from, and where logs go while the UI owns the
//! terminal.

use std::path::PathBuf;

use clap::Parser;

use crate::camera::CameraConfig;
use crate::remote::client::DEFAULT_BASE_URL;

#[derive(Debug, Parser)]
#[command(name = "gazetype")]
#[command(about = "Galactic Typist gaze keyboard demo client")]
#[command(version)]
pub struct Cli {
    /// Base URL of the gaze-processing service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub backend: String,

    /// Video device handed to the frame grabber (platform default if unset)
    #[arg(long)]
    pub device: Option<String>,

    /// Frame grabber binary (default: ffmpeg found on PATH)
    #[arg(long)]
    pub grabber: Option<PathBuf>,

    /// Log file; stderr is unusable while the UI owns the terminal
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub camera: CameraConfig,
    pub log_file: PathBuf,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            backend_url: cli.backend,
            camera: CameraConfig {
                device: cli.device,
                grabber: cli.grabber,
            },
            log_file: cli
                .log_file
                .unwrap_or_else(|| std::env::temp_dir().join("gazetype.log")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_service() {
        let cli = Cli::parse_from(["gazetype"]);
        let config = AppConfig::from(cli);
        assert_eq!(config.backend_url, "http://localhost:5000");
        assert!(config.camera.device.is_none());
        assert!(config.log_file.ends_with("gazetype.log"));
    }

    #[test]
    fn overrides_are_honored() {
        let cli = Cli::parse_from([
            "gazetype",
            "--backend",
            "http://127.0.0.1:9000",
            "--device",
            "/dev/video2",
        ]);
        let config = AppConfig::from(cli);
        assert_eq!(config.backend_url, "http://127.0.0.1:9000");
        assert_eq!(config.camera.device.as_deref(), Some("/dev/video2"));
    }
}
