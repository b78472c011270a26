//! Local speech output.
//!
//! Speaking is a purely local side effect: the composed text is handed to
//! whichever system TTS binary is installed, fire-and-forget. No network
//! call is involved and the session state is untouched.

use std::path::PathBuf;
use std::process::Stdio;

use log::{debug, warn};
use tokio::process::Command;

const TTS_CANDIDATES: &[&str] = &["say", "espeak", "spd-say", "flite"];

pub fn find_tts_binary() -> Option<PathBuf> {
    TTS_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Speaks `text` in the background. Must be called from a tokio runtime.
pub fn speak(text: &str) {
    if text.is_empty() {
        return;
    }
    let Some(binary) = find_tts_binary() else {
        warn!("no speech binary found (looked for {})", TTS_CANDIDATES.join(", "));
        return;
    };

    let mut command = Command::new(&binary);
    // flite needs -t to treat the argument as literal text; every other
    // candidate takes the text positionally.
    if binary.file_name().and_then(|name| name.to_str()) == Some("flite") {
        command.arg("-t");
    }
    command
        .arg(text)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match command.spawn() {
        Ok(mut child) => {
            debug!("speaking {} chars via {}", text.len(), binary.display());
            tokio::spawn(async move {
                if let Err(err) = child.wait().await {
                    warn!("speech process failed: {err}");
                }
            });
        }
        Err(err) => warn!("failed to launch {}: {err}", binary.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_discovery_does_not_panic() {
        // Availability depends on the host; the lookup itself must not fail.
        let _ = find_tts_binary();
    }
}
