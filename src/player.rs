//! Local player - VLC/mpv playback
//!
//! Video decoding is left to a standard media player; this module only
//! launches it on a title's stream URL.

use serde::{Deserialize, Serialize};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::info;

/// Supported local players
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    /// VLC media player (default)
    #[default]
    Vlc,
    /// mpv media player
    Mpv,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerType::Mpv => "mpv",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Vlc => "VLC",
            PlayerType::Mpv => "mpv",
        }
    }

    /// Arguments for playing `url` with `title` shown in the window
    fn args(&self, url: &str, title: &str) -> Vec<String> {
        match self {
            PlayerType::Vlc => vec![
                url.to_string(),
                format!("--meta-title={}", title),
                "--no-video-title-show".to_string(),
            ],
            PlayerType::Mpv => vec![
                url.to_string(),
                format!("--force-media-title={}", title),
                "--force-window=immediate".to_string(),
            ],
        }
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Errors from local player operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("'{0}' has no playable stream")]
    NoStream(String),
}

/// Launches the configured player
#[derive(Debug, Clone, Copy)]
pub struct LocalPlayer {
    player_type: PlayerType,
}

impl LocalPlayer {
    pub fn new(player_type: PlayerType) -> Self {
        Self { player_type }
    }

    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Start playing `stream_url`; output is discarded so the TUI stays intact
    pub fn play(&self, stream_url: &str, title: &str) -> Result<Child, PlayerError> {
        info!(player = %self.player_type, title, "starting playback");

        let mut cmd = Command::new(self.player_type.command());
        cmd.args(self.player_type.args(stream_url, title))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.player_type.command().to_string())
            } else {
                PlayerError::StartFailed(e)
            }
        })
    }

    /// Play and wait for the player window to close
    pub async fn play_and_wait(&self, stream_url: &str, title: &str) -> Result<(), PlayerError> {
        let mut child = self.play(stream_url, title)?;
        child.wait().await?;
        Ok(())
    }
}
