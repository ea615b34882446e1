use async_channel::Sender;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::messages::{ShellCommand, ShellEvent};
use crate::utils::{self, CommandError};

const METADATA_FORMAT: &str = "{{playerName}}\t{{status}}\t{{title}}\t{{artist}}\t{{album}}\t{{mpris:length}}\t{{position}}\t{{mpris:artUrl}}";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("unexpected playerctl output: {0:?}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

impl PlaybackStatus {
    pub fn from_name(s: &str) -> Self {
        match s.trim() {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            _ => Self::Stopped,
        }
    }

    /// Icon for the play/pause button
    pub fn toggle_icon_name(&self) -> &'static str {
        match self {
            Self::Playing => "media-playback-pause-symbolic",
            _ => "media-playback-start-symbolic",
        }
    }
}

/// Current MPRIS player state
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSnapshot {
    pub player: String,
    pub status: PlaybackStatus,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub length: Option<Duration>,
    pub position: Option<Duration>,
    pub art_url: Option<String>,
}

impl MediaSnapshot {
    /// Playback progress in 0.0..=1.0
    pub fn progress(&self) -> f64 {
        match (self.position, self.length) {
            (Some(pos), Some(len)) if !len.is_zero() => {
                (pos.as_secs_f64() / len.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

fn micros(field: &str) -> Option<Duration> {
    field
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|us| *us > 0)
        .map(Duration::from_micros)
}

/// `m:ss` or `h:mm:ss`
pub fn format_position(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// One line of tab-separated metadata in `METADATA_FORMAT` order
pub fn parse_metadata(output: &str) -> Result<Option<MediaSnapshot>, MediaError> {
    let Some(line) = output.lines().find(|l| !l.trim().is_empty()) else {
        return Ok(None);
    };

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 8 {
        return Err(MediaError::Parse(line.to_string()));
    }

    let art_url = fields[7].trim();
    Ok(Some(MediaSnapshot {
        player: fields[0].to_string(),
        status: PlaybackStatus::from_name(fields[1]),
        title: fields[2].to_string(),
        artist: fields[3].to_string(),
        album: fields[4].to_string(),
        length: micros(fields[5]),
        position: micros(fields[6]),
        art_url: (!art_url.is_empty()).then(|| art_url.to_string()),
    }))
}

fn player_args<'a>(player: Option<&'a str>, rest: &[&'a str]) -> Vec<&'a str> {
    let mut args = Vec::with_capacity(rest.len() + 2);
    if let Some(player) = player {
        args.extend(["--player", player]);
    }
    args.extend_from_slice(rest);
    args
}

fn is_no_player(err: &CommandError) -> bool {
    matches!(err, CommandError::Failed { stderr, .. } if stderr.contains("No players found"))
}

pub async fn snapshot(player: Option<&str>) -> Result<Option<MediaSnapshot>, MediaError> {
    let args = player_args(player, &["metadata", "--format", METADATA_FORMAT]);
    match utils::run("playerctl", &args).await {
        Ok(out) => parse_metadata(&out),
        Err(e) if is_no_player(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn control(player: Option<&str>, verb: &str) -> Result<(), MediaError> {
    utils::run("playerctl", &player_args(player, &[verb])).await?;
    Ok(())
}

pub async fn seek(player: Option<&str>, seconds: f64) -> Result<(), MediaError> {
    let position = format!("{:.2}", seconds.max(0.0));
    utils::run("playerctl", &player_args(player, &["position", &position])).await?;
    Ok(())
}

/// Polls `playerctl` and forwards transport commands
pub struct MediaService {
    config: MediaConfig,
    event_tx: Sender<ShellEvent>,
    command_rx: mpsc::Receiver<ShellCommand>,
    last: Option<Option<MediaSnapshot>>,
}

impl MediaService {
    pub fn new(
        config: MediaConfig,
        event_tx: Sender<ShellEvent>,
        command_rx: mpsc::Receiver<ShellCommand>,
    ) -> Self {
        Self {
            config,
            event_tx,
            command_rx,
            last: None,
        }
    }

    fn player(&self) -> Option<&str> {
        self.config.preferred_player.as_deref()
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting media service");

        let period = Duration::from_millis(self.config.refresh_interval_ms.max(100));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => self.refresh(false).await,
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle_command(cmd).await;
                }
            }
        }

        Ok(())
    }

    async fn handle_command(&mut self, cmd: ShellCommand) {
        let result = match cmd {
            ShellCommand::RefreshMedia => {
                self.refresh(true).await;
                return;
            }
            ShellCommand::MediaPlayPause => control(self.player(), "play-pause").await,
            ShellCommand::MediaNext => control(self.player(), "next").await,
            ShellCommand::MediaPrevious => control(self.player(), "previous").await,
            ShellCommand::MediaSeek(seconds) => seek(self.player(), seconds).await,
            _ => return,
        };

        if let Err(e) = result {
            warn!("Media command failed: {}", e);
        }
        self.refresh(true).await;
    }

    async fn refresh(&mut self, force: bool) {
        let snapshot = match snapshot(self.player()).await {
            Ok(snapshot) => snapshot,
            Err(MediaError::Command(CommandError::NotFound { .. })) => None,
            Err(e) => {
                debug!("Failed to read player state: {}", e);
                None
            }
        };

        if !force && self.last.as_ref() == Some(&snapshot) {
            return;
        }
        self.last = Some(snapshot.clone());
        let _ = self.event_tx.send(ShellEvent::MediaUpdated(snapshot)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_line_parses() {
        let out = "spotify\tPlaying\tSong\tArtist\tAlbum\t240000000\t60000000\thttps://i.scdn.co/x\n";
        let snap = parse_metadata(out).unwrap().unwrap();

        assert_eq!(snap.player, "spotify");
        assert_eq!(snap.status, PlaybackStatus::Playing);
        assert_eq!(snap.length, Some(Duration::from_secs(240)));
        assert_eq!(snap.position, Some(Duration::from_secs(60)));
        assert_eq!(snap.progress(), 0.25);
        assert_eq!(snap.art_url.as_deref(), Some("https://i.scdn.co/x"));
    }

    #[test]
    fn missing_fields_are_none() {
        let snap = parse_metadata("mpv\tPaused\tclip.mkv\t\t\t\t0\t\n")
            .unwrap()
            .unwrap();
        assert_eq!(snap.length, None);
        assert_eq!(snap.position, None);
        assert_eq!(snap.art_url, None);
        assert_eq!(snap.progress(), 0.0);
        assert_eq!(snap.status.toggle_icon_name(), "media-playback-start-symbolic");

        assert!(parse_metadata("").unwrap().is_none());
        assert!(parse_metadata("only\tthree\tfields").is_err());
    }

    #[test]
    fn no_player_error_is_recognised() {
        let err = CommandError::Failed {
            program: "playerctl".into(),
            code: Some(1),
            stderr: "No players found".into(),
        };
        assert!(is_no_player(&err));
    }

    #[test]
    fn positions_format() {
        assert_eq!(format_position(Duration::from_secs(65)), "1:05");
        assert_eq!(format_position(Duration::from_secs(3725)), "1:02:05");
    }
}
