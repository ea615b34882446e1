use async_channel::Sender;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::AudioConfig;
use crate::messages::{ShellCommand, ShellEvent};
use crate::utils::{self, CommandError};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("unexpected wpctl output: {0:?}")]
    Parse(String),
}

/// Which default node a volume command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioTarget {
    Sink,
    Source,
}

impl AudioTarget {
    pub fn wpctl_id(&self) -> &'static str {
        match self {
            Self::Sink => "@DEFAULT_AUDIO_SINK@",
            Self::Source => "@DEFAULT_AUDIO_SOURCE@",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeLevel {
    pub percent: u8,
    pub muted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    pub id: u32,
    pub name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioState {
    /// None when there is no default sink
    pub output: Option<VolumeLevel>,
    pub input: Option<VolumeLevel>,
    pub sinks: Vec<AudioDevice>,
    pub sources: Vec<AudioDevice>,
}

pub fn volume_icon_name(level: Option<VolumeLevel>) -> &'static str {
    match level {
        None => "audio-volume-muted-symbolic",
        Some(l) if l.muted || l.percent == 0 => "audio-volume-muted-symbolic",
        Some(l) if l.percent < 34 => "audio-volume-low-symbolic",
        Some(l) if l.percent < 67 => "audio-volume-medium-symbolic",
        Some(_) => "audio-volume-high-symbolic",
    }
}

pub fn microphone_icon_name(level: Option<VolumeLevel>) -> &'static str {
    match level {
        None => "microphone-disabled-symbolic",
        Some(l) if l.muted || l.percent == 0 => "microphone-sensitivity-muted-symbolic",
        Some(l) if l.percent < 34 => "microphone-sensitivity-low-symbolic",
        Some(l) if l.percent < 67 => "microphone-sensitivity-medium-symbolic",
        Some(_) => "microphone-sensitivity-high-symbolic",
    }
}

/// Parse `Volume: 0.45` or `Volume: 0.45 [MUTED]`
pub fn parse_volume(output: &str) -> Result<VolumeLevel, AudioError> {
    let line = output.trim();
    let rest = line
        .strip_prefix("Volume:")
        .ok_or_else(|| AudioError::Parse(line.to_string()))?;

    let mut parts = rest.split_whitespace();
    let volume: f64 = parts
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| AudioError::Parse(line.to_string()))?;
    let muted = parts.any(|p| p == "[MUTED]");

    Ok(VolumeLevel {
        percent: (volume * 100.0).round().clamp(0.0, 255.0) as u8,
        muted,
    })
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Other,
    Sinks,
    Sources,
}

fn parse_device_line(line: &str) -> Option<AudioDevice> {
    let trimmed = line.trim_start_matches(|c: char| c.is_whitespace() || "│├└─".contains(c));
    let (is_default, rest) = match trimmed.strip_prefix('*') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };

    let (id, name) = rest.split_once('.')?;
    let id = id.trim().parse().ok()?;
    let name = match name.find(" [vol:") {
        Some(idx) => &name[..idx],
        None => name,
    };

    Some(AudioDevice {
        id,
        name: name.trim().to_string(),
        is_default,
    })
}

/// Sinks and sources from the `Audio` tree of `wpctl status`
pub fn parse_status(output: &str) -> (Vec<AudioDevice>, Vec<AudioDevice>) {
    let mut sinks = Vec::new();
    let mut sources = Vec::new();
    let mut in_audio = false;
    let mut section = Section::Other;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        // Top-level headings (`PipeWire`, `Audio`, `Video`, `Settings`) start at column 0
        if !line.starts_with(|c: char| c.is_whitespace() || "│├└".contains(c)) {
            in_audio = line.trim() == "Audio";
            section = Section::Other;
            continue;
        }
        if !in_audio {
            continue;
        }

        if line.contains("─ ") && line.trim_end().ends_with(':') {
            section = match line.rsplit("─ ").next().map(str::trim) {
                Some("Sinks:") => Section::Sinks,
                Some("Sources:") => Section::Sources,
                _ => Section::Other,
            };
            continue;
        }

        let Some(device) = parse_device_line(line) else {
            continue;
        };
        match section {
            Section::Sinks => sinks.push(device),
            Section::Sources => sources.push(device),
            Section::Other => {}
        }
    }

    (sinks, sources)
}

pub async fn volume(target: AudioTarget) -> Result<VolumeLevel, AudioError> {
    let out = utils::run("wpctl", &["get-volume", target.wpctl_id()]).await?;
    parse_volume(&out)
}

pub async fn set_volume(target: AudioTarget, percent: u8) -> Result<(), AudioError> {
    let value = format!("{}%", percent);
    utils::run("wpctl", &["set-volume", target.wpctl_id(), &value]).await?;
    Ok(())
}

pub async fn set_muted(target: AudioTarget, muted: bool) -> Result<(), AudioError> {
    let flag = if muted { "1" } else { "0" };
    utils::run("wpctl", &["set-mute", target.wpctl_id(), flag]).await?;
    Ok(())
}

pub async fn set_default_device(id: u32) -> Result<(), AudioError> {
    utils::run("wpctl", &["set-default", &id.to_string()]).await?;
    Ok(())
}

pub async fn devices() -> Result<(Vec<AudioDevice>, Vec<AudioDevice>), AudioError> {
    let out = utils::run("wpctl", &["status"]).await?;
    Ok(parse_status(&out))
}

/// PipeWire volume and device state through `wpctl`
pub struct AudioService {
    config: AudioConfig,
    event_tx: Sender<ShellEvent>,
    command_rx: mpsc::Receiver<ShellCommand>,
    last: Option<AudioState>,
}

impl AudioService {
    pub fn new(
        config: AudioConfig,
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

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting audio service");

        let period = Duration::from_secs(self.config.refresh_interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

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
            ShellCommand::RefreshAudio => {
                self.refresh(true).await;
                return;
            }
            ShellCommand::SetVolume { target, percent } => {
                set_volume(target, percent.min(self.config.max_volume)).await
            }
            ShellCommand::SetMuted { target, muted } => set_muted(target, muted).await,
            ShellCommand::SetDefaultDevice(id) => {
                info!("Setting default audio device {}", id);
                set_default_device(id).await
            }
            _ => return,
        };

        if let Err(e) = result {
            warn!("Audio command failed: {}", e);
        }
        self.refresh(true).await;
    }

    /// Polls only publish when something changed
    async fn refresh(&mut self, force: bool) {
        let output = volume(AudioTarget::Sink)
            .await
            .map_err(|e| debug!("No default sink: {}", e))
            .ok();
        let input = volume(AudioTarget::Source)
            .await
            .map_err(|e| debug!("No default source: {}", e))
            .ok();
        let (sinks, sources) = devices().await.unwrap_or_else(|e| {
            debug!("Failed to list audio devices: {}", e);
            (Vec::new(), Vec::new())
        });

        let state = AudioState {
            output,
            input,
            sinks,
            sources,
        };

        if !force && self.last.as_ref() == Some(&state) {
            return;
        }
        self.last = Some(state.clone());
        let _ = self.event_tx.send(ShellEvent::AudioUpdated(state)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "\
PipeWire 'pipewire-0' [1.0.5, user@host, cookie:1]
 └─ Clients:
        32. WirePlumber                         [1.0.5, user@host, pid:1234]

Audio
 ├─ Devices:
 │      42. Built-in Audio                      [alsa]
 │
 ├─ Sinks:
 │  *   49. Built-in Audio Analog Stereo        [vol: 0.40]
 │      57. HDMI / DisplayPort 1 Output         [vol: 1.00 MUTED]
 │
 ├─ Sink endpoints:
 │
 ├─ Sources:
 │  *   50. Built-in Audio Analog Stereo        [vol: 1.00]
 │
 ├─ Source endpoints:
 │
 └─ Streams:
        61. Firefox

Video
 ├─ Devices:
 │      70. Integrated Camera                   [v4l2]
 │
 ├─ Sinks:
 │
 ├─ Sources:
 │  *   71. Integrated Camera (V4L2)
";

    #[test]
    fn volume_line_parses() {
        let level = parse_volume("Volume: 0.45\n").unwrap();
        assert_eq!(level, VolumeLevel { percent: 45, muted: false });

        let muted = parse_volume("Volume: 1.00 [MUTED]").unwrap();
        assert!(muted.muted);
        assert_eq!(muted.percent, 100);

        assert!(parse_volume("nonsense").is_err());
    }

    #[test]
    fn status_tree_parses_audio_devices_only() {
        let (sinks, sources) = parse_status(STATUS);

        assert_eq!(sinks.len(), 2);
        assert_eq!(sinks[0].id, 49);
        assert_eq!(sinks[0].name, "Built-in Audio Analog Stereo");
        assert!(sinks[0].is_default);
        assert_eq!(sinks[1].name, "HDMI / DisplayPort 1 Output");
        assert!(!sinks[1].is_default);

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, 50);
    }

    #[test]
    fn icons_follow_level() {
        let level = |percent, muted| Some(VolumeLevel { percent, muted });
        assert_eq!(volume_icon_name(level(80, false)), "audio-volume-high-symbolic");
        assert_eq!(volume_icon_name(level(80, true)), "audio-volume-muted-symbolic");
        assert_eq!(volume_icon_name(level(20, false)), "audio-volume-low-symbolic");
        assert_eq!(microphone_icon_name(None), "microphone-disabled-symbolic");
    }
}
