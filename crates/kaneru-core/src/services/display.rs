use async_channel::Sender;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::DisplayConfig;
use crate::messages::{ShellCommand, ShellEvent};
use crate::utils::{self, CommandError};

const SCHEMA: &str = "org.gnome.desktop.interface";
const COLOR_SCHEME_KEY: &str = "color-scheme";

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("failed to start wlsunset: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("unexpected brightnessctl output: {0:?}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    /// Percent, None without a backlight device
    pub brightness: Option<u8>,
    pub night_light_enabled: bool,
    /// Kelvin
    pub temperature: u32,
    pub dark_mode: bool,
}

pub fn brightness_icon_name(percent: u8) -> &'static str {
    match percent {
        67..=100 => "display-brightness-high-symbolic",
        34..=66 => "display-brightness-medium-symbolic",
        1..=33 => "display-brightness-low-symbolic",
        _ => "display-brightness-off-symbolic",
    }
}

/// Percent from `brightnessctl -m` (`device,class,current,40%,max`)
pub fn parse_brightness(output: &str) -> Result<u8, DisplayError> {
    let line = output.lines().next().unwrap_or_default();
    line.split(',')
        .nth(3)
        .and_then(|field| field.trim().trim_end_matches('%').parse::<u8>().ok())
        .map(|p| p.min(100))
        .ok_or_else(|| DisplayError::Parse(line.to_string()))
}

pub async fn brightness() -> Result<u8, DisplayError> {
    let out = utils::run("brightnessctl", &["-m"]).await?;
    parse_brightness(&out)
}

pub async fn set_brightness(percent: u8) -> Result<(), DisplayError> {
    let value = format!("{}%", percent.min(100));
    utils::run("brightnessctl", &["-q", "set", &value]).await?;
    Ok(())
}

/// Slider position (0.0 warm .. 1.0 cool) for a temperature
pub fn kelvin_to_fraction(kelvin: u32, min: u32, max: u32) -> f64 {
    if max <= min {
        return 0.0;
    }
    let k = kelvin.clamp(min, max);
    f64::from(k - min) / f64::from(max - min)
}

pub fn fraction_to_kelvin(fraction: f64, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    let span = f64::from(max - min);
    min + (fraction.clamp(0.0, 1.0) * span).round() as u32
}

/// `pgrep` exits 1 when nothing matched
pub async fn night_light_running() -> Result<bool, DisplayError> {
    match utils::run_status("pgrep", &["-x", "wlsunset"]).await? {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        code => Err(CommandError::Failed {
            program: "pgrep".to_string(),
            code,
            stderr: String::new(),
        }
        .into()),
    }
}

/// Stop any running wlsunset, then start one at `temperature` if enabled
pub async fn set_night_light(enabled: bool, temperature: u32) -> Result<(), DisplayError> {
    if night_light_running().await? {
        utils::run_status("pkill", &["-TERM", "-x", "wlsunset"]).await?;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    if !enabled {
        return Ok(());
    }

    // Dropped child keeps running; tokio reaps it on exit
    tokio::process::Command::new("wlsunset")
        .arg("-T")
        .arg(temperature.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

pub fn parse_color_scheme(output: &str) -> bool {
    output.trim().trim_matches('\'') == "prefer-dark"
}

pub async fn dark_mode() -> Result<bool, DisplayError> {
    let out = utils::run("gsettings", &["get", SCHEMA, COLOR_SCHEME_KEY]).await?;
    Ok(parse_color_scheme(&out))
}

pub async fn set_dark_mode(enabled: bool) -> Result<(), DisplayError> {
    let scheme = if enabled { "prefer-dark" } else { "default" };
    utils::run("gsettings", &["set", SCHEMA, COLOR_SCHEME_KEY, scheme]).await?;
    Ok(())
}

/// Brightness, night light and color scheme
pub struct DisplayService {
    config: DisplayConfig,
    /// wlsunset has no query interface, so the last requested value lives here
    temperature: u32,
    event_tx: Sender<ShellEvent>,
    command_rx: mpsc::Receiver<ShellCommand>,
}

impl DisplayService {
    pub fn new(
        config: DisplayConfig,
        event_tx: Sender<ShellEvent>,
        command_rx: mpsc::Receiver<ShellCommand>,
    ) -> Self {
        let temperature = config
            .default_temperature
            .clamp(config.min_temperature, config.max_temperature.max(config.min_temperature));
        Self {
            config,
            temperature,
            event_tx,
            command_rx,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting display service");

        self.refresh().await;
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        Ok(())
    }

    fn clamp_temperature(&self, kelvin: u32) -> u32 {
        let min = self.config.min_temperature;
        kelvin.clamp(min, self.config.max_temperature.max(min))
    }

    async fn handle_command(&mut self, cmd: ShellCommand) {
        let result = match cmd {
            ShellCommand::RefreshDisplay => Ok(()),
            ShellCommand::SetBrightness(percent) => {
                debug!("Setting brightness to {}%", percent);
                set_brightness(percent).await
            }
            ShellCommand::SetNightLight {
                enabled,
                temperature,
            } => {
                let temperature = self.clamp_temperature(temperature);
                info!("Night light {} at {}K", enabled, temperature);
                let result = set_night_light(enabled, temperature).await;
                self.temperature = if enabled {
                    temperature
                } else {
                    self.clamp_temperature(self.config.default_temperature)
                };
                result
            }
            ShellCommand::SetDarkMode(enabled) => {
                info!("Dark mode {}", enabled);
                set_dark_mode(enabled).await
            }
            _ => return,
        };

        if let Err(e) = result {
            warn!("Display command failed: {}", e);
        }
        self.refresh().await;
    }

    async fn refresh(&self) {
        let brightness = match brightness().await {
            Ok(percent) => Some(percent),
            Err(e) => {
                debug!("Brightness unavailable: {}", e);
                None
            }
        };

        let night_light_enabled = night_light_running().await.unwrap_or_else(|e| {
            debug!("Night light state unavailable: {}", e);
            false
        });

        let dark_mode = dark_mode().await.unwrap_or_else(|e| {
            debug!("Color scheme unavailable: {}", e);
            false
        });

        let state = DisplayState {
            brightness,
            night_light_enabled,
            temperature: self.temperature,
            dark_mode,
        };
        let _ = self.event_tx.send(ShellEvent::DisplayUpdated(state)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightnessctl_machine_output() {
        assert_eq!(
            parse_brightness("intel_backlight,backlight,19200,40%,48000\n").unwrap(),
            40
        );
        assert!(matches!(parse_brightness(""), Err(DisplayError::Parse(_))));
    }

    #[test]
    fn temperature_mapping_clamps() {
        assert_eq!(kelvin_to_fraction(2500, 2500, 6500), 0.0);
        assert_eq!(kelvin_to_fraction(4500, 2500, 6500), 0.5);
        assert_eq!(kelvin_to_fraction(9000, 2500, 6500), 1.0);
        assert_eq!(fraction_to_kelvin(0.25, 2500, 6500), 3500);
        assert_eq!(fraction_to_kelvin(-1.0, 2500, 6500), 2500);
        assert_eq!(fraction_to_kelvin(0.5, 4000, 4000), 4000);
    }

    #[test]
    fn color_scheme_values() {
        assert!(parse_color_scheme("'prefer-dark'\n"));
        assert!(!parse_color_scheme("'default'\n"));
        assert!(!parse_color_scheme("'prefer-light'"));
    }

    #[test]
    fn brightness_icons() {
        assert_eq!(brightness_icon_name(100), "display-brightness-high-symbolic");
        assert_eq!(brightness_icon_name(0), "display-brightness-off-symbolic");
    }
}
