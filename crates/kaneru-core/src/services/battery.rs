use async_channel::Sender;
use starship_battery::units::electric_potential::volt;
use starship_battery::units::power::watt;
use starship_battery::units::ratio::percent;
use starship_battery::units::time::second;
use starship_battery::{Manager, State};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::BatteryConfig;
use crate::messages::{ShellCommand, ShellEvent};
use crate::utils::{self, CommandError};

pub const MISSING_ICON: &str = "battery-missing-symbolic";

#[derive(Debug, Error)]
pub enum BatteryError {
    #[error("no battery device found")]
    NoBattery,

    #[error("battery manager error: {0}")]
    Manager(#[from] starship_battery::Error),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("sysfs path not found: {0}")]
    SysfsNotFound(String),

    #[error("permission denied for path: {0}")]
    PermissionDenied(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("battery task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargeState {
    Charging,
    Discharging,
    Full,
    Empty,
    #[default]
    Unknown,
}

impl From<State> for ChargeState {
    fn from(state: State) -> Self {
        match state {
            State::Charging => Self::Charging,
            State::Discharging => Self::Discharging,
            State::Full => Self::Full,
            State::Empty => Self::Empty,
            _ => Self::Unknown,
        }
    }
}

/// Snapshot of the primary battery
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatteryDetails {
    pub percentage: f32,
    pub state: ChargeState,
    pub time_to_full: Option<Duration>,
    pub time_to_empty: Option<Duration>,
    pub energy_rate_watts: f32,
    pub voltage_volts: f32,
    pub health_percentage: f32,
    pub cycle_count: Option<u32>,
    pub icon_name: &'static str,
}

/// Symbolic icon for a charge level and state
pub fn icon_name(percentage: f32, state: ChargeState) -> &'static str {
    let level = percentage.round().clamp(0.0, 100.0) as u8;

    match state {
        ChargeState::Full => "battery-full-charged-symbolic",
        ChargeState::Empty => "battery-empty-symbolic",
        ChargeState::Charging => match level {
            0..=10 => "battery-caution-charging-symbolic",
            11..=30 => "battery-low-charging-symbolic",
            31..=95 => "battery-good-charging-symbolic",
            _ => "battery-full-charging-symbolic",
        },
        ChargeState::Discharging | ChargeState::Unknown => match level {
            0..=10 => "battery-caution-symbolic",
            11..=30 => "battery-low-symbolic",
            31..=95 => "battery-good-symbolic",
            _ => "battery-full-symbolic",
        },
    }
}

/// `1h 05m`, `42m`, or empty when unknown
pub fn format_time(duration: Option<Duration>) -> String {
    let Some(duration) = duration else {
        return String::new();
    };

    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

pub fn format_charge_status(details: Option<&BatteryDetails>) -> String {
    let Some(details) = details else {
        return "State N/A".to_string();
    };

    match details.state {
        ChargeState::Charging => match format_time(details.time_to_full) {
            time if time.is_empty() => "Charging".to_string(),
            time => format!("Charging ({})", time),
        },
        ChargeState::Discharging => match format_time(details.time_to_empty) {
            time if time.is_empty() => "Discharging".to_string(),
            time => format!("{} remaining", time),
        },
        ChargeState::Full => "Fully Charged".to_string(),
        ChargeState::Empty => "Empty".to_string(),
        ChargeState::Unknown => "Calculating...".to_string(),
    }
}

fn positive_duration(secs: f32) -> Option<Duration> {
    (secs.is_finite() && secs > 0.0).then(|| Duration::from_secs_f32(secs))
}

/// Read the first battery the system reports (blocking)
pub fn read_primary_battery() -> Result<BatteryDetails, BatteryError> {
    let manager = Manager::new()?;
    let mut battery = manager.batteries()?.next().ok_or(BatteryError::NoBattery)??;
    manager.refresh(&mut battery)?;

    let percentage = battery.state_of_charge().get::<percent>();
    let state = ChargeState::from(battery.state());

    Ok(BatteryDetails {
        percentage,
        state,
        time_to_full: battery
            .time_to_full()
            .and_then(|t| positive_duration(t.get::<second>())),
        time_to_empty: battery
            .time_to_empty()
            .and_then(|t| positive_duration(t.get::<second>())),
        energy_rate_watts: battery.energy_rate().get::<watt>(),
        voltage_volts: battery.voltage().get::<volt>(),
        health_percentage: battery.state_of_health().get::<percent>(),
        cycle_count: battery.cycle_count(),
        icon_name: icon_name(percentage, state),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PowerProfile {
    PowerSaver,
    Balanced,
    Performance,
    Other(String),
}

impl PowerProfile {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "power-saver" => Self::PowerSaver,
            "balanced" => Self::Balanced,
            "performance" => Self::Performance,
            other => Self::Other(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::PowerSaver => 0,
            Self::Balanced => 1,
            Self::Performance => 2,
            Self::Other(_) => 3,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::PowerSaver => "Power Saver",
            Self::Balanced => "Balanced",
            Self::Performance => "Performance",
            Self::Other(name) => name,
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::PowerSaver => "power-profile-power-saver-symbolic",
            Self::Balanced => "power-profile-balanced-symbolic",
            Self::Performance => "power-profile-performance-symbolic",
            Self::Other(_) => "emblem-system-symbolic",
        }
    }
}

impl fmt::Display for PowerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerSaver => write!(f, "power-saver"),
            Self::Balanced => write!(f, "balanced"),
            Self::Performance => write!(f, "performance"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for PowerProfile {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// Profiles from `powerprofilesctl list`, with the active one if marked
pub fn parse_profile_list(output: &str) -> (Vec<PowerProfile>, Option<PowerProfile>) {
    let mut profiles: Vec<PowerProfile> = Vec::new();
    let mut active = None;

    for line in output.lines() {
        let is_active = line.trim_start().starts_with('*');
        let name = line.trim().trim_start_matches('*').trim();
        let Some(name) = name.strip_suffix(':') else {
            continue;
        };
        if name.is_empty() || name.contains(char::is_whitespace) {
            continue;
        }

        let profile = PowerProfile::from_name(name);
        if is_active {
            active = Some(profile.clone());
        }
        if !profiles.contains(&profile) {
            profiles.push(profile);
        }
    }

    profiles.sort_by_key(PowerProfile::rank);
    (profiles, active)
}

pub async fn active_power_profile() -> Result<PowerProfile, BatteryError> {
    let output = utils::run("powerprofilesctl", &["get"]).await?;
    Ok(PowerProfile::from_name(&output))
}

pub async fn set_power_profile(profile: &PowerProfile) -> Result<(), BatteryError> {
    utils::run("powerprofilesctl", &["set", &profile.to_string()]).await?;
    Ok(())
}

/// Parse sysfs content (`1` or `0`)
pub fn parse_conservation_value(content: &str) -> Result<bool, BatteryError> {
    match content.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(BatteryError::Parse(format!(
            "unexpected conservation mode value: {:?}",
            other
        ))),
    }
}

pub fn read_conservation_mode(path: &Path) -> Result<bool, BatteryError> {
    if !path.exists() {
        return Err(BatteryError::SysfsNotFound(path.display().to_string()));
    }

    match std::fs::read_to_string(path) {
        Ok(content) => parse_conservation_value(&content),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(BatteryError::PermissionDenied(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes through `sudo -n`, so it fails fast without a NOPASSWD rule
pub async fn set_conservation_mode(path: &Path, enabled: bool) -> Result<(), BatteryError> {
    let script = format!("echo {} > {}", u8::from(enabled), path.display());
    utils::run("sudo", &["-n", "sh", "-c", &script]).await?;
    Ok(())
}

/// Polls the battery and applies power commands
pub struct BatteryService {
    config: BatteryConfig,
    event_tx: Sender<ShellEvent>,
    command_rx: mpsc::Receiver<ShellCommand>,
}

impl BatteryService {
    pub fn new(
        config: BatteryConfig,
        event_tx: Sender<ShellEvent>,
        command_rx: mpsc::Receiver<ShellCommand>,
    ) -> Self {
        Self {
            config,
            event_tx,
            command_rx,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting battery service");

        let period = Duration::from_secs(self.config.refresh_interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        self.refresh_profiles().await;
        self.refresh_conservation().await;

        loop {
            tokio::select! {
                _ = interval.tick() => self.refresh_battery().await,
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle_command(cmd).await;
                }
            }
        }

        Ok(())
    }

    async fn handle_command(&self, cmd: ShellCommand) {
        match cmd {
            ShellCommand::RefreshBattery => {
                self.refresh_battery().await;
                self.refresh_profiles().await;
                self.refresh_conservation().await;
            }

            ShellCommand::SetPowerProfile(profile) => {
                info!("Setting power profile to {}", profile);
                if let Err(e) = set_power_profile(&profile).await {
                    warn!("Failed to set power profile: {}", e);
                }
                self.refresh_profiles().await;
            }

            ShellCommand::SetConservationMode(enabled) => {
                let path = Path::new(&self.config.conservation_mode_path);
                if let Err(e) = set_conservation_mode(path, enabled).await {
                    warn!("Failed to set conservation mode: {}", e);
                }
                self.refresh_conservation().await;
            }

            _ => {}
        }
    }

    async fn refresh_battery(&self) {
        let details = match tokio::task::spawn_blocking(read_primary_battery).await {
            Ok(Ok(details)) => Some(details),
            Ok(Err(BatteryError::NoBattery)) => None,
            Ok(Err(e)) => {
                warn!("Failed to read battery: {}", e);
                None
            }
            Err(e) => {
                warn!("Battery reader panicked: {}", e);
                None
            }
        };

        let _ = self.event_tx.send(ShellEvent::BatteryUpdated(details)).await;
    }

    async fn refresh_profiles(&self) {
        let (available, active) = match utils::run("powerprofilesctl", &["list"]).await {
            Ok(output) => parse_profile_list(&output),
            Err(e) => {
                debug!("Power profiles unavailable: {}", e);
                (Vec::new(), None)
            }
        };

        // `list` marks the active profile; ask directly when it doesn't
        let active = match active {
            Some(profile) => Some(profile),
            None if !available.is_empty() => active_power_profile().await.ok(),
            None => None,
        };

        let _ = self
            .event_tx
            .send(ShellEvent::PowerProfilesUpdated { active, available })
            .await;
    }

    async fn refresh_conservation(&self) {
        let path = self.config.conservation_mode_path.clone();
        let state = tokio::task::spawn_blocking(move || read_conservation_mode(Path::new(&path)))
            .await
            .map_err(BatteryError::from)
            .and_then(|r| r);

        let state = match state {
            Ok(enabled) => Some(enabled),
            Err(BatteryError::SysfsNotFound(_)) => None,
            Err(e) => {
                debug!("Conservation mode unavailable: {}", e);
                None
            }
        };

        let _ = self
            .event_tx
            .send(ShellEvent::ConservationModeUpdated(state))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_thresholds() {
        assert_eq!(icon_name(10.4, ChargeState::Discharging), "battery-caution-symbolic");
        assert_eq!(icon_name(10.6, ChargeState::Discharging), "battery-low-symbolic");
        assert_eq!(icon_name(30.0, ChargeState::Charging), "battery-low-charging-symbolic");
        assert_eq!(icon_name(95.0, ChargeState::Unknown), "battery-good-symbolic");
        assert_eq!(icon_name(96.0, ChargeState::Charging), "battery-full-charging-symbolic");
        assert_eq!(icon_name(50.0, ChargeState::Full), "battery-full-charged-symbolic");
        assert_eq!(icon_name(0.0, ChargeState::Empty), "battery-empty-symbolic");
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(None), "");
        assert_eq!(format_time(Some(Duration::from_secs(42 * 60 + 59))), "42m");
        assert_eq!(format_time(Some(Duration::from_secs(3600 + 5 * 60))), "1h 05m");
    }

    #[test]
    fn charge_status_strings() {
        let mut details = BatteryDetails {
            state: ChargeState::Charging,
            time_to_full: Some(Duration::from_secs(90 * 60)),
            ..BatteryDetails::default()
        };
        assert_eq!(format_charge_status(Some(&details)), "Charging (1h 30m)");

        details.time_to_full = None;
        assert_eq!(format_charge_status(Some(&details)), "Charging");

        details.state = ChargeState::Discharging;
        details.time_to_empty = Some(Duration::from_secs(20 * 60));
        assert_eq!(format_charge_status(Some(&details)), "20m remaining");

        details.state = ChargeState::Full;
        assert_eq!(format_charge_status(Some(&details)), "Fully Charged");

        details.state = ChargeState::Unknown;
        assert_eq!(format_charge_status(Some(&details)), "Calculating...");
        assert_eq!(format_charge_status(None), "State N/A");
    }

    #[test]
    fn profile_list_is_ordered_and_deduplicated() {
        let output = "\
  performance:
    CpuDriver:\tintel_pstate
    Degraded:   no

* balanced:
    CpuDriver:\tintel_pstate
    PlatformDriver:\tplatform_profile

  power-saver:
    CpuDriver:\tintel_pstate

  balanced:
";
        let (profiles, active) = parse_profile_list(output);
        assert_eq!(
            profiles,
            vec![
                PowerProfile::PowerSaver,
                PowerProfile::Balanced,
                PowerProfile::Performance
            ]
        );
        assert_eq!(active, Some(PowerProfile::Balanced));
    }

    #[test]
    fn profile_names_round_trip() {
        for name in ["power-saver", "balanced", "performance", "custom"] {
            let profile: PowerProfile = name.parse().unwrap();
            assert_eq!(profile.to_string(), name);
        }
        assert_eq!(
            "custom".parse::<PowerProfile>().unwrap(),
            PowerProfile::Other("custom".into())
        );
    }

    #[test]
    fn conservation_values() {
        assert!(parse_conservation_value("1\n").unwrap());
        assert!(!parse_conservation_value("0").unwrap());
        assert!(matches!(
            parse_conservation_value("2"),
            Err(BatteryError::Parse(_))
        ));
    }

    #[test]
    fn conservation_reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conservation_mode");

        assert!(matches!(
            read_conservation_mode(&path),
            Err(BatteryError::SysfsNotFound(_))
        ));

        std::fs::write(&path, "1\n").unwrap();
        assert!(read_conservation_mode(&path).unwrap());
    }
}
