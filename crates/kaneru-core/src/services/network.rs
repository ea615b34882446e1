use async_channel::Sender;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::NetworkConfig;
use crate::messages::{ShellCommand, ShellEvent};
use crate::utils::{self, CommandError};

pub const DISABLED_ICON: &str = "network-wireless-disabled-symbolic";
pub const OFFLINE_ICON: &str = "network-wireless-offline-symbolic";

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("no wifi device found")]
    NoDevice,

    #[error("failed to connect to {ssid}: {reason}")]
    ConnectFailed { ssid: String, reason: String },
}

/// State of the wifi radio and the active connection
#[derive(Debug, Clone, PartialEq)]
pub struct WifiDetails {
    pub enabled: bool,
    pub connected: bool,
    pub ssid: Option<String>,
    pub strength: Option<u8>,
    /// MHz
    pub frequency: Option<u32>,
    /// Mbit/s
    pub bitrate: Option<u32>,
    pub icon_name: &'static str,
}

impl Default for WifiDetails {
    fn default() -> Self {
        Self {
            enabled: false,
            connected: false,
            ssid: None,
            strength: None,
            frequency: None,
            bitrate: None,
            icon_name: DISABLED_ICON,
        }
    }
}

impl WifiDetails {
    /// `Home (5 GHz)` style label for the popover header
    pub fn label(&self) -> String {
        match (&self.ssid, self.frequency) {
            (Some(ssid), Some(freq)) if self.connected => format!("{} ({})", ssid, band(freq)),
            (Some(ssid), None) if self.connected => ssid.clone(),
            _ if !self.enabled => "Wi-Fi off".to_string(),
            _ => "Not connected".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessPoint {
    pub ssid: String,
    pub strength: u8,
    pub secured: bool,
    pub frequency: u32,
    pub active: bool,
    pub icon_name: &'static str,
}

pub fn signal_icon_name(strength: u8) -> &'static str {
    match strength {
        80..=100 => "network-wireless-signal-excellent-symbolic",
        60..=79 => "network-wireless-signal-good-symbolic",
        40..=59 => "network-wireless-signal-ok-symbolic",
        20..=39 => "network-wireless-signal-weak-symbolic",
        _ => "network-wireless-signal-none-symbolic",
    }
}

pub fn wifi_icon_name(enabled: bool, connected: bool, strength: Option<u8>) -> &'static str {
    if !enabled {
        return DISABLED_ICON;
    }
    match strength {
        Some(s) if connected => signal_icon_name(s),
        _ => OFFLINE_ICON,
    }
}

fn band(frequency: u32) -> &'static str {
    if frequency >= 5_900 {
        "6 GHz"
    } else if frequency >= 4_900 {
        "5 GHz"
    } else {
        "2.4 GHz"
    }
}

/// Split one line of `nmcli -t` output, honouring `\:` and `\\` escapes
pub fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Leading integer of values like `5180 MHz` or `540 Mbit/s`
fn leading_number(value: &str) -> Option<u32> {
    value.split_whitespace().next()?.parse().ok()
}

const AP_FIELDS: &str = "IN-USE,SSID,SIGNAL,FREQ,RATE,SECURITY";

/// One row of `nmcli -t -f IN-USE,SSID,SIGNAL,FREQ,RATE,SECURITY device wifi list`
#[derive(Debug, Clone, PartialEq)]
struct ScanRow {
    active: bool,
    ssid: String,
    strength: u8,
    frequency: u32,
    bitrate: Option<u32>,
    secured: bool,
}

fn parse_scan_row(line: &str) -> Option<ScanRow> {
    let fields = split_terse(line);
    if fields.len() < 6 {
        return None;
    }

    let security = fields[5].trim();
    Some(ScanRow {
        active: fields[0].trim() == "*",
        ssid: fields[1].clone(),
        strength: fields[2].trim().parse::<u8>().ok()?.min(100),
        frequency: leading_number(&fields[3]).unwrap_or(0),
        bitrate: leading_number(&fields[4]),
        secured: !security.is_empty() && security != "--",
    })
}

/// Visible networks: hidden SSIDs dropped, one entry per SSID (strongest or
/// active wins), active first, then by strength, then by name
pub fn parse_access_points(output: &str) -> Vec<AccessPoint> {
    let mut points: Vec<AccessPoint> = Vec::new();

    for row in output.lines().filter_map(parse_scan_row) {
        if row.ssid.is_empty() {
            continue;
        }

        let point = AccessPoint {
            icon_name: signal_icon_name(row.strength),
            ssid: row.ssid,
            strength: row.strength,
            secured: row.secured,
            frequency: row.frequency,
            active: row.active,
        };

        match points.iter_mut().find(|p| p.ssid == point.ssid) {
            Some(existing) => {
                let active = existing.active || point.active;
                if point.strength > existing.strength {
                    *existing = point;
                }
                existing.active = active;
            }
            None => points.push(point),
        }
    }

    points.sort_unstable_by(|a, b| {
        b.active
            .cmp(&a.active)
            .then_with(|| b.strength.cmp(&a.strength))
            .then_with(|| a.ssid.cmp(&b.ssid))
    });
    points
}

/// Build details from the radio state and the scan table
pub fn parse_wifi_details(enabled: bool, scan_output: &str) -> WifiDetails {
    if !enabled {
        return WifiDetails::default();
    }

    let active = scan_output
        .lines()
        .filter_map(parse_scan_row)
        .find(|row| row.active && !row.ssid.is_empty());

    let mut details = match active {
        Some(row) => WifiDetails {
            enabled: true,
            connected: true,
            ssid: Some(row.ssid),
            strength: Some(row.strength),
            frequency: Some(row.frequency).filter(|f| *f > 0),
            bitrate: row.bitrate,
            icon_name: OFFLINE_ICON,
        },
        None => WifiDetails {
            enabled: true,
            ..Default::default()
        },
    };
    details.icon_name = wifi_icon_name(details.enabled, details.connected, details.strength);
    details
}

fn parse_enabled(output: &str) -> bool {
    output.trim() == "enabled"
}

pub async fn wifi_enabled() -> Result<bool, NetworkError> {
    let out = utils::run("nmcli", &["-t", "-f", "WIFI", "radio"]).await?;
    Ok(parse_enabled(&out))
}

/// Airplane mode means every radio NetworkManager controls is off
pub async fn airplane_mode() -> Result<bool, NetworkError> {
    let out = utils::run("nmcli", &["-t", "-f", "WIFI,WWAN", "radio"]).await?;
    Ok(out
        .lines()
        .next()
        .map(|line| split_terse(line).iter().all(|f| f.trim() != "enabled"))
        .unwrap_or(false))
}

pub async fn set_airplane_mode(enabled: bool) -> Result<(), NetworkError> {
    let state = if enabled { "off" } else { "on" };
    utils::run("nmcli", &["radio", "all", state]).await?;
    Ok(())
}

pub async fn set_wifi_enabled(enabled: bool) -> Result<(), NetworkError> {
    let state = if enabled { "on" } else { "off" };
    utils::run("nmcli", &["radio", "wifi", state]).await?;
    Ok(())
}

async fn scan_table(rescan: bool) -> Result<String, NetworkError> {
    let rescan = if rescan { "yes" } else { "no" };
    Ok(utils::run(
        "nmcli",
        &["-t", "-f", AP_FIELDS, "device", "wifi", "list", "--rescan", rescan],
    )
    .await?)
}

pub async fn wifi_details() -> Result<WifiDetails, NetworkError> {
    if !wifi_enabled().await? {
        return Ok(WifiDetails::default());
    }
    let table = scan_table(false).await?;
    Ok(parse_wifi_details(true, &table))
}

pub async fn access_points(rescan: bool) -> Result<Vec<AccessPoint>, NetworkError> {
    let table = scan_table(rescan).await?;
    Ok(parse_access_points(&table))
}

/// Name of the first wifi interface from `nmcli -t -f DEVICE,TYPE device`
fn parse_wifi_device(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let fields = split_terse(line);
        match fields.as_slice() {
            [device, kind, ..] if kind == "wifi" => Some(device.clone()),
            _ => None,
        }
    })
}

pub async fn connect(ssid: &str, password: Option<&str>) -> Result<(), NetworkError> {
    let mut args = vec!["device", "wifi", "connect", ssid];
    if let Some(password) = password.filter(|p| !p.is_empty()) {
        args.extend(["password", password]);
    }

    match utils::run("nmcli", &args).await {
        Ok(_) => Ok(()),
        Err(CommandError::Failed { stderr, .. }) => Err(NetworkError::ConnectFailed {
            ssid: ssid.to_string(),
            reason: stderr,
        }),
        Err(e) => Err(e.into()),
    }
}

pub async fn disconnect() -> Result<(), NetworkError> {
    let out = utils::run("nmcli", &["-t", "-f", "DEVICE,TYPE", "device"]).await?;
    let device = parse_wifi_device(&out).ok_or(NetworkError::NoDevice)?;
    utils::run("nmcli", &["device", "disconnect", &device]).await?;
    Ok(())
}

/// Delete the saved connection profile for an SSID
pub async fn forget(ssid: &str) -> Result<(), NetworkError> {
    utils::run("nmcli", &["connection", "delete", "id", ssid]).await?;
    Ok(())
}

/// Periodic rescans run only while a consumer has asked for them
#[derive(Debug, Default)]
struct ScanSchedule {
    active: bool,
}

impl ScanSchedule {
    /// Returns true when the change should trigger an immediate rescan
    fn set_active(&mut self, active: bool) -> bool {
        let started = active && !self.active;
        self.active = active;
        started
    }

    fn is_due(&self) -> bool {
        self.active
    }
}

/// Polls NetworkManager and applies wifi commands
pub struct NetworkService {
    config: NetworkConfig,
    event_tx: Sender<ShellEvent>,
    command_rx: mpsc::Receiver<ShellCommand>,
    scans: ScanSchedule,
}

impl NetworkService {
    pub fn new(
        config: NetworkConfig,
        event_tx: Sender<ShellEvent>,
        command_rx: mpsc::Receiver<ShellCommand>,
    ) -> Self {
        Self {
            config,
            event_tx,
            command_rx,
            scans: ScanSchedule::default(),
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting network service");

        let mut refresh =
            tokio::time::interval(Duration::from_secs(self.config.refresh_interval_secs.max(1)));
        let mut scan =
            tokio::time::interval(Duration::from_secs(self.config.scan_interval_secs.max(1)));
        refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        scan.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = refresh.tick() => self.refresh().await,
                _ = scan.tick() => {
                    if self.scans.is_due() {
                        self.scan(true).await;
                    }
                }
                cmd = self.command_rx.recv() => match cmd {
                    Some(ShellCommand::SetNetworkScanning(active)) => {
                        debug!("Periodic wifi scans {}", if active { "on" } else { "off" });
                        if self.scans.set_active(active) {
                            self.scan(true).await;
                            scan.reset();
                        }
                    }
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
            }
        }

        Ok(())
    }

    async fn handle_command(&self, cmd: ShellCommand) {
        let result = match cmd {
            ShellCommand::RefreshNetwork => {
                self.refresh().await;
                return;
            }
            ShellCommand::ScanNetworks => {
                self.scan(true).await;
                return;
            }
            ShellCommand::SetWifiEnabled(enabled) => {
                info!("Setting wifi {}", if enabled { "on" } else { "off" });
                set_wifi_enabled(enabled).await
            }
            ShellCommand::SetAirplaneMode(enabled) => {
                info!("Setting airplane mode {}", enabled);
                set_airplane_mode(enabled).await
            }
            ShellCommand::ConnectNetwork { ssid, password } => {
                info!("Connecting to {}", ssid);
                connect(&ssid, password.as_deref()).await
            }
            ShellCommand::DisconnectNetwork => disconnect().await,
            ShellCommand::ForgetNetwork(ssid) => {
                info!("Forgetting {}", ssid);
                forget(&ssid).await
            }
            _ => return,
        };

        if let Err(e) = result {
            warn!("Network command failed: {}", e);
            let _ = self.event_tx.send(ShellEvent::NetworkError(e.to_string())).await;
        }

        self.refresh().await;
        self.scan(false).await;
    }

    async fn refresh(&self) {
        let details = match wifi_details().await {
            Ok(details) => details,
            Err(e) => {
                debug!("Failed to read wifi state: {}", e);
                WifiDetails::default()
            }
        };
        let _ = self.event_tx.send(ShellEvent::NetworkUpdated(details)).await;

        match airplane_mode().await {
            Ok(on) => {
                let _ = self.event_tx.send(ShellEvent::AirplaneModeUpdated(on)).await;
            }
            Err(e) => debug!("Failed to read radio state: {}", e),
        }
    }

    async fn scan(&self, rescan: bool) {
        match access_points(rescan).await {
            Ok(points) => {
                let _ = self
                    .event_tx
                    .send(ShellEvent::AccessPointsUpdated(points))
                    .await;
            }
            Err(e) => debug!("Wifi scan failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN: &str = "\
*:Home\\:Net:78:5180 MHz:540 Mbit/s:WPA2
 :Cafe:45:2437 MHz:130 Mbit/s:
 ::90:2412 MHz:54 Mbit/s:WPA2
 :Cafe:62:5200 MHz:270 Mbit/s:
 :Attic:62:2462 MHz:65 Mbit/s:WPA1 WPA2
";

    #[test]
    fn terse_escapes_are_honoured() {
        assert_eq!(split_terse("a\\:b:c"), vec!["a:b", "c"]);
        assert_eq!(split_terse("x\\\\:"), vec!["x\\", ""]);
    }

    #[test]
    fn access_points_are_deduplicated_and_sorted() {
        let points = parse_access_points(SCAN);
        let names: Vec<_> = points.iter().map(|p| p.ssid.as_str()).collect();
        assert_eq!(names, vec!["Home:Net", "Attic", "Cafe"]);

        let cafe = &points[2];
        assert_eq!(cafe.strength, 62);
        assert_eq!(cafe.frequency, 5200);
        assert!(!cafe.secured);
        assert!(points[0].active && points[0].secured);
    }

    #[test]
    fn details_follow_the_active_row() {
        let details = parse_wifi_details(true, SCAN);
        assert!(details.connected);
        assert_eq!(details.ssid.as_deref(), Some("Home:Net"));
        assert_eq!(details.bitrate, Some(540));
        assert_eq!(details.icon_name, "network-wireless-signal-good-symbolic");
        assert_eq!(details.label(), "Home:Net (5 GHz)");

        let offline = parse_wifi_details(true, " :Cafe:45:2437 MHz:130 Mbit/s:\n");
        assert!(!offline.connected);
        assert_eq!(offline.icon_name, OFFLINE_ICON);

        assert_eq!(parse_wifi_details(false, SCAN).icon_name, DISABLED_ICON);
    }

    #[test]
    fn signal_thresholds() {
        assert_eq!(signal_icon_name(80), "network-wireless-signal-excellent-symbolic");
        assert_eq!(signal_icon_name(40), "network-wireless-signal-ok-symbolic");
        assert_eq!(signal_icon_name(19), "network-wireless-signal-none-symbolic");
    }

    #[test]
    fn wifi_device_is_found() {
        let out = "lo:loopback\nenp3s0:ethernet\nwlan0:wifi\np2p-dev-wlan0:wifi-p2p\n";
        assert_eq!(parse_wifi_device(out).as_deref(), Some("wlan0"));
        assert_eq!(parse_wifi_device("lo:loopback\n"), None);
    }

    #[test]
    fn periodic_scans_wait_for_a_request() {
        let mut scans = ScanSchedule::default();
        assert!(!scans.is_due());

        assert!(scans.set_active(true));
        assert!(scans.is_due());
        // Already scanning; no extra immediate rescan
        assert!(!scans.set_active(true));

        assert!(!scans.set_active(false));
        assert!(!scans.is_due());
    }
}
