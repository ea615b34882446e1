use serde::{Deserialize, Serialize};

/// Screen corner where notification popups stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl NotificationPosition {
    pub fn is_top(&self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub position: NotificationPosition,
    pub default_timeout_ms: u64,
    pub critical_timeout_ms: u64,
    pub max_visible: usize,
    pub history_limit: usize,
    pub margin_top: i32,
    pub spacing: i32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            position: NotificationPosition::TopRight,
            default_timeout_ms: 5_000,
            critical_timeout_ms: 10_000,
            max_visible: 5,
            history_limit: 100,
            margin_top: 20,
            spacing: 10,
        }
    }
}

/// Screen edge the dock attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockPosition {
    #[default]
    Bottom,
    Left,
    Right,
}

impl DockPosition {
    pub fn is_vertical(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    pub enabled: bool,
    pub position: DockPosition,
    pub auto_hide: bool,
    pub hide_delay_ms: u64,
    pub favorites: Vec<String>,
    pub icon_size: i32,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: DockPosition::Bottom,
            auto_hide: true,
            hide_delay_ms: 500,
            favorites: vec![
                "firefox".to_string(),
                "foot".to_string(),
                "nautilus".to_string(),
            ],
            icon_size: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub conservation_mode_path: String,
    pub settings_command: Option<String>,
    pub refresh_interval_secs: u64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            conservation_mode_path:
                "/sys/devices/pci0000:00/0000:00:14.3/PNP0C09:00/VPC2004:00/conservation_mode"
                    .to_string(),
            settings_command: Some("gnome-control-center power".to_string()),
            refresh_interval_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub settings_command: Option<String>,
    pub scan_interval_secs: u64,
    pub refresh_interval_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            settings_command: Some("nm-connection-editor".to_string()),
            scan_interval_secs: 15,
            refresh_interval_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub min_temperature: u32,
    pub max_temperature: u32,
    pub default_temperature: u32,
    pub brightness_step: u8,
    pub settings_command: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            min_temperature: 2500,
            max_temperature: 6500,
            default_temperature: 3500,
            brightness_step: 5,
            settings_command: Some("gnome-control-center display".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub volume_step: u8,
    pub max_volume: u8,
    pub refresh_interval_secs: u64,
    pub settings_command: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume_step: 5,
            max_volume: 100,
            refresh_interval_secs: 2,
            settings_command: Some("pavucontrol".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub refresh_interval_ms: u64,
    pub preferred_player: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1_000,
            preferred_player: None,
        }
    }
}
