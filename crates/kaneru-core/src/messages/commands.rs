use compact_str::CompactString;

use crate::services::audio::AudioTarget;
use crate::services::battery::PowerProfile;
use crate::services::notifications::CloseReason;

/// Component identifiers for visibility control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Bar,
    Dock,
    Notifications,
    AppMenu,
    Battery,
    Network,
    Display,
    Audio,
    Media,
    Calendar,
}

impl ComponentId {
    pub const ALL: [ComponentId; 10] = [
        Self::Bar,
        Self::Dock,
        Self::Notifications,
        Self::AppMenu,
        Self::Battery,
        Self::Network,
        Self::Display,
        Self::Audio,
        Self::Media,
        Self::Calendar,
    ];

    /// Parse from string (for IPC commands)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bar" | "panel" => Some(Self::Bar),
            "dock" => Some(Self::Dock),
            "notifications" | "notification" => Some(Self::Notifications),
            "menu" | "app-menu" | "appmenu" => Some(Self::AppMenu),
            "battery" | "power" => Some(Self::Battery),
            "network" | "wifi" => Some(Self::Network),
            "display" | "brightness" => Some(Self::Display),
            "audio" | "volume" => Some(Self::Audio),
            "media" | "player" => Some(Self::Media),
            "calendar" | "date" | "clock" => Some(Self::Calendar),
            _ => None,
        }
    }

    /// Canonical IPC name
    pub fn as_name(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Dock => "dock",
            Self::Notifications => "notifications",
            Self::AppMenu => "menu",
            Self::Battery => "battery",
            Self::Network => "network",
            Self::Display => "display",
            Self::Audio => "audio",
            Self::Media => "media",
            Self::Calendar => "calendar",
        }
    }

    /// Check if component is always visible (no toggle)
    pub fn is_always_visible(&self) -> bool {
        matches!(self, Self::Bar | Self::Notifications)
    }
}

/// Commands FROM GTK TO async services
#[derive(Debug, Clone)]
pub enum ShellCommand {
    // =========== Compositor Commands ===========

    /// Focus a window by niri id
    FocusWindow(u64),

    /// Close a window by niri id
    CloseWindow(u64),

    /// Quit the compositor session
    Quit,

    // =========== Process Commands ===========

    /// Launch an application
    LaunchApp(CompactString),

    Lock,
    Suspend,
    Reboot,
    Shutdown,

    // =========== Notification Commands ===========

    /// Close a notification and emit `NotificationClosed`
    CloseNotification { id: u32, reason: CloseReason },

    /// Emit `ActionInvoked`, then close as dismissed
    InvokeAction { id: u32, key: String },

    /// Dismiss every visible notification
    DismissAllNotifications,

    /// Drop the persisted history
    ClearHistory,

    /// Apply a reloaded `history_limit`
    SetHistoryLimit(usize),

    // =========== Battery Commands ===========

    RefreshBattery,
    SetPowerProfile(PowerProfile),
    SetConservationMode(bool),

    // =========== Network Commands ===========

    RefreshNetwork,
    ScanNetworks,

    /// Start or stop periodic rescans (the access point list is on screen)
    SetNetworkScanning(bool),
    SetWifiEnabled(bool),
    SetAirplaneMode(bool),
    ConnectNetwork {
        ssid: String,
        password: Option<String>,
    },
    DisconnectNetwork,
    ForgetNetwork(String),

    // =========== Display Commands ===========

    RefreshDisplay,

    /// Brightness in percent (0-100)
    SetBrightness(u8),

    SetNightLight { enabled: bool, temperature: u32 },
    SetDarkMode(bool),

    // =========== Audio Commands ===========

    RefreshAudio,
    SetVolume { target: AudioTarget, percent: u8 },
    SetMuted { target: AudioTarget, muted: bool },

    /// Make a wpctl node the default sink or source
    SetDefaultDevice(u32),

    // =========== Media Commands ===========

    RefreshMedia,
    MediaPlayPause,
    MediaNext,
    MediaPrevious,

    /// Seek to an absolute position in seconds
    MediaSeek(f64),

    // =========== Component Commands ===========

    ShowComponent(ComponentId),
    HideComponent(ComponentId),
    ToggleComponent(ComponentId),

    /// Reload configuration from disk
    ReloadConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_component() {
        for id in ComponentId::ALL {
            assert_eq!(ComponentId::from_name(id.as_name()), Some(id));
        }
    }

    #[test]
    fn aliases_are_case_insensitive() {
        assert_eq!(ComponentId::from_name("WiFi"), Some(ComponentId::Network));
        assert_eq!(ComponentId::from_name("Volume"), Some(ComponentId::Audio));
        assert_eq!(ComponentId::from_name("launcher"), None);
    }
}
