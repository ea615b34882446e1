use compact_str::CompactString;

use super::ComponentId;
use crate::config::ShellConfig;
use crate::services::audio::AudioState;
use crate::services::battery::{BatteryDetails, PowerProfile};
use crate::services::display::DisplayState;
use crate::services::media::MediaSnapshot;
use crate::services::network::{AccessPoint, WifiDetails};
use crate::services::notifications::{CloseReason, Notification};

/// Compositor window as seen by the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: u64,
    pub app_id: Option<CompactString>,
    pub title: Option<CompactString>,
    pub workspace_id: Option<u64>,
    pub is_focused: bool,
}

impl From<niri_ipc::Window> for WindowInfo {
    fn from(window: niri_ipc::Window) -> Self {
        Self {
            id: window.id,
            app_id: window.app_id.map(CompactString::from),
            title: window.title.map(CompactString::from),
            workspace_id: window.workspace_id,
            is_focused: window.is_focused,
        }
    }
}

/// Events FROM async services TO GTK (updates UI)
#[derive(Debug, Clone)]
pub enum ShellEvent {
    // =========== Compositor Window Events ===========

    /// Full window list (sent on connect and whenever niri resyncs)
    WindowsSynced(Vec<WindowInfo>),

    /// A window was opened or one of its properties changed
    WindowOpenedOrChanged(WindowInfo),

    WindowClosed {
        id: u64,
    },

    /// Keyboard focus moved (None when nothing is focused)
    WindowFocused {
        id: Option<u64>,
    },

    // =========== Connection Events ===========

    CompositorConnected,
    CompositorDisconnected,

    // =========== Configuration Events ===========

    ConfigReloaded(Box<ShellConfig>),

    // =========== Notification Events ===========

    /// New or replacing notification arrived over D-Bus
    NotificationPosted(Notification),

    NotificationClosed {
        id: u32,
        reason: CloseReason,
    },

    /// History list changed (newest first)
    HistoryChanged(Vec<Notification>),

    // =========== Battery Events ===========

    /// None when the machine has no battery
    BatteryUpdated(Option<BatteryDetails>),

    PowerProfilesUpdated {
        active: Option<PowerProfile>,
        available: Vec<PowerProfile>,
    },

    /// None when the sysfs knob is absent or unreadable
    ConservationModeUpdated(Option<bool>),

    // =========== Network Events ===========

    NetworkUpdated(WifiDetails),
    AccessPointsUpdated(Vec<AccessPoint>),
    AirplaneModeUpdated(bool),

    /// Network operation error
    NetworkError(String),

    // =========== Display / Audio / Media ===========

    DisplayUpdated(DisplayState),
    AudioUpdated(AudioState),

    /// None when no MPRIS player is running
    MediaUpdated(Option<MediaSnapshot>),

    // =========== Component Visibility Events ===========

    ShowComponent(ComponentId),
    HideComponent(ComponentId),
    ToggleComponent(ComponentId),
}
