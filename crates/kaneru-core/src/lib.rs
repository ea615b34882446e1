pub mod config;
pub mod messages;
pub mod services;
pub mod state;
pub mod theme;
pub mod utils;

pub use config::{
    AudioConfig, BatteryConfig, ConfigPaths, DisplayConfig, DockConfig, DockPosition,
    MediaConfig, ModuleType, NetworkConfig, NotificationConfig, NotificationPosition,
    ShellConfig,
};
pub use messages::{ComponentId, ShellCommand, ShellEvent, WindowInfo};
pub use services::ServiceHub;
pub use state::{AppInfo, AppResolver, DockDiff, DockItem, DockState, NotificationStack};
pub use theme::{load_css, stylesheet, Palette, Theme};
