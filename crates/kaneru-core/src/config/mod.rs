mod paths;
mod shell;
mod sections;

pub use paths::ConfigPaths;
pub use sections::{
    AudioConfig, BatteryConfig, DisplayConfig, DockConfig, DockPosition, MediaConfig,
    NetworkConfig, NotificationConfig, NotificationPosition,
};
pub use shell::{ModuleType, ShellConfig};
