use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use super::sections::{
    AudioConfig, BatteryConfig, DisplayConfig, DockConfig, MediaConfig, NetworkConfig,
    NotificationConfig,
};

/// Bar modules that can be placed in a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleType {
    AppMenu,
    ActiveClient,
    Clock,
    Battery,
    Network,
    Display,
    Audio,
    Media,
}

/// Shell configuration (config.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub font: Option<String>,
    pub clock_format: String,
    pub modules_left: Vec<ModuleType>,
    pub modules_center: Vec<ModuleType>,
    pub modules_right: Vec<ModuleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distro_icon_override: Option<String>,
    pub active_client_max_length: usize,
    pub notification: NotificationConfig,
    pub battery: BatteryConfig,
    pub network: NetworkConfig,
    pub display: DisplayConfig,
    pub audio: AudioConfig,
    pub media: MediaConfig,
    pub dock: DockConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            font: Some("Sans 10".to_string()),
            clock_format: "%A %e, %H:%M".to_string(),
            modules_left: vec![ModuleType::AppMenu, ModuleType::ActiveClient],
            modules_center: vec![ModuleType::Clock],
            modules_right: vec![
                ModuleType::Media,
                ModuleType::Audio,
                ModuleType::Display,
                ModuleType::Network,
                ModuleType::Battery,
            ],
            distro_icon_override: None,
            active_client_max_length: 50,
            notification: NotificationConfig::default(),
            battery: BatteryConfig::default(),
            network: NetworkConfig::default(),
            display: DisplayConfig::default(),
            audio: AudioConfig::default(),
            media: MediaConfig::default(),
            dock: DockConfig::default(),
        }
    }
}

impl ShellConfig {
    /// Load config, writing the default file first if none exists.
    ///
    /// Parse failures fall back to defaults so a broken file never keeps the
    /// shell from starting.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("Config file not found at {:?}, writing defaults", path);
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                warn!("Failed to write default config: {:#}", e);
            }
            return config;
        }

        match Self::read(path) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load config {:?}: {:#}. Using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Strict read used by the config watcher
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(path)?;
        let config = serde_json::from_slice(&data)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let dir = path.parent().ok_or_else(|| anyhow::anyhow!("Invalid path"))?;
        std::fs::create_dir_all(dir)?;
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// All modules across the three bar sections
    pub fn modules(&self) -> impl Iterator<Item = &ModuleType> {
        self.modules_left
            .iter()
            .chain(self.modules_center.iter())
            .chain(self.modules_right.iter())
    }

    pub fn has_module(&self, module: ModuleType) -> bool {
        self.modules().any(|m| *m == module)
    }

    /// Clock refresh interval: every second when the format shows seconds
    pub fn clock_interval_secs(&self) -> u64 {
        if self.clock_format.contains("%S") || self.clock_format.contains("%T") {
            1
        } else {
            30
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotificationPosition;

    #[test]
    fn partial_file_fills_defaults() {
        let json = r#"{ "modules_right": ["battery", "active-client"], "notification": { "position": "bottom-left" } }"#;
        let config: ShellConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.modules_right,
            vec![ModuleType::Battery, ModuleType::ActiveClient]
        );
        assert_eq!(config.notification.position, NotificationPosition::BottomLeft);
        assert_eq!(config.notification.default_timeout_ms, 5_000);
        assert_eq!(config.clock_format, "%A %e, %H:%M");
        assert_eq!(config.dock.hide_delay_ms, 500);
    }

    #[test]
    fn unknown_module_is_rejected() {
        let json = r#"{ "modules_left": ["weather"] }"#;
        assert!(serde_json::from_str::<ShellConfig>(json).is_err());
    }

    #[test]
    fn clock_interval_follows_format() {
        let mut config = ShellConfig::default();
        assert_eq!(config.clock_interval_secs(), 30);
        config.clock_format = "%H:%M:%S".to_string();
        assert_eq!(config.clock_interval_secs(), 1);
    }

    #[test]
    fn has_module_checks_every_section() {
        let config = ShellConfig::default();
        assert!(config.has_module(ModuleType::AppMenu));
        assert!(config.has_module(ModuleType::Clock));
        assert!(config.has_module(ModuleType::Battery));
    }
}
