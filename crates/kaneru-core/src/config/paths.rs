use std::path::PathBuf;

const APP_DIR: &str = "kaneru";

/// Filesystem locations used by the shell
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    pub user_css: PathBuf,
    pub cache_dir: PathBuf,
    pub notification_history: PathBuf,
    pub ipc_socket: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR);
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join(APP_DIR);

        Self {
            config_file: config_dir.join("config.json"),
            user_css: config_dir.join("style.css"),
            notification_history: cache_dir.join("notifications.json"),
            cache_dir,
            ipc_socket: Self::socket_path(),
        }
    }

    /// Paths rooted at arbitrary directories (used by tests and `--config-dir`)
    pub fn with_dirs(config_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let cache_dir = cache_dir.into();

        Self {
            config_file: config_dir.join("config.json"),
            user_css: config_dir.join("style.css"),
            notification_history: cache_dir.join("notifications.json"),
            cache_dir,
            ipc_socket: Self::socket_path(),
        }
    }

    /// IPC socket in `$XDG_RUNTIME_DIR`, or `/tmp` when unset
    pub fn socket_path() -> PathBuf {
        let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(runtime_dir).join("kaneru.sock")
    }

    /// Directory holding `config.json`
    pub fn config_dir(&self) -> PathBuf {
        self.config_file
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new()
    }
}
