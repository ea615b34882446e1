use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::messages::ShellCommand;
use crate::state::AppResolver;
use crate::utils;

/// Launches applications and runs session power actions
pub struct ProcessService {
    command_rx: mpsc::Receiver<ShellCommand>,
}

/// Ordered `(program, args)` attempts for a power action
fn power_methods(action: &str) -> [(&'static str, [&str; 1]); 2] {
    [("systemctl", [action]), ("loginctl", [action])]
}

impl ProcessService {
    pub fn new(command_rx: mpsc::Receiver<ShellCommand>) -> Self {
        Self { command_rx }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting process service");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                ShellCommand::LaunchApp(command) => {
                    // Desktop Exec lines may still carry field codes
                    let command = AppResolver::clean_exec(&command).join(" ");
                    debug!("Launching app: {}", command);
                    utils::spawn_detached(&command);
                }
                ShellCommand::Lock => Self::lock_screen().await,
                ShellCommand::Suspend => Self::power("suspend").await,
                ShellCommand::Reboot => Self::power("reboot").await,
                ShellCommand::Shutdown => Self::power("poweroff").await,
                _ => {}
            }
        }

        Ok(())
    }

    /// Ask logind first so an already-configured idle locker takes over
    async fn lock_screen() {
        info!("Locking screen");

        match utils::run_status("loginctl", &["lock-session"]).await {
            Ok(Some(0)) => return,
            Ok(code) => debug!("loginctl lock-session exited with {:?}", code),
            Err(e) => debug!("loginctl unavailable: {}", e),
        }

        if !utils::spawn_with_fallbacks(&["swaylock -f"]) {
            error!("No screen locker found");
        }
    }

    async fn power(action: &str) {
        info!("Requesting {}", action);

        for (program, args) in power_methods(action) {
            match utils::run_status(program, &args).await {
                Ok(Some(0)) => return,
                Ok(code) => warn!("{} {} exited with {:?}", program, action, code),
                Err(e) => debug!("{} unavailable: {}", program, e),
            }
        }

        error!("Failed to {}", action);
    }
}
