use std::path::PathBuf;
use std::sync::Arc;

use async_channel::Sender;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use zbus::Connection;

use super::model::CloseReason;
use super::persistence::load_history;
use super::server::{emit_action_invoked, NotificationServer, NotificationState, DBUS_NAME, DBUS_PATH};
use super::store::NotificationStore;
use crate::config::NotificationConfig;
use crate::messages::{ShellCommand, ShellEvent};

/// Owns the session-bus connection and applies notification commands
pub struct NotificationService {
    state: Arc<NotificationState>,
    event_tx: Sender<ShellEvent>,
    command_rx: mpsc::Receiver<ShellCommand>,
}

impl NotificationService {
    pub fn new(
        config: &NotificationConfig,
        history_path: PathBuf,
        event_tx: Sender<ShellEvent>,
        command_rx: mpsc::Receiver<ShellCommand>,
    ) -> Self {
        let history = load_history(&history_path).unwrap_or_else(|e| {
            warn!("Ignoring unreadable notification history {:?}: {}", history_path, e);
            Vec::new()
        });
        let store = NotificationStore::with_history(config.history_limit, history);
        let state = Arc::new(NotificationState::new(store, history_path, event_tx.clone()));

        Self {
            state,
            event_tx,
            command_rx,
        }
    }

    /// Claim the bus name and serve until the command channel closes
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting notification service");

        let connection = zbus::connection::Builder::session()?
            .serve_at(DBUS_PATH, NotificationServer::new(self.state.clone()))?
            .name(DBUS_NAME)?
            .build()
            .await?;

        info!("Serving {} on the session bus", DBUS_NAME);

        let _ = self
            .event_tx
            .send(ShellEvent::HistoryChanged(self.state.history_snapshot()))
            .await;

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(&connection, cmd).await;
        }

        Ok(())
    }

    async fn handle_command(&self, connection: &Connection, cmd: ShellCommand) {
        match cmd {
            ShellCommand::CloseNotification { id, reason } => {
                if !self.state.close(connection, id, reason).await {
                    debug!("Notification {} already closed", id);
                }
            }

            ShellCommand::InvokeAction { id, key } => {
                debug!("Invoking action '{}' on notification {}", key, id);
                if let Err(e) = emit_action_invoked(connection, id, &key).await {
                    warn!("Failed to emit ActionInvoked for {}: {}", id, e);
                }
                self.state.close(connection, id, CloseReason::Dismissed).await;
            }

            ShellCommand::DismissAllNotifications => {
                for id in self.state.active_ids() {
                    self.state.close(connection, id, CloseReason::Dismissed).await;
                }
            }

            ShellCommand::ClearHistory => {
                self.state.clear_history().await;
            }

            ShellCommand::SetHistoryLimit(limit) => {
                debug!("Notification history limit set to {}", limit);
                self.state.set_history_limit(limit).await;
            }

            _ => {}
        }
    }
}
