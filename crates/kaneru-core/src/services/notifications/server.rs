use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, warn};
use zbus::zvariant::OwnedValue;
use zbus::Connection;

use super::model::{CloseReason, Notification, NotificationHints};
use super::persistence::save_history;
use super::store::NotificationStore;
use crate::messages::ShellEvent;

pub const DBUS_NAME: &str = "org.freedesktop.Notifications";
pub const DBUS_PATH: &str = "/org/freedesktop/Notifications";
pub const DBUS_INTERFACE: &str = "org.freedesktop.Notifications";

const CAPABILITIES: [&str; 5] = ["body", "actions", "persistence", "icon-static", "body-markup"];

/// Server-assigned ids: a counter from 1 that never hands out 0
#[derive(Debug)]
pub(super) struct IdAllocator {
    next: AtomicU32,
}

impl IdAllocator {
    pub(super) fn new() -> Self {
        Self::starting_at(1)
    }

    fn starting_at(first: u32) -> Self {
        Self {
            next: AtomicU32::new(first),
        }
    }

    /// Keep a non-zero `replaces_id`, otherwise take the next counter value
    pub(super) fn assign(&self, replaces_id: u32) -> u32 {
        if replaces_id != 0 {
            return replaces_id;
        }
        loop {
            let id = self.next.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return id;
            }
        }
    }
}

/// State shared between the D-Bus object and the command loop
pub(super) struct NotificationState {
    store: Mutex<NotificationStore>,
    ids: IdAllocator,
    history_path: PathBuf,
    event_tx: Sender<ShellEvent>,
}

impl NotificationState {
    pub(super) fn new(
        store: NotificationStore,
        history_path: PathBuf,
        event_tx: Sender<ShellEvent>,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            ids: IdAllocator::new(),
            history_path,
            event_tx,
        }
    }

    pub(super) fn assign_id(&self, replaces_id: u32) -> u32 {
        self.ids.assign(replaces_id)
    }

    pub(super) async fn post(&self, notification: Notification) {
        let history = {
            let mut store = self.store.lock();
            store
                .insert(notification.clone())
                .then(|| store.history_snapshot())
        };

        let _ = self
            .event_tx
            .send(ShellEvent::NotificationPosted(notification))
            .await;

        if let Some(history) = history {
            self.publish_history(history).await;
        }
    }

    /// Drop an active notification and tell the shell. Unknown ids are ignored.
    pub(super) async fn retire(&self, id: u32, reason: CloseReason) -> bool {
        if self.store.lock().close(id).is_none() {
            return false;
        }

        let _ = self
            .event_tx
            .send(ShellEvent::NotificationClosed { id, reason })
            .await;
        true
    }

    /// Close an active notification, emitting the D-Bus signal and shell event
    pub(super) async fn close(&self, connection: &Connection, id: u32, reason: CloseReason) -> bool {
        if !self.retire(id, reason).await {
            return false;
        }

        if let Err(e) = emit_notification_closed(connection, id, reason).await {
            warn!("Failed to emit NotificationClosed for {}: {}", id, e);
        }
        true
    }

    pub(super) fn active_ids(&self) -> Vec<u32> {
        self.store.lock().active_ids()
    }

    pub(super) fn history_snapshot(&self) -> Vec<Notification> {
        self.store.lock().history_snapshot()
    }

    pub(super) async fn clear_history(&self) {
        self.store.lock().clear_history();
        self.publish_history(Vec::new()).await;
    }

    pub(super) async fn set_history_limit(&self, limit: usize) {
        let trimmed = {
            let mut store = self.store.lock();
            store
                .set_history_limit(limit)
                .then(|| store.history_snapshot())
        };
        if let Some(history) = trimmed {
            self.publish_history(history).await;
        }
    }

    async fn publish_history(&self, history: Vec<Notification>) {
        let path = self.history_path.clone();
        let snapshot = history.clone();
        match tokio::task::spawn_blocking(move || save_history(&path, &snapshot)).await {
            Ok(Ok(())) => debug!("Saved {} notifications", history.len()),
            Ok(Err(e)) => warn!("Failed to save notification history: {}", e),
            Err(e) => warn!("History writer panicked: {}", e),
        }

        let _ = self.event_tx.send(ShellEvent::HistoryChanged(history)).await;
    }
}

pub(super) async fn emit_notification_closed(
    connection: &Connection,
    id: u32,
    reason: CloseReason,
) -> zbus::Result<()> {
    connection
        .emit_signal(
            None::<()>,
            DBUS_PATH,
            DBUS_INTERFACE,
            "NotificationClosed",
            &(id, reason.code()),
        )
        .await
}

pub(super) async fn emit_action_invoked(
    connection: &Connection,
    id: u32,
    key: &str,
) -> zbus::Result<()> {
    connection
        .emit_signal(None::<()>, DBUS_PATH, DBUS_INTERFACE, "ActionInvoked", &(id, key))
        .await
}

/// D-Bus object served at `/org/freedesktop/Notifications`
pub struct NotificationServer {
    state: Arc<NotificationState>,
}

impl NotificationServer {
    pub(super) fn new(state: Arc<NotificationState>) -> Self {
        Self { state }
    }
}

#[zbus::interface(name = "org.freedesktop.Notifications")]
impl NotificationServer {
    #[allow(clippy::too_many_arguments)]
    async fn notify(
        &self,
        app_name: String,
        replaces_id: u32,
        app_icon: String,
        summary: String,
        body: String,
        actions: Vec<String>,
        hints: HashMap<String, OwnedValue>,
        expire_timeout: i32,
    ) -> u32 {
        let id = self.state.assign_id(replaces_id);

        let hints = NotificationHints::parse(hints.iter().map(|(k, v)| (k.as_str(), &**v)));
        debug!("Notify #{} from {}: {}", id, app_name, summary);

        let notification = Notification::new(
            id,
            app_name,
            replaces_id,
            app_icon,
            summary,
            body,
            actions,
            expire_timeout,
            hints,
        );
        self.state.post(notification).await;
        id
    }

    async fn close_notification(&self, id: u32, #[zbus(connection)] connection: &Connection) {
        self.state.close(connection, id, CloseReason::Closed).await;
    }

    async fn get_capabilities(&self) -> Vec<String> {
        CAPABILITIES.iter().map(|c| c.to_string()).collect()
    }

    async fn get_server_information(&self) -> (String, String, String, String) {
        (
            "kaneru".to_string(),
            "Kaneru Project".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
            "1.2".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: u32) -> Notification {
        Notification::new(
            id,
            "mail".into(),
            0,
            String::new(),
            "New message".into(),
            String::new(),
            Vec::new(),
            -1,
            NotificationHints::default(),
        )
    }

    #[test]
    fn ids_count_up_from_one() {
        let ids = IdAllocator::new();
        assert_eq!(ids.assign(0), 1);
        assert_eq!(ids.assign(0), 2);
    }

    #[test]
    fn replaces_id_is_kept() {
        let ids = IdAllocator::new();
        assert_eq!(ids.assign(42), 42);
        // The counter is untouched by replacements
        assert_eq!(ids.assign(0), 1);
    }

    #[test]
    fn counter_skips_zero_when_it_wraps() {
        let ids = IdAllocator::starting_at(u32::MAX);
        assert_eq!(ids.assign(0), u32::MAX);
        assert_eq!(ids.assign(0), 1);
    }

    #[tokio::test]
    async fn closing_unknown_id_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let (event_tx, event_rx) = async_channel::unbounded();
        let state = NotificationState::new(
            NotificationStore::new(10),
            dir.path().join("notifications.json"),
            event_tx,
        );

        state.post(notification(3)).await;
        while event_rx.try_recv().is_ok() {}

        assert!(!state.retire(99, CloseReason::Closed).await);
        assert!(event_rx.is_empty());

        assert!(state.retire(3, CloseReason::Closed).await);
        assert!(matches!(
            event_rx.try_recv(),
            Ok(ShellEvent::NotificationClosed {
                id: 3,
                reason: CloseReason::Closed
            })
        ));

        // Already closed
        assert!(!state.retire(3, CloseReason::Closed).await);
        assert!(event_rx.is_empty());
    }
}
