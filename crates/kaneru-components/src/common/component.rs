use gtk4::Application;
use parking_lot::RwLock;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

use kaneru_core::{ComponentId, ConfigPaths, ShellCommand, ShellConfig, ShellEvent};

use super::visibility::Visibility;

/// Context provided to all components
#[derive(Clone)]
pub struct ComponentContext {
    /// GTK application reference
    pub app: Application,
    /// Command sender for this component
    pub command_tx: mpsc::Sender<ShellCommand>,
    /// Shared configuration, replaced on reload
    pub config: Arc<RwLock<ShellConfig>>,
    pub paths: ConfigPaths,
    /// Visibility registry read by the IPC `status` command
    pub visibility: Visibility,
}

impl ComponentContext {
    pub fn new(
        app: &Application,
        command_tx: mpsc::Sender<ShellCommand>,
        config: Arc<RwLock<ShellConfig>>,
        paths: ConfigPaths,
        visibility: Visibility,
    ) -> Self {
        Self {
            app: app.clone(),
            command_tx,
            config,
            paths,
            visibility,
        }
    }

    /// Send a command without blocking the GTK thread
    pub fn send_command(&self, cmd: ShellCommand) {
        send_command(&self.command_tx, cmd);
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> ShellConfig {
        self.config.read().clone()
    }
}

/// Queue a command for the service hub; drops it if the queue is full
pub fn send_command(tx: &mpsc::Sender<ShellCommand>, cmd: ShellCommand) {
    if let Err(e) = tx.try_send(cmd) {
        warn!("Dropping command: {}", e);
    }
}

/// Trait that all shell components must implement
/// Note: Components are not Send since they contain GTK widgets that must be used on the main thread
pub trait Component {
    fn id(&self) -> ComponentId;

    /// Build widgets; called once before the component is shared
    fn init(&mut self, ctx: ComponentContext);

    fn show(&self);

    fn hide(&self);

    fn is_visible(&self) -> bool;

    fn toggle(&self) {
        if self.is_visible() {
            self.hide();
        } else {
            self.show();
        }
    }

    /// Handle an event from the dispatch loop
    fn handle_event(&self, event: &ShellEvent);

    /// Cleanup before shutdown
    fn shutdown(&self) {}

    fn is_always_visible(&self) -> bool {
        self.id().is_always_visible()
    }

    /// Components created by this one that answer to their own id (bar popovers)
    fn children(&self) -> Vec<SharedComponent> {
        Vec::new()
    }
}

/// Shared component handle used by the dispatch loop
pub type SharedComponent = Rc<dyn Component>;
