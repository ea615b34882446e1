//! `org.freedesktop.Notifications` server and notification history.

mod model;
mod persistence;
mod server;
mod service;
mod store;

pub use model::{CloseReason, Notification, NotificationHints, Urgency};
pub use persistence::{load_history, save_history, PersistenceError};
pub use server::{NotificationServer, DBUS_INTERFACE, DBUS_NAME, DBUS_PATH};
pub use service::NotificationService;
pub use store::NotificationStore;
