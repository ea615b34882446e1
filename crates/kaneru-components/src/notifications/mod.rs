//! Notification popups.

mod popup;
mod widget;

pub use widget::NotificationComponent;
