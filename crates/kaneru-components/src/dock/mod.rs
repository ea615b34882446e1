//! Application dock.

mod item;
mod widget;

pub use widget::DockComponent;
