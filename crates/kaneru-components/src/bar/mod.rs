//! Top bar and its inline modules.

mod active_client;
mod clock;
mod widget;

pub use widget::BarComponent;
