mod component;
mod layer_window;
mod visibility;
mod widgets;

pub use component::{send_command, Component, ComponentContext, SharedComponent};
pub use layer_window::{ExclusiveZone, LayerConfig, LayerMargins, LayerWindow};
pub use visibility::Visibility;
pub use widgets::{clear_children, set_class, Debouncer};
