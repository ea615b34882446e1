pub mod bar;
pub mod common;
pub mod dock;
pub mod media;
pub mod notifications;
pub mod popovers;

pub use bar::BarComponent;
pub use common::{
    Component, ComponentContext, LayerConfig, LayerWindow, SharedComponent, Visibility,
};
pub use dock::DockComponent;
pub use media::MediaWindow;
pub use notifications::NotificationComponent;
pub use popovers::{
    AppMenuPopover, AudioPopover, BatteryPopover, CalendarPopover, DisplayPopover,
    NetworkPopover,
};
