//! Bar popovers. Each one is a component answering to its own id and is
//! attached to its bar button by the bar.

mod app_menu;
mod audio;
mod battery;
mod calendar;
mod display;
mod frame;
mod network;

pub use app_menu::AppMenuPopover;
pub use audio::AudioPopover;
pub use battery::BatteryPopover;
pub use calendar::CalendarPopover;
pub use display::DisplayPopover;
pub use network::NetworkPopover;
