pub mod audio;
pub mod battery;
mod config_watcher;
pub mod display;
mod hub;
pub mod media;
pub mod network;
pub mod niri;
pub mod notifications;
mod process;

pub use audio::AudioService;
pub use battery::BatteryService;
pub use config_watcher::ConfigWatcher;
pub use display::DisplayService;
pub use hub::ServiceHub;
pub use media::MediaService;
pub use network::NetworkService;
pub use niri::NiriService;
pub use notifications::NotificationService;
pub use process::ProcessService;
