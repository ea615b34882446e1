mod app_resolver;
mod dock;
mod notifications;
mod pomodoro;

pub use app_resolver::{parse_desktop_entry, AppInfo, AppResolver};
pub use dock::{DockDiff, DockItem, DockState};
pub use notifications::{expire_after, NotificationStack, PushOutcome};
pub use pomodoro::PomodoroTimer;
