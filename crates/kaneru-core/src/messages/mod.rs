mod commands;
mod events;

pub use commands::{ComponentId, ShellCommand};
pub use events::{ShellEvent, WindowInfo};
