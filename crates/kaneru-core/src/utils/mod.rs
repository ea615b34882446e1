mod command;
mod distro;
mod spawn;
mod text;

pub use command::{run, run_status, CommandError};
pub use distro::{distro_icon_name, parse_os_release};
pub use spawn::{spawn_detached, spawn_with_fallbacks};
pub use text::truncate_chars;
