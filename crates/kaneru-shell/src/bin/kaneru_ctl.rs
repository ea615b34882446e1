use std::io::{Read, Write};
use std::os::unix::net::UnixStream;

use clap::{Parser, Subcommand};

use kaneru_core::ConfigPaths;

#[derive(Parser)]
#[command(name = "kaneru-ctl")]
#[command(about = "Control utility for the Kaneru shell")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a component
    Show {
        /// Component name (bar, dock, notifications, menu, battery, network, display, audio, media, calendar)
        component: String,
    },
    /// Hide a component
    Hide {
        /// Component name
        component: String,
    },
    /// Toggle a component
    Toggle {
        /// Component name
        component: String,
    },
    /// Reload configuration
    ReloadConfig,
    /// Show status of all components
    Status,
    /// Close every visible notification
    DismissNotifications,
    /// Focus a window by niri id
    Focus {
        /// Window id
        id: u64,
    },
    /// Close a window by niri id
    Close {
        /// Window id
        id: u64,
    },
    /// Launch an application
    Launch {
        /// Application command
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cmd = match cli.command {
        Command::Show { component } => format!("show {}", component),
        Command::Hide { component } => format!("hide {}", component),
        Command::Toggle { component } => format!("toggle {}", component),
        Command::ReloadConfig => "reload-config".to_string(),
        Command::Status => "status".to_string(),
        Command::DismissNotifications => "dismiss-notifications".to_string(),
        Command::Focus { id } => format!("focus {}", id),
        Command::Close { id } => format!("close {}", id),
        Command::Launch { command } => format!("launch {}", command.join(" ")),
    };

    let response = send_command(&cmd)?;
    let response = response.trim();
    if let Some(error) = response.strip_prefix("error: ") {
        anyhow::bail!("{}", error);
    }
    println!("{}", response);

    Ok(())
}

/// Send a command to the daemon via IPC
fn send_command(cmd: &str) -> anyhow::Result<String> {
    let path = ConfigPaths::socket_path();

    if !path.exists() {
        return Err(anyhow::anyhow!(
            "Kaneru daemon is not running (socket not found at {:?})",
            path
        ));
    }

    let mut stream = UnixStream::connect(&path)?;
    stream.write_all(cmd.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()?;

    let mut response = String::new();
    stream.read_to_string(&mut response)?;

    Ok(response)
}
