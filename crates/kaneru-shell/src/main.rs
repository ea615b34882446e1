mod daemon;
mod ipc;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use kaneru_core::ComponentId;

#[derive(Parser)]
#[command(name = "kaneru")]
#[command(about = "Kaneru desktop shell for niri")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run as daemon (default)
    Daemon {
        /// Read config.json and style.css from this directory
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
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
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kaneru_shell=info".parse()?)
                .add_directive("kaneru_core=info".parse()?)
                .add_directive("kaneru_components=info".parse()?)
                .add_directive("zbus=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Daemon { config_dir }) => {
            info!("Starting Kaneru daemon");
            daemon::run(config_dir)
        }
        None => {
            info!("Starting Kaneru daemon");
            daemon::run(None)
        }
        Some(Command::Show { component }) => {
            let id = parse_component(&component)?;
            ipc::send_show(id)
        }
        Some(Command::Hide { component }) => {
            let id = parse_component(&component)?;
            ipc::send_hide(id)
        }
        Some(Command::Toggle { component }) => {
            let id = parse_component(&component)?;
            ipc::send_toggle(id)
        }
        Some(Command::ReloadConfig) => ipc::send_reload_config(),
        Some(Command::Status) => ipc::show_status(),
        Some(Command::DismissNotifications) => ipc::send_dismiss_notifications(),
    }
}

fn parse_component(name: &str) -> anyhow::Result<ComponentId> {
    ComponentId::from_name(name).ok_or_else(|| anyhow::anyhow!("Unknown component: {}", name))
}
