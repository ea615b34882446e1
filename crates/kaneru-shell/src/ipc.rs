//! Line protocol on the daemon's Unix socket: the client writes one command
//! line, the daemon answers with one response and closes the connection.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use kaneru_components::Visibility;
use kaneru_core::{ComponentId, ConfigPaths, ShellCommand};

/// A parsed client request
#[derive(Debug)]
pub enum Request {
    /// Anything that maps directly onto a hub command
    Command(ShellCommand),
    Status,
}

impl Request {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        let component = || {
            ComponentId::from_name(arg).ok_or_else(|| format!("unknown component '{}'", arg))
        };
        let window = || {
            arg.parse::<u64>()
                .map_err(|_| format!("invalid window id '{}'", arg))
        };

        let cmd = match verb {
            "show" => ShellCommand::ShowComponent(component()?),
            "hide" => ShellCommand::HideComponent(component()?),
            "toggle" => ShellCommand::ToggleComponent(component()?),
            "reload-config" => ShellCommand::ReloadConfig,
            "dismiss-notifications" => ShellCommand::DismissAllNotifications,
            "focus" => ShellCommand::FocusWindow(window()?),
            "close" => ShellCommand::CloseWindow(window()?),
            "launch" if !arg.is_empty() => ShellCommand::LaunchApp(CompactString::from(arg)),
            "launch" => return Err("launch needs a command".to_string()),
            "status" => return Ok(Self::Status),
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command '{}'", other)),
        };
        Ok(Self::Command(cmd))
    }
}

/// Accept clients until the runtime shuts down
pub async fn serve(
    path: PathBuf,
    command_tx: mpsc::Sender<ShellCommand>,
    visibility: Visibility,
) -> anyhow::Result<()> {
    // A previous daemon may have left its socket behind
    if tokio::fs::try_exists(&path).await? {
        tokio::fs::remove_file(&path).await?;
    }
    let listener = UnixListener::bind(&path)?;
    info!("IPC server listening on {:?}", path);

    loop {
        let (stream, _) = listener.accept().await?;
        let command_tx = command_tx.clone();
        let visibility = visibility.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, command_tx, visibility).await {
                warn!("IPC client error: {}", e);
            }
        });
    }
}

async fn handle_client(
    stream: tokio::net::UnixStream,
    command_tx: mpsc::Sender<ShellCommand>,
    visibility: Visibility,
) -> anyhow::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut line = String::new();
    BufReader::new(read).read_line(&mut line).await?;
    debug!("IPC request: {}", line.trim());

    let response = match Request::parse(&line) {
        Ok(Request::Status) => visibility.report(),
        Ok(Request::Command(cmd)) => match command_tx.send(cmd).await {
            Ok(()) => "ok".to_string(),
            Err(_) => "error: shell is shutting down".to_string(),
        },
        Err(e) => format!("error: {}", e),
    };

    write.write_all(response.as_bytes()).await?;
    write.write_all(b"\n").await?;
    write.shutdown().await?;
    Ok(())
}

/// Remove the socket file once the daemon exits
pub fn cleanup(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        debug!("Socket cleanup skipped: {}", e);
    }
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

fn print_response(cmd: &str) -> anyhow::Result<()> {
    let response = send_command(cmd)?;
    let response = response.trim();
    if let Some(error) = response.strip_prefix("error: ") {
        return Err(anyhow::anyhow!("{}", error));
    }
    println!("{}", response);
    Ok(())
}

pub fn send_show(id: ComponentId) -> anyhow::Result<()> {
    print_response(&format!("show {}", id.as_name()))
}

pub fn send_hide(id: ComponentId) -> anyhow::Result<()> {
    print_response(&format!("hide {}", id.as_name()))
}

pub fn send_toggle(id: ComponentId) -> anyhow::Result<()> {
    print_response(&format!("toggle {}", id.as_name()))
}

pub fn send_reload_config() -> anyhow::Result<()> {
    print_response("reload-config")
}

pub fn send_dismiss_notifications() -> anyhow::Result<()> {
    print_response("dismiss-notifications")
}

/// Show status of all components
pub fn show_status() -> anyhow::Result<()> {
    print_response("status")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> ShellCommand {
        match Request::parse(line) {
            Ok(Request::Command(cmd)) => cmd,
            other => panic!("expected a command for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn parses_component_commands() {
        assert!(matches!(
            command("toggle menu\n"),
            ShellCommand::ToggleComponent(ComponentId::AppMenu)
        ));
        assert!(matches!(
            command("show  dock"),
            ShellCommand::ShowComponent(ComponentId::Dock)
        ));
        assert_eq!(
            Request::parse("hide sidebar").err().as_deref(),
            Some("unknown component 'sidebar'")
        );
    }

    #[test]
    fn parses_window_and_launch_commands() {
        assert!(matches!(command("focus 42"), ShellCommand::FocusWindow(42)));
        assert!(matches!(command("close 7"), ShellCommand::CloseWindow(7)));
        assert!(Request::parse("focus abc").is_err());

        match command("launch foot -e htop") {
            ShellCommand::LaunchApp(cmd) => assert_eq!(cmd, "foot -e htop"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(Request::parse("launch").is_err());
    }

    #[test]
    fn parses_plain_commands() {
        assert!(matches!(Request::parse("status"), Ok(Request::Status)));
        assert!(matches!(command("reload-config"), ShellCommand::ReloadConfig));
        assert!(matches!(
            command("dismiss-notifications"),
            ShellCommand::DismissAllNotifications
        ));
        assert_eq!(
            Request::parse("  ").err().as_deref(),
            Some("empty command")
        );
        assert_eq!(
            Request::parse("reboot now").err().as_deref(),
            Some("unknown command 'reboot'")
        );
    }
}
