use async_channel::Sender;
use niri_ipc::socket::SOCKET_PATH_ENV;
use niri_ipc::{Action, Event, Reply, Request, Response, Window};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::messages::{ShellCommand, ShellEvent, WindowInfo};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum NiriError {
    #[error("niri socket path environment variable ({}) not set", SOCKET_PATH_ENV)]
    SocketPathNotSet,

    #[error("failed to connect to niri socket: {0}")]
    Connect(#[source] std::io::Error),

    #[error("niri IPC communication error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed niri message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("niri returned an error reply: {0}")]
    ErrorReply(String),

    #[error("niri returned an unexpected response, expected {expected}")]
    UnexpectedResponse { expected: &'static str },

    #[error("niri closed the socket")]
    Closed,
}

fn socket_path() -> Result<PathBuf, NiriError> {
    std::env::var_os(SOCKET_PATH_ENV)
        .map(PathBuf::from)
        .ok_or(NiriError::SocketPathNotSet)
}

/// Decode one reply line
pub fn parse_reply(line: &str) -> Result<Response, NiriError> {
    let reply: Reply = serde_json::from_str(line.trim_end())?;
    reply.map_err(NiriError::ErrorReply)
}

async fn connect() -> Result<BufReader<UnixStream>, NiriError> {
    let stream = UnixStream::connect(socket_path()?)
        .await
        .map_err(NiriError::Connect)?;
    Ok(BufReader::new(stream))
}

/// Send one request line and read the reply on an open stream
async fn exchange(stream: &mut BufReader<UnixStream>, request: &Request) -> Result<Response, NiriError> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    stream.get_mut().write_all(line.as_bytes()).await?;
    stream.get_mut().flush().await?;

    let mut reply = String::new();
    if stream.read_line(&mut reply).await? == 0 {
        return Err(NiriError::Closed);
    }
    parse_reply(&reply)
}

/// One-shot request on a fresh connection
pub async fn request(request: Request) -> Result<Response, NiriError> {
    let mut stream = connect().await?;
    exchange(&mut stream, &request).await
}

pub async fn windows() -> Result<Vec<Window>, NiriError> {
    match request(Request::Windows).await? {
        Response::Windows(windows) => Ok(windows),
        _ => Err(NiriError::UnexpectedResponse { expected: "Windows" }),
    }
}

pub async fn focused_window() -> Result<Option<Window>, NiriError> {
    match request(Request::FocusedWindow).await? {
        Response::FocusedWindow(window) => Ok(window),
        _ => Err(NiriError::UnexpectedResponse {
            expected: "FocusedWindow",
        }),
    }
}

pub async fn action(action: Action) -> Result<(), NiriError> {
    match request(Request::Action(action)).await? {
        Response::Handled => Ok(()),
        _ => Err(NiriError::UnexpectedResponse { expected: "Handled" }),
    }
}

/// Map a niri event to the shell events it implies
pub fn translate_event(event: Event) -> Option<ShellEvent> {
    match event {
        Event::WindowsChanged { windows } => Some(ShellEvent::WindowsSynced(
            windows.into_iter().map(WindowInfo::from).collect(),
        )),
        Event::WindowOpenedOrChanged { window } => {
            Some(ShellEvent::WindowOpenedOrChanged(window.into()))
        }
        Event::WindowClosed { id } => Some(ShellEvent::WindowClosed { id }),
        Event::WindowFocusChanged { id } => Some(ShellEvent::WindowFocused { id }),
        _ => None,
    }
}

/// Async service for niri IPC communication
pub struct NiriService {
    event_tx: Sender<ShellEvent>,
    command_rx: mpsc::Receiver<ShellCommand>,
}

impl NiriService {
    pub fn new(event_tx: Sender<ShellEvent>, command_rx: mpsc::Receiver<ShellCommand>) -> Self {
        Self {
            event_tx,
            command_rx,
        }
    }

    /// Main run loop - keeps the event stream alive and handles commands
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting niri service");

        let event_tx = self.event_tx.clone();
        let listener_handle = tokio::spawn(async move {
            loop {
                match Self::run_event_stream(&event_tx).await {
                    Ok(()) => warn!("niri event stream ended, reconnecting..."),
                    Err(NiriError::SocketPathNotSet) => {
                        warn!("{} not set, is niri running?", SOCKET_PATH_ENV)
                    }
                    Err(e) => error!("niri event stream error: {}, reconnecting...", e),
                }
                let _ = event_tx.send(ShellEvent::CompositorDisconnected).await;
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        });

        // Handle commands from GTK
        while let Some(cmd) = self.command_rx.recv().await {
            if let Err(e) = Self::handle_command(cmd).await {
                error!("Failed to execute niri command: {}", e);
            }
        }

        listener_handle.abort();
        Ok(())
    }

    /// Stream events until the socket closes
    async fn run_event_stream(tx: &Sender<ShellEvent>) -> Result<(), NiriError> {
        let mut stream = connect().await?;

        match exchange(&mut stream, &Request::EventStream).await? {
            Response::Handled => {}
            _ => {
                return Err(NiriError::UnexpectedResponse {
                    expected: "Handled",
                })
            }
        }

        info!("Connected to niri event stream");
        let _ = tx.send(ShellEvent::CompositorConnected).await;

        let mut line = String::new();
        loop {
            line.clear();
            if stream.read_line(&mut line).await? == 0 {
                return Ok(());
            }

            // Newer niri versions may send events this build doesn't know
            let event = match serde_json::from_str::<Event>(&line) {
                Ok(event) => event,
                Err(e) => {
                    debug!("Skipping unknown niri event: {}", e);
                    continue;
                }
            };

            if let Some(shell_event) = translate_event(event) {
                if tx.send(shell_event).await.is_err() {
                    return Ok(());
                }
            }
        }
    }

    /// Handle a command from the GTK UI
    async fn handle_command(cmd: ShellCommand) -> Result<(), NiriError> {
        match cmd {
            ShellCommand::FocusWindow(id) => {
                debug!("Focusing window {}", id);
                action(Action::FocusWindow { id }).await
            }
            ShellCommand::CloseWindow(id) => {
                debug!("Closing window {}", id);
                action(Action::CloseWindow { id: Some(id) }).await
            }
            ShellCommand::Quit => {
                info!("Quitting niri session");
                action(Action::Quit {
                    skip_confirmation: false,
                })
                .await
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_reply_is_surfaced() {
        let err = parse_reply(r#"{"Err":"no such window"}"#).unwrap_err();
        assert!(matches!(err, NiriError::ErrorReply(msg) if msg == "no such window"));
    }

    #[test]
    fn handled_reply_parses() {
        assert!(matches!(
            parse_reply("{\"Ok\":\"Handled\"}\n").unwrap(),
            Response::Handled
        ));
        assert!(matches!(parse_reply("not json"), Err(NiriError::Json(_))));
    }

    #[test]
    fn window_events_translate() {
        let event: Event = serde_json::from_str(r#"{"WindowClosed":{"id":42}}"#).unwrap();
        assert!(matches!(
            translate_event(event),
            Some(ShellEvent::WindowClosed { id: 42 })
        ));

        let event: Event =
            serde_json::from_str(r#"{"WindowFocusChanged":{"id":null}}"#).unwrap();
        assert!(matches!(
            translate_event(event),
            Some(ShellEvent::WindowFocused { id: None })
        ));
    }
}
