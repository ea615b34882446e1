use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::{
    AudioService, BatteryService, ConfigWatcher, DisplayService, MediaService, NetworkService,
    NiriService, NotificationService, ProcessService,
};
use crate::config::{ConfigPaths, ShellConfig};
use crate::messages::{ShellCommand, ShellEvent};

/// Per-service command senders
struct Routes {
    niri: mpsc::Sender<ShellCommand>,
    process: mpsc::Sender<ShellCommand>,
    notifications: mpsc::Sender<ShellCommand>,
    battery: mpsc::Sender<ShellCommand>,
    network: mpsc::Sender<ShellCommand>,
    display: mpsc::Sender<ShellCommand>,
    audio: mpsc::Sender<ShellCommand>,
    media: mpsc::Sender<ShellCommand>,
    config: mpsc::Sender<ShellCommand>,
    events: async_channel::Sender<ShellEvent>,
}

/// Spawn a service future on the runtime, logging its failure
macro_rules! spawn_service {
    ($runtime:expr, $name:literal, $service:expr) => {{
        let service = $service;
        $runtime.spawn(async move {
            if let Err(e) = service.run().await {
                error!("{} service error: {:#}", $name, e);
            }
        });
    }};
}

/// Central hub for managing all async services
pub struct ServiceHub {
    /// Event sender for broadcasting to GTK
    event_tx: async_channel::Sender<ShellEvent>,
    /// Event receiver for the GTK dispatch loop
    event_rx: async_channel::Receiver<ShellEvent>,
    /// Command sender for GTK to use
    command_tx: mpsc::Sender<ShellCommand>,
    runtime: Arc<Runtime>,
}

impl ServiceHub {
    /// Create the runtime and start every service
    pub fn new(paths: ConfigPaths, config: &ShellConfig) -> anyhow::Result<Self> {
        let runtime = Arc::new(Runtime::new()?);

        let (event_tx, event_rx) = async_channel::bounded::<ShellEvent>(64);
        let (command_tx, command_rx) = mpsc::channel::<ShellCommand>(64);

        let (niri_tx, niri_rx) = mpsc::channel(64);
        let (process_tx, process_rx) = mpsc::channel(64);
        let (notifications_tx, notifications_rx) = mpsc::channel(64);
        let (battery_tx, battery_rx) = mpsc::channel(64);
        let (network_tx, network_rx) = mpsc::channel(64);
        let (display_tx, display_rx) = mpsc::channel(64);
        let (audio_tx, audio_rx) = mpsc::channel(64);
        let (media_tx, media_rx) = mpsc::channel(64);
        let (config_tx, config_rx) = mpsc::channel(16);

        let routes = Routes {
            niri: niri_tx,
            process: process_tx,
            notifications: notifications_tx,
            battery: battery_tx,
            network: network_tx,
            display: display_tx,
            audio: audio_tx,
            media: media_tx,
            config: config_tx,
            events: event_tx.clone(),
        };
        runtime.spawn(Self::route_commands(command_rx, routes));

        spawn_service!(runtime, "niri", NiriService::new(event_tx.clone(), niri_rx));
        spawn_service!(runtime, "process", ProcessService::new(process_rx));
        spawn_service!(
            runtime,
            "notification",
            NotificationService::new(
                &config.notification,
                paths.notification_history.clone(),
                event_tx.clone(),
                notifications_rx,
            )
        );
        spawn_service!(
            runtime,
            "battery",
            BatteryService::new(config.battery.clone(), event_tx.clone(), battery_rx)
        );
        spawn_service!(
            runtime,
            "network",
            NetworkService::new(config.network.clone(), event_tx.clone(), network_rx)
        );
        spawn_service!(
            runtime,
            "display",
            DisplayService::new(config.display.clone(), event_tx.clone(), display_rx)
        );
        spawn_service!(
            runtime,
            "audio",
            AudioService::new(config.audio.clone(), event_tx.clone(), audio_rx)
        );
        spawn_service!(
            runtime,
            "media",
            MediaService::new(config.media.clone(), event_tx.clone(), media_rx)
        );
        spawn_service!(
            runtime,
            "config watcher",
            ConfigWatcher::new(paths, event_tx.clone(), config_rx)
        );

        info!("ServiceHub initialized with all services");

        Ok(Self {
            event_tx,
            event_rx,
            command_tx,
            runtime,
        })
    }

    /// Route commands to the service that owns them
    async fn route_commands(mut rx: mpsc::Receiver<ShellCommand>, routes: Routes) {
        while let Some(cmd) = rx.recv().await {
            let target = match &cmd {
                ShellCommand::FocusWindow(_) | ShellCommand::CloseWindow(_) | ShellCommand::Quit => {
                    &routes.niri
                }

                ShellCommand::LaunchApp(_)
                | ShellCommand::Lock
                | ShellCommand::Suspend
                | ShellCommand::Reboot
                | ShellCommand::Shutdown => &routes.process,

                ShellCommand::CloseNotification { .. }
                | ShellCommand::InvokeAction { .. }
                | ShellCommand::DismissAllNotifications
                | ShellCommand::ClearHistory
                | ShellCommand::SetHistoryLimit(_) => &routes.notifications,

                ShellCommand::RefreshBattery
                | ShellCommand::SetPowerProfile(_)
                | ShellCommand::SetConservationMode(_) => &routes.battery,

                ShellCommand::RefreshNetwork
                | ShellCommand::ScanNetworks
                | ShellCommand::SetNetworkScanning(_)
                | ShellCommand::SetWifiEnabled(_)
                | ShellCommand::SetAirplaneMode(_)
                | ShellCommand::ConnectNetwork { .. }
                | ShellCommand::DisconnectNetwork
                | ShellCommand::ForgetNetwork(_) => &routes.network,

                ShellCommand::RefreshDisplay
                | ShellCommand::SetBrightness(_)
                | ShellCommand::SetNightLight { .. }
                | ShellCommand::SetDarkMode(_) => &routes.display,

                ShellCommand::RefreshAudio
                | ShellCommand::SetVolume { .. }
                | ShellCommand::SetMuted { .. }
                | ShellCommand::SetDefaultDevice(_) => &routes.audio,

                ShellCommand::RefreshMedia
                | ShellCommand::MediaPlayPause
                | ShellCommand::MediaNext
                | ShellCommand::MediaPrevious
                | ShellCommand::MediaSeek(_) => &routes.media,

                ShellCommand::ReloadConfig => &routes.config,

                // Visibility is a UI concern; bounce it back as an event
                ShellCommand::ShowComponent(id) => {
                    let _ = routes.events.send(ShellEvent::ShowComponent(*id)).await;
                    continue;
                }
                ShellCommand::HideComponent(id) => {
                    let _ = routes.events.send(ShellEvent::HideComponent(*id)).await;
                    continue;
                }
                ShellCommand::ToggleComponent(id) => {
                    let _ = routes.events.send(ShellEvent::ToggleComponent(*id)).await;
                    continue;
                }
            };

            if target.send(cmd).await.is_err() {
                error!("Service for command is no longer running");
            }
        }
    }

    /// Get a clone of the event receiver for the dispatch loop
    pub fn event_receiver(&self) -> async_channel::Receiver<ShellEvent> {
        self.event_rx.clone()
    }

    /// Get a clone of the command sender for a component
    pub fn command_sender(&self) -> mpsc::Sender<ShellCommand> {
        self.command_tx.clone()
    }

    /// Get a clone of the event sender (for the IPC server)
    pub fn event_sender(&self) -> async_channel::Sender<ShellEvent> {
        self.event_tx.clone()
    }

    /// Enter the runtime context (for GTK callbacks)
    pub fn enter_runtime(&self) -> tokio::runtime::EnterGuard<'_> {
        self.runtime.enter()
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }
}
