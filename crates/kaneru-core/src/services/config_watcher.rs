use async_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{ConfigPaths, ShellConfig};
use crate::messages::{ShellCommand, ShellEvent};

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches `config.json` and `style.css` and republishes the config on change
pub struct ConfigWatcher {
    paths: ConfigPaths,
    event_tx: Sender<ShellEvent>,
    command_rx: mpsc::Receiver<ShellCommand>,
}

impl ConfigWatcher {
    pub fn new(
        paths: ConfigPaths,
        event_tx: Sender<ShellEvent>,
        command_rx: mpsc::Receiver<ShellCommand>,
    ) -> Self {
        Self {
            paths,
            event_tx,
            command_rx,
        }
    }

    fn is_watched(&self, path: &std::path::Path) -> bool {
        path == self.paths.config_file || path == self.paths.user_css
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Starting config watcher");

        let config_dir = self.paths.config_dir();
        tokio::fs::create_dir_all(&config_dir).await?;

        let (notify_tx, mut notify_rx) = mpsc::channel::<PathBuf>(32);
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        for path in event.paths {
                            let _ = notify_tx.blocking_send(path);
                        }
                    }
                }
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // Editors replace files on save, so watch the directory
        watcher.watch(&config_dir, RecursiveMode::NonRecursive)?;
        debug!("Watching directory: {:?}", config_dir);

        let mut debounce_deadline: Option<tokio::time::Instant> = None;

        loop {
            tokio::select! {
                Some(path) = notify_rx.recv() => {
                    if self.is_watched(&path) {
                        debounce_deadline = Some(tokio::time::Instant::now() + DEBOUNCE);
                    }
                }

                cmd = self.command_rx.recv() => match cmd {
                    Some(ShellCommand::ReloadConfig) => self.reload().await,
                    Some(_) => {}
                    None => break,
                },

                _ = async {
                    match debounce_deadline {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    debounce_deadline = None;
                    self.reload().await;
                }
            }
        }

        Ok(())
    }

    async fn reload(&self) {
        debug!("Reloading config: {:?}", self.paths.config_file);

        let path = self.paths.config_file.clone();
        let result = tokio::task::spawn_blocking(move || ShellConfig::read(&path)).await;

        match result {
            Ok(Ok(config)) => {
                info!("Config reloaded");
                let _ = self
                    .event_tx
                    .send(ShellEvent::ConfigReloaded(Box::new(config)))
                    .await;
            }
            // Keep the running config; a half-written file will settle on the next event
            Ok(Err(e)) => warn!("Failed to parse config: {:#}", e),
            Err(e) => warn!("Config reader panicked: {}", e),
        }
    }
}
