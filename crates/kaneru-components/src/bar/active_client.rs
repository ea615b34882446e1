use ahash::AHashMap;

use kaneru_core::utils::truncate_chars;
use kaneru_core::{ShellEvent, WindowInfo};

/// Tracks the focused window's title from compositor events
#[derive(Debug, Default)]
pub struct ActiveClient {
    windows: AHashMap<u64, WindowInfo>,
    focused: Option<u64>,
}

impl ActiveClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the event may have changed the title
    pub fn apply_event(&mut self, event: &ShellEvent) -> bool {
        match event {
            ShellEvent::WindowsSynced(windows) => {
                self.windows = windows.iter().map(|w| (w.id, w.clone())).collect();
                self.focused = windows.iter().find(|w| w.is_focused).map(|w| w.id);
            }
            ShellEvent::WindowOpenedOrChanged(window) => {
                if window.is_focused {
                    self.focused = Some(window.id);
                }
                self.windows.insert(window.id, window.clone());
            }
            ShellEvent::WindowClosed { id } => {
                self.windows.remove(id);
                if self.focused == Some(*id) {
                    self.focused = None;
                }
            }
            ShellEvent::WindowFocused { id } => self.focused = *id,
            ShellEvent::CompositorDisconnected => {
                self.windows.clear();
                self.focused = None;
            }
            _ => return false,
        }
        true
    }

    /// Focused window title (or app id), cut to `max_chars`
    pub fn title(&self, max_chars: usize) -> Option<String> {
        let window = self.windows.get(&self.focused?)?;
        let text = window
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(window.app_id.as_deref())?;
        Some(truncate_chars(text.trim(), max_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(id: u64, title: Option<&str>, app_id: &str, focused: bool) -> WindowInfo {
        WindowInfo {
            id,
            app_id: Some(app_id.into()),
            title: title.map(Into::into),
            workspace_id: Some(1),
            is_focused: focused,
        }
    }

    #[test]
    fn follows_focus_and_title_changes() {
        let mut client = ActiveClient::new();
        client.apply_event(&ShellEvent::WindowsSynced(vec![
            window(1, Some("Mozilla Firefox"), "firefox", true),
            window(2, Some("~/src"), "foot", false),
        ]));
        assert_eq!(client.title(50).as_deref(), Some("Mozilla Firefox"));

        client.apply_event(&ShellEvent::WindowFocused { id: Some(2) });
        assert_eq!(client.title(50).as_deref(), Some("~/src"));

        client.apply_event(&ShellEvent::WindowOpenedOrChanged(window(
            2,
            Some("vim main.rs"),
            "foot",
            true,
        )));
        assert_eq!(client.title(3).as_deref(), Some("vim…"));
    }

    #[test]
    fn falls_back_to_app_id_and_clears_on_close() {
        let mut client = ActiveClient::new();
        client.apply_event(&ShellEvent::WindowOpenedOrChanged(window(7, None, "mpv", true)));
        assert_eq!(client.title(50).as_deref(), Some("mpv"));

        client.apply_event(&ShellEvent::WindowClosed { id: 7 });
        assert_eq!(client.title(50), None);

        assert!(!client.apply_event(&ShellEvent::CompositorConnected));
    }
}
