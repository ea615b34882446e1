use ahash::AHashMap;
use compact_str::CompactString;
use smallvec::SmallVec;

use super::app_resolver::{AppInfo, AppResolver};
use crate::messages::{ShellEvent, WindowInfo};

const FALLBACK_ICON: &str = "application-x-executable";

/// A dock entry: a favorite application or an unpinned open app
#[derive(Debug, Clone, PartialEq)]
pub struct DockItem {
    /// Lowercase desktop id, or the window app id when unresolved
    pub id: CompactString,
    pub name: CompactString,
    pub icon: CompactString,
    /// Exec line used to launch a new instance
    pub command: CompactString,
    pub favorite: bool,
    pub open: bool,
    pub active: bool,
    /// Windows belonging to this item, in niri order
    pub windows: SmallVec<[u64; 2]>,
}

impl DockItem {
    fn from_app(app: &AppInfo, favorite: bool) -> Self {
        Self {
            id: app.desktop_id.to_lowercase().into(),
            name: app.name.as_str().into(),
            icon: app.icon_name().into(),
            command: app.exec.as_str().into(),
            favorite,
            open: false,
            active: false,
            windows: SmallVec::new(),
        }
    }

    fn from_app_id(app_id: &str) -> Self {
        let id = app_id.to_lowercase();
        Self {
            name: app_id.into(),
            icon: FALLBACK_ICON.into(),
            command: id.as_str().into(),
            id: id.into(),
            favorite: false,
            open: false,
            active: false,
            windows: SmallVec::new(),
        }
    }

    /// Window to focus when clicked (None means launch instead)
    pub fn focus_target(&self) -> Option<u64> {
        self.windows.first().copied()
    }
}

/// Computed diff for efficient UI updates - only what changed
#[derive(Debug, Clone, PartialEq)]
pub enum DockDiff {
    /// Add a new item at index
    Add { index: usize, item: DockItem },
    /// Remove an item by ID
    Remove { id: CompactString },
    /// Update visual state (CSS classes) without recreating widget
    UpdateState {
        id: CompactString,
        open: bool,
        active: bool,
    },
}

/// Dock contents derived from favorites and the compositor window list
pub struct DockState {
    resolver: AppResolver,
    /// All dock items indexed by ID
    items: AHashMap<CompactString, DockItem>,
    /// Display order (favorites first, then open apps)
    order: Vec<CompactString>,
    /// Known windows in the order niri reported them
    windows: Vec<WindowInfo>,
    focused: Option<u64>,
}

impl DockState {
    /// Favorites that fail to resolve are skipped
    pub fn new(resolver: AppResolver, favorites: &[String]) -> Self {
        let mut state = Self {
            resolver,
            items: AHashMap::new(),
            order: Vec::new(),
            windows: Vec::new(),
            focused: None,
        };
        state.load_favorites(favorites);
        state
    }

    fn load_favorites(&mut self, favorites: &[String]) {
        for favorite in favorites {
            let Some(app) = self.resolver.resolve(favorite) else {
                tracing::debug!("Dock favorite '{}' did not resolve", favorite);
                continue;
            };

            let item = DockItem::from_app(app, true);
            if self.items.contains_key(&item.id) {
                continue;
            }

            self.order.push(item.id.clone());
            self.items.insert(item.id.clone(), item);
        }
    }

    /// Replace favorites after a config reload; returns the full rebuild diff
    pub fn set_favorites(&mut self, favorites: &[String]) -> Vec<DockDiff> {
        let mut diffs: Vec<DockDiff> = self
            .order
            .drain(..)
            .map(|id| DockDiff::Remove { id })
            .collect();
        self.items.clear();

        self.load_favorites(favorites);
        self.reconcile();

        diffs.extend(
            self.items_ordered()
                .enumerate()
                .map(|(index, item)| DockDiff::Add {
                    index,
                    item: item.clone(),
                }),
        );
        diffs
    }

    /// Apply an event and compute minimal diff for UI update
    pub fn apply_event(&mut self, event: &ShellEvent) -> SmallVec<[DockDiff; 4]> {
        match event {
            ShellEvent::WindowsSynced(windows) => {
                self.windows = windows.clone();
                self.focused = windows.iter().find(|w| w.is_focused).map(|w| w.id);
            }

            ShellEvent::WindowOpenedOrChanged(window) => {
                if window.is_focused {
                    self.focused = Some(window.id);
                }
                match self.windows.iter_mut().find(|w| w.id == window.id) {
                    Some(existing) => *existing = window.clone(),
                    None => self.windows.push(window.clone()),
                }
            }

            ShellEvent::WindowClosed { id } => {
                self.windows.retain(|w| w.id != *id);
                if self.focused == Some(*id) {
                    self.focused = None;
                }
            }

            ShellEvent::WindowFocused { id } => {
                self.focused = *id;
            }

            ShellEvent::CompositorDisconnected => {
                self.windows.clear();
                self.focused = None;
            }

            _ => return SmallVec::new(),
        }

        self.reconcile()
    }

    /// Item id a window belongs to; None for windows without an app id
    fn item_id_for(&self, window: &WindowInfo) -> Option<CompactString> {
        let app_id = window.app_id.as_deref()?;

        let favorite = self.order.iter().find(|id| {
            self.items.get(*id).is_some_and(|item| {
                item.favorite
                    && (item.id.eq_ignore_ascii_case(app_id)
                        || AppResolver::command_name(&item.command).eq_ignore_ascii_case(app_id))
            })
        });
        if let Some(id) = favorite {
            return Some(id.clone());
        }

        Some(match self.resolver.resolve_app_id(app_id) {
            Some(app) => app.desktop_id.to_lowercase().into(),
            None => app_id.to_lowercase().into(),
        })
    }

    /// Recompute open/active flags and the set of unpinned items
    fn reconcile(&mut self) -> SmallVec<[DockDiff; 4]> {
        let mut diffs = SmallVec::new();

        let mut grouped: Vec<(CompactString, SmallVec<[u64; 2]>)> = Vec::new();
        for window in &self.windows {
            let Some(item_id) = self.item_id_for(window) else {
                continue;
            };
            match grouped.iter_mut().find(|(id, _)| *id == item_id) {
                Some((_, ids)) => ids.push(window.id),
                None => grouped.push((item_id, SmallVec::from_elem(window.id, 1))),
            }
        }

        // Existing items: update flags or drop unpinned ones with no windows
        let mut removed = Vec::new();
        for id in &self.order {
            let Some(item) = self.items.get_mut(id) else {
                continue;
            };

            let windows = grouped
                .iter()
                .find(|(gid, _)| gid == id)
                .map(|(_, ids)| ids.clone())
                .unwrap_or_default();
            let open = !windows.is_empty();
            let active = self.focused.is_some_and(|f| windows.contains(&f));

            if !open && !item.favorite {
                removed.push(id.clone());
                continue;
            }

            let changed = item.open != open || item.active != active;
            item.open = open;
            item.active = active;
            item.windows = windows;

            if changed {
                diffs.push(DockDiff::UpdateState {
                    id: id.clone(),
                    open,
                    active,
                });
            }
        }

        for id in removed {
            self.items.remove(&id);
            self.order.retain(|i| i != &id);
            diffs.push(DockDiff::Remove { id });
        }

        // New open apps go after everything else, in window order
        for (id, windows) in grouped {
            if self.items.contains_key(&id) {
                continue;
            }

            let mut item = match self.resolver.resolve_by_desktop_id(&id) {
                Some(app) => DockItem::from_app(app, false),
                None => {
                    let app_id = self
                        .windows
                        .iter()
                        .find(|w| windows.contains(&w.id))
                        .and_then(|w| w.app_id.as_deref())
                        .unwrap_or(id.as_str());
                    DockItem::from_app_id(app_id)
                }
            };
            item.id = id.clone();
            item.open = true;
            item.active = self.focused.is_some_and(|f| windows.contains(&f));
            item.windows = windows;

            let index = self.order.len();
            self.order.push(id.clone());
            self.items.insert(id, item.clone());
            diffs.push(DockDiff::Add { index, item });
        }

        diffs
    }

    pub fn get(&self, id: &str) -> Option<&DockItem> {
        self.items.get(id)
    }

    /// Get all items in display order
    pub fn items_ordered(&self) -> impl Iterator<Item = &DockItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(desktop_id: &str, name: &str, exec: &str) -> AppInfo {
        AppInfo {
            desktop_id: desktop_id.to_string(),
            name: name.to_string(),
            icon: desktop_id.to_lowercase(),
            exec: exec.to_string(),
            generic_name: None,
            keywords: Vec::new(),
        }
    }

    fn window(id: u64, app_id: &str, focused: bool) -> WindowInfo {
        WindowInfo {
            id,
            app_id: Some(app_id.into()),
            title: Some("title".into()),
            workspace_id: Some(1),
            is_focused: focused,
        }
    }

    fn dock() -> DockState {
        let resolver = AppResolver::from_apps([
            app("firefox", "Firefox", "firefox"),
            app("foot", "Foot", "foot"),
            app("org.gnome.Nautilus", "Files", "nautilus --new-window"),
            app("org.telegram.desktop", "Telegram", "telegram-desktop"),
        ]);
        DockState::new(
            resolver,
            &["firefox".to_string(), "files".to_string(), "missing".to_string()],
        )
    }

    fn ids(state: &DockState) -> Vec<&str> {
        state.items_ordered().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn favorites_come_first_and_unresolved_are_skipped() {
        let state = dock();
        assert_eq!(ids(&state), vec!["firefox", "org.gnome.nautilus"]);
        assert!(state.items_ordered().all(|i| i.favorite && !i.open));
    }

    #[test]
    fn window_sync_marks_favorites_and_appends_others() {
        let mut state = dock();
        let diffs = state.apply_event(&ShellEvent::WindowsSynced(vec![
            window(10, "nautilus", false),
            window(11, "org.telegram.desktop", true),
            window(12, "unknown-tool", false),
        ]));

        assert_eq!(
            ids(&state),
            vec!["firefox", "org.gnome.nautilus", "org.telegram.desktop", "unknown-tool"]
        );

        assert!(diffs.contains(&DockDiff::UpdateState {
            id: "org.gnome.nautilus".into(),
            open: true,
            active: false,
        }));

        let telegram = state.get("org.telegram.desktop").unwrap();
        assert_eq!(telegram.name, "Telegram");
        assert!(telegram.open && telegram.active);
        assert!(!telegram.favorite);

        let unknown = state.get("unknown-tool").unwrap();
        assert_eq!(unknown.icon, FALLBACK_ICON);
        assert_eq!(unknown.focus_target(), Some(12));
    }

    #[test]
    fn closing_last_window_removes_unpinned_item() {
        let mut state = dock();
        state.apply_event(&ShellEvent::WindowsSynced(vec![
            window(1, "firefox", false),
            window(2, "foot", true),
        ]));

        let diffs = state.apply_event(&ShellEvent::WindowClosed { id: 2 });
        assert_eq!(diffs.as_slice(), &[DockDiff::Remove { id: "foot".into() }]);

        let diffs = state.apply_event(&ShellEvent::WindowClosed { id: 1 });
        assert_eq!(
            diffs.as_slice(),
            &[DockDiff::UpdateState {
                id: "firefox".into(),
                open: false,
                active: false,
            }]
        );
        assert_eq!(ids(&state), vec!["firefox", "org.gnome.nautilus"]);
    }

    #[test]
    fn focus_changes_only_touch_affected_items() {
        let mut state = dock();
        state.apply_event(&ShellEvent::WindowsSynced(vec![
            window(1, "firefox", true),
            window(2, "org.gnome.Nautilus", false),
        ]));

        let diffs = state.apply_event(&ShellEvent::WindowFocused { id: Some(2) });
        assert_eq!(diffs.len(), 2);
        assert!(diffs.contains(&DockDiff::UpdateState {
            id: "firefox".into(),
            open: true,
            active: false,
        }));
        assert!(diffs.contains(&DockDiff::UpdateState {
            id: "org.gnome.nautilus".into(),
            open: true,
            active: true,
        }));

        let diffs = state.apply_event(&ShellEvent::WindowFocused { id: Some(2) });
        assert!(diffs.is_empty());
    }

    #[test]
    fn windows_of_one_app_share_an_item() {
        let mut state = dock();
        state.apply_event(&ShellEvent::WindowsSynced(vec![
            window(5, "foot", false),
            window(6, "foot", false),
        ]));

        let foot = state.get("foot").unwrap();
        assert_eq!(foot.windows.as_slice(), &[5, 6]);

        state.apply_event(&ShellEvent::WindowClosed { id: 5 });
        assert_eq!(state.get("foot").unwrap().focus_target(), Some(6));
    }

    #[test]
    fn set_favorites_rebuilds() {
        let mut state = dock();
        let diffs = state.set_favorites(&["foot".to_string()]);

        assert_eq!(
            diffs.iter().filter(|d| matches!(d, DockDiff::Remove { .. })).count(),
            2
        );
        assert_eq!(ids(&state), vec!["foot"]);
    }
}
