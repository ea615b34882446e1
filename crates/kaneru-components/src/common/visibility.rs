use ahash::AHashMap;
use gtk4::prelude::*;
use parking_lot::RwLock;
use std::sync::Arc;

use kaneru_core::ComponentId;

/// Last known visibility of each component.
///
/// Written on the GTK thread after every show/hide, read from the IPC server
/// on the tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct Visibility {
    inner: Arc<RwLock<AHashMap<ComponentId, bool>>>,
}

impl Visibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, id: ComponentId, visible: bool) {
        self.inner.write().insert(id, visible);
    }

    /// Follow the widget's own visibility, so popovers dismissed by an
    /// outside click or auto-hidden windows are reported correctly
    pub fn track(&self, id: ComponentId, widget: &impl IsA<gtk4::Widget>) {
        let visibility = self.clone();
        widget
            .as_ref()
            .connect_visible_notify(move |widget| visibility.set(id, widget.is_visible()));
    }

    pub fn is_visible(&self, id: ComponentId) -> bool {
        self.inner.read().get(&id).copied().unwrap_or(false)
    }

    /// `name: visible|hidden` lines in `ComponentId::ALL` order
    pub fn report(&self) -> String {
        let map = self.inner.read();
        ComponentId::ALL
            .iter()
            .filter_map(|id| {
                let visible = map.get(id)?;
                Some(format!(
                    "{}: {}",
                    id.as_name(),
                    if *visible { "visible" } else { "hidden" }
                ))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_known_components_in_order() {
        let visibility = Visibility::new();
        visibility.set(ComponentId::Dock, false);
        visibility.set(ComponentId::Bar, true);

        assert_eq!(visibility.report(), "bar: visible\ndock: hidden");
        assert!(!visibility.is_visible(ComponentId::Media));
    }

    #[test]
    fn tracked_widget_reports_outside_dismissal() {
        // Needs a display
        if gtk4::init().is_err() {
            return;
        }

        let visibility = Visibility::new();
        let label = gtk4::Label::new(None);
        visibility.track(ComponentId::Calendar, &label);
        visibility.set(ComponentId::Calendar, true);

        label.set_visible(false);
        assert_eq!(visibility.report(), "calendar: hidden");

        label.set_visible(true);
        assert!(visibility.is_visible(ComponentId::Calendar));
    }
}
