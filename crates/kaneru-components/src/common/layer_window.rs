use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use tracing::debug;

use kaneru_core::{DockPosition, NotificationPosition};

/// Layer shell window configuration
#[derive(Debug, Clone)]
pub struct LayerConfig {
    pub layer: Layer,
    pub anchors: Vec<Edge>,
    pub exclusive_zone: ExclusiveZone,
    pub keyboard_mode: KeyboardMode,
    pub margins: LayerMargins,
    /// Namespace reported to the compositor (used by niri layer rules)
    pub namespace: String,
}

#[derive(Debug, Clone, Copy)]
pub enum ExclusiveZone {
    /// Reserve the window's own size
    Auto,
    None,
    Fixed(i32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerMargins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            layer: Layer::Top,
            anchors: vec![],
            exclusive_zone: ExclusiveZone::None,
            keyboard_mode: KeyboardMode::None,
            margins: LayerMargins::default(),
            namespace: "kaneru".to_string(),
        }
    }
}

fn dock_edge(position: DockPosition) -> Edge {
    match position {
        DockPosition::Bottom => Edge::Bottom,
        DockPosition::Left => Edge::Left,
        DockPosition::Right => Edge::Right,
    }
}

impl LayerConfig {
    /// Full-width bar along the top edge. Keyboard is on demand so popover
    /// entries (app search, wifi password) can take focus.
    pub fn bar() -> Self {
        Self {
            layer: Layer::Top,
            anchors: vec![Edge::Top, Edge::Left, Edge::Right],
            exclusive_zone: ExclusiveZone::Auto,
            keyboard_mode: KeyboardMode::OnDemand,
            namespace: "kaneru-bar".to_string(),
            ..Default::default()
        }
    }

    /// Dock centered on its edge
    pub fn dock(position: DockPosition, auto_hide: bool) -> Self {
        Self {
            layer: Layer::Top,
            anchors: vec![dock_edge(position)],
            exclusive_zone: if auto_hide {
                ExclusiveZone::None
            } else {
                ExclusiveZone::Auto
            },
            namespace: "kaneru-dock".to_string(),
            ..Default::default()
        }
    }

    /// Thin strip along the dock edge that reveals an auto-hidden dock
    pub fn dock_trigger(position: DockPosition) -> Self {
        let anchors = match position {
            DockPosition::Bottom => vec![Edge::Bottom, Edge::Left, Edge::Right],
            DockPosition::Left => vec![Edge::Left, Edge::Top, Edge::Bottom],
            DockPosition::Right => vec![Edge::Right, Edge::Top, Edge::Bottom],
        };
        Self {
            layer: Layer::Top,
            anchors,
            namespace: "kaneru-dock-trigger".to_string(),
            ..Default::default()
        }
    }

    /// One notification popup in a screen corner; the vertical margin is
    /// adjusted later as the stack changes
    pub fn notification(position: NotificationPosition) -> Self {
        let vertical = if position.is_top() { Edge::Top } else { Edge::Bottom };
        let horizontal = if position.is_left() { Edge::Left } else { Edge::Right };
        Self {
            layer: Layer::Overlay,
            anchors: vec![vertical, horizontal],
            margins: LayerMargins {
                left: 12,
                right: 12,
                ..Default::default()
            },
            namespace: "kaneru-notification".to_string(),
            ..Default::default()
        }
    }

    /// Floating panel under the bar's right end (media controls)
    pub fn top_right_overlay(namespace: &str) -> Self {
        Self {
            layer: Layer::Overlay,
            anchors: vec![Edge::Top, Edge::Right],
            margins: LayerMargins {
                top: 8,
                right: 8,
                ..Default::default()
            },
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }
}

/// Wrapper for layer-shell enabled windows
pub struct LayerWindow {
    window: ApplicationWindow,
}

impl LayerWindow {
    pub fn new(app: &Application, config: LayerConfig) -> Self {
        let window = ApplicationWindow::builder()
            .application(app)
            .decorated(false)
            .build();
        window.add_css_class("kaneru-surface");

        window.init_layer_shell();
        window.set_layer(config.layer);

        for edge in &config.anchors {
            window.set_anchor(*edge, true);
        }

        let layer_window = Self { window };
        layer_window.set_margins(config.margins);

        match config.exclusive_zone {
            ExclusiveZone::Auto => layer_window.window.auto_exclusive_zone_enable(),
            ExclusiveZone::None => layer_window.window.set_exclusive_zone(0),
            ExclusiveZone::Fixed(size) => layer_window.window.set_exclusive_zone(size),
        }

        layer_window.window.set_keyboard_mode(config.keyboard_mode);
        layer_window.window.set_namespace(&config.namespace);

        debug!(
            "Created layer window: layer={:?}, anchors={:?}, namespace={}",
            config.layer, config.anchors, config.namespace
        );

        layer_window
    }

    pub fn window(&self) -> &ApplicationWindow {
        &self.window
    }

    pub fn hide(&self) {
        self.window.set_visible(false);
    }

    pub fn set_margins(&self, margins: LayerMargins) {
        self.window.set_margin(Edge::Top, margins.top);
        self.window.set_margin(Edge::Right, margins.right);
        self.window.set_margin(Edge::Bottom, margins.bottom);
        self.window.set_margin(Edge::Left, margins.left);
    }

    pub fn set_margin(&self, edge: Edge, margin: i32) {
        self.window.set_margin(edge, margin);
    }
}

impl std::ops::Deref for LayerWindow {
    type Target = ApplicationWindow;

    fn deref(&self) -> &Self::Target {
        &self.window
    }
}
