use ahash::AHashMap;
use compact_str::CompactString;
use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, EventControllerMotion, Orientation};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

use kaneru_core::config::DockPosition;
use kaneru_core::{AppResolver, ComponentId, DockConfig, DockDiff, DockState, ShellCommand, ShellEvent};

use super::item::DockButton;
use crate::common::{Component, ComponentContext, Debouncer, LayerConfig, LayerWindow};

const TRIGGER_SIZE: i32 = 5;

struct DockView {
    ctx: ComponentContext,
    window: LayerWindow,
    /// Edge strip that brings an auto-hidden dock back
    trigger: Option<LayerWindow>,
    container: GtkBox,
    state: RefCell<DockState>,
    buttons: RefCell<AHashMap<CompactString, DockButton>>,
    /// Widget order mirrors this list
    order: RefCell<Vec<CompactString>>,
    vertical: bool,
    icon_size: Cell<i32>,
    hide_delay: Cell<Duration>,
    hide_timer: Debouncer,
}

impl DockView {
    fn apply_diff(self: &Rc<Self>, diff: DockDiff) {
        match diff {
            DockDiff::Add { index, item } => {
                if self.buttons.borrow().contains_key(&item.id) {
                    return;
                }

                let dock_button = DockButton::new(&item, self.icon_size.get(), self.vertical);
                let id = item.id.clone();
                let v = self.clone();
                dock_button
                    .button
                    .connect_clicked(move |_| v.activate(&id));

                let mut order = self.order.borrow_mut();
                let index = index.min(order.len());
                let sibling = index
                    .checked_sub(1)
                    .and_then(|i| order.get(i))
                    .and_then(|id| self.buttons.borrow().get(id).map(|b| b.button.clone()));
                self.container
                    .insert_child_after(&dock_button.button, sibling.as_ref());

                order.insert(index, item.id.clone());
                self.buttons.borrow_mut().insert(item.id, dock_button);
            }
            DockDiff::Remove { id } => {
                if let Some(dock_button) = self.buttons.borrow_mut().remove(&id) {
                    self.container.remove(&dock_button.button);
                }
                self.order.borrow_mut().retain(|other| *other != id);
            }
            DockDiff::UpdateState { id, open, active } => {
                if let Some(dock_button) = self.buttons.borrow().get(&id) {
                    dock_button.set_state(open, active);
                }
            }
        }
    }

    /// Focus the item's first window, or launch it when nothing is open
    fn activate(&self, id: &str) {
        let target = {
            let state = self.state.borrow();
            let Some(item) = state.get(id) else {
                return;
            };
            match item.focus_target() {
                Some(window) => ShellCommand::FocusWindow(window),
                None => ShellCommand::LaunchApp(item.command.clone()),
            }
        };
        debug!("Dock item '{}' activated: {:?}", id, target);
        self.ctx.send_command(target);
    }

    fn handle_event(self: &Rc<Self>, event: &ShellEvent) {
        match event {
            ShellEvent::ConfigReloaded(config) => self.reconfigure(&config.dock),
            _ => {
                let diffs = self.state.borrow_mut().apply_event(event);
                for diff in diffs {
                    self.apply_diff(diff);
                }
            }
        }
    }

    fn reconfigure(self: &Rc<Self>, config: &DockConfig) {
        self.hide_delay.set(Duration::from_millis(config.hide_delay_ms));

        if self.icon_size.get() != config.icon_size {
            self.icon_size.set(config.icon_size);
            for dock_button in self.buttons.borrow().values() {
                dock_button.set_icon_size(config.icon_size);
            }
        }

        let diffs = self.state.borrow_mut().set_favorites(&config.favorites);
        for diff in diffs {
            self.apply_diff(diff);
        }
    }

    fn auto_hide(&self) -> bool {
        self.trigger.is_some()
    }

    fn reveal(&self) {
        self.hide_timer.cancel();
        self.window.present();
    }

    fn schedule_hide(&self) {
        if !self.auto_hide() {
            return;
        }
        let window = self.window.window().clone();
        self.hide_timer.schedule(self.hide_delay.get(), move || {
            window.set_visible(false);
        });
    }
}

/// Favorites and running applications along a screen edge
pub struct DockComponent {
    view: Option<Rc<DockView>>,
}

impl DockComponent {
    pub fn new() -> Self {
        Self { view: None }
    }

    fn build_trigger(ctx: &ComponentContext, position: DockPosition) -> LayerWindow {
        let trigger = LayerWindow::new(&ctx.app, LayerConfig::dock_trigger(position));
        let strip = GtkBox::new(Orientation::Horizontal, 0);
        strip.add_css_class("dock-trigger");
        if position.is_vertical() {
            strip.set_size_request(TRIGGER_SIZE, -1);
        } else {
            strip.set_size_request(-1, TRIGGER_SIZE);
        }
        trigger.set_child(Some(&strip));
        trigger
    }

    fn connect_hover(view: &Rc<DockView>) {
        let Some(trigger) = &view.trigger else {
            return;
        };

        let motion = EventControllerMotion::new();
        let v = view.clone();
        motion.connect_enter(move |_, _, _| {
            v.reveal();
            // Hide again if the pointer never reaches the dock
            v.schedule_hide();
        });
        trigger.add_controller(motion);

        let motion = EventControllerMotion::new();
        let v = view.clone();
        motion.connect_enter(move |_, _, _| v.hide_timer.cancel());
        let v = view.clone();
        motion.connect_leave(move |_| v.schedule_hide());
        view.window.add_controller(motion);
    }
}

impl Default for DockComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for DockComponent {
    fn id(&self) -> ComponentId {
        ComponentId::Dock
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.view.is_some() {
            return;
        }

        let config = ctx.config().dock;
        if !config.enabled {
            info!("Dock disabled in config");
            return;
        }

        let vertical = config.position.is_vertical();
        let window = LayerWindow::new(
            &ctx.app,
            LayerConfig::dock(config.position, config.auto_hide),
        );

        let wrapper = GtkBox::new(Orientation::Horizontal, 0);
        wrapper.add_css_class("dock-wrapper");
        let container = GtkBox::new(
            if vertical {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            },
            0,
        );
        container.add_css_class("dock-container");
        container.set_halign(Align::Center);
        container.set_valign(Align::Center);
        wrapper.append(&container);
        window.set_child(Some(&wrapper));
        ctx.visibility.track(ComponentId::Dock, window.window());

        let trigger = config
            .auto_hide
            .then(|| Self::build_trigger(&ctx, config.position));

        let state = DockState::new(AppResolver::new(), &config.favorites);
        let view = Rc::new(DockView {
            ctx,
            window,
            trigger,
            container,
            state: RefCell::new(state),
            buttons: RefCell::new(AHashMap::new()),
            order: RefCell::new(Vec::new()),
            vertical,
            icon_size: Cell::new(config.icon_size),
            hide_delay: Cell::new(Duration::from_millis(config.hide_delay_ms)),
            hide_timer: Debouncer::new(),
        });

        let initial: Vec<_> = view
            .state
            .borrow()
            .items_ordered()
            .enumerate()
            .map(|(index, item)| DockDiff::Add {
                index,
                item: item.clone(),
            })
            .collect();
        for diff in initial {
            view.apply_diff(diff);
        }

        Self::connect_hover(&view);
        info!(
            "Dock ready with {} favorites (auto-hide: {})",
            view.order.borrow().len(),
            config.auto_hide
        );
        self.view = Some(view);
    }

    fn show(&self) {
        let Some(view) = &self.view else {
            return;
        };
        if let Some(trigger) = &view.trigger {
            trigger.present();
        }
        view.reveal();
        view.schedule_hide();
    }

    fn hide(&self) {
        if let Some(view) = &self.view {
            view.hide_timer.cancel();
            view.window.hide();
        }
    }

    fn is_visible(&self) -> bool {
        self.view.as_ref().is_some_and(|v| v.window.is_visible())
    }

    fn handle_event(&self, event: &ShellEvent) {
        if let Some(view) = &self.view {
            view.handle_event(event);
        }
    }

    fn shutdown(&self) {
        if let Some(view) = &self.view {
            view.hide_timer.cancel();
        }
    }
}
