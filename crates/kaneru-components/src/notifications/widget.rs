use ahash::AHashMap;
use gtk4_layer_shell::Edge;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info};

use kaneru_core::services::notifications::{CloseReason, Notification};
use kaneru_core::state::expire_after;
use kaneru_core::{ComponentId, NotificationConfig, NotificationStack, ShellCommand, ShellEvent};

use super::popup::Popup;
use crate::common::{Component, ComponentContext};

struct NotificationView {
    ctx: ComponentContext,
    config: RefCell<NotificationConfig>,
    stack: RefCell<NotificationStack>,
    popups: RefCell<AHashMap<u32, Popup>>,
    /// Popups are tracked but not shown while hidden
    hidden: Cell<bool>,
}

impl NotificationView {
    fn post(self: &Rc<Self>, notification: &Notification) {
        let config = self.config.borrow().clone();
        let outcome = self.stack.borrow_mut().push(notification);
        debug!(
            "Notification {} at {} (replaced {:?}, evicted {:?})",
            notification.id, outcome.index, outcome.replaced, outcome.evicted
        );

        if let Some(replaced) = outcome.replaced {
            if let Some(popup) = self.popups.borrow_mut().remove(&replaced) {
                popup.destroy();
            }
        }

        if let Some(evicted) = outcome.evicted {
            if let Some(popup) = self.popups.borrow_mut().remove(&evicted) {
                popup.dismiss();
            }
            self.ctx.send_command(ShellCommand::CloseNotification {
                id: evicted,
                reason: CloseReason::Expired,
            });
        }

        let popup = Popup::new(
            &self.ctx,
            notification,
            config.position,
            expire_after(notification, &config),
        );
        if !self.hidden.get() {
            popup.show(&self.ctx);
        }
        self.popups.borrow_mut().insert(notification.id, popup);

        self.relayout();
        // Heights settle after the first frame
        let v = self.clone();
        glib::idle_add_local_once(move || v.relayout());
    }

    fn close(&self, id: u32) {
        self.stack.borrow_mut().remove(id);
        if let Some(popup) = self.popups.borrow_mut().remove(&id) {
            popup.dismiss();
        }
        self.relayout();
    }

    /// Move every popup to the margin its stack position calls for
    fn relayout(&self) {
        let stack = self.stack.borrow();
        let popups = self.popups.borrow();
        let edge = if self.config.borrow().position.is_top() {
            Edge::Top
        } else {
            Edge::Bottom
        };

        let ordered: Vec<&Popup> = stack.ids().iter().filter_map(|id| popups.get(id)).collect();
        let heights: Vec<i32> = ordered.iter().map(|p| p.height()).collect();
        for (popup, margin) in ordered.iter().zip(stack.layout(&heights)) {
            popup.window.set_margin(edge, margin);
        }
    }

    fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
        for popup in self.popups.borrow().values() {
            popup.set_hidden(hidden, &self.ctx);
        }
        if !hidden {
            self.relayout();
        }
    }

    fn reconfigure(&self, config: &NotificationConfig) {
        if config.history_limit != self.config.borrow().history_limit {
            self.ctx
                .send_command(ShellCommand::SetHistoryLimit(config.history_limit));
        }
        self.stack.borrow_mut().set_config(config);
        *self.config.borrow_mut() = config.clone();
        self.relayout();
    }
}

/// Popup notifications stacked in a screen corner
pub struct NotificationComponent {
    view: Option<Rc<NotificationView>>,
}

impl NotificationComponent {
    pub fn new() -> Self {
        Self { view: None }
    }
}

impl Default for NotificationComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for NotificationComponent {
    fn id(&self) -> ComponentId {
        ComponentId::Notifications
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.view.is_some() {
            return;
        }

        let config = ctx.config().notification;
        info!(
            "Notification popups at {:?}, up to {} visible",
            config.position, config.max_visible
        );
        self.view = Some(Rc::new(NotificationView {
            stack: RefCell::new(NotificationStack::new(&config)),
            config: RefCell::new(config),
            popups: RefCell::new(AHashMap::new()),
            hidden: Cell::new(false),
            ctx,
        }));
    }

    fn show(&self) {
        if let Some(view) = &self.view {
            view.set_hidden(false);
        }
    }

    fn hide(&self) {
        if let Some(view) = &self.view {
            view.set_hidden(true);
        }
    }

    fn is_visible(&self) -> bool {
        self.view.as_ref().is_some_and(|v| !v.hidden.get())
    }

    fn handle_event(&self, event: &ShellEvent) {
        let Some(view) = &self.view else {
            return;
        };

        match event {
            ShellEvent::NotificationPosted(notification) => view.post(notification),
            ShellEvent::NotificationClosed { id, .. } => view.close(*id),
            ShellEvent::ConfigReloaded(config) => view.reconfigure(&config.notification),
            _ => {}
        }
    }

    fn shutdown(&self) {
        let Some(view) = &self.view else {
            return;
        };
        for id in view.stack.borrow_mut().clear() {
            if let Some(popup) = view.popups.borrow_mut().remove(&id) {
                popup.destroy();
            }
        }
    }
}
