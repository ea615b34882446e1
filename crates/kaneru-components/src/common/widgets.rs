use gtk4::prelude::*;
use gtk4::{Box as GtkBox, ListBox, Widget};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Add or remove a CSS class
pub fn set_class(widget: &impl IsA<Widget>, class: &str, enabled: bool) {
    if enabled {
        widget.add_css_class(class);
    } else {
        widget.remove_css_class(class);
    }
}

pub fn clear_children(container: &impl IsA<Widget>) {
    let container = container.as_ref();
    if let Some(list) = container.downcast_ref::<ListBox>() {
        while let Some(child) = list.first_child() {
            list.remove(&child);
        }
    } else if let Some(gtk_box) = container.downcast_ref::<GtkBox>() {
        while let Some(child) = gtk_box.first_child() {
            gtk_box.remove(&child);
        }
    }
}

/// One pending main-loop timeout; scheduling again replaces it.
///
/// Used for slider commands, dock auto-hide and notification expiry.
#[derive(Clone, Default)]
pub struct Debouncer {
    pending: Rc<RefCell<Option<glib::SourceId>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, delay: Duration, f: impl FnOnce() + 'static) {
        self.cancel();
        let pending = self.pending.clone();
        let id = glib::timeout_add_local_once(delay, move || {
            // Fired sources must not be removed again
            pending.borrow_mut().take();
            f();
        });
        *self.pending.borrow_mut() = Some(id);
    }

    pub fn cancel(&self) {
        if let Some(id) = self.pending.borrow_mut().take() {
            id.remove();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}
