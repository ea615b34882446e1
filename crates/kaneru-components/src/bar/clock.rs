use gtk4::prelude::*;
use gtk4::Label;
use std::cell::RefCell;
use std::rc::Rc;

/// Clock label refreshed on a timer matching the format's resolution
pub struct Clock {
    label: Label,
    format: Rc<RefCell<String>>,
    timer: RefCell<Option<glib::SourceId>>,
}

impl Clock {
    pub fn new(format: &str, interval_secs: u64) -> Self {
        let label = Label::new(None);
        label.add_css_class("clock-label");

        let clock = Self {
            label,
            format: Rc::new(RefCell::new(format.to_string())),
            timer: RefCell::new(None),
        };
        clock.update();
        clock.start(interval_secs);
        clock
    }

    pub fn widget(&self) -> &Label {
        &self.label
    }

    fn update(&self) {
        render(&self.label, &self.format.borrow());
    }

    fn start(&self, interval_secs: u64) {
        self.stop();

        let label = self.label.clone();
        let format = self.format.clone();
        let interval = u32::try_from(interval_secs.max(1)).unwrap_or(u32::MAX);
        let id = glib::timeout_add_seconds_local(interval, move || {
            render(&label, &format.borrow());
            glib::ControlFlow::Continue
        });
        *self.timer.borrow_mut() = Some(id);
    }

    /// Apply a new format and its refresh interval
    pub fn reconfigure(&self, format: &str, interval_secs: u64) {
        *self.format.borrow_mut() = format.to_string();
        self.update();
        self.start(interval_secs);
    }

    pub fn stop(&self) {
        if let Some(id) = self.timer.borrow_mut().take() {
            id.remove();
        }
    }
}

fn render(label: &Label, format: &str) {
    let now = chrono::Local::now();
    let mut text = String::new();
    // chrono reports bad format strings through fmt::Error
    if std::fmt::Write::write_fmt(&mut text, format_args!("{}", now.format(format))).is_err() {
        text = now.format("%H:%M").to_string();
    }
    label.set_text(&text);
}
