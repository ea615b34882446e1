use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Label, Orientation, Popover};

use kaneru_core::ShellCommand;

use crate::common::ComponentContext;

/// Popover with the shared header and content box
pub struct PopoverFrame {
    pub popover: Popover,
    pub content: GtkBox,
    header: GtkBox,
}

impl PopoverFrame {
    pub fn new(title: &str) -> Self {
        let popover = Popover::new();
        popover.set_has_arrow(false);
        popover.set_autohide(true);

        let content = GtkBox::new(Orientation::Vertical, 6);
        content.add_css_class("popover-content");

        let header = GtkBox::new(Orientation::Horizontal, 6);
        header.add_css_class("popover-header");

        let title = Label::new(Some(title));
        title.add_css_class("popover-title");
        title.set_halign(Align::Start);
        title.set_hexpand(true);
        header.append(&title);

        content.append(&header);
        popover.set_child(Some(&content));

        Self {
            popover,
            content,
            header,
        }
    }

    /// Header button that closes the popover and runs `command`
    pub fn add_settings_button(&self, command: Option<String>, ctx: &ComponentContext) {
        let Some(command) = command.filter(|c| !c.trim().is_empty()) else {
            return;
        };

        let button = Button::from_icon_name("emblem-system-symbolic");
        button.add_css_class("settings-button");
        button.set_tooltip_text(Some("Settings"));

        let popover = self.popover.clone();
        let ctx = ctx.clone();
        button.connect_clicked(move |_| {
            popover.popdown();
            ctx.send_command(ShellCommand::LaunchApp(command.as_str().into()));
        });
        self.header.append(&button);
    }

    pub fn append(&self, widget: &impl IsA<gtk4::Widget>) {
        self.content.append(widget);
    }
}

pub fn section_title(text: &str) -> Label {
    let label = Label::new(Some(text));
    label.add_css_class("section-title");
    label.set_halign(Align::Start);
    label
}

/// `title ........ value` row; returns the row and its value label
pub fn detail_row(title: &str) -> (GtkBox, Label) {
    let row = GtkBox::new(Orientation::Horizontal, 12);
    row.add_css_class("detail-row");

    let name = Label::new(Some(title));
    name.add_css_class("dim-label");
    name.set_halign(Align::Start);
    name.set_hexpand(true);
    row.append(&name);

    let value = Label::new(None);
    value.add_css_class("detail-value");
    value.set_halign(Align::End);
    row.append(&value);

    (row, value)
}

/// Flat button with an icon and a label, styled as an on/off toggle
pub fn toggle_button(icon: &str, text: &str) -> (Button, Label) {
    let button = Button::new();
    button.add_css_class("toggle-button");

    let inner = GtkBox::new(Orientation::Horizontal, 6);
    inner.append(&gtk4::Image::from_icon_name(icon));
    let label = Label::new(Some(text));
    inner.append(&label);
    button.set_child(Some(&inner));

    (button, label)
}
