use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Image, Orientation};

use kaneru_core::DockItem;

use crate::common::set_class;

/// Button for one dock entry: icon plus the open/active indicator
pub struct DockButton {
    pub button: Button,
    icon: Image,
}

impl DockButton {
    pub fn new(item: &DockItem, icon_size: i32, vertical: bool) -> Self {
        let button = Button::new();
        button.add_css_class("dock-item");
        button.set_has_frame(false);
        button.set_tooltip_text(Some(&item.name));

        // The indicator sits on the side facing the screen edge
        let layout = GtkBox::new(
            if vertical {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            },
            0,
        );

        let icon = Image::from_icon_name(&item.icon);
        icon.set_pixel_size(icon_size);
        layout.append(&icon);

        let indicator = GtkBox::new(Orientation::Horizontal, 0);
        indicator.add_css_class("indicator");
        indicator.set_halign(Align::Center);
        indicator.set_valign(Align::Center);
        layout.append(&indicator);

        button.set_child(Some(&layout));

        let dock_button = Self { button, icon };
        dock_button.set_state(item.open, item.active);
        dock_button
    }

    pub fn set_state(&self, open: bool, active: bool) {
        set_class(&self.button, "open", open);
        set_class(&self.button, "active", active);
    }

    pub fn set_icon_size(&self, size: i32) {
        self.icon.set_pixel_size(size);
    }
}
