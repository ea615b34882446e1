use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Image, Label, Orientation, Popover, Scale};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use kaneru_core::services::display::{
    brightness_icon_name, fraction_to_kelvin, kelvin_to_fraction, DisplayState,
};
use kaneru_core::{ComponentId, DisplayConfig, ShellCommand, ShellEvent};

use super::frame::{section_title, toggle_button, PopoverFrame};
use crate::common::{send_command, set_class, Component, ComponentContext, Debouncer};

const SLIDER_DELAY: Duration = Duration::from_millis(80);

struct DisplayView {
    ctx: ComponentContext,
    brightness_row: GtkBox,
    brightness_icon: Image,
    brightness: Scale,
    night_light: Button,
    temperature: Scale,
    temperature_label: Label,
    dark_mode: Button,
    night_light_enabled: Cell<bool>,
    dark_mode_enabled: Cell<bool>,
    /// Kelvin; kept locally while night light is off
    kelvin: Cell<u32>,
    range: Cell<(u32, u32)>,
    brightness_debounce: Debouncer,
    temperature_debounce: Debouncer,
}

impl DisplayView {
    fn update(&self, state: &DisplayState) {
        match state.brightness {
            Some(percent) => {
                self.brightness_row.set_visible(true);
                self.brightness_icon
                    .set_icon_name(Some(brightness_icon_name(percent)));
                if !self.brightness_debounce.is_pending() {
                    self.brightness.set_value(f64::from(percent));
                }
            }
            None => self.brightness_row.set_visible(false),
        }

        self.night_light_enabled.set(state.night_light_enabled);
        set_class(&self.night_light, "active", state.night_light_enabled);

        if state.night_light_enabled && !self.temperature_debounce.is_pending() {
            self.set_kelvin(state.temperature);
        }

        self.dark_mode_enabled.set(state.dark_mode);
        set_class(&self.dark_mode, "active", state.dark_mode);
    }

    fn set_kelvin(&self, kelvin: u32) {
        let (min, max) = self.range.get();
        self.kelvin.set(kelvin);
        self.temperature.set_value(kelvin_to_fraction(kelvin, min, max));
        self.temperature_label.set_text(&format!("{}K", kelvin));
    }

    fn set_range(&self, config: &DisplayConfig) {
        let min = config.min_temperature;
        self.range.set((min, config.max_temperature.max(min)));
        self.set_kelvin(self.kelvin.get());
    }
}

/// Brightness, night light temperature and dark mode
pub struct DisplayPopover {
    frame: Option<PopoverFrame>,
    view: Option<Rc<DisplayView>>,
}

impl DisplayPopover {
    pub fn new() -> Self {
        Self {
            frame: None,
            view: None,
        }
    }

    pub fn popover(&self) -> Option<&Popover> {
        self.frame.as_ref().map(|f| &f.popover)
    }

    fn build(frame: &PopoverFrame, ctx: ComponentContext) -> Rc<DisplayView> {
        let config = ctx.config().display;

        frame.append(&section_title("Brightness"));
        let brightness_row = GtkBox::new(Orientation::Horizontal, 8);
        let brightness_icon = Image::from_icon_name(brightness_icon_name(100));
        brightness_row.append(&brightness_icon);
        let brightness = Scale::with_range(Orientation::Horizontal, 0.0, 100.0, 1.0);
        brightness.add_css_class("brightness-slider");
        brightness.set_draw_value(false);
        brightness.set_hexpand(true);
        brightness_row.append(&brightness);
        frame.append(&brightness_row);

        frame.append(&section_title("Night light"));
        let (night_light, _) = toggle_button("night-light-symbolic", "Night Light");
        night_light.add_css_class("night-light-button");
        frame.append(&night_light);

        let temperature_row = GtkBox::new(Orientation::Horizontal, 8);
        let temperature = Scale::with_range(Orientation::Horizontal, 0.0, 1.0, 0.01);
        temperature.add_css_class("temperature-slider");
        temperature.set_draw_value(false);
        temperature.set_hexpand(true);
        temperature_row.append(&temperature);
        let temperature_label = Label::new(None);
        temperature_label.add_css_class("dim-label");
        temperature_label.set_halign(Align::End);
        temperature_row.append(&temperature_label);
        frame.append(&temperature_row);

        frame.append(&section_title("Appearance"));
        let (dark_mode, _) = toggle_button("weather-clear-night-symbolic", "Dark Mode");
        frame.append(&dark_mode);

        let min = config.min_temperature;
        let view = Rc::new(DisplayView {
            ctx,
            brightness_row,
            brightness_icon,
            brightness: brightness.clone(),
            night_light: night_light.clone(),
            temperature: temperature.clone(),
            temperature_label,
            dark_mode: dark_mode.clone(),
            night_light_enabled: Cell::new(false),
            dark_mode_enabled: Cell::new(false),
            kelvin: Cell::new(config.default_temperature),
            range: Cell::new((min, config.max_temperature.max(min))),
            brightness_debounce: Debouncer::new(),
            temperature_debounce: Debouncer::new(),
        });
        view.set_range(&config);

        // change-value only fires for user input, not for set_value
        let v = view.clone();
        brightness.connect_change_value(move |_, _, value| {
            let percent = value.round().clamp(0.0, 100.0) as u8;
            v.brightness_icon
                .set_icon_name(Some(brightness_icon_name(percent)));
            let tx = v.ctx.command_tx.clone();
            v.brightness_debounce.schedule(SLIDER_DELAY, move || {
                send_command(&tx, ShellCommand::SetBrightness(percent));
            });
            glib::Propagation::Proceed
        });

        let v = view.clone();
        temperature.connect_change_value(move |_, _, value| {
            let (min, max) = v.range.get();
            let kelvin = fraction_to_kelvin(value, min, max);
            v.kelvin.set(kelvin);
            v.temperature_label.set_text(&format!("{}K", kelvin));

            // While off the value is only remembered for the next enable
            if v.night_light_enabled.get() {
                let tx = v.ctx.command_tx.clone();
                v.temperature_debounce.schedule(SLIDER_DELAY, move || {
                    send_command(
                        &tx,
                        ShellCommand::SetNightLight {
                            enabled: true,
                            temperature: kelvin,
                        },
                    );
                });
            }
            glib::Propagation::Proceed
        });

        let v = view.clone();
        night_light.connect_clicked(move |_| {
            v.ctx.send_command(ShellCommand::SetNightLight {
                enabled: !v.night_light_enabled.get(),
                temperature: v.kelvin.get(),
            });
        });

        let v = view.clone();
        dark_mode.connect_clicked(move |_| {
            v.ctx
                .send_command(ShellCommand::SetDarkMode(!v.dark_mode_enabled.get()));
        });

        view
    }
}

impl Default for DisplayPopover {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for DisplayPopover {
    fn id(&self) -> ComponentId {
        ComponentId::Display
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.frame.is_some() {
            return;
        }

        let frame = PopoverFrame::new("Display");
        frame.add_settings_button(ctx.config().display.settings_command, &ctx);
        let view = Self::build(&frame, ctx);

        let v = view.clone();
        frame.popover.connect_show(move |_| {
            v.ctx.send_command(ShellCommand::RefreshDisplay);
        });

        self.view = Some(view);
        self.frame = Some(frame);
    }

    fn show(&self) {
        if let Some(frame) = &self.frame {
            frame.popover.popup();
        }
    }

    fn hide(&self) {
        if let Some(frame) = &self.frame {
            frame.popover.popdown();
        }
    }

    fn is_visible(&self) -> bool {
        self.frame
            .as_ref()
            .is_some_and(|f| f.popover.is_visible())
    }

    fn handle_event(&self, event: &ShellEvent) {
        let Some(view) = &self.view else {
            return;
        };

        match event {
            ShellEvent::DisplayUpdated(state) => view.update(state),
            ShellEvent::ConfigReloaded(config) => view.set_range(&config.display),
            _ => {}
        }
    }

    fn shutdown(&self) {
        if let Some(view) = &self.view {
            view.brightness_debounce.cancel();
            view.temperature_debounce.cancel();
        }
    }
}
