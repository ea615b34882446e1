use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Image, Label, Orientation, Popover, Scale};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use kaneru_core::services::audio::{
    microphone_icon_name, volume_icon_name, AudioDevice, AudioState, AudioTarget, VolumeLevel,
};
use kaneru_core::{ComponentId, ShellCommand, ShellEvent};

use super::frame::{section_title, PopoverFrame};
use crate::common::{clear_children, send_command, set_class, Component, ComponentContext, Debouncer};

const SLIDER_DELAY: Duration = Duration::from_millis(60);

/// Mute button, slider and percentage for one default node
struct VolumeRow {
    target: AudioTarget,
    row: GtkBox,
    mute: Button,
    slider: Scale,
    value: Label,
    muted: Cell<bool>,
    debounce: Debouncer,
}

impl VolumeRow {
    fn new(target: AudioTarget, max_volume: u8, ctx: &ComponentContext) -> Rc<Self> {
        let row = GtkBox::new(Orientation::Horizontal, 8);
        row.add_css_class("volume-row");

        let mute = Button::new();
        mute.add_css_class("mute-button");
        row.append(&mute);

        let slider = Scale::with_range(
            Orientation::Horizontal,
            0.0,
            f64::from(max_volume.max(1)),
            1.0,
        );
        slider.add_css_class("volume-slider");
        slider.set_draw_value(false);
        slider.set_hexpand(true);
        row.append(&slider);

        let value = Label::new(Some("0%"));
        value.add_css_class("dim-label");
        value.set_width_chars(4);
        value.set_halign(Align::End);
        row.append(&value);

        let volume = Rc::new(Self {
            target,
            row,
            mute: mute.clone(),
            slider: slider.clone(),
            value,
            muted: Cell::new(false),
            debounce: Debouncer::new(),
        });
        volume.set_icon(None);

        let v = volume.clone();
        let tx = ctx.command_tx.clone();
        mute.connect_clicked(move |_| {
            send_command(
                &tx,
                ShellCommand::SetMuted {
                    target: v.target,
                    muted: !v.muted.get(),
                },
            );
        });

        let v = volume.clone();
        let tx = ctx.command_tx.clone();
        slider.connect_change_value(move |_, _, value| {
            let percent = value.round().clamp(0.0, 255.0) as u8;
            v.value.set_text(&format!("{}%", percent));
            let tx = tx.clone();
            let target = v.target;
            v.debounce.schedule(SLIDER_DELAY, move || {
                send_command(&tx, ShellCommand::SetVolume { target, percent });
            });
            glib::Propagation::Proceed
        });

        volume
    }

    fn set_icon(&self, level: Option<VolumeLevel>) {
        let icon = match self.target {
            AudioTarget::Sink => volume_icon_name(level),
            AudioTarget::Source => microphone_icon_name(level),
        };
        self.mute.set_child(Some(&Image::from_icon_name(icon)));
    }

    fn update(&self, level: Option<VolumeLevel>) {
        self.row.set_sensitive(level.is_some());
        self.set_icon(level);

        let Some(level) = level else {
            self.muted.set(false);
            self.value.set_text("--");
            return;
        };

        self.muted.set(level.muted);
        set_class(&self.mute, "muted", level.muted);
        self.mute
            .set_tooltip_text(Some(if level.muted { "Unmute" } else { "Mute" }));

        if !self.debounce.is_pending() {
            self.slider.set_value(f64::from(level.percent));
            self.value.set_text(&format!("{}%", level.percent));
        }
    }

    fn set_max(&self, max_volume: u8) {
        self.slider.set_range(0.0, f64::from(max_volume.max(1)));
    }
}

struct AudioView {
    output: Rc<VolumeRow>,
    input: Rc<VolumeRow>,
    sinks: GtkBox,
    sources: GtkBox,
}

impl AudioView {
    fn update_devices(list: &GtkBox, devices: &[AudioDevice], ctx: &ComponentContext) {
        clear_children(list);

        if devices.is_empty() {
            let empty = Label::new(Some("No devices"));
            empty.add_css_class("dim-label");
            empty.set_halign(Align::Start);
            list.append(&empty);
            return;
        }

        for device in devices {
            let button = Button::new();
            button.add_css_class("device-item");
            set_class(&button, "active", device.is_default);

            let label = Label::new(Some(&device.name));
            label.set_halign(Align::Start);
            label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
            button.set_child(Some(&label));

            let id = device.id;
            let is_default = device.is_default;
            let tx = ctx.command_tx.clone();
            button.connect_clicked(move |_| {
                if !is_default {
                    send_command(&tx, ShellCommand::SetDefaultDevice(id));
                }
            });
            list.append(&button);
        }
    }
}

/// Output and input volume with device selection
pub struct AudioPopover {
    frame: Option<PopoverFrame>,
    view: Option<AudioView>,
    ctx: Option<ComponentContext>,
}

impl AudioPopover {
    pub fn new() -> Self {
        Self {
            frame: None,
            view: None,
            ctx: None,
        }
    }

    pub fn popover(&self) -> Option<&Popover> {
        self.frame.as_ref().map(|f| &f.popover)
    }
}

impl Default for AudioPopover {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AudioPopover {
    fn id(&self) -> ComponentId {
        ComponentId::Audio
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.frame.is_some() {
            return;
        }

        let config = ctx.config().audio;
        let frame = PopoverFrame::new("Sound");
        frame.add_settings_button(config.settings_command.clone(), &ctx);

        frame.append(&section_title("Output"));
        let output = VolumeRow::new(AudioTarget::Sink, config.max_volume, &ctx);
        frame.append(&output.row);

        frame.append(&section_title("Input"));
        let input = VolumeRow::new(AudioTarget::Source, config.max_volume, &ctx);
        frame.append(&input.row);

        frame.append(&section_title("Output devices"));
        let sinks = GtkBox::new(Orientation::Vertical, 0);
        sinks.add_css_class("device-list");
        frame.append(&sinks);

        frame.append(&section_title("Input devices"));
        let sources = GtkBox::new(Orientation::Vertical, 0);
        sources.add_css_class("device-list");
        frame.append(&sources);

        let tx = ctx.command_tx.clone();
        frame.popover.connect_show(move |_| {
            send_command(&tx, ShellCommand::RefreshAudio);
        });

        self.view = Some(AudioView {
            output,
            input,
            sinks,
            sources,
        });
        self.frame = Some(frame);
        self.ctx = Some(ctx);
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
        let (Some(view), Some(ctx)) = (&self.view, &self.ctx) else {
            return;
        };

        match event {
            ShellEvent::AudioUpdated(AudioState {
                output,
                input,
                sinks,
                sources,
            }) => {
                view.output.update(*output);
                view.input.update(*input);
                AudioView::update_devices(&view.sinks, sinks, ctx);
                AudioView::update_devices(&view.sources, sources, ctx);
            }
            ShellEvent::ConfigReloaded(config) => {
                view.output.set_max(config.audio.max_volume);
                view.input.set_max(config.audio.max_volume);
            }
            _ => {}
        }
    }

    fn shutdown(&self) {
        if let Some(view) = &self.view {
            view.output.debounce.cancel();
            view.input.debounce.cancel();
        }
    }
}
