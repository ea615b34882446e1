use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Image, Label, Orientation, Popover};
use std::cell::Cell;
use std::rc::Rc;

use kaneru_core::services::battery::{
    format_charge_status, format_time, BatteryDetails, ChargeState, PowerProfile, MISSING_ICON,
};
use kaneru_core::{ComponentId, ShellCommand, ShellEvent};

use super::frame::{detail_row, section_title, PopoverFrame};
use crate::common::{clear_children, send_command, set_class, Component, ComponentContext};

struct Widgets {
    icon: Image,
    percentage: Label,
    status: Label,
    details: GtkBox,
    time: Label,
    rate: Label,
    voltage: Label,
    health: Label,
    cycles: Label,
    power_modes: GtkBox,
    conservation_row: GtkBox,
    conservation_button: Button,
}

/// Battery level, details, power profiles and conservation mode
pub struct BatteryPopover {
    frame: Option<PopoverFrame>,
    widgets: Option<Rc<Widgets>>,
    ctx: Option<ComponentContext>,
    conservation: Rc<Cell<bool>>,
}

impl BatteryPopover {
    pub fn new() -> Self {
        Self {
            frame: None,
            widgets: None,
            ctx: None,
            conservation: Rc::new(Cell::new(false)),
        }
    }

    /// The popover to attach to the bar button (after `init`)
    pub fn popover(&self) -> Option<&Popover> {
        self.frame.as_ref().map(|f| &f.popover)
    }

    fn build(&self, frame: &PopoverFrame, ctx: &ComponentContext) -> Widgets {
        let summary = GtkBox::new(Orientation::Horizontal, 12);

        let icon = Image::from_icon_name(MISSING_ICON);
        icon.add_css_class("battery-large-icon");
        summary.append(&icon);

        let text = GtkBox::new(Orientation::Vertical, 2);
        text.set_valign(Align::Center);
        let percentage = Label::new(Some("--%"));
        percentage.add_css_class("battery-percentage");
        percentage.set_halign(Align::Start);
        let status = Label::new(Some(&format_charge_status(None)));
        status.add_css_class("battery-status");
        status.set_halign(Align::Start);
        text.append(&percentage);
        text.append(&status);
        summary.append(&text);
        frame.append(&summary);

        let details = GtkBox::new(Orientation::Vertical, 0);
        let (row, time) = detail_row("Time left");
        details.append(&row);
        let (row, rate) = detail_row("Energy rate");
        details.append(&row);
        let (row, voltage) = detail_row("Voltage");
        details.append(&row);
        let (row, health) = detail_row("Health");
        details.append(&row);
        let (row, cycles) = detail_row("Cycles");
        details.append(&row);
        frame.append(&details);

        frame.append(&section_title("Power mode"));
        let power_modes = GtkBox::new(Orientation::Horizontal, 6);
        power_modes.add_css_class("power-mode-box");
        power_modes.set_homogeneous(true);
        frame.append(&power_modes);

        let conservation_row = GtkBox::new(Orientation::Horizontal, 12);
        conservation_row.add_css_class("conservation-row");
        let label = Label::new(Some("Conservation mode"));
        label.set_halign(Align::Start);
        label.set_hexpand(true);
        conservation_row.append(&label);

        let conservation_button = Button::with_label("Off");
        conservation_button.add_css_class("toggle-button");
        let conservation = self.conservation.clone();
        let tx = ctx.command_tx.clone();
        conservation_button.connect_clicked(move |_| {
            send_command(&tx, ShellCommand::SetConservationMode(!conservation.get()));
        });
        conservation_row.append(&conservation_button);
        conservation_row.set_visible(false);
        frame.append(&conservation_row);

        Widgets {
            icon,
            percentage,
            status,
            details,
            time,
            rate,
            voltage,
            health,
            cycles,
            power_modes,
            conservation_row,
            conservation_button,
        }
    }

    fn update_battery(widgets: &Widgets, details: Option<&BatteryDetails>) {
        widgets.status.set_text(&format_charge_status(details));

        let Some(details) = details else {
            widgets.icon.set_icon_name(Some(MISSING_ICON));
            widgets.percentage.set_text("--%");
            widgets.details.set_visible(false);
            return;
        };

        widgets.icon.set_icon_name(Some(details.icon_name));
        widgets
            .percentage
            .set_text(&format!("{}%", details.percentage.round() as u8));
        widgets.details.set_visible(true);

        let remaining = match details.state {
            ChargeState::Charging => details.time_to_full,
            _ => details.time_to_empty,
        };
        let remaining = format_time(remaining);
        widgets
            .time
            .set_text(if remaining.is_empty() { "N/A" } else { remaining.as_str() });
        widgets
            .rate
            .set_text(&format!("{:.1} W", details.energy_rate_watts));
        widgets
            .voltage
            .set_text(&format!("{:.2} V", details.voltage_volts));
        widgets
            .health
            .set_text(&format!("{:.0}%", details.health_percentage));
        widgets.cycles.set_text(
            &details
                .cycle_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        );
    }

    fn update_profiles(
        widgets: &Widgets,
        ctx: &ComponentContext,
        active: Option<&PowerProfile>,
        available: &[PowerProfile],
    ) {
        clear_children(&widgets.power_modes);

        for profile in available {
            let button = Button::new();
            button.add_css_class("power-mode-button");
            set_class(&button, "active", active == Some(profile));
            button.set_tooltip_text(Some(profile.label()));

            let inner = GtkBox::new(Orientation::Vertical, 4);
            inner.append(&Image::from_icon_name(profile.icon_name()));
            inner.append(&Label::new(Some(profile.label())));
            button.set_child(Some(&inner));

            let tx = ctx.command_tx.clone();
            let profile = profile.clone();
            button.connect_clicked(move |_| {
                send_command(&tx, ShellCommand::SetPowerProfile(profile.clone()));
            });
            widgets.power_modes.append(&button);
        }

        widgets.power_modes.set_visible(!available.is_empty());
    }
}

impl Default for BatteryPopover {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for BatteryPopover {
    fn id(&self) -> ComponentId {
        ComponentId::Battery
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.frame.is_some() {
            return;
        }

        let frame = PopoverFrame::new("Battery");
        frame.add_settings_button(ctx.config().battery.settings_command, &ctx);

        let widgets = self.build(&frame, &ctx);

        let tx = ctx.command_tx.clone();
        frame.popover.connect_show(move |_| {
            send_command(&tx, ShellCommand::RefreshBattery);
        });

        self.widgets = Some(Rc::new(widgets));
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
        let (Some(widgets), Some(ctx)) = (&self.widgets, &self.ctx) else {
            return;
        };

        match event {
            ShellEvent::BatteryUpdated(details) => {
                Self::update_battery(widgets, details.as_ref());
            }
            ShellEvent::PowerProfilesUpdated { active, available } => {
                Self::update_profiles(widgets, ctx, active.as_ref(), available);
            }
            ShellEvent::ConservationModeUpdated(mode) => {
                widgets.conservation_row.set_visible(mode.is_some());
                let enabled = mode.unwrap_or(false);
                self.conservation.set(enabled);
                widgets
                    .conservation_button
                    .set_label(if enabled { "On" } else { "Off" });
                set_class(&widgets.conservation_button, "active", enabled);
            }
            _ => {}
        }
    }
}
