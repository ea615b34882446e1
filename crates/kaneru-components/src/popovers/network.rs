use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, Image, Label, Orientation, PasswordEntry, PolicyType, Popover,
    Revealer, RevealerTransitionType, ScrolledWindow,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

use kaneru_core::services::network::{AccessPoint, WifiDetails, DISABLED_ICON};
use kaneru_core::{ComponentId, ShellCommand, ShellEvent};

use super::frame::{detail_row, section_title, toggle_button, PopoverFrame};
use crate::common::{clear_children, set_class, Component, ComponentContext};

const LIST_HEIGHT: i32 = 260;

/// Widgets and transient UI state shared with signal handlers
struct NetworkView {
    ctx: ComponentContext,
    wifi_button: Button,
    airplane_button: Button,
    current_icon: Image,
    current_label: Label,
    current_details: GtkBox,
    signal: Label,
    frequency: Label,
    bitrate: Label,
    disconnect_button: Button,
    error: Label,
    list_revealer: Revealer,
    expand_icon: Image,
    list: GtkBox,
    wifi_enabled: Cell<bool>,
    airplane: Cell<bool>,
    /// SSID whose password prompt is open; list rebuilds wait until it closes
    prompt: RefCell<Option<String>>,
    deferred: RefCell<Option<Vec<AccessPoint>>>,
    /// Periodic scanning requested from the network service
    scanning: Cell<bool>,
}

impl NetworkView {
    fn send(&self, cmd: ShellCommand) {
        self.ctx.send_command(cmd);
    }

    fn update_wifi(&self, details: &WifiDetails) {
        self.wifi_enabled.set(details.enabled);
        set_class(&self.wifi_button, "active", details.enabled);

        self.current_icon.set_icon_name(Some(details.icon_name));
        self.current_label.set_text(&details.label());
        self.current_details.set_visible(details.connected);
        self.disconnect_button.set_visible(details.connected);

        self.signal.set_text(
            &details
                .strength
                .map(|s| format!("{}%", s))
                .unwrap_or_else(|| "N/A".to_string()),
        );
        self.frequency.set_text(
            &details
                .frequency
                .map(|f| format!("{} MHz", f))
                .unwrap_or_else(|| "N/A".to_string()),
        );
        self.bitrate.set_text(
            &details
                .bitrate
                .map(|b| format!("{} Mbit/s", b))
                .unwrap_or_else(|| "N/A".to_string()),
        );

        if !details.enabled {
            self.collapse();
            clear_children(&self.list);
        }
    }

    fn update_airplane(&self, enabled: bool) {
        self.airplane.set(enabled);
        set_class(&self.airplane_button, "active", enabled);
        if enabled {
            self.current_icon.set_icon_name(Some(DISABLED_ICON));
        }
    }

    fn show_error(&self, message: &str) {
        self.error.set_text(message);
        self.error.set_visible(true);
    }

    fn clear_error(&self) {
        self.error.set_visible(false);
    }

    fn update_access_points(self: &Rc<Self>, access_points: Vec<AccessPoint>) {
        if self.prompt.borrow().is_some() {
            *self.deferred.borrow_mut() = Some(access_points);
            return;
        }

        clear_children(&self.list);

        if access_points.is_empty() {
            let empty = Label::new(Some("No networks found"));
            empty.add_css_class("dim-label");
            self.list.append(&empty);
            return;
        }

        for ap in access_points {
            self.list.append(&self.access_point_row(ap));
        }
    }

    fn access_point_row(self: &Rc<Self>, ap: AccessPoint) -> GtkBox {
        let container = GtkBox::new(Orientation::Vertical, 0);

        let button = Button::new();
        button.add_css_class("network-item");
        set_class(&button, "active", ap.active);

        let row = GtkBox::new(Orientation::Horizontal, 8);
        row.append(&Image::from_icon_name(ap.icon_name));

        let name = Label::new(Some(&ap.ssid));
        name.add_css_class("network-item-name");
        name.set_halign(Align::Start);
        name.set_hexpand(true);
        name.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        row.append(&name);

        if ap.secured {
            row.append(&Image::from_icon_name("network-wireless-encrypted-symbolic"));
        }

        let strength = Label::new(Some(&format!("{}%", ap.strength)));
        strength.add_css_class("dim-label");
        row.append(&strength);
        button.set_child(Some(&row));
        container.append(&button);

        if ap.active {
            let forget = Button::with_label("Forget");
            forget.add_css_class("settings-button");
            forget.set_halign(Align::End);
            let view = self.clone();
            let ssid = ap.ssid.clone();
            forget.connect_clicked(move |_| {
                view.send(ShellCommand::ForgetNetwork(ssid.clone()));
            });
            container.append(&forget);
            return container;
        }

        let prompt = Revealer::new();
        prompt.set_transition_type(RevealerTransitionType::SlideDown);
        let prompt_box = GtkBox::new(Orientation::Horizontal, 6);
        prompt_box.add_css_class("network-password");

        let entry = PasswordEntry::new();
        entry.set_show_peek_icon(true);
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Password (empty for saved)"));
        prompt_box.append(&entry);

        let connect = Button::with_label("Connect");
        connect.add_css_class("toggle-button");
        prompt_box.append(&connect);
        prompt.set_child(Some(&prompt_box));
        container.append(&prompt);

        let submit = {
            let view = self.clone();
            let entry = entry.clone();
            let ssid = ap.ssid.clone();
            move || {
                let password = entry.text().to_string();
                view.close_prompt();
                view.connect(&ssid, (!password.is_empty()).then_some(password));
            }
        };
        let submit = Rc::new(submit);

        let on_click = submit.clone();
        connect.connect_clicked(move |_| on_click());
        entry.connect_activate(move |_| submit());

        let view = self.clone();
        let ssid = ap.ssid.clone();
        let secured = ap.secured;
        button.connect_clicked(move |_| {
            if !secured {
                view.connect(&ssid, None);
                return;
            }

            let open = !prompt.reveals_child();
            prompt.set_reveal_child(open);
            if open {
                *view.prompt.borrow_mut() = Some(ssid.clone());
                entry.grab_focus();
            } else {
                view.close_prompt();
            }
        });

        container
    }

    fn connect(&self, ssid: &str, password: Option<String>) {
        debug!("Connecting to {}", ssid);
        self.clear_error();
        self.current_label.set_text(&format!("Connecting to {}...", ssid));
        self.send(ShellCommand::ConnectNetwork {
            ssid: ssid.to_string(),
            password,
        });
    }

    fn close_prompt(self: &Rc<Self>) {
        self.prompt.borrow_mut().take();
        let deferred = self.deferred.borrow_mut().take();
        if let Some(access_points) = deferred {
            self.update_access_points(access_points);
        }
    }

    fn expand(&self) {
        self.list_revealer.set_reveal_child(true);
        self.expand_icon.set_icon_name(Some("pan-up-symbolic"));
        if !self.scanning.replace(true) {
            self.send(ShellCommand::SetNetworkScanning(true));
        }
    }

    fn collapse(&self) {
        self.list_revealer.set_reveal_child(false);
        self.expand_icon.set_icon_name(Some("pan-down-symbolic"));
        if self.scanning.replace(false) {
            self.send(ShellCommand::SetNetworkScanning(false));
        }
    }
}

/// Wi-Fi state, airplane mode and the access point list
pub struct NetworkPopover {
    frame: Option<PopoverFrame>,
    view: Option<Rc<NetworkView>>,
}

impl NetworkPopover {
    pub fn new() -> Self {
        Self {
            frame: None,
            view: None,
        }
    }

    pub fn popover(&self) -> Option<&Popover> {
        self.frame.as_ref().map(|f| &f.popover)
    }

    fn build(frame: &PopoverFrame, ctx: ComponentContext) -> Rc<NetworkView> {
        let toggles = GtkBox::new(Orientation::Horizontal, 6);
        toggles.add_css_class("network-toggles");
        toggles.set_homogeneous(true);
        let (wifi_button, _) = toggle_button("network-wireless-symbolic", "Wi-Fi");
        let (airplane_button, _) = toggle_button("airplane-mode-symbolic", "Airplane");
        toggles.append(&wifi_button);
        toggles.append(&airplane_button);
        frame.append(&toggles);

        let current = GtkBox::new(Orientation::Vertical, 4);
        current.add_css_class("network-current");
        let header = GtkBox::new(Orientation::Horizontal, 8);
        let current_icon = Image::from_icon_name(DISABLED_ICON);
        header.append(&current_icon);
        let current_label = Label::new(Some("Not connected"));
        current_label.add_css_class("detail-value");
        current_label.set_halign(Align::Start);
        current_label.set_hexpand(true);
        current_label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        header.append(&current_label);
        let disconnect_button = Button::from_icon_name("network-offline-symbolic");
        disconnect_button.add_css_class("settings-button");
        disconnect_button.set_tooltip_text(Some("Disconnect"));
        disconnect_button.set_visible(false);
        header.append(&disconnect_button);
        current.append(&header);

        let current_details = GtkBox::new(Orientation::Vertical, 0);
        let (row, signal) = detail_row("Signal");
        current_details.append(&row);
        let (row, frequency) = detail_row("Frequency");
        current_details.append(&row);
        let (row, bitrate) = detail_row("Bitrate");
        current_details.append(&row);
        current_details.set_visible(false);
        current.append(&current_details);
        frame.append(&current);

        let error = Label::new(None);
        error.add_css_class("network-error");
        error.set_wrap(true);
        error.set_halign(Align::Start);
        error.set_visible(false);
        frame.append(&error);

        let expander = Button::new();
        expander.add_css_class("settings-button");
        let expander_box = GtkBox::new(Orientation::Horizontal, 6);
        let title = section_title("Available networks");
        title.set_hexpand(true);
        expander_box.append(&title);
        let expand_icon = Image::from_icon_name("pan-down-symbolic");
        expander_box.append(&expand_icon);
        expander.set_child(Some(&expander_box));
        frame.append(&expander);

        let list = GtkBox::new(Orientation::Vertical, 0);
        list.add_css_class("network-list");
        let scroll = ScrolledWindow::new();
        scroll.set_policy(PolicyType::Never, PolicyType::Automatic);
        scroll.set_min_content_height(LIST_HEIGHT);
        scroll.set_child(Some(&list));

        let list_revealer = Revealer::new();
        list_revealer.set_transition_type(RevealerTransitionType::SlideDown);
        list_revealer.set_child(Some(&scroll));
        frame.append(&list_revealer);

        let view = Rc::new(NetworkView {
            ctx,
            wifi_button: wifi_button.clone(),
            airplane_button: airplane_button.clone(),
            current_icon,
            current_label,
            current_details,
            signal,
            frequency,
            bitrate,
            disconnect_button: disconnect_button.clone(),
            error,
            list_revealer,
            expand_icon,
            list,
            wifi_enabled: Cell::new(false),
            airplane: Cell::new(false),
            prompt: RefCell::new(None),
            deferred: RefCell::new(None),
            scanning: Cell::new(false),
        });

        let v = view.clone();
        wifi_button.connect_clicked(move |_| {
            v.clear_error();
            v.send(ShellCommand::SetWifiEnabled(!v.wifi_enabled.get()));
        });

        let v = view.clone();
        airplane_button.connect_clicked(move |_| {
            v.clear_error();
            v.send(ShellCommand::SetAirplaneMode(!v.airplane.get()));
        });

        let v = view.clone();
        disconnect_button.connect_clicked(move |_| {
            v.send(ShellCommand::DisconnectNetwork);
        });

        let v = view.clone();
        expander.connect_clicked(move |_| {
            if v.list_revealer.reveals_child() {
                v.collapse();
            } else if v.wifi_enabled.get() {
                v.expand();
            }
        });

        view
    }
}

impl Default for NetworkPopover {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for NetworkPopover {
    fn id(&self) -> ComponentId {
        ComponentId::Network
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.frame.is_some() {
            return;
        }

        let frame = PopoverFrame::new("Network");
        frame.add_settings_button(ctx.config().network.settings_command, &ctx);
        let view = Self::build(&frame, ctx);

        let v = view.clone();
        frame.popover.connect_show(move |_| {
            v.clear_error();
            v.send(ShellCommand::RefreshNetwork);
        });

        let v = view.clone();
        frame.popover.connect_closed(move |_| {
            v.collapse();
            v.close_prompt();
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
            ShellEvent::NetworkUpdated(details) => view.update_wifi(details),
            ShellEvent::AirplaneModeUpdated(enabled) => view.update_airplane(*enabled),
            ShellEvent::AccessPointsUpdated(access_points) => {
                view.update_access_points(access_points.clone());
            }
            ShellEvent::NetworkError(message) => view.show_error(message),
            _ => {}
        }
    }

    fn shutdown(&self) {
        if let Some(view) = &self.view {
            view.collapse();
        }
    }
}
