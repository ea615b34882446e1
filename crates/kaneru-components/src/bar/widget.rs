use ahash::AHashSet;
use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, CenterBox, EventControllerScroll, EventControllerScrollFlags,
    Image, Label, MenuButton, Orientation, Popover, Widget,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

use kaneru_core::services::audio::{volume_icon_name, AudioTarget};
use kaneru_core::services::battery::{ChargeState, MISSING_ICON};
use kaneru_core::services::display::brightness_icon_name;
use kaneru_core::utils::{distro_icon_name, truncate_chars};
use kaneru_core::{ComponentId, ModuleType, ShellCommand, ShellConfig, ShellEvent};

use super::active_client::ActiveClient;
use super::clock::Clock;
use crate::common::{set_class, Component, ComponentContext, LayerConfig, LayerWindow, SharedComponent};
use crate::popovers::{
    AppMenuPopover, AudioPopover, BatteryPopover, CalendarPopover, DisplayPopover,
    NetworkPopover,
};

const LOW_BATTERY: f32 = 20.0;
const CRITICAL_BATTERY: f32 = 10.0;
const MEDIA_TITLE_CHARS: usize = 24;

/// Bar button showing an icon and an optional label
struct IconButton {
    button: MenuButton,
    icon: Image,
    label: Label,
}

impl IconButton {
    fn new(icon: &str, class: &str) -> Self {
        let button = MenuButton::new();
        button.add_css_class("bar-button");
        button.add_css_class(class);
        button.set_has_frame(false);

        let inner = GtkBox::new(Orientation::Horizontal, 4);
        let icon = Image::from_icon_name(icon);
        inner.append(&icon);
        let label = Label::new(None);
        label.set_visible(false);
        inner.append(&label);
        button.set_child(Some(&inner));

        Self {
            button,
            icon,
            label,
        }
    }

    /// Attach a popover and mirror its open state as `.active`
    fn attach(&self, ctx: &ComponentContext, id: ComponentId, popover: Option<&Popover>) {
        let Some(popover) = popover else {
            return;
        };
        self.button.set_popover(Some(popover));
        ctx.visibility.track(id, popover);

        let button = self.button.clone();
        popover.connect_show(move |_| button.add_css_class("active"));
        let button = self.button.clone();
        popover.connect_closed(move |_| button.remove_css_class("active"));
    }

    fn set_label(&self, text: &str) {
        self.label.set_text(text);
        self.label.set_visible(!text.is_empty());
    }
}

/// Widgets the bar keeps updating from service events
#[derive(Default)]
struct BarModules {
    window_title: Option<Label>,
    clock: Option<Clock>,
    battery: Option<IconButton>,
    network: Option<IconButton>,
    display: Option<IconButton>,
    audio: Option<IconButton>,
    media: Option<(Button, Label)>,
    active_client: RefCell<ActiveClient>,
    title_max: Cell<usize>,
    /// Last known levels, used for scroll adjustments
    volume: Rc<Cell<Option<u8>>>,
    brightness: Rc<Cell<Option<u8>>>,
}

impl BarModules {
    fn refresh_title(&self) {
        let Some(label) = &self.window_title else {
            return;
        };
        match self.active_client.borrow().title(self.title_max.get()) {
            Some(title) => {
                label.set_text(&title);
                label.set_visible(true);
            }
            None => label.set_visible(false),
        }
    }

    fn apply(&self, event: &ShellEvent) {
        if self.active_client.borrow_mut().apply_event(event) {
            self.refresh_title();
            return;
        }

        match event {
            ShellEvent::BatteryUpdated(details) => {
                let Some(battery) = &self.battery else {
                    return;
                };
                match details {
                    Some(details) => {
                        battery.icon.set_icon_name(Some(details.icon_name));
                        battery.set_label(&format!("{}%", details.percentage.round() as u8));
                        let discharging = details.state == ChargeState::Discharging;
                        set_class(
                            &battery.button,
                            "critical",
                            discharging && details.percentage <= CRITICAL_BATTERY,
                        );
                        set_class(
                            &battery.button,
                            "low",
                            discharging
                                && details.percentage > CRITICAL_BATTERY
                                && details.percentage <= LOW_BATTERY,
                        );
                    }
                    None => {
                        battery.icon.set_icon_name(Some(MISSING_ICON));
                        battery.set_label("");
                    }
                }
            }
            ShellEvent::NetworkUpdated(details) => {
                if let Some(network) = &self.network {
                    network.icon.set_icon_name(Some(details.icon_name));
                    network.button.set_tooltip_text(Some(&details.label()));
                }
            }
            ShellEvent::DisplayUpdated(state) => {
                self.brightness.set(state.brightness);
                if let Some(display) = &self.display {
                    display
                        .icon
                        .set_icon_name(Some(brightness_icon_name(state.brightness.unwrap_or(100))));
                    display.button.set_tooltip_text(
                        state
                            .brightness
                            .map(|b| format!("Brightness {}%", b))
                            .as_deref(),
                    );
                }
            }
            ShellEvent::AudioUpdated(state) => {
                self.volume.set(state.output.map(|o| o.percent));
                if let Some(audio) = &self.audio {
                    audio.icon.set_icon_name(Some(volume_icon_name(state.output)));
                    audio.button.set_tooltip_text(
                        state
                            .output
                            .map(|o| format!("Volume {}%", o.percent))
                            .as_deref(),
                    );
                }
            }
            ShellEvent::MediaUpdated(snapshot) => {
                let Some((button, label)) = &self.media else {
                    return;
                };
                match snapshot {
                    Some(snapshot) => {
                        let text = if snapshot.title.is_empty() {
                            snapshot.player.as_str()
                        } else {
                            snapshot.title.as_str()
                        };
                        label.set_text(&truncate_chars(text, MEDIA_TITLE_CHARS));
                        button.set_visible(true);
                    }
                    None => button.set_visible(false),
                }
            }
            _ => {}
        }
    }

    fn reconfigure(&self, config: &ShellConfig) {
        self.title_max.set(config.active_client_max_length);
        self.refresh_title();
        if let Some(clock) = &self.clock {
            clock.reconfigure(&config.clock_format, config.clock_interval_secs());
        }
    }
}

/// Top bar with configurable left, center and right sections
pub struct BarComponent {
    window: Option<LayerWindow>,
    modules: Option<Rc<BarModules>>,
    children: Vec<SharedComponent>,
    /// Module layout the bar was built with
    layout: Vec<Vec<ModuleType>>,
}

impl BarComponent {
    pub fn new() -> Self {
        Self {
            window: None,
            modules: None,
            children: Vec::new(),
            layout: Vec::new(),
        }
    }

    fn build_section(
        &mut self,
        modules: &[ModuleType],
        class: &str,
        seen: &mut AHashSet<ModuleType>,
        parts: &mut BarModules,
        ctx: &ComponentContext,
    ) -> GtkBox {
        let section = GtkBox::new(Orientation::Horizontal, 4);
        section.add_css_class(class);
        section.set_valign(Align::Center);

        for module in modules {
            if !seen.insert(*module) {
                warn!("Bar module {:?} listed twice, ignoring duplicate", module);
                continue;
            }
            let widget = self.build_module(*module, parts, ctx);
            section.append(&widget);
        }

        section
    }

    fn build_module(
        &mut self,
        module: ModuleType,
        parts: &mut BarModules,
        ctx: &ComponentContext,
    ) -> Widget {
        let config = ctx.config();

        match module {
            ModuleType::AppMenu => {
                let icon = config
                    .distro_icon_override
                    .clone()
                    .unwrap_or_else(distro_icon_name);
                let button = IconButton::new(&icon, "app-menu-button");
                button.button.set_tooltip_text(Some("Applications"));

                let mut popover = AppMenuPopover::new();
                popover.init(ctx.clone());
                button.attach(ctx, popover.id(), popover.popover());
                self.children.push(Rc::new(popover));
                button.button.upcast()
            }

            ModuleType::ActiveClient => {
                let label = Label::new(None);
                label.add_css_class("window-title");
                label.set_single_line_mode(true);
                label.set_visible(false);
                parts.window_title = Some(label.clone());
                label.upcast()
            }

            ModuleType::Clock => {
                let clock = Clock::new(&config.clock_format, config.clock_interval_secs());
                let button = MenuButton::new();
                button.add_css_class("bar-button");
                button.set_has_frame(false);
                button.set_child(Some(clock.widget()));

                let mut popover = CalendarPopover::new();
                popover.init(ctx.clone());
                if let Some(p) = popover.popover() {
                    button.set_popover(Some(p));
                    ctx.visibility.track(popover.id(), p);
                }
                self.children.push(Rc::new(popover));
                parts.clock = Some(clock);
                button.upcast()
            }

            ModuleType::Battery => {
                let button = IconButton::new(MISSING_ICON, "battery-button");
                let mut popover = BatteryPopover::new();
                popover.init(ctx.clone());
                button.attach(ctx, popover.id(), popover.popover());
                self.children.push(Rc::new(popover));

                let widget = button.button.clone().upcast();
                parts.battery = Some(button);
                widget
            }

            ModuleType::Network => {
                let button = IconButton::new(
                    kaneru_core::services::network::DISABLED_ICON,
                    "network-button",
                );
                let mut popover = NetworkPopover::new();
                popover.init(ctx.clone());
                button.attach(ctx, popover.id(), popover.popover());
                self.children.push(Rc::new(popover));

                let widget = button.button.clone().upcast();
                parts.network = Some(button);
                widget
            }

            ModuleType::Display => {
                let button = IconButton::new(brightness_icon_name(100), "display-button");
                let mut popover = DisplayPopover::new();
                popover.init(ctx.clone());
                button.attach(ctx, popover.id(), popover.popover());
                self.children.push(Rc::new(popover));

                let level = parts.brightness.clone();
                let step = config.display.brightness_step.max(1);
                Self::connect_scroll(&button.button, ctx, move |up| {
                    let current = level.get()?;
                    let next = if up {
                        current.saturating_add(step).min(100)
                    } else {
                        current.saturating_sub(step)
                    };
                    level.set(Some(next));
                    Some(ShellCommand::SetBrightness(next))
                });

                let widget = button.button.clone().upcast();
                parts.display = Some(button);
                widget
            }

            ModuleType::Audio => {
                let button = IconButton::new(volume_icon_name(None), "audio-button");
                let mut popover = AudioPopover::new();
                popover.init(ctx.clone());
                button.attach(ctx, popover.id(), popover.popover());
                self.children.push(Rc::new(popover));

                let level = parts.volume.clone();
                let step = config.audio.volume_step.max(1);
                let max = config.audio.max_volume;
                Self::connect_scroll(&button.button, ctx, move |up| {
                    let current = level.get()?;
                    let next = if up {
                        current.saturating_add(step).min(max)
                    } else {
                        current.saturating_sub(step)
                    };
                    level.set(Some(next));
                    Some(ShellCommand::SetVolume {
                        target: AudioTarget::Sink,
                        percent: next,
                    })
                });

                let widget = button.button.clone().upcast();
                parts.audio = Some(button);
                widget
            }

            ModuleType::Media => {
                let button = Button::new();
                button.add_css_class("bar-button");
                button.add_css_class("media-button");
                button.set_has_frame(false);

                let inner = GtkBox::new(Orientation::Horizontal, 4);
                inner.append(&Image::from_icon_name("audio-x-generic-symbolic"));
                let label = Label::new(None);
                inner.append(&label);
                button.set_child(Some(&inner));
                button.set_visible(false);

                let c = ctx.clone();
                button.connect_clicked(move |_| {
                    c.send_command(ShellCommand::ToggleComponent(ComponentId::Media));
                });

                parts.media = Some((button.clone(), label));
                button.upcast()
            }
        }
    }

    /// Vertical scrolling over `widget` sends the command built by `adjust`
    fn connect_scroll(
        widget: &impl IsA<Widget>,
        ctx: &ComponentContext,
        adjust: impl Fn(bool) -> Option<ShellCommand> + 'static,
    ) {
        let scroll = EventControllerScroll::new(EventControllerScrollFlags::VERTICAL);
        let ctx = ctx.clone();
        scroll.connect_scroll(move |_, _, dy| {
            if dy == 0.0 {
                return glib::Propagation::Proceed;
            }
            if let Some(cmd) = adjust(dy < 0.0) {
                ctx.send_command(cmd);
            }
            glib::Propagation::Stop
        });
        widget.add_controller(scroll);
    }
}

impl Default for BarComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for BarComponent {
    fn id(&self) -> ComponentId {
        ComponentId::Bar
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.window.is_some() {
            return;
        }

        let config = ctx.config();
        let window = LayerWindow::new(&ctx.app, LayerConfig::bar());

        let mut parts = BarModules::default();
        parts.title_max.set(config.active_client_max_length);

        let mut seen = AHashSet::new();
        let left = self.build_section(&config.modules_left, "left-box", &mut seen, &mut parts, &ctx);
        let center =
            self.build_section(&config.modules_center, "center-box", &mut seen, &mut parts, &ctx);
        let right =
            self.build_section(&config.modules_right, "right-box", &mut seen, &mut parts, &ctx);

        let bar = CenterBox::new();
        bar.add_css_class("bar");
        bar.set_start_widget(Some(&left));
        bar.set_center_widget(Some(&center));
        bar.set_end_widget(Some(&right));
        window.set_child(Some(&bar));
        ctx.visibility.track(ComponentId::Bar, window.window());

        info!(
            "Bar built with {} modules and {} popovers",
            seen.len(),
            self.children.len()
        );

        self.layout = vec![
            config.modules_left.clone(),
            config.modules_center.clone(),
            config.modules_right.clone(),
        ];
        self.modules = Some(Rc::new(parts));
        self.window = Some(window);
    }

    fn show(&self) {
        if let Some(window) = &self.window {
            window.present();
        }
    }

    fn hide(&self) {
        if let Some(window) = &self.window {
            window.hide();
        }
    }

    fn is_visible(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.is_visible())
    }

    fn handle_event(&self, event: &ShellEvent) {
        let Some(modules) = &self.modules else {
            return;
        };

        if let ShellEvent::ConfigReloaded(config) = event {
            modules.reconfigure(config);
            let layout = [
                &config.modules_left,
                &config.modules_center,
                &config.modules_right,
            ];
            if layout.iter().zip(&self.layout).any(|(new, old)| *new != old) {
                info!("Bar module layout changed; it applies after a restart");
            }
            return;
        }

        modules.apply(event);
    }

    fn shutdown(&self) {
        debug!("Shutting down bar");
        if let Some(clock) = self.modules.as_ref().and_then(|m| m.clock.as_ref()) {
            clock.stop();
        }
    }

    fn children(&self) -> Vec<SharedComponent> {
        self.children.clone()
    }
}
