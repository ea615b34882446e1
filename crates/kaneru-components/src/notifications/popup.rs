use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, EventControllerMotion, GestureClick, Image, Label, Orientation,
    Revealer, RevealerTransitionType,
};
use std::cell::Cell;
use std::path::PathBuf;
use std::time::Duration;

use kaneru_core::services::notifications::{CloseReason, Notification};
use kaneru_core::{NotificationPosition, ShellCommand};

use crate::common::{send_command, ComponentContext, Debouncer, LayerConfig, LayerWindow};

pub const TRANSITION: Duration = Duration::from_millis(250);
const IMAGE_SIZE: i32 = 48;
const BODY_CHARS: i32 = 40;
const DEFAULT_ACTION: &str = "default";

/// Pick the widget source for an icon hint: a local file or a themed icon name
fn icon_source(icon: &str) -> Result<PathBuf, &str> {
    if icon.starts_with("file://") {
        if let Ok((path, _)) = glib::filename_from_uri(icon) {
            return Ok(path);
        }
    } else if icon.starts_with('/') {
        return Ok(PathBuf::from(icon));
    }
    Err(icon)
}

fn set_icon(image: &Image, icon: &str) {
    match icon_source(icon) {
        Ok(path) if path.exists() => image.set_from_file(Some(&path)),
        Ok(_) => image.set_icon_name(Some("dialog-information-symbolic")),
        Err(name) => image.set_icon_name(Some(name)),
    }
}

/// Body text uses markup when it parses, plain text otherwise
fn set_body(label: &Label, body: &str) {
    if gtk4::pango::parse_markup(body, '\0').is_ok() {
        label.set_markup(body);
    } else {
        label.set_text(body);
    }
}

/// One notification on its own layer surface
pub struct Popup {
    pub id: u32,
    pub window: LayerWindow,
    revealer: Revealer,
    content: GtkBox,
    expiry: Debouncer,
    timeout: Option<Duration>,
    shown: Cell<bool>,
}

impl Popup {
    pub fn new(
        ctx: &ComponentContext,
        notification: &Notification,
        position: NotificationPosition,
        timeout: Option<Duration>,
    ) -> Self {
        let window = LayerWindow::new(&ctx.app, LayerConfig::notification(position));

        let revealer = Revealer::new();
        revealer.set_transition_duration(TRANSITION.as_millis() as u32);
        revealer.set_transition_type(if position.is_top() {
            RevealerTransitionType::SlideDown
        } else {
            RevealerTransitionType::SlideUp
        });

        let content = Self::build(ctx, notification);
        revealer.set_child(Some(&content));
        window.set_child(Some(&revealer));

        let popup = Self {
            id: notification.id,
            window,
            revealer,
            content,
            expiry: Debouncer::new(),
            timeout,
            shown: Cell::new(false),
        };
        popup.connect_hover(ctx);
        popup
    }

    fn build(ctx: &ComponentContext, notification: &Notification) -> GtkBox {
        let id = notification.id;
        let root = GtkBox::new(Orientation::Vertical, 4);
        root.add_css_class("notification");
        root.add_css_class(notification.urgency.css_class());

        let header = GtkBox::new(Orientation::Horizontal, 6);
        header.add_css_class("header");
        let app_icon = Image::new();
        app_icon.add_css_class("app-icon");
        if notification.app_icon.is_empty() {
            app_icon.set_visible(false);
        } else {
            set_icon(&app_icon, &notification.app_icon);
        }
        header.append(&app_icon);

        let app_name = Label::new(Some(&notification.app_name));
        app_name.add_css_class("app-name");
        app_name.set_halign(Align::Start);
        app_name.set_hexpand(true);
        app_name.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        header.append(&app_name);

        let close = Button::from_icon_name("window-close-symbolic");
        close.add_css_class("close-button");
        close.set_has_frame(false);
        let tx = ctx.command_tx.clone();
        close.connect_clicked(move |_| {
            send_command(
                &tx,
                ShellCommand::CloseNotification {
                    id,
                    reason: CloseReason::Dismissed,
                },
            );
        });
        header.append(&close);
        root.append(&header);

        let main = GtkBox::new(Orientation::Horizontal, 0);
        if let Some(image_path) = notification.image_path.as_deref() {
            let image = Image::new();
            image.add_css_class("image");
            image.set_pixel_size(IMAGE_SIZE);
            image.set_valign(Align::Start);
            set_icon(&image, image_path);
            main.append(&image);
        }

        let text = GtkBox::new(Orientation::Vertical, 2);
        text.set_hexpand(true);
        let summary = Label::new(Some(&notification.summary));
        summary.add_css_class("summary");
        summary.set_halign(Align::Start);
        summary.set_wrap(true);
        summary.set_xalign(0.0);
        text.append(&summary);

        if !notification.body.is_empty() {
            let body = Label::new(None);
            body.add_css_class("body");
            body.set_halign(Align::Start);
            body.set_xalign(0.0);
            body.set_wrap(true);
            body.set_max_width_chars(BODY_CHARS);
            body.set_lines(4);
            body.set_ellipsize(gtk4::pango::EllipsizeMode::End);
            set_body(&body, &notification.body);
            text.append(&body);
        }
        main.append(&text);
        root.append(&main);

        let mut has_default = false;
        let actions = GtkBox::new(Orientation::Horizontal, 6);
        actions.add_css_class("actions");
        actions.set_homogeneous(true);
        for (key, label) in notification.action_pairs() {
            if key == DEFAULT_ACTION {
                has_default = true;
                continue;
            }
            let button = Button::with_label(label);
            button.add_css_class("action-button");
            let tx = ctx.command_tx.clone();
            let key = key.to_string();
            button.connect_clicked(move |_| {
                send_command(
                    &tx,
                    ShellCommand::InvokeAction {
                        id,
                        key: key.clone(),
                    },
                );
            });
            actions.append(&button);
        }
        if actions.first_child().is_some() {
            root.append(&actions);
        }

        // Clicking the body runs the default action when the sender offers one
        if has_default {
            let click = GestureClick::new();
            let tx = ctx.command_tx.clone();
            click.connect_released(move |_, _, _, _| {
                send_command(
                    &tx,
                    ShellCommand::InvokeAction {
                        id,
                        key: DEFAULT_ACTION.to_string(),
                    },
                );
            });
            main.add_controller(click);
        }

        root
    }

    fn connect_hover(&self, ctx: &ComponentContext) {
        let Some(timeout) = self.timeout else {
            return;
        };

        let motion = EventControllerMotion::new();
        let expiry = self.expiry.clone();
        motion.connect_enter(move |_, _, _| expiry.cancel());

        let expiry = self.expiry.clone();
        let tx = ctx.command_tx.clone();
        let id = self.id;
        motion.connect_leave(move |_| {
            let tx = tx.clone();
            expiry.schedule(timeout, move || expire(&tx, id));
        });
        self.content.add_controller(motion);
    }

    /// Present and slide in, then start the expiry timer
    pub fn show(&self, ctx: &ComponentContext) {
        self.shown.set(true);
        self.window.present();
        let revealer = self.revealer.clone();
        glib::idle_add_local_once(move || revealer.set_reveal_child(true));

        if let Some(timeout) = self.timeout {
            let tx = ctx.command_tx.clone();
            let id = self.id;
            self.expiry.schedule(timeout, move || expire(&tx, id));
        }
    }

    /// Popups posted while hidden slide in on their first reveal
    pub fn set_hidden(&self, hidden: bool, ctx: &ComponentContext) {
        if !hidden && !self.shown.get() {
            self.show(ctx);
        } else {
            self.window.set_visible(!hidden);
        }
    }

    /// Natural height used for stacking
    pub fn height(&self) -> i32 {
        let (_, natural, _, _) = self.content.measure(Orientation::Vertical, -1);
        natural
    }

    /// Slide out and destroy the surface once the transition ends
    pub fn dismiss(&self) {
        self.expiry.cancel();
        self.revealer.set_reveal_child(false);
        let window = self.window.window().clone();
        glib::timeout_add_local_once(TRANSITION, move || window.destroy());
    }

    /// Destroy without animation (replaced in place)
    pub fn destroy(&self) {
        self.expiry.cancel();
        self.window.destroy();
    }
}

fn expire(tx: &tokio::sync::mpsc::Sender<ShellCommand>, id: u32) {
    send_command(
        tx,
        ShellCommand::CloseNotification {
            id,
            reason: CloseReason::Expired,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_hints_resolve_to_files_or_names() {
        assert_eq!(
            icon_source("file:///tmp/cover%20art.png"),
            Ok(PathBuf::from("/tmp/cover art.png"))
        );
        assert_eq!(icon_source("/usr/share/pixmaps/a.png"), Ok(PathBuf::from("/usr/share/pixmaps/a.png")));
        assert_eq!(icon_source("firefox"), Err("firefox"));
    }
}
