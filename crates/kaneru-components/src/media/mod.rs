//! Floating media controls under the bar.

use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, GestureClick, Image, Label, Orientation, ProgressBar};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

use kaneru_core::services::media::{format_position, MediaSnapshot, PlaybackStatus};
use kaneru_core::{ComponentId, ShellCommand, ShellEvent};

use crate::common::{Component, ComponentContext, LayerConfig, LayerWindow};

const ART_SIZE: i32 = 72;
const FALLBACK_ART: &str = "audio-x-generic-symbolic";

struct MediaView {
    art: Image,
    title: Label,
    artist: Label,
    album: Label,
    progress: ProgressBar,
    position: Label,
    length: Label,
    controls: GtkBox,
    play_pause: Button,
    /// Track length, used to turn progress bar clicks into seek positions
    current_length: RefCell<Option<Duration>>,
    art_url: RefCell<Option<String>>,
}

impl MediaView {
    fn update(&self, snapshot: Option<&MediaSnapshot>) {
        let Some(snapshot) = snapshot else {
            self.title.set_text("Nothing playing");
            self.artist.set_text("");
            self.album.set_text("");
            self.progress.set_fraction(0.0);
            self.position.set_text("0:00");
            self.length.set_text("0:00");
            self.controls.set_sensitive(false);
            self.play_pause
                .set_icon_name(PlaybackStatus::Stopped.toggle_icon_name());
            self.set_art(None);
            *self.current_length.borrow_mut() = None;
            return;
        };

        let title = if snapshot.title.is_empty() {
            snapshot.player.as_str()
        } else {
            snapshot.title.as_str()
        };
        self.title.set_text(title);
        self.artist.set_text(&snapshot.artist);
        self.artist.set_visible(!snapshot.artist.is_empty());
        self.album.set_text(&snapshot.album);
        self.album.set_visible(!snapshot.album.is_empty());

        self.progress.set_fraction(snapshot.progress());
        self.position
            .set_text(&format_position(snapshot.position.unwrap_or_default()));
        self.length
            .set_text(&format_position(snapshot.length.unwrap_or_default()));

        self.controls.set_sensitive(true);
        self.play_pause
            .set_icon_name(snapshot.status.toggle_icon_name());
        self.set_art(snapshot.art_url.as_deref());
        *self.current_length.borrow_mut() = snapshot.length;
    }

    /// Only local `file://` art is shown; anything else gets the fallback icon
    fn set_art(&self, url: Option<&str>) {
        if self.art_url.borrow().as_deref() == url {
            return;
        }
        *self.art_url.borrow_mut() = url.map(str::to_string);

        let path = url
            .filter(|u| u.starts_with("file://"))
            .and_then(|u| glib::filename_from_uri(u).ok())
            .map(|(path, _)| path)
            .filter(|path| path.exists());

        match path {
            Some(path) => self.art.set_from_file(Some(&path)),
            None => self.art.set_icon_name(Some(FALLBACK_ART)),
        }
        self.art.set_pixel_size(ART_SIZE);
    }
}

/// Overlay window with now-playing metadata and transport controls
pub struct MediaWindow {
    window: Option<LayerWindow>,
    view: Option<Rc<MediaView>>,
    ctx: Option<ComponentContext>,
}

impl MediaWindow {
    pub fn new() -> Self {
        Self {
            window: None,
            view: None,
            ctx: None,
        }
    }

    fn control_button(icon: &str, tooltip: &str) -> Button {
        let button = Button::from_icon_name(icon);
        button.add_css_class("media-control");
        button.set_tooltip_text(Some(tooltip));
        button
    }

    fn build(ctx: &ComponentContext) -> (GtkBox, Rc<MediaView>) {
        let root = GtkBox::new(Orientation::Vertical, 8);
        root.add_css_class("media-window");

        let top = GtkBox::new(Orientation::Horizontal, 12);
        let art = Image::from_icon_name(FALLBACK_ART);
        art.add_css_class("media-art");
        art.set_pixel_size(ART_SIZE);
        top.append(&art);

        let text = GtkBox::new(Orientation::Vertical, 2);
        text.set_valign(Align::Center);
        text.set_hexpand(true);
        let title = Label::new(Some("Nothing playing"));
        title.add_css_class("media-title");
        let artist = Label::new(None);
        artist.add_css_class("media-artist");
        let album = Label::new(None);
        album.add_css_class("media-album");
        for label in [&title, &artist, &album] {
            label.set_halign(Align::Start);
            label.set_max_width_chars(28);
            label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
            text.append(label);
        }
        top.append(&text);
        root.append(&top);

        let progress = ProgressBar::new();
        progress.add_css_class("media-progress");
        root.append(&progress);

        let times = GtkBox::new(Orientation::Horizontal, 0);
        let position = Label::new(Some("0:00"));
        position.add_css_class("media-time");
        position.set_halign(Align::Start);
        position.set_hexpand(true);
        let length = Label::new(Some("0:00"));
        length.add_css_class("media-time");
        length.set_halign(Align::End);
        times.append(&position);
        times.append(&length);
        root.append(&times);

        let controls = GtkBox::new(Orientation::Horizontal, 12);
        controls.add_css_class("media-controls");
        controls.set_halign(Align::Center);

        let previous = Self::control_button("media-skip-backward-symbolic", "Previous");
        let play_pause = Self::control_button("media-playback-start-symbolic", "Play/Pause");
        play_pause.add_css_class("play-pause");
        let next = Self::control_button("media-skip-forward-symbolic", "Next");
        controls.append(&previous);
        controls.append(&play_pause);
        controls.append(&next);
        controls.set_sensitive(false);
        root.append(&controls);

        for (button, command) in [
            (&previous, ShellCommand::MediaPrevious),
            (&play_pause, ShellCommand::MediaPlayPause),
            (&next, ShellCommand::MediaNext),
        ] {
            let ctx = ctx.clone();
            button.connect_clicked(move |_| ctx.send_command(command.clone()));
        }

        let view = Rc::new(MediaView {
            art,
            title,
            artist,
            album,
            progress: progress.clone(),
            position,
            length,
            controls,
            play_pause,
            current_length: RefCell::new(None),
            art_url: RefCell::new(None),
        });

        let click = GestureClick::new();
        let v = view.clone();
        let ctx = ctx.clone();
        click.connect_released(move |gesture, _, x, _| {
            let Some(length) = *v.current_length.borrow() else {
                return;
            };
            let width = f64::from(v.progress.width());
            if width <= 0.0 {
                return;
            }
            let fraction = (x / width).clamp(0.0, 1.0);
            let seconds = length.as_secs_f64() * fraction;
            debug!("Seeking to {:.1}s", seconds);
            gesture.set_state(gtk4::EventSequenceState::Claimed);
            ctx.send_command(ShellCommand::MediaSeek(seconds));
        });
        progress.add_controller(click);

        (root, view)
    }
}

impl Default for MediaWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for MediaWindow {
    fn id(&self) -> ComponentId {
        ComponentId::Media
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.window.is_some() {
            return;
        }

        let window = LayerWindow::new(&ctx.app, LayerConfig::top_right_overlay("kaneru-media"));
        let (content, view) = Self::build(&ctx);
        window.set_child(Some(&content));
        ctx.visibility.track(ComponentId::Media, window.window());

        self.window = Some(window);
        self.view = Some(view);
        self.ctx = Some(ctx);
    }

    fn show(&self) {
        if let Some(window) = &self.window {
            window.present();
        }
        if let Some(ctx) = &self.ctx {
            ctx.send_command(ShellCommand::RefreshMedia);
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
        let Some(view) = &self.view else {
            return;
        };

        if let ShellEvent::MediaUpdated(snapshot) = event {
            view.update(snapshot.as_ref());
        }
    }
}
