use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Calendar, Label, Orientation, Popover};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

use kaneru_core::state::PomodoroTimer;
use kaneru_core::{ComponentId, ShellCommand, ShellEvent};

use super::frame::{section_title, PopoverFrame};
use crate::common::{set_class, Component, ComponentContext};

const FINISHED_NOTIFICATION: &str =
    "notify-send -a Kaneru -i alarm-symbolic 'Pomodoro finished' 'Time for a break'";

struct Pomodoro {
    ctx: ComponentContext,
    timer: RefCell<PomodoroTimer>,
    ticker: RefCell<Option<glib::SourceId>>,
    label: Label,
    start_pause: Button,
    decrease: Button,
    increase: Button,
}

impl Pomodoro {
    fn refresh(&self) {
        let timer = self.timer.borrow();
        self.label.set_text(&timer.format());

        let running = timer.is_running();
        set_class(&self.start_pause, "running", running);
        self.start_pause.set_icon_name(if running {
            "media-playback-pause-symbolic"
        } else {
            "media-playback-start-symbolic"
        });
        self.decrease.set_sensitive(!running);
        self.increase.set_sensitive(!running);
    }

    fn start(self: &Rc<Self>) {
        self.timer.borrow_mut().start();

        if self.ticker.borrow().is_none() {
            let pomodoro = self.clone();
            let id = glib::timeout_add_seconds_local(1, move || pomodoro.tick());
            *self.ticker.borrow_mut() = Some(id);
        }
        self.refresh();
    }

    fn pause(&self) {
        self.timer.borrow_mut().pause();
        self.stop_ticker();
        self.refresh();
    }

    fn stop_ticker(&self) {
        if let Some(id) = self.ticker.borrow_mut().take() {
            id.remove();
        }
    }

    fn tick(&self) -> glib::ControlFlow {
        let finished = self.timer.borrow_mut().tick();
        let running = self.timer.borrow().is_running();
        self.refresh();

        if finished {
            info!("Pomodoro finished");
            self.ctx
                .send_command(ShellCommand::LaunchApp(FINISHED_NOTIFICATION.into()));
        }

        if running {
            glib::ControlFlow::Continue
        } else {
            // Returning Break removes the source
            self.ticker.borrow_mut().take();
            glib::ControlFlow::Break
        }
    }
}

/// Month calendar with a pomodoro timer underneath
pub struct CalendarPopover {
    frame: Option<PopoverFrame>,
    pomodoro: Option<Rc<Pomodoro>>,
}

impl CalendarPopover {
    pub fn new() -> Self {
        Self {
            frame: None,
            pomodoro: None,
        }
    }

    pub fn popover(&self) -> Option<&Popover> {
        self.frame.as_ref().map(|f| &f.popover)
    }

    fn build_pomodoro(frame: &PopoverFrame, ctx: ComponentContext) -> Rc<Pomodoro> {
        frame.append(&section_title("Pomodoro"));

        let controls = GtkBox::new(Orientation::Horizontal, 8);
        controls.add_css_class("pomodoro-controls");
        controls.set_halign(Align::Center);

        let decrease = Button::from_icon_name("list-remove-symbolic");
        decrease.add_css_class("pomodoro-button");
        decrease.set_tooltip_text(Some("Shorter"));

        let label = Label::new(None);
        label.add_css_class("pomodoro-label");

        let increase = Button::from_icon_name("list-add-symbolic");
        increase.add_css_class("pomodoro-button");
        increase.set_tooltip_text(Some("Longer"));

        let start_pause = Button::from_icon_name("media-playback-start-symbolic");
        start_pause.add_css_class("start-pause-button");

        let reset = Button::from_icon_name("view-refresh-symbolic");
        reset.add_css_class("pomodoro-button");
        reset.set_tooltip_text(Some("Reset"));

        controls.append(&decrease);
        controls.append(&label);
        controls.append(&increase);
        controls.append(&start_pause);
        controls.append(&reset);
        frame.append(&controls);

        let pomodoro = Rc::new(Pomodoro {
            ctx,
            timer: RefCell::new(PomodoroTimer::default()),
            ticker: RefCell::new(None),
            label,
            start_pause: start_pause.clone(),
            decrease: decrease.clone(),
            increase: increase.clone(),
        });
        pomodoro.refresh();

        let p = pomodoro.clone();
        decrease.connect_clicked(move |_| {
            if p.timer.borrow_mut().decrease() {
                p.refresh();
            }
        });

        let p = pomodoro.clone();
        increase.connect_clicked(move |_| {
            if p.timer.borrow_mut().increase() {
                p.refresh();
            }
        });

        let p = pomodoro.clone();
        start_pause.connect_clicked(move |_| {
            let running = p.timer.borrow().is_running();
            if running {
                p.pause();
            } else {
                p.start();
            }
        });

        let p = pomodoro.clone();
        reset.connect_clicked(move |_| {
            p.pause();
            p.timer.borrow_mut().reset();
            p.refresh();
        });

        pomodoro
    }
}

impl Default for CalendarPopover {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for CalendarPopover {
    fn id(&self) -> ComponentId {
        ComponentId::Calendar
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.frame.is_some() {
            return;
        }

        let frame = PopoverFrame::new("Calendar");

        let today = Label::new(None);
        today.add_css_class("dim-label");
        today.set_halign(Align::Start);
        frame.append(&today);

        let calendar = Calendar::new();
        calendar.add_css_class("date-calendar");
        frame.append(&calendar);

        let pomodoro = Self::build_pomodoro(&frame, ctx);

        frame.popover.connect_show(move |_| {
            today.set_text(&chrono::Local::now().format("%A, %e %B %Y").to_string());
            if let Ok(now) = glib::DateTime::now_local() {
                calendar.select_day(&now);
            }
        });

        self.pomodoro = Some(pomodoro);
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

    fn handle_event(&self, _event: &ShellEvent) {}

    fn shutdown(&self) {
        if let Some(pomodoro) = &self.pomodoro {
            pomodoro.stop_ticker();
        }
    }
}
