use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, Image, Label, ListBox, ListBoxRow, Orientation, PolicyType,
    Popover, ScrolledWindow, SearchEntry, SelectionMode,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

use kaneru_core::{AppInfo, AppResolver, ComponentId, ShellCommand, ShellEvent};

use super::frame::PopoverFrame;
use crate::common::{clear_children, Component, ComponentContext};

const LIST_HEIGHT: i32 = 380;

const POWER_ACTIONS: [(&str, &str, PowerAction); 4] = [
    ("system-lock-screen-symbolic", "Lock", PowerAction::Lock),
    ("weather-clear-night-symbolic", "Suspend", PowerAction::Suspend),
    ("system-reboot-symbolic", "Reboot", PowerAction::Reboot),
    ("system-shutdown-symbolic", "Shut down", PowerAction::Shutdown),
];

#[derive(Debug, Clone, Copy)]
enum PowerAction {
    Lock,
    Suspend,
    Reboot,
    Shutdown,
}

impl PowerAction {
    fn command(self) -> ShellCommand {
        match self {
            Self::Lock => ShellCommand::Lock,
            Self::Suspend => ShellCommand::Suspend,
            Self::Reboot => ShellCommand::Reboot,
            Self::Shutdown => ShellCommand::Shutdown,
        }
    }
}

struct AppMenuView {
    ctx: ComponentContext,
    popover: Popover,
    search: SearchEntry,
    list: ListBox,
    resolver: RefCell<AppResolver>,
    /// Apps in the order currently listed
    shown: RefCell<Vec<AppInfo>>,
}

impl AppMenuView {
    fn populate(&self, query: &str) {
        clear_children(&self.list);

        let apps: Vec<AppInfo> = {
            let resolver = self.resolver.borrow();
            let found = if query.trim().is_empty() {
                resolver.apps_sorted()
            } else {
                resolver.search(query)
            };
            found.into_iter().cloned().collect()
        };

        for app in &apps {
            self.list.append(&Self::app_row(app));
        }
        if let Some(first) = self.list.row_at_index(0) {
            self.list.select_row(Some(&first));
        }

        *self.shown.borrow_mut() = apps;
    }

    fn app_row(app: &AppInfo) -> ListBoxRow {
        let row = ListBoxRow::new();
        row.add_css_class("app-menu-item");

        let content = GtkBox::new(Orientation::Horizontal, 10);

        let icon = Image::from_icon_name(app.icon_name());
        icon.add_css_class("app-menu-item-icon");
        content.append(&icon);

        let text = GtkBox::new(Orientation::Vertical, 0);
        text.set_valign(Align::Center);
        let name = Label::new(Some(&app.name));
        name.add_css_class("app-menu-item-label");
        name.set_halign(Align::Start);
        name.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        text.append(&name);

        if let Some(generic) = app.generic_name.as_deref().filter(|g| !g.is_empty()) {
            let generic = Label::new(Some(generic));
            generic.add_css_class("dim-label");
            generic.set_halign(Align::Start);
            generic.set_ellipsize(gtk4::pango::EllipsizeMode::End);
            text.append(&generic);
        }
        content.append(&text);

        row.set_child(Some(&content));
        row.set_tooltip_text(Some(&app.exec));
        row
    }

    fn launch_index(&self, index: usize) {
        let exec = self.shown.borrow().get(index).map(|app| app.exec.clone());
        let Some(exec) = exec else {
            return;
        };

        debug!("Launching: {}", exec);
        self.popover.popdown();
        self.ctx.send_command(ShellCommand::LaunchApp(exec.into()));
    }

    fn rescan(&self) {
        *self.resolver.borrow_mut() = AppResolver::new();
        self.search.set_text("");
        self.populate("");
    }
}

/// Searchable application list with session actions
pub struct AppMenuPopover {
    frame: Option<PopoverFrame>,
    view: Option<Rc<AppMenuView>>,
}

impl AppMenuPopover {
    pub fn new() -> Self {
        Self {
            frame: None,
            view: None,
        }
    }

    pub fn popover(&self) -> Option<&Popover> {
        self.frame.as_ref().map(|f| &f.popover)
    }

    fn power_row(ctx: &ComponentContext, popover: &Popover) -> GtkBox {
        let row = GtkBox::new(Orientation::Horizontal, 6);
        row.add_css_class("power-row");
        row.set_homogeneous(true);

        for (icon, tooltip, action) in POWER_ACTIONS {
            let button = Button::from_icon_name(icon);
            button.add_css_class("power-action");
            button.set_tooltip_text(Some(tooltip));

            let ctx = ctx.clone();
            let popover = popover.clone();
            button.connect_clicked(move |_| {
                popover.popdown();
                ctx.send_command(action.command());
            });
            row.append(&button);
        }

        row
    }
}

impl Default for AppMenuPopover {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AppMenuPopover {
    fn id(&self) -> ComponentId {
        ComponentId::AppMenu
    }

    fn init(&mut self, ctx: ComponentContext) {
        if self.frame.is_some() {
            return;
        }

        let frame = PopoverFrame::new("Applications");
        frame.content.add_css_class("app-menu-container");

        let search = SearchEntry::new();
        search.add_css_class("app-menu-search");
        search.set_placeholder_text(Some("Search applications..."));
        frame.append(&search);

        let list = ListBox::new();
        list.add_css_class("app-menu-list");
        list.set_selection_mode(SelectionMode::Single);
        list.set_activate_on_single_click(true);

        let scroll = ScrolledWindow::new();
        scroll.add_css_class("app-menu-scroll");
        scroll.set_policy(PolicyType::Never, PolicyType::Automatic);
        scroll.set_min_content_height(LIST_HEIGHT);
        scroll.set_child(Some(&list));
        frame.append(&scroll);

        frame.append(&Self::power_row(&ctx, &frame.popover));

        let view = Rc::new(AppMenuView {
            ctx,
            popover: frame.popover.clone(),
            search: search.clone(),
            list: list.clone(),
            resolver: RefCell::new(AppResolver::default()),
            shown: RefCell::new(Vec::new()),
        });

        let v = view.clone();
        search.connect_search_changed(move |entry| {
            v.populate(entry.text().as_str());
        });

        let v = view.clone();
        search.connect_activate(move |_| {
            let index = v.list.selected_row().map(|row| row.index()).unwrap_or(0);
            v.launch_index(usize::try_from(index).unwrap_or(0));
        });

        let v = view.clone();
        list.connect_row_activated(move |_, row| {
            if let Ok(index) = usize::try_from(row.index()) {
                v.launch_index(index);
            }
        });

        let v = view.clone();
        frame.popover.connect_show(move |_| {
            v.rescan();
            v.search.grab_focus();
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
        if let Some(view) = &self.view {
            view.search.set_text("");
        }
    }

    fn is_visible(&self) -> bool {
        self.frame
            .as_ref()
            .is_some_and(|f| f.popover.is_visible())
    }

    fn handle_event(&self, _event: &ShellEvent) {}
}
