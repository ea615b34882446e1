use ahash::AHashMap;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use gtk4::prelude::*;
use gtk4::Application;
use tracing::{debug, error, info};

use kaneru_components::{
    BarComponent, Component, ComponentContext, DockComponent, MediaWindow, NotificationComponent,
    SharedComponent, Visibility,
};
use kaneru_core::{load_css, ComponentId, ConfigPaths, ServiceHub, ShellConfig, ShellEvent};

use crate::ipc;

const APP_ID: &str = "com.github.linuxmobile.kaneru";

type Components = AHashMap<ComponentId, SharedComponent>;

/// Register a component and, recursively, the components it owns
fn register(components: &mut Components, component: SharedComponent) {
    for child in component.children() {
        register(components, child);
    }
    debug!("Registered component {:?}", component.id());
    components.insert(component.id(), component);
}

/// Run a show/hide/toggle event and record the outcome. Returns false for other events.
fn apply_visibility(components: &Components, visibility: &Visibility, event: &ShellEvent) -> bool {
    let id = match event {
        ShellEvent::ShowComponent(id)
        | ShellEvent::HideComponent(id)
        | ShellEvent::ToggleComponent(id) => *id,
        _ => return false,
    };

    let Some(component) = components.get(&id) else {
        debug!("No component registered for {:?}", id);
        return true;
    };
    match event {
        ShellEvent::ShowComponent(_) => component.show(),
        ShellEvent::HideComponent(_) => component.hide(),
        _ => component.toggle(),
    }
    visibility.set(id, component.is_visible());
    true
}

fn apply_font(font: Option<&str>) {
    let Some(font) = font else {
        return;
    };
    if let Some(settings) = gtk4::Settings::default() {
        settings.set_gtk_font_name(Some(font));
    }
}

/// Run the shell daemon
pub fn run(config_dir: Option<PathBuf>) -> anyhow::Result<()> {
    info!("Initializing Kaneru daemon");

    let paths = match config_dir {
        Some(dir) => ConfigPaths::with_dirs(dir, ConfigPaths::new().cache_dir),
        None => ConfigPaths::new(),
    };
    let shell_config = ShellConfig::load(&paths.config_file);

    // Create service hub (starts tokio runtime and services)
    let services = Arc::new(ServiceHub::new(paths.clone(), &shell_config)?);
    let _guard = services.enter_runtime();

    let config = Arc::new(RwLock::new(shell_config));
    let visibility = Visibility::new();

    let socket = paths.ipc_socket.clone();
    let ipc_server = ipc::serve(socket.clone(), services.command_sender(), visibility.clone());
    services.runtime().spawn(async move {
        if let Err(e) = ipc_server.await {
            error!("IPC server error: {:#}", e);
        }
    });

    let app = Application::builder()
        .application_id(APP_ID)
        .flags(gtk4::gio::ApplicationFlags::NON_UNIQUE)
        .build();

    let services_clone = services.clone();
    app.connect_activate(move |app| {
        let theme = load_css(&paths);
        apply_font(config.read().font.as_deref());

        let ctx = ComponentContext::new(
            app,
            services_clone.command_sender(),
            config.clone(),
            paths.clone(),
            visibility.clone(),
        );

        let mut bar = BarComponent::new();
        bar.init(ctx.clone());
        let mut dock = DockComponent::new();
        dock.init(ctx.clone());
        let mut notifications = NotificationComponent::new();
        notifications.init(ctx.clone());
        let mut media = MediaWindow::new();
        media.init(ctx.clone());

        let mut components = Components::new();
        register(&mut components, Rc::new(bar));
        register(&mut components, Rc::new(dock));
        register(&mut components, Rc::new(notifications));
        register(&mut components, Rc::new(media));

        for component in components.values() {
            if component.is_always_visible() || component.id() == ComponentId::Dock {
                component.show();
            }
            visibility.set(component.id(), component.is_visible());
        }

        let components = Rc::new(components);

        // Start event dispatch loop
        let event_rx = services_clone.event_receiver();
        let dispatch = components.clone();
        let visibility = visibility.clone();
        let config = config.clone();
        let paths = paths.clone();
        glib::spawn_future_local(async move {
            while let Ok(event) = event_rx.recv().await {
                if !apply_visibility(&dispatch, &visibility, &event) {
                    if let ShellEvent::ConfigReloaded(new_config) = &event {
                        info!("Applying reloaded configuration");
                        *config.write() = (**new_config).clone();
                        apply_font(new_config.font.as_deref());
                        if let Some(theme) = &theme {
                            theme.reload_user_css(&paths.user_css);
                        }
                    }
                }

                // Forward event to all components
                for component in dispatch.values() {
                    component.handle_event(&event);
                }
            }
        });

        app.connect_shutdown(move |_| {
            for component in components.values() {
                component.shutdown();
            }
        });

        info!("Kaneru daemon activated");
    });

    // clap owns the command line
    let exit_code = app.run_with_args(&["kaneru"]);

    ipc::cleanup(&socket);
    info!("Kaneru daemon exiting");

    std::process::exit(exit_code.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Stand-in for a component whose window can be shown and hidden
    struct Panel {
        id: ComponentId,
        visible: Cell<bool>,
    }

    impl Component for Panel {
        fn id(&self) -> ComponentId {
            self.id
        }

        fn init(&mut self, _ctx: ComponentContext) {}

        fn show(&self) {
            self.visible.set(true);
        }

        fn hide(&self) {
            self.visible.set(false);
        }

        fn is_visible(&self) -> bool {
            self.visible.get()
        }

        fn handle_event(&self, _event: &ShellEvent) {}
    }

    fn components() -> Components {
        let mut components = Components::new();
        register(
            &mut components,
            Rc::new(Panel {
                id: ComponentId::Bar,
                visible: Cell::new(true),
            }),
        );
        components
    }

    #[test]
    fn hide_and_toggle_update_status() {
        let components = components();
        let visibility = Visibility::new();

        assert!(apply_visibility(
            &components,
            &visibility,
            &ShellEvent::HideComponent(ComponentId::Bar)
        ));
        assert_eq!(visibility.report(), "bar: hidden");

        apply_visibility(
            &components,
            &visibility,
            &ShellEvent::ToggleComponent(ComponentId::Bar),
        );
        assert_eq!(visibility.report(), "bar: visible");
    }

    #[test]
    fn unregistered_and_unrelated_events() {
        let components = components();
        let visibility = Visibility::new();

        assert!(apply_visibility(
            &components,
            &visibility,
            &ShellEvent::ShowComponent(ComponentId::Media)
        ));
        assert!(!visibility.is_visible(ComponentId::Media));

        assert!(!apply_visibility(
            &components,
            &visibility,
            &ShellEvent::CompositorDisconnected
        ));
        assert_eq!(visibility.report(), "");
    }
}
