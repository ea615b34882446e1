//! Per-surface stylesheets. Values written as `$name` come from [`super::Palette`].

pub const BASE_CSS: &str = r#"
window.kaneru-surface {
    background-color: transparent;
}

label {
    color: $fg;
}

.dim-label {
    color: $fg-dim;
    font-size: 12px;
}

.popover-content {
    background-color: $surface;
    border: 1px solid $border;
    border-radius: $radius;
    padding: $space-3;
    min-width: 280px;
}

.popover-header {
    margin-bottom: $space-2;
}

.popover-title {
    font-size: 15px;
    font-weight: 700;
}

.section-title {
    font-size: 12px;
    font-weight: 600;
    color: $fg-dim;
    margin-top: $space-2;
    margin-bottom: $space-1;
}

.detail-row {
    padding: $space-1 0;
}

.detail-value {
    font-weight: 600;
}

.toggle-button {
    background-color: $surface-alt;
    border-radius: $radius-sm;
    padding: $space-2 $space-3;
    transition: background-color 150ms ease;
}

.toggle-button:hover {
    background-color: alpha($accent, 0.25);
}

.toggle-button.active {
    background-color: $accent;
    color: $accent-fg;
}

.toggle-button.active label,
.toggle-button.active image {
    color: $accent-fg;
}

.settings-button {
    background-color: transparent;
    border-radius: $radius-sm;
    padding: $space-1 $space-2;
    color: $fg-dim;
}

.settings-button:hover {
    background-color: $surface-alt;
    color: $fg;
}
"#;

pub const BAR_CSS: &str = r#"
.bar {
    background-color: alpha($bg, 0.85);
    border-bottom: 1px solid alpha($border, 0.6);
    padding: $space-1 $space-2;
    min-height: 32px;
}

.left-box,
.center-box,
.right-box {
    padding: 0 $space-1;
}

.bar-button {
    background-color: transparent;
    border-radius: $radius-sm;
    padding: 2px $space-2;
    min-height: 24px;
    transition: background-color 150ms ease;
}

.bar-button:hover {
    background-color: $surface-alt;
}

.bar-button.active {
    background-color: alpha($accent, 0.2);
}

.bar-button image {
    -gtk-icon-size: 16px;
}

.app-menu-button image {
    -gtk-icon-size: 18px;
    color: $accent;
}

.window-title {
    color: $fg-dim;
    font-weight: 500;
    padding: 0 $space-2;
}

.clock-label {
    font-weight: 600;
}

.battery-button.low image,
.battery-button.low label {
    color: $warning;
}

.battery-button.critical image,
.battery-button.critical label {
    color: $critical;
}

.network-button,
.display-button,
.audio-button {
    padding: 0 $space-1;
}

.media-button {
    padding: 0 $space-2;
    color: $fg-dim;
}

.media-button:hover {
    color: $fg;
}
"#;

pub const BATTERY_CSS: &str = r#"
.battery-percentage {
    font-size: 28px;
    font-weight: 700;
}

.battery-status {
    color: $fg-dim;
}

.battery-large-icon {
    -gtk-icon-size: 48px;
}

.power-mode-box {
    margin-top: $space-2;
}

.power-mode-button {
    background-color: $surface-alt;
    border-radius: $radius-sm;
    padding: $space-2;
    min-width: 72px;
}

.power-mode-button:hover {
    background-color: alpha($accent, 0.25);
}

.power-mode-button.active {
    background-color: $accent;
    color: $accent-fg;
}

.conservation-row {
    margin-top: $space-2;
    padding-top: $space-2;
    border-top: 1px solid $border;
}
"#;

pub const NETWORK_CSS: &str = r#"
.network-toggles {
    margin-bottom: $space-2;
}

.network-current {
    background-color: $surface-alt;
    border-radius: $radius-sm;
    padding: $space-2 $space-3;
}

.network-list {
    background-color: transparent;
}

.network-item {
    background-color: transparent;
    border-radius: $radius-sm;
    padding: $space-2;
    margin: 1px 0;
}

.network-item:hover {
    background-color: $surface-alt;
}

.network-item.active {
    background-color: alpha($accent, 0.2);
}

.network-item.active .network-item-name {
    font-weight: 700;
    color: $accent;
}

.network-password {
    margin: $space-1 0 $space-2 0;
}

.network-error {
    color: $critical;
    font-size: 12px;
}
"#;

pub const DISPLAY_CSS: &str = r#"
.brightness-slider,
.temperature-slider {
    min-width: 200px;
    margin: $space-1 0;
}

.brightness-slider trough,
.temperature-slider trough,
.volume-slider trough {
    background-color: $surface-alt;
    border-radius: 999px;
    min-height: 6px;
}

.brightness-slider highlight,
.volume-slider highlight {
    background-color: $accent;
    border-radius: 999px;
}

.temperature-slider highlight {
    background-color: $warning;
    border-radius: 999px;
}

.night-light-button.active {
    background-color: $warning;
    color: $accent-fg;
}
"#;

pub const AUDIO_CSS: &str = r#"
.volume-row {
    padding: $space-1 0;
}

.volume-slider {
    min-width: 200px;
}

.mute-button {
    background-color: transparent;
    border-radius: 999px;
    padding: $space-1;
    min-width: 28px;
    min-height: 28px;
}

.mute-button:hover {
    background-color: $surface-alt;
}

.mute-button.muted {
    color: $critical;
}

.device-list {
    margin-top: $space-1;
}

.device-item {
    background-color: transparent;
    border-radius: $radius-sm;
    padding: $space-2;
    margin: 1px 0;
}

.device-item:hover {
    background-color: $surface-alt;
}

.device-item.active {
    background-color: alpha($accent, 0.2);
    font-weight: 700;
}
"#;

pub const MEDIA_CSS: &str = r#"
.media-window {
    background-color: $surface;
    border: 1px solid $border;
    border-radius: $radius;
    padding: $space-3;
    min-width: 320px;
}

.media-art {
    border-radius: $radius-sm;
    min-width: 72px;
    min-height: 72px;
    background-color: $surface-alt;
}

.media-title {
    font-size: 15px;
    font-weight: 700;
}

.media-artist {
    color: $fg-dim;
}

.media-album {
    color: $fg-dim;
    font-size: 12px;
}

.media-progress trough {
    background-color: $surface-alt;
    min-height: 4px;
    border-radius: 999px;
}

.media-progress progress {
    background-color: $accent;
    border-radius: 999px;
}

.media-time {
    color: $fg-dim;
    font-size: 11px;
}

.media-controls {
    margin-top: $space-2;
}

.media-control {
    background-color: transparent;
    border-radius: 999px;
    padding: $space-2;
}

.media-control:hover {
    background-color: $surface-alt;
}

.media-control.play-pause {
    background-color: $accent;
    color: $accent-fg;
}
"#;

pub const DATE_CSS: &str = r#"
.date-calendar {
    background-color: transparent;
    border: none;
    padding: $space-1;
}

.date-calendar header {
    color: $fg;
    font-weight: 700;
}

.date-calendar label.day-number:selected {
    background-color: $accent;
    color: $accent-fg;
    border-radius: $radius-sm;
}

.pomodoro-controls {
    margin-top: $space-3;
    padding-top: $space-2;
    border-top: 1px solid $border;
}

.pomodoro-label {
    font-size: 22px;
    font-weight: 700;
    font-feature-settings: "tnum";
}

.pomodoro-button,
.start-pause-button {
    background-color: $surface-alt;
    border-radius: 999px;
    min-width: 32px;
    min-height: 32px;
}

.start-pause-button.running {
    background-color: $accent;
    color: $accent-fg;
}
"#;

pub const APP_MENU_CSS: &str = r#"
.app-menu-container {
    background-color: $surface;
    border: 1px solid $border;
    border-radius: $radius;
    padding: $space-3;
    min-width: 360px;
}

.app-menu-search {
    margin-bottom: $space-2;
    border-radius: $radius-sm;
    padding: $space-1 $space-2;
}

.app-menu-scroll {
    min-height: 380px;
}

.app-menu-list {
    background-color: transparent;
}

.app-menu-item {
    background-color: transparent;
    border-radius: $radius-sm;
    padding: $space-2;
}

.app-menu-item:hover,
.app-menu-item:selected {
    background-color: $surface-alt;
}

.app-menu-item-icon {
    -gtk-icon-size: 28px;
}

.app-menu-item-label {
    font-weight: 600;
}

.power-row {
    margin-top: $space-2;
    padding-top: $space-2;
    border-top: 1px solid $border;
}

.power-action {
    background-color: transparent;
    border-radius: $radius-sm;
    padding: $space-2;
}

.power-action:hover {
    background-color: alpha($critical, 0.2);
    color: $critical;
}
"#;

pub const DOCK_CSS: &str = r#"
.dock-wrapper {
    background-color: transparent;
}

.dock-container {
    background-color: alpha($bg, 0.85);
    border: 1px solid alpha($border, 0.6);
    border-radius: $radius;
    padding: $space-1 $space-2;
    margin: $space-2;
}

.dock-item {
    background-color: transparent;
    border-radius: $radius-sm;
    padding: $space-1;
    margin: 0 2px;
    transition: background-color 150ms ease;
}

.dock-item:hover {
    background-color: $surface-alt;
}

.dock-item .indicator {
    background-color: transparent;
    border-radius: 999px;
    min-width: 4px;
    min-height: 4px;
    margin-top: 2px;
}

.dock-item.open .indicator {
    background-color: $fg-dim;
}

.dock-item.active .indicator {
    background-color: $accent;
    min-width: 12px;
}

.dock-trigger {
    background-color: transparent;
    min-height: 5px;
    min-width: 5px;
}
"#;

pub const NOTIFICATION_CSS: &str = r#"
.notification {
    background-color: $surface;
    border: 1px solid $border;
    border-radius: $radius;
    padding: $space-3;
    min-width: 340px;
}

.notification.critical {
    border-color: $critical;
    background-color: mix($surface, $critical, 0.12);
}

.notification.low {
    opacity: 0.9;
}

.notification .header {
    margin-bottom: $space-1;
}

.notification .app-icon {
    -gtk-icon-size: 16px;
}

.notification .app-name {
    color: $fg-dim;
    font-size: 11px;
    font-weight: 600;
}

.notification .close-button {
    background-color: transparent;
    border-radius: 999px;
    padding: 2px;
    min-width: 20px;
    min-height: 20px;
}

.notification .close-button:hover {
    background-color: $surface-alt;
}

.notification .image {
    border-radius: $radius-sm;
    margin-right: $space-2;
}

.notification .summary {
    font-weight: 700;
}

.notification .body {
    color: $fg-dim;
}

.notification .actions {
    margin-top: $space-2;
}

.notification .action-button {
    background-color: $surface-alt;
    border-radius: $radius-sm;
    padding: $space-1 $space-3;
}

.notification .action-button:hover {
    background-color: alpha($accent, 0.25);
}
"#;

/// Every surface stylesheet in load order
pub const SURFACES: [(&str, &str); 11] = [
    ("base", BASE_CSS),
    ("bar", BAR_CSS),
    ("battery", BATTERY_CSS),
    ("network", NETWORK_CSS),
    ("display", DISPLAY_CSS),
    ("audio", AUDIO_CSS),
    ("media", MEDIA_CSS),
    ("date", DATE_CSS),
    ("app_menu", APP_MENU_CSS),
    ("dock", DOCK_CSS),
    ("notification", NOTIFICATION_CSS),
];
