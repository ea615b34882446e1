mod css;

use gtk4::gdk::Display;
use gtk4::CssProvider;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::ConfigPaths;

pub use css::SURFACES;

/// Shared stylesheet variables.
///
/// Surface stylesheets refer to these as `$name` (`$fg-dim`, `$radius-sm`);
/// `$space-N` expands to `N * 4px`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub bg: String,
    pub surface: String,
    pub surface_alt: String,
    pub border: String,
    pub fg: String,
    pub fg_dim: String,
    pub accent: String,
    pub accent_fg: String,
    pub success: String,
    pub warning: String,
    pub critical: String,
    pub radius: u32,
    pub radius_small: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg: "#11111b".to_string(),
            surface: "#1e1e2e".to_string(),
            surface_alt: "#313244".to_string(),
            border: "#45475a".to_string(),
            fg: "#cdd6f4".to_string(),
            fg_dim: "#a6adc8".to_string(),
            accent: "#89b4fa".to_string(),
            accent_fg: "#11111b".to_string(),
            success: "#a6e3a1".to_string(),
            warning: "#f9e2af".to_string(),
            critical: "#f38ba8".to_string(),
            radius: 12,
            radius_small: 8,
        }
    }
}

/// `n` spacing units of 4px
pub fn space(n: u32) -> String {
    format!("{}px", n * 4)
}

impl Palette {
    fn lookup(&self, name: &str) -> Option<String> {
        let value = match name {
            "bg" => self.bg.clone(),
            "surface" => self.surface.clone(),
            "surface-alt" => self.surface_alt.clone(),
            "border" => self.border.clone(),
            "fg" => self.fg.clone(),
            "fg-dim" => self.fg_dim.clone(),
            "accent" => self.accent.clone(),
            "accent-fg" => self.accent_fg.clone(),
            "success" => self.success.clone(),
            "warning" => self.warning.clone(),
            "critical" => self.critical.clone(),
            "radius" => format!("{}px", self.radius),
            "radius-sm" => format!("{}px", self.radius_small),
            _ => return space(name.strip_prefix("space-")?.parse().ok()?).into(),
        };
        Some(value)
    }

    /// Replace every `$variable` in `source`; unknown names are left untouched
    pub fn resolve(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        let mut rest = source;

        while let Some(idx) = rest.find('$') {
            out.push_str(&rest[..idx]);
            let after = &rest[idx + 1..];
            let len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(after.len());
            let name = &after[..len];

            match self.lookup(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &after[len..];
        }

        out.push_str(rest);
        out
    }
}

/// Full stylesheet for every surface with palette variables resolved
pub fn stylesheet(palette: &Palette) -> String {
    SURFACES
        .iter()
        .map(|(name, source)| format!("/* ===== {} ===== */\n{}", name, palette.resolve(source)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Installed CSS providers, kept so the user layer can be reloaded
pub struct Theme {
    user: CssProvider,
}

impl Theme {
    /// Re-read `style.css`; a missing file clears the user layer
    pub fn reload_user_css(&self, path: &Path) {
        if path.exists() {
            self.user.load_from_path(path);
            debug!("User CSS loaded from {:?}", path);
        } else {
            self.user.load_from_data("");
        }
    }
}

/// Install the generated theme, then the user's `style.css` on top of it
pub fn load_css(paths: &ConfigPaths) -> Option<Theme> {
    let Some(display) = Display::default() else {
        warn!("No default display, skipping CSS");
        return None;
    };

    let base = CssProvider::new();
    base.load_from_data(&stylesheet(&Palette::default()));
    gtk4::style_context_add_provider_for_display(
        &display,
        &base,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );

    let user = CssProvider::new();
    gtk4::style_context_add_provider_for_display(
        &display,
        &user,
        gtk4::STYLE_PROVIDER_PRIORITY_USER,
    );

    let theme = Theme { user };
    theme.reload_user_css(&paths.user_css);
    debug!("CSS theme loaded");
    Some(theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Body of the first rule whose selector list contains `selector`
    fn rule_body<'a>(css: &'a str, selector: &str) -> Option<&'a str> {
        let mut rest = css;
        while let Some(open) = rest.find('{') {
            let selectors = &rest[..open];
            let close = open + rest[open..].find('}')?;
            let body = &rest[open + 1..close];

            let selectors = match selectors.rfind("*/") {
                Some(end) => &selectors[end + 2..],
                None => selectors,
            };
            if selectors.split(',').any(|s| s.trim() == selector) {
                return Some(body);
            }
            rest = &rest[close + 1..];
        }
        None
    }

    #[test]
    fn variables_resolve() {
        let palette = Palette::default();
        assert_eq!(palette.resolve("padding: $space-2 $space-3;"), "padding: 8px 12px;");
        assert_eq!(palette.resolve("color: $fg-dim;"), "color: #a6adc8;");
        assert_eq!(palette.resolve("$nope"), "$nope");
    }

    #[test]
    fn generated_stylesheet_has_no_unresolved_variables() {
        let css = stylesheet(&Palette::default());
        assert!(!css.contains('$'), "unresolved variable in stylesheet");
        assert_eq!(css.matches('{').count(), css.matches('}').count());
    }

    #[test]
    fn mute_button_hover_has_background() {
        let css = stylesheet(&Palette::default());
        let body = rule_body(&css, ".mute-button:hover").expect("rule missing");
        assert!(body.contains("background"));
    }

    #[test]
    fn component_classes_are_styled() {
        let css = stylesheet(&Palette::default());
        for selector in [
            ".device-item",
            ".power-mode-button",
            ".network-item",
            ".dock-item",
            ".dock-item.active .indicator",
            ".notification",
            ".notification.critical",
            ".media-window",
            ".brightness-slider",
            ".date-calendar",
            ".app-menu-item",
            ".window-title",
            ".media-button",
        ] {
            let body = rule_body(&css, selector)
                .unwrap_or_else(|| panic!("no rule for {}", selector));
            assert!(!body.trim().is_empty(), "empty rule for {}", selector);
        }
    }
}
