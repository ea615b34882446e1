use ahash::AHashMap;
use tracing::debug;

const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];
const FALLBACK_ICON: &str = "distributor-logo";

/// Parse `os-release` style `KEY=value` lines
pub fn parse_os_release(text: &str) -> AHashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Icon name for the running distribution (`LOGO`, then `ID`)
pub fn distro_icon_name() -> String {
    for path in OS_RELEASE_PATHS {
        if let Ok(text) = std::fs::read_to_string(path) {
            let fields = parse_os_release(&text);
            if let Some(icon) = icon_from_fields(&fields) {
                debug!("Distro icon from {}: {}", path, icon);
                return icon;
            }
        }
    }
    FALLBACK_ICON.to_string()
}

fn icon_from_fields(fields: &AHashMap<String, String>) -> Option<String> {
    fields
        .get("LOGO")
        .filter(|logo| !logo.is_empty())
        .cloned()
        .or_else(|| {
            fields
                .get("ID")
                .filter(|id| !id.is_empty())
                .cloned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quotes_and_skips_comments() {
        let text = "# comment\nNAME=\"Arch Linux\"\nID=arch\nLOGO='archlinux-logo'\n\nBROKEN\n";
        let fields = parse_os_release(text);
        assert_eq!(fields.get("NAME").map(String::as_str), Some("Arch Linux"));
        assert_eq!(fields.get("ID").map(String::as_str), Some("arch"));
        assert_eq!(fields.get("LOGO").map(String::as_str), Some("archlinux-logo"));
        assert!(!fields.contains_key("BROKEN"));
    }

    #[test]
    fn logo_wins_over_id() {
        let fields = parse_os_release("ID=fedora\nLOGO=fedora-logo-icon\n");
        assert_eq!(icon_from_fields(&fields).as_deref(), Some("fedora-logo-icon"));

        let fields = parse_os_release("ID=nixos\n");
        assert_eq!(
            icon_from_fields(&fields).as_deref(),
            Some("nixos")
        );

        assert_eq!(icon_from_fields(&parse_os_release("")), None);
    }
}
