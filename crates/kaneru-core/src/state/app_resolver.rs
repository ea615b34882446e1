use ahash::AHashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const FALLBACK_ICON: &str = "application-x-executable";
const MIN_FUZZY_SCORE: i32 = 30;
const LAUNCH_FLAGS: [&str; 3] = ["--new-window", "--incognito", "--private-window"];

/// Application parsed from a `.desktop` entry
#[derive(Debug, Clone, PartialEq)]
pub struct AppInfo {
    /// File stem, e.g. `org.gnome.Nautilus`
    pub desktop_id: String,
    pub name: String,
    pub icon: String,
    /// Exec line with field codes removed
    pub exec: String,
    pub generic_name: Option<String>,
    pub keywords: Vec<String>,
}

impl AppInfo {
    /// Themed icon name, or the generic executable icon for paths
    pub fn icon_name(&self) -> &str {
        if self.icon.is_empty() || self.icon.contains('/') {
            FALLBACK_ICON
        } else {
            &self.icon
        }
    }

    /// Whether a compositor `app_id` belongs to this application
    pub fn matches_app_id(&self, app_id: &str) -> bool {
        let app_id = app_id.to_lowercase();
        app_id == self.desktop_id.to_lowercase()
            || app_id == AppResolver::command_name(&self.exec).to_lowercase()
    }
}

/// Parse the `[Desktop Entry]` group of a desktop file
pub fn parse_desktop_entry(content: &str, desktop_id: &str) -> Option<AppInfo> {
    let mut name = None;
    let mut icon = None;
    let mut exec = None;
    let mut generic_name = None;
    let mut keywords = Vec::new();
    let mut app_type = None;
    let mut hidden = false;
    let mut in_desktop_entry = false;

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            in_desktop_entry = line == "[Desktop Entry]";
            continue;
        }

        if !in_desktop_entry {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();

        // Localized keys (`Name[de]=`) are ignored
        match key.trim() {
            "Name" => name = Some(value.to_string()),
            "GenericName" => generic_name = Some(value.to_string()),
            "Icon" if !value.is_empty() => icon = Some(value.to_string()),
            "Exec" => exec = Some(AppResolver::clean_exec(value).join(" ")),
            "Keywords" => {
                keywords = value
                    .split(';')
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
            }
            "Type" => app_type = Some(value.to_string()),
            "NoDisplay" | "Hidden" => hidden |= value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    if hidden || app_type.as_deref() != Some("Application") {
        return None;
    }

    let exec = exec.filter(|e| !e.is_empty())?;

    Some(AppInfo {
        desktop_id: desktop_id.to_string(),
        name: name?,
        icon: icon.unwrap_or_else(|| FALLBACK_ICON.to_string()),
        exec,
        generic_name,
        keywords,
    })
}

/// Maps names, commands and desktop ids to installed applications
#[derive(Debug, Clone, Default)]
pub struct AppResolver {
    apps: Vec<AppInfo>,
    by_name: AHashMap<String, usize>,
    by_exec: AHashMap<String, usize>,
    by_desktop_id: AHashMap<String, usize>,
}

impl AppResolver {
    /// Scan every application directory on the system
    pub fn new() -> Self {
        let resolver = Self::from_apps(Self::search_dirs().iter().flat_map(|dir| scan_dir(dir)));
        debug!("Indexed {} applications", resolver.apps.len());
        resolver
    }

    /// Build from already parsed entries; later entries win on duplicate ids
    pub fn from_apps(apps: impl IntoIterator<Item = AppInfo>) -> Self {
        let mut resolver = Self::default();
        for app in apps {
            resolver.register(app);
        }
        resolver
    }

    /// Lowest to highest precedence
    fn search_dirs() -> Vec<PathBuf> {
        let mut dirs_list = Vec::new();

        match std::env::var_os("XDG_DATA_DIRS") {
            Some(data_dirs) => {
                let mut paths: Vec<PathBuf> = std::env::split_paths(&data_dirs).collect();
                // XDG lists highest precedence first
                paths.reverse();
                dirs_list.extend(paths.into_iter().map(|p| p.join("applications")));
            }
            None => {
                dirs_list.push(PathBuf::from("/usr/share/applications"));
                dirs_list.push(PathBuf::from("/usr/local/share/applications"));
            }
        }

        dirs_list.push(PathBuf::from("/var/lib/flatpak/exports/share/applications"));

        if let Some(data) = dirs::data_dir() {
            dirs_list.push(data.join("flatpak/exports/share/applications"));
            dirs_list.push(data.join("applications"));
        }

        dirs_list
    }

    fn register(&mut self, app: AppInfo) {
        let desktop_key = app.desktop_id.to_lowercase();

        let index = match self.by_desktop_id.get(&desktop_key) {
            Some(&index) => {
                self.apps[index] = app;
                index
            }
            None => {
                self.apps.push(app);
                self.apps.len() - 1
            }
        };

        let app = &self.apps[index];
        self.by_desktop_id.insert(desktop_key, index);
        self.by_name.insert(app.name.to_lowercase(), index);
        self.by_exec
            .insert(Self::command_name(&app.exec).to_lowercase(), index);

        let secondary = app
            .generic_name
            .iter()
            .map(|g| g.to_lowercase())
            .chain(app.keywords.iter().cloned())
            .collect::<Vec<_>>();
        for key in secondary {
            self.by_name.entry(key).or_insert(index);
        }
    }

    /// Resolve a name, command or desktop id, falling back to fuzzy matching
    pub fn resolve(&self, query: &str) -> Option<&AppInfo> {
        let query = query.to_lowercase();

        self.by_name
            .get(&query)
            .or_else(|| self.by_exec.get(&query))
            .or_else(|| self.by_desktop_id.get(&query))
            .map(|&i| &self.apps[i])
            .or_else(|| self.fuzzy_search(&query))
    }

    pub fn resolve_by_desktop_id(&self, desktop_id: &str) -> Option<&AppInfo> {
        self.by_desktop_id
            .get(&desktop_id.to_lowercase())
            .map(|&i| &self.apps[i])
    }

    /// Application owning a compositor window `app_id`
    pub fn resolve_app_id(&self, app_id: &str) -> Option<&AppInfo> {
        let key = app_id.to_lowercase();
        self.by_desktop_id
            .get(&key)
            .or_else(|| self.by_exec.get(&key))
            .map(|&i| &self.apps[i])
    }

    /// All applications sorted by name
    pub fn apps_sorted(&self) -> Vec<&AppInfo> {
        let mut apps: Vec<&AppInfo> = self.apps.iter().collect();
        apps.sort_by_cached_key(|a| a.name.to_lowercase());
        apps
    }

    /// Substring search over name, generic name, keywords and desktop id
    pub fn search(&self, query: &str) -> Vec<&AppInfo> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.apps_sorted();
        }

        self.apps_sorted()
            .into_iter()
            .filter(|app| {
                app.name.to_lowercase().contains(&query)
                    || app.desktop_id.to_lowercase().contains(&query)
                    || app
                        .generic_name
                        .as_ref()
                        .is_some_and(|g| g.to_lowercase().contains(&query))
                    || app.keywords.iter().any(|k| k.contains(&query))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Split an Exec line into argv, dropping `%f`-style field codes
    pub fn clean_exec(exec: &str) -> Vec<String> {
        exec.split_whitespace()
            .filter(|part| !part.starts_with('%'))
            .map(str::to_string)
            .collect()
    }

    /// Basename of the program an Exec line runs, ignoring browser flags
    pub fn command_name(exec: &str) -> String {
        let program = Self::clean_exec(exec)
            .into_iter()
            .find(|part| !LAUNCH_FLAGS.contains(&part.as_str()))
            .unwrap_or_default();

        program
            .rsplit('/')
            .next()
            .unwrap_or(program.as_str())
            .to_string()
    }

    fn fuzzy_search(&self, query: &str) -> Option<&AppInfo> {
        let (score, app) = self
            .apps
            .iter()
            .map(|app| (Self::app_score(query, app), app))
            .fold((0, None), |best, (score, app)| {
                if score > best.0 {
                    (score, Some(app))
                } else {
                    best
                }
            });

        app.filter(|_| score > MIN_FUZZY_SCORE)
    }

    fn app_score(query: &str, app: &AppInfo) -> i32 {
        let command = Self::command_name(&app.exec);

        let mut candidates: Vec<(String, &str)> = vec![
            (app.name.to_lowercase(), app.name.as_str()),
            (app.desktop_id.to_lowercase(), app.desktop_id.as_str()),
            (command.to_lowercase(), app.exec.as_str()),
        ];
        if let Some(generic) = &app.generic_name {
            candidates.push((generic.to_lowercase(), generic.as_str()));
        }
        for keyword in &app.keywords {
            candidates.push((keyword.clone(), keyword.as_str()));
        }

        candidates
            .iter()
            .map(|(key, display)| match_score(query, key, display))
            .max()
            .unwrap_or(0)
    }
}

fn scan_dir(dir: &Path) -> Vec<AppInfo> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "desktop"))
        .filter_map(|path| {
            let desktop_id = path.file_stem()?.to_str()?.to_string();
            let content = std::fs::read_to_string(&path).ok()?;
            parse_desktop_entry(&content, &desktop_id)
        })
        .collect()
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect()
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Score how well `query` matches `key` (both lowercase); 0 means no match
fn match_score(query: &str, key: &str, display: &str) -> i32 {
    if key == query {
        return 100;
    }
    if key.starts_with(query) {
        return 90;
    }
    if key.contains(query) {
        return 70;
    }

    let display = display.to_lowercase();
    if display.contains(query) {
        return 60;
    }

    let query_normalized = normalize(query);
    if query_normalized.is_empty() {
        return 0;
    }
    if normalize(key).contains(&query_normalized) {
        return 65;
    }
    if normalize(&display).contains(&query_normalized) {
        return 55;
    }

    let query_words = words(query);
    if query_words.is_empty() {
        return 0;
    }

    let prefix_hits = |targets: &[String]| {
        query_words
            .iter()
            .filter(|q| targets.iter().any(|t| t.starts_with(q.as_str())))
            .count()
    };

    let mut matches = prefix_hits(&words(key));
    if matches == 0 {
        matches = prefix_hits(&words(&display));
    }

    (matches as i32 * 50) / query_words.len() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(desktop_id: &str, name: &str, exec: &str) -> AppInfo {
        AppInfo {
            desktop_id: desktop_id.to_string(),
            name: name.to_string(),
            icon: desktop_id.to_string(),
            exec: exec.to_string(),
            generic_name: None,
            keywords: Vec::new(),
        }
    }

    fn resolver() -> AppResolver {
        let mut files = app("org.gnome.Nautilus", "Files", "nautilus --new-window");
        files.generic_name = Some("File Manager".to_string());
        files.keywords = vec!["folder".to_string(), "explorer".to_string()];

        AppResolver::from_apps([
            app("firefox", "Firefox", "/usr/lib/firefox/firefox"),
            app("foot", "Foot", "foot"),
            files,
            app("com.visualstudio.code", "Visual Studio Code", "code --unity-launch"),
        ])
    }

    #[test]
    fn parses_desktop_entry_and_strips_field_codes() {
        let content = "\
[Desktop Entry]
Type=Application
Name=Firefox
Name[de]=Feuerfuchs
GenericName=Web Browser
Exec=firefox %u
Icon=firefox
Keywords=web;browser;internet;

[Desktop Action new-window]
Name=New Window
Exec=firefox --new-window %u
";
        let info = parse_desktop_entry(content, "firefox").unwrap();
        assert_eq!(info.name, "Firefox");
        assert_eq!(info.exec, "firefox");
        assert_eq!(info.generic_name.as_deref(), Some("Web Browser"));
        assert_eq!(info.keywords, vec!["web", "browser", "internet"]);
    }

    #[test]
    fn hidden_and_non_application_entries_are_skipped() {
        let hidden = "[Desktop Entry]\nType=Application\nName=X\nExec=x\nNoDisplay=true\n";
        let link = "[Desktop Entry]\nType=Link\nName=Docs\nURL=https://example.com\n";
        let no_exec = "[Desktop Entry]\nType=Application\nName=Broken\n";

        assert!(parse_desktop_entry(hidden, "x").is_none());
        assert!(parse_desktop_entry(link, "docs").is_none());
        assert!(parse_desktop_entry(no_exec, "broken").is_none());
    }

    #[test]
    fn missing_icon_uses_fallback() {
        let content = "[Desktop Entry]\nType=Application\nName=Tool\nExec=tool\n";
        let info = parse_desktop_entry(content, "tool").unwrap();
        assert_eq!(info.icon, FALLBACK_ICON);
    }

    #[test]
    fn command_name_strips_paths_and_flags() {
        assert_eq!(AppResolver::command_name("/usr/bin/firefox %u"), "firefox");
        assert_eq!(AppResolver::command_name("--new-window chromium"), "chromium");
        assert_eq!(AppResolver::command_name("nautilus --new-window"), "nautilus");
        assert_eq!(AppResolver::command_name(""), "");
    }

    #[test]
    fn clean_exec_drops_field_codes() {
        assert_eq!(
            AppResolver::clean_exec("env FOO=1 app %F --flag %u"),
            vec!["env", "FOO=1", "app", "--flag"]
        );
    }

    #[test]
    fn exact_maps_are_tried_first() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("FOOT").unwrap().desktop_id, "foot");
        assert_eq!(resolver.resolve("nautilus").unwrap().name, "Files");
        assert_eq!(resolver.resolve("file manager").unwrap().name, "Files");
        assert_eq!(resolver.resolve("folder").unwrap().name, "Files");
        assert_eq!(
            resolver.resolve("org.gnome.nautilus").unwrap().name,
            "Files"
        );
    }

    #[test]
    fn fuzzy_matching_accepts_prefixes_and_words() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("fire").unwrap().desktop_id, "firefox");
        assert_eq!(
            resolver.resolve("visual code").unwrap().desktop_id,
            "com.visualstudio.code"
        );
        assert!(resolver.resolve("zzzz").is_none());
    }

    #[test]
    fn match_scores_follow_ranking() {
        assert_eq!(match_score("foot", "foot", "Foot"), 100);
        assert_eq!(match_score("fo", "foot", "Foot"), 90);
        assert_eq!(match_score("oo", "foot", "Foot"), 70);
        assert_eq!(match_score("studio", "code", "Visual Studio Code"), 60);
        assert_eq!(match_score("gnome-nau", "gnomenautilus", "x"), 65);
        assert_eq!(match_score("vis stu", "code", "visual studio"), 50);
        assert_eq!(match_score("vis xyz", "code", "visual studio"), 25);
    }

    #[test]
    fn later_entries_override_same_desktop_id() {
        let resolver = AppResolver::from_apps([
            app("foot", "Foot", "foot"),
            app("foot", "Foot (user)", "foot --server"),
        ]);
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.resolve_by_desktop_id("foot").unwrap().name, "Foot (user)");
    }

    #[test]
    fn window_app_ids_match_desktop_id_or_command() {
        let resolver = resolver();
        let files = resolver.resolve("files").unwrap();
        assert!(files.matches_app_id("org.gnome.Nautilus"));
        assert!(files.matches_app_id("nautilus"));
        assert!(!files.matches_app_id("firefox"));
        assert_eq!(
            resolver.resolve_app_id("Firefox").map(|a| a.name.as_str()),
            Some("Firefox")
        );
    }

    #[test]
    fn search_filters_and_sorts() {
        let resolver = resolver();
        let names: Vec<&str> = resolver.search("o").iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Files", "Firefox", "Foot", "Visual Studio Code"]);

        let names: Vec<&str> = resolver.search("explorer").iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Files"]);
    }
}
