use std::fs;
use std::path::{Path, PathBuf};

use kaneru_core::{stylesheet, Palette};

/// Calls whose first string literal (before the statement ends) is a CSS class
const CLASS_CALLS: [&str; 4] = [
    "add_css_class(",
    "set_class(",
    "IconButton::new(",
    "self.build_section(",
];

fn sources(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

fn class_literals(source: &str) -> Vec<String> {
    let mut classes = Vec::new();
    for call in CLASS_CALLS {
        for (start, _) in source.match_indices(call) {
            let rest = &source[start + call.len()..];
            let statement = &rest[..rest.find(';').unwrap_or(rest.len())];
            let Some(open) = statement.find('"') else {
                continue;
            };
            let literal = &statement[open + 1..];
            if let Some(close) = literal.find('"') {
                classes.push(literal[..close].to_string());
            }
        }
    }
    classes
}

/// True when some selector names `.class` as a whole class token
fn is_styled(css: &str, class: &str) -> bool {
    let token = format!(".{}", class);
    css.match_indices(&token).any(|(at, _)| {
        css[at + token.len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    })
}

#[test]
fn every_component_class_has_a_rule() {
    let mut files = Vec::new();
    sources(&Path::new(env!("CARGO_MANIFEST_DIR")).join("src"), &mut files);

    let mut classes: Vec<String> = files
        .iter()
        .flat_map(|path| class_literals(&fs::read_to_string(path).unwrap()))
        .collect();
    classes.sort();
    classes.dedup();
    assert!(classes.len() > 40, "only found {:?}", classes);

    let css = stylesheet(&Palette::default());
    let unstyled: Vec<&String> = classes.iter().filter(|c| !is_styled(&css, c)).collect();
    assert!(unstyled.is_empty(), "classes without a rule: {:?}", unstyled);
}

#[test]
fn class_tokens_match_whole_names() {
    let css = ".bar-button:hover { color: red; }\n.low image { color: red; }";
    assert!(is_styled(css, "bar-button"));
    assert!(is_styled(css, "low"));
    assert!(!is_styled(css, "bar"));

    let source = r#"
        button.add_css_class("dock-item");
        root.add_css_class(notification.urgency.css_class());
        set_class(&button, "active", open && focused);
        let b = IconButton::new(volume_icon_name(None), "audio-button");
    "#;
    assert_eq!(class_literals(source), vec!["dock-item", "active", "audio-button"]);
}
