use serde::{Deserialize, Serialize};
use zbus::zvariant::Value;

/// Urgency level from the `urgency` hint (byte 0/1/2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    Critical,
}

impl Urgency {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Low),
            1 => Some(Self::Normal),
            2 => Some(Self::Critical),
            _ => None,
        }
    }

    /// CSS class applied to the popup
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Critical => "critical",
        }
    }
}

/// Reason carried by the `NotificationClosed` signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Expired,
    Dismissed,
    Closed,
    Undefined,
}

impl CloseReason {
    pub fn code(&self) -> u32 {
        match self {
            Self::Expired => 1,
            Self::Dismissed => 2,
            Self::Closed => 3,
            Self::Undefined => 4,
        }
    }
}

/// Hints the shell understands; everything else is ignored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationHints {
    pub urgency: Urgency,
    pub image_path: Option<String>,
    pub resident: bool,
    pub transient: bool,
    pub desktop_entry: Option<String>,
}

impl NotificationHints {
    /// Read the known hints, skipping values of the wrong type
    pub fn parse<'a, 'v: 'a, I>(hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Value<'v>)>,
    {
        let mut parsed = Self::default();

        for (key, value) in hints {
            match (key, value) {
                ("urgency", Value::U8(byte)) => {
                    parsed.urgency = Urgency::from_byte(*byte).unwrap_or_default();
                }
                ("image-path" | "image_path", Value::Str(path)) if !path.as_str().is_empty() => {
                    parsed.image_path = Some(path.as_str().to_string());
                }
                ("resident", Value::Bool(flag)) => parsed.resident = *flag,
                ("transient", Value::Bool(flag)) => parsed.transient = *flag,
                ("desktop-entry", Value::Str(entry)) if !entry.as_str().is_empty() => {
                    parsed.desktop_entry = Some(entry.as_str().to_string());
                }
                _ => {}
            }
        }

        parsed
    }
}

/// A notification as received over D-Bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u32,
    pub app_name: String,
    #[serde(default)]
    pub replaces_id: u32,
    #[serde(default)]
    pub app_icon: String,
    pub summary: String,
    #[serde(default)]
    pub body: String,
    /// Flat `[key, label, key, label, ...]` list
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default = "default_expire_timeout")]
    pub expire_timeout: i32,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default)]
    pub resident: bool,
    #[serde(default)]
    pub transient: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop_entry: Option<String>,
    /// Unix timestamp (seconds) of arrival
    #[serde(default)]
    pub received_at: i64,
}

fn default_expire_timeout() -> i32 {
    -1
}

impl Notification {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        app_name: String,
        replaces_id: u32,
        app_icon: String,
        summary: String,
        body: String,
        actions: Vec<String>,
        expire_timeout: i32,
        hints: NotificationHints,
    ) -> Self {
        Self {
            id,
            app_name,
            replaces_id,
            app_icon,
            summary,
            body,
            actions,
            expire_timeout,
            urgency: hints.urgency,
            image_path: hints.image_path,
            resident: hints.resident,
            transient: hints.transient,
            desktop_entry: hints.desktop_entry,
            received_at: chrono::Local::now().timestamp(),
        }
    }

    /// Action `(key, label)` pairs; a trailing unpaired key is dropped
    pub fn action_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.actions
            .chunks(2)
            .filter(|pair| pair.len() == 2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Icon to show: image hint first, then the app icon
    pub fn icon(&self) -> Option<&str> {
        self.image_path
            .as_deref()
            .or(Some(self.app_icon.as_str()))
            .filter(|icon| !icon.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_are_read_by_type() {
        let urgency = Value::U8(2);
        let image = Value::from("/tmp/cover.png");
        let resident = Value::Bool(true);
        let wrong_type = Value::from("yes");

        let hints = NotificationHints::parse([
            ("urgency", &urgency),
            ("image-path", &image),
            ("resident", &resident),
            ("transient", &wrong_type),
        ]);

        assert_eq!(hints.urgency, Urgency::Critical);
        assert_eq!(hints.image_path.as_deref(), Some("/tmp/cover.png"));
        assert!(hints.resident);
        assert!(!hints.transient);
    }

    #[test]
    fn unknown_urgency_falls_back_to_normal() {
        let urgency = Value::U8(9);
        let hints = NotificationHints::parse([("urgency", &urgency)]);
        assert_eq!(hints.urgency, Urgency::Normal);
    }

    #[test]
    fn action_pairs_skip_unpaired_key() {
        let mut n = Notification::new(
            1,
            "app".into(),
            0,
            String::new(),
            "summary".into(),
            String::new(),
            vec!["default".into(), "Open".into(), "dangling".into()],
            -1,
            NotificationHints::default(),
        );
        assert_eq!(n.action_pairs().collect::<Vec<_>>(), vec![("default", "Open")]);
        assert_eq!(n.icon(), None);

        n.app_icon = "firefox".into();
        assert_eq!(n.icon(), Some("firefox"));
    }

    #[test]
    fn close_reason_codes() {
        assert_eq!(CloseReason::Expired.code(), 1);
        assert_eq!(CloseReason::Dismissed.code(), 2);
        assert_eq!(CloseReason::Closed.code(), 3);
        assert_eq!(CloseReason::Undefined.code(), 4);
    }

    #[test]
    fn history_entries_deserialize_with_missing_fields() {
        let json = r#"{ "id": 4, "app_name": "mail", "summary": "New mail", "urgency": "critical" }"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.id, 4);
        assert_eq!(n.urgency, Urgency::Critical);
        assert_eq!(n.expire_timeout, -1);
        assert!(n.actions.is_empty());
    }
}
