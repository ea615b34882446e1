use std::time::Duration;

use crate::config::NotificationConfig;
use crate::services::notifications::{Notification, Urgency};

/// How long a popup stays up; None means until dismissed
pub fn expire_after(notification: &Notification, config: &NotificationConfig) -> Option<Duration> {
    let default = Duration::from_millis(config.default_timeout_ms);

    match notification.expire_timeout {
        0 => None,
        -1 if notification.resident => None,
        -1 if notification.urgency == Urgency::Critical => {
            Some(Duration::from_millis(config.critical_timeout_ms))
        }
        -1 => Some(default),
        ms if ms > 0 => Some(Duration::from_millis(ms as u64)),
        _ => Some(default),
    }
}

/// Where a pushed notification landed in the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// Final position of the notification
    pub index: usize,
    /// Id of the popup it replaced in place
    pub replaced: Option<u32>,
    /// Oldest popup dropped to respect `max_visible`
    pub evicted: Option<u32>,
}

/// Ordered ids of the visible popups, oldest first
#[derive(Debug, Clone)]
pub struct NotificationStack {
    ids: Vec<u32>,
    max_visible: usize,
    margin_top: i32,
    spacing: i32,
}

impl NotificationStack {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            ids: Vec::new(),
            max_visible: config.max_visible.max(1),
            margin_top: config.margin_top,
            spacing: config.spacing,
        }
    }

    pub fn push(&mut self, notification: &Notification) -> PushOutcome {
        let existing = self.ids.iter().position(|&id| {
            id == notification.id
                || (notification.replaces_id != 0 && id == notification.replaces_id)
        });

        if let Some(index) = existing {
            let replaced = self.ids[index];
            self.ids[index] = notification.id;
            // A replacement may duplicate another visible id
            let mut seen = false;
            self.ids.retain(|&id| {
                if id != notification.id {
                    return true;
                }
                let keep = !seen;
                seen = true;
                keep
            });
            let index = self
                .ids
                .iter()
                .position(|&id| id == notification.id)
                .unwrap_or(index);
            return PushOutcome {
                index,
                replaced: Some(replaced),
                evicted: None,
            };
        }

        self.ids.push(notification.id);
        let evicted = (self.ids.len() > self.max_visible).then(|| self.ids.remove(0));

        PushOutcome {
            index: self.ids.len() - 1,
            replaced: None,
            evicted,
        }
    }

    /// Returns true when the id was visible
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&i| i != id);
        self.ids.len() != before
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.ids)
    }

    pub fn set_config(&mut self, config: &NotificationConfig) {
        self.max_visible = config.max_visible.max(1);
        self.margin_top = config.margin_top;
        self.spacing = config.spacing;
    }

    /// Edge margin for each popup given the current popup heights
    pub fn layout(&self, heights: &[i32]) -> Vec<i32> {
        let mut offset = self.margin_top;
        heights
            .iter()
            .map(|&height| {
                let margin = offset;
                offset += height.max(1) + self.spacing;
                margin
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::NotificationHints;

    fn notification(id: u32, replaces_id: u32) -> Notification {
        Notification::new(
            id,
            "app".into(),
            replaces_id,
            String::new(),
            format!("#{}", id),
            String::new(),
            Vec::new(),
            -1,
            NotificationHints::default(),
        )
    }

    fn config(max_visible: usize) -> NotificationConfig {
        NotificationConfig {
            max_visible,
            ..NotificationConfig::default()
        }
    }

    #[test]
    fn expiry_rules() {
        let config = NotificationConfig::default();
        let mut n = notification(1, 0);

        assert_eq!(expire_after(&n, &config), Some(Duration::from_secs(5)));

        n.expire_timeout = 0;
        assert_eq!(expire_after(&n, &config), None);

        n.expire_timeout = 1500;
        assert_eq!(expire_after(&n, &config), Some(Duration::from_millis(1500)));

        n.expire_timeout = -7;
        assert_eq!(expire_after(&n, &config), Some(Duration::from_secs(5)));

        n.expire_timeout = -1;
        n.urgency = Urgency::Critical;
        assert_eq!(expire_after(&n, &config), Some(Duration::from_secs(10)));

        n.resident = true;
        assert_eq!(expire_after(&n, &config), None);
    }

    #[test]
    fn push_appends_and_evicts_oldest() {
        let mut stack = NotificationStack::new(&config(2));
        stack.push(&notification(1, 0));
        stack.push(&notification(2, 0));
        let outcome = stack.push(&notification(3, 0));

        assert_eq!(
            outcome,
            PushOutcome {
                index: 1,
                replaced: None,
                evicted: Some(1),
            }
        );
        assert_eq!(stack.ids(), &[2, 3]);
    }

    #[test]
    fn push_replaces_in_place() {
        let mut stack = NotificationStack::new(&config(5));
        stack.push(&notification(1, 0));
        stack.push(&notification(2, 0));
        stack.push(&notification(3, 0));

        let outcome = stack.push(&notification(2, 2));
        assert_eq!(outcome.index, 1);
        assert_eq!(outcome.replaced, Some(2));
        assert_eq!(stack.ids(), &[1, 2, 3]);

        let outcome = stack.push(&notification(9, 1));
        assert_eq!(outcome.index, 0);
        assert_eq!(outcome.replaced, Some(1));
        assert_eq!(stack.ids(), &[9, 2, 3]);
    }

    #[test]
    fn layout_accumulates_heights() {
        let mut stack = NotificationStack::new(&config(5));
        for id in 1..=3 {
            stack.push(&notification(id, 0));
        }

        assert_eq!(stack.layout(&[80, 0, 120]), vec![20, 110, 121]);
        assert!(stack.layout(&[]).is_empty());
    }

    #[test]
    fn remove_reports_presence() {
        let mut stack = NotificationStack::new(&config(5));
        stack.push(&notification(4, 0));
        assert!(stack.remove(4));
        assert!(!stack.remove(4));
        assert!(stack.is_empty());
    }
}
