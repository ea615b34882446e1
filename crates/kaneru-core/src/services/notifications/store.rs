use ahash::AHashMap;
use std::collections::VecDeque;

use super::model::Notification;

/// Active notifications plus a bounded, newest-first history
#[derive(Debug)]
pub struct NotificationStore {
    active: AHashMap<u32, Notification>,
    history: VecDeque<Notification>,
    history_limit: usize,
}

impl NotificationStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            active: AHashMap::new(),
            history: VecDeque::new(),
            history_limit,
        }
    }

    /// Seed history from disk (expects newest first)
    pub fn with_history(history_limit: usize, history: Vec<Notification>) -> Self {
        let mut store = Self::new(history_limit);
        store.history = history.into_iter().collect();
        store.history.truncate(history_limit);
        store
    }

    /// Track a new notification. Returns true when the history changed.
    pub fn insert(&mut self, notification: Notification) -> bool {
        if notification.replaces_id != 0 && notification.replaces_id != notification.id {
            self.active.remove(&notification.replaces_id);
        }

        let recorded = !notification.transient;
        if recorded {
            let id = notification.id;
            self.history.retain(|n| n.id != id);
            self.history.push_front(notification.clone());
            self.history.truncate(self.history_limit);
        }

        self.active.insert(notification.id, notification);
        recorded
    }

    /// Drop from the active set; history is kept
    pub fn close(&mut self, id: u32) -> Option<Notification> {
        self.active.remove(&id)
    }

    pub fn is_active(&self, id: u32) -> bool {
        self.active.contains_key(&id)
    }

    pub fn get(&self, id: u32) -> Option<&Notification> {
        self.active.get(&id)
    }

    pub fn active_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.active.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn history(&self) -> impl Iterator<Item = &Notification> {
        self.history.iter()
    }

    pub fn history_snapshot(&self) -> Vec<Notification> {
        self.history.iter().cloned().collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Change the bound, trimming the oldest entries. Returns true when history shrank.
    pub fn set_history_limit(&mut self, limit: usize) -> bool {
        self.history_limit = limit;
        let before = self.history.len();
        self.history.truncate(limit);
        self.history.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::NotificationHints;

    fn notification(id: u32, replaces_id: u32, summary: &str) -> Notification {
        Notification::new(
            id,
            "test".into(),
            replaces_id,
            String::new(),
            summary.into(),
            String::new(),
            Vec::new(),
            -1,
            NotificationHints::default(),
        )
    }

    #[test]
    fn history_is_newest_first_and_bounded() {
        let mut store = NotificationStore::new(2);
        store.insert(notification(1, 0, "one"));
        store.insert(notification(2, 0, "two"));
        store.insert(notification(3, 0, "three"));

        let ids: Vec<u32> = store.history().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(store.active_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn replacement_moves_to_front_of_history() {
        let mut store = NotificationStore::new(10);
        store.insert(notification(1, 0, "downloading"));
        store.insert(notification(2, 0, "other"));
        store.insert(notification(1, 1, "done"));

        let summaries: Vec<&str> = store.history().map(|n| n.summary.as_str()).collect();
        assert_eq!(summaries, vec!["done", "other"]);
        assert_eq!(store.get(1).map(|n| n.summary.as_str()), Some("done"));
    }

    #[test]
    fn transient_notifications_skip_history() {
        let mut store = NotificationStore::new(10);
        let mut n = notification(7, 0, "volume");
        n.transient = true;

        assert!(!store.insert(n));
        assert_eq!(store.history().count(), 0);
        assert!(store.is_active(7));
    }

    #[test]
    fn close_keeps_history() {
        let mut store = NotificationStore::new(10);
        store.insert(notification(5, 0, "hello"));

        assert!(store.close(5).is_some());
        assert!(store.close(5).is_none());
        assert_eq!(store.history().count(), 1);

        store.clear_history();
        assert_eq!(store.history().count(), 0);
    }

    #[test]
    fn lowering_the_limit_trims_oldest() {
        let mut store = NotificationStore::new(10);
        for id in 1..=4 {
            store.insert(notification(id, 0, "n"));
        }

        assert!(store.set_history_limit(2));
        let ids: Vec<u32> = store.history().map(|n| n.id).collect();
        assert_eq!(ids, vec![4, 3]);

        assert!(!store.set_history_limit(5));
        store.insert(notification(5, 0, "n"));
        store.insert(notification(6, 0, "n"));
        store.insert(notification(7, 0, "n"));
        assert_eq!(store.history().count(), 5);
    }
}
