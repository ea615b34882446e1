use kaneru_core::services::notifications::{
    load_history, save_history, Notification, NotificationHints, NotificationStore, Urgency,
};

fn notification(id: u32, summary: &str, hints: NotificationHints) -> Notification {
    Notification::new(
        id,
        "mail".to_string(),
        0,
        "mail-unread".to_string(),
        summary.to_string(),
        String::new(),
        vec!["open".to_string(), "Open".to_string()],
        -1,
        hints,
    )
}

#[test]
fn history_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("notifications.json");

    let mut store = NotificationStore::new(2);
    store.insert(notification(1, "first", NotificationHints::default()));
    store.insert(notification(
        2,
        "second",
        NotificationHints {
            urgency: Urgency::Critical,
            ..Default::default()
        },
    ));
    store.insert(notification(3, "third", NotificationHints::default()));
    save_history(&path, &store.history_snapshot()).unwrap();

    let loaded = load_history(&path).unwrap();
    let summaries: Vec<_> = loaded.iter().map(|n| n.summary.as_str()).collect();
    assert_eq!(summaries, vec!["third", "second"]);
    assert_eq!(loaded[1].urgency, Urgency::Critical);
    assert_eq!(loaded[0].action_pairs().collect::<Vec<_>>(), vec![("open", "Open")]);

    let restored = NotificationStore::with_history(2, loaded);
    assert_eq!(restored.history().count(), 2);
    assert!(restored.active_ids().is_empty());
}

#[test]
fn empty_or_missing_history_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notifications.json");
    assert!(load_history(&path).unwrap().is_empty());

    std::fs::write(&path, "  \n").unwrap();
    assert!(load_history(&path).unwrap().is_empty());

    std::fs::write(&path, "[{").unwrap();
    assert!(load_history(&path).is_err());
}

#[test]
fn transient_notifications_are_not_persisted() {
    let mut store = NotificationStore::new(10);
    store.insert(notification(
        7,
        "volume",
        NotificationHints {
            transient: true,
            ..Default::default()
        },
    ));

    assert!(store.is_active(7));
    assert!(store.history_snapshot().is_empty());
}
