// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::civil::date;
use serde_json::json;
use synccal_core::{
    CalendarPlotter, Category, ConflictEntry, DayIndex, EntityKind, NotificationKind,
    ScheduleDraft, SyncOutcome,
};

use crate::common::{Harness, Scripted, conflict_payload, schedule_draft, schedule_json};

/// Registers schedule `S1` the way the server knows it.
async fn seed_s1(h: &Harness) {
    let draft = schedule_draft("mine", Category::Meeting, &["2024/05/01"]);
    let written = h.schedule_store.register(draft).await.unwrap();
    h.schedules
        .borrow_mut()
        .rename(&written.item.id, "S1")
        .unwrap();
}

fn s1_conflict() -> Scripted {
    Scripted::Conflict(conflict_payload(
        "schedule",
        vec![(
            schedule_json("S1", "mine", &["2024/05/01"]),
            schedule_json("S1", "theirs", &["2024/05/02"]),
        )],
        vec![],
    ))
}

#[tokio::test]
async fn conflict_changed_s1_is_collected_once_and_still_plotted() {
    // Arrange
    let h = Harness::new();
    seed_s1(&h).await;
    h.manager.push(s1_conflict());

    // Act
    let draft = ScheduleDraft {
        place: "Room 1".into(),
        ..ScheduleDraft::from_schedule(&h.schedule_store.get("S1").unwrap())
    };
    let written = h.schedule_store.update(draft, "S1", false).await.unwrap();

    // Assert
    assert_eq!(written.outcome, SyncOutcome::Conflict);
    let conflicts = h.conflicts.borrow();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts.conflicts()[0].id(), "S1");
    assert_eq!(conflicts.conflicts()[0].source, NotificationKind::Conflict);
    assert_eq!(*h.presented.borrow(), 1);

    let index = DayIndex::build(h.schedules.borrow().iter());
    let plot = CalendarPlotter::new(6).plot_day(&index, date(2024, 5, 1));
    assert_eq!(plot.strips[0].schedule_id.as_deref(), Some("S1"));
}

#[tokio::test]
async fn conflict_reported_again_is_not_duplicated() {
    let h = Harness::new();
    seed_s1(&h).await;
    h.manager.push(s1_conflict());
    h.manager.push(s1_conflict());

    h.sync.sync().await.unwrap();
    h.sync.sync().await.unwrap();

    assert_eq!(h.conflicts.borrow().len(), 1);
}

#[tokio::test]
async fn conflict_entries_survive_clean_passes() {
    let h = Harness::new();
    seed_s1(&h).await;
    h.manager.push(s1_conflict());
    h.manager.push(Scripted::Conflict(conflict_payload(
        "schedule",
        vec![],
        vec![schedule_json("S2", "gone", &["2024/05/04"])],
    )));

    h.sync.sync().await.unwrap();
    h.sync.sync().await.unwrap();
    h.sync.sync().await.unwrap();

    let conflicts = h.conflicts.borrow();
    assert_eq!(conflicts.len(), 2);
    assert!(matches!(conflicts.conflicts()[1].entry, ConflictEntry::Removed(_)));
}

#[tokio::test]
async fn conflict_merge_and_resubmit() {
    // Arrange
    let h = Harness::new();
    seed_s1(&h).await;
    h.manager.push(s1_conflict());
    h.sync.sync().await.unwrap();

    // Act
    let (index, merged) = {
        let conflicts = h.conflicts.borrow();
        let index = conflicts.find("S1").unwrap();
        assert_eq!(conflicts.diff(index), vec!["dates", "title"]);
        (index, conflicts.merge(index, &["dates"]).unwrap())
    };
    let draft = ScheduleDraft::from_schedule(&merged);
    let written = h.schedule_store.update(draft, "S1", true).await.unwrap();
    h.conflicts.borrow_mut().resolve(index);

    // Assert
    assert_eq!(written.outcome, SyncOutcome::Success);
    assert_eq!(written.item.title, "mine");
    assert_eq!(written.item.dates, vec!["2024/05/02"]);
    assert_eq!(
        *h.manager.resolved.borrow(),
        vec![(EntityKind::Schedule, "S1".to_string())]
    );
    assert!(h.conflicts.borrow().is_empty());
}

#[tokio::test]
async fn conflict_malformed_payload_is_ignored() {
    let h = Harness::new();
    h.manager
        .push(Scripted::Conflict(json!({"conflicted": {"schedule": "garbage"}})));
    h.manager.push(Scripted::Conflict(json!({"unrelated": true})));

    h.sync.sync().await.unwrap();
    h.sync.sync().await.unwrap();

    assert!(h.conflicts.borrow().is_empty());
    assert_eq!(*h.presented.borrow(), 0);
    assert!(h.prompt.alerts().is_empty());
}
