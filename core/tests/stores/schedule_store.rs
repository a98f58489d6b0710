// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use serde_json::json;
use synccal_core::{Category, EntityKind, Error, PersonDraft, ScheduleDraft, SyncOutcome};

use crate::common::{
    Harness, Scripted, conflict_payload, person_draft, schedule_draft, schedule_json,
};

async fn register_person(h: &Harness, id: &str, name: &str) {
    let draft = PersonDraft {
        id: Some(id.to_string()),
        ..person_draft(name, None, "Acme")
    };
    h.person_store.register(draft, None).await.unwrap();
}

#[tokio::test]
async fn schedule_register_prunes_empty_user_slots() {
    let h = Harness::new();
    let mut draft = schedule_draft("Review", Category::Business, &["2024/05/01"]);
    draft.user_ids = vec!["".into(), "taro".into(), " ".into(), "taro".into()];

    let written = h.schedule_store.register(draft).await.unwrap();

    assert_eq!(written.outcome, SyncOutcome::Success);
    let schedule = h.schedule_store.get(&written.item.id).unwrap();
    assert_eq!(schedule.user_ids, vec!["taro"]);
    assert_eq!(schedule.category_style(), "category-business");
}

#[tokio::test]
async fn schedule_register_rejects_malformed_date() {
    let h = Harness::new();
    let draft = schedule_draft("Review", Category::Meeting, &["2024/05/01", "05-02-2024"]);

    let err = h.schedule_store.register(draft).await.unwrap_err();

    assert!(matches!(err, Error::InvalidDate(_)));
    assert!(h.schedule_store.list().is_empty());
    assert_eq!(h.manager.syncs(), 0);
}

#[tokio::test]
async fn schedule_register_defaults_creator() {
    let h = Harness::new();
    register_person(&h, "taro", "Taro").await;
    h.schedule_store.set_default_creator(Some("taro".into()));

    let mine = h
        .schedule_store
        .register(schedule_draft("Mine", Category::Other, &["2024/05/01"]))
        .await
        .unwrap()
        .item;
    assert_eq!(mine.creator_id.as_deref(), Some("taro"));
    assert_eq!(h.schedule_store.creator_name(&mine).as_deref(), Some("Taro"));

    let mut draft = schedule_draft("Theirs", Category::Other, &["2024/05/01"]);
    draft.creator_id = Some("hanako".into());
    let theirs = h.schedule_store.register(draft).await.unwrap().item;
    assert_eq!(theirs.creator_id.as_deref(), Some("hanako"));
    // unknown creators have no name
    assert_eq!(h.schedule_store.creator_name(&theirs), None);
}

#[tokio::test]
async fn schedule_update_acknowledged_marks_resolved() {
    let h = Harness::new();
    let schedule = h
        .schedule_store
        .register(schedule_draft("Review", Category::Meeting, &["2024/05/01"]))
        .await
        .unwrap()
        .item;

    let mut draft = ScheduleDraft::from_schedule(&schedule);
    draft.place = "Room 1".into();
    h.schedule_store
        .update(draft.clone(), &schedule.id, false)
        .await
        .unwrap();
    assert!(h.manager.resolved.borrow().is_empty());

    draft.place = "Room 2".into();
    let written = h
        .schedule_store
        .update(draft, &schedule.id, true)
        .await
        .unwrap();
    assert_eq!(written.item.place, "Room 2");
    assert_eq!(
        *h.manager.resolved.borrow(),
        vec![(EntityKind::Schedule, schedule.id.clone())]
    );
    assert_eq!(h.manager.syncs(), 3);
}

#[tokio::test]
async fn schedule_delete_acknowledged_marks_resolved() {
    let h = Harness::new();
    let schedule = h
        .schedule_store
        .register(schedule_draft("Review", Category::Meeting, &["2024/05/01"]))
        .await
        .unwrap()
        .item;

    h.schedule_store.delete(&schedule.id, true).await.unwrap();

    assert!(h.schedule_store.get(&schedule.id).is_none());
    assert_eq!(h.manager.resolved.borrow().len(), 1);
    assert!(matches!(
        h.schedule_store.delete(&schedule.id, false).await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn schedule_users_follow_current_persons() {
    let h = Harness::new();
    register_person(&h, "taro", "Taro").await;
    register_person(&h, "hanako", "Hanako").await;
    let mut draft = schedule_draft("Lunch", Category::Outing, &["2024/05/01"]);
    draft.user_ids = vec!["hanako".into(), "ghost".into(), "taro".into()];
    let schedule = h.schedule_store.register(draft).await.unwrap().item;

    let names: Vec<_> = h
        .schedule_store
        .users_of(&schedule)
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Hanako", "Taro"]);

    h.person_store.delete("hanako").await.unwrap();
    let names: Vec<_> = h
        .schedule_store
        .users_of(&schedule)
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Taro"]);
}

#[tokio::test]
async fn schedule_duplicate_id_is_remediated() {
    let h = Harness::new();
    let schedule = h
        .schedule_store
        .register(schedule_draft("Review", Category::Meeting, &["2024/05/01"]))
        .await
        .unwrap()
        .item;
    h.manager.push(Scripted::Duplicate(conflict_payload(
        "schedule",
        vec![(schedule_json(&schedule.id, "Review", &["2024/05/01"]), json!(null))],
        vec![],
    )));

    let report = h.sync.sync().await.unwrap();
    assert!(report.is_duplicate());

    let suggested = format!("{}-2", schedule.id);
    assert_eq!(
        h.prompt.remediations(),
        vec![(EntityKind::Schedule, schedule.id.clone(), suggested.clone())]
    );

    let written = h
        .schedule_store
        .remediate(&schedule.id, &suggested)
        .await
        .unwrap();
    assert_eq!(written.item.id, suggested);
    assert!(h.schedule_store.get(&schedule.id).is_none());
    assert_eq!(h.schedule_store.get(&suggested).unwrap().title, "Review");
}
