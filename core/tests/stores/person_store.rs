// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use serde_json::json;
use synccal_core::{
    Category, EntityKind, Error, Person, PersonDraft, SyncError, SyncOutcome,
};

use crate::common::{Harness, Scripted, conflict_payload, person_draft, schedule_draft};

#[tokio::test]
async fn person_register_round_trip() {
    // Arrange
    let h = Harness::new();

    // Act
    let written = h
        .person_store
        .register(person_draft("Taro", Some(30), "Acme"), None)
        .await
        .unwrap();

    // Assert
    assert_eq!(written.outcome, SyncOutcome::Success);
    assert!(!written.item.id.is_empty());
    let person = h.person_store.get(&written.item.id).unwrap();
    assert_eq!(person.name, "Taro");
    assert_eq!(person.age, Some(30));
    assert_eq!(person.organization, "Acme");
    assert_eq!(h.manager.syncs(), 1);
}

#[tokio::test]
async fn person_register_keeps_chosen_id() {
    let h = Harness::new();
    let draft = PersonDraft {
        id: Some("taro".into()),
        ..person_draft("Taro", None, "")
    };
    let written = h.person_store.register(draft.clone(), None).await.unwrap();
    assert_eq!(written.item.id, "taro");

    let err = h.person_store.register(draft, None).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateIdentifier { kind: EntityKind::Person, .. }));
    assert_eq!(h.manager.syncs(), 1, "a failed write must not sync");
}

#[tokio::test]
async fn person_update_and_delete_sync_every_time() {
    let h = Harness::new();
    let mut person = h
        .person_store
        .register(person_draft("Taro", Some(30), "Acme"), None)
        .await
        .unwrap()
        .item;

    person.age = Some(31);
    let written = h.person_store.update(person.clone()).await.unwrap();
    assert!(written.outcome.is_success());
    assert_eq!(h.person_store.get(&person.id).unwrap().age, Some(31));

    h.person_store.delete(&person.id).await.unwrap();
    assert!(h.person_store.get(&person.id).is_none());
    assert!(h.person_store.list().is_empty());
    assert_eq!(h.manager.syncs(), 3);
}

#[tokio::test]
async fn person_update_unknown_is_not_found() {
    let h = Harness::new();
    let ghost = Person {
        id: "ghost".into(),
        name: "Nobody".into(),
        age: None,
        organization: String::new(),
    };
    assert!(matches!(
        h.person_store.update(ghost).await,
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        h.person_store.delete("ghost").await,
        Err(Error::NotFound { .. })
    ));
    assert_eq!(h.manager.syncs(), 0);
}

#[tokio::test]
async fn person_network_failure_keeps_local_edit() {
    let h = Harness::new();
    h.manager
        .push(Scripted::Fail(SyncError::Network("offline".into())));

    let written = h
        .person_store
        .register(person_draft("Hanako", None, "Acme"), None)
        .await
        .unwrap();

    assert!(matches!(written.outcome, SyncOutcome::NetworkFailure(_)));
    assert!(h.person_store.get(&written.item.id).is_some());
    assert!(h.persons.borrow().has_pending());
}

#[tokio::test]
async fn person_register_with_previous_id_remaps_first() {
    let h = Harness::new();
    let tmp = PersonDraft {
        id: Some("tmp".into()),
        ..person_draft("Taro", None, "Acme")
    };
    h.person_store.register(tmp, None).await.unwrap();
    let mut draft = schedule_draft("Standup", Category::Meeting, &["2024/05/01"]);
    draft.user_ids = vec!["tmp".into()];
    draft.creator_id = Some("tmp".into());
    let schedule = h.schedule_store.register(draft).await.unwrap().item;

    let fixed = PersonDraft {
        id: Some("taro".into()),
        ..person_draft("Taro", Some(30), "Acme")
    };
    let written = h.person_store.register(fixed, Some("tmp")).await.unwrap();

    assert_eq!(written.item.id, "taro");
    assert_eq!(
        *h.manager.duplicates.borrow(),
        vec![(EntityKind::Person, "tmp".to_string(), "taro".to_string())]
    );
    assert!(h.person_store.get("tmp").is_none());
    assert_eq!(h.person_store.get("taro").unwrap().age, Some(30));
    assert_eq!(h.person_store.list().len(), 1);

    let schedule = h.schedule_store.get(&schedule.id).unwrap();
    assert_eq!(schedule.user_ids, vec!["taro"]);
    assert_eq!(schedule.creator_id.as_deref(), Some("taro"));
    assert_eq!(h.schedule_store.creator_name(&schedule).as_deref(), Some("Taro"));
}

#[tokio::test]
async fn person_failed_remediation_creates_nothing() {
    // Arrange
    let h = Harness::new();
    h.manager
        .fail_next_resolve(SyncError::Rejected("taro is taken".into()));
    let draft = PersonDraft {
        id: Some("taro".into()),
        ..person_draft("Taro", Some(30), "Acme")
    };

    // Act
    let result = h.person_store.register(draft, Some("tmp")).await;

    // Assert
    assert!(matches!(result, Err(Error::Sync(SyncError::Rejected(_)))));
    assert!(h.person_store.get("taro").is_none());
    assert!(h.person_store.list().is_empty());
    assert_eq!(h.manager.syncs(), 0);
}

#[tokio::test]
async fn person_conflict_reapplies_changed_and_removes_removed() {
    let h = Harness::new();
    h.persons
        .borrow_mut()
        .create(Person {
            id: "P2".into(),
            name: "Jiro".into(),
            age: None,
            organization: String::new(),
        })
        .unwrap();
    h.manager.push(Scripted::Conflict(conflict_payload(
        "person",
        vec![(
            json!({"id": "P1", "name": "mine"}),
            json!({"id": "P1", "name": "theirs"}),
        )],
        vec![json!({"id": "P2", "name": "Jiro"})],
    )));

    let written = h
        .person_store
        .register(person_draft("Saburo", None, ""), None)
        .await
        .unwrap();

    assert_eq!(written.outcome, SyncOutcome::Conflict);
    assert_eq!(h.person_store.get("P1").unwrap().name, "mine");
    assert!(h.person_store.get("P2").is_none());
    let alerts = h.prompt.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("conflicted"));
    // person conflicts never reach the schedule collector
    assert!(h.conflicts.borrow().is_empty());
}

#[tokio::test]
async fn person_duplicate_id_asks_for_remediation() {
    let h = Harness::new();
    let draft = PersonDraft {
        id: Some("taro".into()),
        ..person_draft("Taro", None, "")
    };
    h.manager.push(Scripted::Duplicate(conflict_payload(
        "person",
        vec![(json!({"id": "taro", "name": "Taro"}), json!(null))],
        vec![],
    )));

    let written = h.person_store.register(draft, None).await.unwrap();

    assert_eq!(written.outcome, SyncOutcome::Conflict);
    assert_eq!(
        h.prompt.remediations(),
        vec![(EntityKind::Person, "taro".to_string(), "taro-2".to_string())]
    );
    assert_eq!(h.prompt.alerts().len(), 1);
}
