// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::rc::Rc;

use synccal_core::{
    Category, Coordinator, EntityKind, Region, SyncError, SyncOutcome, SyncState, Viewport,
};

use crate::common::{Harness, Scripted, conflict_payload, schedule_draft, schedule_json};

#[derive(Debug, Default)]
struct Counts {
    replots: usize,
    resizes: Vec<Viewport>,
}

struct CountingRegion(Rc<RefCell<Counts>>);

impl Region for CountingRegion {
    fn replot(&mut self) {
        self.0.borrow_mut().replots += 1;
    }

    fn resize(&mut self, viewport: Viewport) {
        self.0.borrow_mut().resizes.push(viewport);
    }
}

fn coordinator(h: &Harness) -> (Coordinator, Rc<RefCell<Counts>>) {
    let counts = Rc::new(RefCell::new(Counts::default()));
    let mut coordinator = Coordinator::new(h.sync.clone(), h.prompt.clone());
    coordinator.add_region(Box::new(CountingRegion(counts.clone())));
    (coordinator, counts)
}

#[tokio::test]
async fn coordinator_startup_syncs_then_replots() {
    let h = Harness::new();
    let (mut coordinator, counts) = coordinator(&h);
    assert_eq!(coordinator.state(), SyncState::Idle);

    let state = coordinator.startup().await;

    assert_eq!(state, SyncState::Success);
    let kinds: Vec<_> = h.manager.queries.borrow().iter().map(|q| q.kind).collect();
    assert_eq!(kinds, vec![EntityKind::Person, EntityKind::Schedule]);
    assert_eq!(h.manager.syncs(), 1);
    assert_eq!(counts.borrow().replots, 1);
    assert!(h.prompt.alerts().is_empty(), "startup is silent on success");
}

#[tokio::test]
async fn coordinator_sync_now_alerts_success() {
    let h = Harness::new();
    let (mut coordinator, counts) = coordinator(&h);

    let state = coordinator.sync_now().await;

    assert_eq!(state, SyncState::Success);
    assert_eq!(h.prompt.alerts(), vec!["Synchronization completed"]);
    assert_eq!(counts.borrow().replots, 1);
}

#[tokio::test]
async fn coordinator_conflict_skips_success_alert() {
    let h = Harness::new();
    let (mut coordinator, counts) = coordinator(&h);
    h.manager.push(Scripted::Conflict(conflict_payload(
        "schedule",
        vec![(
            schedule_json("S1", "mine", &["2024/05/01"]),
            schedule_json("S1", "theirs", &["2024/05/01"]),
        )],
        vec![],
    )));

    let state = coordinator.sync_now().await;

    assert_eq!(state, SyncState::Conflict);
    let alerts = h.prompt.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(!alerts[0].contains("completed"));
    assert_eq!(h.conflicts.borrow().len(), 1);
    assert_eq!(counts.borrow().replots, 1);
}

#[tokio::test]
async fn coordinator_network_failure_keeps_local_edits() {
    let h = Harness::new();
    let (mut coordinator, counts) = coordinator(&h);
    h.manager
        .push(Scripted::Fail(SyncError::Network("offline".into())));
    h.manager
        .push(Scripted::Fail(SyncError::Network("offline".into())));

    let written = h
        .schedule_store
        .register(schedule_draft("Offline", Category::Meeting, &["2024/05/01"]))
        .await
        .unwrap();
    assert!(matches!(written.outcome, SyncOutcome::NetworkFailure(_)));

    let state = coordinator.sync_now().await;

    assert_eq!(state, SyncState::NetworkFailure);
    assert_eq!(h.prompt.alerts().len(), 1);
    assert!(h.schedule_store.get(&written.item.id).is_some());
    assert!(h.schedules.borrow().has_pending());
    assert_eq!(counts.borrow().replots, 1);

    // retry is user initiated
    assert_eq!(coordinator.sync_now().await, SyncState::Success);
    assert_eq!(h.manager.syncs(), 3);
}

#[tokio::test]
async fn coordinator_resize_reaches_regions() {
    let h = Harness::new();
    let (mut coordinator, counts) = coordinator(&h);

    coordinator.on_resize(Viewport::new(80, 24));
    coordinator.on_resize(Viewport::new(120, 40));

    assert_eq!(
        counts.borrow().resizes,
        vec![Viewport::new(80, 24), Viewport::new(120, 40)]
    );
    assert_eq!(coordinator.viewport(), Viewport::new(120, 40));
}

#[tokio::test]
async fn coordinator_overlapping_syncs_are_serialized() {
    let h = Harness::new();

    let a = h
        .schedule_store
        .register(schedule_draft("a", Category::Meeting, &["2024/05/01"]));
    let b = h
        .schedule_store
        .register(schedule_draft("b", Category::Meeting, &["2024/05/02"]));
    let c = h.sync.sync();
    let (a, b, c) = tokio::join!(a, b, c);

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(h.manager.syncs(), 3);
    assert_eq!(h.manager.max_concurrent(), 1);
}
