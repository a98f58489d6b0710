// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::civil::date;
use synccal_core::{CalendarPlotter, Category, DayIndex};

use crate::common::{Harness, schedule_draft};

#[tokio::test]
async fn calendar_plot_may_2024() {
    // Arrange
    let h = Harness::new();
    h.schedule_store
        .register(schedule_draft(
            "Planning",
            Category::Meeting,
            &["2024/05/01", "2024/05/02"],
        ))
        .await
        .unwrap();

    // Act
    let index = DayIndex::build(h.schedules.borrow().iter());
    let plots = CalendarPlotter::new(6).plot_month(&index, 2024, 5);

    // Assert
    assert_eq!(plots.len(), 31);
    for plot in &plots {
        let strips = plot.strips.iter().filter(|s| !s.is_placeholder()).count();
        if plot.date == date(2024, 5, 1) || plot.date == date(2024, 5, 2) {
            assert_eq!(strips, 1, "expected one strip on {}", plot.date);
            assert_eq!(plot.strips[0].style, Some("category-meeting"));
        } else {
            assert_eq!(strips, 0, "expected no strip on {}", plot.date);
            assert_eq!(plot.strips.len(), 1);
            assert_eq!(plot.strips[0].height, 6);
        }
        assert!(!plot.deadline);
    }
}

#[tokio::test]
async fn calendar_plot_deadline_and_crowded_day() {
    let h = Harness::new();
    for (title, category) in [
        ("a", Category::Meeting),
        ("b", Category::Holiday),
        ("c", Category::Outing),
        ("due", Category::Deadline),
    ] {
        h.schedule_store
            .register(schedule_draft(title, category, &["2024/05/10"]))
            .await
            .unwrap();
    }

    let index = DayIndex::build(h.schedules.borrow().iter());
    let plot = CalendarPlotter::new(12).plot_day(&index, date(2024, 5, 10));

    let titles: Vec<_> = plot.strips.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "b", "c"]);
    // (12 - 2 * 3) / 3
    assert!(plot.strips.iter().all(|s| s.height == 2));
    assert!(plot.deadline);
}

#[tokio::test]
async fn calendar_plot_follows_edits() {
    let h = Harness::new();
    let schedule = h
        .schedule_store
        .register(schedule_draft("Trip", Category::Outing, &["2024/05/03"]))
        .await
        .unwrap()
        .item;
    let plotter = CalendarPlotter::new(6);

    h.schedule_store.delete(&schedule.id, false).await.unwrap();

    // rebuilt from scratch, nothing stale survives
    let index = DayIndex::build(h.schedules.borrow().iter());
    let plot = plotter.plot_day(&index, date(2024, 5, 3));
    assert!(index.is_empty());
    assert!(plot.strips[0].is_placeholder());
}
