use chrono::{DateTime, Duration, TimeZone, Utc};
use tasksync::models::Task;
use tasksync::tui::list::{Badge, ListItem};
use tasksync::urgency::{deadline_status, is_due_soon, is_overdue, DeadlineStatus};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
}

fn task(deadline: Option<DateTime<Utc>>, completed: bool) -> Task {
    Task {
        id: "task-1".into(),
        title: "Test".into(),
        description: None,
        deadline,
        completed,
        created_at: now() - Duration::days(3),
    }
}

#[test]
fn test_past_deadline_is_overdue() {
    let t = task(Some(now() - Duration::hours(1)), false);
    assert!(is_overdue(&t, now()));
    assert!(!is_due_soon(&t, now()));
    assert_eq!(deadline_status(&t, now()), DeadlineStatus::Overdue);
}

#[test]
fn test_deadline_within_a_day_is_due_soon() {
    let t = task(Some(now() + Duration::hours(1)), false);
    assert!(is_due_soon(&t, now()));
    assert!(!is_overdue(&t, now()));

    let t = task(Some(now() + Duration::hours(24) - Duration::minutes(1)), false);
    assert_eq!(deadline_status(&t, now()), DeadlineStatus::DueSoon);
}

#[test]
fn test_window_edges() {
    // Exactly 24 hours ahead is outside the window.
    let t = task(Some(now() + Duration::hours(24)), false);
    assert_eq!(deadline_status(&t, now()), DeadlineStatus::Clear);

    // A deadline equal to now is neither past nor ahead.
    let t = task(Some(now()), false);
    assert!(!is_overdue(&t, now()));
    assert!(!is_due_soon(&t, now()));

    let t = task(Some(now() + Duration::days(3)), false);
    assert_eq!(deadline_status(&t, now()), DeadlineStatus::Clear);
}

#[test]
fn test_completed_or_undated_tasks_are_never_flagged() {
    for deadline in [now() - Duration::days(2), now() + Duration::hours(2)] {
        let t = task(Some(deadline), true);
        assert!(!is_overdue(&t, now()));
        assert!(!is_due_soon(&t, now()));
    }
    let t = task(None, false);
    assert_eq!(deadline_status(&t, now()), DeadlineStatus::Clear);
}

#[test]
fn test_overdue_and_due_soon_never_overlap() {
    for minutes in (-3000..3000).step_by(7) {
        let t = task(Some(now() + Duration::minutes(minutes)), false);
        assert!(!(is_overdue(&t, now()) && is_due_soon(&t, now())), "offset {minutes}");
    }
}

#[test]
fn test_list_item_badges() {
    let overdue = ListItem::from_task(&task(Some(now() - Duration::hours(5)), false), now());
    assert_eq!(overdue.badge, Some(Badge::Overdue));
    assert_eq!(overdue.checkbox(), "[ ]");
    assert!(overdue.deadline.is_some());

    let soon = ListItem::from_task(&task(Some(now() + Duration::hours(5)), false), now());
    assert_eq!(soon.badge, Some(Badge::DueSoon));
    assert_eq!(soon.badge.map(Badge::label), Some("Due soon"));

    let done = ListItem::from_task(&task(Some(now() - Duration::hours(5)), true), now());
    assert_eq!(done.badge, None);
    assert_eq!(done.checkbox(), "[x]");

    let undated = ListItem::from_task(&task(None, false), now());
    assert_eq!(undated.badge, None);
    assert_eq!(undated.deadline, None);
}
