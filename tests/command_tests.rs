use chrono::{Duration, Utc};
use tasksync::commands::resolve_id;
use tasksync::models::{non_blank, Task};

fn task(id: &str) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {id}"),
        description: None,
        deadline: None,
        completed: false,
        created_at: Utc::now() - Duration::minutes(5),
    }
}

#[test]
fn test_resolve_by_full_id_or_prefix() {
    let tasks = vec![task("abc123"), task("abd456"), task("abc")];
    // An exact match wins even when it is also a prefix of another id.
    assert_eq!(resolve_id(&tasks, "abc").unwrap().id, "abc");
    assert_eq!(resolve_id(&tasks, "abd").unwrap().id, "abd456");
    assert_eq!(resolve_id(&tasks, "abc1").unwrap().id, "abc123");
}

#[test]
fn test_resolve_errors() {
    let tasks = vec![task("abc123"), task("abd456")];
    let err = resolve_id(&tasks, "ab").unwrap_err();
    assert!(err.to_string().contains("ambiguous"));
    let err = resolve_id(&tasks, "zzz").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_short_id() {
    assert_eq!(task("0123456789abcdef").short_id(), "01234567");
    assert_eq!(task("abc").short_id(), "abc");
}

#[test]
fn test_non_blank() {
    assert_eq!(non_blank(Some("  hi ".into())), Some("  hi ".into()));
    assert_eq!(non_blank(Some("   ".into())), None);
    assert_eq!(non_blank(None), None);
}
