use chrono::{Local, TimeZone, Utc};
use tasksync::deadline::{display, parse_input, to_input, DeadlineError};

#[test]
fn test_blank_input_means_no_deadline() {
    assert_eq!(parse_input(""), Ok(None));
    assert_eq!(parse_input("   "), Ok(None));
}

#[test]
fn test_rfc3339_is_taken_as_is() {
    let parsed = parse_input("2030-01-02T03:04:05Z").unwrap();
    assert_eq!(parsed, Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()));

    let parsed = parse_input("2030-01-02T05:04:05+02:00").unwrap();
    assert_eq!(parsed, Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()));
}

#[test]
fn test_edit_prefill_round_trips() {
    let deadline = Utc.with_ymd_and_hms(2030, 6, 15, 12, 30, 0).unwrap();
    let input = to_input(&deadline);
    assert_eq!(parse_input(&input), Ok(Some(deadline)));
}

#[test]
fn test_local_datetime_formats() {
    for input in ["2030-06-15 08:15", "2030-06-15T08:15", "2030-06-15 08:15:00"] {
        let parsed = parse_input(input).unwrap().unwrap();
        assert_eq!(to_input(&parsed), "2030-06-15 08:15", "input {input}");
    }
}

#[test]
fn test_bare_date_is_end_of_day_local() {
    let parsed = parse_input("2030-06-15").unwrap().unwrap();
    let local = parsed.with_timezone(&Local);
    assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2030-06-15 23:59");
}

#[test]
fn test_garbage_is_rejected() {
    assert_eq!(
        parse_input("next tuesday"),
        Err(DeadlineError::Unrecognized("next tuesday".into()))
    );
    assert!(parse_input("2030-13-01").is_err());
}

#[test]
fn test_display_is_local() {
    let deadline = Utc.with_ymd_and_hms(2030, 6, 15, 12, 30, 0).unwrap();
    let expected = deadline.with_timezone(&Local).format("%a %d %b %Y %H:%M").to_string();
    assert_eq!(display(&deadline), expected);
}
