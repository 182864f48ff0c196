use chrono::{NaiveTime, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use slotbook_core::models::{AvailabilityWindow, DayOfWeek};
use slotbook_core::scheduling::availability::{fits_schedule, window_overlaps_existing, works_on};
use uuid::Uuid;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn window(day: DayOfWeek, start: NaiveTime, end: NaiveTime, active: bool) -> AvailabilityWindow {
    AvailabilityWindow {
        id: Uuid::new_v4(),
        operator_id: Uuid::new_v4(),
        day_of_week: day,
        start_time: start,
        end_time: end,
        active,
        created_at: Utc::now(),
    }
}

#[test]
fn test_works_on_requires_active_window() {
    let windows = vec![
        window(DayOfWeek::Monday, time(9, 0), time(12, 0), true),
        window(DayOfWeek::Tuesday, time(9, 0), time(12, 0), false),
    ];

    assert!(works_on(&windows, DayOfWeek::Monday));
    // Only a deactivated window on Tuesday: does not work that day
    assert!(!works_on(&windows, DayOfWeek::Tuesday));
    assert!(!works_on(&windows, DayOfWeek::Wednesday));
}

#[test]
fn test_works_on_with_no_windows() {
    assert!(!works_on(&[], DayOfWeek::Monday));
}

#[rstest]
// Fully inside the 09:00-12:00 window
#[case(time(10, 0), time(10, 30), true)]
// Exactly the window itself
#[case(time(9, 0), time(12, 0), true)]
// Touching the window start
#[case(time(9, 0), time(9, 30), true)]
// Spills past the window end
#[case(time(11, 30), time(12, 30), false)]
// Starts before the window
#[case(time(8, 30), time(9, 30), false)]
// Entirely outside the window (schedule-fit failure)
#[case(time(13, 0), time(13, 30), false)]
fn test_fits_schedule_requires_full_containment(
    #[case] start: NaiveTime,
    #[case] end: NaiveTime,
    #[case] expected: bool,
) {
    let windows = vec![window(DayOfWeek::Monday, time(9, 0), time(12, 0), true)];

    assert_eq!(fits_schedule(&windows, DayOfWeek::Monday, start, end), expected);
}

#[test]
fn test_fits_schedule_ignores_inactive_and_other_days() {
    let windows = vec![
        window(DayOfWeek::Monday, time(9, 0), time(12, 0), false),
        window(DayOfWeek::Tuesday, time(9, 0), time(12, 0), true),
    ];

    // Monday window is deactivated
    assert!(!fits_schedule(&windows, DayOfWeek::Monday, time(10, 0), time(10, 30)));
    // Tuesday window does not cover Monday requests
    assert!(fits_schedule(&windows, DayOfWeek::Tuesday, time(10, 0), time(10, 30)));
}

#[test]
fn test_fits_schedule_across_multiple_windows() {
    // Split shift: either window may contain the slot, but not their union
    let windows = vec![
        window(DayOfWeek::Friday, time(8, 0), time(12, 0), true),
        window(DayOfWeek::Friday, time(14, 0), time(18, 0), true),
    ];

    assert!(fits_schedule(&windows, DayOfWeek::Friday, time(10, 0), time(11, 0)));
    assert!(fits_schedule(&windows, DayOfWeek::Friday, time(14, 0), time(15, 0)));
    // Spans the gap between the two windows
    assert!(!fits_schedule(&windows, DayOfWeek::Friday, time(11, 0), time(15, 0)));
}

#[test]
fn test_window_overlap_detection() {
    let existing = vec![window(DayOfWeek::Monday, time(9, 0), time(12, 0), true)];

    assert!(window_overlaps_existing(
        &existing,
        DayOfWeek::Monday,
        time(11, 0),
        time(13, 0),
        None
    ));
    // Touching edges are not an overlap
    assert!(!window_overlaps_existing(
        &existing,
        DayOfWeek::Monday,
        time(12, 0),
        time(14, 0),
        None
    ));
    // Other days never collide
    assert!(!window_overlaps_existing(
        &existing,
        DayOfWeek::Tuesday,
        time(9, 0),
        time(12, 0),
        None
    ));
    // The window being edited is excluded from the comparison set
    assert!(!window_overlaps_existing(
        &existing,
        DayOfWeek::Monday,
        time(9, 0),
        time(12, 0),
        Some(existing[0].id)
    ));
}
