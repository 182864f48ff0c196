use chrono::{NaiveTime, Utc};
use pretty_assertions::assert_eq;
use slotbook_core::models::{AppointmentStatus, AvailabilityWindow, DayOfWeek};
use slotbook_core::scheduling::conflict::LedgerEntry;
use slotbook_core::scheduling::matcher::{find_all, find_one, OperatorCandidate};
use uuid::Uuid;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn monday_window(operator_id: Uuid, start: NaiveTime, end: NaiveTime) -> AvailabilityWindow {
    AvailabilityWindow {
        id: Uuid::new_v4(),
        operator_id,
        day_of_week: DayOfWeek::Monday,
        start_time: start,
        end_time: end,
        active: true,
        created_at: Utc::now(),
    }
}

fn booked(start: NaiveTime, end: NaiveTime) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4(),
        start_time: start,
        end_time: end,
        status: AppointmentStatus::Scheduled,
        deleted: false,
    }
}

fn candidate(
    operator_id: Uuid,
    windows: Vec<AvailabilityWindow>,
    booked: Vec<LedgerEntry>,
) -> OperatorCandidate {
    OperatorCandidate {
        operator_id,
        windows,
        booked,
    }
}

#[test]
fn test_find_one_is_first_fit() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    let candidates = vec![
        candidate(first, vec![monday_window(first, time(9, 0), time(12, 0))], vec![]),
        candidate(second, vec![monday_window(second, time(9, 0), time(12, 0))], vec![]),
    ];

    assert_eq!(
        find_one(&candidates, DayOfWeek::Monday, time(10, 0), time(10, 30)),
        Some(first)
    );
}

#[test]
fn test_find_one_skips_ineligible_candidates() {
    let off_that_day = Uuid::new_v4();
    let too_short_window = Uuid::new_v4();
    let already_booked = Uuid::new_v4();
    let free = Uuid::new_v4();

    let candidates = vec![
        // No Monday windows at all
        candidate(off_that_day, vec![], vec![]),
        // Window does not contain the requested slot
        candidate(
            too_short_window,
            vec![monday_window(too_short_window, time(9, 0), time(10, 0))],
            vec![],
        ),
        // Slot collides with an existing appointment
        candidate(
            already_booked,
            vec![monday_window(already_booked, time(9, 0), time(12, 0))],
            vec![booked(time(10, 0), time(10, 30))],
        ),
        candidate(free, vec![monday_window(free, time(9, 0), time(12, 0))], vec![]),
    ];

    assert_eq!(
        find_one(&candidates, DayOfWeek::Monday, time(10, 0), time(10, 30)),
        Some(free)
    );
}

#[test]
fn test_find_one_returns_none_when_no_operator_fits() {
    let operator = Uuid::new_v4();
    let candidates = vec![candidate(
        operator,
        vec![monday_window(operator, time(9, 0), time(12, 0))],
        vec![booked(time(9, 0), time(12, 0))],
    )];

    assert_eq!(
        find_one(&candidates, DayOfWeek::Monday, time(10, 0), time(10, 30)),
        None
    );
    assert_eq!(find_one(&[], DayOfWeek::Monday, time(10, 0), time(10, 30)), None);
}

#[test]
fn test_find_all_preserves_input_order() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();

    let candidates = vec![
        candidate(a, vec![monday_window(a, time(9, 0), time(12, 0))], vec![]),
        // b is booked over the slot
        candidate(
            b,
            vec![monday_window(b, time(9, 0), time(12, 0))],
            vec![booked(time(10, 0), time(11, 0))],
        ),
        candidate(c, vec![monday_window(c, time(8, 0), time(18, 0))], vec![]),
    ];

    assert_eq!(
        find_all(&candidates, DayOfWeek::Monday, time(10, 0), time(10, 30)),
        vec![a, c]
    );
}

#[test]
fn test_matcher_never_returns_unfit_operator() {
    // Every returned operator must pass fit and conflict checks
    let operator = Uuid::new_v4();
    let candidates = vec![candidate(
        operator,
        vec![monday_window(operator, time(9, 0), time(12, 0))],
        vec![booked(time(10, 0), time(10, 30))],
    )];

    let slot_conflicting = find_all(&candidates, DayOfWeek::Monday, time(10, 15), time(10, 45));
    assert!(slot_conflicting.is_empty());

    let slot_outside = find_all(&candidates, DayOfWeek::Monday, time(13, 0), time(13, 30));
    assert!(slot_outside.is_empty());

    let slot_free = find_all(&candidates, DayOfWeek::Monday, time(11, 0), time(11, 30));
    assert_eq!(slot_free, vec![operator]);
}
