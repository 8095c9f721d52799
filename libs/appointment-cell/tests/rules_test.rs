// libs/appointment-cell/tests/rules_test.rs
//
// Business-window validator coverage. All fixtures use June 2025 (PDT) and
// January 2025 (PST) so both daylight-saving offsets are exercised.
use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime};

use appointment_cell::models::AppointmentError;
use appointment_cell::services::rules::{
    clinic_local_start, validate_business_window, MAX_DURATION_MINUTES,
};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

// 2025-06-20 is a Friday, 2025-06-21 a Saturday, 2025-06-23 a Monday.

#[test]
fn weekday_window_inside_hours_is_accepted() {
    assert!(validate_business_window(at(2025, 6, 20, 9, 0), 30, false).is_ok());
    assert!(validate_business_window(at(2025, 6, 23, 13, 15), 45, false).is_ok());
}

#[test]
fn full_day_duration_is_accepted_when_it_fits() {
    // 08:00 + 540 minutes ends exactly at 17:00.
    assert!(validate_business_window(at(2025, 6, 20, 8, 0), 540, false).is_ok());
}

#[test]
fn duration_bounds_are_enforced_regardless_of_start() {
    for duration in [0, -5, MAX_DURATION_MINUTES + 1] {
        assert_matches!(
            validate_business_window(at(2025, 6, 20, 9, 0), duration, false),
            Err(AppointmentError::DurationOutOfBounds)
        );
    }
    // Bounds fire before any time-of-day rule.
    assert_matches!(
        validate_business_window(at(2025, 6, 21, 3, 0), 721, false),
        Err(AppointmentError::DurationOutOfBounds)
    );
}

#[test]
fn minimum_duration_is_accepted() {
    assert!(validate_business_window(at(2025, 6, 20, 9, 0), 1, false).is_ok());
}

#[test]
fn weekends_are_rejected_even_inside_hours() {
    // Saturday and Sunday
    assert_matches!(
        validate_business_window(at(2025, 6, 21, 10, 0), 30, false),
        Err(AppointmentError::ClosedOnWeekends)
    );
    assert_matches!(
        validate_business_window(at(2025, 6, 22, 10, 0), 30, false),
        Err(AppointmentError::ClosedOnWeekends)
    );
}

#[test]
fn exact_boundaries_are_valid() {
    // Start exactly at open
    assert!(validate_business_window(at(2025, 6, 20, 8, 0), 30, false).is_ok());
    // End exactly at close: 16:30 + 30 = 17:00
    assert!(validate_business_window(at(2025, 6, 20, 16, 30), 30, false).is_ok());
}

#[test]
fn one_minute_past_close_is_rejected() {
    // 16:31 + 30 = 17:01
    assert_matches!(
        validate_business_window(at(2025, 6, 20, 16, 31), 30, false),
        Err(AppointmentError::OutsideClinicHours)
    );
}

#[test]
fn one_minute_before_open_is_rejected() {
    assert_matches!(
        validate_business_window(at(2025, 6, 20, 7, 59), 30, false),
        Err(AppointmentError::OutsideClinicHours)
    );
}

#[test]
fn midnight_spanning_window_is_rejected() {
    // 16:00 + 720 minutes rolls into Saturday 04:00.
    assert_matches!(
        validate_business_window(at(2025, 6, 20, 16, 0), 720, false),
        Err(AppointmentError::OutsideClinicHours)
    );
}

#[test]
fn utc_input_is_converted_to_clinic_time() {
    // June: PDT, UTC-7. 16:30 UTC Friday is 09:30 clinic time.
    assert!(validate_business_window(at(2025, 6, 20, 16, 30), 30, true).is_ok());
    // Saturday 00:00 UTC is still Friday 17:00 clinic time: not a weekend,
    // but the 30-minute window runs past close.
    assert_matches!(
        validate_business_window(at(2025, 6, 21, 0, 0), 30, true),
        Err(AppointmentError::OutsideClinicHours)
    );
}

#[test]
fn local_input_is_taken_as_written() {
    // The same wall-clock value treated as local is mid-morning and fine.
    assert!(validate_business_window(at(2025, 6, 20, 16, 30), 30, false).is_ok());
    // Saturday wall-clock local stays a Saturday.
    assert_matches!(
        validate_business_window(at(2025, 6, 21, 10, 0), 30, false),
        Err(AppointmentError::ClosedOnWeekends)
    );
}

#[test]
fn conversion_honors_daylight_saving() {
    // January: PST, UTC-8. 15:30 UTC is 07:30 clinic time, before open.
    assert_matches!(
        validate_business_window(at(2025, 1, 17, 15, 30), 30, true),
        Err(AppointmentError::OutsideClinicHours)
    );
    // The same UTC wall-clock in June (PDT, UTC-7) is 08:30 and valid.
    assert!(validate_business_window(at(2025, 6, 20, 15, 30), 30, true).is_ok());
}

#[test]
fn clinic_local_start_only_converts_utc_inputs() {
    let ts = at(2025, 1, 17, 16, 0);
    assert_eq!(clinic_local_start(ts, false), ts);
    assert_eq!(clinic_local_start(ts, true), at(2025, 1, 17, 8, 0));
}
