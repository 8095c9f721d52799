// libs/appointment-cell/src/services/rules.rs
//
// Business-window validation. Pure functions over the candidate window plus
// the fixed clinic parameters; no store access and no side effects.
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::America::Los_Angeles;
use chrono_tz::Tz;

use crate::models::AppointmentError;

/// The clinic keeps a single fixed calendar zone.
pub const CLINIC_TZ: Tz = Los_Angeles;

pub const OPEN_HOUR: u32 = 8; // 08:00
pub const CLOSE_HOUR: u32 = 17; // 17:00

pub const MIN_DURATION_MINUTES: i32 = 1;
pub const MAX_DURATION_MINUTES: i32 = 720; // 12 hours

/// Normalize a candidate start to clinic wall-clock time.
///
/// A UTC instant converts through the zone database, so daylight-saving
/// shifts are honored. A local value is taken as written: validation never
/// converts it, so DST-ambiguous wall-clock inputs need no disambiguation.
pub fn clinic_local_start(starts_at: NaiveDateTime, is_utc: bool) -> NaiveDateTime {
    if is_utc {
        starts_at.and_utc().with_timezone(&CLINIC_TZ).naive_local()
    } else {
        starts_at
    }
}

/// Validate weekday + business hours in the clinic's zone.
///
/// Checks run in order: duration bounds, weekend closure, opening hours.
/// The first violated rule is returned as the rejection reason.
pub fn validate_business_window(
    starts_at: NaiveDateTime,
    duration_minutes: i32,
    is_utc: bool,
) -> Result<(), AppointmentError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(AppointmentError::DurationOutOfBounds);
    }

    let local_start = clinic_local_start(starts_at, is_utc);
    let local_end = local_start + Duration::minutes(duration_minutes as i64);

    if matches!(local_start.weekday(), Weekday::Sat | Weekday::Sun) {
        return Err(AppointmentError::ClosedOnWeekends);
    }

    // A window that rolls past midnight can never fit the clinic day.
    if local_end.date() != local_start.date() {
        return Err(AppointmentError::OutsideClinicHours);
    }

    let open = NaiveTime::from_hms_opt(OPEN_HOUR, 0, 0).unwrap();
    let close = NaiveTime::from_hms_opt(CLOSE_HOUR, 0, 0).unwrap();

    // Start >= 08:00 and end <= 17:00; exact boundaries are allowed.
    if local_start.time() < open || local_end.time() > close {
        return Err(AppointmentError::OutsideClinicHours);
    }

    Ok(())
}
