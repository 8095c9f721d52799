// libs/appointment-cell/src/services/conflict.rs
//
// Staff double-booking detection. Pure over the candidate interval and a
// snapshot of existing appointments; fetching that snapshot and serializing
// check-then-persist is the caller's and the store's job.
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::models::Appointment;

/// Half-open interval overlap: `[s1, e1)` and `[s2, e2)` conflict iff
/// `s1 < e2 && s2 < e1`. Touching intervals (`e1 == s2`) do not conflict,
/// so back-to-back appointments are fine.
pub fn overlaps(
    start1: NaiveDateTime,
    end1: NaiveDateTime,
    start2: NaiveDateTime,
    end2: NaiveDateTime,
) -> bool {
    start1 < end2 && start2 < end1
}

/// Check a candidate interval against a staff member's existing bookings.
///
/// Each staff member has an independent calendar: appointments assigned to
/// anyone else never conflict, even at identical times. During an update the
/// appointment's own prior identity is excluded via `exclude_id`, otherwise
/// it would spuriously conflict with itself.
pub fn has_conflict(
    staff_user_id: Uuid,
    candidate_start: NaiveDateTime,
    candidate_end: NaiveDateTime,
    existing: &[Appointment],
    exclude_id: Option<Uuid>,
) -> bool {
    existing
        .iter()
        .filter(|appointment| appointment.staff_user_id == staff_user_id)
        .filter(|appointment| exclude_id != Some(appointment.id))
        .any(|appointment| {
            overlaps(
                candidate_start,
                candidate_end,
                appointment.starts_at,
                appointment.ends_at(),
            )
        })
}
