use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};

use crate::models::{AppointmentStatus, DoctorAvailability};

/// Weekday index with Sunday pinned to 0, matching the stored
/// availability rules.
pub fn weekday_index(moment: DateTime<Utc>) -> i32 {
    match moment.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// A slot is workable only when fully contained in a single rule;
/// windows spanning two adjacent rules don't count.
pub fn within_any_rule(rules: &[DoctorAvailability], start: NaiveTime, end: NaiveTime) -> bool {
    rules
        .iter()
        .any(|rule| start >= rule.start_time && end <= rule.end_time)
}

/// Half-open interval overlap: [start1, end1) against [start2, end2).
pub fn intervals_overlap(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}

/// Cancelled appointments release their slot; every other status keeps
/// it blocked.
pub fn blocks_slot(status: AppointmentStatus) -> bool {
    status != AppointmentStatus::Cancelled
}
