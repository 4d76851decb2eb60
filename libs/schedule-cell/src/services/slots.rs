use chrono::{NaiveTime, Timelike};

use shared_models::schedule::{AvailabilityWindow, Slot};

fn minutes_of(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

fn time_of(minutes: i64) -> Option<NaiveTime> {
    let h = u32::try_from(minutes / 60).ok()?;
    let m = u32::try_from(minutes % 60).ok()?;
    NaiveTime::from_hms_opt(h, m, 0)
}

/// Cut a window into fixed-duration slots. A trailing remainder shorter than
/// the slot duration is dropped. A window whose start equals its end yields
/// nothing.
pub fn generate(window: &AvailabilityWindow) -> Vec<Slot> {
    let duration = window.slot_duration_minutes;
    if duration <= 0 {
        return Vec::new();
    }

    let end = minutes_of(window.end_time);
    let mut cursor = minutes_of(window.start_time);
    let mut slots = Vec::new();

    while cursor + duration <= end {
        let (Some(start), Some(finish)) = (time_of(cursor), time_of(cursor + duration)) else {
            break;
        };
        slots.push(Slot { start, end: finish });
        cursor += duration;
    }

    slots
}

/// Find the generated slot beginning exactly at `start`, if any.
pub fn slot_for_start(window: &AvailabilityWindow, start: NaiveTime) -> Option<Slot> {
    generate(window).into_iter().find(|s| s.start == start)
}
