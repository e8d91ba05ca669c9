//! Same-day slot availability.
//!
//! Bookable times are a fixed workshop grid from opening to closing;
//! availability is a pure time-of-day filter against "now". Whether another
//! customer already holds a slot is the backend's concern and is not checked
//! here.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub const OPENING_HOUR: u32 = 9;
pub const CLOSING_HOUR: u32 = 17;
const SLOT_MINUTES: u32 = 30;

/// 09:00 through 17:00 inclusive, every 30 minutes.
pub const SLOT_COUNT: usize = 17;

pub fn slot_times() -> Vec<NaiveTime> {
    let mut slots = Vec::with_capacity(SLOT_COUNT);
    let mut hour = OPENING_HOUR;
    let mut minute = 0;

    while hour < CLOSING_HOUR || (hour == CLOSING_HOUR && minute == 0) {
        slots.push(
            NaiveTime::from_hms_opt(hour, minute, 0).expect("slot grid times are valid"),
        );
        minute += SLOT_MINUTES;
        if minute == 60 {
            minute = 0;
            hour += 1;
        }
    }

    slots
}

/// A slot on any day other than today is always bookable; today a slot is
/// gone once its hour is past, or its minute is not strictly after now's
/// within the current hour.
pub fn is_available(date: NaiveDate, slot: NaiveTime, now: NaiveDateTime) -> bool {
    if date != now.date() {
        return true;
    }

    let now_time = now.time();
    if slot.hour() < now_time.hour() {
        return false;
    }
    if slot.hour() == now_time.hour() && slot.minute() <= now_time.minute() {
        return false;
    }

    true
}

/// Default date for the booking picker: tomorrow once the workshop has
/// closed for the day, today otherwise.
pub fn initial_date(now: NaiveDateTime) -> NaiveDate {
    if now.time().hour() >= CLOSING_HOUR {
        now.date().succ_opt().expect("calendar overflow")
    } else {
        now.date()
    }
}

pub fn available_slots(date: NaiveDate, now: NaiveDateTime) -> Vec<NaiveTime> {
    slot_times()
        .into_iter()
        .filter(|slot| is_available(date, *slot, now))
        .collect()
}

/// First bookable slot of the day in ascending order.
pub fn first_available(date: NaiveDate, now: NaiveDateTime) -> Option<NaiveTime> {
    available_slots(date, now).into_iter().next()
}

/// Keep the current selection when still bookable; otherwise fall back to
/// the earliest available slot. Used when a date change invalidates the
/// previously chosen time.
pub fn reselect(
    date: NaiveDate,
    selected: Option<NaiveTime>,
    now: NaiveDateTime,
) -> Option<NaiveTime> {
    match selected {
        Some(time) if is_available(date, time, now) => Some(time),
        _ => first_available(date, now),
    }
}
