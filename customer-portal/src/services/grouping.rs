//! Month-grouped appointment views.
//!
//! The upstream list is unfiltered; the classifier decides which bucket an
//! appointment belongs to and the grouper orders everything for display:
//! upcoming work soonest-first, history newest-first.

use crate::models::{Appointment, StatusBucket};
use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// One month of appointments under a "March 2025" style label.
#[derive(Debug, Clone, Serialize)]
pub struct MonthGroup {
    pub label: String,
    pub appointments: Vec<Appointment>,
}

/// Pending and waiting-payment appointments, earliest month first and
/// earliest date first within each month.
pub fn group_future(appointments: &[Appointment]) -> Vec<MonthGroup> {
    grouped(appointments, StatusBucket::Future, false)
}

/// Finalized and canceled appointments, latest month first and latest date
/// first within each month.
pub fn group_past(appointments: &[Appointment]) -> Vec<MonthGroup> {
    grouped(appointments, StatusBucket::Past, true)
}

pub fn total_count(groups: &[MonthGroup]) -> usize {
    groups.iter().map(|g| g.appointments.len()).sum()
}

fn grouped(
    appointments: &[Appointment],
    bucket: StatusBucket,
    newest_first: bool,
) -> Vec<MonthGroup> {
    let mut months: BTreeMap<(i32, u32), Vec<Appointment>> = BTreeMap::new();

    for appointment in appointments.iter().filter(|a| a.bucket() == bucket) {
        let date = appointment.appointment_date;
        months
            .entry((date.year(), date.month()))
            .or_default()
            .push(appointment.clone());
    }

    let mut groups: Vec<MonthGroup> = months
        .into_values()
        .map(|mut items| {
            items.sort_by_key(|a| a.appointment_date);
            if newest_first {
                items.reverse();
            }
            MonthGroup {
                label: month_label(items[0].appointment_date),
                appointments: items,
            }
        })
        .collect();

    if newest_first {
        groups.reverse();
    }

    groups
}

fn month_label(date: NaiveDateTime) -> String {
    date.format("%B %Y").to_string()
}
