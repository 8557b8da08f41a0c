//! Recurrence evaluation for repeating workouts.
//!
//! A single stored workout may count on many calendar dates. The rules, in
//! priority order:
//!
//! 1. The anchor date always matches, recurring or not.
//! 2. Non-recurring records and dates before the anchor never match.
//! 3. Dates after `recurrence_end` never match (the end date itself does).
//! 4. `Daily` matches every date, `Weekly` matches listed weekdays, and
//!    `Custom` matches every `recurrence_interval` days from the anchor.
//!
//! Malformed schedules (no weekdays, missing or zero interval, unrecognized
//! tag) never match. Evaluation is total and never fails.

use crate::{RecurrenceType, WorkoutRecord};
use chrono::{Datelike, NaiveDate};

/// Whether `workout` counts on `target`
pub fn is_active_on(workout: &WorkoutRecord, target: NaiveDate) -> bool {
    if workout.date == target {
        return true;
    }

    if !workout.is_recurring() || workout.date > target {
        return false;
    }

    if let Some(end) = workout.recurrence_end {
        if target > end {
            return false;
        }
    }

    match workout.recurrence_type {
        RecurrenceType::Daily => true,
        RecurrenceType::Weekly => {
            let weekday = target.weekday().num_days_from_sunday() as u8;
            workout.recurrence_days.contains(&weekday)
        }
        RecurrenceType::Custom => match workout.recurrence_interval {
            Some(interval) if interval >= 1 => {
                // NaiveDate subtraction is an exact whole-day count
                let days = (target - workout.date).num_days();
                days >= 0 && days % interval == 0
            }
            _ => false,
        },
        RecurrenceType::None | RecurrenceType::Unknown => false,
    }
}

/// All dates in `start..=end` on which `workout` counts, ascending
pub fn occurrences(workout: &WorkoutRecord, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_active_on(workout, *d))
        .collect()
}
