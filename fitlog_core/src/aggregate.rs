//! Per-day and per-period nutrition and activity summaries.
//!
//! Meals count only on their own date. Workouts count on every date the
//! recurrence evaluator reports them active, so one stored recurring workout
//! contributes to many days. A one-off entry sharing a date with a recurring
//! one is counted separately; nothing is merged.

use crate::recurrence::is_active_on;
use crate::{ExerciseType, MealRecord, WorkoutRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Summed nutrition and activity figures
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Totals {
    pub calories_consumed: u64,
    pub calories_burned: u64,
    pub protein: u64,
    pub carbs: u64,
    pub fat: u64,
    pub workout_minutes: u64,
    pub workout_count: u64,
    pub meal_count: u64,
}

impl Totals {
    /// Calories consumed minus calories burned; may be negative
    pub fn balance(&self) -> i64 {
        self.calories_consumed as i64 - self.calories_burned as i64
    }

    fn add_meal(&mut self, meal: &MealRecord) {
        self.calories_consumed += u64::from(meal.total_calories);
        self.protein += u64::from(meal.total_protein);
        self.carbs += u64::from(meal.total_carbs);
        self.fat += u64::from(meal.total_fat);
        self.meal_count += 1;
    }

    fn add_workout(&mut self, workout: &WorkoutRecord) {
        self.calories_burned += u64::from(workout.calories_burned);
        self.workout_minutes += u64::from(workout.duration);
        self.workout_count += 1;
    }

    fn accumulate(&mut self, other: &Totals) {
        self.calories_consumed += other.calories_consumed;
        self.calories_burned += other.calories_burned;
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
        self.workout_minutes += other.workout_minutes;
        self.workout_count += other.workout_count;
        self.meal_count += other.meal_count;
    }
}

/// Summary of a single calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub totals: Totals,
    /// Workouts active on this day, ordered by time of day
    pub workouts: Vec<WorkoutRecord>,
}

impl DaySummary {
    pub fn balance(&self) -> i64 {
        self.totals.balance()
    }

    /// Whether anything at all was tracked on this day
    pub fn has_activity(&self) -> bool {
        self.totals.workout_count > 0 || self.totals.meal_count > 0
    }
}

/// Minutes and calories for one exercise type across a period
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseTotals {
    pub minutes: u64,
    pub calories_burned: u64,
}

/// Summary of a whole period
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PeriodSummary {
    /// One entry per date, ascending
    pub days: Vec<DaySummary>,
    pub totals: Totals,
    pub by_exercise: BTreeMap<ExerciseType, ExerciseTotals>,
    /// Calories consumed per day, rounded half-up; 0 for an empty period
    pub average_calories_consumed: u64,
}

impl PeriodSummary {
    pub fn balance(&self) -> i64 {
        self.totals.balance()
    }
}

/// Summarize a single day
pub fn summarize_day(date: NaiveDate, workouts: &[WorkoutRecord], meals: &[MealRecord]) -> DaySummary {
    let day_meals: Vec<&MealRecord> = meals.iter().filter(|m| m.date == date).collect();
    build_day(date, workouts, &day_meals)
}

fn build_day(date: NaiveDate, workouts: &[WorkoutRecord], meals: &[&MealRecord]) -> DaySummary {
    let mut totals = Totals::default();
    for meal in meals {
        totals.add_meal(meal);
    }

    let mut matched: Vec<WorkoutRecord> = workouts
        .iter()
        .filter(|w| is_active_on(w, date))
        .cloned()
        .collect();
    // Stable: equal times keep input order
    matched.sort_by_key(|w| w.time);

    for workout in &matched {
        totals.add_workout(workout);
    }

    DaySummary {
        date,
        totals,
        workouts: matched,
    }
}

/// Summarize `dates` (expected ascending, e.g. from [`crate::Period::dates`])
///
/// Inputs are read-only snapshots; repeated calls with the same inputs
/// produce identical output.
pub fn summarize_period(
    dates: &[NaiveDate],
    workouts: &[WorkoutRecord],
    meals: &[MealRecord],
) -> PeriodSummary {
    let mut meals_by_date: HashMap<NaiveDate, Vec<&MealRecord>> = HashMap::new();
    for meal in meals {
        meals_by_date.entry(meal.date).or_default().push(meal);
    }

    let mut totals = Totals::default();
    let mut by_exercise: BTreeMap<ExerciseType, ExerciseTotals> = BTreeMap::new();
    let mut days = Vec::with_capacity(dates.len());

    for &date in dates {
        let day_meals = meals_by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);
        let day = build_day(date, workouts, day_meals);

        totals.accumulate(&day.totals);
        for workout in &day.workouts {
            let entry = by_exercise.entry(workout.exercise_type).or_default();
            entry.minutes += u64::from(workout.duration);
            entry.calories_burned += u64::from(workout.calories_burned);
        }
        days.push(day);
    }

    let average_calories_consumed = average_half_up(totals.calories_consumed, days.len() as u64);

    tracing::debug!(
        days = days.len(),
        consumed = totals.calories_consumed,
        burned = totals.calories_burned,
        "Summarized period"
    );

    PeriodSummary {
        days,
        totals,
        by_exercise,
        average_calories_consumed,
    }
}

fn average_half_up(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (total + count / 2) / count
}
