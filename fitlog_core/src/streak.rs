//! Consecutive-day activity streaks.

use crate::recurrence::is_active_on;
use crate::{MealRecord, WorkoutRecord};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Count consecutive active days ending at `today`, walking backward
///
/// A day is active if any workout is active on it or any meal is dated on
/// it. Returns 0 when `today` itself has no activity.
pub fn current_streak(workouts: &[WorkoutRecord], meals: &[MealRecord], today: NaiveDate) -> u32 {
    let meal_dates: HashSet<NaiveDate> = meals.iter().map(|m| m.date).collect();

    let mut streak = 0;
    let mut day = Some(today);
    while let Some(d) = day {
        let active = meal_dates.contains(&d) || workouts.iter().any(|w| is_active_on(w, d));
        if !active {
            break;
        }
        streak += 1;
        day = d.pred_opt();
    }

    tracing::debug!(streak, %today, "Computed streak");
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExerciseType, FoodItem, Intensity, MealType};
    use chrono::{Duration, NaiveTime};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    fn meal_on(d: NaiveDate) -> MealRecord {
        MealRecord::new(
            d,
            noon(),
            MealType::Snack,
            vec![FoodItem {
                name: "apple".into(),
                calories: 95,
                protein_grams: 0,
                carbs_grams: 25,
                fat_grams: 0,
            }],
        )
    }

    fn workout_on(d: NaiveDate) -> WorkoutRecord {
        WorkoutRecord::new(d, noon(), ExerciseType::Yoga, 30, Intensity::Low, 120)
    }

    #[test]
    fn test_three_day_streak() {
        let today = date("2024-03-10");
        let meals = vec![meal_on(today), meal_on(today - Duration::days(2))];
        let workouts = vec![workout_on(today - Duration::days(1))];
        // Nothing on D-3, but activity again on D-4
        let older = vec![meal_on(today - Duration::days(4))];
        let all_meals: Vec<_> = meals.into_iter().chain(older).collect();

        assert_eq!(current_streak(&workouts, &all_meals, today), 3);
    }

    #[test]
    fn test_no_activity_today_is_zero() {
        let today = date("2024-03-10");
        let meals = vec![meal_on(today - Duration::days(1))];
        assert_eq!(current_streak(&[], &meals, today), 0);
        assert_eq!(current_streak(&[], &[], today), 0);
    }

    #[test]
    fn test_recurring_workout_extends_streak_back_to_anchor() {
        let today = date("2024-03-10");
        let workouts = vec![workout_on(date("2024-03-01")).daily()];
        assert_eq!(current_streak(&workouts, &[], today), 10);
    }

    #[test]
    fn test_weekly_recurrence_breaks_streak() {
        // 2024-03-10 is a Sunday; Saturday (6) and Sunday (0) only
        let today = date("2024-03-10");
        let workouts = vec![workout_on(date("2024-01-06")).weekly([0, 6])];
        assert_eq!(current_streak(&workouts, &[], today), 2);
    }

    #[test]
    fn test_walk_stops_at_calendar_minimum() {
        let workouts = vec![workout_on(NaiveDate::MIN).daily()];
        let today = NaiveDate::MIN + Duration::days(4);
        assert_eq!(current_streak(&workouts, &[], today), 5);
    }
}
