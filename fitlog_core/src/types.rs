//! Core domain types for the Fitlog tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise, intensity, meal and recurrence enumerations
//! - Workout records, which may repeat on a schedule
//! - Meal records and their food items
//! - The physiological profile used for daily targets

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Parse a snake_case tag through the serde representation of `T`.
fn parse_tag<T: DeserializeOwned>(kind: &str, raw: &str) -> Result<T> {
    let tag = raw.trim().to_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(tag))
        .map_err(|_| Error::InvalidRecord(format!("unknown {}: {}", kind, raw)))
}

/// `HH:MM` serialization for times of day.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Accepts `HH:MM` and, for older records, `HH:MM:SS`.
    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Kind of exercise performed in a workout
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Gym,
    Running,
    Cycling,
    Yoga,
    Swimming,
    Hiking,
    Other,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Gym => "gym",
            ExerciseType::Running => "running",
            ExerciseType::Cycling => "cycling",
            ExerciseType::Yoga => "yoga",
            ExerciseType::Swimming => "swimming",
            ExerciseType::Hiking => "hiking",
            ExerciseType::Other => "other",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_tag("exercise type", s)
    }
}

/// Perceived workout intensity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        })
    }
}

impl FromStr for Intensity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_tag("intensity", s)
    }
}

/// Slot of the day a meal belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        })
    }
}

impl FromStr for MealType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_tag("meal type", s)
    }
}

/// Schedule on which a recurring workout repeats
///
/// `Unknown` absorbs any tag this version does not recognize so that stored
/// records still load; such workouts only match their own date.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    #[default]
    None,
    Daily,
    Weekly,
    Custom,
    #[serde(other)]
    Unknown,
}

impl FromStr for RecurrenceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match parse_tag("recurrence type", s)? {
            RecurrenceType::Unknown => {
                Err(Error::InvalidRecord(format!("unknown recurrence type: {}", s)))
            }
            known => Ok(known),
        }
    }
}

// ============================================================================
// Workout Records
// ============================================================================

/// A logged workout, optionally repeating on a schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    pub id: Uuid,
    /// Anchor date; recurrence never applies before it
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub exercise_type: ExerciseType,
    /// Minutes
    pub duration: u32,
    pub intensity: Intensity,
    pub calories_burned: u32,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub recurrence_type: RecurrenceType,
    /// Day step for `Custom` recurrence
    #[serde(default)]
    pub recurrence_interval: Option<i64>,
    /// Weekday numbers, 0 = Sunday through 6 = Saturday, for `Weekly` recurrence
    #[serde(default)]
    pub recurrence_days: BTreeSet<u8>,
    /// Last date (inclusive) the recurrence applies to
    #[serde(default)]
    pub recurrence_end: Option<NaiveDate>,
}

impl WorkoutRecord {
    /// Create a one-off workout with a fresh id
    pub fn new(
        date: NaiveDate,
        time: NaiveTime,
        exercise_type: ExerciseType,
        duration: u32,
        intensity: Intensity,
        calories_burned: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            time,
            exercise_type,
            duration,
            intensity,
            calories_burned,
            recurring: false,
            recurrence_type: RecurrenceType::None,
            recurrence_interval: None,
            recurrence_days: BTreeSet::new(),
            recurrence_end: None,
        }
    }

    /// Repeat every day from the anchor date
    pub fn daily(mut self) -> Self {
        self.recurring = true;
        self.recurrence_type = RecurrenceType::Daily;
        self
    }

    /// Repeat on the given weekdays (0 = Sunday)
    pub fn weekly(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.recurring = true;
        self.recurrence_type = RecurrenceType::Weekly;
        self.recurrence_days = days.into_iter().collect();
        self
    }

    /// Repeat every `interval` days counted from the anchor date
    pub fn every_n_days(mut self, interval: i64) -> Self {
        self.recurring = true;
        self.recurrence_type = RecurrenceType::Custom;
        self.recurrence_interval = Some(interval);
        self
    }

    /// Stop recurring after `end` (inclusive)
    pub fn until(mut self, end: NaiveDate) -> Self {
        self.recurrence_end = Some(end);
        self
    }

    /// Whether this record repeats beyond its anchor date
    pub fn is_recurring(&self) -> bool {
        self.recurring && self.recurrence_type != RecurrenceType::None
    }

    /// Check a record before it is written to the store
    ///
    /// Evaluation never needs this; it is the store's guard against
    /// schedules that could never match.
    pub fn validate(&self) -> Result<()> {
        if !self.recurring {
            return Ok(());
        }

        match self.recurrence_type {
            RecurrenceType::Custom => match self.recurrence_interval {
                Some(n) if n >= 1 => {}
                _ => {
                    return Err(Error::InvalidRecord(
                        "custom recurrence needs an interval of at least 1 day".into(),
                    ))
                }
            },
            RecurrenceType::Weekly => {
                if self.recurrence_days.is_empty() {
                    return Err(Error::InvalidRecord(
                        "weekly recurrence needs at least one weekday".into(),
                    ));
                }
                if let Some(day) = self.recurrence_days.iter().find(|d| **d > 6) {
                    return Err(Error::InvalidRecord(format!(
                        "weekday {} out of range (0 = Sunday .. 6 = Saturday)",
                        day
                    )));
                }
            }
            RecurrenceType::Unknown => {
                return Err(Error::InvalidRecord("unknown recurrence type".into()))
            }
            RecurrenceType::None | RecurrenceType::Daily => {}
        }

        if let Some(end) = self.recurrence_end {
            if end < self.date {
                return Err(Error::InvalidRecord(format!(
                    "recurrence end {} is before start {}",
                    end, self.date
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Meal Records
// ============================================================================

/// One food within a meal, with its estimated nutrients
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoodItem {
    pub name: String,
    pub calories: u32,
    pub protein_grams: u32,
    pub carbs_grams: u32,
    pub fat_grams: u32,
}

/// A logged meal
///
/// The `total_*` fields always equal the sums over `foods`; aggregation
/// reads the totals directly.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MealRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub meal_type: MealType,
    /// Display order
    pub foods: Vec<FoodItem>,
    pub total_calories: u32,
    pub total_protein: u32,
    pub total_carbs: u32,
    pub total_fat: u32,
}

impl MealRecord {
    /// Create a meal with a fresh id and totals computed from `foods`
    pub fn new(date: NaiveDate, time: NaiveTime, meal_type: MealType, foods: Vec<FoodItem>) -> Self {
        let mut meal = Self {
            id: Uuid::new_v4(),
            date,
            time,
            meal_type,
            foods,
            total_calories: 0,
            total_protein: 0,
            total_carbs: 0,
            total_fat: 0,
        };
        meal.recompute_totals();
        meal
    }

    /// Restore the totals invariant after `foods` has been edited
    pub fn recompute_totals(&mut self) {
        self.total_calories = saturating_total(&self.foods, |f| f.calories);
        self.total_protein = saturating_total(&self.foods, |f| f.protein_grams);
        self.total_carbs = saturating_total(&self.foods, |f| f.carbs_grams);
        self.total_fat = saturating_total(&self.foods, |f| f.fat_grams);
    }

    /// Check a record before it is written to the store
    pub fn validate(&self) -> Result<()> {
        if self.foods.is_empty() {
            return Err(Error::InvalidRecord("meal has no foods".into()));
        }
        if let Some(food) = self.foods.iter().find(|f| f.name.trim().is_empty()) {
            return Err(Error::InvalidRecord(format!(
                "food with {} kcal has no name",
                food.calories
            )));
        }

        let overflows = |amount: fn(&FoodItem) -> u32| {
            self.foods.iter().map(|f| u64::from(amount(f))).sum::<u64>() > u64::from(u32::MAX)
        };
        if overflows(|f| f.calories)
            || overflows(|f| f.protein_grams)
            || overflows(|f| f.carbs_grams)
            || overflows(|f| f.fat_grams)
        {
            return Err(Error::InvalidRecord(format!(
                "meal {} totals are too large",
                self.id
            )));
        }

        let mut expected = self.clone();
        expected.recompute_totals();
        if expected.total_calories != self.total_calories
            || expected.total_protein != self.total_protein
            || expected.total_carbs != self.total_carbs
            || expected.total_fat != self.total_fat
        {
            return Err(Error::InvalidRecord(format!(
                "meal {} totals do not match its foods",
                self.id
            )));
        }
        Ok(())
    }
}

fn saturating_total(foods: &[FoodItem], amount: impl Fn(&FoodItem) -> u32) -> u32 {
    foods.iter().fold(0, |acc, f| acc.saturating_add(amount(f)))
}

// ============================================================================
// Profile
// ============================================================================

/// Sex used by the BMR equation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_tag("sex", s)
    }
}

/// Habitual activity level, mapped to a TEE multiplier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
    #[serde(other)]
    Unknown,
}

impl FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match parse_tag("activity level", s)? {
            ActivityLevel::Unknown => {
                Err(Error::InvalidRecord(format!("unknown activity level: {}", s)))
            }
            known => Ok(known),
        }
    }
}

/// Body-composition goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseFat,
    GainMuscle,
    Maintain,
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_tag("goal", s)
    }
}

/// Physiological profile of the user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        if self.age == 0 || self.age > 120 {
            return Err(Error::InvalidRecord(format!("age {} out of range", self.age)));
        }
        if !(self.weight_kg > 0.0 && self.weight_kg < 500.0) {
            return Err(Error::InvalidRecord(format!(
                "weight {} kg out of range",
                self.weight_kg
            )));
        }
        if !(self.height_cm > 0.0 && self.height_cm < 300.0) {
            return Err(Error::InvalidRecord(format!(
                "height {} cm out of range",
                self.height_cm
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn food(name: &str, calories: u32, p: u32, c: u32, f: u32) -> FoodItem {
        FoodItem {
            name: name.into(),
            calories,
            protein_grams: p,
            carbs_grams: c,
            fat_grams: f,
        }
    }

    #[test]
    fn test_meal_totals_follow_foods() {
        let mut meal = MealRecord::new(
            date("2024-03-01"),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            MealType::Breakfast,
            vec![food("oats", 300, 10, 54, 5), food("milk", 120, 8, 12, 5)],
        );
        assert_eq!(meal.total_calories, 420);
        assert_eq!(meal.total_protein, 18);
        assert_eq!(meal.total_carbs, 66);
        assert_eq!(meal.total_fat, 10);
        assert!(meal.validate().is_ok());

        meal.foods.pop();
        assert!(meal.validate().is_err());
        meal.recompute_totals();
        assert_eq!(meal.total_calories, 300);
        assert!(meal.validate().is_ok());
    }

    #[test]
    fn test_oversized_meal_totals_are_rejected() {
        let meal = MealRecord::new(
            date("2024-03-01"),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            MealType::Lunch,
            vec![food("x", u32::MAX, 0, 0, 0), food("y", u32::MAX, 0, 0, 0)],
        );
        assert_eq!(meal.total_calories, u32::MAX);
        assert!(matches!(meal.validate(), Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_unknown_recurrence_tag_deserializes() {
        let json = r#"{
            "id": "6f1c1d4e-1f3a-4b53-9d0b-0b8b8f1e2a10",
            "date": "2024-01-10",
            "time": "07:30",
            "exercise_type": "running",
            "duration": 30,
            "intensity": "medium",
            "calories_burned": 300,
            "recurring": true,
            "recurrence_type": "fortnightly"
        }"#;
        let workout: WorkoutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(workout.recurrence_type, RecurrenceType::Unknown);
        assert!(workout.recurrence_days.is_empty());
        assert_eq!(workout.time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    }

    #[test]
    fn test_time_serializes_as_hh_mm() {
        let workout = WorkoutRecord::new(
            date("2024-01-10"),
            NaiveTime::from_hms_opt(18, 5, 0).unwrap(),
            ExerciseType::Gym,
            45,
            Intensity::High,
            350,
        );
        let json = serde_json::to_value(&workout).unwrap();
        assert_eq!(json["time"], "18:05");
        assert_eq!(json["date"], "2024-01-10");
        assert_eq!(json["exercise_type"], "gym");
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!("Running".parse::<ExerciseType>().unwrap(), ExerciseType::Running);
        assert_eq!("very-active".parse::<ActivityLevel>().unwrap(), ActivityLevel::VeryActive);
        assert_eq!("lose_fat".parse::<Goal>().unwrap(), Goal::LoseFat);
        assert!("fortnightly".parse::<RecurrenceType>().is_err());
        assert!("couch".parse::<ActivityLevel>().is_err());
        assert!("skating".parse::<ExerciseType>().is_err());
    }

    #[test]
    fn test_workout_validation() {
        let base = WorkoutRecord::new(
            date("2024-01-10"),
            NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            ExerciseType::Running,
            30,
            Intensity::Medium,
            300,
        );
        assert!(base.validate().is_ok());
        assert!(base.clone().daily().validate().is_ok());
        assert!(base.clone().every_n_days(0).validate().is_err());
        assert!(base.clone().weekly([]).validate().is_err());
        assert!(base.clone().weekly([1, 9]).validate().is_err());
        assert!(base
            .clone()
            .daily()
            .until(date("2024-01-01"))
            .validate()
            .is_err());
    }

    #[test]
    fn test_profile_validation() {
        let profile = Profile {
            age: 30,
            weight_kg: 80.0,
            height_cm: 180.0,
            sex: Sex::Male,
            activity_level: ActivityLevel::Moderate,
            goal: Goal::Maintain,
        };
        assert!(profile.validate().is_ok());
        assert!(Profile { age: 0, ..profile.clone() }.validate().is_err());
        assert!(Profile { weight_kg: -1.0, ..profile }.validate().is_err());
    }
}
