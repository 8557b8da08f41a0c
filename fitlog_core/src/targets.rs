//! Daily calorie and macronutrient targets.
//!
//! - BMR: Mifflin-St Jeor, `10*kg + 6.25*cm - 5*age`, +5 male / -161 female
//! - TEE: BMR times an activity multiplier (1.2 .. 1.9, 1.55 if unknown)
//! - Goal: -400 kcal to lose fat, +300 kcal to gain muscle
//! - Macros: fixed percentage split per goal, 4 kcal/g protein and carbs,
//!   9 kcal/g fat

use crate::aggregate::Totals;
use crate::{ActivityLevel, Goal, Profile, Sex};
use serde::{Deserialize, Serialize};

const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_CARBS: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Recommended daily intake
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyTargets {
    pub calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

/// Fraction of calories from each macronutrient
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Basal metabolic rate in kcal/day
pub fn basal_metabolic_rate(profile: &Profile) -> f64 {
    let base = 10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * f64::from(profile.age);
    match profile.sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
        ActivityLevel::VeryActive => 1.9,
        ActivityLevel::Unknown => 1.55,
    }
}

pub fn goal_adjustment(goal: Goal) -> f64 {
    match goal {
        Goal::LoseFat => -400.0,
        Goal::GainMuscle => 300.0,
        Goal::Maintain => 0.0,
    }
}

pub fn macro_split(goal: Goal) -> MacroSplit {
    match goal {
        Goal::LoseFat => MacroSplit {
            protein: 0.35,
            carbs: 0.35,
            fat: 0.30,
        },
        Goal::GainMuscle => MacroSplit {
            protein: 0.30,
            carbs: 0.45,
            fat: 0.25,
        },
        Goal::Maintain => MacroSplit {
            protein: 0.25,
            carbs: 0.45,
            fat: 0.30,
        },
    }
}

fn round_non_negative(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Compute the daily targets for a profile
pub fn daily_targets(profile: &Profile) -> DailyTargets {
    let tee = basal_metabolic_rate(profile) * activity_multiplier(profile.activity_level);
    let calories = round_non_negative(tee + goal_adjustment(profile.goal));
    let split = macro_split(profile.goal);
    let kcal = f64::from(calories);

    DailyTargets {
        calories,
        protein_g: round_non_negative(kcal * split.protein / KCAL_PER_GRAM_PROTEIN),
        carbs_g: round_non_negative(kcal * split.carbs / KCAL_PER_GRAM_CARBS),
        fat_g: round_non_negative(kcal * split.fat / KCAL_PER_GRAM_FAT),
    }
}

/// Target vs. actual for one nutrient
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutrientProgress {
    pub target: u64,
    pub actual: u64,
    /// Target minus actual; negative once the target is exceeded
    pub remaining: i64,
    /// Actual as a whole percentage of target (0 when the target is 0)
    pub percent: u64,
}

impl NutrientProgress {
    fn new(target: u64, actual: u64) -> Self {
        let percent = if target == 0 {
            0
        } else {
            (actual * 100 + target / 2) / target
        };
        Self {
            target,
            actual,
            remaining: target as i64 - actual as i64,
            percent,
        }
    }
}

/// Comparison of tracked intake against daily targets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetProgress {
    pub calories: NutrientProgress,
    pub protein: NutrientProgress,
    pub carbs: NutrientProgress,
    pub fat: NutrientProgress,
}

impl TargetProgress {
    /// Compare intake over `days` days against `days` times the daily targets
    pub fn compare(targets: &DailyTargets, actual: &Totals, days: u64) -> Self {
        Self {
            calories: NutrientProgress::new(u64::from(targets.calories) * days, actual.calories_consumed),
            protein: NutrientProgress::new(u64::from(targets.protein_g) * days, actual.protein),
            carbs: NutrientProgress::new(u64::from(targets.carbs_g) * days, actual.carbs),
            fat: NutrientProgress::new(u64::from(targets.fat_g) * days, actual.fat),
        }
    }
}
