//! MET-based estimate of calories burned.
//!
//! `kcal = MET * weight_kg * hours`. MET values follow the Compendium of
//! Physical Activities.

use crate::{ExerciseType, Intensity};

/// Metabolic equivalent for an exercise at a given intensity
pub fn met_value(exercise: ExerciseType, intensity: Intensity) -> f64 {
    use ExerciseType::*;
    use Intensity::*;

    match (exercise, intensity) {
        (Gym, Low) => 3.5,
        (Gym, Medium) => 5.0,
        (Gym, High) => 6.0,
        (Running, Low) => 7.0,
        (Running, Medium) => 9.8,
        (Running, High) => 11.5,
        (Cycling, Low) => 4.0,
        (Cycling, Medium) => 8.0,
        (Cycling, High) => 10.0,
        (Yoga, Low) => 2.5,
        (Yoga, Medium) => 3.0,
        (Yoga, High) => 4.0,
        (Swimming, Low) => 6.0,
        (Swimming, Medium) => 8.3,
        (Swimming, High) => 10.0,
        (Hiking, Low) => 5.3,
        (Hiking, Medium) => 6.0,
        (Hiking, High) => 7.8,
        (Other, Low) => 3.0,
        (Other, Medium) => 4.5,
        (Other, High) => 6.0,
    }
}

/// Estimated calories burned, rounded to the nearest kcal
pub fn estimate_calories_burned(
    exercise: ExerciseType,
    intensity: Intensity,
    duration_minutes: u32,
    weight_kg: f64,
) -> u32 {
    let hours = f64::from(duration_minutes) / 60.0;
    (met_value(exercise, intensity) * weight_kg.max(0.0) * hours).round() as u32
}
