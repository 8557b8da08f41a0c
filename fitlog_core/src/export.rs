//! CSV export of period summaries.

use crate::{PeriodSummary, Result};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    calories_consumed: u64,
    calories_burned: u64,
    balance: i64,
    protein: u64,
    carbs: u64,
    fat: u64,
    workout_minutes: u64,
    workout_count: u64,
    meal_count: u64,
}

/// Write one row per day of `summary` to `path`, replacing any existing file
///
/// Returns the number of rows written.
pub fn write_period_csv(summary: &PeriodSummary, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    for day in &summary.days {
        writer.serialize(CsvRow {
            date: day.date.to_string(),
            calories_consumed: day.totals.calories_consumed,
            calories_burned: day.totals.calories_burned,
            balance: day.balance(),
            protein: day.totals.protein,
            carbs: day.totals.carbs,
            fat: day.totals.fat,
            workout_minutes: day.totals.workout_minutes,
            workout_count: day.totals.workout_count,
            meal_count: day.totals.meal_count,
        })?;
    }

    writer.flush()?;
    tracing::info!("Wrote {} days to {:?}", summary.days.len(), path);
    Ok(summary.days.len())
}
