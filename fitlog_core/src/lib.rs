#![forbid(unsafe_code)]

//! Core domain model and business logic for the Fitlog tracker.
//!
//! This crate provides:
//! - Domain types (workouts, meals, foods, profile)
//! - Recurrence evaluation for repeating workouts
//! - Period aggregation, streaks and daily targets
//! - Persistence (JSONL record store, profile state, CSV export)
//! - The food-analysis boundary

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod recurrence;
pub mod period;
pub mod aggregate;
pub mod streak;
pub mod targets;
pub mod met;
pub mod analysis;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use recurrence::{is_active_on, occurrences};
pub use period::{Period, PeriodKind};
pub use aggregate::{summarize_day, summarize_period, DaySummary, ExerciseTotals, PeriodSummary, Totals};
pub use streak::current_streak;
pub use targets::{daily_targets, DailyTargets, NutrientProgress, TargetProgress};
pub use met::estimate_calories_burned;
pub use analysis::{AnalysisRequest, FoodAnalysis, FoodAnalyzer};
pub use store::{load_or_empty, FileStore, RecordStore};
pub use export::write_period_csv;
