//! Calendar periods used for aggregation.

use crate::{Error, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A contiguous, closed range of calendar dates
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    /// A single day
    Day { date: NaiveDate },
    /// Monday through Sunday of the week containing `date`
    Week { date: NaiveDate },
    /// Every day of a calendar month
    Month { year: i32, month: u32 },
    /// Arbitrary range; empty when `end < start`
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Build a period of the given kind around `date`
    pub fn around(kind: PeriodKind, date: NaiveDate) -> Self {
        match kind {
            PeriodKind::Day => Period::Day { date },
            PeriodKind::Week => Period::Week { date },
            PeriodKind::Month => Period::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    /// First and last dates, or `None` for an empty period
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Period::Day { date } => Some((date, date)),
            Period::Week { date } => {
                let offset = date.weekday().num_days_from_monday() as i64;
                let monday = date.checked_sub_signed(Duration::days(offset))?;
                Some((monday, monday.checked_add_signed(Duration::days(6))?))
            }
            Period::Month { year, month } => {
                let first = NaiveDate::from_ymd_opt(year, month, 1)?;
                let (next_year, next_month) = if month == 12 {
                    (year + 1, 1)
                } else {
                    (year, month + 1)
                };
                let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
                Some((first, last))
            }
            Period::Range { start, end } => (start <= end).then_some((start, end)),
        }
    }

    /// Every date in the period, ascending
    pub fn dates(&self) -> Vec<NaiveDate> {
        match self.bounds() {
            Some((start, end)) => start.iter_days().take_while(|d| *d <= end).collect(),
            None => Vec::new(),
        }
    }
}

/// Granularity selector for [`Period::around`]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Day,
    #[default]
    Week,
    Month,
}

impl FromStr for PeriodKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(PeriodKind::Day),
            "week" => Ok(PeriodKind::Week),
            "month" => Ok(PeriodKind::Month),
            other => Err(Error::Config(format!("unknown period: {}", other))),
        }
    }
}
