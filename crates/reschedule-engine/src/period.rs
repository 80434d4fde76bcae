//! Calendar periods and date membership.
//!
//! Periods are inclusive date ranges. A selection may contain overlapping
//! periods of mixed kind; membership is a union, so a date inside two periods
//! is still matched once, against the first period that contains it.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Week,
    Month,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: PeriodKind,
    pub label: String,
}

impl Period {
    /// The Monday-to-Sunday week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        Self {
            start,
            end: start + Duration::days(6),
            kind: PeriodKind::Week,
            label: format!("Week of {}", start.format("%Y-%m-%d")),
        }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        let end = next_month
            .and_then(|d| d.pred_opt())
            .unwrap_or(start);
        Self {
            start,
            end,
            kind: PeriodKind::Month,
            label: format!("Month {}", start.format("%Y-%m")),
        }
    }

    /// An arbitrary inclusive range.
    ///
    /// # Errors
    /// Returns `EngineError::InvertedPeriod` if `start > end`.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(EngineError::InvertedPeriod { start, end });
        }
        Ok(Self {
            start,
            end,
            kind: PeriodKind::Custom,
            label: format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")),
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    fn same_range(&self, other: &Period) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// Result of testing a date against a set of periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodMatch<'a> {
    pub in_period: bool,
    /// Label of the first period containing the date.
    pub matched_label: Option<&'a str>,
}

/// Test `date` against `periods` by linear scan, short-circuiting on the
/// first period that contains it. Duplicate periods are tolerated.
pub fn is_in_any_period(periods: &[Period], date: NaiveDate) -> PeriodMatch<'_> {
    match periods.iter().find(|p| p.contains(date)) {
        Some(p) => PeriodMatch {
            in_period: true,
            matched_label: Some(&p.label),
        },
        None => PeriodMatch {
            in_period: false,
            matched_label: None,
        },
    }
}

/// The user's chosen periods. Rejects a second period with the same
/// start and end as one already chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    periods: Vec<Period>,
}

impl PeriodSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from a list, rejecting duplicates and inverted ranges.
    pub fn from_periods(periods: impl IntoIterator<Item = Period>) -> Result<Self> {
        let mut selection = Self::new();
        for p in periods {
            selection.add(p)?;
        }
        Ok(selection)
    }

    pub fn add(&mut self, period: Period) -> Result<()> {
        if period.start > period.end {
            return Err(EngineError::InvertedPeriod {
                start: period.start,
                end: period.end,
            });
        }
        if self.periods.iter().any(|p| p.same_range(&period)) {
            return Err(EngineError::DuplicatePeriod {
                start: period.start,
                end: period.end,
            });
        }
        self.periods.push(period);
        Ok(())
    }

    /// Remove the period with the given range, returning whether one was removed.
    pub fn remove(&mut self, start: NaiveDate, end: NaiveDate) -> bool {
        let before = self.periods.len();
        self.periods.retain(|p| !(p.start == start && p.end == end));
        self.periods.len() != before
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn matches(&self, date: NaiveDate) -> PeriodMatch<'_> {
        is_in_any_period(&self.periods, date)
    }
}
