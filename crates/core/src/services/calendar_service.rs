use std::collections::HashSet;

use chrono::{Datelike, Months, NaiveDate};

use crate::errors::CoreError;
use crate::models::account::StudentAccount;
use crate::models::calendar::{CalendarDay, CalendarMonth};

const WEEKS_SHOWN: usize = 6;

/// Month grids for the calendar widget.
pub struct CalendarService;

impl CalendarService {
    pub fn new() -> Self {
        Self
    }

    /// Build a Sunday-first month grid. `activity` marks days with transactions.
    pub fn month(
        &self,
        year: i32,
        month: u32,
        today: NaiveDate,
        activity: &HashSet<NaiveDate>,
    ) -> Result<CalendarMonth, CoreError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            CoreError::Validation(format!("Invalid calendar month {year}-{month:02}"))
        })?;
        let next_first = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| CoreError::Validation(format!("Month {year}-{month:02} out of range")))?;
        let days_in_month = (next_first - first).num_days() as usize;
        let offset = first.weekday().num_days_from_sunday() as usize;

        let mut weeks = vec![[None, None, None, None, None, None, None]; WEEKS_SHOWN];
        for (i, date) in first.iter_days().take(days_in_month).enumerate() {
            let cell = offset + i;
            weeks[cell / 7][cell % 7] = Some(CalendarDay {
                date,
                is_today: date == today,
                has_activity: activity.contains(&date),
            });
        }

        Ok(CalendarMonth { year, month, weeks })
    }

    /// Every day on which any account has a transaction.
    #[must_use]
    pub fn activity_days(&self, students: &[StudentAccount]) -> HashSet<NaiveDate> {
        students
            .iter()
            .flat_map(|s| s.transactions.iter().map(|t| t.date.date()))
            .collect()
    }

    /// `(year, month)` shifted by `delta` months, for prev/next navigation.
    #[must_use]
    pub fn shift(year: i32, month: u32, delta: i32) -> (i32, u32) {
        let index = year * 12 + (month as i32 - 1) + delta;
        (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new()
    }
}
