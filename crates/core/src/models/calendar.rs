use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::services::calendar_service::CalendarService;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_today: bool,
    /// At least one transaction happened on this day.
    pub has_activity: bool,
}

/// Month view of the calendar widget: 6 weeks of 7 cells, Sunday first.
/// Cells outside the month are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Option<CalendarDay>; 7]>,
}

impl CalendarMonth {
    /// "October 2026"
    #[must_use]
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flat_map(|w| w.iter().flatten())
    }

    /// `(year, month)` of the following month.
    #[must_use]
    pub fn next(&self) -> (i32, u32) {
        CalendarService::shift(self.year, self.month, 1)
    }

    #[must_use]
    pub fn prev(&self) -> (i32, u32) {
        CalendarService::shift(self.year, self.month, -1)
    }
}
