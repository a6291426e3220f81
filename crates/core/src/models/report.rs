use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::transaction::TransactionType;

/// Which transactions a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    Daily(NaiveDate),
    Monthly { year: i32, month: u32 },
    Yearly(i32),
    /// All transactions of one student, by username.
    Individual(String),
    /// Inclusive on both ends.
    Range { from: NaiveDate, to: NaiveDate },
    All,
}

impl ReportKind {
    /// Short label used in titles and file names.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Daily(_) => "Daily",
            ReportKind::Monthly { .. } => "Monthly",
            ReportKind::Yearly(_) => "Yearly",
            ReportKind::Individual(_) => "Individual",
            ReportKind::Range { .. } => "Range",
            ReportKind::All => "All",
        }
    }

    /// Human-readable period, e.g. "March 2025".
    #[must_use]
    pub fn period(&self) -> String {
        match self {
            ReportKind::Daily(date) => date.format("%d/%m/%Y").to_string(),
            ReportKind::Monthly { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1)
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_else(|| format!("{month:02}/{year}")),
            ReportKind::Yearly(year) => year.to_string(),
            ReportKind::Individual(username) => format!("Student: {username}"),
            ReportKind::Range { from, to } => {
                format!("{} - {}", from.format("%d/%m/%Y"), to.format("%d/%m/%Y"))
            }
            ReportKind::All => "All time".to_string(),
        }
    }

    /// Whether a transaction on `date` falls inside the period.
    /// `Individual` and `All` are not date-bound.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        match self {
            ReportKind::Daily(day) => date == *day,
            ReportKind::Monthly { year, month } => date.year() == *year && date.month() == *month,
            ReportKind::Yearly(year) => date.year() == *year,
            ReportKind::Range { from, to } => date >= *from && date <= *to,
            ReportKind::Individual(_) | ReportKind::All => true,
        }
    }
}

/// One line of a report table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub name: String,
    pub username: String,
    pub kind: TransactionType,
    pub amount: f64,
    pub date: NaiveDateTime,
    pub reason: Option<String>,
}

/// A derived, read-only summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub generated_at: NaiveDateTime,
    /// Sorted by date, oldest first.
    pub rows: Vec<ReportRow>,
    pub total_deposited: f64,
    pub total_withdrawn: f64,
    /// total_deposited - total_withdrawn
    pub net: f64,
}

impl Report {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `JDSA_Report_<type>_<date>.<ext>`, dated by generation day.
    #[must_use]
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!(
            "JDSA_Report_{}_{}.{}",
            self.kind.label(),
            self.generated_at.date().format("%Y-%m-%d"),
            format.extension()
        )
    }
}

/// Downloadable report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Xlsx,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv",
        }
    }
}
