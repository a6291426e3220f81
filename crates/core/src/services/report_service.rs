use chrono::NaiveDateTime;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::account::StudentAccount;
use crate::models::report::{Report, ReportKind, ReportRow};
use crate::models::transaction::TransactionType;

/// Builds read-only report tables by filtering every account's transactions.
pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        students: &[StudentAccount],
        kind: ReportKind,
        generated_at: NaiveDateTime,
    ) -> Result<Report, CoreError> {
        self.validate_kind(students, &kind)?;

        let period = &kind;
        let mut rows: Vec<ReportRow> = students
            .iter()
            .filter(|s| match period {
                ReportKind::Individual(username) => s.has_username(username),
                _ => true,
            })
            .flat_map(move |s| {
                s.transactions
                    .iter()
                    .filter(move |t| period.covers(t.date.date()))
                    .map(move |t| ReportRow {
                        name: s.name.clone(),
                        username: s.username.clone(),
                        kind: t.kind,
                        amount: t.amount,
                        date: t.date,
                        reason: t.reason.clone(),
                    })
            })
            .collect();
        // Stable: same-instant rows keep account order.
        rows.sort_by_key(|r| r.date);

        let (total_deposited, total_withdrawn) =
            rows.iter().fold((0.0, 0.0), |(dep, wd), r| match r.kind {
                TransactionType::Deposit => (dep + r.amount, wd),
                TransactionType::Withdraw => (dep, wd + r.amount),
            });

        debug!(kind = kind.label(), rows = rows.len(), "report generated");
        Ok(Report {
            title: format!("JDSA {} Report: {}", kind.label(), kind.period()),
            kind,
            generated_at,
            rows,
            total_deposited,
            total_withdrawn,
            net: total_deposited - total_withdrawn,
        })
    }

    fn validate_kind(&self, students: &[StudentAccount], kind: &ReportKind) -> Result<(), CoreError> {
        match kind {
            ReportKind::Monthly { month, .. } if !(1..=12).contains(month) => Err(
                CoreError::Validation(format!("Invalid month {month}: expected 1-12")),
            ),
            ReportKind::Range { from, to } if from > to => Err(CoreError::Validation(format!(
                "'from' date ({from}) must not be after 'to' date ({to})"
            ))),
            ReportKind::Individual(username) if username.trim().is_empty() => {
                Err(CoreError::NoStudentSelected)
            }
            ReportKind::Individual(username)
                if !students.iter().any(|s| s.has_username(username)) =>
            {
                Err(CoreError::AccountNotFound(username.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl Default for ReportService {
    fn default() -> Self {
        Self::new()
    }
}
