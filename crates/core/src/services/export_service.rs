use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::errors::CoreError;
use crate::models::report::{ExportFormat, Report};
use crate::models::transaction::DISPLAY_DATE_FORMAT;

use super::pdf_writer::{self, PdfLine};

/// A generated download, ready to hand to the browser or write to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Renders reports into PDF, XLSX and CSV files.
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    pub fn export(&self, report: &Report, format: ExportFormat) -> Result<ExportedFile, CoreError> {
        let bytes = match format {
            ExportFormat::Pdf => self.to_pdf(report)?,
            ExportFormat::Xlsx => self.to_xlsx(report)?,
            ExportFormat::Csv => self.to_csv(report).into_bytes(),
        };
        let file_name = report.file_name(format);
        info!(file = %file_name, size = bytes.len(), "report exported");
        Ok(ExportedFile {
            file_name,
            mime_type: format.mime_type(),
            bytes,
        })
    }

    /// One "Report" sheet: title block, header row, transactions, totals.
    pub fn to_xlsx(&self, report: &Report) -> Result<Vec<u8>, CoreError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let money = Format::new().set_num_format("#,##0.00");
        let bold_money = Format::new().set_bold().set_num_format("#,##0.00");

        let sheet = workbook.add_worksheet();
        sheet.set_name("Report")?;
        sheet.write_string_with_format(0, 0, &report.title, &bold)?;
        sheet.write_string(
            1,
            0,
            &format!("Generated: {}", report.generated_at.format(DISPLAY_DATE_FORMAT)),
        )?;

        let header_row = 3;
        for (col, title) in ["Date", "Name", "Username", "Type", "Amount", "Reason"]
            .iter()
            .enumerate()
        {
            sheet.write_string_with_format(header_row, col as u16, *title, &bold)?;
        }

        let mut row = header_row + 1;
        for r in &report.rows {
            sheet.write_string(row, 0, &r.date.format(DISPLAY_DATE_FORMAT).to_string())?;
            sheet.write_string(row, 1, &r.name)?;
            sheet.write_string(row, 2, &r.username)?;
            sheet.write_string(row, 3, &r.kind.to_string())?;
            sheet.write_number_with_format(row, 4, r.amount, &money)?;
            sheet.write_string(row, 5, r.reason.as_deref().unwrap_or(""))?;
            row += 1;
        }

        row += 1;
        for (label, value) in [
            ("Total Deposited", report.total_deposited),
            ("Total Withdrawn", report.total_withdrawn),
            ("Net", report.net),
        ] {
            sheet.write_string_with_format(row, 3, label, &bold)?;
            sheet.write_number_with_format(row, 4, value, &bold_money)?;
            row += 1;
        }

        for (col, width) in [(0u16, 22.0), (1, 24.0), (2, 16.0), (3, 16.0), (4, 14.0), (5, 30.0)] {
            sheet.set_column_width(col, width)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    pub fn to_pdf(&self, report: &Report) -> Result<Vec<u8>, CoreError> {
        let mut lines = vec![
            PdfLine::bold(report.title.clone()),
            PdfLine::plain(format!(
                "Generated: {}",
                report.generated_at.format(DISPLAY_DATE_FORMAT)
            )),
            PdfLine::plain(format!("Transactions: {}", report.row_count())),
            PdfLine::plain(""),
            PdfLine::bold(format!(
                "{:<20} {:<20} {:<8} {:>12}  {}",
                "Date", "Name", "Type", "Amount", "Reason"
            )),
            PdfLine::plain("-".repeat(86)),
        ];
        if report.is_empty() {
            lines.push(PdfLine::plain("No transactions in this period."));
        }
        for r in &report.rows {
            lines.push(PdfLine::plain(format!(
                "{:<20} {:<20} {:<8} {:>12.2}  {}",
                r.date.format(DISPLAY_DATE_FORMAT).to_string(),
                truncate(&r.name, 20),
                r.kind.to_string(),
                r.amount,
                truncate(r.reason.as_deref().unwrap_or(""), 22)
            )));
        }
        lines.push(PdfLine::plain("-".repeat(86)));
        lines.push(PdfLine::bold(format!("Total Deposited: {:.2}", report.total_deposited)));
        lines.push(PdfLine::bold(format!("Total Withdrawn: {:.2}", report.total_withdrawn)));
        lines.push(PdfLine::bold(format!("Net: {:.2}", report.net)));
        pdf_writer::render(&report.title, &lines)
    }

    /// Header plus one line per transaction.
    #[must_use]
    pub fn to_csv(&self, report: &Report) -> String {
        let mut csv = String::from("date,name,username,type,amount,reason\n");
        for r in &report.rows {
            csv.push_str(&format!(
                "{},{},{},{},{:.2},{}\n",
                csv_field(&r.date.format(DISPLAY_DATE_FORMAT).to_string()),
                csv_field(&r.name),
                csv_field(&r.username),
                r.kind,
                r.amount,
                csv_field(r.reason.as_deref().unwrap_or("")),
            ));
        }
        csv
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut s: String = value.chars().take(max.saturating_sub(1)).collect();
        s.push('~');
        s
    }
}
