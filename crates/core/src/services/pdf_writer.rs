//! Report PDFs on top of `printpdf`.
//!
//! A4 pages of monospaced text in the built-in Courier fonts, so no font
//! is embedded. Those fonts only cover ASCII reliably: the rupee sign is
//! spelled out as `Rs.` and any other non-ASCII character becomes `?`.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::errors::CoreError;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_LEFT: Mm = Mm(14.0);
const TOP_BASELINE_MM: f32 = 282.0;
const LEADING_MM: f32 = 4.9;
const FONT_SIZE: f32 = 9.0;

/// Lines that fit between the top baseline and the bottom margin.
pub const LINES_PER_PAGE: usize = 54;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLine {
    pub text: String,
    pub bold: bool,
}

impl PdfLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true }
    }
}

/// Split `lines` into pages. An empty document still gets one blank page.
#[must_use]
pub fn paginate(lines: &[PdfLine]) -> Vec<&[PdfLine]> {
    if lines.is_empty() {
        vec![lines]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    }
}

/// Lay `lines` out over as many pages as needed and return the file bytes.
pub fn render(title: &str, lines: &[PdfLine]) -> Result<Vec<u8>, CoreError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(sanitize(title), PAGE_WIDTH, PAGE_HEIGHT, "Page 1");
    let regular = doc.add_builtin_font(BuiltinFont::Courier)?;
    let bold = doc.add_builtin_font(BuiltinFont::CourierBold)?;

    for (i, page) in paginate(lines).into_iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) =
                doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, format!("Page {}", i + 1));
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        for (row, line) in page.iter().enumerate() {
            let font = if line.bold { &bold } else { &regular };
            let y = Mm(TOP_BASELINE_MM - LEADING_MM * row as f32);
            layer.use_text(sanitize(&line.text), FONT_SIZE, MARGIN_LEFT, y, font);
        }
    }

    Ok(doc.save_to_bytes()?)
}

/// Map text onto what the built-in fonts can draw.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '₹' => out.push_str("Rs."),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
