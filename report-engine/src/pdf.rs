//! Line-by-line PDF rendering on a US-Letter canvas.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.
//! There is no wrapping: each `\n`-separated line is drawn as-is, and a new
//! page starts once the cursor drops below the bottom margin.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt};
use tracing::debug;

use crate::error::ReportError;

pub const PAGE_WIDTH_PT: f32 = 612.0;
pub const PAGE_HEIGHT_PT: f32 = 792.0;

pub const MARGIN_X_PT: f32 = 72.0;
pub const TITLE_Y_PT: f32 = 750.0;
pub const TITLE_FONT_SIZE: f32 = 16.0;

pub const BODY_TOP_PT: f32 = 700.0;
pub const BODY_BOTTOM_PT: f32 = 50.0;
pub const LINE_STEP_PT: f32 = 15.0;
pub const BODY_FONT_SIZE: f32 = 12.0;

/// floor((700 - 50) / 15) + 1
pub const LINES_PER_PAGE: usize = ((BODY_TOP_PT - BODY_BOTTOM_PT) / LINE_STEP_PT) as usize + 1;

/// Splits `text` into pages of body lines.
///
/// Always returns at least one page, so an empty body still produces a
/// titled document.
///
/// # Example
/// ```
/// # use report_engine::pdf::layout;
/// let pages = layout("a\nb");
/// assert_eq!(pages, vec![vec!["a", "b"]]);
/// ```
pub fn layout(text: &str) -> Vec<Vec<&str>> {
    let lines: Vec<&str> = text.split('\n').collect();
    lines.chunks(LINES_PER_PAGE).map(<[&str]>::to_vec).collect()
}

/// Baseline of the `index`-th body line on its page.
fn line_y(index: usize) -> f32 {
    BODY_TOP_PT - LINE_STEP_PT * index as f32
}

fn pt(v: f32) -> Mm {
    Mm::from(Pt(v))
}

/// Renders `title` and `text` into a complete PDF document.
pub fn render(text: &str, title: &str) -> Result<Vec<u8>, ReportError> {
    let pages = layout(text);

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, pt(PAGE_WIDTH_PT), pt(PAGE_HEIGHT_PT), "Layer 1");

    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("font Helvetica-Bold: {e}")))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("font Helvetica: {e}")))?;

    let first = doc.get_page(first_page).get_layer(first_layer);
    first.use_text(title, TITLE_FONT_SIZE, pt(MARGIN_X_PT), pt(TITLE_Y_PT), &bold);

    let mut pages_iter = pages.iter();
    if let Some(lines) = pages_iter.next() {
        draw_lines(&first, lines, &regular);
    }
    for (n, lines) in pages_iter.enumerate() {
        let (page, layer) = doc.add_page(
            pt(PAGE_WIDTH_PT),
            pt(PAGE_HEIGHT_PT),
            format!("Layer {}", n + 2),
        );
        draw_lines(&doc.get_page(page).get_layer(layer), lines, &regular);
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| ReportError::Pdf(format!("save: {e}")))?;

    debug!(pages = pages.len(), bytes = bytes.len(), "pdf rendered");
    Ok(bytes)
}

fn draw_lines(layer: &PdfLayerReference, lines: &[&str], font: &IndirectFontRef) {
    for (i, line) in lines.iter().enumerate() {
        layer.use_text(*line, BODY_FONT_SIZE, pt(MARGIN_X_PT), pt(line_y(i)), font);
    }
}
