use crate::commands::{require_pages, write_plan, Report};
use crate::page_range::PageSelection;
use crate::pdf::PdfDocument;
use crate::plan;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Keep only the selected pages.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, pages: &str, output: Q) -> Result<Report> {
    let output = output.as_ref();
    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let selection = require_pages(PageSelection::parse(pages, total_pages), "keep")?;
    info!(pages = %selection, total_pages, "extracting pages");

    let page_count = write_plan(&doc, &plan::keep(&selection), output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count,
        affected: selection.len(),
        message: format!(
            "Extracted {} page(s) to {}",
            selection.len(),
            output.display()
        ),
    })
}
