use crate::commands::{write_plan, Report};
use crate::page_range::PageSelection;
use crate::pdf::PdfDocument;
use crate::plan::{self, Rotation};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Turn the selected pages (every page when `pages` is `None`) by `angle`
/// degrees, on top of whatever rotation they already have.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    pages: Option<&str>,
    angle: i64,
    counter_clockwise: bool,
    output: Q,
) -> Result<Report> {
    let output = output.as_ref();
    let rotation = Rotation::from_degrees(angle, counter_clockwise)?;

    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let selection = match pages {
        Some(pages) => PageSelection::parse(pages, total_pages),
        None => PageSelection::all(total_pages),
    };
    let plan = plan::rotate(total_pages, &selection, rotation)
        .context("Enter pages to rotate, or leave the page list out to rotate every page")?;
    info!(pages = %selection, degrees = rotation.degrees(), "rotating pages");

    let page_count = write_plan(&doc, &plan, output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count,
        affected: selection.len(),
        message: format!(
            "Rotated {} page(s) by {}° into {}",
            selection.len(),
            rotation.degrees(),
            output.display()
        ),
    })
}
