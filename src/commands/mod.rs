pub mod delete;
pub mod duplicate;
pub mod extract;
pub mod info;
pub mod insert_blank;
pub mod merge;
pub mod metadata;
pub mod number;
pub mod reorder;
pub mod rotate;
pub mod split;
pub mod stamp;
pub mod watermark;
pub mod write;

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::page_range::PageSelection;
use crate::pdf::PdfDocument;
use crate::plan::{PagePlan, PageSource, PlanError};

/// What a page tool did, for the terminal or an MCP client.
#[derive(Debug, Serialize)]
pub struct Report {
    pub outputs: Vec<String>,
    /// Pages in the written document (summed over all outputs).
    pub page_count: u32,
    /// Pages removed, duplicated, inserted, rotated, ... depending on the tool.
    pub affected: usize,
    pub message: String,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Reject an empty selection with a hint about what the user should enter.
pub(crate) fn require_pages(selection: PageSelection, verb: &str) -> Result<PageSelection> {
    if selection.is_empty() {
        return Err(anyhow::Error::new(PlanError::SelectionEmpty)
            .context(format!("Enter pages to {}", verb)));
    }
    Ok(selection)
}

/// Build the document described by `plan` and write it to `output`.
/// Returns the number of pages written.
pub(crate) fn write_plan(doc: &PdfDocument, plan: &PagePlan, output: &Path) -> Result<u32> {
    let mut new_doc = doc.materialize(plan)?;
    PdfDocument::save(&mut new_doc, output)?;
    Ok(plan.len() as u32)
}
