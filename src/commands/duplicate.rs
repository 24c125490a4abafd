use crate::commands::{require_pages, write_plan, Report};
use crate::page_range::PageSelection;
use crate::pdf::PdfDocument;
use crate::plan;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Append one extra copy of each selected page to the end of the document.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, pages: &str, output: Q) -> Result<Report> {
    let output = output.as_ref();
    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let selection = require_pages(PageSelection::parse(pages, total_pages), "duplicate")?;
    info!(pages = %selection, "duplicating pages");

    let page_count = write_plan(&doc, &plan::duplicate(total_pages, &selection), output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count,
        affected: selection.len(),
        message: format!(
            "Duplicated {} page(s) into {}",
            selection.len(),
            output.display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{fixture, page_count};

    #[test]
    fn test_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        let output = dir.path().join("out.pdf");

        let report = run(&input, "3,1", &output).unwrap();
        assert_eq!(report.affected, 2);
        assert_eq!(page_count(&output), 5);
    }

    #[test]
    fn test_duplicate_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        assert!(run(&input, "", dir.path().join("out.pdf")).is_err());
    }
}
