use crate::commands::{write_plan, Report};
use crate::page_range::PageSelection;
use crate::pdf::PdfDocument;
use crate::plan;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::info;

/// Remove the selected pages.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, pages: &str, output: Q) -> Result<Report> {
    let output = output.as_ref();
    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let selection = PageSelection::parse(pages, total_pages);
    let plan = plan::remove(total_pages, &selection).context("Enter pages to delete")?;
    if plan.is_empty() {
        bail!("Refusing to delete all {} pages", total_pages);
    }
    info!(pages = %selection, total_pages, "deleting pages");

    let page_count = write_plan(&doc, &plan, output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count,
        affected: selection.len(),
        message: format!(
            "Removed {} page(s), wrote {} page(s) to {}",
            selection.len(),
            page_count,
            output.display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{fixture, page_count};
    use crate::plan::PlanError;

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 4);
        let output = dir.path().join("out.pdf");

        let report = run(&input, "2,4,4", &output).unwrap();
        assert_eq!(report.affected, 2);
        assert_eq!(report.page_count, 2);
        assert_eq!(page_count(&output), 2);
    }

    #[test]
    fn test_delete_nothing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        let output = dir.path().join("out.pdf");

        let err = run(&input, "abc", &output).unwrap_err();
        assert_eq!(
            err.root_cause().downcast_ref::<PlanError>(),
            Some(&PlanError::SelectionEmpty)
        );
        assert!(!output.exists());
    }

    #[test]
    fn test_delete_everything_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        let output = dir.path().join("out.pdf");

        assert!(run(&input, "1-3", &output).is_err());
    }
}
