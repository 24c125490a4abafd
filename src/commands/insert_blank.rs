use crate::commands::{write_plan, Report};
use crate::page_range::PageSelection;
use crate::pdf::PdfDocument;
use crate::plan;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Insert a blank page after each listed page, sized like that page.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    positions: &str,
    output: Q,
) -> Result<Report> {
    let output = output.as_ref();
    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let positions = PageSelection::parse(positions, total_pages);
    let sizes = doc.page_sizes()?;
    let plan = plan::insert_blank(total_pages, &positions, |page| sizes[page as usize - 1]);
    info!(after = %positions, "inserting blank pages");

    let page_count = write_plan(&doc, &plan, output)?;
    let inserted = plan.blank_count();

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count,
        affected: inserted,
        message: format!(
            "Inserted {} blank page(s) into {}",
            inserted,
            output.display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{fixture, page_count};

    #[test]
    fn test_insert_blank() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        let output = dir.path().join("out.pdf");

        let report = run(&input, "1,3,3,8", &output).unwrap();
        assert_eq!(report.affected, 2);
        assert_eq!(page_count(&output), 5);
    }

    #[test]
    fn test_insert_nowhere_copies_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        let output = dir.path().join("out.pdf");

        let report = run(&input, "", &output).unwrap();
        assert_eq!(report.affected, 0);
        assert_eq!(page_count(&output), 3);
    }
}
