use crate::commands::{write_plan, Report};
use crate::page_range::parse_page_order;
use crate::pdf::PdfDocument;
use crate::plan::{self, PlanError};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// Write the pages in exactly the given order, e.g. "3,1-2" or "10-1".
///
/// The order is taken as is: pages may repeat or be left out.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, order: &str, output: Q) -> Result<Report> {
    let output = output.as_ref();
    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let order = parse_page_order(order, total_pages);
    if order.is_empty() {
        return Err(PlanError::SelectionEmpty).context("Enter a page order");
    }

    let distinct: BTreeSet<u32> = order.iter().copied().collect();
    if distinct.len() != order.len() || distinct.len() != total_pages as usize {
        warn!(
            listed = order.len(),
            distinct = distinct.len(),
            total_pages,
            "page order is not a permutation, output will repeat or omit pages"
        );
    }
    info!(?order, "reordering pages");

    let page_count = write_plan(&doc, &plan::reorder(&order), output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count,
        affected: order.len(),
        message: format!(
            "Wrote {} page(s) in the new order to {}",
            page_count,
            output.display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{fixture, page_count};

    #[test]
    fn test_reorder() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 4);
        let output = dir.path().join("out.pdf");

        let report = run(&input, "4-1", &output).unwrap();
        assert_eq!(report.page_count, 4);
        assert_eq!(page_count(&output), 4);
    }

    #[test]
    fn test_reorder_partial_order_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 4);
        let output = dir.path().join("out.pdf");

        run(&input, "2,2,2", &output).unwrap();
        assert_eq!(page_count(&output), 3);
    }

    #[test]
    fn test_reorder_empty() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 2);
        assert!(run(&input, "5,6", dir.path().join("out.pdf")).is_err());
    }
}
