use crate::commands::{require_pages, Report};
use crate::page_range::PageSelection;
use crate::pdf::overlay::{Placement, TextStyle};
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub struct NumberOptions {
    /// Label of the first page.
    pub start: u32,
    pub size: f32,
    pub margin: f32,
    pub placement: Placement,
    /// Only number these pages; labels still count from page 1.
    pub pages: Option<String>,
}

impl Default for NumberOptions {
    fn default() -> Self {
        NumberOptions {
            start: 1,
            size: 10.0,
            margin: 24.0,
            placement: Placement::BottomRight,
            pages: None,
        }
    }
}

/// Draw page numbers on the document.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &NumberOptions,
) -> Result<Report> {
    let output = output.as_ref();
    let mut doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let selection = match &options.pages {
        Some(pages) => require_pages(PageSelection::parse(pages, total_pages), "number")?,
        None => PageSelection::all(total_pages),
    };
    let style = TextStyle::new(options.size, options.margin, options.placement);
    info!(pages = %selection, start = options.start, "numbering pages");

    doc.draw_text_on_pages(&selection, &style, |page| {
        (u64::from(options.start) + u64::from(page) - 1).to_string()
    })?;
    PdfDocument::save(&mut doc.doc, output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count: total_pages,
        affected: selection.len(),
        message: format!(
            "Numbered {} page(s) into {}",
            selection.len(),
            output.display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::fixture;

    fn content_of(path: &Path, page: u32) -> String {
        let doc = PdfDocument::open(path).unwrap();
        let id = doc.page_id(page).unwrap();
        String::from_utf8_lossy(&doc.doc.get_page_content(id).unwrap()).to_string()
    }

    #[test]
    fn test_number_all_pages() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        let output = dir.path().join("out.pdf");

        let options = NumberOptions {
            start: 10,
            ..Default::default()
        };
        let report = run(&input, &output, &options).unwrap();
        assert_eq!(report.affected, 3);
        assert!(content_of(&output, 1).contains("(10) Tj"));
        assert!(content_of(&output, 3).contains("(12) Tj"));
    }

    #[test]
    fn test_number_selected_pages() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        let output = dir.path().join("out.pdf");

        let options = NumberOptions {
            pages: Some("2-3".into()),
            ..Default::default()
        };
        run(&input, &output, &options).unwrap();
        assert!(!content_of(&output, 1).contains("Tj"));
        assert!(content_of(&output, 2).contains("(2) Tj"));
    }
}
