use crate::commands::{require_pages, Report};
use crate::page_range::PageSelection;
use crate::pdf::overlay::{Placement, TextStyle};
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub const DEFAULT_TEXT: &str = "Stamped";

pub struct StampOptions {
    pub size: f32,
    pub margin: f32,
    pub placement: Placement,
    /// Only stamp these pages.
    pub pages: Option<String>,
}

impl Default for StampOptions {
    fn default() -> Self {
        StampOptions {
            size: 10.0,
            margin: 16.0,
            placement: Placement::TopLeft,
            pages: None,
        }
    }
}

/// Draw the same line of text on every selected page.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    text: &str,
    output: Q,
    options: &StampOptions,
) -> Result<Report> {
    let output = output.as_ref();
    let text = match text.trim() {
        "" => DEFAULT_TEXT,
        _ => text,
    };

    let mut doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let selection = match &options.pages {
        Some(pages) => require_pages(PageSelection::parse(pages, total_pages), "stamp")?,
        None => PageSelection::all(total_pages),
    };
    let style = TextStyle::new(options.size, options.margin, options.placement);
    info!(pages = %selection, text, "stamping pages");

    doc.draw_text_on_pages(&selection, &style, |_| text.to_string())?;
    PdfDocument::save(&mut doc.doc, output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count: total_pages,
        affected: selection.len(),
        message: format!(
            "Stamped {} page(s) into {}",
            selection.len(),
            output.display()
        ),
    })
}
