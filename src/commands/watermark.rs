use crate::commands::{require_pages, Report};
use crate::page_range::PageSelection;
use crate::pdf::overlay::{
    encode_win_ansi, OverlayFont, Rgb, TextRun, WatermarkLayout, MIN_FONT_SIZE,
};
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub const DEFAULT_TEXT: &str = "CONFIDENTIAL";
pub const DEFAULT_COLOR: Rgb = Rgb(0.8, 0.1, 0.1);

pub struct WatermarkOptions {
    pub size: f32,
    /// Counter-clockwise, in degrees.
    pub angle: f32,
    pub layout: WatermarkLayout,
    /// `#rrggbb`; `DEFAULT_COLOR` if unset.
    pub color: Option<String>,
    /// Only watermark these pages.
    pub pages: Option<String>,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        WatermarkOptions {
            size: 48.0,
            angle: 0.0,
            layout: WatermarkLayout::Single,
            color: None,
            pages: None,
        }
    }
}

/// Draw `text` across the selected pages in bold Helvetica.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    text: &str,
    output: Q,
    options: &WatermarkOptions,
) -> Result<Report> {
    let output = output.as_ref();
    let text = match text.trim() {
        "" => DEFAULT_TEXT,
        _ => text,
    };
    let encoded = encode_win_ansi(text)?;
    let color = match &options.color {
        Some(hex) => Rgb::from_hex(hex)?,
        None => DEFAULT_COLOR,
    };
    let size = options.size.max(MIN_FONT_SIZE);
    let angle = options.angle.rem_euclid(360.0);

    let mut doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let selection = match &options.pages {
        Some(pages) => require_pages(PageSelection::parse(pages, total_pages), "watermark")?,
        None => PageSelection::all(total_pages),
    };
    info!(pages = %selection, text, angle, layout = ?options.layout, "watermarking pages");

    doc.overlay_pages(&selection, OverlayFont::HelveticaBold, |_, page_size| {
        Ok(options
            .layout
            .anchors(page_size)
            .into_iter()
            .map(|anchor| TextRun {
                text: encoded.clone(),
                origin: anchor,
                size,
                angle,
                color,
            })
            .collect())
    })?;
    PdfDocument::save(&mut doc.doc, output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count: total_pages,
        affected: selection.len(),
        message: format!(
            "Watermarked {} page(s) into {}",
            selection.len(),
            output.display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::fixture;

    fn text_runs(path: &Path, page: u32) -> usize {
        let doc = PdfDocument::open(path).unwrap();
        let id = doc.page_id(page).unwrap();
        let content = doc.doc.get_page_content(id).unwrap();
        String::from_utf8_lossy(&content).matches(" Tj").count()
    }

    #[test]
    fn test_single_watermark() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 2);
        let output = dir.path().join("out.pdf");

        let report = run(&input, "", &output, &WatermarkOptions::default()).unwrap();
        assert_eq!(report.affected, 2);
        assert_eq!(text_runs(&output, 1), 1);

        let doc = PdfDocument::open(&output).unwrap();
        let content = doc.doc.get_page_content(doc.page_id(2).unwrap()).unwrap();
        let content = String::from_utf8_lossy(&content);
        assert!(content.contains("(CONFIDENTIAL) Tj"));
        assert!(content.contains("/PgsHelvB "));
    }

    #[test]
    fn test_tiled_watermark_on_selected_pages() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        let output = dir.path().join("out.pdf");

        let options = WatermarkOptions {
            layout: WatermarkLayout::Tiled,
            angle: -45.0,
            color: Some("#0000ff".into()),
            pages: Some("2".into()),
            ..Default::default()
        };
        let report = run(&input, "DRAFT", &output, &options).unwrap();
        assert_eq!(report.affected, 1);
        assert_eq!(text_runs(&output, 1), 0);
        assert_eq!(text_runs(&output, 2), 9);
    }

    #[test]
    fn test_watermark_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 1);
        let output = dir.path().join("out.pdf");

        let bad_color = WatermarkOptions {
            color: Some("red".into()),
            ..Default::default()
        };
        assert!(run(&input, "DRAFT", &output, &bad_color).is_err());
        assert!(run(&input, "草稿", &output, &WatermarkOptions::default()).is_err());
        assert!(!output.exists());
    }
}
