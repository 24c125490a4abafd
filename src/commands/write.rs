use crate::commands::Report;
use crate::pdf::note::{build_note, NoteStyle};
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Typeset plain text from `input` (`-` for stdin) into a new PDF.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    title: Option<&str>,
    output: Q,
    style: NoteStyle,
) -> Result<Report> {
    let input = input.as_ref();
    let output = output.as_ref();

    let text = if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read text from stdin")?;
        text
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read text file: {}", input.display()))?
    };

    write_text(&text, title, output, style)
}

/// Typeset `text` into a new PDF at `output`.
pub fn write_text(text: &str, title: Option<&str>, output: &Path, style: NoteStyle) -> Result<Report> {
    let mut doc = build_note(title, text, style)?;
    let page_count = doc.get_pages().len() as u32;
    info!(pages = page_count, size = style.size, "writing note");
    PdfDocument::save(&mut doc, output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count,
        affected: page_count as usize,
        message: format!("Wrote {} page(s) to {}", page_count, output.display()),
    })
}
