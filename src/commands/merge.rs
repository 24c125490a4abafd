use crate::commands::Report;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Concatenate the pages of all inputs, in order.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(inputs: &[P], output: Q) -> Result<Report> {
    let output = output.as_ref();
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    if inputs.len() == 1 {
        // Just copy the single file
        std::fs::copy(&inputs[0], output).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                inputs[0].as_ref().display(),
                output.display()
            )
        })?;
        let page_count = PdfDocument::open(output)?.page_count();
        return Ok(Report {
            outputs: vec![output.display().to_string()],
            page_count,
            affected: 1,
            message: format!("Copied 1 file to {}", output.display()),
        });
    }

    let docs = inputs
        .iter()
        .map(PdfDocument::open)
        .collect::<Result<Vec<_>>>()?;
    info!(files = docs.len(), "merging documents");

    let mut merged = PdfDocument::merge(docs)?;
    let page_count = merged.get_pages().len() as u32;
    PdfDocument::save(&mut merged, output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count,
        affected: inputs.len(),
        message: format!(
            "Merged {} files ({} pages) into {}",
            inputs.len(),
            page_count,
            output.display()
        ),
    })
}
