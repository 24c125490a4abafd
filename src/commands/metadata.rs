use crate::commands::Report;
use crate::pdf::{InfoUpdate, PdfDocument};
use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

/// Update the document info dictionary. Fields left as `None` keep their value.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    update: &InfoUpdate,
    output: Q,
) -> Result<Report> {
    let output = output.as_ref();
    let changed = [
        update.title.is_some(),
        update.author.is_some(),
        update.subject.is_some(),
        update.keywords.as_ref().is_some_and(|k| !k.is_empty()),
    ]
    .into_iter()
    .filter(|set| *set)
    .count();
    if changed == 0 {
        bail!("Nothing to change: pass --title, --author, --subject or --keywords");
    }

    let mut doc = PdfDocument::open(&input)?;
    doc.set_info(update)?;
    info!(fields = changed, "updating metadata");
    PdfDocument::save(&mut doc.doc, output)?;

    Ok(Report {
        outputs: vec![output.display().to_string()],
        page_count: doc.page_count(),
        affected: changed,
        message: format!("Updated {} field(s) in {}", changed, output.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::fixture;

    #[test]
    fn test_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 1);
        let output = dir.path().join("out.pdf");

        let update = InfoUpdate {
            title: Some("Minutes".into()),
            keywords: Some(InfoUpdate::parse_keywords("board, 2026")),
            ..Default::default()
        };
        let report = run(&input, &update, &output).unwrap();
        assert_eq!(report.affected, 2);

        let info = PdfDocument::open(&output).unwrap().get_info();
        assert_eq!(info.title.as_deref(), Some("Minutes"));
        assert_eq!(info.keywords.as_deref(), Some("board, 2026"));
    }

    #[test]
    fn test_metadata_nothing_to_change() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 1);
        let update = InfoUpdate {
            keywords: Some(Vec::new()),
            ..Default::default()
        };
        assert!(run(&input, &update, dir.path().join("out.pdf")).is_err());
    }
}
