use crate::commands::Report;
use crate::page_range::parse_page_groups;
use crate::pdf::PdfDocument;
use crate::plan::{self, PageSource};
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid name regex"));

pub const DEFAULT_PAD: usize = 2;

pub struct SplitOptions {
    /// Comma-separated groups, e.g. "1-3,5". `None` puts every page in its own file.
    pub ranges: Option<String>,
    /// File name prefix; defaults to the input file stem.
    pub base: Option<String>,
    /// Zero-padding width of the part number, clamped to 1..=4.
    pub pad: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            ranges: None,
            base: None,
            pad: DEFAULT_PAD,
        }
    }
}

/// Write one file per group of pages into `output_dir`.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    options: &SplitOptions,
) -> Result<Report> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    let doc = PdfDocument::open(input)?;
    let total_pages = doc.page_count();

    let groups = match &options.ranges {
        Some(ranges) => parse_page_groups(ranges, total_pages),
        None => (1..=total_pages).map(|page| vec![page]).collect(),
    };
    let plans = plan::split(&groups).context("Enter valid ranges (e.g. 1-3,5)")?;

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("part");
    let base = sanitize_base(options.base.as_deref().unwrap_or(stem));
    let pad = options.pad.clamp(1, 4);

    let mut outputs = Vec::with_capacity(plans.len());
    let mut page_count = 0;
    for (i, plan) in plans.iter().enumerate() {
        let output_path = output_dir.join(format!("{}-{:0pad$}.pdf", base, i + 1, pad = pad));
        info!(part = i + 1, parts = plans.len(), path = %output_path.display(), "writing part");

        let mut new_doc = doc.materialize(plan)?;
        PdfDocument::save(&mut new_doc, &output_path)?;

        page_count += plan.len() as u32;
        outputs.push(output_path.display().to_string());
    }

    Ok(Report {
        message: format!(
            "Split {} into {} file(s) in {}",
            input.display(),
            outputs.len(),
            output_dir.display()
        ),
        affected: outputs.len(),
        outputs,
        page_count,
    })
}

/// Replace every run of characters that are awkward in file names with `_`.
pub fn sanitize_base(base: &str) -> String {
    let base = base.trim();
    if base.is_empty() {
        return String::from("part");
    }
    UNSAFE_NAME_CHARS.replace_all(base, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{fixture, page_count};
    use crate::plan::PlanError;

    #[test]
    fn test_sanitize_base() {
        assert_eq!(sanitize_base("report"), "report");
        assert_eq!(sanitize_base(" my report (final) "), "my_report_final_");
        assert_eq!(sanitize_base("a/b\\c.v2"), "a_b_c.v2");
        assert_eq!(sanitize_base("   "), "part");
    }

    #[test]
    fn test_split_by_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "book.pdf", 5);
        let out_dir = dir.path().join("parts");

        let options = SplitOptions {
            ranges: Some("4-5,1-2,x".into()),
            ..Default::default()
        };
        let report = run(&input, &out_dir, &options).unwrap();

        assert_eq!(report.affected, 2);
        assert_eq!(report.page_count, 4);
        assert_eq!(page_count(&out_dir.join("book-01.pdf")), 2);
        assert_eq!(page_count(&out_dir.join("book-02.pdf")), 2);
    }

    #[test]
    fn test_split_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);

        let options = SplitOptions {
            base: Some("chapter one".into()),
            pad: 9,
            ..Default::default()
        };
        run(&input, dir.path(), &options).unwrap();

        for part in 1..=3 {
            let path = dir.path().join(format!("chapter_one-{:04}.pdf", part));
            assert_eq!(page_count(&path), 1);
        }
    }

    #[test]
    fn test_split_without_valid_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);
        let options = SplitOptions {
            ranges: Some("7-9,abc".into()),
            ..Default::default()
        };

        let err = run(&input, dir.path().join("parts"), &options).unwrap_err();
        assert_eq!(
            err.root_cause().downcast_ref::<PlanError>(),
            Some(&PlanError::NoValidRanges)
        );
        assert!(!dir.path().join("parts").exists());
    }
}
