use crate::pdf::PdfDocument;
use crate::plan::PageSource;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub path: String,
    pub page_count: u32,
    /// Distinct page sizes in points, in order of first appearance.
    pub page_sizes: Vec<(f32, f32)>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
}

pub fn run<P: AsRef<Path>>(path: P) -> Result<InfoReport> {
    let doc = PdfDocument::open(&path)?;
    let info = doc.get_info();

    let mut page_sizes: Vec<(f32, f32)> = Vec::new();
    for page in 1..=info.page_count {
        let size = match doc.page_size(page) {
            Ok(size) => (size.width, size.height),
            Err(e) => {
                warn!(page, "skipping page size: {:#}", e);
                continue;
            }
        };
        if !page_sizes.contains(&size) {
            page_sizes.push(size);
        }
    }

    Ok(InfoReport {
        path: path.as_ref().display().to_string(),
        page_count: info.page_count,
        page_sizes,
        title: info.title,
        author: info.author,
        subject: info.subject,
        keywords: info.keywords,
        creator: info.creator,
        producer: info.producer,
        creation_date: info.creation_date,
        mod_date: info.mod_date,
    })
}

impl fmt::Display for InfoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.path)?;
        write!(f, "Pages: {}", self.page_count)?;

        for (width, height) in &self.page_sizes {
            write!(f, "\nPage size: {} x {} pt", width, height)?;
        }

        let fields = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Keywords", &self.keywords),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                write!(f, "\n{}: {}", label, value)?;
            }
        }

        if let Some(creation_date) = &self.creation_date {
            write!(f, "\nCreated: {}", format_pdf_date(creation_date))?;
        }
        if let Some(mod_date) = &self.mod_date {
            write!(f, "\nModified: {}", format_pdf_date(mod_date))?;
        }
        Ok(())
    }
}

fn format_pdf_date(date: &str) -> String {
    // PDF date format: D:YYYYMMDDHHmmSSOHH'mm
    let Some(d) = date.strip_prefix("D:") else {
        return date.to_string();
    };
    if d.len() < 8 || !d.is_ascii() {
        return date.to_string();
    }

    let time = if d.len() >= 14 {
        format!(" {}:{}:{}", &d[8..10], &d[10..12], &d[12..14])
    } else {
        String::new()
    };
    format!("{}-{}-{}{}", &d[0..4], &d[4..6], &d[6..8], time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::fixture;

    #[test]
    fn test_format_pdf_date() {
        assert_eq!(format_pdf_date("D:20261019"), "2026-10-19");
        assert_eq!(
            format_pdf_date("D:20261019083000+02'00"),
            "2026-10-19 08:30:00"
        );
        assert_eq!(format_pdf_date("yesterday"), "yesterday");
        assert_eq!(format_pdf_date("D:2026"), "D:2026");
    }

    #[test]
    fn test_info_skips_malformed_media_box() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = crate::pdf::fixtures::document_with_sizes(&[(612, 792), (300, 400)]);
        let page_id = doc.get_pages()[&1];
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("MediaBox", vec![lopdf::Object::Integer(0)]);
        let input = dir.path().join("in.pdf");
        doc.save(&input).unwrap();

        let report = run(&input).unwrap();
        assert_eq!(report.page_count, 2);
        assert_eq!(report.page_sizes, vec![(300.0, 400.0)]);
    }

    #[test]
    fn test_info() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.pdf", 3);

        let report = run(&input).unwrap();
        assert_eq!(report.page_count, 3);
        assert_eq!(report.page_sizes, vec![(612.0, 792.0)]);
        assert!(report.to_string().contains("Pages: 3"));
    }
}
