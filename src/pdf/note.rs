//! New documents made from plain text, set in Helvetica on A4 pages.

use anyhow::{bail, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::pdf::overlay::{add_font, encode_win_ansi, text_width, OverlayFont, TextRun};
use crate::plan::PageSize;

pub const A4: PageSize = PageSize {
    width: 595.28,
    height: 841.89,
};

const LINE_HEIGHT: f32 = 1.4;
/// Vertical space taken by an empty input line, relative to the font size.
const BLANK_LINE: f32 = 0.6;

#[derive(Debug, Clone, Copy)]
pub struct NoteStyle {
    pub size: f32,
    pub margin: f32,
}

impl NoteStyle {
    pub fn new(size: f32, margin: f32) -> Self {
        NoteStyle {
            size: size.clamp(6.0, 48.0),
            margin: margin.clamp(0.0, A4.width / 4.0),
        }
    }
}

impl Default for NoteStyle {
    fn default() -> Self {
        NoteStyle::new(12.0, 40.0)
    }
}

/// Greedily fill lines no wider than `max_width`. A word that is wider than a
/// whole line gets a line of its own.
pub fn wrap_words(text: &str, size: f32, max_width: f32) -> Result<Vec<Vec<u8>>> {
    let mut lines = Vec::new();
    let mut line: Vec<u8> = Vec::new();
    for word in text.split_whitespace() {
        let word = encode_win_ansi(word)?;
        let mut candidate = line.clone();
        if !candidate.is_empty() {
            candidate.push(b' ');
        }
        candidate.extend_from_slice(&word);

        if !line.is_empty() && text_width(&candidate, size) > max_width {
            lines.push(std::mem::replace(&mut line, word));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

/// Runs per page, filled top to bottom.
struct Pages {
    pages: Vec<Vec<TextRun>>,
    y: f32,
    style: NoteStyle,
}

impl Pages {
    fn new(style: NoteStyle) -> Self {
        Pages {
            pages: vec![Vec::new()],
            y: A4.height - style.margin,
            style,
        }
    }

    fn push(&mut self, text: Vec<u8>, size: f32, advance: f32) {
        if self.y < self.style.margin {
            self.pages.push(Vec::new());
            self.y = A4.height - self.style.margin;
        }
        let run = TextRun::new(text, (self.style.margin, self.y), size);
        if let Some(page) = self.pages.last_mut() {
            page.push(run);
        }
        self.y -= advance;
    }

    fn skip(&mut self, advance: f32) {
        self.y -= advance;
    }
}

/// Lay `text` out on as many A4 pages as it needs, with an optional title.
pub fn build_note(title: Option<&str>, text: &str, style: NoteStyle) -> Result<Document> {
    if text.trim().is_empty() {
        bail!("Nothing to write: the text is empty");
    }

    let max_width = A4.width - style.margin * 2.0;
    let mut pages = Pages::new(style);

    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        let title_size = style.size + 4.0;
        for line in wrap_words(title, title_size, max_width)? {
            pages.push(line, title_size, style.size + 12.0);
        }
    }

    for paragraph in text.lines() {
        let lines = wrap_words(paragraph, style.size, max_width)?;
        if lines.is_empty() {
            pages.skip(style.size * BLANK_LINE);
        }
        for line in lines {
            pages.push(line, style.size, style.size * LINE_HEIGHT);
        }
    }

    assemble(pages.pages)
}

fn assemble(pages: Vec<Vec<TextRun>>) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font = OverlayFont::Helvetica;
    let font_id = add_font(&mut doc, font);

    let mut kids = Vec::with_capacity(pages.len());
    for runs in pages {
        let content: Content<Vec<Operation>> = Content {
            operations: runs.iter().flat_map(|run| run.operations(font)).collect(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                A4.width.into(),
                A4.height.into(),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { font.resource_name() => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_texts(lines: &[Vec<u8>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| String::from_utf8_lossy(l).to_string())
            .collect()
    }

    #[test]
    fn test_wrap_words() {
        // "aaaa" is 4 * 556 = 2224 units, 22.24pt at size 10.
        let lines = wrap_words("aaaa aaaa  aaaa", 10.0, 50.0).unwrap();
        assert_eq!(line_texts(&lines), vec!["aaaa aaaa", "aaaa"]);

        let lines = wrap_words("a verylongwordthatoverflows b", 10.0, 30.0).unwrap();
        assert_eq!(
            line_texts(&lines),
            vec!["a", "verylongwordthatoverflows", "b"]
        );

        assert!(wrap_words("   ", 10.0, 30.0).unwrap().is_empty());
    }

    #[test]
    fn test_note_single_page() {
        let doc = build_note(Some("Groceries"), "milk\n\neggs", NoteStyle::default()).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let content = String::from_utf8_lossy(&doc.get_page_content(pages[&1]).unwrap()).to_string();
        assert!(content.contains("(Groceries) Tj"));
        assert!(content.contains("(milk) Tj"));
        assert!(content.contains("(eggs) Tj"));
    }

    #[test]
    fn test_note_flows_onto_more_pages() {
        let text = (1..=120)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let doc = build_note(None, &text, NoteStyle::default()).unwrap();
        let pages = doc.get_pages();
        assert!(pages.len() >= 2);

        let last = String::from_utf8_lossy(&doc.get_page_content(pages[&(pages.len() as u32)]).unwrap())
            .to_string();
        assert!(last.contains("(line 120) Tj"));
    }

    #[test]
    fn test_empty_note_is_an_error() {
        assert!(build_note(Some("Title"), " \n ", NoteStyle::default()).is_err());
    }
}
