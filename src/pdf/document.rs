use anyhow::{anyhow, bail, Context, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

use crate::plan::{PagePlan, PageSize, PageSource, PlanStep, Rotation};

/// Page attributes that may live on an ancestor node of the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

const MAX_TREE_DEPTH: usize = 64;

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        debug!(path = %path_str, pages = doc.get_pages().len(), "opened document");
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    pub fn from_document(doc: Document) -> Self {
        PdfDocument {
            doc,
            path: String::from("<memory>"),
        }
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    pub fn page_id(&self, page: u32) -> Result<ObjectId> {
        let pages = self.doc.get_pages();
        pages
            .get(&page)
            .copied()
            .ok_or_else(|| anyhow!("Page {} is out of range (1-{})", page, pages.len()))
    }

    /// Sizes of every page, in page order.
    pub fn page_sizes(&self) -> Result<Vec<PageSize>> {
        (1..=self.page_count())
            .map(|page| self.page_size(page))
            .collect()
    }

    /// Get metadata from the document info dictionary
    pub fn get_info(&self) -> PdfInfo {
        let mut info = PdfInfo::default();

        let dict = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(info_ref)) => self.doc.get_dictionary(*info_ref).ok(),
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        };

        if let Some(dict) = dict {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
            info.creation_date = get_string_from_dict(dict, b"CreationDate");
            info.mod_date = get_string_from_dict(dict, b"ModDate");
            info.subject = get_string_from_dict(dict, b"Subject");
            info.keywords = get_string_from_dict(dict, b"Keywords");
        }

        info.page_count = self.page_count();
        info
    }

    /// Write the given fields into the document info dictionary, creating it if needed.
    pub fn set_info(&mut self, update: &InfoUpdate) -> Result<()> {
        let existing = self.doc.trailer.get(b"Info").ok().cloned();
        let info_id = match existing {
            Some(Object::Reference(id)) => id,
            Some(Object::Dictionary(dict)) => self.doc.add_object(dict),
            _ => self.doc.add_object(Dictionary::new()),
        };
        self.doc.trailer.set("Info", info_id);

        let info = self
            .doc
            .get_dictionary_mut(info_id)
            .context("Info entry does not point to a dictionary")?;

        if let Some(title) = &update.title {
            info.set("Title", encode_pdf_string(title));
        }
        if let Some(author) = &update.author {
            info.set("Author", encode_pdf_string(author));
        }
        if let Some(subject) = &update.subject {
            info.set("Subject", encode_pdf_string(subject));
        }
        if let Some(keywords) = &update.keywords {
            if !keywords.is_empty() {
                info.set("Keywords", encode_pdf_string(&keywords.join(", ")));
            }
        }

        Ok(())
    }

    /// Concatenate the pages of several documents into the first one.
    pub fn merge(docs: Vec<PdfDocument>) -> Result<Document> {
        let mut docs = docs.into_iter();
        let first = docs
            .next()
            .ok_or_else(|| anyhow!("No input files specified"))?;

        let mut merged = first.doc;
        let mut kids = flatten_page_tree(&mut merged)?;

        for other in docs {
            let mut doc = other.doc;
            flatten_page_tree(&mut doc)
                .with_context(|| format!("Failed to read page tree of {}", other.path))?;

            // Shift every object id past the ones already in use.
            doc.renumber_objects_with(merged.max_id + 1);
            let mut pages: Vec<_> = doc.get_pages().into_iter().collect();
            pages.sort_by_key(|(num, _)| *num);

            merged.objects.extend(doc.objects);
            merged.max_id = merged.objects.keys().map(|(num, _)| *num).max().unwrap_or(0);
            kids.extend(pages.into_iter().map(|(_, id)| id));
        }

        let root = pages_root(&merged)?;
        install_page_tree(&mut merged, root, &kids)?;
        merged.prune_objects();
        Ok(merged)
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        debug!(path = %path.as_ref().display(), "saved document");
        Ok(())
    }
}

impl PageSource for PdfDocument {
    type Output = Document;

    fn page_count(&self) -> u32 {
        PdfDocument::page_count(self)
    }

    fn page_size(&self, page: u32) -> Result<PageSize> {
        let page_id = self.page_id(page)?;
        let Some(media_box) = inherited_attribute(&self.doc, page_id, b"MediaBox") else {
            warn!(page, path = %self.path, "page has no MediaBox, assuming US Letter");
            return Ok(PageSize::LETTER);
        };

        let media_box = match media_box {
            Object::Reference(id) => self.doc.get_object(id)?.clone(),
            other => other,
        };
        let coords: Vec<f32> = media_box.as_array()?.iter().filter_map(as_number).collect();
        if coords.len() != 4 {
            bail!("Page {} has a malformed MediaBox", page);
        }

        Ok(PageSize {
            width: (coords[2] - coords[0]).abs(),
            height: (coords[3] - coords[1]).abs(),
        })
    }

    fn materialize(&self, plan: &PagePlan) -> Result<Document> {
        let total = self.page_count();
        if let Some(page) = plan.source_pages().find(|&p| p == 0 || p > total) {
            bail!("Page {} is out of range (1-{})", page, total);
        }

        let mut doc = self.doc.clone();
        let page_ids = flatten_page_tree(&mut doc)?;

        // Page dictionaries as they were before any step touched them.
        let mut originals = BTreeMap::new();
        for &id in &page_ids {
            originals.insert(id, doc.get_dictionary(id)?.clone());
        }

        let mut used = BTreeSet::new();
        let mut kids = Vec::with_capacity(plan.len());

        for step in plan.steps() {
            let id = match *step {
                PlanStep::Copy { page, rotation } => {
                    let source = page_ids[page as usize - 1];
                    let original = &originals[&source];

                    let id = if used.insert(source) {
                        source
                    } else {
                        doc.add_object(original.clone())
                    };

                    if rotation != Rotation::None {
                        let current = original
                            .get(b"Rotate")
                            .and_then(Object::as_i64)
                            .unwrap_or(0);
                        doc.get_dictionary_mut(id)?
                            .set("Rotate", rotation.apply_to(current));
                    }
                    id
                }
                PlanStep::Blank(size) => doc.add_object(blank_page(size)),
            };
            kids.push(id);
        }

        let root = pages_root(&doc)?;
        install_page_tree(&mut doc, root, &kids)?;
        let pruned = doc.prune_objects();

        debug!(
            steps = plan.len(),
            blanks = plan.blank_count(),
            pruned = pruned.len(),
            "materialized page plan"
        );
        Ok(doc)
    }
}

/// What `set_info` should change. `None` leaves a field untouched.
#[derive(Debug, Default, Clone)]
pub struct InfoUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl InfoUpdate {
    /// Split a comma-separated keyword list, dropping blank entries.
    pub fn parse_keywords(s: &str) -> Vec<String> {
        s.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Default, Clone)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub page_count: u32,
}

fn pages_root(doc: &Document) -> Result<ObjectId> {
    doc.catalog()?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .context("Document catalog has no page tree")
}

/// Look up a page attribute, walking up the page tree if the page itself lacks it.
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Copy inherited attributes onto every page so pages can be re-parented
/// freely. Returns the page ids in page order.
fn flatten_page_tree(doc: &mut Document) -> Result<Vec<ObjectId>> {
    let mut pages: Vec<_> = doc.get_pages().into_iter().collect();
    pages.sort_by_key(|(num, _)| *num);

    let mut ids = Vec::with_capacity(pages.len());
    for (_, page_id) in pages {
        let missing: Vec<(&[u8], Object)> = {
            let view: &Document = doc;
            let page = view.get_dictionary(page_id)?;
            INHERITABLE
                .iter()
                .filter(|key| !page.has(key))
                .filter_map(|key| inherited_attribute(view, page_id, key).map(|v| (*key, v)))
                .collect()
        };

        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in missing {
            page.set(key, value);
        }
        ids.push(page_id);
    }
    Ok(ids)
}

/// Make `kids` the only children of the root page tree node.
fn install_page_tree(doc: &mut Document, root: ObjectId, kids: &[ObjectId]) -> Result<()> {
    for &id in kids {
        doc.get_dictionary_mut(id)?.set("Parent", root);
    }

    let node = doc.get_dictionary_mut(root)?;
    // Pages carry their own copies now; blank pages must not pick these up.
    for key in INHERITABLE {
        node.remove(key);
    }
    node.set(
        "Kids",
        kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
    );
    node.set("Count", kids.len() as i64);
    Ok(())
}

fn blank_page(size: PageSize) -> Dictionary {
    dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            size.width.into(),
            size.height.into(),
        ],
        "Resources" => dictionary! {},
    }
}

pub(crate) fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => None,
    })
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    // Check for UTF-16 BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        // UTF-16 BE
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|chunk| {
                if chunk.len() == 2 {
                    Some(u16::from_be_bytes([chunk[0], chunk[1]]))
                } else {
                    None
                }
            })
            .collect();
        String::from_utf16(&u16_chars).ok()
    } else {
        // Try as Latin-1 / PDFDocEncoding (simplified)
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}

/// ASCII text is written as a literal string, anything else as UTF-16BE with a BOM.
fn encode_pdf_string(s: &str) -> Object {
    if s.is_ascii() {
        Object::string_literal(s)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend(s.encode_utf16().flat_map(u16::to_be_bytes));
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range::PageSelection;
    use crate::pdf::fixtures::{document_with_sizes, letter_document};
    use crate::plan;

    fn reload(mut doc: Document) -> PdfDocument {
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        PdfDocument::from_document(Document::load_mem(&buf).unwrap())
    }

    /// The "% page N" marker in a page's content stream.
    fn page_marker(doc: &PdfDocument, page: u32) -> String {
        let id = doc.page_id(page).unwrap();
        let content = doc.doc.get_page_content(id).unwrap();
        String::from_utf8_lossy(&content).trim().to_string()
    }

    fn rotate_of(doc: &PdfDocument, page: u32) -> i64 {
        let id = doc.page_id(page).unwrap();
        doc.doc
            .get_dictionary(id)
            .unwrap()
            .get(b"Rotate")
            .and_then(Object::as_i64)
            .unwrap_or(0)
    }

    #[test]
    fn test_page_size() {
        let doc = PdfDocument::from_document(document_with_sizes(&[(612, 792), (300, 400)]));
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_size(2).unwrap(), PageSize { width: 300.0, height: 400.0 });
        assert!(doc.page_size(3).is_err());
    }

    #[test]
    fn test_page_size_inherited_from_tree() {
        let mut raw = letter_document(1);
        let page_id = raw.get_pages()[&1];
        raw.get_dictionary_mut(page_id).unwrap().remove(b"MediaBox");
        let root = pages_root(&raw).unwrap();
        raw.get_dictionary_mut(root).unwrap().set(
            "MediaBox",
            vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(100),
                Object::Integer(50),
            ],
        );

        let doc = PdfDocument::from_document(raw);
        assert_eq!(doc.page_size(1).unwrap(), PageSize { width: 100.0, height: 50.0 });

        // The box moves onto the page when the tree is flattened.
        let out = reload(doc.materialize(&plan::PagePlan::identity(1)).unwrap());
        assert_eq!(out.page_size(1).unwrap(), PageSize { width: 100.0, height: 50.0 });
    }

    #[test]
    fn test_materialize_reorder_and_delete() {
        let doc = PdfDocument::from_document(letter_document(3));
        let out = reload(doc.materialize(&plan::reorder(&[3, 1])).unwrap());
        assert_eq!(out.page_count(), 2);
        assert_eq!(page_marker(&out, 1), "% page 3");
        assert_eq!(page_marker(&out, 2), "% page 1");

        let removed = plan::remove(3, &PageSelection::parse("2", 3)).unwrap();
        let out = reload(doc.materialize(&removed).unwrap());
        assert_eq!(out.page_count(), 2);
        assert_eq!(page_marker(&out, 2), "% page 3");
    }

    #[test]
    fn test_materialize_duplicates_are_distinct_pages() {
        let doc = PdfDocument::from_document(letter_document(2));
        let plan = plan::duplicate(2, &PageSelection::parse("1", 2));
        let out = reload(doc.materialize(&plan).unwrap());

        assert_eq!(out.page_count(), 3);
        let ids: BTreeSet<_> = out.doc.get_pages().into_values().collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(page_marker(&out, 3), "% page 1");
    }

    #[test]
    fn test_materialize_blank_pages() {
        let doc = PdfDocument::from_document(document_with_sizes(&[(612, 792), (300, 400)]));
        let sizes = doc.page_sizes().unwrap();
        let plan = plan::insert_blank(2, &PageSelection::parse("2", 2), |p| sizes[p as usize - 1]);
        let out = reload(doc.materialize(&plan).unwrap());

        assert_eq!(out.page_count(), 3);
        assert_eq!(out.page_size(3).unwrap(), PageSize { width: 300.0, height: 400.0 });
    }

    #[test]
    fn test_materialize_rotation_adds_to_existing() {
        let mut raw = letter_document(2);
        let first = raw.get_pages()[&1];
        raw.get_dictionary_mut(first)
            .unwrap()
            .set("Rotate", Object::Integer(90));

        let doc = PdfDocument::from_document(raw);
        let plan = plan::rotate(2, &PageSelection::all(2), Rotation::Down).unwrap();
        let out = reload(doc.materialize(&plan).unwrap());

        assert_eq!(rotate_of(&out, 1), 270);
        assert_eq!(rotate_of(&out, 2), 180);
    }

    #[test]
    fn test_materialize_rotated_duplicate_leaves_original_alone() {
        let doc = PdfDocument::from_document(letter_document(1));
        let plan = plan::PagePlan::new(vec![
            PlanStep::copy(1),
            PlanStep::Copy {
                page: 1,
                rotation: Rotation::Right,
            },
        ]);
        let out = reload(doc.materialize(&plan).unwrap());
        assert_eq!(rotate_of(&out, 1), 0);
        assert_eq!(rotate_of(&out, 2), 90);
    }

    #[test]
    fn test_materialize_out_of_range() {
        let doc = PdfDocument::from_document(letter_document(2));
        let err = doc.materialize(&plan::reorder(&[1, 3])).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_merge() {
        let docs = vec![
            PdfDocument::from_document(letter_document(2)),
            PdfDocument::from_document(document_with_sizes(&[(100, 100); 3])),
        ];
        let merged = reload(PdfDocument::merge(docs).unwrap());
        assert_eq!(merged.page_count(), 5);
        assert_eq!(page_marker(&merged, 3), "% page 1");
        assert_eq!(merged.page_size(5).unwrap(), PageSize { width: 100.0, height: 100.0 });
    }

    #[test]
    fn test_merge_nothing() {
        assert!(PdfDocument::merge(Vec::new()).is_err());
    }

    #[test]
    fn test_set_info_round_trip() {
        let mut doc = PdfDocument::from_document(letter_document(1));
        doc.set_info(&InfoUpdate {
            title: Some("Quarterly report".into()),
            author: Some("Zoë".into()),
            subject: None,
            keywords: Some(InfoUpdate::parse_keywords(" pdf, ,pages ")),
        })
        .unwrap();

        let info = reload(doc.doc).get_info();
        assert_eq!(info.title.as_deref(), Some("Quarterly report"));
        assert_eq!(info.author.as_deref(), Some("Zoë"));
        assert_eq!(info.subject, None);
        assert_eq!(info.keywords.as_deref(), Some("pdf, pages"));
        assert_eq!(info.page_count, 1);
    }

    #[test]
    fn test_set_info_keeps_untouched_fields() {
        let mut doc = PdfDocument::from_document(letter_document(1));
        doc.set_info(&InfoUpdate {
            subject: Some("first".into()),
            ..Default::default()
        })
        .unwrap();
        doc.set_info(&InfoUpdate {
            title: Some("second".into()),
            keywords: Some(Vec::new()),
            ..Default::default()
        })
        .unwrap();

        let info = doc.get_info();
        assert_eq!(info.subject.as_deref(), Some("first"));
        assert_eq!(info.title.as_deref(), Some("second"));
        assert_eq!(info.keywords, None);
    }
}
