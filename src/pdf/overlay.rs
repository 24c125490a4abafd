//! Text drawn on top of existing pages: page numbers, stamps and watermarks.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::page_range::PageSelection;
use crate::pdf::document::inherited_attribute;
use crate::pdf::PdfDocument;
use crate::plan::{PageSize, PageSource};

/// Smallest font size we draw with.
pub const MIN_FONT_SIZE: f32 = 6.0;

/// The standard Type1 fonts overlays are drawn with. Neither is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayFont {
    Helvetica,
    HelveticaBold,
}

impl OverlayFont {
    /// Name the font is registered under in each page's resources.
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            OverlayFont::Helvetica => "PgsHelv",
            OverlayFont::HelveticaBold => "PgsHelvB",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            OverlayFont::Helvetica => "Helvetica",
            OverlayFont::HelveticaBold => "Helvetica-Bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    /// Parse `#rrggbb` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            bail!("Invalid colour {:?}, expected #rrggbb", hex);
        }
        let channel = |i: usize| -> Result<f32> {
            let value = u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("Invalid colour {:?}, expected #rrggbb", hex))?;
            Ok(f32::from(value) / 255.0)
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Placement {
    #[value(name = "tl")]
    TopLeft,
    #[value(name = "tc")]
    TopCenter,
    #[value(name = "tr")]
    TopRight,
    #[value(name = "bl")]
    BottomLeft,
    #[value(name = "bc")]
    BottomCenter,
    #[value(name = "br")]
    BottomRight,
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub margin: f32,
    pub placement: Placement,
}

impl TextStyle {
    pub fn new(size: f32, margin: f32, placement: Placement) -> Self {
        TextStyle {
            size: size.max(MIN_FONT_SIZE),
            margin: margin.max(0.0),
            placement,
        }
    }

    /// Baseline origin of the encoded `text` on a page of the given size.
    pub fn origin(&self, page: PageSize, text: &[u8]) -> (f32, f32) {
        let width = text_width(text, self.size);
        let top = page.height - self.margin;
        let bottom = self.margin;
        let left = self.margin;
        let center = (page.width - width) / 2.0;
        let right = page.width - self.margin - width;

        match self.placement {
            Placement::TopLeft => (left, top),
            Placement::TopCenter => (center, top),
            Placement::TopRight => (right, top),
            Placement::BottomLeft => (left, bottom),
            Placement::BottomCenter => (center, bottom),
            Placement::BottomRight => (right, bottom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WatermarkLayout {
    /// Once, anchored at the page centre.
    Single,
    /// A 3x3 grid over the whole page.
    Tiled,
}

impl WatermarkLayout {
    /// Anchor points of the watermark text on a page of the given size.
    pub fn anchors(self, page: PageSize) -> Vec<(f32, f32)> {
        match self {
            WatermarkLayout::Single => vec![(page.width / 2.0, page.height / 2.0)],
            WatermarkLayout::Tiled => {
                let (step_x, step_y) = (page.width / 3.0, page.height / 3.0);
                let mut anchors = Vec::with_capacity(9);
                for col in 0..3 {
                    for row in 0..3 {
                        anchors.push((
                            step_x / 2.0 + step_x * col as f32,
                            step_y / 2.0 + step_y * row as f32,
                        ));
                    }
                }
                anchors
            }
        }
    }
}

/// One line of text to draw. `text` is already WinAnsi-encoded.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: Vec<u8>,
    pub origin: (f32, f32),
    pub size: f32,
    /// Counter-clockwise rotation around `origin`, in degrees.
    pub angle: f32,
    pub color: Rgb,
}

impl TextRun {
    pub fn new(text: Vec<u8>, origin: (f32, f32), size: f32) -> Self {
        TextRun {
            text,
            origin,
            size,
            angle: 0.0,
            color: Rgb::BLACK,
        }
    }

    pub(crate) fn operations(&self, font: OverlayFont) -> Vec<Operation> {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        // Keep right angles exact in the written matrix.
        let snap = |v: f32| if v.abs() < 1e-6 { 0.0 } else { v };
        let (sin, cos) = (snap(sin), snap(cos));
        let Rgb(r, g, b) = self.color;
        vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.resource_name().into()), self.size.into()],
            ),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new(
                "Tm",
                vec![
                    cos.into(),
                    sin.into(),
                    (-sin).into(),
                    cos.into(),
                    self.origin.0.into(),
                    self.origin.1.into(),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(self.text.clone(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]
    }
}

/// Encode `text` for a standard font with `/WinAnsiEncoding`.
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| match win_ansi_byte(c) {
            Some(byte) => Ok(byte),
            None => bail!(
                "Character {:?} cannot be drawn with the standard Helvetica font",
                c
            ),
        })
        .collect()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Width of WinAnsi-encoded `text` set in Helvetica at `size` points.
pub fn text_width(text: &[u8], size: f32) -> f32 {
    let units: u32 = text.iter().map(|&b| helvetica_advance(b)).sum();
    units as f32 * size / 1000.0
}

/// Glyph advance in 1/1000 em, from the Helvetica AFM.
fn helvetica_advance(byte: u8) -> u32 {
    match byte {
        b' ' | b'!' | b',' | b'.' | b'/' | b':' | b';' | b'[' | b'\\' | b']' | b'I' | b'f'
        | b't' => 278,
        b'i' | b'j' | b'l' => 222,
        b'"' => 355,
        b'\'' => 191,
        b'(' | b')' | b'-' | b'`' | b'r' => 333,
        b'*' => 389,
        b'+' | b'<' | b'=' | b'>' | b'~' => 584,
        b'%' => 889,
        b'&' | b'A' | b'B' | b'E' | b'K' | b'P' | b'S' | b'V' | b'X' | b'Y' => 667,
        b'@' => 1015,
        b'C' | b'D' | b'H' | b'N' | b'R' | b'U' | b'w' => 722,
        b'F' | b'T' | b'Z' => 611,
        b'G' | b'O' | b'Q' => 778,
        b'J' | b'c' | b'k' | b's' | b'v' | b'x' | b'y' | b'z' => 500,
        b'M' | b'm' => 833,
        b'W' => 944,
        b'^' => 469,
        b'{' | b'}' => 334,
        b'|' => 260,
        // WinAnsi upper half
        0x85 | 0x89 | 0x8C | 0x97 | 0x99 | 0xC6 => 1000,
        0x91 | 0x92 | 0x82 => 222,
        0x93 | 0x94 | 0x84 | 0x8B | 0x9B => 333,
        0x95 => 350,
        0x9C => 944,
        0xA9 | 0xAE => 737,
        0xC0..=0xC5 | 0xC8..=0xCB | 0xDD | 0x8A => 667,
        0xC7 | 0xD1 | 0xD9..=0xDC => 722,
        0xCC..=0xCF | 0xEC..=0xEF => 278,
        0xD2..=0xD6 | 0xD8 => 778,
        0xDF | 0xF8 => 611,
        0xE6 => 889,
        0xE7 | 0xFD | 0xFF | 0x9A | 0x9E => 500,
        _ => 556,
    }
}

/// Add a standard font to the document and return its id.
pub fn add_font(doc: &mut Document, font: OverlayFont) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Draw `runs` on a page in `font`, registered as `font_id`.
///
/// The page's existing content is wrapped in `q`/`Q` so any graphics state it
/// leaves behind does not leak into the overlay.
pub fn draw_runs(
    doc: &mut Document,
    page_id: ObjectId,
    font: OverlayFont,
    font_id: ObjectId,
    runs: &[TextRun],
) -> Result<()> {
    register_font(doc, page_id, font, font_id)?;

    let mut operations = vec![Operation::new("q", vec![])];
    operations.extend(runs.iter().flat_map(|run| run.operations(font)));
    operations.push(Operation::new("Q", vec![]));

    let overlay = Content { operations };
    let overlay_id = doc.add_object(Stream::new(dictionary! {}, overlay.encode()?));
    let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));

    let page = doc.get_dictionary_mut(page_id)?;
    let existing = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 3);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(restore_id));
    contents.push(Object::Reference(overlay_id));
    page.set("Contents", contents);
    Ok(())
}

impl PdfDocument {
    /// Draw `label(page)` on each selected page, placed according to `style`.
    pub fn draw_text_on_pages<F>(
        &mut self,
        selection: &PageSelection,
        style: &TextStyle,
        mut label: F,
    ) -> Result<()>
    where
        F: FnMut(u32) -> String,
    {
        self.overlay_pages(selection, OverlayFont::Helvetica, |page, size| {
            let text = encode_win_ansi(&label(page))?;
            let origin = style.origin(size, &text);
            Ok(vec![TextRun::new(text, origin, style.size)])
        })
    }

    /// Draw the runs produced by `runs(page, size)` on each selected page.
    pub fn overlay_pages<F>(
        &mut self,
        selection: &PageSelection,
        font: OverlayFont,
        mut runs: F,
    ) -> Result<()>
    where
        F: FnMut(u32, PageSize) -> Result<Vec<TextRun>>,
    {
        let font_id = add_font(&mut self.doc, font);
        for page in selection.iter() {
            let page_id = self.page_id(page)?;
            let page_runs = runs(page, self.page_size(page)?)?;
            draw_runs(&mut self.doc, page_id, font, font_id, &page_runs)?;
        }
        Ok(())
    }
}

/// Make `font_id` available under the font's resource name on the page.
/// The page gets its own copy of its (possibly inherited) resources.
fn register_font(
    doc: &mut Document,
    page_id: ObjectId,
    font: OverlayFont,
    font_id: ObjectId,
) -> Result<()> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Reference(id)) => doc
            .get_dictionary(id)
            .context("Page resources do not point to a dictionary")?
            .clone(),
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id)?.clone(),
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    fonts.set(font.resource_name(), font_id);
    resources.set("Font", fonts);

    doc.get_dictionary_mut(page_id)?.set("Resources", resources);
    Ok(())
}
