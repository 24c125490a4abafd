pub mod document;
pub mod note;
pub mod overlay;

pub use document::{InfoUpdate, PdfDocument};
