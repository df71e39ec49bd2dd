//! PDF processing module.

mod extractor;
mod glyphs;

pub use extractor::{PdfContent, PdfExtractor};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF, skipping pages without text.
    fn extract_text(&self) -> Result<String>;

    /// Extract text page by page.
    fn extract_page_texts(&self) -> Result<Vec<String>>;

    /// Sample one (font, size) pair per rendered glyph across all pages.
    fn extract_glyphs(&self) -> Result<Vec<GlyphSample>>;
}

/// One rendered character: the font it was drawn with and its size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphSample {
    /// Font name as declared by the font resource (`BaseFont`).
    pub font: String,
    /// Effective size in points.
    pub size: f32,
}

/// Distinct fonts and sizes of a document, each comma-joined in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontProfile {
    pub names: String,
    pub sizes: String,
}

impl FontProfile {
    pub fn from_glyphs(glyphs: &[GlyphSample]) -> Self {
        let names: BTreeSet<&str> = glyphs.iter().map(|g| g.font.as_str()).collect();
        // Sizes are compared at 1/100 pt so float noise doesn't split them.
        let sizes: BTreeSet<i64> = glyphs
            .iter()
            .map(|g| (f64::from(g.size) * 100.0).round() as i64)
            .collect();

        Self {
            names: names.into_iter().collect::<Vec<_>>().join(", "),
            sizes: sizes
                .into_iter()
                .map(format_size)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn format_size(hundredths: i64) -> String {
    if hundredths % 100 == 0 {
        format!("{}.0", hundredths / 100)
    } else {
        let s = format!("{:.2}", hundredths as f64 / 100.0);
        s.trim_end_matches('0').to_string()
    }
}

/// Build a one-page PDF drawing each line with the given base font.
#[cfg(test)]
pub(crate) fn build_test_pdf(base_font: &str, size: i64, lines: &[&str]) -> Vec<u8> {
    use lopdf::dictionary;

    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
    };
    build_test_pdf_with_font(font, size, lines)
}

/// Build a one-page PDF drawing each line with `font` as resource `F1`.
#[cfg(test)]
pub(crate) fn build_test_pdf_with_font(font: lopdf::Dictionary, size: i64, lines: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(font);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let y = 780 - (i as i64) * 20;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
        operations.push(Operation::new("Td", vec![50.into(), y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn glyph(font: &str, size: f32) -> GlyphSample {
        GlyphSample {
            font: font.to_string(),
            size,
        }
    }

    #[test]
    fn test_font_profile_distinct_sorted() {
        let glyphs = vec![
            glyph("Helvetica", 12.0),
            glyph("Courier", 10.5),
            glyph("Helvetica", 12.0),
            glyph("Courier", 12.000001),
        ];
        let profile = FontProfile::from_glyphs(&glyphs);
        assert_eq!(profile.names, "Courier, Helvetica");
        assert_eq!(profile.sizes, "10.5, 12.0");
    }

    #[test]
    fn test_font_profile_empty() {
        assert_eq!(FontProfile::from_glyphs(&[]), FontProfile::default());
    }
}
