//! PDF text and glyph extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, warn};

use super::glyphs::page_glyphs;
use super::{GlyphSample, PdfProcessor, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Number of pages in the document.
    pub page_count: u32,
    /// Text of all pages that yielded any.
    pub text: String,
    /// Glyph samples across all pages.
    pub glyphs: Vec<GlyphSample>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Extract text and, if requested, glyph samples in one pass.
    pub fn extract_all(&self, collect_glyphs: bool) -> Result<PdfContent> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let text = self.extract_text()?;
        let glyphs = if collect_glyphs {
            self.extract_glyphs()?
        } else {
            Vec::new()
        };

        debug!(
            "PDF extraction: {} pages, {} chars text, {} glyphs",
            page_count,
            text.len(),
            glyphs.len()
        );

        Ok(PdfContent {
            page_count,
            text,
            glyphs,
        })
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        let pages = self.extract_page_texts()?;
        let mut text = String::new();
        for page in pages.iter().filter(|p| !p.trim().is_empty()) {
            text.push_str(page);
        }
        Ok(text)
    }

    fn extract_page_texts(&self) -> Result<Vec<String>> {
        self.document()?;

        // pdf-extract panics on some malformed font dictionaries.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
        }));

        match result {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => {
                warn!("Text extraction panicked on a malformed PDF");
                Err(PdfError::TextExtraction(
                    "text extraction panicked (malformed PDF)".to_string(),
                ))
            }
        }
    }

    fn extract_glyphs(&self) -> Result<Vec<GlyphSample>> {
        let doc = self.document()?;

        let mut glyphs = Vec::new();
        for (page, page_id) in doc.get_pages() {
            glyphs.extend(page_glyphs(doc, page, page_id)?);
        }
        Ok(glyphs)
    }
}
