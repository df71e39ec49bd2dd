//! Record aggregation: one row per document, in input order.

mod items;

pub use items::{item_keys, parse_item_row};

use tracing::debug;

use crate::error::{AggregationError, DocumentError};
use crate::invoice::{ExtractionResult, FieldParser, InvoiceParser};
use crate::models::record::InvoiceRecord;
use crate::pdf::{FontProfile, GlyphSample, PdfExtractor, PdfProcessor};

/// One source document after text and glyph extraction.
#[derive(Debug, Clone)]
pub struct Document {
    /// Identifier of the document (usually its path).
    pub source: String,
    /// Concatenated text of all pages.
    pub text: String,
    /// Glyph samples across all pages.
    pub glyphs: Vec<GlyphSample>,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>, glyphs: Vec<GlyphSample>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            glyphs,
        }
    }

    /// Read a PDF from memory. Any container or content failure makes the
    /// document unreadable.
    pub fn from_pdf(
        source: impl Into<String>,
        data: &[u8],
        collect_glyphs: bool,
    ) -> Result<Self, DocumentError> {
        let source = source.into();
        let mut extractor = PdfExtractor::new();

        let content = extractor
            .load(data)
            .and_then(|_| extractor.extract_all(collect_glyphs))
            .map_err(|e| DocumentError::new(source.clone(), e))?;

        Ok(Self::new(source, content.text, content.glyphs))
    }

    /// Distinct fonts and sizes used in this document.
    pub fn font_profile(&self) -> FontProfile {
        FontProfile::from_glyphs(&self.glyphs)
    }
}

/// Ordered, append-only table of invoice records.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<InvoiceRecord>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, record: InvoiceRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[InvoiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InvoiceRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<InvoiceRecord> {
        self.records
    }
}

/// Builds records from documents and collects them into a [`RecordTable`].
pub struct Aggregator<P = FieldParser> {
    parser: P,
}

impl Aggregator {
    /// Create an aggregator using the default field parser.
    pub fn new() -> Self {
        Self::with_parser(FieldParser::new())
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: InvoiceParser> Aggregator<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    /// Extract one document's record, with its font profile and item keys.
    pub fn build_record(&self, document: &Document) -> ExtractionResult {
        let mut result = self.parser.parse(&document.source, &document.text);

        let profile = document.font_profile();
        let record = &mut result.record;
        record.font_style = profile.names;
        record.font_sizes = profile.sizes;
        record.items_qty_rate = item_keys(&record.line_items);

        debug!(
            "{}: font style {:?}, {} item keys",
            document.source,
            record.font_style,
            record.items_qty_rate.len()
        );

        result
    }

    /// Build the batch table, one row per document in input order.
    pub fn aggregate<'a, I>(&self, documents: I) -> Result<RecordTable, AggregationError>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut table = RecordTable::new();
        for document in documents {
            table.push(self.build_record(document).record);
        }

        if table.is_empty() {
            return Err(AggregationError::EmptyBatch);
        }
        Ok(table)
    }
}
