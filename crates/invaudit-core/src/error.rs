//! Error types for the invaudit-core library.

use thiserror::Error;

/// Main error type for the invaudit library.
#[derive(Error, Debug)]
pub enum AuditError {
    /// A document could not be read.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// PDF processing error without a known source.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// The batch table could not be assembled.
    #[error("aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing. Any of these makes a document unreadable.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF container.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to decode a page content stream.
    #[error("failed to read content of page {page}: {reason}")]
    Content { page: u32, reason: String },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The input could not be read from disk.
    #[error("failed to read document: {0}")]
    Read(#[source] std::io::Error),

    /// The input exceeds the configured size limit.
    #[error("document is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
}

/// An unreadable document, tagged with where it came from.
#[derive(Error, Debug)]
#[error("unreadable document {source_id}: {error}")]
pub struct DocumentError {
    /// Identifier of the offending document (usually its path).
    pub source_id: String,
    /// Underlying PDF failure.
    pub error: PdfError,
}

impl DocumentError {
    pub fn new(source_id: impl Into<String>, error: PdfError) -> Self {
        Self {
            source_id: source_id.into(),
            error,
        }
    }
}

/// Errors raised while assembling the batch table.
#[derive(Error, Debug)]
pub enum AggregationError {
    /// No document in the batch produced a record.
    #[error("batch contains no readable documents")]
    EmptyBatch,

    /// A row does not have the same width as the table header.
    #[error("row {row} has {found} columns, expected {expected}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Result type for the invaudit library.
pub type Result<T> = std::result::Result<T, AuditError>;
