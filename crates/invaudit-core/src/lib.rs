//! Core library for invoice batch auditing.
//!
//! This crate provides:
//! - PDF processing (text extraction and glyph/font sampling)
//! - Pattern-based invoice field extraction (vendor, customer, line items, totals)
//! - Aggregation of per-document records into one ordered table
//! - Reconciliation of the table into rate, font and phone drift issues

pub mod error;
pub mod models;
pub mod pdf;
pub mod invoice;
pub mod aggregate;
pub mod reconcile;
pub mod table;
pub mod pipeline;

pub use error::{AggregationError, AuditError, DocumentError, PdfError, Result};
pub use models::config::AuditConfig;
pub use models::issue::{IssueId, IssueKind, IssueRecord};
pub use models::record::{InvoiceRecord, ItemKey, LineItem, NOT_FOUND};
pub use pdf::{FontProfile, GlyphSample, PdfContent, PdfExtractor, PdfProcessor};
pub use invoice::{ExtractionResult, FieldParser, InvoiceParser};
pub use aggregate::{Aggregator, Document, RecordTable};
pub use reconcile::{Detector, IssueCounter, Reconciler};
pub use table::Table;
pub use pipeline::{AuditPipeline, AuditReport, Batch, BatchPolicy, FailedDocument};
