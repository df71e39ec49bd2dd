//! End-to-end batch audit: documents in, record and issue tables out.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{Aggregator, Document};
use crate::error::{AggregationError, DocumentError, PdfError, Result};
use crate::invoice::{FieldParser, InvoiceParser};
use crate::models::config::AuditConfig;
use crate::models::issue::IssueRecord;
use crate::models::record::InvoiceRecord;
use crate::reconcile::Reconciler;
use crate::table::Table;

/// What to do when a document in the batch cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Stop the batch and report the document.
    Abort,
    /// Leave the document out and record it as a failure.
    Skip,
}

impl BatchPolicy {
    pub fn from_continue_on_error(continue_on_error: bool) -> Self {
        if continue_on_error {
            Self::Skip
        } else {
            Self::Abort
        }
    }
}

/// A document left out of the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedDocument {
    pub source: String,
    pub reason: String,
}

/// Documents collected for one audit run.
#[derive(Debug, Default)]
pub struct Batch {
    documents: Vec<Document>,
    failures: Vec<FailedDocument>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already extracted document.
    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }
}

/// Result of a batch audit.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub records: Vec<InvoiceRecord>,
    pub issues: Vec<IssueRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailedDocument>,
}

impl AuditReport {
    /// Invoice details table.
    pub fn invoice_table(&self, item_columns: usize) -> std::result::Result<Table, AggregationError> {
        Table::from_records(&self.records, item_columns)
    }

    /// Identified issues table.
    pub fn issue_table(&self) -> Table {
        Table::from_issues(&self.issues)
    }
}

/// Extraction, aggregation and reconciliation driven from one configuration.
pub struct AuditPipeline<P = FieldParser> {
    config: AuditConfig,
    policy: BatchPolicy,
    aggregator: Aggregator<P>,
    reconciler: Reconciler,
}

impl AuditPipeline {
    pub fn new(config: AuditConfig) -> Self {
        Self::with_parser(config, FieldParser::new())
    }
}

impl<P: InvoiceParser> AuditPipeline<P> {
    pub fn with_parser(config: AuditConfig, parser: P) -> Self {
        Self {
            policy: BatchPolicy::from_continue_on_error(config.output.continue_on_error),
            aggregator: Aggregator::with_parser(parser),
            reconciler: Reconciler::from_config(&config.reconcile),
            config,
        }
    }

    /// Override the policy taken from the configuration.
    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Read one PDF, enforcing the configured size limit.
    pub fn load(&self, source: &str, data: &[u8]) -> std::result::Result<Document, DocumentError> {
        let size = data.len() as u64;
        let limit = self.config.pdf.max_file_size;
        if size > limit {
            return Err(DocumentError::new(source, PdfError::TooLarge { size, limit }));
        }

        Document::from_pdf(source, data, self.config.pdf.collect_glyphs)
    }

    /// Read one PDF from disk, checking its size before reading it.
    pub fn load_file(&self, path: &Path) -> std::result::Result<Document, DocumentError> {
        let source = path.display().to_string();
        let unreadable = |e: std::io::Error| DocumentError::new(source.as_str(), PdfError::Read(e));

        let size = fs::metadata(path).map_err(unreadable)?.len();
        let limit = self.config.pdf.max_file_size;
        if size > limit {
            return Err(DocumentError::new(source.as_str(), PdfError::TooLarge { size, limit }));
        }

        let data = fs::read(path).map_err(unreadable)?;
        self.load(&source, &data)
    }

    /// Read one PDF into `batch`.
    ///
    /// Under [`BatchPolicy::Skip`] an unreadable document is recorded as a
    /// failure and `Ok` is returned; under [`BatchPolicy::Abort`] the error is
    /// returned and the batch should be dropped.
    pub fn add(
        &self,
        batch: &mut Batch,
        source: &str,
        data: &[u8],
    ) -> std::result::Result<(), DocumentError> {
        self.admit(batch, self.load(source, data))
    }

    /// Read one PDF file into `batch`. Files that cannot be read follow the
    /// batch policy like any other unreadable document.
    pub fn add_file(&self, batch: &mut Batch, path: &Path) -> std::result::Result<(), DocumentError> {
        self.admit(batch, self.load_file(path))
    }

    fn admit(
        &self,
        batch: &mut Batch,
        loaded: std::result::Result<Document, DocumentError>,
    ) -> std::result::Result<(), DocumentError> {
        match loaded {
            Ok(document) => {
                debug!("Loaded {} ({} characters)", document.source, document.text.len());
                batch.push(document);
                Ok(())
            }
            Err(e) if self.policy == BatchPolicy::Skip => {
                warn!("Skipping {}: {}", e.source_id, e.error);
                batch.failures.push(FailedDocument {
                    source: e.source_id,
                    reason: e.error.to_string(),
                });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Aggregate and reconcile everything in `batch`.
    pub fn finish(&self, batch: Batch) -> Result<AuditReport> {
        let table = self.aggregator.aggregate(&batch.documents)?;
        let records = table.into_records();
        let issues = self.reconciler.run(&records);

        info!(
            "Audited {} documents ({} skipped): {} issue rows",
            records.len(),
            batch.failures.len(),
            issues.len()
        );

        Ok(AuditReport {
            generated_at: Utc::now(),
            records,
            issues,
            failures: batch.failures,
        })
    }

    /// Audit a batch of `(source, bytes)` inputs in order.
    pub fn run<I, S, D>(&self, inputs: I) -> Result<AuditReport>
    where
        I: IntoIterator<Item = (S, D)>,
        S: AsRef<str>,
        D: AsRef<[u8]>,
    {
        let mut batch = Batch::new();
        for (source, data) in inputs {
            self.add(&mut batch, source.as_ref(), data.as_ref())?;
        }
        self.finish(batch)
    }
}
