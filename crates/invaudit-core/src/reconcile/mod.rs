//! Cross-document reconciliation.
//!
//! Detectors run in a fixed order over the complete record table and append
//! to one issue list. Issue identifiers come from a single [`IssueCounter`]
//! passed through every detector.

mod font;
mod phone;
mod rate;

pub use font::FontDriftDetector;
pub use phone::PhoneDriftDetector;
pub use rate::RateDriftDetector;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::models::config::ReconcileConfig;
use crate::models::issue::{IssueId, IssueKind, IssueRecord};
use crate::models::record::{InvoiceRecord, NOT_FOUND};

/// Hands out sequential issue identifiers starting at 1.
#[derive(Debug, Clone)]
pub struct IssueCounter {
    next: u32,
}

impl IssueCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Reserve the next identifier.
    pub fn next_id(&mut self) -> IssueId {
        let id = IssueId(self.next);
        self.next += 1;
        id
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for IssueCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A single reconciliation pass.
pub trait Detector {
    /// Kind of issue this detector raises.
    fn kind(&self) -> IssueKind;

    /// Inspect the whole table. Identifiers must come from `ids`.
    fn detect(&self, records: &[InvoiceRecord], ids: &mut IssueCounter) -> Vec<IssueRecord>;
}

/// Runs an ordered list of detectors over a record table.
pub struct Reconciler {
    detectors: Vec<Box<dyn Detector>>,
}

impl Reconciler {
    /// A reconciler without detectors.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Rate, font and phone drift, in that order.
    pub fn standard() -> Self {
        Self::from_config(&ReconcileConfig::default())
    }

    /// The standard detectors that are enabled in `config`.
    pub fn from_config(config: &ReconcileConfig) -> Self {
        let mut reconciler = Self::new();
        if config.rate_drift {
            reconciler = reconciler.with_detector(RateDriftDetector);
        }
        if config.font_drift {
            reconciler = reconciler.with_detector(FontDriftDetector);
        }
        if config.phone_drift {
            reconciler = reconciler.with_detector(PhoneDriftDetector);
        }
        reconciler
    }

    /// Append a detector to the run order.
    pub fn with_detector(mut self, detector: impl Detector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Run every detector and return the combined issue list.
    pub fn run(&self, records: &[InvoiceRecord]) -> Vec<IssueRecord> {
        let mut ids = IssueCounter::new();
        let mut issues = Vec::new();

        for detector in &self.detectors {
            let found = detector.detect(records, &mut ids);
            debug!("{} detector raised {} issue rows", detector.kind().label(), found.len());
            issues.extend(found);
        }

        info!(
            "Reconciled {} records: {} issues, {} rows",
            records.len(),
            ids.issued(),
            issues.len()
        );
        issues
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::standard()
    }
}

/// Group records by `key` in sorted key order, keeping input order within a
/// group. Records whose key is the sentinel are left out.
fn group_records<'a, F>(records: &'a [InvoiceRecord], key: F) -> BTreeMap<&'a str, Vec<&'a InvoiceRecord>>
where
    F: Fn(&'a InvoiceRecord) -> &'a str,
{
    let mut groups: BTreeMap<&str, Vec<&InvoiceRecord>> = BTreeMap::new();
    for record in records {
        let group = key(record);
        if group == NOT_FOUND {
            continue;
        }
        groups.entry(group).or_default().push(record);
    }
    groups
}

/// Flag every record of a group whose `attribute` takes more than one
/// distinct value. All records of such a group share one identifier.
fn flag_divergent_groups<'a, G, A, M>(
    records: &'a [InvoiceRecord],
    group_key: G,
    attribute: A,
    ids: &mut IssueCounter,
    make_issue: M,
) -> Vec<IssueRecord>
where
    G: Fn(&'a InvoiceRecord) -> &'a str,
    A: Fn(&'a InvoiceRecord) -> &'a str,
    M: Fn(IssueId, &'a InvoiceRecord, &'a str) -> IssueRecord,
{
    let mut issues = Vec::new();

    for (group, members) in group_records(records, group_key) {
        let values: BTreeSet<&str> = members.iter().map(|&record| attribute(record)).collect();
        if values.len() < 2 {
            continue;
        }

        debug!("{}: {} distinct values across {} records", group, values.len(), members.len());

        let id = ids.next_id();
        for value in values {
            for &record in &members {
                if attribute(record) == value {
                    issues.push(make_issue(id, record, value));
                }
            }
        }
    }

    issues
}
