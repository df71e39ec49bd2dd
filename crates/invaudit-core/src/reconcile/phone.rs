//! Phone drift: one vendor, several contact numbers.

use super::{flag_divergent_groups, Detector, IssueCounter};
use crate::models::issue::{IssueKind, IssueRecord};
use crate::models::record::InvoiceRecord;

/// Groups records by company name and flags every record of a group that
/// lists more than one distinct contact number.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhoneDriftDetector;

impl Detector for PhoneDriftDetector {
    fn kind(&self) -> IssueKind {
        IssueKind::PhoneDrift
    }

    fn detect(&self, records: &[InvoiceRecord], ids: &mut IssueCounter) -> Vec<IssueRecord> {
        flag_divergent_groups(
            records,
            |r| r.company_name.as_str(),
            |r| r.company_contact.as_str(),
            ids,
            |id, record, contact| IssueRecord::phone_drift(id, &record.invoice_number, contact),
        )
    }
}
