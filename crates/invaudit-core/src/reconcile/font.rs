//! Font drift: one vendor, several font sets.

use super::{flag_divergent_groups, Detector, IssueCounter};
use crate::models::issue::{IssueKind, IssueRecord};
use crate::models::record::InvoiceRecord;

/// Groups records by company name and flags every record of a group that
/// uses more than one distinct font style, not only the minority style.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontDriftDetector;

impl Detector for FontDriftDetector {
    fn kind(&self) -> IssueKind {
        IssueKind::FontDrift
    }

    fn detect(&self, records: &[InvoiceRecord], ids: &mut IssueCounter) -> Vec<IssueRecord> {
        flag_divergent_groups(
            records,
            |r| r.company_name.as_str(),
            |r| r.font_style.as_str(),
            ids,
            |id, record, font| IssueRecord::font_drift(id, &record.invoice_number, font),
        )
    }
}
