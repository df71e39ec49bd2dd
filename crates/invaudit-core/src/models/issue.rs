//! Reconciliation issue models.

use std::fmt;

use serde::{Serialize, Serializer};

/// Sequential issue identifier, rendered as `Issue_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueId(pub u32);

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Issue_{}", self.0)
    }
}

impl Serialize for IssueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Which detector raised an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Same customer and item were billed at different rates.
    RateDrift,
    /// Same vendor issued invoices with different font sets.
    FontDrift,
    /// Same vendor listed different contact numbers.
    PhoneDrift,
}

impl IssueKind {
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::RateDrift => "rate drift",
            IssueKind::FontDrift => "font drift",
            IssueKind::PhoneDrift => "phone drift",
        }
    }
}

/// One flagged anomaly referencing exactly one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    /// Shared by every record that belongs to the same finding.
    pub id: IssueId,

    pub kind: IssueKind,

    /// Invoice number of the referenced record.
    pub invoice_number: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl IssueRecord {
    pub fn rate_drift(
        id: IssueId,
        invoice_number: impl Into<String>,
        item: impl Into<String>,
        rate: u64,
    ) -> Self {
        Self {
            id,
            kind: IssueKind::RateDrift,
            invoice_number: invoice_number.into(),
            item: Some(item.into()),
            rate: Some(rate),
            font: None,
            phone_number: None,
        }
    }

    pub fn font_drift(id: IssueId, invoice_number: impl Into<String>, font: impl Into<String>) -> Self {
        Self {
            id,
            kind: IssueKind::FontDrift,
            invoice_number: invoice_number.into(),
            item: None,
            rate: None,
            font: Some(font.into()),
            phone_number: None,
        }
    }

    pub fn phone_drift(
        id: IssueId,
        invoice_number: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind: IssueKind::PhoneDrift,
            invoice_number: invoice_number.into(),
            item: None,
            rate: None,
            font: None,
            phone_number: Some(phone_number.into()),
        }
    }
}
