//! Flat header + rows tables for export.

use serde::Serialize;

use crate::error::AggregationError;
use crate::models::issue::{IssueKind, IssueRecord};
use crate::models::record::InvoiceRecord;

/// Placeholder for an absent value in the issue table.
pub const ABSENT: &str = "NA";

/// A rectangular table of strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. The row must have exactly one cell per header.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), AggregationError> {
        if row.len() != self.headers.len() {
            return Err(AggregationError::ColumnMismatch {
                row: self.rows.len(),
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Invoice details, one row per record.
    ///
    /// `item_columns` line items are exposed as `Item_1..Item_n`; cells past
    /// a record's last item are empty and items beyond the last column are
    /// still counted in `Items_Qty_Rate`.
    pub fn from_records<'a, I>(records: I, item_columns: usize) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = &'a InvoiceRecord>,
    {
        let mut headers: Vec<String> = [
            "Company Name",
            "Company Address",
            "Company Contact",
            "Customer GSTIN",
            "Customer Name",
            "Customer Address",
            "Invoice Number",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();
        headers.extend((1..=item_columns).map(|n| format!("Item_{}", n)));
        headers.extend(
            ["Charges_Before_Tax", "Font_Style", "Items_Qty_Rate"]
                .iter()
                .map(|h| h.to_string()),
        );

        let mut table = Self::new(headers);
        for record in records {
            let mut row = vec![
                record.company_name.clone(),
                record.company_address.clone(),
                record.company_contact.clone(),
                record.customer_gstin.clone(),
                record.customer_name.clone(),
                record.customer_address.clone(),
                record.invoice_number.clone(),
            ];
            row.extend(
                (1..=item_columns)
                    .map(|n| record.item(n).map(|item| item.to_string()).unwrap_or_default()),
            );
            row.push(record.charges_before_tax.clone());
            row.push(record.font_style.clone());
            row.push(
                record
                    .items_qty_rate
                    .iter()
                    .map(|key| key.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            );
            table.push_row(row)?;
        }

        Ok(table)
    }

    /// Identified issues, one row per issue record.
    ///
    /// The `Phone Number` column is present only when at least one phone
    /// drift issue exists.
    pub fn from_issues(issues: &[IssueRecord]) -> Self {
        let with_phone = issues.iter().any(|i| i.kind == IssueKind::PhoneDrift);

        let mut headers = vec!["Issues", "Invoice number", "Item", "Rate", "Font"];
        if with_phone {
            headers.push("Phone Number");
        }

        let mut table = Self::new(headers);
        for issue in issues {
            let mut row = vec![
                issue.id.to_string(),
                issue.invoice_number.clone(),
                issue.item.clone().unwrap_or_else(|| ABSENT.to_string()),
                issue
                    .rate
                    .map(|rate| rate.to_string())
                    .unwrap_or_else(|| ABSENT.to_string()),
                issue.font.clone().unwrap_or_else(|| ABSENT.to_string()),
            ];
            if with_phone {
                row.push(
                    issue
                        .phone_number
                        .clone()
                        .unwrap_or_else(|| ABSENT.to_string()),
                );
            }
            table.rows.push(row);
        }

        table
    }
}
