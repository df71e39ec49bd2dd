//! Line item extraction.

use std::str::FromStr;

use regex::Captures;
use rust_decimal::Decimal;
use tracing::debug;

use super::patterns::LINE_ITEM;
use super::FieldExtractor;
use crate::models::record::LineItem;

/// Finds every `name HSN quantity rate price` sequence in the text.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineItemExtractor;

/// Outcome of scanning a text for line items.
#[derive(Debug, Clone, Default)]
pub struct LineItemScan {
    /// Accepted items, numbered from 1 in match order.
    pub items: Vec<LineItem>,
    /// Matched text that could not be turned into an item.
    pub rejected: Vec<String>,
}

impl LineItemExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Scan the whole text for non-overlapping line item matches.
    pub fn scan(&self, text: &str) -> LineItemScan {
        let mut scan = LineItemScan::default();

        for caps in LINE_ITEM.captures_iter(text) {
            let ordinal = scan.items.len() as u32 + 1;
            match build_item(&caps, ordinal) {
                Some(item) => scan.items.push(item),
                None => {
                    debug!("Dropping unrepresentable line item match: {:?}", &caps[0]);
                    scan.rejected.push(caps[0].trim().to_string());
                }
            }
        }

        scan
    }
}

/// Quantity and rate must fit in `u64`, price in a `Decimal`.
fn build_item(caps: &Captures<'_>, ordinal: u32) -> Option<LineItem> {
    Some(LineItem {
        ordinal,
        name: caps[1].trim().to_string(),
        hsn: caps[2].to_string(),
        quantity: caps[3].parse().ok()?,
        rate: caps[4].parse().ok()?,
        price: Decimal::from_str(&caps[5]).ok()?,
    })
}

impl FieldExtractor for LineItemExtractor {
    type Output = LineItem;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.scan(text).items
    }
}
