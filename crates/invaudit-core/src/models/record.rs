//! Invoice record models: one row per source document.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value stored in any scalar field whose extraction rule found no match.
pub const NOT_FOUND: &str = "N/A";

/// All fields extracted from a single invoice document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Identifier of the source document (usually its path).
    pub source: String,

    /// Vendor name.
    pub company_name: String,

    /// Vendor address block.
    pub company_address: String,

    /// Vendor phone number.
    pub company_contact: String,

    /// Buyer name.
    pub customer_name: String,

    /// Buyer address line.
    pub customer_address: String,

    /// Buyer GST identification number.
    pub customer_gstin: String,

    /// Invoice number.
    pub invoice_number: String,

    /// Line items in the order they were matched (Item_1..Item_n).
    #[serde(default)]
    pub line_items: Vec<LineItem>,

    /// Total charged before tax.
    pub charges_before_tax: String,

    /// Distinct glyph names observed in the document, comma-joined.
    #[serde(default)]
    pub font_style: String,

    /// Distinct glyph sizes observed in the document, comma-joined.
    #[serde(default)]
    pub font_sizes: String,

    /// Normalized item keys used for rate comparison.
    #[serde(default)]
    pub items_qty_rate: Vec<ItemKey>,
}

impl InvoiceRecord {
    /// Create a record for `source` with every field set to [`NOT_FOUND`].
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            company_name: NOT_FOUND.to_string(),
            company_address: NOT_FOUND.to_string(),
            company_contact: NOT_FOUND.to_string(),
            customer_name: NOT_FOUND.to_string(),
            customer_address: NOT_FOUND.to_string(),
            customer_gstin: NOT_FOUND.to_string(),
            invoice_number: NOT_FOUND.to_string(),
            line_items: Vec::new(),
            charges_before_tax: NOT_FOUND.to_string(),
            font_style: String::new(),
            font_sizes: String::new(),
            items_qty_rate: Vec::new(),
        }
    }

    /// Get a line item by its 1-based position.
    pub fn item(&self, ordinal: usize) -> Option<&LineItem> {
        ordinal.checked_sub(1).and_then(|idx| self.line_items.get(idx))
    }

    /// Names of the scalar fields that hold the [`NOT_FOUND`] sentinel.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("company_name", &self.company_name),
            ("company_address", &self.company_address),
            ("company_contact", &self.company_contact),
            ("customer_name", &self.customer_name),
            ("customer_address", &self.customer_address),
            ("customer_gstin", &self.customer_gstin),
            ("invoice_number", &self.invoice_number),
            ("charges_before_tax", &self.charges_before_tax),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_str() == NOT_FOUND)
        .map(|(name, _)| name)
        .collect()
    }
}

/// A single line item on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Sequential number (1-based) in match order.
    pub ordinal: u32,

    /// Free-text name as matched. May span several lines of the source text.
    pub name: String,

    /// HSN classification code.
    pub hsn: String,

    /// Quantity.
    pub quantity: u64,

    /// Unit rate.
    pub rate: u64,

    /// Total price for this line.
    pub price: Decimal,
}

impl LineItem {
    /// The product name: last line of the matched name, trimmed.
    pub fn product(&self) -> &str {
        self.name.lines().last().map(str::trim).unwrap_or_default()
    }

    /// Lines of the matched name that precede the product line.
    pub fn leading_lines(&self) -> impl Iterator<Item = &str> {
        let count = self.name.lines().count().saturating_sub(1);
        self.name.lines().take(count)
    }

    /// Normalized comparison key for this item.
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.product(), self.quantity, self.rate)
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, HSN: {}, Quantity: {}, Rate: {}, Price: {}",
            self.name, self.hsn, self.quantity, self.rate, self.price
        )
    }
}

/// Normalized `name_quantity_rate` token; the price is intentionally dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub name: String,
    pub quantity: u64,
    pub rate: u64,
}

impl ItemKey {
    pub fn new(name: impl Into<String>, quantity: u64, rate: u64) -> Self {
        Self {
            name: name.into(),
            quantity,
            rate,
        }
    }

    /// The part of the key items are compared on: name and quantity.
    pub fn comparison_key(&self) -> (&str, u64) {
        (&self.name, self.quantity)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.name, self.quantity, self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn item(name: &str) -> LineItem {
        LineItem {
            ordinal: 1,
            name: name.to_string(),
            hsn: "8471".to_string(),
            quantity: 2,
            rate: 500,
            price: Decimal::from_str("1000.00").unwrap(),
        }
    }

    #[test]
    fn test_new_record_is_all_sentinels() {
        let record = InvoiceRecord::new("a.pdf");
        assert_eq!(record.company_name, NOT_FOUND);
        assert_eq!(record.charges_before_tax, NOT_FOUND);
        assert_eq!(record.missing_fields().len(), 8);
    }

    #[test]
    fn test_item_is_one_based() {
        let mut record = InvoiceRecord::new("a.pdf");
        record.line_items.push(item("Widget A"));
        assert!(record.item(0).is_none());
        assert_eq!(record.item(1).map(|i| i.product()), Some("Widget A"));
        assert!(record.item(2).is_none());
    }

    #[test]
    fn test_line_item_display() {
        assert_eq!(
            item("Widget A").to_string(),
            "Widget A, HSN: 8471, Quantity: 2, Rate: 500, Price: 1000.00"
        );
    }

    #[test]
    fn test_product_is_last_line() {
        let item = item("Sr Description\nGadget 8517 1 300 300.00\n  Widget A  ");
        assert_eq!(item.product(), "Widget A");
        assert_eq!(item.leading_lines().count(), 2);
        assert_eq!(item.key().to_string(), "Widget A_2_500");
    }
}
