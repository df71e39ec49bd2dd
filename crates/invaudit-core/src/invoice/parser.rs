//! Pattern-based invoice parser.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::record::{InvoiceRecord, NOT_FOUND};

use super::rules::{
    extract_charges_before_tax, extract_company_address, extract_company_contact,
    extract_company_name, extract_customer_address, extract_customer_gstin,
    extract_customer_name, extract_invoice_number, LineItemExtractor,
};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub record: InvoiceRecord,
    /// Raw text the record was extracted from.
    pub raw_text: String,
    /// Scalar fields that fell back to the sentinel.
    pub missing_fields: Vec<&'static str>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
///
/// Parsing never fails: a rule that does not match leaves its field at
/// [`NOT_FOUND`].
pub trait InvoiceParser {
    /// Parse the text of the document identified by `source`.
    fn parse(&self, source: &str, text: &str) -> ExtractionResult;
}

/// Runs the field rules in a fixed order; rules share no match state.
#[derive(Debug, Default, Clone)]
pub struct FieldParser {
    line_items: LineItemExtractor,
}

impl FieldParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self::default()
    }
}

fn or_not_found(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_FOUND.to_string())
}

impl InvoiceParser for FieldParser {
    fn parse(&self, source: &str, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing invoice {} from {} characters of text", source, text.len());

        let mut record = InvoiceRecord::new(source);
        record.company_name = or_not_found(extract_company_name(text));
        record.company_address = or_not_found(extract_company_address(text));
        record.company_contact = or_not_found(extract_company_contact(text));
        record.customer_name = or_not_found(extract_customer_name(text));
        record.customer_address = or_not_found(extract_customer_address(text));
        record.customer_gstin = or_not_found(extract_customer_gstin(text));
        record.invoice_number = or_not_found(extract_invoice_number(text));

        let scan = self.line_items.scan(text);
        for rejected in &scan.rejected {
            warnings.push(format!("Dropped line item with out-of-range numbers: {}", rejected));
        }
        if scan.items.is_empty() {
            warnings.push("Could not extract line items".to_string());
        }
        record.line_items = scan.items;

        record.charges_before_tax = or_not_found(extract_charges_before_tax(text));

        let missing_fields = record.missing_fields();
        for field in &missing_fields {
            debug!("{}: no match for {}", source, field);
        }

        debug!(
            "Extracted invoice {} with {} line items, {} fields missing",
            record.invoice_number,
            record.line_items.len(),
            missing_fields.len()
        );

        ExtractionResult {
            record,
            raw_text: text.to_string(),
            missing_fields,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INVOICE: &str = "TAX INVOICE
Star Electronics
Shop 4, Link Road, Malad West
Mumbai 400064
Tel. No. : 9820012345
Invoice No. INV-2023 0042
Bill To:
M/s. Acme Co, 12 Main St
GSTIN No. 27ABCDE1234F1Z5
Widget A 8471 2 500 1000.00;
Gadget B 8517 1 300 300.00;
Sub Total 1300
";

    #[test]
    fn test_parse_full_invoice() {
        let result = FieldParser::new().parse("a.pdf", INVOICE);
        let record = &result.record;

        assert_eq!(record.source, "a.pdf");
        assert_eq!(record.company_name, "Star Electronics");
        assert_eq!(record.company_address, "Road, Malad West\nMumbai 400064");
        assert_eq!(record.company_contact, "9820012345");
        assert_eq!(record.customer_name, "Acme Co");
        assert_eq!(record.customer_address, "12 Main St");
        assert_eq!(record.customer_gstin, "27ABCDE1234F1Z5");
        assert_eq!(record.invoice_number, "INV-2023 0042");
        assert_eq!(record.charges_before_tax, "1300");
        assert_eq!(record.line_items.len(), 2);
        assert!(result.missing_fields.is_empty());
    }

    #[test]
    fn test_missing_fields_are_sentinels() {
        let text = "M/s. Acme Co, 12 Main St\nGSTIN No. 27ABCDE1234F1Z5";
        let result = FieldParser::new().parse("b.pdf", text);
        let record = &result.record;

        assert_eq!(record.customer_name, "Acme Co");
        assert!(record.customer_gstin.ends_with("27ABCDE1234F1Z5"));
        assert_eq!(record.company_name, NOT_FOUND);
        assert_eq!(record.company_contact, NOT_FOUND);
        assert_eq!(record.invoice_number, NOT_FOUND);
        assert_eq!(record.charges_before_tax, NOT_FOUND);
        assert!(record.line_items.is_empty());
        assert!(result.missing_fields.contains(&"company_name"));
        assert!(result.warnings.iter().any(|w| w.contains("line items")));
    }

    #[test]
    fn test_empty_text() {
        let result = FieldParser::new().parse("empty.pdf", "");
        assert_eq!(result.record, InvoiceRecord::new("empty.pdf"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = FieldParser::new();
        let first = parser.parse("a.pdf", INVOICE);
        let second = parser.parse("a.pdf", INVOICE);
        assert_eq!(first.record, second.record);
    }
}
