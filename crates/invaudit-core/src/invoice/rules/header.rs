//! Invoice identification fields.

use super::patterns::INVOICE_NUMBER;

/// Extract the invoice number, e.g. `INV-2023 0042`.
pub fn extract_invoice_number(text: &str) -> Option<String> {
    INVOICE_NUMBER
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}
