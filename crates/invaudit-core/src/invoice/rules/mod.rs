//! Rule-based field extractors for the supported invoice template.
//!
//! Each rule runs independently over the full text and reports `None` when
//! its pattern does not match; the parser substitutes the sentinel.

pub mod customer;
pub mod header;
pub mod line_items;
pub mod patterns;
pub mod totals;
pub mod vendor;

pub use customer::{extract_customer_address, extract_customer_gstin, extract_customer_name};
pub use header::extract_invoice_number;
pub use line_items::{LineItemExtractor, LineItemScan};
pub use totals::extract_charges_before_tax;
pub use vendor::{extract_company_address, extract_company_contact, extract_company_name};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
