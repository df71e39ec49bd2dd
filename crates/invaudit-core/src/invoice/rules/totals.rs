//! Invoice totals.

use super::patterns::CHARGES_BEFORE_TAX;

/// Extract the amount following the first `Total` label.
pub fn extract_charges_before_tax(text: &str) -> Option<String> {
    CHARGES_BEFORE_TAX
        .captures(text)
        .map(|caps| caps[1].to_string())
}
