//! Customer (billed party) fields.

use super::patterns::{CUSTOMER_ADDRESS, CUSTOMER_GSTIN, CUSTOMER_NAME};

/// Extract the customer name following `M/s.`, up to the first comma.
pub fn extract_customer_name(text: &str) -> Option<String> {
    let caps = CUSTOMER_NAME.captures(text)?;
    caps[1]
        .trim()
        .split(',')
        .next()
        .map(|name| name.trim().to_string())
}

/// Extract the rest of the `M/s. <name>,` line.
pub fn extract_customer_address(text: &str) -> Option<String> {
    CUSTOMER_ADDRESS
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// Extract the customer GSTIN.
///
/// The match is split on its last `.` so only the identifier itself remains.
pub fn extract_customer_gstin(text: &str) -> Option<String> {
    let m = CUSTOMER_GSTIN.find(text)?;
    m.as_str()
        .trim()
        .rsplit('.')
        .next()
        .map(|id| id.trim().to_string())
}
