//! Vendor (issuing company) fields.

use super::patterns::{COMPANY_ADDRESS, COMPANY_CONTACT, COMPANY_NAME};

/// Extract the vendor name.
///
/// The pattern can run across line breaks, so only the last line of the
/// match is kept.
pub fn extract_company_name(text: &str) -> Option<String> {
    let caps = COMPANY_NAME.captures(text)?;
    caps[1]
        .trim()
        .lines()
        .last()
        .map(|line| line.trim().to_string())
}

/// Extract the vendor address: everything from the first locality keyword
/// up to the `Tel`/`Mob` label.
pub fn extract_company_address(text: &str) -> Option<String> {
    COMPANY_ADDRESS
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// Extract the 10-digit vendor phone number.
pub fn extract_company_contact(text: &str) -> Option<String> {
    COMPANY_CONTACT
        .captures(text)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "TAX INVOICE\nStar Electronics\nShop 4, Link Road, Malad West\nMumbai 400064\nTel. No. : 9820012345\n";

    #[test]
    fn test_company_name_last_line() {
        assert_eq!(
            extract_company_name(HEADER),
            Some("Star Electronics".to_string())
        );
        assert_eq!(
            extract_company_name("Invoice from Rex Traders Pvt. Ltd for goods"),
            Some("Invoice from Rex Traders Pvt. Ltd".to_string())
        );
    }

    #[test]
    fn test_company_name_missing() {
        assert_eq!(extract_company_name("Acme Traders\nMumbai"), None);
    }

    #[test]
    fn test_company_address_stops_at_phone_label() {
        assert_eq!(
            extract_company_address(HEADER),
            Some("Road, Malad West\nMumbai 400064".to_string())
        );
        assert_eq!(extract_company_address("Link Road, no phone"), None);
    }

    #[test]
    fn test_company_contact() {
        assert_eq!(extract_company_contact(HEADER), Some("9820012345".to_string()));
        assert_eq!(
            extract_company_contact("Contact No.: 9988776655"),
            Some("9988776655".to_string())
        );
        assert_eq!(extract_company_contact("Tel. No. : 12345"), None);
    }
}
