//! Common regex patterns for invoice field extraction.
//!
//! Every pattern runs against the full document text, not line by line.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Vendor: capitalized phrase ending in a company suffix
    pub static ref COMPANY_NAME: Regex = Regex::new(
        r"(\b[A-Z][\w\s&.,]+(?:Electronics|Pvt\.|Ltd)\b)"
    ).unwrap();

    // Vendor address: from a locality keyword up to the phone label
    pub static ref COMPANY_ADDRESS: Regex = Regex::new(
        r"(?s)(\b(?:Malad|Mumbai|Delhi|Road|Area|Street|Industrial)\b.*?)(?:Tel|Mob)"
    ).unwrap();

    pub static ref COMPANY_CONTACT: Regex = Regex::new(
        r"(?:Tel\. No\.|Mob\. No\.|Contact No\.)\s*:\s*(\d{10})"
    ).unwrap();

    // Customer block: "M/s. <name>, <address>"
    pub static ref CUSTOMER_NAME: Regex = Regex::new(
        r"M/s\.\s+([A-Za-z\s&.,]+),"
    ).unwrap();

    pub static ref CUSTOMER_ADDRESS: Regex = Regex::new(
        r"M/s\.\s+[A-Za-z\s&.]+?,\s*(.+)"
    ).unwrap();

    pub static ref CUSTOMER_GSTIN: Regex = Regex::new(
        r"GSTIN No\.\s*\w+"
    ).unwrap();

    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"Invoice\s*No\.\s*(INV\s*-\s*\d+\s*\d+)"
    ).unwrap();

    // Line item: name, HSN, quantity, rate, price
    pub static ref LINE_ITEM: Regex = Regex::new(
        r"([A-Za-z0-9\s.]+)\s+(\d+)\s+(\d+)\s+(\d+)\s+([\d.]+)"
    ).unwrap();

    // Line item in its rendered form: "name, HSN: h, Quantity: q, Rate: r, Price: p"
    pub static ref LINE_ITEM_CANONICAL: Regex = Regex::new(
        r"^(.*), HSN:\s*(\d+), Quantity:\s*(\d+), Rate:\s*(\d+), Price:\s*([\d.]+)$"
    ).unwrap();

    pub static ref CHARGES_BEFORE_TAX: Regex = Regex::new(
        r"Total\s+(\d+)"
    ).unwrap();
}
