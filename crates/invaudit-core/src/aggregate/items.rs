//! Normalization of line items into comparison keys.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::trace;

use crate::invoice::rules::patterns::LINE_ITEM_CANONICAL;
use crate::models::record::{ItemKey, LineItem};

/// Derive the `name_quantity_rate` keys for a record's line items.
///
/// A matched item name can carry earlier table rows on its leading lines;
/// those rows are recovered with [`parse_item_row`] and lines that are not
/// rows are dropped.
pub fn item_keys(items: &[LineItem]) -> Vec<ItemKey> {
    let mut keys = Vec::new();

    for item in items {
        for line in item.leading_lines() {
            match parse_item_row(line) {
                Some(key) => keys.push(key),
                None => trace!("Not an item row: {:?}", line),
            }
        }

        if !item.product().is_empty() {
            keys.push(item.key());
        }
    }

    keys
}

/// Parse a single text row into an item key.
///
/// Accepts the rendered form `name, HSN: h, Quantity: q, Rate: r, Price: p`,
/// or falls back to whitespace tokens where the last four are HSN, quantity,
/// rate and price and everything before them is the name.
pub fn parse_item_row(line: &str) -> Option<ItemKey> {
    let line = line.trim();

    if let Some(caps) = LINE_ITEM_CANONICAL.captures(line) {
        return Some(ItemKey::new(
            caps[1].trim(),
            caps[3].parse().ok()?,
            caps[4].parse().ok()?,
        ));
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }

    let (name, tail) = parts.split_at(parts.len() - 4);
    if !tail[0].chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let quantity = tail[1].parse().ok()?;
    let rate = tail[2].parse().ok()?;
    Decimal::from_str(tail[3]).ok()?;

    Some(ItemKey::new(name.join(" "), quantity, rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(name: &str, quantity: u64, rate: u64) -> LineItem {
        LineItem {
            ordinal: 1,
            name: name.to_string(),
            hsn: "8517".to_string(),
            quantity,
            rate,
            price: Decimal::from(quantity * rate),
        }
    }

    #[test]
    fn test_fallback_row() {
        let key = parse_item_row("Widget A 8471 2 500 1000.00").unwrap();
        assert_eq!(key.to_string(), "Widget A_2_500");
    }

    #[test]
    fn test_canonical_row() {
        let key =
            parse_item_row("Widget A, HSN: 8471, Quantity: 2, Rate: 500, Price: 1000.00").unwrap();
        assert_eq!(key, ItemKey::new("Widget A", 2, 500));
    }

    #[test]
    fn test_non_rows_are_dropped() {
        assert_eq!(parse_item_row("Sr Description HSN Qty Rate Amount"), None);
        assert_eq!(parse_item_row("12 Main St"), None);
        assert_eq!(parse_item_row("Widget 8471 2 500"), None);
        assert_eq!(parse_item_row(""), None);
    }

    #[test]
    fn test_item_keys_recover_embedded_rows() {
        let items = vec![
            item("Description HSN Qty\nWidget A 8471 2 500 1000.00\nGadget B", 1, 300),
            item("Cable", 4, 50),
        ];

        let keys: Vec<String> = item_keys(&items).iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["Widget A_2_500", "Gadget B_1_300", "Cable_4_50"]);
    }
}
