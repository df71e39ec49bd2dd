//! Rate drift: the same item and quantity billed to one customer at
//! different rates.

use std::collections::HashMap;

use tracing::trace;

use super::{group_records, Detector, IssueCounter};
use crate::models::issue::{IssueKind, IssueRecord};
use crate::models::record::InvoiceRecord;

/// Groups records by customer name and compares every item key against the
/// first rate seen for its `(name, quantity)` pair in that group.
///
/// Each mismatch raises a pair of rows sharing one identifier: the current
/// occurrence first, then the occurrence that set the baseline. The baseline
/// is never replaced, so an item that later returns to its first rate raises
/// nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct RateDriftDetector;

impl Detector for RateDriftDetector {
    fn kind(&self) -> IssueKind {
        IssueKind::RateDrift
    }

    fn detect(&self, records: &[InvoiceRecord], ids: &mut IssueCounter) -> Vec<IssueRecord> {
        let mut issues = Vec::new();

        for (customer, members) in group_records(records, |r| r.customer_name.as_str()) {
            let mut baselines: HashMap<(&str, u64), (u64, &InvoiceRecord)> = HashMap::new();

            for &record in &members {
                for key in &record.items_qty_rate {
                    match baselines.get(&key.comparison_key()) {
                        Some(&(rate, first)) if rate != key.rate => {
                            trace!("{}: {} billed at {} after {}", customer, key, key.rate, rate);
                            let id = ids.next_id();
                            issues.push(IssueRecord::rate_drift(
                                id,
                                &record.invoice_number,
                                &key.name,
                                key.rate,
                            ));
                            issues.push(IssueRecord::rate_drift(
                                id,
                                &first.invoice_number,
                                &key.name,
                                rate,
                            ));
                        }
                        Some(_) => {}
                        None => {
                            baselines.insert(key.comparison_key(), (key.rate, record));
                        }
                    }
                }
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::IssueId;
    use crate::models::record::NOT_FOUND;
    use crate::reconcile::tests::{record, with_item};
    use pretty_assertions::assert_eq;

    fn rows(issues: &[IssueRecord]) -> Vec<(u32, &str, &str, u64)> {
        issues
            .iter()
            .map(|i| {
                (
                    i.id.0,
                    i.invoice_number.as_str(),
                    i.item.as_deref().unwrap(),
                    i.rate.unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_rate_change_raises_pair() {
        let records = vec![
            with_item(record("INV-1", "Star Electronics", "Acme Co"), "Widget", 2, 500),
            with_item(record("INV-2", "Star Electronics", "Acme Co"), "Widget", 2, 550),
        ];

        let issues = RateDriftDetector.detect(&records, &mut IssueCounter::new());

        assert_eq!(
            rows(&issues),
            vec![(1, "INV-2", "Widget", 550), (1, "INV-1", "Widget", 500)]
        );
        assert!(issues.iter().all(|i| i.kind == IssueKind::RateDrift));
    }

    #[test]
    fn test_baseline_is_first_rate() {
        let records = vec![
            with_item(record("INV-1", "Star Electronics", "Acme Co"), "Widget", 2, 500),
            with_item(record("INV-2", "Star Electronics", "Acme Co"), "Widget", 2, 550),
            with_item(record("INV-3", "Star Electronics", "Acme Co"), "Widget", 2, 500),
            with_item(record("INV-4", "Star Electronics", "Acme Co"), "Widget", 2, 600),
        ];

        let issues = RateDriftDetector.detect(&records, &mut IssueCounter::new());

        assert_eq!(
            rows(&issues),
            vec![
                (1, "INV-2", "Widget", 550),
                (1, "INV-1", "Widget", 500),
                (2, "INV-4", "Widget", 600),
                (2, "INV-1", "Widget", 500),
            ]
        );
    }

    #[test]
    fn test_quantity_and_customer_separate_keys() {
        let records = vec![
            with_item(record("INV-1", "Star Electronics", "Acme Co"), "Widget", 2, 500),
            with_item(record("INV-2", "Star Electronics", "Acme Co"), "Widget", 3, 480),
            with_item(record("INV-3", "Star Electronics", "Nova Traders"), "Widget", 2, 550),
            with_item(record("INV-4", "Star Electronics", NOT_FOUND), "Widget", 2, 700),
        ];

        assert!(RateDriftDetector.detect(&records, &mut IssueCounter::new()).is_empty());
    }

    #[test]
    fn test_drift_within_one_record() {
        let mut single = with_item(record("INV-1", "Star Electronics", "Acme Co"), "Widget", 2, 500);
        single = with_item(single, "Widget", 2, 520);

        let mut ids = IssueCounter::new();
        let issues = RateDriftDetector.detect(&[single], &mut ids);

        assert_eq!(
            rows(&issues),
            vec![(1, "INV-1", "Widget", 520), (1, "INV-1", "Widget", 500)]
        );
        assert_eq!(ids.issued(), 1);
        assert_eq!(issues[0].id, IssueId(1));
    }
}
