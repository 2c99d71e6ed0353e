//! Lifecycle aggregation.
//!
//! Folds collected events, in discovery order, into per-payment running
//! aggregates. The fold is pure: the same ordered event list always
//! produces the same aggregate map.

use std::collections::HashMap;

use tracing::debug;

use super::types::{EventKind, LifecycleAggregate, LifecycleEvent, PaymentStatus};

/// Folds events into per-payment aggregates, keyed by payment id.
///
/// An `executed` event whose id has no preceding `created` in the input
/// (for example when an owner filter excluded the creation) contributes to
/// no aggregate; it remains part of the caller's global timeline only. A
/// duplicate `created` for an already-seen id is ignored.
#[must_use]
pub fn fold(events: &[LifecycleEvent]) -> HashMap<u64, LifecycleAggregate> {
    let mut aggregates: HashMap<u64, LifecycleAggregate> = HashMap::new();

    for event in events {
        match event.kind {
            EventKind::Created {
                owner,
                recipient,
                amount,
                interval_secs,
            } => {
                if aggregates.contains_key(&event.payment_id) {
                    debug!(payment_id = event.payment_id, "duplicate create ignored");
                    continue;
                }
                let mut aggregate = LifecycleAggregate::from_created(
                    event.payment_id,
                    owner,
                    recipient,
                    amount,
                    interval_secs,
                    event.timestamp,
                );
                aggregate.events.push(event.clone());
                aggregates.insert(event.payment_id, aggregate);
            }

            EventKind::Executed { amount } => {
                match aggregates.get_mut(&event.payment_id) {
                    Some(aggregate) => {
                        aggregate.total_executions += 1;
                        aggregate.total_paid = aggregate.total_paid.saturating_add(amount);
                        aggregate.events.push(event.clone());
                    }
                    None => {
                        debug!(
                            payment_id = event.payment_id,
                            "execution without creation, kept in timeline only"
                        );
                    }
                }
            }

            EventKind::Cancelled => {
                if let Some(aggregate) = aggregates.get_mut(&event.payment_id) {
                    // Authoritative: nothing downstream may downgrade this.
                    aggregate.status = PaymentStatus::Deleted;
                    aggregate.terminated_at = Some(event.timestamp);
                    aggregate.events.push(event.clone());
                }
            }

            EventKind::Paused
            | EventKind::Resumed
            | EventKind::ToppedUp { .. }
            | EventKind::Withdrawn { .. } => {
                if let Some(aggregate) = aggregates.get_mut(&event.payment_id) {
                    aggregate.events.push(event.clone());
                }
            }
        }
    }

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use drip_sdk::{Address, TxHash};

    fn event(payment_id: u64, block: u64, kind: EventKind) -> LifecycleEvent {
        LifecycleEvent {
            payment_id,
            kind,
            tx_hash: TxHash::new([0u8; 32]),
            block_number: block,
            log_index: 0,
            timestamp: DateTime::from_timestamp(block as i64 * 10, 0).unwrap_or(DateTime::UNIX_EPOCH),
        }
    }

    fn created(payment_id: u64, block: u64, amount: u128) -> LifecycleEvent {
        event(
            payment_id,
            block,
            EventKind::Created {
                owner: Address::new([0xaa; 20]),
                recipient: Address::new([0xbb; 20]),
                amount,
                interval_secs: 3600,
            },
        )
    }

    #[test]
    fn test_fold_counts_and_sums_executions() {
        let events = vec![
            created(7, 1, 100),
            event(7, 2, EventKind::Executed { amount: 100 }),
            event(7, 3, EventKind::Executed { amount: 100 }),
        ];

        let aggregates = fold(&events);
        let agg = aggregates.get(&7).expect("aggregate");

        assert_eq!(agg.total_executions, 2);
        assert_eq!(agg.total_paid, 200);
        assert_eq!(agg.status, PaymentStatus::Active);
        assert_eq!(agg.events.len(), 3);
    }

    #[test]
    fn test_fold_cancelled_marks_deleted() {
        let events = vec![created(8, 1, 50), event(8, 2, EventKind::Cancelled)];

        let aggregates = fold(&events);
        let agg = aggregates.get(&8).expect("aggregate");

        assert_eq!(agg.status, PaymentStatus::Deleted);
        assert!(agg.terminated_at.is_some());
    }

    #[test]
    fn test_fold_orphan_execution_builds_no_aggregate() {
        let events = vec![event(9, 5, EventKind::Executed { amount: 10 })];

        let aggregates = fold(&events);
        assert!(aggregates.is_empty());
    }

    #[test]
    fn test_fold_duplicate_create_ignored() {
        let events = vec![created(3, 1, 100), created(3, 2, 999)];

        let aggregates = fold(&events);
        let agg = aggregates.get(&3).expect("aggregate");

        assert_eq!(aggregates.len(), 1);
        assert_eq!(agg.amount, 100);
        assert_eq!(agg.events.len(), 1);
    }

    #[test]
    fn test_fold_pause_resume_do_not_terminate() {
        let events = vec![
            created(4, 1, 100),
            event(4, 2, EventKind::Paused),
            event(4, 3, EventKind::Resumed),
        ];

        let aggregates = fold(&events);
        let agg = aggregates.get(&4).expect("aggregate");

        assert_eq!(agg.status, PaymentStatus::Active);
        assert_eq!(agg.events.len(), 3);
    }

    #[test]
    fn test_fold_topup_withdraw_append_only() {
        let events = vec![
            created(5, 1, 100),
            event(5, 2, EventKind::ToppedUp { amount: 500 }),
            event(5, 3, EventKind::Withdrawn { amount: 200 }),
        ];

        let aggregates = fold(&events);
        let agg = aggregates.get(&5).expect("aggregate");

        assert_eq!(agg.total_paid, 0);
        assert_eq!(agg.total_executions, 0);
        assert_eq!(agg.events.len(), 3);
    }

    #[test]
    fn test_fold_is_idempotent() {
        let events = vec![
            created(1, 1, 100),
            event(1, 2, EventKind::Executed { amount: 100 }),
            event(1, 3, EventKind::Cancelled),
            event(2, 4, EventKind::Executed { amount: 7 }),
        ];

        let first = fold(&events);
        let second = fold(&events);

        assert_eq!(first, second);
    }

    #[test]
    fn test_fold_multiple_payments() {
        let events = vec![
            created(1, 1, 100),
            created(2, 2, 200),
            event(1, 3, EventKind::Executed { amount: 100 }),
            event(2, 4, EventKind::Executed { amount: 200 }),
            event(2, 5, EventKind::Executed { amount: 200 }),
        ];

        let aggregates = fold(&events);

        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates.get(&1).expect("agg 1").total_paid, 100);
        assert_eq!(aggregates.get(&2).expect("agg 2").total_paid, 400);
    }

    #[test]
    fn test_fold_created_at_from_event_timestamp() {
        let events = vec![created(6, 12, 100)];

        let aggregates = fold(&events);
        let agg = aggregates.get(&6).expect("aggregate");

        assert_eq!(agg.created_at.timestamp(), 120);
    }
}
