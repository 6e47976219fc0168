//! Event stream cleanup ahead of lot matching.

use std::collections::BTreeMap;

use crate::event::Event;
use crate::token::TokenKey;

/// Drops zero-amount events and sorts the rest by timestamp.
///
/// The sort is stable: events sharing a timestamp keep their input order,
/// which decides FIFO outcomes when an acquisition and a disposal coincide.
pub fn normalize(mut events: Vec<Event>) -> Vec<Event> {
    events.retain(|event| !event.amount.is_zero());
    events.sort_by_key(|event| event.timestamp);
    events
}

/// Splits a mixed event stream into normalized per-token streams.
///
/// Tokens whose events were all zero-amount are omitted entirely so that
/// no-op transfers never surface as empty positions.
pub fn group_by_token(events: impl IntoIterator<Item = Event>) -> BTreeMap<TokenKey, Vec<Event>> {
    events
        .into_iter()
        .fold(
            BTreeMap::<TokenKey, Vec<Event>>::new(),
            |mut groups, event| {
                groups.entry(event.token.clone()).or_default().push(event);
                groups
            },
        )
        .into_iter()
        .map(|(token, events)| (token, normalize(events)))
        .filter(|(_, events)| !events.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::event::Direction;
    use crate::test_utils::{acquire, dispose, eth_token, sol_token};

    #[test]
    fn zero_amount_events_are_dropped() {
        let events = vec![
            acquire(&eth_token(), 1, dec!(10), dec!(1)),
            acquire(&eth_token(), 2, dec!(0), dec!(5)),
            dispose(&eth_token(), 3, dec!(0), dec!(5)),
        ];

        let normalized = normalize(events);

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].amount, dec!(10));
    }

    #[test]
    fn events_are_sorted_by_timestamp() {
        let events = vec![
            dispose(&eth_token(), 30, dec!(1), dec!(3)),
            acquire(&eth_token(), 10, dec!(1), dec!(1)),
            acquire(&eth_token(), 20, dec!(1), dec!(2)),
        ];

        let prices: Vec<_> = normalize(events)
            .into_iter()
            .map(|event| event.unit_price_usd)
            .collect();

        assert_eq!(prices, vec![dec!(1), dec!(2), dec!(3)]);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let events = vec![
            dispose(&eth_token(), 5, dec!(1), dec!(9)),
            acquire(&eth_token(), 5, dec!(1), dec!(1)),
            acquire(&eth_token(), 1, dec!(1), dec!(4)),
        ];

        let directions: Vec<_> = normalize(events)
            .into_iter()
            .map(|event| (event.direction, event.unit_price_usd))
            .collect();

        assert_eq!(
            directions,
            vec![
                (Direction::Acquire, dec!(4)),
                (Direction::Dispose, dec!(9)),
                (Direction::Acquire, dec!(1)),
            ]
        );
    }

    #[test]
    fn group_by_token_partitions_and_normalizes() {
        let events = vec![
            acquire(&sol_token(), 2, dec!(3), dec!(100)),
            acquire(&eth_token(), 2, dec!(1), dec!(2)),
            acquire(&eth_token(), 1, dec!(1), dec!(1)),
            dispose(&sol_token(), 1, dec!(0), dec!(100)),
        ];

        let groups = group_by_token(events);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&eth_token()].len(), 2);
        assert_eq!(groups[&eth_token()][0].unit_price_usd, dec!(1));
        assert_eq!(groups[&sol_token()].len(), 1);
    }

    #[test]
    fn token_with_only_zero_amount_events_is_omitted() {
        let events = vec![
            acquire(&eth_token(), 1, dec!(1), dec!(1)),
            acquire(&sol_token(), 1, dec!(0), dec!(100)),
        ];

        let groups = group_by_token(events);

        assert!(groups.contains_key(&eth_token()));
        assert!(!groups.contains_key(&sol_token()));
    }
}
