use proptest::prelude::*;
use umbrawatch::alert::{AlertBook, AlertKind, AlertRecord};

fn record_strategy() -> impl Strategy<Value = AlertRecord> {
    (0i64..50, -3i32..3, 0u32..4).prop_map(|(time, priority, page)| AlertRecord {
        time,
        priority,
        page,
        sound: AlertKind::None,
    })
}

/// Reference selection: earliest time, lowest priority, first inserted.
fn expected_next(records: &[AlertRecord]) -> Option<AlertRecord> {
    records
        .iter()
        .enumerate()
        .min_by_key(|(index, r)| (r.time, r.priority, *index))
        .map(|(_, r)| *r)
}

proptest! {
    #[test]
    fn test_next_due_matches_reference(records in prop::collection::vec(record_strategy(), 0..40)) {
        let mut book = AlertBook::new();
        for record in &records {
            book.insert(*record);
        }
        prop_assert_eq!(book.next_due(), expected_next(&records));
        prop_assert_eq!(book.len(), records.len());
    }

    /// Firing the due time repeatedly yields non-decreasing times and
    /// consumes every record exactly once.
    #[test]
    fn test_draining_by_time_is_ordered(records in prop::collection::vec(record_strategy(), 1..40)) {
        let mut book = AlertBook::new();
        for record in &records {
            book.insert(*record);
        }

        let mut last = i64::MIN;
        let mut removed = 0;
        while let Some(next) = book.next_due() {
            prop_assert!(next.time >= last);
            last = next.time;
            removed += book.remove_time(next.time);
        }
        prop_assert_eq!(removed, records.len());
        prop_assert!(book.is_empty());
    }

    #[test]
    fn test_remove_page_only_touches_that_page(
        records in prop::collection::vec(record_strategy(), 0..40),
        page in 0u32..4
    ) {
        let mut book = AlertBook::new();
        for record in &records {
            book.insert(*record);
        }
        let targeted = records.iter().filter(|r| r.page == page).count();
        prop_assert_eq!(book.remove_page(page), targeted);
        prop_assert!(book.iter().all(|r| r.page != page));
        prop_assert_eq!(book.len(), records.len() - targeted);
    }

    #[test]
    fn test_discard_before_keeps_present_and_future(
        records in prop::collection::vec(record_strategy(), 0..40),
        now in 0i64..50
    ) {
        let mut book = AlertBook::new();
        for record in &records {
            book.insert(*record);
        }
        let stale = records.iter().filter(|r| r.time < now).count();
        prop_assert_eq!(book.discard_before(now), stale);
        prop_assert!(book.iter().all(|r| r.time >= now));
    }
}
