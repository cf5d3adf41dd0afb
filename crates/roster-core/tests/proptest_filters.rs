use proptest::prelude::*;
use roster_core::clock::ManualClock;
use roster_core::filter::{FilterCriteria, distinct_cities};
use roster_core::source::StaticSource;
use roster_core::{DirectoryStore, PersonRecord, compute_oldest_by_city};
use std::time::Duration;

use generators::*;

/// True if `sub` appears in `all` in the same relative order.
fn is_ordered_subsequence(sub: &[PersonRecord], all: &[PersonRecord]) -> bool {
    let mut rest = all.iter();
    sub.iter().all(|wanted| rest.any(|candidate| candidate == wanted))
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn filtered_is_ordered_subset(
        records in arb_records(),
        name in arb_name_term(),
        city in arb_city_term(),
    ) {
        let criteria = FilterCriteria::new(name, city);
        let filtered = criteria.apply(&records);
        prop_assert!(filtered.len() <= records.len());
        prop_assert!(is_ordered_subsequence(&filtered, &records));
        for record in &filtered {
            prop_assert!(criteria.matches(record));
        }
    }

    #[test]
    fn empty_criteria_keep_everything(records in arb_records()) {
        prop_assert_eq!(FilterCriteria::default().apply(&records), records);
    }

    #[test]
    fn cities_are_sorted_unique_and_complete(records in arb_records()) {
        let cities = distinct_cities(&records);
        prop_assert!(cities.windows(2).all(|pair| pair[0] < pair[1]));
        for record in &records {
            prop_assert!(cities.contains(&record.city));
        }
    }

    #[test]
    fn oldest_is_earliest_and_first_among_ties(records in arb_records()) {
        let map = compute_oldest_by_city(&records);
        prop_assert_eq!(map.len(), distinct_cities(&records).len());

        for (city, id) in &map {
            let in_city: Vec<&PersonRecord> =
                records.iter().filter(|r| &r.city == city).collect();
            let earliest = in_city.iter().map(|r| r.birth_date).min();
            let first_earliest = in_city
                .iter()
                .find(|r| Some(r.birth_date) == earliest)
                .map(|r| r.id);
            prop_assert_eq!(Some(*id), first_earliest);
        }
    }

    #[test]
    fn settled_store_matches_direct_filter(
        records in arb_records(),
        edits in prop::collection::vec((arb_name_term(), arb_city_term(), 0u64..400), 1..8),
    ) {
        let clock = ManualClock::new();
        let mut store = DirectoryStore::with_clock(clock.clone(), Duration::from_millis(1000));
        store.load(&StaticSource::new(records.clone())).unwrap();

        let mut last = FilterCriteria::default();
        for (name, city, gap) in edits {
            store.search_by_name(name.clone());
            store.filter_by_city(city.clone());
            last = FilterCriteria::new(name, city);
            clock.advance_millis(gap);
            store.tick();
        }

        clock.advance_millis(1000);
        store.tick();
        prop_assert!(!store.is_recompute_pending());
        let expected = last.apply(&records);
        prop_assert_eq!(store.filtered_records(), expected.as_slice());

        store.toggle_highlight_oldest();
        prop_assert_eq!(store.highlight_map(), &compute_oldest_by_city(store.filtered_records()));
    }
}
