//! Oldest-per-city derivation used for row highlighting.

use crate::model::person::PersonRecord;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// City → id of the earliest-born record in that city.
pub type HighlightMap = BTreeMap<String, u64>;

/// For every city present in `records`, pick the record with the earliest
/// birth date.
///
/// On equal birth dates the record seen first in `records` wins; a later
/// record only replaces the current pick when it is strictly older. Cities
/// with no records get no entry.
#[must_use]
pub fn compute_oldest_by_city(records: &[PersonRecord]) -> HighlightMap {
    let mut oldest: BTreeMap<&str, &PersonRecord> = BTreeMap::new();
    for record in records {
        match oldest.entry(record.city.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.birth_date < slot.get().birth_date {
                    slot.insert(record);
                }
            }
        }
    }

    oldest
        .into_iter()
        .map(|(city, record)| (city.to_string(), record.id))
        .collect()
}
