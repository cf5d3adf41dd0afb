//! Name and city criteria applied to the loaded records.

use crate::model::person::PersonRecord;
use std::collections::BTreeSet;

/// Filter criteria applied to the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against first name or last name.
    pub name: String,
    /// Exact city match; empty means every city.
    pub city: String,
}

impl FilterCriteria {
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
        }
    }

    /// Returns true if no filter criteria are active.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_empty() && self.city.is_empty()
    }

    /// Returns true if the record satisfies all active criteria.
    ///
    /// The term is tested against first and last name independently, so
    /// a term spanning both ("ohn d") does not match "John Doe".
    #[must_use]
    pub fn matches(&self, record: &PersonRecord) -> bool {
        if !self.city.is_empty() && record.city != self.city {
            return false;
        }
        if !self.name.is_empty() {
            let term = self.name.to_lowercase();
            if !record.first_name.to_lowercase().contains(&term)
                && !record.last_name.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }

    /// Apply the criteria, keeping the original relative order.
    #[must_use]
    pub fn apply(&self, records: &[PersonRecord]) -> Vec<PersonRecord> {
        if self.is_empty() {
            return records.to_vec();
        }
        let term = self.name.to_lowercase();
        records
            .iter()
            .filter(|record| self.matches_folded(record, &term))
            .cloned()
            .collect()
    }

    fn matches_folded(&self, record: &PersonRecord, term: &str) -> bool {
        (self.city.is_empty() || record.city == self.city)
            && (term.is_empty()
                || record.first_name.to_lowercase().contains(term)
                || record.last_name.to_lowercase().contains(term))
    }
}

/// Distinct cities of `records`, sorted ascending.
#[must_use]
pub fn distinct_cities(records: &[PersonRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.city.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
