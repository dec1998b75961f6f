//! Per-client session state for toggled sort orders.
//!
//! # Responsibility
//! - Hold the key-value state of one client session as loaded from storage.
//! - Derive the next sort direction of a listing from the stored one.
//!
//! # Invariants
//! - Absent or unrecognized stored values resolve to ascending.
//! - Computing a direction never changes the session; callers store it
//!   once the sorted listing was produced.

use crate::model::listing::SortDirection;
use std::collections::BTreeMap;

/// Session key holding the institution list sort order.
pub const INSTITUTION_SORT_KEY: &str = "institutionSortOrder";
/// Session key holding the course list sort order.
pub const COURSE_SORT_KEY: &str = "courseSortOrder";

/// Key-value state of one client session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    values: BTreeMap<String, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Direction the next sort request for `key` uses.
    ///
    /// The first request of a session sorts ascending; each following
    /// request flips the previously stored direction.
    pub fn next_sort(&self, key: &str) -> SortDirection {
        self.get(key)
            .and_then(SortDirection::parse)
            .map_or(SortDirection::Ascending, SortDirection::toggled)
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, COURSE_SORT_KEY, INSTITUTION_SORT_KEY};
    use crate::model::listing::SortDirection;

    #[test]
    fn next_sort_starts_ascending_then_flips_stored_value() {
        let mut session = Session::new();
        assert_eq!(session.next_sort(INSTITUTION_SORT_KEY), SortDirection::Ascending);
        assert_eq!(session.next_sort(INSTITUTION_SORT_KEY), SortDirection::Ascending);

        session.set(INSTITUTION_SORT_KEY, SortDirection::Ascending.as_str());
        assert_eq!(session.next_sort(INSTITUTION_SORT_KEY), SortDirection::Descending);

        session.set(INSTITUTION_SORT_KEY, SortDirection::Descending.as_str());
        assert_eq!(session.next_sort(INSTITUTION_SORT_KEY), SortDirection::Ascending);
    }

    #[test]
    fn unrecognized_value_resolves_to_ascending() {
        let mut session = Session::new();
        session.set(COURSE_SORT_KEY, "sideways");
        assert_eq!(session.next_sort(COURSE_SORT_KEY), SortDirection::Ascending);
        assert_eq!(session.get(COURSE_SORT_KEY), Some("sideways"));
    }

    #[test]
    fn keys_are_independent() {
        let mut session = Session::new();
        session.set(INSTITUTION_SORT_KEY, "asc");
        assert_eq!(session.next_sort(COURSE_SORT_KEY), SortDirection::Ascending);
        assert_eq!(session.next_sort(INSTITUTION_SORT_KEY), SortDirection::Descending);
    }
}
