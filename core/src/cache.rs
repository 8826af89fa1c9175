//! Client-side cache of range-query results, keyed by an explicit
//! (user, start, end) record. Entries are evicted — never repopulated
//! in place — when a date inside their interval is mutated; the next
//! read refetches lazily.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{ConsumedSummary, Domain, ExerciseSummary, MedicationSummary};

/// Cache key for one cached range fetch. An explicit record rather than
/// a positional tuple, so range scans cannot transpose fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeKey {
    pub user_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Cached range-query results for one domain.
#[derive(Debug)]
pub struct RangeCache<T> {
    entries: HashMap<RangeKey, Vec<T>>,
}

impl<T> Default for RangeCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> RangeCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, user_id: &str, start: NaiveDate, end: NaiveDate) -> Option<&[T]> {
        let key = RangeKey {
            user_id: user_id.to_string(),
            start,
            end,
        };
        self.entries.get(&key).map(Vec::as_slice)
    }

    pub fn put(&mut self, user_id: &str, start: NaiveDate, end: NaiveDate, rows: Vec<T>) {
        let key = RangeKey {
            user_id: user_id.to_string(),
            start,
            end,
        };
        self.entries.insert(key, rows);
    }

    /// Evict exactly the entries for `user_id` whose interval contains
    /// `date` (`start <= date <= end`, the same containment that
    /// lexicographic comparison of canonical `YYYY-MM-DD` keys yields).
    /// Entries for other users or non-overlapping ranges are untouched.
    /// Returns the number of evicted entries. An empty `user_id` is a
    /// guarded no-op — a precondition, not an error.
    pub fn invalidate_for_date(&mut self, user_id: &str, date: NaiveDate) -> usize {
        if user_id.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries
            .retain(|key, _| key.user_id != user_id || date < key.start || date > key.end);
        before - self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// One range cache per domain, dispatched by the domain tag.
#[derive(Debug, Default)]
pub struct SummaryCaches {
    pub medication: RangeCache<MedicationSummary>,
    pub exercise: RangeCache<ExerciseSummary>,
    pub consumed: RangeCache<ConsumedSummary>,
}

impl SummaryCaches {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate_for_date(&mut self, domain: Domain, user_id: &str, date: NaiveDate) -> usize {
        match domain {
            Domain::Medication => self.medication.invalidate_for_date(user_id, date),
            Domain::Exercise => self.exercise.invalidate_for_date(user_id, date),
            Domain::Consumed => self.consumed.invalidate_for_date(user_id, date),
        }
    }

    pub fn clear(&mut self) {
        self.medication.clear();
        self.exercise.clear();
        self.consumed.clear();
    }
}
