//! Dense day sequences from sparse fetch results.
//!
//! History views want one value per calendar day. The store only holds
//! rows for days that were touched, so fetch results are expanded here:
//! zero-valued rows for the count domains, forward-fill for weight, and
//! a signup clamp so no pre-signup history is ever fabricated.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::models::{
    ConsumedSummary, ExerciseSummary, MedicationSummary, WeightDay, WeightEntry,
};

/// Sort order for filled sequences. History views read newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Anything with a day-key, so the filler can place it in a sequence.
pub trait DayRow {
    fn day(&self) -> NaiveDate;
}

impl DayRow for MedicationSummary {
    fn day(&self) -> NaiveDate {
        self.date
    }
}

impl DayRow for ExerciseSummary {
    fn day(&self) -> NaiveDate {
        self.date
    }
}

impl DayRow for ConsumedSummary {
    fn day(&self) -> NaiveDate {
        self.date
    }
}

impl DayRow for WeightDay {
    fn day(&self) -> NaiveDate {
        self.date
    }
}

/// The earliest day-key a user may see: the local calendar day of their
/// signup. Days before it are clamped out of every range.
#[must_use]
pub fn min_allowed_day<Tz: TimeZone>(signup: &DateTime<Tz>) -> NaiveDate {
    signup.with_timezone(&Local).date_naive()
}

/// Every day in `[start, end]` inclusive, ascending, with days before
/// `floor` clamped off. Empty when the clamped range is inverted.
#[must_use]
pub fn day_span(start: NaiveDate, end: NaiveDate, floor: Option<NaiveDate>) -> Vec<NaiveDate> {
    let start = match floor {
        Some(floor) if floor > start => floor,
        _ => start,
    };
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Expand a sparse fetch result into a dense, contiguous day sequence
/// over `[start, end]`, clamped at `floor`.
///
/// Days present in `rows` are used as-is; missing days are synthesized
/// by `synthesize(day, previous)`, where `previous` is the most recent
/// earlier element of the output (present or synthesized) — the hook
/// that makes both zero-fill (ignore it) and forward-fill (carry it)
/// work. Rows outside the clamped span are dropped, never returned.
pub fn fill_days<T, F>(
    rows: Vec<T>,
    start: NaiveDate,
    end: NaiveDate,
    floor: Option<NaiveDate>,
    order: FillOrder,
    synthesize: F,
) -> Vec<T>
where
    T: DayRow,
    F: Fn(NaiveDate, Option<&T>) -> T,
{
    let mut by_day: HashMap<NaiveDate, T> = rows.into_iter().map(|r| (r.day(), r)).collect();

    let mut out = Vec::new();
    for day in day_span(start, end, floor) {
        match by_day.remove(&day) {
            Some(row) => out.push(row),
            None => {
                let synthesized = synthesize(day, out.last());
                out.push(synthesized);
            }
        }
    }

    if order == FillOrder::NewestFirst {
        out.reverse();
    }
    out
}

/// Dense weight series: known entries become values, gaps forward-fill
/// the last known weight, and days before the first known value carry
/// the missing-value marker (`None`, never zero).
#[must_use]
pub fn fill_weight_days(
    entries: Vec<WeightEntry>,
    start: NaiveDate,
    end: NaiveDate,
    floor: Option<NaiveDate>,
    order: FillOrder,
) -> Vec<WeightDay> {
    let rows: Vec<WeightDay> = entries
        .into_iter()
        .map(|e| WeightDay {
            date: e.date,
            weight_kg: Some(e.weight_kg),
        })
        .collect();
    fill_days(rows, start, end, floor, order, |date, prev| WeightDay {
        date,
        weight_kg: prev.and_then(|p| p.weight_kg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn weight(day: u32, kg: f64) -> WeightEntry {
        WeightEntry {
            id: i64::from(day),
            uuid: String::new(),
            user_id: "u1".to_string(),
            date: d(day),
            weight_kg: kg,
            source: "manual".to_string(),
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_min_allowed_day_is_local_calendar_day() {
        use chrono::{TimeZone, Utc};
        let signup = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
        let floor = min_allowed_day(&signup);
        // Whatever the host timezone, the local day is within one
        // calendar day of the UTC day.
        let utc_day = signup.date_naive();
        assert!(floor >= utc_day - chrono::Duration::days(1));
        assert!(floor <= utc_day + chrono::Duration::days(1));
    }

    #[test]
    fn test_day_span_inclusive() {
        let span = day_span(d(1), d(7), None);
        assert_eq!(span.len(), 7);
        assert_eq!(span[0], d(1));
        assert_eq!(span[6], d(7));
    }

    #[test]
    fn test_day_span_clamped_by_floor() {
        let span = day_span(d(1), d(7), Some(d(4)));
        assert_eq!(span, vec![d(4), d(5), d(6), d(7)]);

        // Floor earlier than start changes nothing
        let span = day_span(d(3), d(5), Some(d(1)));
        assert_eq!(span.len(), 3);

        // Floor past the end empties the span
        assert!(day_span(d(1), d(7), Some(d(8))).is_empty());
    }

    #[test]
    fn test_day_span_inverted_range_is_empty() {
        assert!(day_span(d(7), d(1), None).is_empty());
    }

    #[test]
    fn test_dense_fill_zero_synthesis() {
        // 7-day range with only days 1 and 3 present → 7 results,
        // days 2 and 4-7 zero-valued.
        let fetched = vec![
            MedicationSummary {
                user_id: "u1".to_string(),
                date: d(1),
                med_count: 2,
                supp_count: 0,
            },
            MedicationSummary {
                user_id: "u1".to_string(),
                date: d(3),
                med_count: 1,
                supp_count: 1,
            },
        ];
        let filled = fill_days(fetched, d(1), d(7), None, FillOrder::OldestFirst, |day, _| {
            MedicationSummary::zero("u1", day)
        });
        assert_eq!(filled.len(), 7);
        assert_eq!(filled[0].med_count, 2);
        assert_eq!(filled[1].med_count, 0);
        assert_eq!(filled[2].med_count, 1);
        assert_eq!(filled[2].supp_count, 1);
        for row in &filled[3..] {
            assert_eq!(row.med_count + row.supp_count, 0);
        }
        // Contiguous ascending dates
        for (i, row) in filled.iter().enumerate() {
            assert_eq!(row.date, d(1 + u32::try_from(i).unwrap()));
        }
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let filled = fill_days(
            Vec::<MedicationSummary>::new(),
            d(1),
            d(3),
            None,
            FillOrder::default(),
            |day, _| MedicationSummary::zero("u1", day),
        );
        assert_eq!(filled[0].date, d(3));
        assert_eq!(filled[2].date, d(1));
    }

    #[test]
    fn test_signup_clamp_limits_result_days() {
        // Signup 4 days into a 7-day range → exactly 4 days, none earlier.
        let filled = fill_days(
            Vec::<MedicationSummary>::new(),
            d(1),
            d(7),
            Some(d(4)),
            FillOrder::OldestFirst,
            |day, _| MedicationSummary::zero("u1", day),
        );
        assert_eq!(filled.len(), 4);
        assert!(filled.iter().all(|r| r.date >= d(4)));
    }

    #[test]
    fn test_signup_clamp_drops_fetched_rows_before_floor() {
        let fetched = vec![
            MedicationSummary {
                user_id: "u1".to_string(),
                date: d(2),
                med_count: 3,
                supp_count: 0,
            },
            MedicationSummary {
                user_id: "u1".to_string(),
                date: d(5),
                med_count: 1,
                supp_count: 0,
            },
        ];
        let filled = fill_days(fetched, d(1), d(7), Some(d(4)), FillOrder::OldestFirst, |day, _| {
            MedicationSummary::zero("u1", day)
        });
        assert_eq!(filled.len(), 4);
        assert!(filled.iter().all(|r| r.date >= d(4)));
        assert_eq!(filled.iter().map(|r| r.med_count).sum::<i64>(), 1);
    }

    #[test]
    fn test_weight_forward_fill() {
        let filled = fill_weight_days(
            vec![weight(2, 80.0), weight(5, 79.0)],
            d(1),
            d(7),
            None,
            FillOrder::OldestFirst,
        );
        assert_eq!(filled.len(), 7);
        // Before the first known value: missing marker, never zero
        assert_eq!(filled[0].weight_kg, None);
        assert_eq!(filled[1].weight_kg, Some(80.0));
        // Gap carries the last known value
        assert_eq!(filled[2].weight_kg, Some(80.0));
        assert_eq!(filled[3].weight_kg, Some(80.0));
        assert_eq!(filled[4].weight_kg, Some(79.0));
        assert_eq!(filled[5].weight_kg, Some(79.0));
        assert_eq!(filled[6].weight_kg, Some(79.0));
    }

    #[test]
    fn test_weight_forward_fill_newest_first_order() {
        let filled = fill_weight_days(
            vec![weight(2, 80.0)],
            d(1),
            d(3),
            None,
            FillOrder::NewestFirst,
        );
        assert_eq!(filled[0].date, d(3));
        assert_eq!(filled[0].weight_kg, Some(80.0));
        assert_eq!(filled[2].date, d(1));
        assert_eq!(filled[2].weight_kg, None);
    }

    #[test]
    fn test_weight_all_missing_stays_missing() {
        let filled = fill_weight_days(Vec::new(), d(1), d(3), None, FillOrder::OldestFirst);
        assert!(filled.iter().all(|w| w.weight_kg.is_none()));
    }
}
