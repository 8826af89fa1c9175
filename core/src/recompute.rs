//! Total recomputation of daily summary rows from raw logs.
//!
//! Every function here is pure: it derives the summary for one
//! (user, date) from the complete current log set, never from a delta.
//! That makes the trigger path self-healing — whichever concurrent write
//! lands last still reflects a correct recomputation of some valid
//! state, and the next mutation converges on the truth.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{
    ConsumedLog, ConsumedSummary, ExerciseCategory, ExerciseLog, ExerciseSummary, LogStatus,
    MedKind, MedicationLog, MedicationSummary,
};

/// Result of a recompute: a row to upsert, or the delete sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Rollup<T> {
    Row(T),
    Delete,
}

impl<T> Rollup<T> {
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Rollup::Delete)
    }

    #[must_use]
    pub fn into_row(self) -> Option<T> {
        match self {
            Rollup::Row(row) => Some(row),
            Rollup::Delete => None,
        }
    }
}

/// Round to 4 decimal places. Applied after summation, never per-entry.
#[must_use]
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// A medication summary exists iff at least one count is nonzero.
/// Legacy `other` entries count as `med`.
#[must_use]
pub fn recompute_medication(
    user_id: &str,
    date: NaiveDate,
    logs: &[MedicationLog],
) -> Rollup<MedicationSummary> {
    let mut med_count: i64 = 0;
    let mut supp_count: i64 = 0;
    for log in logs {
        match log.kind {
            MedKind::Med | MedKind::Other => med_count += 1,
            MedKind::Supp => supp_count += 1,
        }
    }

    if med_count == 0 && supp_count == 0 {
        return Rollup::Delete;
    }

    Rollup::Row(MedicationSummary {
        user_id: user_id.to_string(),
        date,
        med_count,
        supp_count,
    })
}

/// An exercise summary exists iff the day has at least one activity.
/// Cardio minutes/distance coalesce null to 0 before summing, and the
/// distance total is rounded to 4 dp after the sum.
#[must_use]
pub fn recompute_exercise(
    user_id: &str,
    date: NaiveDate,
    logs: &[ExerciseLog],
) -> Rollup<ExerciseSummary> {
    if logs.is_empty() {
        return Rollup::Delete;
    }

    let mut cardio_count: i64 = 0;
    let mut strength_count: i64 = 0;
    let mut cardio_minutes = 0.0;
    let mut cardio_distance_km = 0.0;
    for log in logs {
        match log.category {
            ExerciseCategory::CardioMindBody => {
                cardio_count += 1;
                cardio_minutes += log.minutes.unwrap_or(0.0);
                cardio_distance_km += log.distance_km.unwrap_or(0.0);
            }
            ExerciseCategory::Strength => strength_count += 1,
        }
    }

    Rollup::Row(ExerciseSummary {
        user_id: user_id.to_string(),
        date,
        activity_count: cardio_count + strength_count,
        cardio_count,
        cardio_minutes,
        cardio_distance_km: round4(cardio_distance_km),
        strength_count,
    })
}

/// Consumed rows are the exception to the nonzero-sum rule: existence is
/// governed by the status workflow. The nutrition sums are derived from
/// the logs; `log_status`, `created_at`, and `completed_at` are carried
/// through from the prior row unchanged (a fresh row starts `unknown`
/// with `created_at = now`). The delete sentinel is returned only when
/// there is neither a prior row nor any log — nothing ever touched the
/// day.
#[must_use]
pub fn recompute_consumed(
    user_id: &str,
    date: NaiveDate,
    logs: &[ConsumedLog],
    prior: Option<&ConsumedSummary>,
    now: DateTime<Utc>,
) -> Rollup<ConsumedSummary> {
    if logs.is_empty() && prior.is_none() {
        return Rollup::Delete;
    }

    let mut row = ConsumedSummary::zero(user_id, date);
    for log in logs {
        row.calories += log.calories;
        row.protein_g += log.protein_g;
        row.carbs_g += log.carbs_g;
        row.fat_g += log.fat_g;
        row.fibre_g += log.fibre_g;
        row.sugar_g += log.sugar_g;
        row.saturated_fat_g += log.saturated_fat_g;
        row.trans_fat_g += log.trans_fat_g;
        row.sodium_mg += log.sodium_mg;
    }

    match prior {
        Some(prev) => {
            row.log_status = prev.log_status;
            row.created_at = prev.created_at.clone();
            row.completed_at = prev.completed_at.clone();
        }
        None => {
            row.log_status = LogStatus::Unknown;
            row.created_at = now.to_rfc3339();
        }
    }

    Rollup::Row(row)
}
