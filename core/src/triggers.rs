//! Trigger coordination: reacting to raw-log mutations by recomputing
//! the affected daily summary rows.
//!
//! Each (user, date, domain) triple is an independent consistency unit.
//! The read→recompute→write for one unit runs inside a single store
//! transaction (`Database::with_txn`); nothing here locks across dates
//! or domains. A read that fails aborts the step before any write, so
//! an existing summary row is never deleted on the strength of an
//! incomplete read.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::Database;
use crate::models::Domain;
use crate::recompute::{
    Rollup, recompute_consumed, recompute_exercise, recompute_medication,
};

/// A raw-log mutation notification. `old_date` is set only when an
/// update moved the entry to a different day; inserts and deletes carry
/// just the affected `date`.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub domain: Domain,
    pub user_id: String,
    pub old_date: Option<NaiveDate>,
    pub date: NaiveDate,
}

impl Mutation {
    #[must_use]
    pub fn new(domain: Domain, user_id: &str, date: NaiveDate) -> Self {
        Self {
            domain,
            user_id: user_id.to_string(),
            old_date: None,
            date,
        }
    }

    #[must_use]
    pub fn moved(domain: Domain, user_id: &str, old_date: NaiveDate, date: NaiveDate) -> Self {
        Self {
            domain,
            user_id: user_id.to_string(),
            old_date: (old_date != date).then_some(old_date),
            date,
        }
    }
}

/// Recompute every day touched by a mutation and persist the results.
/// When a date-moved update is involved, the old and new days are
/// recomputed independently — each may appear or disappear on its own.
/// Returns the touched dates so the caller can invalidate cached ranges.
///
/// An empty `user_id` is a precondition failure from callers that run
/// before auth readiness; it is a no-op, not an error.
pub fn refresh_summaries(
    db: &Database,
    mutation: &Mutation,
    now: DateTime<Utc>,
) -> Result<Vec<NaiveDate>> {
    if mutation.user_id.is_empty() {
        return Ok(Vec::new());
    }

    let mut dates = vec![mutation.date];
    if let Some(old) = mutation.old_date {
        if old != mutation.date {
            dates.push(old);
        }
    }

    for &date in &dates {
        refresh_day(db, mutation.domain, &mutation.user_id, date, now)?;
    }

    Ok(dates)
}

/// Recompute one (user, date, domain) from the complete current log set
/// and upsert or delete the summary row accordingly.
pub fn refresh_day(
    db: &Database,
    domain: Domain,
    user_id: &str,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<()> {
    let now_str = now.to_rfc3339();
    match domain {
        Domain::Medication => db.with_txn(|db| {
            let logs = db.medication_logs_for_day(user_id, date)?;
            match recompute_medication(user_id, date, &logs) {
                Rollup::Row(summary) => db.upsert_medication_summary(&summary, &now_str),
                Rollup::Delete => db.delete_medication_summary(user_id, date).map(|_| ()),
            }
        }),
        Domain::Exercise => db.with_txn(|db| {
            let logs = db.exercise_logs_for_day(user_id, date)?;
            match recompute_exercise(user_id, date, &logs) {
                Rollup::Row(summary) => db.upsert_exercise_summary(&summary, &now_str),
                Rollup::Delete => db.delete_exercise_summary(user_id, date).map(|_| ()),
            }
        }),
        Domain::Consumed => db.with_txn(|db| {
            let logs = db.consumed_logs_for_day(user_id, date)?;
            let prior = db.get_consumed_summary(user_id, date)?;
            match recompute_consumed(user_id, date, &logs, prior.as_ref(), now) {
                Rollup::Row(summary) => db.upsert_consumed_summary(&summary, &now_str),
                Rollup::Delete => db.delete_consumed_summary(user_id, date).map(|_| ()),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ExerciseCategory, LogStatus, MedKind, NewConsumedLog, NewExerciseLog, NewMedicationLog,
    };
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 3, 12, 0, 0).unwrap()
    }

    fn med(user: &str, d: u32, kind: MedKind) -> NewMedicationLog {
        NewMedicationLog {
            user_id: user.to_string(),
            date: day(d),
            kind,
        }
    }

    #[test]
    fn test_insert_trigger_creates_summary() {
        let db = Database::open_in_memory().unwrap();
        db.insert_medication_log(&med("u1", 3, MedKind::Med), "t0")
            .unwrap();

        let touched = refresh_summaries(
            &db,
            &Mutation::new(Domain::Medication, "u1", day(3)),
            now(),
        )
        .unwrap();
        assert_eq!(touched, vec![day(3)]);

        let summary = db.get_medication_summary("u1", day(3)).unwrap().unwrap();
        assert_eq!(summary.med_count, 1);
        assert_eq!(summary.supp_count, 0);
    }

    #[test]
    fn test_delete_trigger_removes_row_not_zeroes_it() {
        let db = Database::open_in_memory().unwrap();
        let log = db
            .insert_medication_log(&med("u1", 3, MedKind::Supp), "t0")
            .unwrap();
        refresh_day(&db, Domain::Medication, "u1", day(3), now()).unwrap();
        assert!(db.get_medication_summary("u1", day(3)).unwrap().is_some());

        db.delete_medication_log(log.id).unwrap();
        refresh_summaries(
            &db,
            &Mutation::new(Domain::Medication, "u1", day(3)),
            now(),
        )
        .unwrap();
        assert!(db.get_medication_summary("u1", day(3)).unwrap().is_none());
    }

    #[test]
    fn test_date_move_recomputes_both_days() {
        let db = Database::open_in_memory().unwrap();
        let log = db
            .insert_medication_log(&med("u1", 3, MedKind::Med), "t0")
            .unwrap();
        refresh_day(&db, Domain::Medication, "u1", day(3), now()).unwrap();

        db.update_medication_log(
            log.id,
            &crate::models::UpdateMedicationLog {
                date: Some(day(5)),
                kind: None,
            },
            "t1",
        )
        .unwrap();
        let touched = refresh_summaries(
            &db,
            &Mutation::moved(Domain::Medication, "u1", day(3), day(5)),
            now(),
        )
        .unwrap();
        assert_eq!(touched.len(), 2);

        // Old day disappears, new day appears
        assert!(db.get_medication_summary("u1", day(3)).unwrap().is_none());
        let moved = db.get_medication_summary("u1", day(5)).unwrap().unwrap();
        assert_eq!(moved.med_count, 1);
    }

    #[test]
    fn test_moved_constructor_collapses_same_day() {
        let m = Mutation::moved(Domain::Exercise, "u1", day(3), day(3));
        assert!(m.old_date.is_none());
    }

    #[test]
    fn test_empty_user_is_noop() {
        let db = Database::open_in_memory().unwrap();
        let touched =
            refresh_summaries(&db, &Mutation::new(Domain::Medication, "", day(3)), now()).unwrap();
        assert!(touched.is_empty());
    }

    #[test]
    fn test_exercise_trigger_matches_direct_recompute() {
        let db = Database::open_in_memory().unwrap();
        db.insert_exercise_log(
            &NewExerciseLog {
                user_id: "u1".to_string(),
                date: day(3),
                category: ExerciseCategory::CardioMindBody,
                minutes: Some(30.0),
                distance_km: Some(5.123_456),
            },
            "t0",
        )
        .unwrap();
        db.insert_exercise_log(
            &NewExerciseLog {
                user_id: "u1".to_string(),
                date: day(3),
                category: ExerciseCategory::CardioMindBody,
                minutes: None,
                distance_km: Some(3.789_012),
            },
            "t0",
        )
        .unwrap();
        db.insert_exercise_log(
            &NewExerciseLog {
                user_id: "u1".to_string(),
                date: day(3),
                category: ExerciseCategory::Strength,
                minutes: Some(45.0),
                distance_km: None,
            },
            "t0",
        )
        .unwrap();

        refresh_day(&db, Domain::Exercise, "u1", day(3), now()).unwrap();
        let persisted = db.get_exercise_summary("u1", day(3)).unwrap().unwrap();

        let logs = db.exercise_logs_for_day("u1", day(3)).unwrap();
        let direct = recompute_exercise("u1", day(3), &logs).into_row().unwrap();
        assert_eq!(persisted, direct);
        assert_eq!(persisted.activity_count, 3);
        assert!((persisted.cardio_distance_km - 8.9125).abs() < 1e-9);
    }

    #[test]
    fn test_consumed_trigger_preserves_workflow_across_recomputes() {
        let db = Database::open_in_memory().unwrap();
        let log = db
            .insert_consumed_log(
                &NewConsumedLog {
                    user_id: "u1".to_string(),
                    date: day(3),
                    calories: 400.0,
                    protein_g: 20.0,
                    carbs_g: 30.0,
                    fat_g: 10.0,
                    fibre_g: 0.0,
                    sugar_g: 0.0,
                    saturated_fat_g: 0.0,
                    trans_fat_g: 0.0,
                    sodium_mg: 0.0,
                },
                LogStatus::Unknown,
                "t0",
            )
            .unwrap();
        refresh_day(&db, Domain::Consumed, "u1", day(3), now()).unwrap();
        let first = db.get_consumed_summary("u1", day(3)).unwrap().unwrap();
        assert_eq!(first.created_at, now().to_rfc3339());

        // Removing the only entry zeroes the sums but keeps the row —
        // consumed existence is status-driven.
        db.delete_consumed_log(log.id).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 1, 4, 9, 0, 0).unwrap();
        refresh_day(&db, Domain::Consumed, "u1", day(3), later).unwrap();
        let second = db.get_consumed_summary("u1", day(3)).unwrap().unwrap();
        assert_eq!(second.calories, 0.0);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.log_status, LogStatus::Unknown);
    }

    #[test]
    fn test_trigger_settles_to_direct_recompute_after_churn() {
        // Global invariant: after any mutation sequence, the persisted row
        // equals a fresh recompute over the current logs.
        let db = Database::open_in_memory().unwrap();
        let a = db
            .insert_medication_log(&med("u1", 3, MedKind::Med), "t0")
            .unwrap();
        refresh_day(&db, Domain::Medication, "u1", day(3), now()).unwrap();
        db.insert_medication_log(&med("u1", 3, MedKind::Other), "t1")
            .unwrap();
        refresh_day(&db, Domain::Medication, "u1", day(3), now()).unwrap();
        db.insert_medication_log(&med("u1", 3, MedKind::Supp), "t2")
            .unwrap();
        refresh_day(&db, Domain::Medication, "u1", day(3), now()).unwrap();
        db.delete_medication_log(a.id).unwrap();
        refresh_day(&db, Domain::Medication, "u1", day(3), now()).unwrap();

        let persisted = db.get_medication_summary("u1", day(3)).unwrap().unwrap();
        let logs = db.medication_logs_for_day("u1", day(3)).unwrap();
        let direct = recompute_medication("u1", day(3), &logs)
            .into_row()
            .unwrap();
        assert_eq!(persisted, direct);
        assert_eq!(persisted.med_count, 1); // "other" counted as med
        assert_eq!(persisted.supp_count, 1);
    }
}
