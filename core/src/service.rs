use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::cache::SummaryCaches;
use crate::db::Database;
use crate::fill::{self, FillOrder};
use crate::import::{self, FoodImportSummary};
use crate::models::{
    ConsumedLog, ConsumedSummary, Domain, ExerciseLog, ExerciseSummary, LogStatus, MedicationLog,
    MedicationSummary, NewConsumedLog, NewExerciseLog, NewMedicationLog, NewWeightEntry,
    UpdateConsumedLog, UpdateExerciseLog, UpdateMedicationLog, WeightDay, WeightEntry,
    validate_new_exercise, validate_user_id, validate_weight,
};
use crate::triggers::{self, Mutation};

/// Data-access layer: owns the log store and the range-query caches.
///
/// Every raw-log mutation runs the trigger coordinator and then evicts
/// exactly the cached ranges covering the touched days. History reads
/// go through the cache and come back dense.
///
/// All timestamps are explicit parameters — nothing in here reads
/// ambient time, so every path is deterministic under test.
pub struct VitalsService {
    db: Database,
    caches: SummaryCaches,
}

impl VitalsService {
    pub fn new(db_path: &str) -> Result<Self> {
        let db = Database::open(Path::new(db_path))?;
        Ok(Self {
            db,
            caches: SummaryCaches::new(),
        })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db,
            caches: SummaryCaches::new(),
        })
    }

    #[must_use]
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Refresh summaries for a mutation and evict the covering cached
    /// ranges. The raw write has already succeeded by the time this
    /// runs; a refresh failure leaves a stale summary that the next
    /// trigger recomputes, so it is logged and swallowed rather than
    /// surfaced as a fault. The eviction still happens either way.
    fn after_mutation(&mut self, mutation: &Mutation, now: DateTime<Utc>) {
        if let Err(error) = triggers::refresh_summaries(&self.db, mutation, now) {
            tracing::warn!(
                domain = mutation.domain.as_str(),
                user_id = %mutation.user_id,
                %error,
                "summary refresh failed; will converge on next trigger"
            );
        }
        self.caches
            .invalidate_for_date(mutation.domain, &mutation.user_id, mutation.date);
        if let Some(old) = mutation.old_date {
            self.caches
                .invalidate_for_date(mutation.domain, &mutation.user_id, old);
        }
    }

    // --- Medication ---

    pub fn log_medication(
        &mut self,
        entry: &NewMedicationLog,
        now: DateTime<Utc>,
    ) -> Result<MedicationLog> {
        validate_user_id(&entry.user_id)?;
        let log = self.db.insert_medication_log(entry, &now.to_rfc3339())?;
        self.after_mutation(
            &Mutation::new(Domain::Medication, &log.user_id, log.date),
            now,
        );
        Ok(log)
    }

    pub fn update_medication(
        &mut self,
        id: i64,
        update: &UpdateMedicationLog,
        now: DateTime<Utc>,
    ) -> Result<MedicationLog> {
        let old = self
            .db
            .find_medication_log(id)?
            .context("Medication log not found")?;
        let log = self
            .db
            .update_medication_log(id, update, &now.to_rfc3339())?;
        self.after_mutation(
            &Mutation::moved(Domain::Medication, &log.user_id, old.date, log.date),
            now,
        );
        Ok(log)
    }

    pub fn delete_medication(&mut self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let Some(old) = self.db.find_medication_log(id)? else {
            return Ok(false);
        };
        let deleted = self.db.delete_medication_log(id)?;
        if deleted {
            self.after_mutation(
                &Mutation::new(Domain::Medication, &old.user_id, old.date),
                now,
            );
        }
        Ok(deleted)
    }

    pub fn medication_logs_for_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<MedicationLog>> {
        self.db.medication_logs_for_day(user_id, date)
    }

    // --- Exercise ---

    pub fn log_exercise(
        &mut self,
        entry: &NewExerciseLog,
        now: DateTime<Utc>,
    ) -> Result<ExerciseLog> {
        validate_user_id(&entry.user_id)?;
        validate_new_exercise(entry.minutes, entry.distance_km)?;
        let log = self.db.insert_exercise_log(entry, &now.to_rfc3339())?;
        self.after_mutation(
            &Mutation::new(Domain::Exercise, &log.user_id, log.date),
            now,
        );
        Ok(log)
    }

    pub fn update_exercise(
        &mut self,
        id: i64,
        update: &UpdateExerciseLog,
        now: DateTime<Utc>,
    ) -> Result<ExerciseLog> {
        validate_new_exercise(update.minutes.flatten(), update.distance_km.flatten())?;
        let old = self
            .db
            .find_exercise_log(id)?
            .context("Exercise log not found")?;
        let log = self.db.update_exercise_log(id, update, &now.to_rfc3339())?;
        self.after_mutation(
            &Mutation::moved(Domain::Exercise, &log.user_id, old.date, log.date),
            now,
        );
        Ok(log)
    }

    pub fn delete_exercise(&mut self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let Some(old) = self.db.find_exercise_log(id)? else {
            return Ok(false);
        };
        let deleted = self.db.delete_exercise_log(id)?;
        if deleted {
            self.after_mutation(
                &Mutation::new(Domain::Exercise, &old.user_id, old.date),
                now,
            );
        }
        Ok(deleted)
    }

    pub fn exercise_logs_for_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ExerciseLog>> {
        self.db.exercise_logs_for_day(user_id, date)
    }

    // --- Consumed ---

    pub fn log_consumed(
        &mut self,
        entry: &NewConsumedLog,
        now: DateTime<Utc>,
    ) -> Result<ConsumedLog> {
        validate_user_id(&entry.user_id)?;
        // Each entry snapshots the day's current workflow status.
        let status = self
            .db
            .get_consumed_summary(&entry.user_id, entry.date)?
            .map_or(LogStatus::Unknown, |s| s.log_status);
        let log = self
            .db
            .insert_consumed_log(entry, status, &now.to_rfc3339())?;
        self.after_mutation(
            &Mutation::new(Domain::Consumed, &log.user_id, log.date),
            now,
        );
        Ok(log)
    }

    pub fn update_consumed(
        &mut self,
        id: i64,
        update: &UpdateConsumedLog,
        now: DateTime<Utc>,
    ) -> Result<ConsumedLog> {
        let old = self
            .db
            .find_consumed_log(id)?
            .context("Consumed log not found")?;
        let log = self.db.update_consumed_log(id, update, &now.to_rfc3339())?;
        self.after_mutation(
            &Mutation::moved(Domain::Consumed, &log.user_id, old.date, log.date),
            now,
        );
        Ok(log)
    }

    pub fn delete_consumed(&mut self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let Some(old) = self.db.find_consumed_log(id)? else {
            return Ok(false);
        };
        let deleted = self.db.delete_consumed_log(id)?;
        if deleted {
            self.after_mutation(
                &Mutation::new(Domain::Consumed, &old.user_id, old.date),
                now,
            );
        }
        Ok(deleted)
    }

    pub fn consumed_logs_for_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ConsumedLog>> {
        self.db.consumed_logs_for_day(user_id, date)
    }

    /// Authoritative day-status transition for food logging.
    ///
    /// Recomputes the row from the current logs, applies the new status,
    /// and stamps `completed_at` on the first transition into
    /// `completed`. `created_at` is fixed at first touch.
    pub fn set_consumed_status(
        &mut self,
        user_id: &str,
        date: NaiveDate,
        status: LogStatus,
        now: DateTime<Utc>,
    ) -> Result<ConsumedSummary> {
        validate_user_id(user_id)?;
        let now_str = now.to_rfc3339();
        let row = self.db.with_txn(|db| {
            let logs = db.consumed_logs_for_day(user_id, date)?;
            let prior = db.get_consumed_summary(user_id, date)?;
            let mut row = crate::recompute::recompute_consumed(
                user_id,
                date,
                &logs,
                prior.as_ref(),
                now,
            )
            .into_row()
            .unwrap_or_else(|| {
                // Untouched day: setting a status is the first touch.
                let mut fresh = ConsumedSummary::zero(user_id, date);
                fresh.created_at = now_str.clone();
                fresh
            });
            if status.is_terminal() && !row.log_status.is_terminal() {
                row.completed_at = Some(now_str.clone());
            }
            row.log_status = status;
            db.upsert_consumed_summary(&row, &now_str)?;
            Ok(row)
        })?;
        self.caches
            .invalidate_for_date(Domain::Consumed, user_id, date);
        Ok(row)
    }

    // --- Dense history reads (cache-aside, degrade to empty) ---

    pub fn medication_history(
        &mut self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        floor: Option<NaiveDate>,
        order: FillOrder,
    ) -> Vec<MedicationSummary> {
        let Some((start, end)) = clamp_range(user_id, start, end, floor) else {
            return Vec::new();
        };
        let rows = if let Some(hit) = self.caches.medication.get(user_id, start, end) {
            hit.to_vec()
        } else {
            match self.db.medication_summaries_in_range(user_id, start, end) {
                Ok(rows) => {
                    self.caches.medication.put(user_id, start, end, rows.clone());
                    rows
                }
                Err(error) => {
                    tracing::warn!(%user_id, %error, "medication range read failed; returning empty");
                    return Vec::new();
                }
            }
        };
        fill::fill_days(rows, start, end, None, order, |day, _| {
            MedicationSummary::zero(user_id, day)
        })
    }

    pub fn exercise_history(
        &mut self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        floor: Option<NaiveDate>,
        order: FillOrder,
    ) -> Vec<ExerciseSummary> {
        let Some((start, end)) = clamp_range(user_id, start, end, floor) else {
            return Vec::new();
        };
        let rows = if let Some(hit) = self.caches.exercise.get(user_id, start, end) {
            hit.to_vec()
        } else {
            match self.db.exercise_summaries_in_range(user_id, start, end) {
                Ok(rows) => {
                    self.caches.exercise.put(user_id, start, end, rows.clone());
                    rows
                }
                Err(error) => {
                    tracing::warn!(%user_id, %error, "exercise range read failed; returning empty");
                    return Vec::new();
                }
            }
        };
        fill::fill_days(rows, start, end, None, order, |day, _| {
            ExerciseSummary::zero(user_id, day)
        })
    }

    pub fn consumed_history(
        &mut self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        floor: Option<NaiveDate>,
        order: FillOrder,
    ) -> Vec<ConsumedSummary> {
        let Some((start, end)) = clamp_range(user_id, start, end, floor) else {
            return Vec::new();
        };
        let rows = if let Some(hit) = self.caches.consumed.get(user_id, start, end) {
            hit.to_vec()
        } else {
            match self.db.consumed_summaries_in_range(user_id, start, end) {
                Ok(rows) => {
                    self.caches.consumed.put(user_id, start, end, rows.clone());
                    rows
                }
                Err(error) => {
                    tracing::warn!(%user_id, %error, "consumed range read failed; returning empty");
                    return Vec::new();
                }
            }
        };
        fill::fill_days(rows, start, end, None, order, |day, _| {
            ConsumedSummary::zero(user_id, day)
        })
    }

    // --- Weight ---

    pub fn log_weight(&mut self, entry: &NewWeightEntry, now: DateTime<Utc>) -> Result<WeightEntry> {
        validate_user_id(&entry.user_id)?;
        validate_weight(entry.weight_kg)?;
        self.db.upsert_weight(entry, &now.to_rfc3339())
    }

    pub fn get_weight(&self, user_id: &str, date: NaiveDate) -> Result<Option<WeightEntry>> {
        self.db.get_weight(user_id, date)
    }

    pub fn delete_weight(&mut self, id: i64) -> Result<bool> {
        self.db.delete_weight(id)
    }

    /// Dense weight series over the range: forward-filled, clamped at
    /// the signup floor, missing marker before the first known value.
    pub fn weight_history(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        floor: Option<NaiveDate>,
        order: FillOrder,
    ) -> Vec<WeightDay> {
        let Some((start, end)) = clamp_range(user_id, start, end, floor) else {
            return Vec::new();
        };
        match self.db.weight_in_range(user_id, start, end) {
            Ok(entries) => fill::fill_weight_days(entries, start, end, None, order),
            Err(error) => {
                tracing::warn!(%user_id, %error, "weight range read failed; returning empty");
                Vec::new()
            }
        }
    }

    // --- History import ---

    pub fn import_food_csv(
        &mut self,
        user_id: &str,
        csv_data: &str,
        dry_run: bool,
        now: DateTime<Utc>,
    ) -> Result<FoodImportSummary> {
        validate_user_id(user_id)?;
        let rows = import::parse_food_csv(csv_data.as_bytes())?;
        let summary = import::import_food_history(&self.db, user_id, &rows, dry_run, now)?;
        if !dry_run {
            for &date in &summary.dates {
                self.caches
                    .invalidate_for_date(Domain::Consumed, user_id, date);
            }
        }
        Ok(summary)
    }
}

/// Shared read-path guard: empty user or an empty clamped range means
/// "no data", not an error — callers hit these before auth/data
/// readiness. Returns the clamped inclusive bounds.
fn clamp_range(
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    floor: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    if user_id.is_empty() {
        return None;
    }
    let start = match floor {
        Some(floor) if floor > start => floor,
        _ => start,
    };
    if start > end {
        return None;
    }
    Some((start, end))
}
