use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::models::{
    ConsumedLog, ConsumedSummary, ExerciseCategory, ExerciseLog, ExerciseSummary, LogStatus,
    MedKind, MedicationLog, MedicationSummary, NewConsumedLog, NewExerciseLog, NewMedicationLog,
    NewWeightEntry, UpdateConsumedLog, UpdateExerciseLog, UpdateMedicationLog, WeightEntry,
};

pub struct Database {
    conn: Connection,
}

fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date"))
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS medication_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS exercise_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    category TEXT NOT NULL,
                    minutes REAL,
                    distance_km REAL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS consumed_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    calories REAL NOT NULL DEFAULT 0,
                    protein_g REAL NOT NULL DEFAULT 0,
                    carbs_g REAL NOT NULL DEFAULT 0,
                    fat_g REAL NOT NULL DEFAULT 0,
                    fibre_g REAL NOT NULL DEFAULT 0,
                    sugar_g REAL NOT NULL DEFAULT 0,
                    saturated_fat_g REAL NOT NULL DEFAULT 0,
                    trans_fat_g REAL NOT NULL DEFAULT 0,
                    sodium_mg REAL NOT NULL DEFAULT 0,
                    log_status TEXT NOT NULL DEFAULT 'unknown',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS medication_summaries (
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    med_count INTEGER NOT NULL,
                    supp_count INTEGER NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, date)
                );

                CREATE TABLE IF NOT EXISTS exercise_summaries (
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    activity_count INTEGER NOT NULL,
                    cardio_count INTEGER NOT NULL,
                    cardio_minutes REAL NOT NULL,
                    cardio_distance_km REAL NOT NULL,
                    strength_count INTEGER NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, date)
                );

                CREATE TABLE IF NOT EXISTS consumed_summaries (
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    calories REAL NOT NULL DEFAULT 0,
                    protein_g REAL NOT NULL DEFAULT 0,
                    carbs_g REAL NOT NULL DEFAULT 0,
                    fat_g REAL NOT NULL DEFAULT 0,
                    fibre_g REAL NOT NULL DEFAULT 0,
                    sugar_g REAL NOT NULL DEFAULT 0,
                    saturated_fat_g REAL NOT NULL DEFAULT 0,
                    trans_fat_g REAL NOT NULL DEFAULT 0,
                    sodium_mg REAL NOT NULL DEFAULT 0,
                    log_status TEXT NOT NULL DEFAULT 'unknown',
                    created_at TEXT NOT NULL,
                    completed_at TEXT,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, date)
                );

                CREATE INDEX IF NOT EXISTS idx_medication_logs_user_date ON medication_logs(user_id, date);
                CREATE INDEX IF NOT EXISTS idx_exercise_logs_user_date ON exercise_logs(user_id, date);
                CREATE INDEX IF NOT EXISTS idx_consumed_logs_user_date ON consumed_logs(user_id, date);
                CREATE UNIQUE INDEX IF NOT EXISTS idx_medication_logs_uuid ON medication_logs(uuid);
                CREATE UNIQUE INDEX IF NOT EXISTS idx_exercise_logs_uuid ON exercise_logs(uuid);
                CREATE UNIQUE INDEX IF NOT EXISTS idx_consumed_logs_uuid ON consumed_logs(uuid);

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS weight_entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    weight_kg REAL NOT NULL,
                    source TEXT NOT NULL DEFAULT 'manual',
                    notes TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE (user_id, date)
                );

                PRAGMA user_version = 2;",
            )?;
        }

        Ok(())
    }

    /// Run `f` inside a single transaction. The trigger coordinator wraps
    /// each read→recompute→write in this so the store serializes the
    /// sequence per row; any error rolls the whole step back.
    pub fn with_txn<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Read a numeric column that may arrive as REAL, INTEGER, or a
    /// string-encoded decimal. Everything past this boundary sees typed
    /// numerics only.
    #[allow(clippy::cast_precision_loss)]
    fn numeric(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<f64> {
        match row.get_ref(idx)? {
            ValueRef::Null => Ok(0.0),
            ValueRef::Integer(i) => Ok(i as f64),
            ValueRef::Real(r) => Ok(r),
            ValueRef::Text(t) => {
                let s = std::str::from_utf8(t).map_err(rusqlite::Error::Utf8Error)?;
                s.trim().parse::<f64>().map_err(|_| {
                    rusqlite::Error::InvalidColumnType(idx, "numeric".to_string(), Type::Text)
                })
            }
            ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
                idx,
                "numeric".to_string(),
                Type::Blob,
            )),
        }
    }

    // --- Row mapping helpers ---

    fn medication_log_from_row(row: &rusqlite::Row) -> rusqlite::Result<MedicationLog> {
        let date: String = row.get(3)?;
        let kind: String = row.get(4)?;
        Ok(MedicationLog {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            date: parse_date(&date),
            kind: MedKind::parse(&kind).unwrap_or(MedKind::Other),
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn exercise_log_from_row(row: &rusqlite::Row) -> rusqlite::Result<ExerciseLog> {
        let date: String = row.get(3)?;
        let category: String = row.get(4)?;
        Ok(ExerciseLog {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            date: parse_date(&date),
            category: ExerciseCategory::parse(&category).unwrap_or(ExerciseCategory::Strength),
            minutes: row.get(5)?,
            distance_km: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn consumed_log_from_row(row: &rusqlite::Row) -> rusqlite::Result<ConsumedLog> {
        let date: String = row.get(3)?;
        let status: String = row.get(13)?;
        Ok(ConsumedLog {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            date: parse_date(&date),
            calories: Self::numeric(row, 4)?,
            protein_g: Self::numeric(row, 5)?,
            carbs_g: Self::numeric(row, 6)?,
            fat_g: Self::numeric(row, 7)?,
            fibre_g: Self::numeric(row, 8)?,
            sugar_g: Self::numeric(row, 9)?,
            saturated_fat_g: Self::numeric(row, 10)?,
            trans_fat_g: Self::numeric(row, 11)?,
            sodium_mg: Self::numeric(row, 12)?,
            log_status: LogStatus::parse(&status).unwrap_or(LogStatus::Unknown),
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }

    fn medication_summary_from_row(row: &rusqlite::Row) -> rusqlite::Result<MedicationSummary> {
        let date: String = row.get(1)?;
        Ok(MedicationSummary {
            user_id: row.get(0)?,
            date: parse_date(&date),
            med_count: row.get(2)?,
            supp_count: row.get(3)?,
        })
    }

    fn exercise_summary_from_row(row: &rusqlite::Row) -> rusqlite::Result<ExerciseSummary> {
        let date: String = row.get(1)?;
        Ok(ExerciseSummary {
            user_id: row.get(0)?,
            date: parse_date(&date),
            activity_count: row.get(2)?,
            cardio_count: row.get(3)?,
            cardio_minutes: Self::numeric(row, 4)?,
            cardio_distance_km: Self::numeric(row, 5)?,
            strength_count: row.get(6)?,
        })
    }

    fn consumed_summary_from_row(row: &rusqlite::Row) -> rusqlite::Result<ConsumedSummary> {
        let date: String = row.get(1)?;
        let status: String = row.get(11)?;
        Ok(ConsumedSummary {
            user_id: row.get(0)?,
            date: parse_date(&date),
            calories: Self::numeric(row, 2)?,
            protein_g: Self::numeric(row, 3)?,
            carbs_g: Self::numeric(row, 4)?,
            fat_g: Self::numeric(row, 5)?,
            fibre_g: Self::numeric(row, 6)?,
            sugar_g: Self::numeric(row, 7)?,
            saturated_fat_g: Self::numeric(row, 8)?,
            trans_fat_g: Self::numeric(row, 9)?,
            sodium_mg: Self::numeric(row, 10)?,
            log_status: LogStatus::parse(&status).unwrap_or(LogStatus::Unknown),
            created_at: row.get(12)?,
            completed_at: row.get(13)?,
        })
    }

    fn weight_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<WeightEntry> {
        let date: String = row.get(3)?;
        Ok(WeightEntry {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            date: parse_date(&date),
            weight_kg: Self::numeric(row, 4)?,
            source: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    // --- Medication logs ---

    pub fn insert_medication_log(
        &self,
        entry: &NewMedicationLog,
        now: &str,
    ) -> Result<MedicationLog> {
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO medication_logs (uuid, user_id, date, kind, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                uuid,
                entry.user_id,
                date_str(entry.date),
                entry.kind.as_str(),
                now,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.find_medication_log(id)?
            .context("Medication log not found after insert")
    }

    pub fn find_medication_log(&self, id: i64) -> Result<Option<MedicationLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, date, kind, created_at, updated_at
             FROM medication_logs WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::medication_log_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn update_medication_log(
        &self,
        id: i64,
        update: &UpdateMedicationLog,
        now: &str,
    ) -> Result<MedicationLog> {
        let current = self
            .find_medication_log(id)?
            .context("Medication log not found")?;
        let date = update.date.unwrap_or(current.date);
        let kind = update.kind.unwrap_or(current.kind);
        self.conn.execute(
            "UPDATE medication_logs SET date = ?1, kind = ?2, updated_at = ?3 WHERE id = ?4",
            params![date_str(date), kind.as_str(), now, id],
        )?;
        self.find_medication_log(id)?
            .context("Medication log not found")
    }

    pub fn delete_medication_log(&self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM medication_logs WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    pub fn medication_logs_for_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<MedicationLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, date, kind, created_at, updated_at
             FROM medication_logs WHERE user_id = ?1 AND date = ?2 ORDER BY id",
        )?;
        let logs = stmt
            .query_map(
                params![user_id, date_str(date)],
                Self::medication_log_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    // --- Exercise logs ---

    pub fn insert_exercise_log(&self, entry: &NewExerciseLog, now: &str) -> Result<ExerciseLog> {
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO exercise_logs (uuid, user_id, date, category, minutes, distance_km, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                uuid,
                entry.user_id,
                date_str(entry.date),
                entry.category.as_str(),
                entry.minutes,
                entry.distance_km,
                now,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.find_exercise_log(id)?
            .context("Exercise log not found after insert")
    }

    pub fn find_exercise_log(&self, id: i64) -> Result<Option<ExerciseLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, date, category, minutes, distance_km, created_at, updated_at
             FROM exercise_logs WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::exercise_log_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn update_exercise_log(
        &self,
        id: i64,
        update: &UpdateExerciseLog,
        now: &str,
    ) -> Result<ExerciseLog> {
        let current = self
            .find_exercise_log(id)?
            .context("Exercise log not found")?;
        let date = update.date.unwrap_or(current.date);
        let category = update.category.unwrap_or(current.category);
        let minutes = update.minutes.unwrap_or(current.minutes);
        let distance_km = update.distance_km.unwrap_or(current.distance_km);
        self.conn.execute(
            "UPDATE exercise_logs SET date = ?1, category = ?2, minutes = ?3, distance_km = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                date_str(date),
                category.as_str(),
                minutes,
                distance_km,
                now,
                id
            ],
        )?;
        self.find_exercise_log(id)?.context("Exercise log not found")
    }

    pub fn delete_exercise_log(&self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM exercise_logs WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    pub fn exercise_logs_for_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ExerciseLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, date, category, minutes, distance_km, created_at, updated_at
             FROM exercise_logs WHERE user_id = ?1 AND date = ?2 ORDER BY id",
        )?;
        let logs = stmt
            .query_map(
                params![user_id, date_str(date)],
                Self::exercise_log_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    // --- Consumed logs ---

    pub fn insert_consumed_log(
        &self,
        entry: &NewConsumedLog,
        status: LogStatus,
        now: &str,
    ) -> Result<ConsumedLog> {
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO consumed_logs (uuid, user_id, date, calories, protein_g, carbs_g, fat_g,
                                        fibre_g, sugar_g, saturated_fat_g, trans_fat_g, sodium_mg,
                                        log_status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                uuid,
                entry.user_id,
                date_str(entry.date),
                entry.calories,
                entry.protein_g,
                entry.carbs_g,
                entry.fat_g,
                entry.fibre_g,
                entry.sugar_g,
                entry.saturated_fat_g,
                entry.trans_fat_g,
                entry.sodium_mg,
                status.as_str(),
                now,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.find_consumed_log(id)?
            .context("Consumed log not found after insert")
    }

    pub fn find_consumed_log(&self, id: i64) -> Result<Option<ConsumedLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, date, calories, protein_g, carbs_g, fat_g, fibre_g,
                    sugar_g, saturated_fat_g, trans_fat_g, sodium_mg, log_status, created_at, updated_at
             FROM consumed_logs WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::consumed_log_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn update_consumed_log(
        &self,
        id: i64,
        update: &UpdateConsumedLog,
        now: &str,
    ) -> Result<ConsumedLog> {
        let current = self
            .find_consumed_log(id)?
            .context("Consumed log not found")?;
        let date = update.date.unwrap_or(current.date);
        self.conn.execute(
            "UPDATE consumed_logs SET date = ?1, calories = ?2, protein_g = ?3, carbs_g = ?4,
                    fat_g = ?5, fibre_g = ?6, sugar_g = ?7, saturated_fat_g = ?8, trans_fat_g = ?9,
                    sodium_mg = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                date_str(date),
                update.calories.unwrap_or(current.calories),
                update.protein_g.unwrap_or(current.protein_g),
                update.carbs_g.unwrap_or(current.carbs_g),
                update.fat_g.unwrap_or(current.fat_g),
                update.fibre_g.unwrap_or(current.fibre_g),
                update.sugar_g.unwrap_or(current.sugar_g),
                update.saturated_fat_g.unwrap_or(current.saturated_fat_g),
                update.trans_fat_g.unwrap_or(current.trans_fat_g),
                update.sodium_mg.unwrap_or(current.sodium_mg),
                now,
                id,
            ],
        )?;
        self.find_consumed_log(id)?.context("Consumed log not found")
    }

    pub fn delete_consumed_log(&self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM consumed_logs WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    pub fn consumed_logs_for_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ConsumedLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, date, calories, protein_g, carbs_g, fat_g, fibre_g,
                    sugar_g, saturated_fat_g, trans_fat_g, sodium_mg, log_status, created_at, updated_at
             FROM consumed_logs WHERE user_id = ?1 AND date = ?2 ORDER BY id",
        )?;
        let logs = stmt
            .query_map(
                params![user_id, date_str(date)],
                Self::consumed_log_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    // --- Medication summaries ---

    pub fn get_medication_summary(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<MedicationSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, date, med_count, supp_count
             FROM medication_summaries WHERE user_id = ?1 AND date = ?2",
        )?;
        let mut rows = stmt.query(params![user_id, date_str(date)])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::medication_summary_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn upsert_medication_summary(&self, summary: &MedicationSummary, now: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO medication_summaries (user_id, date, med_count, supp_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id, date) DO UPDATE SET
                 med_count = excluded.med_count,
                 supp_count = excluded.supp_count,
                 updated_at = excluded.updated_at",
            params![
                summary.user_id,
                date_str(summary.date),
                summary.med_count,
                summary.supp_count,
                now,
            ],
        )?;
        Ok(())
    }

    pub fn delete_medication_summary(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM medication_summaries WHERE user_id = ?1 AND date = ?2",
            params![user_id, date_str(date)],
        )?;
        Ok(n > 0)
    }

    pub fn medication_summaries_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MedicationSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, date, med_count, supp_count
             FROM medication_summaries
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date",
        )?;
        let rows = stmt
            .query_map(
                params![user_id, date_str(start), date_str(end)],
                Self::medication_summary_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // --- Exercise summaries ---

    pub fn get_exercise_summary(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ExerciseSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, date, activity_count, cardio_count, cardio_minutes,
                    cardio_distance_km, strength_count
             FROM exercise_summaries WHERE user_id = ?1 AND date = ?2",
        )?;
        let mut rows = stmt.query(params![user_id, date_str(date)])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::exercise_summary_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn upsert_exercise_summary(&self, summary: &ExerciseSummary, now: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO exercise_summaries (user_id, date, activity_count, cardio_count,
                                             cardio_minutes, cardio_distance_km, strength_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (user_id, date) DO UPDATE SET
                 activity_count = excluded.activity_count,
                 cardio_count = excluded.cardio_count,
                 cardio_minutes = excluded.cardio_minutes,
                 cardio_distance_km = excluded.cardio_distance_km,
                 strength_count = excluded.strength_count,
                 updated_at = excluded.updated_at",
            params![
                summary.user_id,
                date_str(summary.date),
                summary.activity_count,
                summary.cardio_count,
                summary.cardio_minutes,
                summary.cardio_distance_km,
                summary.strength_count,
                now,
            ],
        )?;
        Ok(())
    }

    pub fn delete_exercise_summary(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM exercise_summaries WHERE user_id = ?1 AND date = ?2",
            params![user_id, date_str(date)],
        )?;
        Ok(n > 0)
    }

    pub fn exercise_summaries_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExerciseSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, date, activity_count, cardio_count, cardio_minutes,
                    cardio_distance_km, strength_count
             FROM exercise_summaries
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date",
        )?;
        let rows = stmt
            .query_map(
                params![user_id, date_str(start), date_str(end)],
                Self::exercise_summary_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // --- Consumed summaries ---

    pub fn get_consumed_summary(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ConsumedSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, date, calories, protein_g, carbs_g, fat_g, fibre_g, sugar_g,
                    saturated_fat_g, trans_fat_g, sodium_mg, log_status, created_at, completed_at
             FROM consumed_summaries WHERE user_id = ?1 AND date = ?2",
        )?;
        let mut rows = stmt.query(params![user_id, date_str(date)])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::consumed_summary_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// `created_at` is written on first insert and never updated after —
    /// first touch fixes it for the life of the row.
    pub fn upsert_consumed_summary(&self, summary: &ConsumedSummary, now: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO consumed_summaries (user_id, date, calories, protein_g, carbs_g, fat_g,
                                             fibre_g, sugar_g, saturated_fat_g, trans_fat_g,
                                             sodium_mg, log_status, created_at, completed_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT (user_id, date) DO UPDATE SET
                 calories = excluded.calories,
                 protein_g = excluded.protein_g,
                 carbs_g = excluded.carbs_g,
                 fat_g = excluded.fat_g,
                 fibre_g = excluded.fibre_g,
                 sugar_g = excluded.sugar_g,
                 saturated_fat_g = excluded.saturated_fat_g,
                 trans_fat_g = excluded.trans_fat_g,
                 sodium_mg = excluded.sodium_mg,
                 log_status = excluded.log_status,
                 completed_at = excluded.completed_at,
                 updated_at = excluded.updated_at",
            params![
                summary.user_id,
                date_str(summary.date),
                summary.calories,
                summary.protein_g,
                summary.carbs_g,
                summary.fat_g,
                summary.fibre_g,
                summary.sugar_g,
                summary.saturated_fat_g,
                summary.trans_fat_g,
                summary.sodium_mg,
                summary.log_status.as_str(),
                summary.created_at,
                summary.completed_at,
                now,
            ],
        )?;
        Ok(())
    }

    pub fn delete_consumed_summary(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM consumed_summaries WHERE user_id = ?1 AND date = ?2",
            params![user_id, date_str(date)],
        )?;
        Ok(n > 0)
    }

    pub fn consumed_summaries_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConsumedSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, date, calories, protein_g, carbs_g, fat_g, fibre_g, sugar_g,
                    saturated_fat_g, trans_fat_g, sodium_mg, log_status, created_at, completed_at
             FROM consumed_summaries
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date",
        )?;
        let rows = stmt
            .query_map(
                params![user_id, date_str(start), date_str(end)],
                Self::consumed_summary_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // --- Weight entries ---

    pub fn upsert_weight(&self, entry: &NewWeightEntry, now: &str) -> Result<WeightEntry> {
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO weight_entries (uuid, user_id, date, weight_kg, source, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (user_id, date) DO UPDATE SET
                 weight_kg = excluded.weight_kg,
                 source = excluded.source,
                 notes = excluded.notes,
                 updated_at = excluded.updated_at",
            params![
                uuid,
                entry.user_id,
                date_str(entry.date),
                entry.weight_kg,
                entry.source,
                entry.notes,
                now,
                now,
            ],
        )?;
        self.get_weight(&entry.user_id, entry.date)?
            .context("Weight entry not found after upsert")
    }

    pub fn get_weight(&self, user_id: &str, date: NaiveDate) -> Result<Option<WeightEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, date, weight_kg, source, notes, created_at, updated_at
             FROM weight_entries WHERE user_id = ?1 AND date = ?2",
        )?;
        let mut rows = stmt.query(params![user_id, date_str(date)])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::weight_entry_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn weight_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeightEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, date, weight_kg, source, notes, created_at, updated_at
             FROM weight_entries
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date",
        )?;
        let rows = stmt
            .query_map(
                params![user_id, date_str(start), date_str(end)],
                Self::weight_entry_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delete_weight(&self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM weight_entries WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }
}
