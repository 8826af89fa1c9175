use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The three log domains, each rolled up into its own daily summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Medication,
    Exercise,
    Consumed,
}

impl Domain {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Medication => "medication",
            Domain::Exercise => "exercise",
            Domain::Consumed => "consumed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedKind {
    Med,
    Supp,
    /// Legacy bucket from early exports; counted as `med` in summaries.
    Other,
}

impl MedKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MedKind::Med => "med",
            MedKind::Supp => "supp",
            MedKind::Other => "other",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "med" => Some(MedKind::Med),
            "supp" => Some(MedKind::Supp),
            "other" => Some(MedKind::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    CardioMindBody,
    Strength,
}

impl ExerciseCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseCategory::CardioMindBody => "cardio_mind_body",
            ExerciseCategory::Strength => "strength",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cardio_mind_body" | "cardio" => Some(ExerciseCategory::CardioMindBody),
            "strength" => Some(ExerciseCategory::Strength),
            _ => None,
        }
    }
}

/// Day-level workflow status for food logging. `Completed` is terminal:
/// the first transition into it stamps `completed_at` on the summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Unknown,
    InProgress,
    Completed,
}

impl LogStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogStatus::Unknown => "unknown",
            LogStatus::InProgress => "in_progress",
            LogStatus::Completed => "completed",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(LogStatus::Unknown),
            "in_progress" => Some(LogStatus::InProgress),
            "completed" => Some(LogStatus::Completed),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, LogStatus::Completed)
    }
}

pub fn validate_med_kind(s: &str) -> Result<MedKind> {
    MedKind::parse(&s.to_lowercase())
        .ok_or_else(|| anyhow::anyhow!("Invalid kind '{s}'. Must be one of: med, supp, other"))
}

pub fn validate_exercise_category(s: &str) -> Result<ExerciseCategory> {
    ExerciseCategory::parse(&s.to_lowercase()).ok_or_else(|| {
        anyhow::anyhow!("Invalid category '{s}'. Must be one of: cardio_mind_body, strength")
    })
}

pub fn validate_log_status(s: &str) -> Result<LogStatus> {
    LogStatus::parse(&s.to_lowercase()).ok_or_else(|| {
        anyhow::anyhow!("Invalid status '{s}'. Must be one of: unknown, in_progress, completed")
    })
}

pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        bail!("user_id must not be empty");
    }
    Ok(())
}

// --- Raw logs ---

#[derive(Debug, Clone, Serialize)]
pub struct MedicationLog {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub kind: MedKind,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMedicationLog {
    pub user_id: String,
    pub date: NaiveDate,
    pub kind: MedKind,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMedicationLog {
    pub date: Option<NaiveDate>,
    pub kind: Option<MedKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseLog {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub category: ExerciseCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewExerciseLog {
    pub user_id: String,
    pub date: NaiveDate,
    pub category: ExerciseCategory,
    pub minutes: Option<f64>,
    pub distance_km: Option<f64>,
}

/// Outer `Option` = "change this field"; inner `Option` = the new value,
/// where `None` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct UpdateExerciseLog {
    pub date: Option<NaiveDate>,
    pub category: Option<ExerciseCategory>,
    pub minutes: Option<Option<f64>>,
    pub distance_km: Option<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsumedLog {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fibre_g: f64,
    pub sugar_g: f64,
    pub saturated_fat_g: f64,
    pub trans_fat_g: f64,
    pub sodium_mg: f64,
    /// Snapshot of the day's workflow status when this entry was written.
    /// The authoritative status lives on the day's summary row.
    pub log_status: LogStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewConsumedLog {
    pub user_id: String,
    pub date: NaiveDate,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fibre_g: f64,
    pub sugar_g: f64,
    pub saturated_fat_g: f64,
    pub trans_fat_g: f64,
    pub sodium_mg: f64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateConsumedLog {
    pub date: Option<NaiveDate>,
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fibre_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub saturated_fat_g: Option<f64>,
    pub trans_fat_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

// --- Daily summaries (one row per user+date+domain) ---

/// Exists iff `med_count + supp_count > 0`; deleted, not zeroed, when the
/// last contributing log for the day is removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationSummary {
    pub user_id: String,
    pub date: NaiveDate,
    pub med_count: i64,
    pub supp_count: i64,
}

impl MedicationSummary {
    #[must_use]
    pub fn zero(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            date,
            med_count: 0,
            supp_count: 0,
        }
    }
}

/// Exists iff `activity_count > 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseSummary {
    pub user_id: String,
    pub date: NaiveDate,
    pub activity_count: i64,
    pub cardio_count: i64,
    pub cardio_minutes: f64,
    pub cardio_distance_km: f64,
    pub strength_count: i64,
}

impl ExerciseSummary {
    #[must_use]
    pub fn zero(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            date,
            activity_count: 0,
            cardio_count: 0,
            cardio_minutes: 0.0,
            cardio_distance_km: 0.0,
            strength_count: 0,
        }
    }
}

/// Existence is governed by the status workflow, not by a nonzero-sum rule:
/// once a day is touched the row persists, even with zeroed sums.
/// `created_at` is fixed at first touch; `completed_at` is stamped only on
/// the transition into `completed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumedSummary {
    pub user_id: String,
    pub date: NaiveDate,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fibre_g: f64,
    pub sugar_g: f64,
    pub saturated_fat_g: f64,
    pub trans_fat_g: f64,
    pub sodium_mg: f64,
    pub log_status: LogStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl ConsumedSummary {
    #[must_use]
    pub fn zero(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            date,
            calories: 0.0,
            protein_g: 0.0,
            carbs_g: 0.0,
            fat_g: 0.0,
            fibre_g: 0.0,
            sugar_g: 0.0,
            saturated_fat_g: 0.0,
            trans_fat_g: 0.0,
            sodium_mg: 0.0,
            log_status: LogStatus::Unknown,
            created_at: String::new(),
            completed_at: None,
        }
    }
}

// --- Weight tracking ---

#[derive(Debug, Clone, Serialize)]
pub struct WeightEntry {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewWeightEntry {
    pub user_id: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub source: String,
    pub notes: Option<String>,
}

/// One day in a dense weight series. `weight_kg` is `None` when no value
/// is known yet — a missing-value marker, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightDay {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

pub fn validate_new_exercise(minutes: Option<f64>, distance_km: Option<f64>) -> Result<()> {
    if minutes.is_some_and(|m| m < 0.0) {
        bail!("minutes must not be negative");
    }
    if distance_km.is_some_and(|d| d < 0.0) {
        bail!("distance_km must not be negative");
    }
    Ok(())
}

pub fn validate_weight(weight_kg: f64) -> Result<()> {
    if weight_kg <= 0.0 {
        bail!("weight_kg must be greater than 0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_med_kind_round_trip() {
        for kind in [MedKind::Med, MedKind::Supp, MedKind::Other] {
            assert_eq!(MedKind::parse(kind.as_str()), Some(kind));
        }
        assert!(MedKind::parse("vitamin").is_none());
    }

    #[test]
    fn test_exercise_category_round_trip() {
        for cat in [ExerciseCategory::CardioMindBody, ExerciseCategory::Strength] {
            assert_eq!(ExerciseCategory::parse(cat.as_str()), Some(cat));
        }
        // Short alias accepted on input only
        assert_eq!(
            ExerciseCategory::parse("cardio"),
            Some(ExerciseCategory::CardioMindBody)
        );
        assert!(ExerciseCategory::parse("yoga").is_none());
    }

    #[test]
    fn test_log_status_round_trip() {
        for status in [
            LogStatus::Unknown,
            LogStatus::InProgress,
            LogStatus::Completed,
        ] {
            assert_eq!(LogStatus::parse(status.as_str()), Some(status));
        }
        assert!(LogStatus::parse("done").is_none());
    }

    #[test]
    fn test_only_completed_is_terminal() {
        assert!(LogStatus::Completed.is_terminal());
        assert!(!LogStatus::Unknown.is_terminal());
        assert!(!LogStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_validate_med_kind_case_insensitive() {
        assert_eq!(validate_med_kind("Med").unwrap(), MedKind::Med);
        assert_eq!(validate_med_kind("SUPP").unwrap(), MedKind::Supp);
        assert!(validate_med_kind("pill").is_err());
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("u1").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("   ").is_err());
    }

    #[test]
    fn test_validate_new_exercise() {
        assert!(validate_new_exercise(Some(30.0), Some(5.0)).is_ok());
        assert!(validate_new_exercise(None, None).is_ok());
        assert!(validate_new_exercise(Some(-1.0), None).is_err());
        assert!(validate_new_exercise(None, Some(-0.5)).is_err());
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight(75.0).is_ok());
        assert!(validate_weight(0.0).is_err());
        assert!(validate_weight(-5.0).is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        // The wire/JSON names are the stored names; a rename here would
        // silently orphan persisted rows.
        assert_eq!(
            serde_json::to_string(&LogStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&ExerciseCategory::CardioMindBody).unwrap(),
            "\"cardio_mind_body\""
        );
        assert_eq!(serde_json::to_string(&MedKind::Supp).unwrap(), "\"supp\"");
    }

    #[test]
    fn test_zero_summaries() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        let meds = MedicationSummary::zero("u1", date);
        assert_eq!(meds.med_count + meds.supp_count, 0);

        let ex = ExerciseSummary::zero("u1", date);
        assert_eq!(ex.activity_count, 0);
        assert_eq!(ex.cardio_distance_km, 0.0);

        let food = ConsumedSummary::zero("u1", date);
        assert_eq!(food.log_status, LogStatus::Unknown);
        assert!(food.completed_at.is_none());
        assert_eq!(food.calories, 0.0);
    }
}
