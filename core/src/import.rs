use std::collections::BTreeSet;
use std::io::Read;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::Database;
use crate::models::{Domain, LogStatus, NewConsumedLog};
use crate::triggers;

/// A single row parsed from a food-diary CSV export.
#[derive(Debug, Clone)]
pub struct FoodHistoryRow {
    pub date: String,
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

/// Summary of what a food-history import would do / did.
#[derive(Debug, Clone)]
pub struct FoodImportSummary {
    pub rows_parsed: usize,
    pub entries_logged: usize,
    pub dates_spanned: usize,
    /// The distinct days touched, for cache invalidation by the caller.
    pub dates: Vec<NaiveDate>,
}

/// Parse a food-diary CSV export from any reader.
///
/// Expected header:
/// `Date,Calories,Protein (g),Carbohydrates (g),Fat (g),Fibre (g),Sugar (g),Saturated Fat (g),Trans Fat (g),Sodium (mg)`
///
/// Only `Date` and `Calories` are required; missing nutrient columns
/// (and unparsable cells) read as 0.
pub fn parse_food_csv<R: Read>(reader: R) -> Result<Vec<FoodHistoryRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();

    for name in &["Date", "Calories"] {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(name)) {
            bail!("Missing required column: {name}");
        }
    }

    // Build column index map (case-insensitive)
    let col =
        |name: &str| -> Option<usize> { headers.iter().position(|h| h.eq_ignore_ascii_case(name)) };

    let idx_date = col("Date").context("Missing 'Date' column")?;
    let idx_cal = col("Calories").context("Missing 'Calories' column")?;
    let idx_protein = col("Protein (g)");
    let idx_carbs = col("Carbohydrates (g)");
    let idx_fat = col("Fat (g)");
    let idx_fibre = col("Fibre (g)").or_else(|| col("Fiber (g)"));
    let idx_sugar = col("Sugar (g)");
    let idx_sat_fat = col("Saturated Fat (g)");
    let idx_trans_fat = col("Trans Fat (g)");
    let idx_sodium = col("Sodium (mg)");

    let mut rows = Vec::new();

    for (line_num, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV row {}", line_num + 2))?;

        let date = record.get(idx_date).unwrap_or("").trim().to_string();
        if date.is_empty() {
            continue; // skip blank rows
        }

        let parse_f64 = |idx: Option<usize>| -> f64 {
            idx.and_then(|i| record.get(i))
                .and_then(|v| v.trim().parse::<f64>().ok())
                .unwrap_or(0.0)
        };

        rows.push(FoodHistoryRow {
            date,
            calories: parse_f64(Some(idx_cal)),
            protein_g: parse_f64(idx_protein),
            carbs_g: parse_f64(idx_carbs),
            fat_g: parse_f64(idx_fat),
            fibre_g: parse_f64(idx_fibre),
            sugar_g: parse_f64(idx_sugar),
            saturated_fat_g: parse_f64(idx_sat_fat),
            trans_fat_g: parse_f64(idx_trans_fat),
            sodium_mg: parse_f64(idx_sodium),
        });
    }

    Ok(rows)
}

/// Normalize an exported date to YYYY-MM-DD.
fn normalize_date(raw: &str) -> Result<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Ok(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Ok(d);
    }
    bail!("Cannot parse date: '{raw}'")
}

/// Import parsed food-history rows for one user.
///
/// Each row becomes a consumed log; after the batch, every affected day
/// is recomputed through the trigger coordinator exactly once. When
/// `dry_run` is true nothing is written.
pub fn import_food_history(
    db: &Database,
    user_id: &str,
    rows: &[FoodHistoryRow],
    dry_run: bool,
    now: DateTime<Utc>,
) -> Result<FoodImportSummary> {
    let mut entries_logged: usize = 0;
    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
    let now_str = now.to_rfc3339();

    for row in rows {
        let date = normalize_date(&row.date)?;
        dates.insert(date);

        if !dry_run {
            db.insert_consumed_log(
                &NewConsumedLog {
                    user_id: user_id.to_string(),
                    date,
                    calories: row.calories,
                    protein_g: row.protein_g,
                    carbs_g: row.carbs_g,
                    fat_g: row.fat_g,
                    fibre_g: row.fibre_g,
                    sugar_g: row.sugar_g,
                    saturated_fat_g: row.saturated_fat_g,
                    trans_fat_g: row.trans_fat_g,
                    sodium_mg: row.sodium_mg,
                },
                LogStatus::Unknown,
                &now_str,
            )?;
        }
        entries_logged += 1;
    }

    if !dry_run {
        for &date in &dates {
            triggers::refresh_day(db, Domain::Consumed, user_id, date, now)?;
        }
    }

    Ok(FoodImportSummary {
        rows_parsed: rows.len(),
        entries_logged,
        dates_spanned: dates.len(),
        dates: dates.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE_CSV: &str = "\
Date,Calories,Protein (g),Carbohydrates (g),Fat (g),Fibre (g),Sugar (g),Saturated Fat (g),Trans Fat (g),Sodium (mg)
2026-01-15,150,5,27,3,4,1,0.5,0,120
2026-01-15,165,31,0,3.6,0,0,1,0,74
2026-01-16,100,17,6,0.7,0,4,0.4,0,36
";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_food_csv_basic() {
        let rows = parse_food_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, "2026-01-15");
        assert!((rows[0].calories - 150.0).abs() < f64::EPSILON);
        assert!((rows[0].protein_g - 5.0).abs() < f64::EPSILON);
        assert!((rows[0].sodium_mg - 120.0).abs() < f64::EPSILON);
        assert!((rows[1].saturated_fat_g - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_food_csv_missing_required_column() {
        let bad = "Date,Protein (g)\n2026-01-15,10\n";
        let result = parse_food_csv(bad.as_bytes());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Calories"));
    }

    #[test]
    fn test_parse_food_csv_minimal_columns() {
        let csv = "Date,Calories\n2026-01-15,400\n";
        let rows = parse_food_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].calories - 400.0).abs() < f64::EPSILON);
        assert_eq!(rows[0].protein_g, 0.0);
        assert_eq!(rows[0].sodium_mg, 0.0);
    }

    #[test]
    fn test_parse_food_csv_accepts_fiber_spelling() {
        let csv = "Date,Calories,Fiber (g)\n2026-01-15,400,7\n";
        let rows = parse_food_csv(csv.as_bytes()).unwrap();
        assert!((rows[0].fibre_g - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_food_csv_skips_blank_rows() {
        let csv = "Date,Calories\n2026-01-15,400\n,\n2026-01-16,300\n";
        let rows = parse_food_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(
            normalize_date("2026-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
        assert_eq!(
            normalize_date("1/15/2026").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
        assert!(normalize_date("not-a-date").is_err());
    }

    #[test]
    fn test_import_dry_run_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let rows = parse_food_csv(SAMPLE_CSV.as_bytes()).unwrap();

        let summary = import_food_history(&db, "u1", &rows, true, now()).unwrap();
        assert_eq!(summary.rows_parsed, 3);
        assert_eq!(summary.entries_logged, 3);
        assert_eq!(summary.dates_spanned, 2);

        let jan15 = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert!(db.consumed_logs_for_day("u1", jan15).unwrap().is_empty());
        assert!(db.get_consumed_summary("u1", jan15).unwrap().is_none());
    }

    #[test]
    fn test_import_refreshes_each_affected_day_once() {
        let db = Database::open_in_memory().unwrap();
        let rows = parse_food_csv(SAMPLE_CSV.as_bytes()).unwrap();

        let summary = import_food_history(&db, "u1", &rows, false, now()).unwrap();
        assert_eq!(summary.entries_logged, 3);
        assert_eq!(summary.dates, vec![
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
        ]);

        let jan15 = db
            .get_consumed_summary("u1", NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
            .unwrap()
            .unwrap();
        assert!((jan15.calories - 315.0).abs() < 1e-9);
        assert!((jan15.protein_g - 36.0).abs() < 1e-9);

        let jan16 = db
            .get_consumed_summary("u1", NaiveDate::from_ymd_opt(2026, 1, 16).unwrap())
            .unwrap()
            .unwrap();
        assert!((jan16.calories - 100.0).abs() < 1e-9);
    }
}
