use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use vitals_core::VitalsService;

pub(crate) fn cmd_import_food(
    svc: &mut VitalsService,
    user: &str,
    path: &Path,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let csv_data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let summary = svc.import_food_csv(user, &csv_data, dry_run, Utc::now())?;

    if summary.rows_parsed == 0 {
        if json {
            println!(
                "{}",
                serde_json::json!({ "error": "No rows found in CSV file" })
            );
        } else {
            eprintln!("No rows found in CSV file.");
        }
        return Ok(());
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "dry_run": dry_run,
                "rows_parsed": summary.rows_parsed,
                "entries_logged": summary.entries_logged,
                "dates_spanned": summary.dates_spanned,
            })
        );
    } else if dry_run {
        println!("Dry run — no changes made.\n");
        println!("  Rows parsed:    {}", summary.rows_parsed);
        println!("  Entries to log: {}", summary.entries_logged);
        println!("  Dates spanned:  {}", summary.dates_spanned);
    } else {
        println!("Import complete.\n");
        println!("  Rows parsed:    {}", summary.rows_parsed);
        println!("  Entries logged: {}", summary.entries_logged);
        println!("  Dates spanned:  {}", summary.dates_spanned);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_import_food_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Calories,Protein (g)").unwrap();
        writeln!(file, "2026-01-15,300,20").unwrap();
        writeln!(file, "2026-01-15,200,10").unwrap();
        file.flush().unwrap();

        let mut svc = VitalsService::new_in_memory().unwrap();
        cmd_import_food(&mut svc, "u1", file.path(), false, true).unwrap();

        let date = chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let summary = svc.db().get_consumed_summary("u1", date).unwrap().unwrap();
        assert!((summary.calories - 500.0).abs() < 1e-9);
        assert!((summary.protein_g - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_import_food_dry_run_writes_nothing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Calories").unwrap();
        writeln!(file, "2026-01-15,300").unwrap();
        file.flush().unwrap();

        let mut svc = VitalsService::new_in_memory().unwrap();
        cmd_import_food(&mut svc, "u1", file.path(), true, true).unwrap();

        let date = chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert!(svc.db().get_consumed_summary("u1", date).unwrap().is_none());
    }

    #[test]
    fn test_import_missing_file_is_an_error() {
        let mut svc = VitalsService::new_in_memory().unwrap();
        let result = cmd_import_food(
            &mut svc,
            "u1",
            Path::new("/nonexistent/file.csv"),
            false,
            true,
        );
        assert!(result.is_err());
    }
}
