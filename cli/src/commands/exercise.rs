use anyhow::Result;
use chrono::Utc;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use vitals_core::VitalsService;
use vitals_core::models::{NewExerciseLog, validate_exercise_category};

use super::helpers::{fmt_opt, parse_date};

pub(crate) fn cmd_exercise_log(
    svc: &mut VitalsService,
    user: &str,
    category: &str,
    minutes: Option<f64>,
    distance_km: Option<f64>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let category = validate_exercise_category(category)?;
    let date = parse_date(date)?;
    let log = svc.log_exercise(
        &NewExerciseLog {
            user_id: user.to_string(),
            date,
            category,
            minutes,
            distance_km,
        },
        Utc::now(),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        let mut detail = String::new();
        if let Some(m) = log.minutes {
            detail.push_str(&format!(" {m:.0} min"));
        }
        if let Some(d) = log.distance_km {
            detail.push_str(&format!(" {d:.2} km"));
        }
        println!(
            "Logged {}{} for {} (entry {})",
            log.category.as_str(),
            detail,
            log.date.format("%Y-%m-%d"),
            log.id
        );
    }
    Ok(())
}

pub(crate) fn cmd_exercise_list(
    svc: &VitalsService,
    user: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let logs = svc.exercise_logs_for_day(user, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&logs)?);
    } else if logs.is_empty() {
        eprintln!("No sessions for {}", date.format("%Y-%m-%d"));
    } else {
        #[derive(Tabled)]
        struct SessionRow {
            #[tabled(rename = "ID")]
            id: i64,
            #[tabled(rename = "Category")]
            category: &'static str,
            #[tabled(rename = "Minutes")]
            minutes: String,
            #[tabled(rename = "Distance (km)")]
            distance: String,
        }

        let rows: Vec<SessionRow> = logs
            .iter()
            .map(|l| SessionRow {
                id: l.id,
                category: l.category.as_str(),
                minutes: fmt_opt(l.minutes),
                distance: fmt_opt(l.distance_km),
            })
            .collect();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }
    Ok(())
}

pub(crate) fn cmd_exercise_delete(svc: &mut VitalsService, id: i64, json: bool) -> Result<()> {
    let deleted = svc.delete_exercise(id, Utc::now())?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted, "id": id }));
    } else if deleted {
        println!("Deleted session {id}");
    } else {
        eprintln!("No session with ID {id}");
    }
    Ok(())
}
