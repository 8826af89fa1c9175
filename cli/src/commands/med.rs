use anyhow::Result;
use chrono::Utc;
use tabled::{Table, Tabled, settings::Style};

use vitals_core::VitalsService;
use vitals_core::models::{NewMedicationLog, validate_med_kind};

use super::helpers::parse_date;

pub(crate) fn cmd_med_log(
    svc: &mut VitalsService,
    user: &str,
    kind: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let kind = validate_med_kind(kind)?;
    let date = parse_date(date)?;
    let log = svc.log_medication(
        &NewMedicationLog {
            user_id: user.to_string(),
            date,
            kind,
        },
        Utc::now(),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        println!(
            "Logged {} for {} (entry {})",
            log.kind.as_str(),
            log.date.format("%Y-%m-%d"),
            log.id
        );
    }
    Ok(())
}

pub(crate) fn cmd_med_list(
    svc: &VitalsService,
    user: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let logs = svc.medication_logs_for_day(user, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&logs)?);
    } else if logs.is_empty() {
        eprintln!("No intake entries for {}", date.format("%Y-%m-%d"));
    } else {
        #[derive(Tabled)]
        struct MedRow {
            #[tabled(rename = "ID")]
            id: i64,
            #[tabled(rename = "Kind")]
            kind: &'static str,
            #[tabled(rename = "Logged at")]
            logged_at: String,
        }

        let rows: Vec<MedRow> = logs
            .iter()
            .map(|l| MedRow {
                id: l.id,
                kind: l.kind.as_str(),
                logged_at: l.created_at.clone(),
            })
            .collect();
        let table = Table::new(&rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
    Ok(())
}

pub(crate) fn cmd_med_delete(svc: &mut VitalsService, id: i64, json: bool) -> Result<()> {
    let deleted = svc.delete_medication(id, Utc::now())?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted, "id": id }));
    } else if deleted {
        println!("Deleted intake entry {id}");
    } else {
        eprintln!("No intake entry with ID {id}");
    }
    Ok(())
}
