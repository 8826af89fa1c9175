use anyhow::{Result, bail};
use chrono::Utc;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use vitals_core::VitalsService;
use vitals_core::fill::FillOrder;
use vitals_core::models::NewWeightEntry;

use super::helpers::{last_n_days, parse_date};

const LBS_PER_KG: f64 = 2.20462;
const KG_PER_LB: f64 = 0.453_592;

pub(crate) fn cmd_weight_log(
    svc: &mut VitalsService,
    user: &str,
    value: f64,
    unit: &str,
    date: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    if value <= 0.0 {
        bail!("Weight must be greater than 0");
    }

    let weight_kg = match unit.to_lowercase().as_str() {
        "kg" => value,
        "lbs" | "lb" => {
            let kg = value * KG_PER_LB;
            eprintln!("Converting {value:.1} lbs → {kg:.2} kg");
            kg
        }
        _ => bail!("Invalid unit '{unit}'. Use 'kg' or 'lbs'"),
    };

    let date = parse_date(date)?;
    let entry = svc.log_weight(
        &NewWeightEntry {
            user_id: user.to_string(),
            date,
            weight_kg,
            source: "manual".to_string(),
            notes,
        },
        Utc::now(),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let lbs = entry.weight_kg * LBS_PER_KG;
        println!(
            "Logged {:.1} kg ({:.1} lbs) for {}",
            entry.weight_kg,
            lbs,
            entry.date.format("%Y-%m-%d")
        );
        if let Some(ref n) = entry.notes {
            println!("  Notes: {n}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_weight_show(
    svc: &VitalsService,
    user: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let entry = svc.get_weight(user, date)?;

    if let Some(e) = entry {
        if json {
            println!("{}", serde_json::to_string_pretty(&e)?);
        } else {
            let lbs = e.weight_kg * LBS_PER_KG;
            println!(
                "{}: {:.1} kg ({:.1} lbs)",
                e.date.format("%Y-%m-%d"),
                e.weight_kg,
                lbs
            );
            if let Some(ref n) = e.notes {
                println!("  Notes: {n}");
            }
        }
    } else {
        let date_str = date.format("%Y-%m-%d");
        if json {
            println!(
                "{}",
                serde_json::json!({ "error": format!("No weight entry for {date_str}") })
            );
        } else {
            eprintln!("No weight entry for {date_str}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_weight_history(
    svc: &VitalsService,
    user: &str,
    days: u32,
    json: bool,
) -> Result<()> {
    let (start, end) = last_n_days(days);
    let series = svc.weight_history(user, start, end, None, FillOrder::NewestFirst);

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else if series.iter().all(|d| d.weight_kg.is_none()) {
        eprintln!("No weight entries found. Use `vitals weight log` to record your weight.");
    } else {
        #[derive(Tabled)]
        struct WeightRow {
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Weight (kg)")]
            kg: String,
            #[tabled(rename = "Weight (lbs)")]
            lbs: String,
        }

        let rows: Vec<WeightRow> = series
            .iter()
            .map(|d| WeightRow {
                date: d.date.format("%Y-%m-%d").to_string(),
                kg: d.weight_kg.map_or("-".into(), |v| format!("{v:.1}")),
                lbs: d
                    .weight_kg
                    .map_or("-".into(), |v| format!("{:.1}", v * LBS_PER_KG)),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }
    Ok(())
}

pub(crate) fn cmd_weight_delete(svc: &mut VitalsService, id: i64, json: bool) -> Result<()> {
    let deleted = svc.delete_weight(id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted, "id": id }));
    } else if deleted {
        println!("Deleted weight entry {id}");
    } else {
        eprintln!("No weight entry with ID {id}");
    }
    Ok(())
}
