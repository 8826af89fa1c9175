use anyhow::{Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use vitals_core::VitalsService;
use vitals_core::fill::FillOrder;

use super::helpers::last_n_days;

/// Dense day-by-day table for one domain over the last N days.
pub(crate) fn cmd_history(
    svc: &mut VitalsService,
    user: &str,
    domain: &str,
    days: u32,
    oldest_first: bool,
    json: bool,
) -> Result<()> {
    let (start, end) = last_n_days(days);
    let order = if oldest_first {
        FillOrder::OldestFirst
    } else {
        FillOrder::NewestFirst
    };

    match domain.to_lowercase().as_str() {
        "meds" | "med" | "medication" => {
            let rows = svc.medication_history(user, start, end, None, order);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            if rows.iter().all(|r| r.med_count + r.supp_count == 0) {
                eprintln!("No intake entries in the last {days} days");
                process::exit(2);
            }

            #[derive(Tabled)]
            struct MedDayRow {
                #[tabled(rename = "Date")]
                date: String,
                #[tabled(rename = "Meds")]
                meds: i64,
                #[tabled(rename = "Supps")]
                supps: i64,
            }
            let table_rows: Vec<MedDayRow> = rows
                .iter()
                .map(|r| MedDayRow {
                    date: r.date.format("%Y-%m-%d").to_string(),
                    meds: r.med_count,
                    supps: r.supp_count,
                })
                .collect();
            print_table(&table_rows, 1..3);
        }
        "exercise" => {
            let rows = svc.exercise_history(user, start, end, None, order);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            if rows.iter().all(|r| r.activity_count == 0) {
                eprintln!("No sessions in the last {days} days");
                process::exit(2);
            }

            #[derive(Tabled)]
            struct ExerciseDayRow {
                #[tabled(rename = "Date")]
                date: String,
                #[tabled(rename = "Activities")]
                activities: i64,
                #[tabled(rename = "Cardio")]
                cardio: i64,
                #[tabled(rename = "Minutes")]
                minutes: String,
                #[tabled(rename = "Distance (km)")]
                distance: String,
                #[tabled(rename = "Strength")]
                strength: i64,
            }
            let table_rows: Vec<ExerciseDayRow> = rows
                .iter()
                .map(|r| ExerciseDayRow {
                    date: r.date.format("%Y-%m-%d").to_string(),
                    activities: r.activity_count,
                    cardio: r.cardio_count,
                    minutes: format!("{:.0}", r.cardio_minutes),
                    distance: format!("{:.2}", r.cardio_distance_km),
                    strength: r.strength_count,
                })
                .collect();
            print_table(&table_rows, 1..6);
        }
        "food" | "consumed" => {
            let rows = svc.consumed_history(user, start, end, None, order);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            if rows.iter().all(|r| r.calories == 0.0) {
                eprintln!("No consumed entries in the last {days} days");
                process::exit(2);
            }

            #[derive(Tabled)]
            struct FoodDayRow {
                #[tabled(rename = "Date")]
                date: String,
                #[tabled(rename = "Calories")]
                calories: String,
                #[tabled(rename = "Protein")]
                protein: String,
                #[tabled(rename = "Carbs")]
                carbs: String,
                #[tabled(rename = "Fat")]
                fat: String,
                #[tabled(rename = "Status")]
                status: &'static str,
            }
            let table_rows: Vec<FoodDayRow> = rows
                .iter()
                .map(|r| FoodDayRow {
                    date: r.date.format("%Y-%m-%d").to_string(),
                    calories: format!("{:.0}", r.calories),
                    protein: format!("{:.0}g", r.protein_g),
                    carbs: format!("{:.0}g", r.carbs_g),
                    fat: format!("{:.0}g", r.fat_g),
                    status: r.log_status.as_str(),
                })
                .collect();
            print_table(&table_rows, 1..5);
        }
        other => bail!("Unknown domain '{other}'. Use one of: meds, exercise, food"),
    }

    Ok(())
}

fn print_table<T: Tabled>(rows: &[T], right_align: std::ops::Range<usize>) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(right_align)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}
