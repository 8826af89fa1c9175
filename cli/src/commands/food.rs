use anyhow::Result;
use chrono::Utc;

use vitals_core::VitalsService;
use vitals_core::models::{NewConsumedLog, validate_log_status};

use super::helpers::parse_date;

/// Nutrition values for one logged entry, as given on the command line.
pub(crate) struct FoodLogArgs {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fibre: f64,
    pub sugar: f64,
    pub saturated_fat: f64,
    pub trans_fat: f64,
    pub sodium: f64,
}

pub(crate) fn cmd_food_log(
    svc: &mut VitalsService,
    user: &str,
    args: FoodLogArgs,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let log = svc.log_consumed(
        &NewConsumedLog {
            user_id: user.to_string(),
            date,
            calories: args.calories,
            protein_g: args.protein,
            carbs_g: args.carbs,
            fat_g: args.fat,
            fibre_g: args.fibre,
            sugar_g: args.sugar,
            saturated_fat_g: args.saturated_fat,
            trans_fat_g: args.trans_fat,
            sodium_mg: args.sodium,
        },
        Utc::now(),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        println!(
            "Logged {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g for {} (entry {})",
            log.calories,
            log.protein_g,
            log.carbs_g,
            log.fat_g,
            log.date.format("%Y-%m-%d"),
            log.id
        );
    }
    Ok(())
}

pub(crate) fn cmd_food_status(
    svc: &mut VitalsService,
    user: &str,
    status: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let status = validate_log_status(status)?;
    let date = parse_date(date)?;
    let row = svc.set_consumed_status(user, date, status, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&row)?);
    } else {
        println!(
            "{}: status {} ({:.0} kcal logged)",
            row.date.format("%Y-%m-%d"),
            row.log_status.as_str(),
            row.calories
        );
        if let Some(ref at) = row.completed_at {
            println!("  Completed at: {at}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_food_delete(svc: &mut VitalsService, id: i64, json: bool) -> Result<()> {
    let deleted = svc.delete_consumed(id, Utc::now())?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted, "id": id }));
    } else if deleted {
        println!("Deleted consumed entry {id}");
    } else {
        eprintln!("No consumed entry with ID {id}");
    }
    Ok(())
}
