mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    cmd_exercise_delete, cmd_exercise_list, cmd_exercise_log, cmd_food_delete, cmd_food_log,
    cmd_food_status, cmd_history, cmd_import_food, cmd_med_delete, cmd_med_list, cmd_med_log,
    cmd_weight_delete, cmd_weight_history, cmd_weight_log, cmd_weight_show,
};
use crate::config::Config;
use vitals_core::VitalsService;

#[derive(Parser)]
#[command(
    name = "vitals",
    version,
    about = "A simple daily health journal CLI",
    long_about = "\nTrack meds, workouts, meals, and weight from the terminal.\nOne summary row per day, kept consistent with every raw log you touch.\n"
)]
struct Cli {
    /// User profile to operate on
    #[arg(long, global = true, env = "VITALS_USER", default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track medication and supplement intake
    Med {
        #[command(subcommand)]
        command: MedCommands,
    },
    /// Track exercise sessions
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Track food consumption and the day's logging status
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Show a dense day-by-day summary table
    Summary {
        /// Which domain: meds, exercise, food
        domain: String,
        /// Number of days to show, ending today
        #[arg(short, long, default_value = "7")]
        days: u32,
        /// Oldest day first (default: newest first)
        #[arg(long)]
        oldest_first: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import data from external sources
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
}

#[derive(Subcommand)]
enum MedCommands {
    /// Log an intake: med, supp, or other
    Log {
        /// Kind of intake: med, supp, other
        kind: String,
        /// Date to log for (YYYY-MM-DD or today/yesterday)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List intake entries for a day
    List {
        /// Date to list (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an intake entry by ID
    Delete {
        /// Entry ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommands {
    /// Log a session
    Log {
        /// Category: cardio (cardio_mind_body) or strength
        category: String,
        /// Duration in minutes
        #[arg(short, long)]
        minutes: Option<f64>,
        /// Distance in km (cardio only)
        #[arg(long)]
        distance: Option<f64>,
        /// Date to log for (YYYY-MM-DD or today/yesterday)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List sessions for a day
    List {
        /// Date to list (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a session by ID
    Delete {
        /// Entry ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Log a consumed entry
    Log {
        /// Calories
        calories: f64,
        /// Protein in grams
        #[arg(long, default_value = "0")]
        protein: f64,
        /// Carbohydrates in grams
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fat in grams
        #[arg(long, default_value = "0")]
        fat: f64,
        /// Fibre in grams
        #[arg(long, default_value = "0")]
        fibre: f64,
        /// Sugar in grams
        #[arg(long, default_value = "0")]
        sugar: f64,
        /// Saturated fat in grams
        #[arg(long, default_value = "0")]
        saturated_fat: f64,
        /// Trans fat in grams
        #[arg(long, default_value = "0")]
        trans_fat: f64,
        /// Sodium in milligrams
        #[arg(long, default_value = "0")]
        sodium: f64,
        /// Date to log for (YYYY-MM-DD or today/yesterday)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the day's logging status: unknown, in_progress, completed
    Status {
        /// New status
        status: String,
        /// Date to update (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a consumed entry by ID
    Delete {
        /// Entry ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Log body weight for a day (overwrites the day's entry)
    Log {
        /// Weight value
        value: f64,
        /// Unit: kg or lbs
        #[arg(short, long, default_value = "kg")]
        unit: String,
        /// Date to log for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the weight entry for a day
    Show {
        /// Date to show (YYYY-MM-DD, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a dense, forward-filled weight history
    History {
        /// Number of days to show, ending today
        #[arg(short, long, default_value = "30")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a weight entry by ID
    Delete {
        /// Weight entry ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import a food-diary CSV export
    Food {
        /// Path to the CSV file
        file: std::path::PathBuf,
        /// Preview import without making changes
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let db_path = config
        .db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    let mut svc = VitalsService::new(db_path)?;
    let user = cli.user;

    match cli.command {
        Commands::Med { command } => match command {
            MedCommands::Log { kind, date, json } => cmd_med_log(&mut svc, &user, &kind, date, json),
            MedCommands::List { date, json } => cmd_med_list(&svc, &user, date, json),
            MedCommands::Delete { id, json } => cmd_med_delete(&mut svc, id, json),
        },
        Commands::Exercise { command } => match command {
            ExerciseCommands::Log {
                category,
                minutes,
                distance,
                date,
                json,
            } => cmd_exercise_log(&mut svc, &user, &category, minutes, distance, date, json),
            ExerciseCommands::List { date, json } => cmd_exercise_list(&svc, &user, date, json),
            ExerciseCommands::Delete { id, json } => cmd_exercise_delete(&mut svc, id, json),
        },
        Commands::Food { command } => match command {
            FoodCommands::Log {
                calories,
                protein,
                carbs,
                fat,
                fibre,
                sugar,
                saturated_fat,
                trans_fat,
                sodium,
                date,
                json,
            } => cmd_food_log(
                &mut svc,
                &user,
                commands::FoodLogArgs {
                    calories,
                    protein,
                    carbs,
                    fat,
                    fibre,
                    sugar,
                    saturated_fat,
                    trans_fat,
                    sodium,
                },
                date,
                json,
            ),
            FoodCommands::Status { status, date, json } => {
                cmd_food_status(&mut svc, &user, &status, date, json)
            }
            FoodCommands::Delete { id, json } => cmd_food_delete(&mut svc, id, json),
        },
        Commands::Weight { command } => match command {
            WeightCommands::Log {
                value,
                unit,
                date,
                notes,
                json,
            } => cmd_weight_log(&mut svc, &user, value, &unit, date, notes, json),
            WeightCommands::Show { date, json } => cmd_weight_show(&svc, &user, date, json),
            WeightCommands::History { days, json } => cmd_weight_history(&svc, &user, days, json),
            WeightCommands::Delete { id, json } => cmd_weight_delete(&mut svc, id, json),
        },
        Commands::Summary {
            domain,
            days,
            oldest_first,
            json,
        } => cmd_history(&mut svc, &user, &domain, days, oldest_first, json),
        Commands::Import { command } => match command {
            ImportCommands::Food {
                file,
                dry_run,
                json,
            } => cmd_import_food(&mut svc, &user, &file, dry_run, json),
        },
    }
}
