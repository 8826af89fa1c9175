mod exercise;
mod food;
mod helpers;
mod import;
mod med;
mod summary;
mod weight;

pub(crate) use exercise::{cmd_exercise_delete, cmd_exercise_list, cmd_exercise_log};
pub(crate) use food::{FoodLogArgs, cmd_food_delete, cmd_food_log, cmd_food_status};
pub(crate) use import::cmd_import_food;
pub(crate) use med::{cmd_med_delete, cmd_med_list, cmd_med_log};
pub(crate) use summary::cmd_history;
pub(crate) use weight::{cmd_weight_delete, cmd_weight_history, cmd_weight_log, cmd_weight_show};
