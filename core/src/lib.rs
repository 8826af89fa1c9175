//! Core library for vitals — a local-first daily health journal.
//!
//! Raw logs (medication/supplement intake, exercise sessions, food
//! consumption, body weight) live in SQLite. Each mutation triggers a
//! total recompute of the affected per-user-per-day summary rows, cached
//! range queries are invalidated precisely, and history reads come back
//! as dense day sequences.

pub mod cache;
pub mod db;
pub mod fill;
pub mod import;
pub mod models;
pub mod optimistic;
pub mod recompute;
pub mod service;
pub mod triggers;

pub use cache::{RangeCache, RangeKey, SummaryCaches};
pub use fill::{DayRow, FillOrder, day_span, fill_days, fill_weight_days, min_allowed_day};
pub use optimistic::provisional_consumed;
pub use recompute::{Rollup, recompute_consumed, recompute_exercise, recompute_medication};
pub use service::VitalsService;
pub use triggers::{Mutation, refresh_day, refresh_summaries};
