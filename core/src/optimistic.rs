//! Provisional consumed-day rows for immediate UI feedback.
//!
//! The builder never invents sums — numeric totals only ever come from
//! the authoritative recompute. It synthesizes what the summary row
//! will look like after a status change, is shown at once, and is
//! superseded by the recompute result when it lands (last-writer-wins;
//! a failed background recompute does not roll the displayed row back).

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{ConsumedSummary, LogStatus};

/// Build the provisional row for a status change on (user, date).
///
/// With no previous row the result is zero-valued with
/// `created_at = now`. With a previous row, all numeric totals and
/// `created_at` are copied forward unchanged; `completed_at` is stamped
/// with `now` only when the incoming status is terminal, otherwise the
/// prior value is preserved.
#[must_use]
pub fn provisional_consumed(
    prev: Option<&ConsumedSummary>,
    user_id: &str,
    date: NaiveDate,
    status: LogStatus,
    now: DateTime<Utc>,
) -> ConsumedSummary {
    let mut row = match prev {
        Some(prev) => prev.clone(),
        None => {
            let mut fresh = ConsumedSummary::zero(user_id, date);
            fresh.created_at = now.to_rfc3339();
            fresh
        }
    };
    row.log_status = status;
    if status.is_terminal() {
        row.completed_at = Some(now.to_rfc3339());
    }
    row
}
