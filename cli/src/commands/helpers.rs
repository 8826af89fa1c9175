use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

/// Resolve an optional date argument. Ambient "today" lives here, at
/// the CLI boundary — core functions always take dates explicitly.
pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday")),
        },
    }
}

/// The inclusive [start, end] window for "last N days, ending today".
pub(crate) fn last_n_days(days: u32) -> (NaiveDate, NaiveDate) {
    let end = Local::now().date_naive();
    let start = end - chrono::Duration::days(i64::from(days.max(1)) - 1);
    (start, end)
}

pub(crate) fn fmt_opt(v: Option<f64>) -> String {
    v.map_or("-".into(), |v| format!("{v:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none_is_today() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2026-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_last_n_days_window() {
        let (start, end) = last_n_days(7);
        assert_eq!((end - start).num_days(), 6);

        // A zero-day request still yields a one-day window
        let (start, end) = last_n_days(0);
        assert_eq!(start, end);
    }

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(5.25)), "5.2");
        assert_eq!(fmt_opt(None), "-");
    }
}
