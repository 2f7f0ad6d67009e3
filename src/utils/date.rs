// Date expression parsing for task dates

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use anyhow::{Context, Result};

fn local_to_utc(datetime: NaiveDateTime) -> Result<DateTime<Utc>> {
    let local_dt = Local.from_local_datetime(&datetime)
        .single()
        .ok_or_else(|| anyhow::anyhow!("Ambiguous or invalid local time: {}", datetime))?;
    Ok(local_dt.with_timezone(&Utc))
}

fn start_of_day(date: NaiveDate) -> Result<DateTime<Utc>> {
    let datetime = date.and_hms_opt(0, 0, 0)
        .context("Invalid date")?;
    local_to_utc(datetime)
}

/// Parse a date expression into a UTC timestamp.
///
/// Accepts `now`, `today`, `tomorrow`, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`,
/// `YYYY-MM-DDTHH:MM:SS` (all local time) and RFC 3339 with an offset.
pub fn parse_date_expr(expr: &str) -> Result<DateTime<Utc>> {
    let expr = expr.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(expr) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return start_of_day(date);
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(expr, format) {
            return local_to_utc(datetime);
        }
    }

    let today = Local::now().date_naive();
    match expr {
        "now" => Ok(Utc::now()),
        "today" => start_of_day(today),
        "tomorrow" => start_of_day(today + chrono::Duration::days(1)),
        _ => anyhow::bail!(
            "Unsupported date expression: '{}'. Use YYYY-MM-DD, YYYY-MM-DDTHH:MM, now, today or tomorrow.",
            expr
        ),
    }
}

/// Format a timestamp for display in local time
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
