use chrono::{DateTime, Local};
use serde::Serialize;

use liftlog_core::{BestPerformance, LastDone};

/// Render an RFC 3339 timestamp in local time, or `N/A` when it does not parse.
pub(crate) fn format_timestamp(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp).map_or_else(
        |_| "N/A".to_string(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

pub(crate) fn format_weight(kg: f64) -> String {
    format!("{} kg", no_neg_zero(kg))
}

/// `3×10 @ 50 kg`
pub(crate) fn format_set(sets: u32, reps: u32, weight: f64) -> String {
    format!("{sets}×{reps} @ {}", format_weight(weight))
}

pub(crate) fn describe_last_done(last: Option<&LastDone>) -> String {
    match last {
        Some(l) => format!(
            "Sets: {}, Reps: {}, Weight: {} (On: {})",
            l.sets,
            l.reps,
            format_weight(l.weight),
            format_timestamp(&l.timestamp)
        ),
        None => "Never".to_string(),
    }
}

pub(crate) fn describe_best(best: Option<&BestPerformance>) -> String {
    match best {
        Some(b) => format!(
            "Sets: {}, Reps: {}, Weight: {} (Volume: {:.2}) (On: {})",
            b.sets,
            b.reps,
            format_weight(b.weight),
            no_neg_zero(b.volume),
            format_timestamp(&b.timestamp)
        ),
        None => "No data".to_string(),
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Shorten a table cell to `max` characters, marking the cut with "...".
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
