use anyhow::Result;
use serde::Serialize;

use liftlog_core::{Exercise, LogEntry, LogInput, Tracker, TrackerError};

use super::helpers::{describe_best, describe_last_done, format_set};

/// True when `entry` is the exercise's best and it beat earlier history.
/// Ties keep the earlier entry, so matching the timestamp is enough.
pub(crate) fn is_new_best(exercise: &Exercise, entry: &LogEntry) -> bool {
    exercise.logs.len() > 1
        && exercise
            .best_performance
            .as_ref()
            .is_some_and(|b| b.timestamp == entry.timestamp)
}

pub(crate) fn cmd_log(
    tracker: &mut Tracker,
    exercise_id: &str,
    sets: &str,
    reps: &str,
    weight: &str,
    json: bool,
) -> Result<()> {
    let input = LogInput::parse(sets, reps, weight)?;
    let entry = tracker.log_workout(exercise_id, &input)?;
    let exercise = tracker
        .exercise(exercise_id)
        .ok_or_else(|| TrackerError::UnknownExercise(exercise_id.to_string()))?;

    if json {
        #[derive(Serialize)]
        struct Logged<'a> {
            entry: &'a LogEntry,
            exercise: &'a Exercise,
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&Logged {
                entry: &entry,
                exercise,
            })?
        );
        return Ok(());
    }

    let name = &exercise.name;
    let set = format_set(entry.sets, entry.reps, entry.weight);
    let volume = entry.volume();
    println!("Logged: {name} {set}, volume {volume:.2}");
    println!(
        "  Last time done:            {}",
        describe_last_done(exercise.last_done.as_ref())
    );
    println!(
        "  Best performance (volume): {}",
        describe_best(exercise.best_performance.as_ref())
    );
    if is_new_best(exercise, &entry) {
        println!("  New best performance!");
    }

    Ok(())
}
