//! Derived summaries for an exercise's log history.
//!
//! `last_done` and `best_performance` are never trusted from storage: they are
//! recomputed from `logs` on every load and after every new entry.

use crate::models::{BestPerformance, Exercise, LastDone, LogEntry};

/// Recompute `last_done` and `best_performance` in place.
///
/// Backfills missing volumes and leaves `logs` in chronological order.
/// Entries with an unparsable timestamp sort before all others. The sort is
/// stable, so among equal instants the entry inserted last counts as the most
/// recent, and the earliest entry wins a tie for best volume.
pub fn refresh(exercise: &mut Exercise) {
    if exercise.logs.is_empty() {
        exercise.last_done = None;
        exercise.best_performance = None;
        return;
    }

    for entry in &mut exercise.logs {
        if entry.volume.is_none() {
            entry.volume = Some(entry.volume());
        }
    }

    exercise.logs.sort_by_key(LogEntry::recorded_at);

    exercise.last_done = exercise.logs.last().map(LastDone::from);
    exercise.best_performance = best_by_volume(&exercise.logs).map(BestPerformance::from);
}

pub fn refresh_all(exercises: &mut [Exercise]) {
    for exercise in exercises {
        refresh(exercise);
    }
}

/// First entry with the strictly greatest volume.
#[must_use]
pub fn best_by_volume(logs: &[LogEntry]) -> Option<&LogEntry> {
    let mut best: Option<&LogEntry> = None;
    for entry in logs {
        match best {
            Some(current) if entry.volume() <= current.volume() => {}
            _ => best = Some(entry),
        }
    }
    best
}
