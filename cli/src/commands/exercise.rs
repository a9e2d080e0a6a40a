use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use liftlog_core::{Exercise, Tracker};

use super::helpers::{
    describe_best, describe_last_done, format_set, format_timestamp, format_weight, json_error,
    no_neg_zero, truncate,
};

pub(crate) fn last_done_cell(exercise: &Exercise) -> String {
    exercise.last_done.as_ref().map_or_else(
        || "Never".to_string(),
        |l| {
            format!(
                "{} ({})",
                format_set(l.sets, l.reps, l.weight),
                format_timestamp(&l.timestamp)
            )
        },
    )
}

pub(crate) fn best_cell(exercise: &Exercise) -> String {
    exercise.best_performance.as_ref().map_or_else(
        || "No data".to_string(),
        |b| {
            format!(
                "{} = {:.2}",
                format_set(b.sets, b.reps, b.weight),
                no_neg_zero(b.volume)
            )
        },
    )
}

pub(crate) fn cmd_list(tracker: &Tracker, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct ExerciseRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Logs")]
        logs: usize,
        #[tabled(rename = "Last Done")]
        last_done: String,
        #[tabled(rename = "Best (Volume)")]
        best: String,
    }

    let exercises = tracker.exercises();

    if json {
        println!("{}", serde_json::to_string_pretty(exercises)?);
        return Ok(());
    }

    let rows: Vec<ExerciseRow> = exercises
        .iter()
        .map(|e| ExerciseRow {
            id: e.id.clone(),
            name: truncate(&e.name, 30),
            logs: e.logs.len(),
            last_done: last_done_cell(e),
            best: best_cell(e),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(2)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_show(tracker: &Tracker, exercise_id: &str, json: bool) -> Result<()> {
    let Some(exercise) = tracker.exercise(exercise_id) else {
        let message = format!("No exercise with ID '{exercise_id}'");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}. Use `liftlog list` to see all exercises.");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(exercise)?);
        return Ok(());
    }

    let name = &exercise.name;
    let id = &exercise.id;
    println!("=== {name} ({id}) ===\n");
    if !tracker.catalog().iter().any(|t| t.id == exercise.id) {
        println!("  (no longer in the exercise catalog)\n");
    }
    if !exercise.description.is_empty() {
        println!("  {}", exercise.description);
    }
    if !exercise.media_url.is_empty() {
        println!("  Demo: {}", exercise.media_url);
    }
    if !exercise.unreadable_logs.is_empty() {
        println!(
            "  {} stored entries could not be read and are kept as-is",
            exercise.unreadable_logs.len()
        );
    }
    println!();
    println!(
        "  Last time done:            {}",
        describe_last_done(exercise.last_done.as_ref())
    );
    println!(
        "  Best performance (volume): {}",
        describe_best(exercise.best_performance.as_ref())
    );
    println!();

    if exercise.logs.is_empty() {
        eprintln!("No workouts logged yet. Use `liftlog log {id} <sets> <reps> <weight>`.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct LogRow {
        #[tabled(rename = "When")]
        when: String,
        #[tabled(rename = "Sets")]
        sets: u32,
        #[tabled(rename = "Reps")]
        reps: u32,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Volume")]
        volume: String,
    }

    // Newest first
    let rows: Vec<LogRow> = exercise
        .logs
        .iter()
        .rev()
        .map(|l| LogRow {
            when: format_timestamp(&l.timestamp),
            sets: l.sets,
            reps: l.reps,
            weight: format_weight(l.weight),
            volume: format!("{:.2}", no_neg_zero(l.volume())),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
