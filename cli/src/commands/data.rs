use anyhow::{Context, Result};
use std::path::Path;

use liftlog_core::Tracker;

pub(crate) fn cmd_export(tracker: &Tracker, output: Option<&Path>) -> Result<()> {
    let json = tracker.export_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            let count = tracker.exercises().len();
            eprintln!("Exported {count} exercises to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

pub(crate) fn cmd_import(tracker: &mut Tracker, file: &Path, json: bool) -> Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {}", file.display()))?;
    let entries = tracker.import_json(&data)?;
    let exercises = tracker.exercises().len();

    if json {
        println!(
            "{}",
            serde_json::json!({ "exercises": exercises, "log_entries": entries })
        );
    } else {
        println!("Imported {entries} log entries across {exercises} exercises");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog_core::LogInput;

    #[test]
    fn test_export_then_import_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("export.json");

        let mut source = Tracker::new_in_memory().unwrap();
        source
            .log_workout(
                "barbell_squat",
                &LogInput {
                    sets: 5,
                    reps: 5,
                    weight: 100.0,
                },
            )
            .unwrap();
        cmd_export(&source, Some(&path)).unwrap();

        let mut target = Tracker::new_in_memory().unwrap();
        cmd_import(&mut target, &path, true).unwrap();
        assert_eq!(target.exercises(), source.exercises());
    }

    #[test]
    fn test_import_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tracker = Tracker::new_in_memory().unwrap();
        let err = cmd_import(&mut tracker, &tmp.path().join("nope.json"), false).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read import file"));
    }
}
