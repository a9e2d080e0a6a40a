use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::catalog::{self, CATALOG, StoredExercise};
use crate::db::Database;
use crate::error::TrackerError;
use crate::models::{Exercise, ExerciseTemplate, LogEntry, LogInput};
use crate::performance;

/// Storage key of the serialized exercise list.
pub const STORAGE_KEY: &str = "fitnessTrackerExercises";

/// What just happened to the working dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change<'a> {
    /// The dataset was loaded from storage (also replayed to new subscribers).
    Loaded,
    Logged {
        exercise_id: &'a str,
        entry: &'a LogEntry,
    },
    Imported,
}

/// Receives a "dataset changed" signal after every load or mutation.
///
/// Called synchronously, after the dataset has been persisted.
pub trait DatasetObserver {
    fn on_change(&self, change: &Change<'_>, exercises: &[Exercise]);
}

/// The running session: owns the store and the working dataset.
pub struct Tracker {
    db: Database,
    catalog: &'static [ExerciseTemplate],
    exercises: Vec<Exercise>,
    observers: Vec<Box<dyn DatasetObserver>>,
}

impl Tracker {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Self::with_database(db)
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Self::with_database(db)
    }

    pub fn with_database(db: Database) -> Result<Self> {
        Self::with_catalog(db, CATALOG)
    }

    /// Load, reconcile against `catalog`, derive summaries, and persist.
    pub fn with_catalog(db: Database, catalog: &'static [ExerciseTemplate]) -> Result<Self> {
        let persisted = read_persisted(&db);
        let mut exercises = catalog::reconcile(catalog, persisted);
        performance::refresh_all(&mut exercises);

        let tracker = Self {
            db,
            catalog,
            exercises,
            observers: Vec::new(),
        };
        tracker.persist()?;
        debug!(exercises = tracker.exercises.len(), "Loaded exercise dataset");
        Ok(tracker)
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn catalog(&self) -> &'static [ExerciseTemplate] {
        self.catalog
    }

    /// Register an observer. It is immediately sent `Change::Loaded` with the
    /// current dataset.
    pub fn subscribe(&mut self, observer: Box<dyn DatasetObserver>) {
        observer.on_change(&Change::Loaded, &self.exercises);
        self.observers.push(observer);
    }

    pub fn log_workout(&mut self, exercise_id: &str, input: &LogInput) -> Result<LogEntry> {
        self.log_workout_at(exercise_id, input, Utc::now())
    }

    /// Append a validated entry stamped `at`, re-derive that exercise's
    /// summaries, persist, and notify observers.
    ///
    /// Unknown ids and invalid input leave everything untouched. If the write
    /// fails the exercise is restored, so memory never runs ahead of storage.
    pub fn log_workout_at(
        &mut self,
        exercise_id: &str,
        input: &LogInput,
        at: DateTime<Utc>,
    ) -> Result<LogEntry> {
        let Some(index) = self.exercises.iter().position(|e| e.id == exercise_id) else {
            error!(exercise_id, "Log submitted for an exercise that is not loaded");
            return Err(TrackerError::UnknownExercise(exercise_id.to_string()).into());
        };

        let snapshot = self.exercises[index].clone();
        let entry = self.exercises[index].record(input, at)?;
        if let Err(e) = self.persist() {
            self.exercises[index] = snapshot;
            return Err(e);
        }

        info!(
            exercise_id,
            sets = entry.sets,
            reps = entry.reps,
            weight = entry.weight,
            "Logged workout"
        );
        self.notify(&Change::Logged {
            exercise_id,
            entry: &entry,
        });
        Ok(entry)
    }

    // --- Export / Import ---

    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.exercises).context("Failed to serialize exercises")
    }

    /// Replace the dataset with an exported one. Every record must be an
    /// exercise with an id; it is then reconciled against the catalog like a
    /// stored blob.
    /// Returns the number of log entries now held.
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let stored =
            catalog::parse_export(json).context("Import file is not a valid exercise export")?;

        let mut exercises = catalog::reconcile(self.catalog, Some(stored));
        performance::refresh_all(&mut exercises);

        let previous = std::mem::replace(&mut self.exercises, exercises);
        if let Err(e) = self.persist() {
            self.exercises = previous;
            return Err(e);
        }

        let entries: usize = self.exercises.iter().map(|e| e.logs.len()).sum();
        info!(entries, "Imported exercise dataset");
        self.notify(&Change::Imported);
        Ok(entries)
    }

    fn persist(&self) -> Result<()> {
        let blob =
            serde_json::to_string(&self.exercises).context("Failed to serialize exercises")?;
        self.db.put(STORAGE_KEY, &blob)?;
        debug!(bytes = blob.len(), "Persisted exercise dataset");
        Ok(())
    }

    fn notify(&self, change: &Change<'_>) {
        for observer in &self.observers {
            observer.on_change(change, &self.exercises);
        }
    }
}

/// Read and parse the stored dataset. Anything unreadable counts as "nothing
/// stored" so the tracker starts over from the catalog instead of failing.
fn read_persisted(db: &Database) -> Option<Vec<StoredExercise>> {
    let blob = match db.get(STORAGE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            let error = format!("{e:#}");
            warn!(%error, "Could not read stored exercises, starting fresh");
            return None;
        }
    };
    match catalog::parse_stored(&blob) {
        Ok(stored) => Some(stored),
        Err(e) => {
            let error = format!("{e:#}");
            warn!(%error, "Stored exercises are corrupt, starting fresh");
            None
        }
    }
}
