pub mod catalog;
pub mod db;
pub mod error;
pub mod models;
pub mod performance;
pub mod service;

pub use error::{TrackerError, ValidationError};
pub use models::{BestPerformance, Exercise, ExerciseTemplate, LastDone, LogEntry, LogInput};
pub use service::{Change, DatasetObserver, STORAGE_KEY, Tracker};
