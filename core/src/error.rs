use thiserror::Error;

/// Rejected workout input. Nothing is mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a number (got '{value}')")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be greater than 0 (got {value})")]
    NotPositive { field: &'static str, value: i64 },

    #[error("{field} is too large (got {value})")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("weight must not be negative (got {0})")]
    NegativeWeight(f64),

    #[error("weight must be a finite number")]
    NonFiniteWeight,

    #[error("sets x reps x weight is too large to record")]
    VolumeOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Exercise '{0}' not found")]
    UnknownExercise(String),
}
