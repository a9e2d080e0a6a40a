use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeSeq, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::performance;

/// A canonical catalog record. Catalog fields of every stored exercise are
/// overwritten from these on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub media_url: &'static str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(alias = "gifUrl", alias = "mediaRef")]
    pub media_url: String,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    /// Stored entries that could not be read as a [`LogEntry`]. They take no
    /// part in the summaries but are written back with `logs`.
    #[serde(skip)]
    pub unreadable_logs: Vec<Value>,
    #[serde(default)]
    pub last_done: Option<LastDone>,
    #[serde(default)]
    pub best_performance: Option<BestPerformance>,
}

impl Serialize for Exercise {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("Exercise", 7)?;
        record.serialize_field("id", &self.id)?;
        record.serialize_field("name", &self.name)?;
        record.serialize_field("description", &self.description)?;
        record.serialize_field("mediaUrl", &self.media_url)?;
        record.serialize_field("logs", &AllLogs(self))?;
        record.serialize_field("lastDone", &self.last_done)?;
        record.serialize_field("bestPerformance", &self.best_performance)?;
        record.end()
    }
}

struct AllLogs<'a>(&'a Exercise);

impl Serialize for AllLogs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Exercise {
            logs,
            unreadable_logs,
            ..
        } = self.0;
        let mut seq = serializer.serialize_seq(Some(logs.len() + unreadable_logs.len()))?;
        for entry in logs {
            seq.serialize_element(entry)?;
        }
        for raw in unreadable_logs {
            seq.serialize_element(raw)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    // Older datasets were written before volume was stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastDone {
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPerformance {
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    pub volume: f64,
    pub timestamp: String,
}

/// Raw numbers for one workout submission, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogInput {
    pub sets: i64,
    pub reps: i64,
    pub weight: f64,
}

#[must_use]
pub fn compute_volume(sets: u32, reps: u32, weight: f64) -> f64 {
    f64::from(sets) * f64::from(reps) * weight
}

impl Exercise {
    #[must_use]
    pub fn from_template(template: &ExerciseTemplate) -> Self {
        Self {
            id: template.id.to_string(),
            name: template.name.to_string(),
            description: template.description.to_string(),
            media_url: template.media_url.to_string(),
            logs: Vec::new(),
            unreadable_logs: Vec::new(),
            last_done: None,
            best_performance: None,
        }
    }

    pub fn apply_template(&mut self, template: &ExerciseTemplate) {
        self.name = template.name.to_string();
        self.description = template.description.to_string();
        self.media_url = template.media_url.to_string();
    }

    /// Validate `input`, append a new entry stamped `at`, and refresh the
    /// derived summaries. On a validation error the exercise is untouched.
    pub fn record(
        &mut self,
        input: &LogInput,
        at: DateTime<Utc>,
    ) -> Result<LogEntry, ValidationError> {
        let (sets, reps, weight) = input.validate()?;
        let entry = LogEntry::new(sets, reps, weight, at);
        self.logs.push(entry.clone());
        performance::refresh(self);
        Ok(entry)
    }
}

impl LogEntry {
    #[must_use]
    pub fn new(sets: u32, reps: u32, weight: f64, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            sets,
            reps,
            weight,
            volume: Some(compute_volume(sets, reps, weight)),
        }
    }

    /// Stored volume, or the computed one for entries that never had it.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.volume
            .unwrap_or_else(|| compute_volume(self.sets, self.reps, self.weight))
    }

    /// The timestamp as an instant. `None` when it does not parse as RFC 3339.
    #[must_use]
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl From<&LogEntry> for LastDone {
    fn from(entry: &LogEntry) -> Self {
        Self {
            sets: entry.sets,
            reps: entry.reps,
            weight: entry.weight,
            timestamp: entry.timestamp.clone(),
        }
    }
}

impl From<&LogEntry> for BestPerformance {
    fn from(entry: &LogEntry) -> Self {
        Self {
            sets: entry.sets,
            reps: entry.reps,
            weight: entry.weight,
            volume: entry.volume(),
            timestamp: entry.timestamp.clone(),
        }
    }
}

impl LogInput {
    /// Parse raw text fields. Sets and reps must be whole numbers.
    pub fn parse(sets: &str, reps: &str, weight: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            sets: parse_whole("sets", sets)?,
            reps: parse_whole("reps", reps)?,
            weight: weight
                .trim()
                .parse()
                .map_err(|_| ValidationError::NotANumber {
                    field: "weight",
                    value: weight.to_string(),
                })?,
        })
    }

    /// Returns `(sets, reps, weight)` ready to be stored.
    pub fn validate(&self) -> Result<(u32, u32, f64), ValidationError> {
        let sets = positive_count("sets", self.sets)?;
        let reps = positive_count("reps", self.reps)?;
        if !self.weight.is_finite() {
            return Err(ValidationError::NonFiniteWeight);
        }
        if self.weight < 0.0 {
            return Err(ValidationError::NegativeWeight(self.weight));
        }
        // -0.0 passes the check above; store it as plain zero
        let weight = if self.weight == 0.0 { 0.0 } else { self.weight };
        if !compute_volume(sets, reps, weight).is_finite() {
            return Err(ValidationError::VolumeOverflow);
        }
        Ok((sets, reps, weight))
    }
}

fn parse_whole(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })
}

fn positive_count(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    u32::try_from(value).map_err(|_| ValidationError::OutOfRange { field, value })
}
