use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{Exercise, ExerciseTemplate, LogEntry};

pub const CATALOG: &[ExerciseTemplate] = &[
    ExerciseTemplate {
        id: "bench_press",
        name: "Bench Press",
        description: "Targets chest, shoulders, and triceps. Lie on a bench, lower a barbell to your mid-chest, and press it back up.",
        media_url: "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExYmE5YWY1ZDUzM2YwZmM5YjA4Y2I4YjBiOGJmZDM2ODhmYTA1ZDNjYiZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/BhKh9KNXz213sVLncx/giphy.gif",
    },
    ExerciseTemplate {
        id: "barbell_squat",
        name: "Barbell Squat",
        description: "A compound exercise for legs and glutes. Place a barbell on your upper back, squat down as if sitting in a chair, keeping your back straight.",
        media_url: "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExMDZjZTE3MGY4ZGRiNTA0M2RkODNiMDU5ZTljM2RhNzAyZDM4MGM4MyZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/B0l9l52Q3Gx2P83q2X/giphy.gif",
    },
    ExerciseTemplate {
        id: "deadlift",
        name: "Deadlift",
        description: "Works multiple muscle groups including back, legs, and glutes. Lift a barbell off the floor to hip level, keeping your back straight.",
        media_url: "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExMGNkYmFiZmRiMDhiNjg4YWVkMzFjZmE5ZTVmZDI5ZjgwNTgzZGViYyZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/c6MfzLMDtlU2I72g0m/giphy.gif",
    },
    ExerciseTemplate {
        id: "overhead_press",
        name: "Overhead Press (OHP)",
        description: "Targets shoulders and triceps. Stand and press a barbell from your front shoulders overhead until arms are fully extended.",
        media_url: "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExZDdhNTgzZjM2MTA1NmNhMjQyYzc2MjhhNDU2Mjk5OWQ2YWY5Y2UwMiZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/Q98ONYJ2sgWu8JKhDE/giphy.gif",
    },
    ExerciseTemplate {
        id: "bicep_curl_db",
        name: "Dumbbell Bicep Curl",
        description: "Isolates the biceps. Stand or sit, holding dumbbells with an underhand grip. Curl the dumbbells up towards your shoulders.",
        media_url: "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExMTViYjk0M2U0ZGQzYjE3NTMxMjg2MTg5MmM5NTM0MDZjZWMzOWUxMiZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/Y2A2Ra3dJT2ihf7m0M/giphy.gif",
    },
];

#[must_use]
pub fn template(id: &str) -> Option<&'static ExerciseTemplate> {
    CATALOG.iter().find(|t| t.id == id)
}

/// One exercise record as read back from storage, before reconciliation.
///
/// Catalog fields are optional here because they are overwritten for every
/// catalog id anyway; they only matter for stale ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredExercise {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub logs: Vec<LogEntry>,
    /// Entries that are not valid log entries, carried verbatim.
    pub unreadable_logs: Vec<Value>,
}

impl StoredExercise {
    fn from_value(index: usize, value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            warn!(index, "Dropping stored exercise that is not an object");
            return None;
        };
        let Some(id) = take_string(&mut map, &["id"]).filter(|id| !id.trim().is_empty()) else {
            warn!(index, "Dropping stored exercise without an id");
            return None;
        };

        let (logs, unreadable_logs) = match map.remove("logs") {
            Some(Value::Array(items)) => read_logs(&id, items),
            None | Some(Value::Null) => (Vec::new(), Vec::new()),
            Some(_) => {
                warn!(id = %id, "Stored logs are not a list, starting empty");
                (Vec::new(), Vec::new())
            }
        };

        Some(Self {
            name: take_string(&mut map, &["name"]),
            description: take_string(&mut map, &["description"]),
            media_url: take_string(&mut map, &["mediaUrl", "gifUrl", "mediaRef"]),
            id,
            logs,
            unreadable_logs,
        })
    }

    fn into_exercise(self) -> Exercise {
        Exercise {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            description: self.description.unwrap_or_default(),
            media_url: self.media_url.unwrap_or_default(),
            id: self.id,
            logs: self.logs,
            unreadable_logs: self.unreadable_logs,
            last_done: None,
            best_performance: None,
        }
    }
}

/// Split stored entries into usable ones and the rest. Older datasets stored
/// numbers as strings; those are converted first. Nothing is discarded.
fn read_logs(id: &str, items: Vec<Value>) -> (Vec<LogEntry>, Vec<Value>) {
    let mut logs = Vec::with_capacity(items.len());
    let mut unreadable = Vec::new();
    for mut item in items {
        coerce_numeric_strings(&mut item);
        match serde_json::from_value::<LogEntry>(item.clone()) {
            Ok(entry) => logs.push(entry),
            Err(_) => unreadable.push(item),
        }
    }
    if !unreadable.is_empty() {
        warn!(
            id = %id,
            count = unreadable.len(),
            "Keeping unreadable log entries as stored"
        );
    }
    (logs, unreadable)
}

fn coerce_numeric_strings(item: &mut Value) {
    let Value::Object(entry) = item else {
        return;
    };
    for key in ["sets", "reps", "weight", "volume"] {
        let parsed = match entry.get(key) {
            Some(Value::String(text)) => parse_number(key, text),
            _ => None,
        };
        if let Some(number) = parsed {
            entry.insert(key.to_string(), number);
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_number(key: &str, text: &str) -> Option<Value> {
    let value: f64 = text.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    if matches!(key, "sets" | "reps") {
        // Counts must stay whole; "2.5" reps is left for the caller to reject.
        let whole = value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX);
        return whole.then(|| Value::from(value as u32));
    }
    serde_json::Number::from_f64(value).map(Value::Number)
}

fn take_string(map: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.remove(*key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn parse_records(blob: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(blob).context("Dataset is not valid JSON")?;
    let Value::Array(records) = value else {
        bail!("Dataset is not a list of exercises");
    };
    Ok(records)
}

/// Parse a stored dataset leniently: a record without an id is dropped on its
/// own instead of failing the whole blob, and log entries that cannot be read
/// are kept verbatim. Only a blob that is not a JSON array is an error.
pub fn parse_stored(blob: &str) -> Result<Vec<StoredExercise>> {
    Ok(parse_records(blob)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| StoredExercise::from_value(index, record))
        .collect())
}

/// Parse an exported dataset. Unlike [`parse_stored`], every record must be
/// an exercise with an id; log entries are read the same way.
pub fn parse_export(json: &str) -> Result<Vec<StoredExercise>> {
    parse_records(json)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            StoredExercise::from_value(index, record)
                .with_context(|| format!("Record {} is not an exercise with an id", index + 1))
        })
        .collect()
}

/// Merge the canonical catalog with whatever was persisted.
///
/// With nothing persisted, every template becomes a fresh exercise. Otherwise
/// stored exercises keep their order and history, catalog fields are
/// overwritten from the templates, missing catalog ids are appended, and ids
/// no longer in the catalog are kept untouched. A repeated id is folded into
/// its first record, history included. Derived summaries are left
/// empty for the caller to refresh.
#[must_use]
pub fn reconcile(
    catalog: &[ExerciseTemplate],
    persisted: Option<Vec<StoredExercise>>,
) -> Vec<Exercise> {
    let Some(stored) = persisted else {
        return catalog.iter().map(Exercise::from_template).collect();
    };

    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut exercises: Vec<Exercise> = Vec::with_capacity(stored.len().max(catalog.len()));
    for record in stored {
        if let Some(&position) = positions.get(&record.id) {
            warn!(id = %record.id, "Merging duplicate stored exercise into the first one");
            let first = &mut exercises[position];
            first.logs.extend(record.logs);
            first.unreadable_logs.extend(record.unreadable_logs);
            continue;
        }
        positions.insert(record.id.clone(), exercises.len());
        exercises.push(record.into_exercise());
    }

    for template in catalog {
        match exercises.iter_mut().find(|e| e.id == template.id) {
            Some(existing) => existing.apply_template(template),
            None => exercises.push(Exercise::from_template(template)),
        }
    }

    exercises
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(exercises: &[Exercise]) -> Vec<&str> {
        exercises.iter().map(|e| e.id.as_str()).collect()
    }

    fn stored(id: &str, logs: Vec<LogEntry>) -> StoredExercise {
        StoredExercise {
            id: id.to_string(),
            name: Some("Old name".to_string()),
            description: Some("Old description".to_string()),
            media_url: Some("https://example.com/old.gif".to_string()),
            logs,
            unreadable_logs: Vec::new(),
        }
    }

    fn log(timestamp: &str) -> LogEntry {
        LogEntry {
            timestamp: timestamp.to_string(),
            sets: 3,
            reps: 10,
            weight: 50.0,
            volume: Some(1500.0),
        }
    }

    #[test]
    fn test_catalog_ids_unique() {
        let unique: HashSet<&str> = CATALOG.iter().map(|t| t.id).collect();
        assert_eq!(unique.len(), CATALOG.len());
    }

    #[test]
    fn test_template_lookup() {
        assert_eq!(template("deadlift").unwrap().name, "Deadlift");
        assert!(template("leg_press").is_none());
    }

    #[test]
    fn test_reconcile_fresh() {
        let exercises = reconcile(CATALOG, None);
        assert_eq!(exercises.len(), CATALOG.len());
        for (ex, t) in exercises.iter().zip(CATALOG) {
            assert_eq!(ex.id, t.id);
            assert_eq!(ex.name, t.name);
            assert_eq!(ex.description, t.description);
            assert_eq!(ex.media_url, t.media_url);
            assert!(ex.logs.is_empty());
            assert!(ex.last_done.is_none());
        }
    }

    #[test]
    fn test_reconcile_empty_persisted() {
        let exercises = reconcile(CATALOG, Some(vec![]));
        assert_eq!(
            ids(&exercises),
            CATALOG.iter().map(|t| t.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_reconcile_overwrites_catalog_fields() {
        let exercises = reconcile(CATALOG, Some(vec![stored("deadlift", vec![])]));
        let deadlift = exercises.iter().find(|e| e.id == "deadlift").unwrap();
        let t = template("deadlift").unwrap();
        assert_eq!(deadlift.name, t.name);
        assert_eq!(deadlift.description, t.description);
        assert_eq!(deadlift.media_url, t.media_url);
    }

    #[test]
    fn test_reconcile_preserves_logs_and_order() {
        let logs = vec![log("2024-06-15T09:00:00.000Z"), log("2024-06-10T09:00:00.000Z")];
        let exercises = reconcile(
            CATALOG,
            Some(vec![stored("deadlift", logs.clone()), stored("bench_press", vec![])]),
        );
        assert_eq!(exercises[0].id, "deadlift");
        assert_eq!(exercises[0].logs, logs);
        assert_eq!(exercises[1].id, "bench_press");
        // remaining catalog ids appended in catalog order
        assert_eq!(
            ids(&exercises[2..]),
            vec!["barbell_squat", "overhead_press", "bicep_curl_db"]
        );
    }

    #[test]
    fn test_reconcile_keeps_stale_ids() {
        let exercises = reconcile(
            CATALOG,
            Some(vec![stored("leg_press", vec![log("2024-06-15T09:00:00.000Z")])]),
        );
        assert_eq!(exercises.len(), CATALOG.len() + 1);
        let stale = &exercises[0];
        assert_eq!(stale.id, "leg_press");
        assert_eq!(stale.name, "Old name");
        assert_eq!(stale.logs.len(), 1);
    }

    #[test]
    fn test_reconcile_merges_duplicate_ids() {
        let exercises = reconcile(
            CATALOG,
            Some(vec![
                stored("deadlift", vec![]),
                stored("deadlift", vec![log("2024-06-15T09:00:00.000Z")]),
                stored("deadlift", vec![log("2024-06-16T09:00:00.000Z")]),
            ]),
        );
        let deadlifts: Vec<&Exercise> = exercises.iter().filter(|e| e.id == "deadlift").collect();
        assert_eq!(deadlifts.len(), 1);
        assert_eq!(deadlifts[0].logs.len(), 2);
        assert_eq!(exercises[0].id, "deadlift");
    }

    #[test]
    fn test_reconcile_never_loses_entries() {
        let blob = r#"[
            {"id": "deadlift", "logs": []},
            {"id": "deadlift", "logs": [
                {"timestamp": "2024-06-15T09:00:00.000Z", "sets": 3, "reps": 5, "weight": 100}
            ]},
            {"id": "bench_press", "logs": [
                {"timestamp": "2024-06-15T09:00:00.000Z", "sets": "3", "reps": "10", "weight": "50"},
                {"timestamp": "2024-06-16T09:00:00.000Z", "sets": "three"}
            ]}
        ]"#;
        let exercises = reconcile(CATALOG, Some(parse_stored(blob).unwrap()));
        let total: usize = exercises
            .iter()
            .map(|e| e.logs.len() + e.unreadable_logs.len())
            .sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_reconcile_subset_catalog() {
        let catalog = [CATALOG[0]];
        let exercises = reconcile(&catalog, None);
        assert_eq!(ids(&exercises), vec!["bench_press"]);
    }

    #[test]
    fn test_parse_stored_legacy_blob() {
        let blob = r#"[
            {
                "id": "bench_press",
                "name": "Bench",
                "description": "old",
                "gifUrl": "https://example.com/old.gif",
                "logs": [
                    {"timestamp": "2024-06-15T09:00:00.000Z", "sets": 3, "reps": 10, "weight": 50}
                ],
                "lastDone": null,
                "bestPerformance": null
            }
        ]"#;
        let records = parse_stored(blob).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "bench_press");
        assert_eq!(
            records[0].media_url.as_deref(),
            Some("https://example.com/old.gif")
        );
        assert_eq!(records[0].logs.len(), 1);
        assert!(records[0].logs[0].volume.is_none());
    }

    #[test]
    fn test_parse_stored_missing_or_corrupt_logs() {
        let blob = r#"[
            {"id": "bench_press"},
            {"id": "deadlift", "logs": null},
            {"id": "barbell_squat", "logs": "oops"}
        ]"#;
        let records = parse_stored(blob).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.logs.is_empty()));
    }

    #[test]
    fn test_parse_stored_keeps_unreadable_entries() {
        let blob = r#"[
            {"id": "bench_press", "logs": [
                {"timestamp": "2024-06-15T09:00:00.000Z", "sets": 3, "reps": 10, "weight": 50, "volume": 1500},
                {"timestamp": "2024-06-16T09:00:00.000Z", "sets": "three"},
                42
            ]}
        ]"#;
        let records = parse_stored(blob).unwrap();
        assert_eq!(records[0].logs.len(), 1);
        assert_eq!(records[0].logs[0].volume, Some(1500.0));
        assert_eq!(records[0].unreadable_logs.len(), 2);
        assert_eq!(records[0].unreadable_logs[1], serde_json::json!(42));
    }

    #[test]
    fn test_parse_stored_numeric_strings() {
        let blob = r#"[
            {"id": "bench_press", "logs": [
                {"timestamp": "2024-06-15T09:00:00.000Z", "sets": "3", "reps": " 10 ", "weight": "52.5"},
                {"timestamp": "2024-06-16T09:00:00.000Z", "sets": "3", "reps": "2.5", "weight": "50"}
            ]}
        ]"#;
        let records = parse_stored(blob).unwrap();
        let entry = &records[0].logs[0];
        assert_eq!((entry.sets, entry.reps), (3, 10));
        assert!((entry.weight - 52.5).abs() < f64::EPSILON);
        assert!(entry.volume.is_none());
        // fractional reps cannot become a count; kept as stored
        assert_eq!(records[0].unreadable_logs.len(), 1);
        assert_eq!(records[0].unreadable_logs[0]["reps"], "2.5");
    }

    #[test]
    fn test_parse_stored_drops_records_without_id() {
        let blob = r#"[{"name": "nameless"}, {"id": ""}, "text", {"id": "deadlift"}]"#;
        let records = parse_stored(blob).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "deadlift");
    }

    #[test]
    fn test_parse_export_requires_ids() {
        assert!(parse_export(r#"[{"id": "deadlift"}, {"name": "nameless"}]"#).is_err());
        let records = parse_export(r#"[{"id": "deadlift", "logs": [7]}]"#).unwrap();
        assert_eq!(records[0].unreadable_logs, vec![serde_json::json!(7)]);
    }

    #[test]
    fn test_parse_stored_rejects_non_array() {
        assert!(parse_stored("not json").is_err());
        assert!(parse_stored("{}").is_err());
        assert!(parse_stored("null").is_err());
    }
}
