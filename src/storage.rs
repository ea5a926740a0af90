//! Durable storage for the workout collection.
//!
//! The whole collection lives in one slot of a string key-value store,
//! encoded as a JSON array of plain records. Reading never fails: a missing
//! or unreadable slot is the same as an empty history.

use crate::dlog;
use crate::error::PersistenceError;
use crate::types::{Coordinates, Details, Workout, WorkoutId, WorkoutKind};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const STORAGE_KEY: &str = "workout";

/// A string slot store, in the spirit of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "opened file store");
        Ok(Self { dir })
    }

    /// Platform data directory, or `./.mapty` when none can be determined.
    pub fn default_dir() -> PathBuf {
        ProjectDirs::from("", "", "mapty")
            .map_or_else(|| PathBuf::from(".mapty"), |d| d.data_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        // Write next to the target, then rename over it.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.slot_path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.slot_path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Plain record as written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWorkout {
    kind: WorkoutKind,
    id: WorkoutId,
    #[serde(rename = "createdAtISO")]
    created_at_iso: DateTime<Utc>,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    #[serde(default)]
    click_count: u32,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cadence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation_gain_m: Option<f64>,
}

impl From<&Workout> for StoredWorkout {
    fn from(w: &Workout) -> Self {
        let (cadence, elevation_gain_m) = match w.metrics().details() {
            Details::Running { cadence } => (Some(cadence), None),
            Details::Cycling { elevation_gain_m } => (None, Some(elevation_gain_m)),
        };

        Self {
            kind: w.kind(),
            id: w.id().clone(),
            created_at_iso: w.created_at(),
            coordinates: w.coordinates(),
            distance_km: w.distance_km(),
            duration_min: w.duration_min(),
            click_count: w.click_count(),
            description: w.describe().to_string(),
            pace: w.pace(),
            speed: w.speed(),
            cadence,
            elevation_gain_m,
        }
    }
}

impl StoredWorkout {
    /// Rebuilds a full workout; stored pace/speed are ignored and recomputed.
    fn into_workout(self) -> Result<Workout, String> {
        let details = match self.kind {
            WorkoutKind::Running => Details::Running {
                cadence: self.cadence.ok_or("running record without cadence")?,
            },
            WorkoutKind::Cycling => Details::Cycling {
                elevation_gain_m: self
                    .elevation_gain_m
                    .ok_or("cycling record without elevationGainM")?,
            },
        };

        Workout::restore(
            self.id,
            self.created_at_iso,
            self.coordinates,
            self.distance_km,
            self.duration_min,
            self.click_count,
            Some(self.description),
            details,
        )
        .map_err(|e| e.to_string())
    }
}

/// Saves and loads the ordered workout collection under a single key.
#[derive(Debug)]
pub struct WorkoutStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> WorkoutStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub const fn backend(&self) -> &S {
        &self.store
    }

    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), PersistenceError> {
        let records: Vec<StoredWorkout> = workouts.iter().map(StoredWorkout::from).collect();
        let json = serde_json::to_string(&records)?;
        self.store.set(&self.key, &json)?;
        dlog!("saved key={} workouts={}", self.key, records.len());
        Ok(())
    }

    /// Previously saved workouts in order; empty if nothing usable is stored.
    pub fn load(&self) -> Vec<Workout> {
        match self.try_load() {
            Ok(workouts) => workouts,
            Err(e) => {
                dlog!("load_failed key={} err={e}", self.key);
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<Workout>, PersistenceError> {
        let Some(raw) = self
            .store
            .get(&self.key)
            .map_err(PersistenceError::ReadIo)?
        else {
            return Ok(Vec::new());
        };

        let records: Vec<JsonValue> =
            serde_json::from_str(&raw).map_err(PersistenceError::Parse)?;

        let mut out = Vec::with_capacity(records.len());
        for (idx, value) in records.into_iter().enumerate() {
            let restored = serde_json::from_value::<StoredWorkout>(value)
                .map_err(|e| e.to_string())
                .and_then(StoredWorkout::into_workout);
            match restored {
                Ok(w) => out.push(w),
                Err(err) => tracing::warn!(idx, %err, "skipping unreadable stored workout"),
            }
        }

        Ok(out)
    }

    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.store.remove(&self.key)?;
        tracing::info!(key = %self.key, "cleared stored workouts");
        Ok(())
    }
}
