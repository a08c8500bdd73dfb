//! The workout collection and its file persistence.
//!
//! The store is an ordered, in-memory list of workouts that callers own and
//! pass by `&mut` into a builder session. It is only appended to on save and
//! otherwise changed by favorite toggles or whole-workout replacement.

use crate::workout::{decode_workouts, Workout, WorkoutId};
use crate::{Error, NotFound, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Ordered collection of saved workouts
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new(workouts: Vec<Workout>) -> Self {
        Self { workouts }
    }

    /// Decode a store from a JSON array of workouts
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(decode_workouts(json)?))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.workouts)?)
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter()
    }

    pub fn favorites(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter().filter(|w| w.is_favorite)
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn get(&self, id: WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Next free workout id: one past the largest, starting at 1
    pub fn new_workout_id(&self) -> WorkoutId {
        self.workouts.iter().map(|w| w.id).max().unwrap_or(0) + 1
    }

    pub fn append(&mut self, workout: Workout) {
        tracing::info!("Added workout {} ({})", workout.id, workout.name);
        self.workouts.push(workout);
    }

    /// Swap in a new version of an existing workout, keeping its position
    pub fn replace(&mut self, workout: Workout) -> std::result::Result<(), NotFound> {
        let slot = self
            .workouts
            .iter_mut()
            .find(|w| w.id == workout.id)
            .ok_or(NotFound::Workout(workout.id))?;
        tracing::info!("Updated workout {} ({})", workout.id, workout.name);
        *slot = workout;
        Ok(())
    }

    pub fn remove(&mut self, id: WorkoutId) -> std::result::Result<Workout, NotFound> {
        let index = self
            .workouts
            .iter()
            .position(|w| w.id == id)
            .ok_or(NotFound::Workout(id))?;
        Ok(self.workouts.remove(index))
    }

    /// Flip a workout's favorite flag, returning the new value
    pub fn toggle_favorite(&mut self, id: WorkoutId) -> std::result::Result<bool, NotFound> {
        let workout = self
            .workouts
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(NotFound::Workout(id))?;
        Ok(workout.toggle_favorite())
    }

    /// Load the store from a file with shared locking
    ///
    /// A missing file yields the bundled workouts. A file that exists but
    /// does not decode is an error: silently dropping saved workouts is
    /// worse than refusing to start.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No workout file at {:?}, using bundled workouts", path);
            return crate::bundled::bundled_store();
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let store = Self::from_json(&contents)?;
        tracing::debug!("Loaded {} workouts from {:?}", store.len(), path);
        Ok(store)
    }

    /// Save the store to a file with exclusive locking
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// it over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(self.to_json_pretty()?.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} workouts to {:?}", self.len(), path);
        Ok(())
    }
}
