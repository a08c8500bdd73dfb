//! Workouts shipped with the library.
//!
//! Used as the starting collection when no workout file exists yet.

use crate::store::WorkoutStore;
use crate::workout::{decode_workouts, Workout};
use crate::Result;
use once_cell::sync::OnceCell;

const BUNDLED_JSON: &str = include_str!("../data/workouts.json");

/// Parsed bundled workouts, decoded on first use
static BUNDLED: OnceCell<Vec<Workout>> = OnceCell::new();

/// Get the bundled workouts, decoding them once
pub fn bundled_workouts() -> Result<&'static [Workout]> {
    BUNDLED
        .get_or_try_init(|| {
            let workouts = decode_workouts(BUNDLED_JSON)?;
            tracing::debug!("Decoded {} bundled workouts", workouts.len());
            Ok(workouts)
        })
        .map(Vec::as_slice)
}

/// A fresh store seeded with the bundled workouts
pub fn bundled_store() -> Result<WorkoutStore> {
    Ok(WorkoutStore::new(bundled_workouts()?.to_vec()))
}
