//! Derived values and save-ability rules.
//!
//! Pace is the independent variable: a block's duration follows from its
//! distance times its target pace. Durations are truncated toward zero.

use crate::block::Block;
use crate::units::{distance_in_miles, Distance};
use crate::workout::Workout;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Fastest pace offered by the pace picker (6:00 per mile)
pub const DEFAULT_MIN_PACE_SECONDS: u32 = 6 * 60;

/// Slowest pace offered by the pace picker (13:59 per mile)
pub const DEFAULT_MAX_PACE_SECONDS: u32 = 13 * 60 + 59;

/// How strictly blocks are checked before a workout may be saved
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Every block needs exactly one of distance or duration
    Strict,
    /// As strict, except a work block may hold both distance and duration
    #[default]
    Custom,
}

fn check_distance(distance: &Distance) -> Result<f64> {
    if !distance.value.is_finite() || distance.value < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "distance must be a non-negative number, got {}",
            distance.value
        )));
    }
    Ok(distance_in_miles(distance))
}

/// Duration covered at a per-mile pace: `floor(miles * pace)`
pub fn compute_duration_from_pace_and_distance(
    distance: &Distance,
    pace_seconds_per_mile: u32,
) -> Result<u32> {
    let miles = check_distance(distance)?;
    Ok((miles * pace_seconds_per_mile as f64) as u32)
}

/// Raw per-mile pace for a distance and duration, not clamped
///
/// A zero distance yields 0 instead of dividing by zero.
pub fn compute_pace_from_distance_and_duration(
    distance: &Distance,
    duration_seconds: u32,
) -> Result<u32> {
    let miles = check_distance(distance)?;
    if miles == 0.0 {
        return Ok(0);
    }
    Ok((duration_seconds as f64 / miles) as u32)
}

/// Closed range of selectable paces, in seconds per mile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaceRange {
    pub min_seconds: u32,
    pub max_seconds: u32,
}

impl Default for PaceRange {
    fn default() -> Self {
        Self {
            min_seconds: DEFAULT_MIN_PACE_SECONDS,
            max_seconds: DEFAULT_MAX_PACE_SECONDS,
        }
    }
}

impl PaceRange {
    pub fn new(min_seconds: u32, max_seconds: u32) -> Result<Self> {
        if min_seconds > max_seconds {
            return Err(Error::InvalidArgument(format!(
                "pace range {}..{} is empty",
                min_seconds, max_seconds
            )));
        }
        Ok(Self {
            min_seconds,
            max_seconds,
        })
    }

    pub fn clamp(&self, pace_seconds: u32) -> u32 {
        pace_seconds.clamp(self.min_seconds, self.max_seconds)
    }

    pub fn contains(&self, pace_seconds: u32) -> bool {
        (self.min_seconds..=self.max_seconds).contains(&pace_seconds)
    }
}

/// Whether a block is ready to be saved
///
/// A block always needs at least one goal. A work block's nested rest is
/// checked as a plain block.
pub fn is_block_complete(block: &Block, mode: ValidationMode) -> bool {
    if let Some(rest) = block.rest_block() {
        if !is_block_complete(rest, mode) {
            return false;
        }
    }
    if mode == ValidationMode::Custom && block.is_work() {
        return block.has_goal();
    }
    block.distance().is_some() != block.duration().is_some()
}

/// Whether a workout may be saved: named, non-empty, every block complete
pub fn is_workout_saveable(workout: &Workout, mode: ValidationMode) -> bool {
    if workout.name.is_empty() || workout.blocks().is_empty() {
        return false;
    }
    workout
        .blocks()
        .iter()
        .all(|block| is_block_complete(block, mode))
}
