//! The workout aggregate.

use crate::block::{Block, BlockType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Workout identifier, unique within a store
pub type WorkoutId = i64;

/// A named, ordered list of blocks
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: WorkoutId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Workout {
    pub fn new(id: WorkoutId, name: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            id,
            name: name.into(),
            blocks: Some(blocks),
            is_favorite: false,
        }
    }

    /// Blocks in order (empty when the workout has none)
    pub fn blocks(&self) -> &[Block] {
        self.blocks.as_deref().unwrap_or(&[])
    }

    /// First block of the given type
    pub fn first_of_type(&self, block_type: BlockType) -> Option<&Block> {
        self.blocks().iter().find(|b| b.block_type() == block_type)
    }

    /// First work-variant block
    pub fn work_block(&self) -> Option<&Block> {
        self.blocks().iter().find(|b| b.is_work())
    }

    /// Flip the favorite flag and return the new value
    pub fn toggle_favorite(&mut self) -> bool {
        self.is_favorite = !self.is_favorite;
        self.is_favorite
    }

    /// Total planned time, counting repeats and rest, for blocks with a duration
    ///
    /// Saturates at `u32::MAX`.
    pub fn total_duration_seconds(&self) -> u32 {
        self.blocks()
            .iter()
            .map(|block| {
                let work = block.duration().map_or(0, |d| d.seconds);
                let rest = block
                    .rest_block()
                    .and_then(Block::duration)
                    .map_or(0, |d| d.seconds);
                work.saturating_add(rest).saturating_mul(block.repeats())
            })
            .fold(0, u32::saturating_add)
    }
}

/// Decode a workout collection, mapping malformed data to a decode error
pub fn decode_workouts(json: &str) -> Result<Vec<Workout>> {
    serde_json::from_str(json).map_err(|e| Error::Decode(e.to_string()))
}
