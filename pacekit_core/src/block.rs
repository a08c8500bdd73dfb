//! Workout blocks.
//!
//! A block is one segment of a workout. Work blocks carry extra fields
//! (pace target, nested rest block, repeat count), so `Block` is a sum type
//! over a plain segment and a work segment. On the wire both share one JSON
//! object and the `blockType` code decides which variant is decoded.

use crate::units::{Distance, DistanceUnit, Duration, MetricType};
use crate::{Error, NotFound, Result};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Block identifier, unique within one workout
pub type BlockId = i64;

// ============================================================================
// Block Type
// ============================================================================

/// Role of a block within a workout
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "i64", into = "i64")]
pub enum BlockType {
    Warmup,
    Cooldown,
    Work,
    Rest,
}

impl BlockType {
    /// Integer code used in stored workouts
    pub fn code(self) -> i64 {
        match self {
            BlockType::Warmup => 1,
            BlockType::Cooldown => 2,
            BlockType::Work => 3,
            BlockType::Rest => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Warmup => "Warmup",
            BlockType::Cooldown => "Cooldown",
            BlockType::Work => "Work",
            BlockType::Rest => "Rest",
        }
    }
}

impl TryFrom<i64> for BlockType {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            1 => Ok(BlockType::Warmup),
            2 => Ok(BlockType::Cooldown),
            3 => Ok(BlockType::Work),
            4 => Ok(BlockType::Rest),
            other => Err(Error::Decode(format!("unrecognized blockType {}", other))),
        }
    }
}

impl From<BlockType> for i64 {
    fn from(block_type: BlockType) -> Self {
        block_type.code()
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Target pace
///
/// Derived durations apply `duration_seconds` per mile; `unit` is carried as stored.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PaceConstraint {
    #[serde(rename = "duration", alias = "durationSeconds")]
    pub duration_seconds: u32,
    pub unit: DistanceUnit,
}

impl PaceConstraint {
    pub fn per_mile(duration_seconds: u32) -> Self {
        Self {
            duration_seconds,
            unit: DistanceUnit::Miles,
        }
    }
}

// ============================================================================
// Block
// ============================================================================

/// Fields shared by every block
#[derive(Clone, Debug)]
pub struct BlockFields {
    id: BlockId,
    block_type: BlockType,
    distance: Option<Distance>,
    duration: Option<Duration>,
    /// `None` only for blocks decoded without a `metricType`
    metric_type: Option<MetricType>,
}

/// Fields only a work block carries
#[derive(Clone, Debug, Default)]
pub struct WorkFields {
    pace_constraint: Option<PaceConstraint>,
    rest: Option<Box<Block>>,
    repeats: Option<u32>,
}

/// One segment of a workout
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawBlock", into = "RawBlock")]
pub enum Block {
    Plain(BlockFields),
    Work(BlockFields, WorkFields),
}

impl Block {
    /// Create a non-work block
    pub fn plain(
        id: BlockId,
        block_type: BlockType,
        distance: Option<Distance>,
        duration: Option<Duration>,
        metric_type: MetricType,
    ) -> Self {
        Block::Plain(BlockFields {
            id,
            block_type,
            distance,
            duration,
            metric_type: Some(metric_type),
        })
    }

    /// Create a work block with no pace, rest or repeat count
    pub fn work(id: BlockId, distance: Option<Distance>, duration: Option<Duration>) -> Self {
        Block::Work(
            BlockFields {
                id,
                block_type: BlockType::Work,
                distance,
                duration,
                metric_type: Some(MetricType::Distance),
            },
            WorkFields::default(),
        )
    }

    pub fn with_metric_type(mut self, metric_type: MetricType) -> Self {
        self.fields_mut().metric_type = Some(metric_type);
        self
    }

    /// Attach a pace target (ignored on plain blocks)
    pub fn with_pace_constraint(mut self, pace: PaceConstraint) -> Self {
        if let Block::Work(_, work) = &mut self {
            work.pace_constraint = Some(pace);
        }
        self
    }

    /// Set the repeat count (ignored on plain blocks)
    pub fn with_repeats(mut self, repeats: u32) -> Self {
        if let Block::Work(_, work) = &mut self {
            work.repeats = Some(repeats);
        }
        self
    }

    /// Attach a nested rest block
    pub fn with_rest(mut self, rest: Block) -> Result<Self> {
        self.set_rest_block(Some(rest))?;
        Ok(self)
    }

    fn fields(&self) -> &BlockFields {
        match self {
            Block::Plain(fields) | Block::Work(fields, _) => fields,
        }
    }

    fn fields_mut(&mut self) -> &mut BlockFields {
        match self {
            Block::Plain(fields) | Block::Work(fields, _) => fields,
        }
    }

    pub fn id(&self) -> BlockId {
        self.fields().id
    }

    pub fn block_type(&self) -> BlockType {
        self.fields().block_type
    }

    pub fn distance(&self) -> Option<Distance> {
        self.fields().distance
    }

    pub fn duration(&self) -> Option<Duration> {
        self.fields().duration
    }

    /// Active metric, distance when the block never recorded one
    pub fn metric_type(&self) -> MetricType {
        self.fields().metric_type.unwrap_or_default()
    }

    pub fn set_distance(&mut self, distance: Option<Distance>) {
        self.fields_mut().distance = distance;
    }

    pub fn set_duration(&mut self, duration: Option<Duration>) {
        self.fields_mut().duration = duration;
    }

    pub fn set_metric_type(&mut self, metric_type: MetricType) {
        self.fields_mut().metric_type = Some(metric_type);
    }

    /// True for the work variant
    pub fn is_work(&self) -> bool {
        matches!(self, Block::Work(..))
    }

    /// True if the block holds a distance or a duration
    pub fn has_goal(&self) -> bool {
        self.distance().is_some() || self.duration().is_some()
    }

    pub fn pace_constraint(&self) -> Option<PaceConstraint> {
        match self {
            Block::Work(_, work) => work.pace_constraint,
            Block::Plain(_) => None,
        }
    }

    pub fn rest_block(&self) -> Option<&Block> {
        match self {
            Block::Work(_, work) => work.rest.as_deref(),
            Block::Plain(_) => None,
        }
    }

    /// Stored repeat count, `None` when never set
    pub fn repeats_raw(&self) -> Option<u32> {
        match self {
            Block::Work(_, work) => work.repeats,
            Block::Plain(_) => None,
        }
    }

    /// Effective repeat count (1 when unset or for plain blocks)
    pub fn repeats(&self) -> u32 {
        self.repeats_raw().unwrap_or(1)
    }

    pub fn set_pace_constraint(
        &mut self,
        pace: Option<PaceConstraint>,
    ) -> std::result::Result<(), NotFound> {
        match self {
            Block::Work(_, work) => {
                work.pace_constraint = pace;
                Ok(())
            }
            Block::Plain(_) => Err(NotFound::NotWorkBlock),
        }
    }

    pub fn set_repeats(&mut self, repeats: Option<u32>) -> std::result::Result<(), NotFound> {
        match self {
            Block::Work(_, work) => {
                work.repeats = repeats;
                Ok(())
            }
            Block::Plain(_) => Err(NotFound::NotWorkBlock),
        }
    }

    /// Replace the nested rest block
    ///
    /// The rest must be a plain block tagged `rest`; rest blocks never nest.
    pub fn set_rest_block(&mut self, rest: Option<Block>) -> Result<()> {
        if let Some(rest) = &rest {
            if rest.is_work() || rest.block_type() != BlockType::Rest {
                return Err(Error::InvalidArgument(format!(
                    "block {} cannot be used as a rest block",
                    rest.id()
                )));
            }
        }
        match self {
            Block::Work(_, work) => {
                work.rest = rest.map(Box::new);
                Ok(())
            }
            Block::Plain(_) => Err(NotFound::NotWorkBlock.into()),
        }
    }

    /// Decode a single block from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Decode(e.to_string()))
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.fields(), other.fields());
        a.id == b.id
            && a.block_type == b.block_type
            && a.distance == b.distance
            && a.duration == b.duration
            && self.metric_type() == other.metric_type()
    }
}

impl Hash for Block {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// Flat JSON shape shared by both block variants
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    id: BlockId,
    #[serde(default)]
    block_type: Option<BlockType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distance: Option<Distance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metric_type: Option<MetricType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pace_constraint: Option<PaceConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rest: Option<Box<RawBlock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repeats: Option<u32>,
}

impl TryFrom<RawBlock> for Block {
    type Error = Error;

    fn try_from(raw: RawBlock) -> Result<Self> {
        let block_type = raw
            .block_type
            .ok_or_else(|| Error::Decode(format!("block {} is missing blockType", raw.id)))?;

        let fields = BlockFields {
            id: raw.id,
            block_type,
            distance: raw.distance,
            duration: raw.duration,
            metric_type: raw.metric_type,
        };

        if block_type != BlockType::Work {
            return Ok(Block::Plain(fields));
        }

        if raw.repeats == Some(0) {
            return Err(Error::Decode(format!(
                "work block {} has a repeat count of 0",
                fields.id
            )));
        }

        let rest = match raw.rest {
            Some(rest) => {
                let rest = Block::try_from(*rest)?;
                if rest.is_work() || rest.block_type() != BlockType::Rest {
                    return Err(Error::Decode(format!(
                        "work block {} has a nested {} block as rest",
                        fields.id,
                        rest.block_type()
                    )));
                }
                Some(Box::new(rest))
            }
            None => None,
        };

        Ok(Block::Work(
            fields,
            WorkFields {
                pace_constraint: raw.pace_constraint,
                rest,
                repeats: raw.repeats,
            },
        ))
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let (fields, work) = match block {
            Block::Plain(fields) => (fields, None),
            Block::Work(fields, work) => (fields, Some(work)),
        };
        let mut raw = RawBlock {
            id: fields.id,
            block_type: Some(fields.block_type),
            distance: fields.distance,
            duration: fields.duration,
            metric_type: fields.metric_type,
            pace_constraint: None,
            rest: None,
            repeats: None,
        };
        if let Some(work) = work {
            raw.pace_constraint = work.pace_constraint;
            raw.rest = work.rest.map(|rest| Box::new(RawBlock::from(*rest)));
            raw.repeats = work.repeats;
        }
        raw
    }
}
