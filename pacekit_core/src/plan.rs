//! Scheduling plans built from workouts.
//!
//! A plan is the platform-neutral shape a scheduler consumes: goals per
//! step, interval blocks with recovery steps, and iteration counts. Three
//! plan kinds exist:
//! - custom: optional warmup, one interval block per work block, optional cooldown
//! - single goal: the goal of the first block
//! - pacer: distance and time of the first block

use crate::block::{Block, BlockType};
use crate::units::{Distance, DistanceUnit};
use crate::workout::{Workout, WorkoutId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// What a step must achieve before it ends
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Goal {
    Distance { value: f64, unit: DistanceUnit },
    Time { seconds: u32 },
}

impl Goal {
    /// Goal of a block, preferring its distance
    pub fn from_block(block: &Block) -> Result<Self> {
        if let Some(distance) = block.distance() {
            return Ok(Goal::Distance {
                value: distance.value,
                unit: distance.unit,
            });
        }
        if let Some(duration) = block.duration() {
            return Ok(Goal::Time {
                seconds: duration.seconds,
            });
        }
        Err(Error::Plan(format!(
            "{} block {} has neither distance nor duration",
            block.block_type(),
            block.id()
        )))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepPurpose {
    Work,
    Recovery,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutStep {
    pub goal: Goal,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntervalStep {
    pub purpose: StepPurpose,
    pub goal: Goal,
}

/// Steps repeated `iterations` times
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntervalBlock {
    pub steps: Vec<IntervalStep>,
    pub iterations: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CustomPlan {
    pub display_name: String,
    pub warmup: Option<WorkoutStep>,
    pub blocks: Vec<IntervalBlock>,
    pub cooldown: Option<WorkoutStep>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanKind {
    Custom(CustomPlan),
    SingleGoal { goal: Goal },
    Pacer { distance: Distance, seconds: u32 },
}

/// A plan ready to hand to a scheduler
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub workout_id: WorkoutId,
    pub plan: PlanKind,
}

impl WorkoutPlan {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Which plan kind to build
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlanStyle {
    #[default]
    Custom,
    SingleGoal,
    Pacer,
}

impl FromStr for PlanStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "custom" => Ok(PlanStyle::Custom),
            "goal" | "single_goal" => Ok(PlanStyle::SingleGoal),
            "pacer" => Ok(PlanStyle::Pacer),
            other => Err(Error::InvalidArgument(format!("unknown plan kind '{}'", other))),
        }
    }
}

/// Build a plan of the requested kind
pub fn build_plan(workout: &Workout, style: PlanStyle) -> Result<WorkoutPlan> {
    let plan = match style {
        PlanStyle::Custom => PlanKind::Custom(build_custom_plan(workout)?),
        PlanStyle::SingleGoal => build_single_goal_plan(workout)?,
        PlanStyle::Pacer => build_pacer_plan(workout)?,
    };
    tracing::debug!("Built {:?} plan for workout {}", style, workout.id);
    Ok(WorkoutPlan {
        id: Uuid::new_v4(),
        workout_id: workout.id,
        plan,
    })
}

fn build_step(block: Option<&Block>) -> Result<Option<WorkoutStep>> {
    block
        .map(|b| Goal::from_block(b).map(|goal| WorkoutStep { goal }))
        .transpose()
}

fn build_interval_block(work: &Block) -> Result<IntervalBlock> {
    let mut steps = vec![IntervalStep {
        purpose: StepPurpose::Work,
        goal: Goal::from_block(work)?,
    }];
    if let Some(rest) = work.rest_block() {
        steps.push(IntervalStep {
            purpose: StepPurpose::Recovery,
            goal: Goal::from_block(rest)?,
        });
    }
    Ok(IntervalBlock {
        steps,
        iterations: work.repeats(),
    })
}

/// Warmup, interval blocks for every work block, cooldown
pub fn build_custom_plan(workout: &Workout) -> Result<CustomPlan> {
    let blocks = workout
        .blocks()
        .iter()
        .filter(|b| b.is_work())
        .map(build_interval_block)
        .collect::<Result<Vec<_>>>()?;

    if blocks.is_empty() {
        return Err(Error::Plan(format!(
            "workout {} has no work block",
            workout.id
        )));
    }

    Ok(CustomPlan {
        display_name: workout.name.clone(),
        warmup: build_step(workout.first_of_type(BlockType::Warmup))?,
        blocks,
        cooldown: build_step(workout.first_of_type(BlockType::Cooldown))?,
    })
}

fn first_block(workout: &Workout) -> Result<&Block> {
    workout
        .blocks()
        .first()
        .ok_or_else(|| Error::Plan(format!("workout {} has no blocks", workout.id)))
}

fn build_single_goal_plan(workout: &Workout) -> Result<PlanKind> {
    let goal = Goal::from_block(first_block(workout)?)?;
    Ok(PlanKind::SingleGoal { goal })
}

fn build_pacer_plan(workout: &Workout) -> Result<PlanKind> {
    let block = first_block(workout)?;
    match (block.distance(), block.duration()) {
        (Some(distance), Some(duration)) => Ok(PlanKind::Pacer {
            distance,
            seconds: duration.seconds,
        }),
        _ => Err(Error::Plan(
            "pacer workout requires both distance and duration".into(),
        )),
    }
}
