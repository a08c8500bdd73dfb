#![forbid(unsafe_code)]

//! Core domain model and editing logic for PaceKit structured workouts.
//!
//! This crate provides:
//! - Distance/duration value types and unit conversion
//! - The block model (plain and work blocks) and workout aggregate
//! - Block edit state with distance/time reconciliation
//! - Pace-derived durations and save-ability rules
//! - The workout builder session and workout store
//! - Scheduling plans and a plan scheduler sink

pub mod error;
pub mod units;
pub mod block;
pub mod workout;
pub mod compute;
pub mod edit;
pub mod events;
pub mod builder;
pub mod store;
pub mod bundled;
pub mod config;
pub mod logging;
pub mod plan;
pub mod schedule;

// Re-export commonly used types
pub use error::{Error, NotFound, Result};
pub use units::{Distance, DistanceUnit, Duration, MetricType};
pub use block::{Block, BlockId, BlockType, PaceConstraint};
pub use workout::{Workout, WorkoutId};
pub use compute::{is_block_complete, is_workout_saveable, PaceRange, ValidationMode};
pub use edit::BlockEditState;
pub use events::SessionEvent;
pub use builder::BuilderSession;
pub use store::WorkoutStore;
pub use config::Config;
pub use plan::{build_plan, PlanStyle, WorkoutPlan};
pub use schedule::{JsonlScheduler, PlanScheduler};
