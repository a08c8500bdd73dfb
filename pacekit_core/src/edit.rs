//! Edit state for a single block.
//!
//! A `BlockEditState` pairs a canonical [`Block`] with the primitive values a
//! form works with (distance magnitude and unit, duration seconds, repeat
//! count). Every update writes the primitive value back into the block as a
//! whole-field replacement, then recomputes derived fields.
//!
//! Exactly one metric is active at a time. Switching the active metric
//! clears the other one on the block; a paced work block is the one place
//! both are held, because its duration is derived from distance.

use crate::block::{Block, BlockId, BlockType, PaceConstraint};
use crate::compute::compute_duration_from_pace_and_distance;
use crate::units::{Distance, DistanceUnit, Duration, MetricType};
use crate::{Error, Result};

/// Mutable edit-session wrapper around one block
#[derive(Clone, Debug)]
pub struct BlockEditState {
    block: Block,
    selected_metric: MetricType,
    distance_value: f64,
    distance_unit: DistanceUnit,
    duration_seconds: u32,
    repeat_count: u32,
}

impl BlockEditState {
    /// Wrap a block and derive the primitive fields from it
    pub fn new(block: Block) -> Self {
        let mut state = Self {
            selected_metric: block.metric_type(),
            block,
            distance_value: 0.0,
            distance_unit: DistanceUnit::Miles,
            duration_seconds: 0,
            repeat_count: 1,
        };
        state.initialize();
        state
    }

    /// Re-derive every primitive field from the canonical block
    ///
    /// A present duration wins over a present distance when choosing the
    /// active metric. Without either, the block's own metric type is used.
    pub fn initialize(&mut self) {
        self.selected_metric = self.block.metric_type();
        self.distance_value = 0.0;
        self.distance_unit = DistanceUnit::Miles;
        self.duration_seconds = 0;
        self.repeat_count = 1;

        if let Some(distance) = self.block.distance() {
            self.distance_value = distance.value;
            self.distance_unit = distance.unit;
            self.selected_metric = MetricType::Distance;
        }

        if let Some(duration) = self.block.duration() {
            self.duration_seconds = duration.seconds;
            self.selected_metric = MetricType::Time;
        }

        if self.block.is_work() {
            self.repeat_count = self.block.repeats();
        }
    }

    /// Switch the active metric, clearing the other one on the block
    ///
    /// Returns false when `metric` was already active.
    pub fn set_selected_metric(&mut self, metric: MetricType) -> bool {
        if metric == self.selected_metric {
            return false;
        }

        match metric {
            MetricType::Distance => {
                self.block.set_duration(None);
                self.duration_seconds = 0;
            }
            MetricType::Time => {
                self.block.set_distance(None);
                self.distance_value = 0.0;
            }
        }
        self.block.set_metric_type(metric);
        self.selected_metric = metric;

        tracing::debug!(
            "Block {}: active metric is now {}, cleared {}",
            self.block.id(),
            metric,
            metric.other()
        );
        true
    }

    /// Write a distance onto the block
    ///
    /// A paced work block also gets its duration recomputed from the pace.
    pub fn update_distance(&mut self, value: f64, unit: DistanceUnit) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "distance must be a non-negative number, got {}",
                value
            )));
        }

        let distance = Distance::new(value, unit);
        self.block.set_distance(Some(distance));
        self.distance_value = value;
        self.distance_unit = unit;

        if let Some(pace) = self.block.pace_constraint() {
            self.apply_pace(&distance, &pace)?;
        }

        tracing::debug!("Block {}: distance set to {}", self.block.id(), distance);
        Ok(())
    }

    /// Write a duration onto the block; zero clears it
    pub fn update_duration(&mut self, seconds: u32) {
        let duration = (seconds > 0).then(|| Duration::new(seconds));
        self.block.set_duration(duration);
        self.duration_seconds = seconds;
        tracing::debug!("Block {}: duration set to {:?}", self.block.id(), duration);
    }

    /// Store a repeat count on a work block
    ///
    /// Any count of at least 1 is stored as given; the allowed range is the
    /// caller's policy.
    pub fn update_repeats(&mut self, count: u32) -> Result<()> {
        if count == 0 {
            return Err(Error::InvalidArgument("repeat count must be at least 1".into()));
        }
        self.block.set_repeats(Some(count))?;
        self.repeat_count = count;
        Ok(())
    }

    /// Set or clear the pace target of a work block
    pub fn set_pace_constraint(&mut self, pace: Option<PaceConstraint>) -> Result<()> {
        self.block.set_pace_constraint(pace)?;
        if let (Some(pace), Some(distance)) = (pace, self.block.distance()) {
            self.apply_pace(&distance, &pace)?;
        }
        Ok(())
    }

    /// Replace the nested rest block of a work block
    pub fn set_rest_block(&mut self, rest: Option<Block>) -> Result<()> {
        self.block.set_rest_block(rest)
    }

    fn apply_pace(&mut self, distance: &Distance, pace: &PaceConstraint) -> Result<()> {
        let seconds = compute_duration_from_pace_and_distance(distance, pace.duration_seconds)?;
        self.block.set_duration(Some(Duration::new(seconds)));
        self.duration_seconds = seconds;
        tracing::debug!(
            "Block {}: duration {}s derived from pace {}s over {:.4} mi",
            self.block.id(),
            seconds,
            pace.duration_seconds,
            distance.in_miles()
        );
        Ok(())
    }

    pub fn id(&self) -> BlockId {
        self.block.id()
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn into_block(self) -> Block {
        self.block
    }

    pub fn selected_metric(&self) -> MetricType {
        self.selected_metric
    }

    pub fn distance_value(&self) -> f64 {
        self.distance_value
    }

    pub fn distance_unit(&self) -> DistanceUnit {
        self.distance_unit
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    pub fn is_work_block(&self) -> bool {
        self.block.block_type() == BlockType::Work
    }

    pub fn is_warmup_block(&self) -> bool {
        self.block.block_type() == BlockType::Warmup
    }

    pub fn is_cooldown_block(&self) -> bool {
        self.block.block_type() == BlockType::Cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotFound;

    fn paced_work_block(pace: u32) -> Block {
        Block::work(1001, Some(Distance::miles(1.0)), None)
            .with_pace_constraint(PaceConstraint::per_mile(pace))
    }

    #[test]
    fn test_initialize_from_distance() {
        let block = Block::plain(
            1,
            BlockType::Warmup,
            Some(Distance::kilometers(2.0)),
            None,
            MetricType::Distance,
        );
        let state = BlockEditState::new(block);

        assert_eq!(state.selected_metric(), MetricType::Distance);
        assert_eq!(state.distance_value(), 2.0);
        assert_eq!(state.distance_unit(), DistanceUnit::Kilometers);
        assert_eq!(state.duration_seconds(), 0);
        assert_eq!(state.repeat_count(), 1);
    }

    #[test]
    fn test_initialize_duration_wins_over_distance() {
        let block = Block::work(1, Some(Distance::miles(5.0)), Some(Duration::new(2400)))
            .with_repeats(3);
        let state = BlockEditState::new(block);

        assert_eq!(state.selected_metric(), MetricType::Time);
        assert_eq!(state.distance_value(), 5.0);
        assert_eq!(state.duration_seconds(), 2400);
        assert_eq!(state.repeat_count(), 3);
    }

    #[test]
    fn test_initialize_without_metrics_uses_block_metric_type() {
        let block = Block::plain(1, BlockType::Rest, None, None, MetricType::Time);
        let state = BlockEditState::new(block);
        assert_eq!(state.selected_metric(), MetricType::Time);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let block = Block::work(1, Some(Distance::meters(800.0)), None).with_repeats(4);
        let mut state = BlockEditState::new(block);

        let snapshot = (
            state.selected_metric(),
            state.distance_value(),
            state.distance_unit(),
            state.duration_seconds(),
            state.repeat_count(),
        );
        state.initialize();
        state.initialize();

        assert_eq!(
            snapshot,
            (
                state.selected_metric(),
                state.distance_value(),
                state.distance_unit(),
                state.duration_seconds(),
                state.repeat_count(),
            )
        );
    }

    #[test]
    fn test_update_distance_derives_duration_from_pace() {
        let mut state = BlockEditState::new(paced_work_block(480));

        state.update_distance(5.0, DistanceUnit::Miles).unwrap();

        assert_eq!(state.block().duration(), Some(Duration::new(2400)));
        assert_eq!(state.duration_seconds(), 2400);
        assert_eq!(state.block().distance(), Some(Distance::miles(5.0)));
    }

    #[test]
    fn test_update_distance_converts_units_for_pace() {
        let mut state = BlockEditState::new(paced_work_block(480));

        state.update_distance(5.0, DistanceUnit::Kilometers).unwrap();

        // 5 km = 3.106855 mi; 3.106855 * 480 = 1491.29
        assert_eq!(state.duration_seconds(), 1491);
        assert_eq!(state.distance_unit(), DistanceUnit::Kilometers);
    }

    #[test]
    fn test_pace_seconds_always_apply_per_mile() {
        let block = Block::work(1, None, None)
            .with_pace_constraint(PaceConstraint {
                duration_seconds: 300,
                unit: DistanceUnit::Kilometers,
            });
        let mut state = BlockEditState::new(block);

        state.update_distance(10.0, DistanceUnit::Kilometers).unwrap();

        // 10 km = 6.21371 mi; 6.21371 * 300 = 1864.11
        assert_eq!(state.duration_seconds(), 1864);
        assert_eq!(state.block().duration(), Some(Duration::new(1864)));
    }

    #[test]
    fn test_update_distance_without_pace_leaves_duration() {
        let block = Block::plain(1, BlockType::Cooldown, Some(Distance::miles(1.0)), None, MetricType::Distance);
        let mut state = BlockEditState::new(block);

        state.update_distance(2.5, DistanceUnit::Miles).unwrap();

        assert_eq!(state.block().distance(), Some(Distance::miles(2.5)));
        assert_eq!(state.block().duration(), None);
    }

    #[test]
    fn test_update_distance_rejects_negative() {
        let mut state = BlockEditState::new(paced_work_block(480));

        let result = state.update_distance(-1.0, DistanceUnit::Miles);

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(state.block().distance(), Some(Distance::miles(1.0)));
        assert_eq!(state.distance_value(), 1.0);
    }

    #[test]
    fn test_switch_to_time_clears_distance() {
        let block = Block::plain(
            1,
            BlockType::Warmup,
            Some(Distance::kilometers(3.1)),
            None,
            MetricType::Distance,
        );
        let mut state = BlockEditState::new(block);

        assert!(state.set_selected_metric(MetricType::Time));

        assert_eq!(state.block().distance(), None);
        assert_eq!(state.selected_metric(), MetricType::Time);
        assert_eq!(state.block().metric_type(), MetricType::Time);
        assert_eq!(state.distance_value(), 0.0);
    }

    #[test]
    fn test_switch_to_distance_clears_duration() {
        let block = Block::plain(1, BlockType::Cooldown, None, Some(Duration::new(600)), MetricType::Time);
        let mut state = BlockEditState::new(block);

        assert!(state.set_selected_metric(MetricType::Distance));

        assert_eq!(state.block().duration(), None);
        assert_eq!(state.duration_seconds(), 0);
        assert_eq!(state.selected_metric(), MetricType::Distance);
    }

    #[test]
    fn test_selecting_active_metric_is_a_no_op() {
        let block = Block::plain(1, BlockType::Warmup, Some(Distance::miles(1.0)), None, MetricType::Distance);
        let mut state = BlockEditState::new(block);

        assert!(!state.set_selected_metric(MetricType::Distance));
        assert_eq!(state.block().distance(), Some(Distance::miles(1.0)));
    }

    #[test]
    fn test_update_duration_zero_clears() {
        let block = Block::plain(1, BlockType::Rest, None, Some(Duration::new(90)), MetricType::Time);
        let mut state = BlockEditState::new(block);

        state.update_duration(120);
        assert_eq!(state.block().duration(), Some(Duration::new(120)));

        state.update_duration(0);
        assert_eq!(state.block().duration(), None);
        assert_eq!(state.duration_seconds(), 0);
    }

    #[test]
    fn test_update_repeats_stores_verbatim() {
        let mut state = BlockEditState::new(Block::work(1, Some(Distance::miles(1.0)), None));

        state.update_repeats(25).unwrap();

        assert_eq!(state.repeat_count(), 25);
        assert_eq!(state.block().repeats_raw(), Some(25));
        assert!(matches!(state.update_repeats(0), Err(Error::InvalidArgument(_))));
        assert_eq!(state.repeat_count(), 25);
    }

    #[test]
    fn test_update_repeats_on_plain_block_is_not_found() {
        let block = Block::plain(1, BlockType::Warmup, Some(Distance::miles(1.0)), None, MetricType::Distance);
        let mut state = BlockEditState::new(block);

        let result = state.update_repeats(3);

        assert!(matches!(result, Err(Error::NotFound(NotFound::NotWorkBlock))));
        assert_eq!(state.repeat_count(), 1);
    }

    #[test]
    fn test_setting_pace_recomputes_duration() {
        let mut state = BlockEditState::new(Block::work(1, Some(Distance::miles(3.0)), None));

        state
            .set_pace_constraint(Some(PaceConstraint::per_mile(450)))
            .unwrap();

        assert_eq!(state.duration_seconds(), 1350);
        assert_eq!(state.block().duration(), Some(Duration::new(1350)));
    }

    #[test]
    fn test_type_predicates() {
        let work = BlockEditState::new(Block::work(1, None, None));
        let warmup = BlockEditState::new(Block::plain(2, BlockType::Warmup, None, None, MetricType::Distance));
        let cooldown = BlockEditState::new(Block::plain(3, BlockType::Cooldown, None, None, MetricType::Distance));

        assert!(work.is_work_block() && !work.is_warmup_block());
        assert!(warmup.is_warmup_block() && !warmup.is_cooldown_block());
        assert!(cooldown.is_cooldown_block() && !cooldown.is_work_block());
    }
}
