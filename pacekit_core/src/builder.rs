//! Workout builder session.
//!
//! Holds the edit states of a workout being created or re-edited, hands out
//! block ids, and commits the finished workout to a [`WorkoutStore`].
//! Operations that target a missing block or index leave the session
//! untouched and return [`NotFound`].

use crate::block::{Block, BlockId, BlockType, PaceConstraint};
use crate::compute::{is_block_complete, is_workout_saveable, ValidationMode};
use crate::config::BuilderConfig;
use crate::edit::BlockEditState;
use crate::events::{Notifier, SessionEvent, SubscriptionId};
use crate::store::WorkoutStore;
use crate::units::{Distance, Duration, DistanceUnit, MetricType};
use crate::workout::{Workout, WorkoutId};
use crate::{Error, NotFound, Result};

/// Ids handed out by a session start just above this value
pub const BLOCK_ID_BASE: BlockId = 1000;

/// An in-progress workout
#[derive(Debug)]
pub struct BuilderSession {
    name: String,
    blocks: Vec<BlockEditState>,
    mode: ValidationMode,
    default_distance: Distance,
    editing: Option<WorkoutId>,
    is_favorite: bool,
    notifier: Notifier<SessionEvent>,
}

impl Default for BuilderSession {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}

impl BuilderSession {
    /// Empty session for a new workout
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            name: String::new(),
            blocks: Vec::new(),
            mode,
            default_distance: Distance::miles(1.0),
            editing: None,
            is_favorite: false,
            notifier: Notifier::new(),
        }
    }

    /// Empty session using the builder section of the config
    pub fn from_config(config: &BuilderConfig) -> Self {
        let mut session = Self::new(config.validation_mode);
        session.default_distance = Distance::miles(config.default_distance_miles);
        session
    }

    /// Session that re-edits an existing workout; saving replaces it
    pub fn from_workout(workout: &Workout, mode: ValidationMode) -> Self {
        let mut session = Self::new(mode);
        session.name = workout.name.clone();
        session.blocks = workout
            .blocks()
            .iter()
            .cloned()
            .map(BlockEditState::new)
            .collect();
        session.editing = Some(workout.id);
        session.is_favorite = workout.is_favorite;
        session
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.notifier
            .notify(&SessionEvent::NameChanged(self.name.clone()));
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn blocks(&self) -> &[BlockEditState] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&BlockEditState> {
        self.blocks.get(index)
    }

    /// Id of the workout being re-edited, if any
    pub fn editing(&self) -> Option<WorkoutId> {
        self.editing
    }

    /// One past the largest id in the session, nested rest blocks included
    pub fn new_block_id(&self) -> BlockId {
        self.blocks
            .iter()
            .flat_map(|state| {
                let block = state.block();
                std::iter::once(block.id()).chain(block.rest_block().map(Block::id))
            })
            .max()
            .unwrap_or(BLOCK_ID_BASE)
            + 1
    }

    /// Index of the (first) work block
    pub fn work_block_index(&self) -> Option<usize> {
        self.blocks.iter().position(|state| state.block().is_work())
    }

    pub fn has_warmup_block(&self) -> bool {
        self.blocks.iter().any(BlockEditState::is_warmup_block)
    }

    pub fn has_cooldown_block(&self) -> bool {
        self.blocks.iter().any(BlockEditState::is_cooldown_block)
    }

    /// Append a block of the given type with the default distance
    pub fn add_empty_block(&mut self, block_type: BlockType) -> BlockId {
        let id = self.new_block_id();
        let block = match block_type {
            BlockType::Work => Block::work(id, Some(self.default_distance), None),
            other => Block::plain(
                id,
                other,
                Some(self.default_distance),
                None,
                MetricType::Distance,
            ),
        };
        self.blocks.push(BlockEditState::new(block));

        tracing::debug!("Added {} block {}", block_type, id);
        self.notifier
            .notify(&SessionEvent::BlockAdded { id, block_type });
        id
    }

    /// Give the work block a zeroed rest block matching its active metric
    ///
    /// Replaces any rest block already attached.
    pub fn add_rest_to_work_block(&mut self) -> std::result::Result<BlockId, NotFound> {
        let index = self.work_block_index().ok_or(NotFound::WorkBlock)?;
        let rest_id = self.new_block_id();

        let state = &mut self.blocks[index];
        let metric = state.block().metric_type();
        let rest = match metric {
            MetricType::Distance => Block::plain(
                rest_id,
                BlockType::Rest,
                Some(Distance::zeroed(DistanceUnit::Miles)),
                None,
                metric,
            ),
            MetricType::Time => Block::plain(
                rest_id,
                BlockType::Rest,
                None,
                Some(Duration::new(0)),
                metric,
            ),
        };
        if let Err(e) = state.set_rest_block(Some(rest)) {
            tracing::warn!("Could not attach rest block: {}", e);
            return Err(NotFound::WorkBlock);
        }

        let work_id = state.id();
        tracing::debug!("Attached rest block {} to work block {}", rest_id, work_id);
        self.notifier
            .notify(&SessionEvent::RestAttached { work_id, rest_id });
        Ok(rest_id)
    }

    /// Remove the block at `index`
    pub fn delete_block(&mut self, index: usize) -> std::result::Result<Block, NotFound> {
        if index >= self.blocks.len() {
            return Err(NotFound::BlockIndex(index));
        }
        let block = self.blocks.remove(index).into_block();

        tracing::debug!("Removed block {} at index {}", block.id(), index);
        self.notifier
            .notify(&SessionEvent::BlockRemoved { id: block.id() });
        Ok(block)
    }

    /// Move the block at `from` so it ends up at `to`
    pub fn move_block(&mut self, from: usize, to: usize) -> std::result::Result<(), NotFound> {
        let len = self.blocks.len();
        if from >= len {
            return Err(NotFound::BlockIndex(from));
        }
        if to >= len {
            return Err(NotFound::BlockIndex(to));
        }
        let state = self.blocks.remove(from);
        let id = state.id();
        self.blocks.insert(to, state);

        self.notifier
            .notify(&SessionEvent::BlockMoved { id, from, to });
        Ok(())
    }

    /// Run an edit against the block at `index`
    pub fn edit_block<R>(
        &mut self,
        index: usize,
        edit: impl FnOnce(&mut BlockEditState) -> R,
    ) -> std::result::Result<R, NotFound> {
        let state = self
            .blocks
            .get_mut(index)
            .ok_or(NotFound::BlockIndex(index))?;
        let result = edit(state);
        let id = state.id();

        self.notifier.notify(&SessionEvent::BlockEdited { id });
        Ok(result)
    }

    /// Run an edit against the work block's rest block
    pub fn edit_rest_block<R>(&mut self, edit: impl FnOnce(&mut BlockEditState) -> R) -> Result<R> {
        let index = self.work_block_index().ok_or(NotFound::WorkBlock)?;
        let state = &mut self.blocks[index];
        let rest = state
            .block()
            .rest_block()
            .cloned()
            .ok_or(NotFound::RestBlock)?;

        let mut rest_state = BlockEditState::new(rest);
        let result = edit(&mut rest_state);
        let id = rest_state.id();
        state.set_rest_block(Some(rest_state.into_block()))?;

        self.notifier.notify(&SessionEvent::BlockEdited { id });
        Ok(result)
    }

    /// Set or clear the per-mile target pace of the work block
    pub fn set_work_pace(&mut self, pace_seconds_per_mile: Option<u32>) -> Result<()> {
        let index = self.work_block_index().ok_or(NotFound::WorkBlock)?;
        let pace = pace_seconds_per_mile.map(PaceConstraint::per_mile);
        self.edit_block(index, |state| state.set_pace_constraint(pace))?
    }

    /// Set the repeat count of the work block
    pub fn update_repeated_count(&mut self, count: u32) -> Result<()> {
        let index = self.work_block_index().ok_or(NotFound::WorkBlock)?;
        self.edit_block(index, |state| state.update_repeats(count))?
    }

    /// Assemble the session into a workout with the given id
    pub fn to_workout(&self, id: WorkoutId) -> Workout {
        Workout {
            id,
            name: self.name.clone(),
            blocks: Some(self.blocks.iter().map(|s| s.block().clone()).collect()),
            is_favorite: self.is_favorite,
        }
    }

    /// Whether the session could be saved right now
    pub fn is_workout_valid(&self) -> bool {
        self.validation_problem().is_none()
    }

    /// First reason the session cannot be saved
    pub fn validation_problem(&self) -> Option<String> {
        if self.name.is_empty() {
            return Some("workout name is empty".into());
        }
        if self.blocks.is_empty() {
            return Some("workout has no blocks".into());
        }
        self.blocks
            .iter()
            .find(|state| !is_block_complete(state.block(), self.mode))
            .map(|state| {
                let block = state.block();
                let offending = match block.rest_block() {
                    Some(rest) if !is_block_complete(rest, self.mode) => rest,
                    _ => block,
                };
                let rule = if self.mode == ValidationMode::Custom && offending.is_work() {
                    "at least one"
                } else {
                    "exactly one"
                };
                format!(
                    "{} block {} needs {} of distance or duration",
                    offending.block_type(),
                    offending.id(),
                    rule
                )
            })
    }

    /// Commit the workout to the store
    ///
    /// A new workout is appended with the next free id; a re-edited one
    /// replaces its previous version. Nothing is written when validation
    /// fails.
    pub fn save_workout(&mut self, store: &mut WorkoutStore) -> Result<Workout> {
        let id = self.editing.unwrap_or_else(|| store.new_workout_id());
        let workout = self.to_workout(id);

        if !is_workout_saveable(&workout, self.mode) {
            let reason = self
                .validation_problem()
                .unwrap_or_else(|| "workout is incomplete".into());
            tracing::info!("Refused to save workout: {}", reason);
            return Err(Error::Validation(reason));
        }

        match self.editing {
            Some(_) => store.replace(workout.clone())?,
            None => store.append(workout.clone()),
        }

        tracing::info!(
            "Saved workout {} ({}) with {} blocks",
            workout.id,
            workout.name,
            workout.blocks().len()
        );
        self.notifier
            .notify(&SessionEvent::WorkoutSaved { id: workout.id });
        Ok(workout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session_with_ids(ids: &[BlockId]) -> BuilderSession {
        let workout = Workout::new(
            1,
            "Fixture",
            ids.iter()
                .map(|&id| Block::plain(id, BlockType::Warmup, Some(Distance::miles(1.0)), None, MetricType::Distance))
                .collect(),
        );
        let mut session = BuilderSession::from_workout(&workout, ValidationMode::Custom);
        session.editing = None;
        session
    }

    #[test]
    fn test_new_block_id() {
        assert_eq!(BuilderSession::default().new_block_id(), 1001);
        assert_eq!(session_with_ids(&[1000, 1005]).new_block_id(), 1006);
    }

    #[test]
    fn test_added_block_ids_strictly_increase() {
        crate::logging::init_test();
        let mut session = BuilderSession::default();
        let ids: Vec<_> = [
            BlockType::Warmup,
            BlockType::Work,
            BlockType::Cooldown,
            BlockType::Warmup,
            BlockType::Rest,
        ]
        .into_iter()
        .map(|t| session.add_empty_block(t))
        .collect();

        assert_eq!(ids, vec![1001, 1002, 1003, 1004, 1005]);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_add_empty_block_defaults() {
        let mut session = BuilderSession::default();
        session.add_empty_block(BlockType::Work);
        session.add_empty_block(BlockType::Warmup);

        let work = session.block(0).unwrap().block();
        assert!(work.is_work());
        assert_eq!(work.distance(), Some(Distance::miles(1.0)));
        assert_eq!(work.duration(), None);
        assert_eq!(work.repeats_raw(), None);

        let warmup = session.block(1).unwrap().block();
        assert!(!warmup.is_work());
        assert_eq!(warmup.block_type(), BlockType::Warmup);
        assert!(session.has_warmup_block());
        assert!(!session.has_cooldown_block());
    }

    #[test]
    fn test_add_rest_mirrors_distance_metric() {
        let work = Block::work(1, Some(Distance::miles(1.25)), None);
        let mut session =
            BuilderSession::from_workout(&Workout::new(1, "Intervals", vec![work]), ValidationMode::Custom);

        let rest_id = session.add_rest_to_work_block().unwrap();

        let rest = session.block(0).unwrap().block().rest_block().unwrap().clone();
        assert_eq!(rest.id(), rest_id);
        assert_eq!(rest.block_type(), BlockType::Rest);
        assert!(!rest.is_work());
        assert_eq!(rest.distance(), Some(Distance::miles(0.0)));
        assert_eq!(rest.duration(), None);
        assert_eq!(rest.metric_type(), MetricType::Distance);
    }

    #[test]
    fn test_add_rest_mirrors_time_metric() {
        let mut session = BuilderSession::default();
        session.add_empty_block(BlockType::Work);
        session
            .edit_block(0, |state| state.set_selected_metric(MetricType::Time))
            .unwrap();

        session.add_rest_to_work_block().unwrap();

        let rest = session.block(0).unwrap().block().rest_block().unwrap().clone();
        assert_eq!(rest.distance(), None);
        assert_eq!(rest.duration(), Some(Duration::new(0)));
        assert_eq!(rest.metric_type(), MetricType::Time);
    }

    #[test]
    fn test_rest_id_not_reused_by_next_block() {
        let mut session = BuilderSession::default();
        session.add_empty_block(BlockType::Work);
        let rest_id = session.add_rest_to_work_block().unwrap();
        let next = session.add_empty_block(BlockType::Cooldown);
        assert!(next > rest_id);
    }

    #[test]
    fn test_add_rest_without_work_block_is_not_found() {
        let mut session = BuilderSession::default();
        session.add_empty_block(BlockType::Warmup);

        assert_eq!(session.add_rest_to_work_block(), Err(NotFound::WorkBlock));
        assert!(session.block(0).unwrap().block().rest_block().is_none());
    }

    #[test]
    fn test_delete_block() {
        let mut session = BuilderSession::default();
        session.add_empty_block(BlockType::Warmup);
        session.add_empty_block(BlockType::Work);

        assert_eq!(session.delete_block(5), Err(NotFound::BlockIndex(5)));
        assert_eq!(session.blocks().len(), 2);

        let removed = session.delete_block(0).unwrap();
        assert_eq!(removed.block_type(), BlockType::Warmup);
        assert_eq!(session.blocks().len(), 1);
    }

    #[test]
    fn test_move_block() {
        let mut session = BuilderSession::default();
        let warmup = session.add_empty_block(BlockType::Warmup);
        let work = session.add_empty_block(BlockType::Work);
        let cooldown = session.add_empty_block(BlockType::Cooldown);

        session.move_block(2, 0).unwrap();
        let order: Vec<_> = session.blocks().iter().map(BlockEditState::id).collect();
        assert_eq!(order, vec![cooldown, warmup, work]);

        assert_eq!(session.move_block(0, 3), Err(NotFound::BlockIndex(3)));
    }

    #[test]
    fn test_edit_rest_block() {
        let mut session = BuilderSession::default();
        session.add_empty_block(BlockType::Work);
        assert!(matches!(
            session.edit_rest_block(|_| ()),
            Err(Error::NotFound(NotFound::RestBlock))
        ));

        session.add_rest_to_work_block().unwrap();
        session
            .edit_rest_block(|rest| {
                rest.set_selected_metric(MetricType::Time);
                rest.update_duration(90);
            })
            .unwrap();

        let rest = session.block(0).unwrap().block().rest_block().unwrap().clone();
        assert_eq!(rest.duration(), Some(Duration::new(90)));
        assert_eq!(rest.distance(), None);
    }

    #[test]
    fn test_set_work_pace_and_repeats() {
        let mut session = BuilderSession::default();
        session.add_empty_block(BlockType::Work);
        session
            .edit_block(0, |state| state.update_distance(5.0, DistanceUnit::Miles))
            .unwrap()
            .unwrap();

        session.set_work_pace(Some(480)).unwrap();
        session.update_repeated_count(3).unwrap();

        let state = session.block(0).unwrap();
        assert_eq!(state.duration_seconds(), 2400);
        assert_eq!(state.repeat_count(), 3);
        assert_eq!(state.block().repeats(), 3);

        let mut empty = BuilderSession::default();
        assert!(matches!(
            empty.set_work_pace(Some(480)),
            Err(Error::NotFound(NotFound::WorkBlock))
        ));
    }

    #[test]
    fn test_save_refused_without_name() {
        let mut store = WorkoutStore::default();
        let mut session = BuilderSession::default();
        session.add_empty_block(BlockType::Warmup);

        assert!(!session.is_workout_valid());
        assert!(matches!(
            session.save_workout(&mut store),
            Err(Error::Validation(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_refused_with_incomplete_block() {
        let mut store = WorkoutStore::default();
        let mut session = BuilderSession::new(ValidationMode::Strict);
        session.set_name("Strict");
        session.add_empty_block(BlockType::Warmup);
        session
            .edit_block(0, |state| state.update_duration(300))
            .unwrap();

        // distance and duration both set
        assert!(session.validation_problem().is_some());
        assert!(session.save_workout(&mut store).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_saved_work_block_always_has_a_goal() {
        let mut store = WorkoutStore::default();
        let mut session = BuilderSession::default();
        session.set_name("Tempo");
        session.add_empty_block(BlockType::Work);
        session
            .edit_block(0, |state| state.set_selected_metric(MetricType::Time))
            .unwrap();

        // Switching metric cleared the distance and no duration was entered
        assert!(session.validation_problem().is_some());
        assert!(matches!(
            session.save_workout(&mut store),
            Err(Error::Validation(_))
        ));
        assert!(store.is_empty());

        session.edit_block(0, |state| state.update_duration(1200)).unwrap();
        let saved = session.save_workout(&mut store).unwrap();

        let plan = crate::plan::build_plan(&saved, crate::plan::PlanStyle::Custom).unwrap();
        assert_eq!(plan.workout_id, saved.id);
    }

    #[test]
    fn test_save_refused_with_empty_rest() {
        let mut store = WorkoutStore::default();
        let mut session = BuilderSession::default();
        session.set_name("Intervals");
        session.add_empty_block(BlockType::Work);
        session.add_rest_to_work_block().unwrap();
        session
            .edit_rest_block(|rest| rest.set_selected_metric(MetricType::Time))
            .unwrap();

        assert!(session.save_workout(&mut store).is_err());

        session.edit_rest_block(|rest| rest.update_duration(60)).unwrap();
        let saved = session.save_workout(&mut store).unwrap();
        assert!(crate::plan::build_plan(&saved, crate::plan::PlanStyle::Custom).is_ok());
    }

    #[test]
    fn test_save_appends_with_next_id() {
        let mut store = WorkoutStore::new(vec![Workout::new(7, "Old", vec![])]);
        let mut session = BuilderSession::default();
        session.set_name("Hill Repeats");
        session.add_empty_block(BlockType::Warmup);
        session.add_empty_block(BlockType::Work);
        session.add_rest_to_work_block().unwrap();

        let saved = session.save_workout(&mut store).unwrap();

        assert_eq!(saved.id, 8);
        assert!(!saved.is_favorite);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(8).unwrap().blocks().len(), 2);
    }

    #[test]
    fn test_reedit_replaces_existing_workout() {
        let mut store = crate::bundled::bundled_store().unwrap();
        let original = store.get(2).unwrap().clone();

        let mut session = BuilderSession::from_workout(&original, ValidationMode::Custom);
        session.set_name("Quarter Repeats (10x)");
        session.update_repeated_count(10).unwrap();
        session.save_workout(&mut store).unwrap();

        assert_eq!(store.len(), 3);
        let updated = store.get(2).unwrap();
        assert_eq!(updated.name, "Quarter Repeats (10x)");
        assert_eq!(updated.work_block().unwrap().repeats(), 10);
    }

    #[test]
    fn test_events_are_published() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut store = WorkoutStore::default();
        let mut session = BuilderSession::default();
        session.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        session.set_name("Fartlek");
        let id = session.add_empty_block(BlockType::Work);
        let rest_id = session.add_rest_to_work_block().unwrap();
        session.save_workout(&mut store).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                SessionEvent::NameChanged("Fartlek".into()),
                SessionEvent::BlockAdded { id, block_type: BlockType::Work },
                SessionEvent::RestAttached { work_id: id, rest_id },
                SessionEvent::WorkoutSaved { id: 1 },
            ]
        );
    }

    #[test]
    fn test_unsubscribed_observer_sees_nothing() {
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);

        let mut session = BuilderSession::default();
        let id = session.subscribe(move |_| *counter.borrow_mut() += 1);
        session.set_name("Easy");
        assert!(session.unsubscribe(id));
        session.add_empty_block(BlockType::Warmup);

        assert_eq!(*count.borrow(), 1);
        assert!(!session.unsubscribe(id));
    }
}
