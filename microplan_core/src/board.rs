//! The board: single owner of the schedule being edited.
//!
//! All mutations of positions and day numbers go through here. The board
//! wires the drag session to the placement resolver and engines, and
//! reports every successful mutation to its [`CommitSink`].
//!
//! ## Commit failures
//!
//! Commits are fire-and-forget. If the sink fails, the local state is kept,
//! the failure is logged and queued as a [`CommitFailure`] for the UI to
//! show. There is no rollback.

use crate::commit::CommitSink;
use crate::config::BoardConfig;
use crate::drag::{classify_subject, DragSession, DragSubject, DropTarget};
use crate::library::ExerciseLibrary;
use crate::placement::{self, Highlight};
use crate::{days, locator, reorder};
use crate::{Day, Error, ItemConfig, Microcycle, Phase, Result, ScheduledItem};
use uuid::Uuid;

/// A library drop waiting for the exercise to be configured
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCreation {
    pub exercise_id: String,
    pub day_id: Uuid,
    pub phase: Phase,
    pub index: usize,
}

/// What a completed gesture did to the board
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationResult {
    ReorderedContainer {
        day_id: Uuid,
        phase: Phase,
        ordered_ids: Vec<Uuid>,
    },
    MovedAcrossContainers {
        item_id: Uuid,
        from_day_id: Uuid,
        to_day_id: Uuid,
        to_phase: Phase,
        to_index: usize,
    },
    DaysInserted {
        insertion_index: usize,
        day_ids: Vec<Uuid>,
    },
    /// Nothing changed
    Cancelled,
    /// No mutation yet; the exercise must be configured first
    PendingCreation(PendingCreation),
}

/// A commit the persistence layer rejected
#[derive(Clone, Debug)]
pub struct CommitFailure {
    pub kind: &'static str,
    pub message: String,
}

pub struct Board<S: CommitSink> {
    microcycle: Microcycle,
    library: ExerciseLibrary,
    settings: BoardConfig,
    session: DragSession,
    pending: Option<PendingCreation>,
    sink: S,
    notices: Vec<CommitFailure>,
}

impl<S: CommitSink> Board<S> {
    pub fn new(
        microcycle: Microcycle,
        library: ExerciseLibrary,
        settings: BoardConfig,
        sink: S,
    ) -> Self {
        Self {
            microcycle,
            library,
            settings,
            session: DragSession::new(),
            pending: None,
            sink,
            notices: Vec::new(),
        }
    }

    pub fn microcycle(&self) -> &Microcycle {
        &self.microcycle
    }

    pub fn into_microcycle(self) -> Microcycle {
        self.microcycle
    }

    pub fn library(&self) -> &ExerciseLibrary {
        &self.library
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn pending(&self) -> Option<&PendingCreation> {
        self.pending.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Drain queued commit failures
    pub fn take_notices(&mut self) -> Vec<CommitFailure> {
        std::mem::take(&mut self.notices)
    }

    fn publish<F>(&mut self, kind: &'static str, f: F)
    where
        F: FnOnce(&mut S) -> Result<()>,
    {
        if let Err(e) = f(&mut self.sink) {
            tracing::warn!("Commit of {} failed, local state kept: {}", kind, e);
            self.notices.push(CommitFailure {
                kind,
                message: e.to_string(),
            });
        }
    }

    // ========================================================================
    // Drag gestures
    // ========================================================================

    /// Begin a drag. Returns None (and stays idle) for unknown ids.
    pub fn on_drag_start(&mut self, raw_id: &str) -> Option<DragSubject> {
        if let Some(stale) = self.pending.take() {
            tracing::debug!("Discarding unconfirmed creation of {}", stale.exercise_id);
        }
        let subject = classify_subject(raw_id, &self.microcycle, &self.library);
        if subject.is_none() {
            tracing::debug!("Ignoring drag of unknown id '{}'", raw_id);
        }
        self.session.begin(subject).cloned()
    }

    /// Drop zone feedback while hovering; never mutates the schedule
    pub fn on_drag_over(&mut self, raw_target: &str) -> Option<Highlight> {
        let subject = self.session.subject()?.clone();
        let lit = placement::highlight(
            &self.microcycle,
            &subject,
            raw_target,
            self.settings.default_phase,
        );
        self.session.set_highlight(lit);
        lit
    }

    /// Abandon the current drag without touching the schedule
    pub fn cancel_drag(&mut self) {
        self.session.finish();
    }

    /// Finish a drag, applying whatever the drop means.
    ///
    /// `None` (dropped outside any zone) cancels. The session is idle again
    /// when this returns, whether or not it succeeded; on error nothing was
    /// mutated.
    pub fn on_drag_end(&mut self, raw_target: Option<&str>) -> Result<MutationResult> {
        let Some(subject) = self.session.finish() else {
            return Ok(MutationResult::Cancelled);
        };
        let Some(raw_target) = raw_target else {
            tracing::debug!("Drag of {:?} dropped outside the board", subject);
            return Ok(MutationResult::Cancelled);
        };

        let target = DropTarget::parse(raw_target)
            .ok_or_else(|| Error::Unresolvable(format!("unrecognised target '{}'", raw_target)))?;

        match subject {
            DragSubject::Day(source_id) => {
                let target_day = placement::target_day(&self.microcycle, &target)?;
                self.clone_day_after(source_id, target_day)
            }
            DragSubject::LibraryExercise(exercise_id) => {
                let at = placement::resolve(&self.microcycle, &target, self.settings.default_phase)?;
                let pending = PendingCreation {
                    exercise_id,
                    day_id: at.day_id,
                    phase: at.phase,
                    index: at.index,
                };
                self.pending = Some(pending.clone());
                Ok(MutationResult::PendingCreation(pending))
            }
            DragSubject::ScheduledItem(item_id) => {
                let at = placement::resolve(&self.microcycle, &target, self.settings.default_phase)?;
                let from = locator::locate_item(&self.microcycle, item_id)?;

                if from.day_id == at.day_id && from.phase == at.phase {
                    let current = locator::ids_in_container(&self.microcycle, at.day_id, at.phase)?;
                    let order = reorder::order_after_move(&current, item_id, at.index);
                    if order == current {
                        return Ok(MutationResult::Cancelled);
                    }
                    self.reorder(at.day_id, at.phase, &order)
                } else {
                    self.move_item(item_id, at.day_id, at.phase, at.index as i64)
                }
            }
        }
    }

    /// Create the exercise a library drop deferred.
    ///
    /// `config` of None uses the library's default prescription.
    pub fn confirm_pending(&mut self, config: Option<ItemConfig>) -> Result<ScheduledItem> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| Error::State("No exercise is waiting to be created".into()))?;

        let config = match config {
            Some(config) => config,
            None => self
                .library
                .get(&pending.exercise_id)
                .map(|ex| ex.default_config.clone())
                .ok_or_else(|| Error::NotFound {
                    entity: crate::error::Entity::Exercise,
                    id: pending.exercise_id.clone(),
                })?,
        };

        let item = reorder::create_item(
            &mut self.microcycle,
            pending.day_id,
            pending.phase,
            pending.index as i64,
            &pending.exercise_id,
            config,
        )?;
        self.publish("item_create", |sink| sink.commit_create(&item));
        Ok(item)
    }

    /// Drop a deferred creation (the configuration dialog was closed)
    pub fn discard_pending(&mut self) -> Option<PendingCreation> {
        self.pending.take()
    }

    // ========================================================================
    // Engine entry points
    // ========================================================================

    pub fn reorder(
        &mut self,
        day_id: Uuid,
        phase: Phase,
        ordered_ids: &[Uuid],
    ) -> Result<MutationResult> {
        reorder::reorder_within_container(&mut self.microcycle, day_id, phase, ordered_ids)?;
        let ordered_ids = locator::ids_in_container(&self.microcycle, day_id, phase)?;
        self.publish("reorder", |sink| {
            sink.commit_reorder(day_id, phase, &ordered_ids)
        });
        Ok(MutationResult::ReorderedContainer {
            day_id,
            phase,
            ordered_ids,
        })
    }

    /// Move an item to another bucket; its current day is looked up
    pub fn move_item(
        &mut self,
        item_id: Uuid,
        to_day_id: Uuid,
        to_phase: Phase,
        to_index: i64,
    ) -> Result<MutationResult> {
        let from_day_id = locator::locate_item(&self.microcycle, item_id)?.day_id;
        let landed = reorder::move_across_containers(
            &mut self.microcycle,
            item_id,
            from_day_id,
            to_day_id,
            to_phase,
            to_index,
        )?;
        self.publish("move", |sink| {
            sink.commit_move(item_id, from_day_id, to_day_id, to_phase, landed)
        });
        Ok(MutationResult::MovedAcrossContainers {
            item_id,
            from_day_id,
            to_day_id,
            to_phase,
            to_index: landed,
        })
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Result<ScheduledItem> {
        let removed = reorder::remove_item(&mut self.microcycle, item_id)?;
        self.publish("item_remove", |sink| sink.commit_remove(&removed));
        Ok(removed)
    }

    pub fn duplicate_item(&mut self, item_id: Uuid) -> Result<ScheduledItem> {
        let copy = reorder::duplicate_item(&mut self.microcycle, item_id)?;
        self.publish("item_create", |sink| sink.commit_create(&copy));
        Ok(copy)
    }

    fn publish_insertion(&mut self, insertion: days::DayInsertion) -> MutationResult {
        if !insertion.day_ids.is_empty() {
            let inserted: Vec<Day> = self
                .microcycle
                .days
                .iter()
                .filter(|d| insertion.day_ids.contains(&d.id))
                .cloned()
                .collect();
            let index = insertion.insertion_index;
            let shifts = insertion.shifts;
            self.publish("day_insert", |sink| {
                sink.commit_day_insert(&inserted, index, &shifts)
            });
        }
        MutationResult::DaysInserted {
            insertion_index: insertion.insertion_index,
            day_ids: insertion.day_ids,
        }
    }

    pub fn insert_days(&mut self, new_days: Vec<Day>, insertion_index: usize) -> Result<MutationResult> {
        days::ensure_capacity(&self.microcycle, new_days.len(), self.settings.max_days)?;
        let insertion = days::insert_days(&mut self.microcycle, new_days, insertion_index)?;
        Ok(self.publish_insertion(insertion))
    }

    pub fn clone_days(&mut self, source_ids: &[Uuid], insertion_index: usize) -> Result<MutationResult> {
        for id in source_ids {
            locator::find_day(&self.microcycle, *id)?;
        }
        let unique: std::collections::HashSet<_> = source_ids.iter().collect();
        days::ensure_capacity(&self.microcycle, unique.len(), self.settings.max_days)?;
        let insertion = days::clone_days(&mut self.microcycle, source_ids, insertion_index)?;
        Ok(self.publish_insertion(insertion))
    }

    /// Clone a day and place the copy right after `target_day_id`
    pub fn clone_day_after(&mut self, source_id: Uuid, target_day_id: Uuid) -> Result<MutationResult> {
        let index = locator::day_index(&self.microcycle, target_day_id)? + 1;
        self.clone_days(&[source_id], index)
    }

    /// Append a new empty day; returns its id
    pub fn append_day(&mut self, name: &str, rest_day: bool) -> Result<Uuid> {
        let day = if rest_day { Day::rest(name) } else { Day::new(name) };
        let end = self.microcycle.day_count();
        match self.insert_days(vec![day], end)? {
            MutationResult::DaysInserted { day_ids, .. } => day_ids
                .first()
                .copied()
                .ok_or_else(|| Error::State("Appended day went missing".into())),
            _ => Err(Error::State("Unexpected result appending a day".into())),
        }
    }

    pub fn remove_day(&mut self, day_id: Uuid) -> Result<Day> {
        let (removed, shifts) = days::remove_day(&mut self.microcycle, day_id)?;
        self.publish("day_remove", |sink| sink.commit_day_remove(day_id, &shifts));
        Ok(removed)
    }
}
