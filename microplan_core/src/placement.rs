//! Placement resolution: raw drop target → (day, phase, index).
//!
//! - Dropping on an item inserts before that item
//! - Dropping on a phase zone appends to that phase
//! - Dropping on a day marker appends to the default phase (main)

use crate::drag::{DragSubject, DropTarget};
use crate::{locator, Error, Microcycle, Phase, Result};
use uuid::Uuid;

/// Concrete insertion point for an exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub day_id: Uuid,
    pub phase: Phase,
    pub index: usize,
}

/// Drop zone feedback for the UI.
///
/// `phase` is None while a whole day is being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlight {
    pub day_id: Uuid,
    pub phase: Option<Phase>,
}

/// Day and phase a drop target implies.
///
/// Kept separate from index computation so phase inference can be reasoned
/// about on its own: a zone names its phase, a day marker falls back to
/// `default_phase`, an item lends its own phase.
pub fn infer_phase(
    mc: &Microcycle,
    target: &DropTarget,
    default_phase: Phase,
) -> Result<(Uuid, Phase)> {
    match *target {
        DropTarget::Zone { day_id, phase } => Ok((day_id, phase)),
        DropTarget::Day(day_id) => Ok((day_id, default_phase)),
        DropTarget::Item(item_id) => {
            let (day, item) = locator::find_item(mc, item_id)
                .map_err(|_| Error::Unresolvable(format!("item {} is gone", item_id)))?;
            Ok((day.id, item.phase))
        }
    }
}

/// The day a drop target belongs to, whatever its kind
pub fn target_day(mc: &Microcycle, target: &DropTarget) -> Result<Uuid> {
    let day_id = match *target {
        DropTarget::Zone { day_id, .. } | DropTarget::Day(day_id) => day_id,
        DropTarget::Item(item_id) => {
            locator::find_item(mc, item_id)
                .map_err(|_| Error::Unresolvable(format!("item {} is gone", item_id)))?
                .0
                .id
        }
    };

    locator::find_day(mc, day_id)
        .map(|day| day.id)
        .map_err(|_| Error::Unresolvable(format!("day {} is gone", day_id)))
}

/// Resolve a typed drop target for an exercise drop
pub fn resolve(mc: &Microcycle, target: &DropTarget, default_phase: Phase) -> Result<Placement> {
    let (day_id, phase) = infer_phase(mc, target, default_phase)?;

    let day = locator::find_day(mc, day_id)
        .map_err(|_| Error::Unresolvable(format!("day {} is gone", day_id)))?;
    if day.rest_day {
        return Err(Error::Unresolvable(format!(
            "day {} is a rest day",
            day.day_number
        )));
    }

    let bucket = locator::items_in_container(mc, day_id, phase)?;
    let index = match *target {
        DropTarget::Item(item_id) => bucket
            .iter()
            .position(|item| item.id == item_id)
            .unwrap_or(bucket.len()),
        DropTarget::Zone { .. } | DropTarget::Day(_) => bucket.len(),
    };

    tracing::debug!(
        "Resolved drop on {:?} to day {} {} @ {}",
        target,
        day.day_number,
        phase,
        index
    );

    Ok(Placement {
        day_id,
        phase,
        index,
    })
}

/// Parse and resolve a raw drop target id
pub fn resolve_raw(mc: &Microcycle, raw: &str, default_phase: Phase) -> Result<Placement> {
    let target = DropTarget::parse(raw)
        .ok_or_else(|| Error::Unresolvable(format!("unrecognised target '{}'", raw)))?;
    resolve(mc, &target, default_phase)
}

/// Drop zone feedback for a subject hovering over a raw target
pub fn highlight(
    mc: &Microcycle,
    subject: &DragSubject,
    raw: &str,
    default_phase: Phase,
) -> Option<Highlight> {
    let target = DropTarget::parse(raw)?;
    match subject {
        DragSubject::Day(_) => target_day(mc, &target).ok().map(|day_id| Highlight {
            day_id,
            phase: None,
        }),
        DragSubject::LibraryExercise(_) | DragSubject::ScheduledItem(_) => {
            resolve(mc, &target, default_phase)
                .ok()
                .map(|placement| Highlight {
                    day_id: placement.day_id,
                    phase: Some(placement.phase),
                })
        }
    }
}
