//! Reordering engine for scheduled items.
//!
//! Every operation validates first and writes last, so a failure leaves the
//! microcycle exactly as it was. After a successful call each touched
//! (day, phase) bucket is stored in position order with positions
//! `0..len`.

use crate::{locator, Day, Error, ItemConfig, Microcycle, Phase, Result, ScheduledItem};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Clone of a bucket in position order
fn sorted_bucket(day: &Day, phase: Phase) -> Vec<ScheduledItem> {
    let mut items = day.items(phase).to_vec();
    items.sort_by_key(|item| item.position);
    items
}

/// Store a bucket, rewriting positions and ownership tags
fn write_bucket(day: &mut Day, phase: Phase, mut items: Vec<ScheduledItem>) {
    let day_id = day.id;
    for (position, item) in items.iter_mut().enumerate() {
        item.position = position;
        item.day_id = day_id;
        item.phase = phase;
    }
    *day.items_mut(phase) = items;
}

/// Clamp a caller-supplied index into `0..=len`
pub fn clamp_index(index: i64, len: usize) -> usize {
    if index <= 0 {
        0
    } else {
        usize::try_from(index).map_or(len, |i| i.min(len))
    }
}

/// Order of a bucket after moving `item_id` so it ends up at `to_index`.
///
/// The item is taken out first and reinserted at `to_index`, clamped to
/// the end of the shortened list. Dropping onto another item therefore
/// hands the dragged item that item's slot, in either direction. An item
/// not in the bucket leaves the order unchanged.
pub fn order_after_move(current: &[Uuid], item_id: Uuid, to_index: usize) -> Vec<Uuid> {
    let Some(from) = current.iter().position(|id| *id == item_id) else {
        return current.to_vec();
    };

    let mut order = current.to_vec();
    order.remove(from);
    let to = to_index.min(order.len());
    order.insert(to, item_id);
    order
}

/// Reassign positions within one bucket to the given order.
///
/// `ordered_ids` must be a permutation of the ids currently in the bucket;
/// anything else fails with [`Error::PermutationMismatch`] and changes
/// nothing.
pub fn reorder_within_container(
    mc: &mut Microcycle,
    day_id: Uuid,
    phase: Phase,
    ordered_ids: &[Uuid],
) -> Result<()> {
    let day_index = locator::day_index(mc, day_id)?;
    let current = sorted_bucket(&mc.days[day_index], phase);

    let mismatch = |reason: String| Error::PermutationMismatch {
        day_id,
        phase,
        reason,
    };

    let mut seen = HashSet::new();
    for id in ordered_ids {
        if !seen.insert(*id) {
            return Err(mismatch(format!("{} is listed twice", id)));
        }
    }

    let mut by_id: HashMap<Uuid, ScheduledItem> =
        current.into_iter().map(|item| (item.id, item)).collect();

    if let Some(extra) = ordered_ids.iter().find(|id| !by_id.contains_key(id)) {
        return Err(mismatch(format!("{} is not in this list", extra)));
    }
    if ordered_ids.len() != by_id.len() {
        return Err(mismatch(format!(
            "expected {} ids, got {}",
            by_id.len(),
            ordered_ids.len()
        )));
    }

    let reordered: Vec<ScheduledItem> = ordered_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();

    write_bucket(&mut mc.days[day_index], phase, reordered);

    tracing::info!(
        "Reordered {} of day {} ({} items)",
        phase,
        mc.days[day_index].day_number,
        ordered_ids.len()
    );
    Ok(())
}

/// Move an item into another bucket, possibly changing its phase.
///
/// The item leaves `from_day_id` (whatever phase it was in) and is inserted
/// into `to_day_id`/`to_phase` at `to_index`, clamped into
/// `0..=destination.len()`. Both buckets end densely indexed. Returns the
/// index the item landed on.
pub fn move_across_containers(
    mc: &mut Microcycle,
    item_id: Uuid,
    from_day_id: Uuid,
    to_day_id: Uuid,
    to_phase: Phase,
    to_index: i64,
) -> Result<usize> {
    let from_index = locator::day_index(mc, from_day_id)?;
    let to_day_index = locator::day_index(mc, to_day_id)?;

    let location = locator::locate_item(mc, item_id)?;
    if location.day_id != from_day_id {
        return Err(Error::item_not_found(item_id));
    }
    let from_phase = location.phase;

    if mc.days[to_day_index].rest_day {
        return Err(Error::RestDay(to_day_id));
    }

    let mut source = sorted_bucket(&mc.days[from_index], from_phase);
    let Some(source_pos) = source.iter().position(|item| item.id == item_id) else {
        return Err(Error::item_not_found(item_id));
    };
    let mut moving = source.remove(source_pos);

    let same_bucket = from_index == to_day_index && from_phase == to_phase;
    let mut destination = if same_bucket {
        std::mem::take(&mut source)
    } else {
        sorted_bucket(&mc.days[to_day_index], to_phase)
    };

    let landed = clamp_index(to_index, destination.len());
    if moving.phase != to_phase {
        tracing::debug!("Reclassifying {} from {} to {}", item_id, moving.phase, to_phase);
    }
    moving.phase = to_phase;
    moving.day_id = to_day_id;
    destination.insert(landed, moving);

    // All checks passed; commit both buckets
    if !same_bucket {
        write_bucket(&mut mc.days[from_index], from_phase, source);
    }
    write_bucket(&mut mc.days[to_day_index], to_phase, destination);

    tracing::info!(
        "Moved item {} from day {} {} to day {} {} @ {}",
        item_id,
        mc.days[from_index].day_number,
        from_phase,
        mc.days[to_day_index].day_number,
        to_phase,
        landed
    );
    Ok(landed)
}

/// Create a new item at a clamped index in a bucket
pub fn create_item(
    mc: &mut Microcycle,
    day_id: Uuid,
    phase: Phase,
    index: i64,
    exercise_id: &str,
    config: ItemConfig,
) -> Result<ScheduledItem> {
    let day_index = locator::day_index(mc, day_id)?;
    if mc.days[day_index].rest_day {
        return Err(Error::RestDay(day_id));
    }

    let mut bucket = sorted_bucket(&mc.days[day_index], phase);
    let landed = clamp_index(index, bucket.len());
    let item = ScheduledItem {
        id: Uuid::new_v4(),
        day_id,
        exercise_id: exercise_id.to_string(),
        phase,
        position: landed,
        config,
    };
    bucket.insert(landed, item.clone());
    write_bucket(&mut mc.days[day_index], phase, bucket);

    tracing::info!(
        "Scheduled {} on day {} {} @ {}",
        exercise_id,
        mc.days[day_index].day_number,
        phase,
        landed
    );
    Ok(item)
}

/// Remove an item; the rest of its bucket closes the gap
pub fn remove_item(mc: &mut Microcycle, item_id: Uuid) -> Result<ScheduledItem> {
    let location = locator::locate_item(mc, item_id)?;
    let day = &mut mc.days[location.day_index];

    let mut bucket = sorted_bucket(day, location.phase);
    let Some(pos) = bucket.iter().position(|item| item.id == item_id) else {
        return Err(Error::item_not_found(item_id));
    };
    let removed = bucket.remove(pos);
    write_bucket(day, location.phase, bucket);

    tracing::info!(
        "Removed item {} from day {} {}",
        item_id,
        day.day_number,
        location.phase
    );
    Ok(removed)
}

/// Copy an item directly after the original; later items shift down one
pub fn duplicate_item(mc: &mut Microcycle, item_id: Uuid) -> Result<ScheduledItem> {
    let location = locator::locate_item(mc, item_id)?;
    let day = &mut mc.days[location.day_index];

    let mut bucket = sorted_bucket(day, location.phase);
    let Some(pos) = bucket.iter().position(|item| item.id == item_id) else {
        return Err(Error::item_not_found(item_id));
    };
    let copy = ScheduledItem {
        id: Uuid::new_v4(),
        position: pos + 1,
        ..bucket[pos].clone()
    };
    bucket.insert(pos + 1, copy.clone());
    write_bucket(day, location.phase, bucket);

    tracing::info!("Duplicated item {} as {}", item_id, copy.id);
    Ok(copy)
}
