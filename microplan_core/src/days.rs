//! Day insertion and shifting.
//!
//! Days are numbered `1..=N` in microcycle order and dated
//! `start_date + (day_number - 1)`. Inserting days pushes every later day
//! back by the number inserted; removing one pulls later days forward.

use crate::{day_date, locator, Day, Error, Microcycle, Phase, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Renumbering applied to an existing day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayShift {
    pub day_id: Uuid,
    pub from: u32,
    pub to: u32,
    pub date: NaiveDate,
}

/// Outcome of an insertion
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DayInsertion {
    pub insertion_index: usize,
    /// Ids of the inserted days in their new order
    pub day_ids: Vec<Uuid>,
    /// Shifted days in descending original `day_number`
    pub shifts: Vec<DayShift>,
}

/// Fail with [`Error::CapacityExceeded`] if `extra` more days would not fit
pub fn ensure_capacity(mc: &Microcycle, extra: usize, limit: u32) -> Result<()> {
    if mc.days.len() + extra > limit as usize {
        return Err(Error::CapacityExceeded { limit });
    }
    Ok(())
}

/// Insert `new_days` so the first of them becomes day `insertion_index + 1`.
///
/// Days at or after the insertion point are shifted back by
/// `new_days.len()`, highest number first, with dates recomputed. Inserting
/// nothing is a no-op; inserting at the end skips the shift.
pub fn insert_days(
    mc: &mut Microcycle,
    new_days: Vec<Day>,
    insertion_index: usize,
) -> Result<DayInsertion> {
    if insertion_index > mc.days.len() {
        return Err(Error::InvalidIndex {
            index: insertion_index as i64,
            len: mc.days.len(),
        });
    }

    if new_days.is_empty() {
        return Ok(DayInsertion {
            insertion_index,
            ..Default::default()
        });
    }

    let mut seen: HashSet<Uuid> = mc.days.iter().map(|d| d.id).collect();
    for day in &new_days {
        if !seen.insert(day.id) {
            return Err(Error::State(format!("day {} is already scheduled", day.id)));
        }
        if day.rest_day && day.item_count() > 0 {
            return Err(Error::RestDay(day.id));
        }
    }

    let count = new_days.len() as u32;
    let start = mc.start_date;
    let mut after = mc.days.split_off(insertion_index);

    let mut shifts = Vec::with_capacity(after.len());
    for day in after.iter_mut().rev() {
        let to = day.day_number + count;
        shifts.push(DayShift {
            day_id: day.id,
            from: day.day_number,
            to,
            date: day_date(start, to),
        });
        day.day_number = to;
        day.date = day_date(start, to);
    }

    let mut day_ids = Vec::with_capacity(new_days.len());
    for (offset, mut day) in new_days.into_iter().enumerate() {
        day.day_number = (insertion_index + offset) as u32 + 1;
        day.date = day_date(start, day.day_number);
        let day_id = day.id;
        for phase in Phase::ALL {
            let bucket = day.items_mut(phase);
            bucket.sort_by_key(|item| item.position);
            for (position, item) in bucket.iter_mut().enumerate() {
                item.day_id = day_id;
                item.phase = phase;
                item.position = position;
            }
        }
        day_ids.push(day_id);
        mc.days.push(day);
    }
    mc.days.append(&mut after);

    tracing::info!(
        "Inserted {} day(s) at index {}, shifted {} later day(s)",
        day_ids.len(),
        insertion_index,
        shifts.len()
    );

    Ok(DayInsertion {
        insertion_index,
        day_ids,
        shifts,
    })
}

/// Deep copy of a day with fresh ids.
///
/// Items keep their phase and config; positions are renumbered from zero
/// in their existing order, repairing any gaps in the source.
pub fn clone_day(source: &Day) -> Day {
    let mut copy = Day {
        id: Uuid::new_v4(),
        warmup: Vec::new(),
        main: Vec::new(),
        cooldown: Vec::new(),
        ..source.clone()
    };

    for phase in Phase::ALL {
        let mut items = source.items(phase).to_vec();
        items.sort_by_key(|item| item.position);
        for (position, item) in items.iter_mut().enumerate() {
            item.id = Uuid::new_v4();
            item.day_id = copy.id;
            item.phase = phase;
            item.position = position;
        }
        *copy.items_mut(phase) = items;
    }

    copy
}

/// Clone existing days into the microcycle at `insertion_index`.
///
/// Sources are cloned in their microcycle order regardless of the order
/// given, and each source is cloned once.
pub fn clone_days(
    mc: &mut Microcycle,
    source_ids: &[Uuid],
    insertion_index: usize,
) -> Result<DayInsertion> {
    for id in source_ids {
        locator::find_day(mc, *id)?;
    }

    let wanted: HashSet<Uuid> = source_ids.iter().copied().collect();
    let clones: Vec<Day> = mc
        .days
        .iter()
        .filter(|d| wanted.contains(&d.id))
        .map(clone_day)
        .collect();

    insert_days(mc, clones, insertion_index)
}

/// Append a day at the end of the microcycle
pub fn append_day(mc: &mut Microcycle, day: Day) -> Result<DayInsertion> {
    let end = mc.days.len();
    insert_days(mc, vec![day], end)
}

/// Remove a day and its items; later days move up one number
pub fn remove_day(mc: &mut Microcycle, day_id: Uuid) -> Result<(Day, Vec<DayShift>)> {
    let index = locator::day_index(mc, day_id)?;
    let removed = mc.days.remove(index);

    let start = mc.start_date;
    let mut shifts = Vec::new();
    for day in mc.days.iter_mut().skip(index) {
        let to = day.day_number.saturating_sub(1).max(1);
        shifts.push(DayShift {
            day_id: day.id,
            from: day.day_number,
            to,
            date: day_date(start, to),
        });
        day.day_number = to;
        day.date = day_date(start, to);
    }

    tracing::info!(
        "Removed day {} ({} exercises), shifted {} later day(s)",
        removed.day_number,
        removed.item_count(),
        shifts.len()
    );
    Ok((removed, shifts))
}
