//! Read-only lookups over a microcycle.
//!
//! Ownership only flows downward (microcycle → day → item). Every
//! "which day is this item on" question is answered here by scanning,
//! never by a stored back-pointer.

use crate::{Day, Error, Microcycle, Phase, Result, ScheduledItem};
use uuid::Uuid;

/// Where an item currently lives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemLocation {
    pub day_id: Uuid,
    pub day_index: usize,
    pub phase: Phase,
    pub index: usize,
}

/// Find an item and the day that owns it
pub fn find_item(mc: &Microcycle, item_id: Uuid) -> Result<(&Day, &ScheduledItem)> {
    mc.days
        .iter()
        .find_map(|day| {
            day.all_items()
                .find(|item| item.id == item_id)
                .map(|item| (day, item))
        })
        .ok_or_else(|| Error::item_not_found(item_id))
}

/// Locate an item by its storage coordinates
pub fn locate_item(mc: &Microcycle, item_id: Uuid) -> Result<ItemLocation> {
    for (day_index, day) in mc.days.iter().enumerate() {
        for phase in Phase::ALL {
            if let Some(index) = day.items(phase).iter().position(|i| i.id == item_id) {
                return Ok(ItemLocation {
                    day_id: day.id,
                    day_index,
                    phase,
                    index,
                });
            }
        }
    }
    Err(Error::item_not_found(item_id))
}

pub fn find_day(mc: &Microcycle, day_id: Uuid) -> Result<&Day> {
    mc.days
        .iter()
        .find(|d| d.id == day_id)
        .ok_or_else(|| Error::day_not_found(day_id))
}

/// Zero-based index of a day within the microcycle ordering
pub fn day_index(mc: &Microcycle, day_id: Uuid) -> Result<usize> {
    mc.days
        .iter()
        .position(|d| d.id == day_id)
        .ok_or_else(|| Error::day_not_found(day_id))
}

/// Find a day by its 1-based number
pub fn find_day_by_number(mc: &Microcycle, day_number: u32) -> Option<&Day> {
    mc.days.iter().find(|d| d.day_number == day_number)
}

/// Items of one (day, phase) bucket, sorted by position.
///
/// This is the canonical read path; the result borrows the microcycle and
/// so cannot outlive a mutation.
pub fn items_in_container(
    mc: &Microcycle,
    day_id: Uuid,
    phase: Phase,
) -> Result<Vec<&ScheduledItem>> {
    let day = find_day(mc, day_id)?;
    let mut items: Vec<_> = day.items(phase).iter().collect();
    items.sort_by_key(|item| item.position);
    Ok(items)
}

/// Ids of one bucket in position order
pub fn ids_in_container(mc: &Microcycle, day_id: Uuid, phase: Phase) -> Result<Vec<Uuid>> {
    Ok(items_in_container(mc, day_id, phase)?
        .into_iter()
        .map(|item| item.id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_find_item_returns_owning_day() {
        let (mc, ids) = sample_week();
        let (day, item) = find_item(&mc, ids.b).unwrap();
        assert_eq!(day.id, ids.day1);
        assert_eq!(item.position, 1);
    }

    #[test]
    fn test_find_item_not_found() {
        let (mc, _) = sample_week();
        let err = find_item(&mc, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_locate_item_reports_coordinates() {
        let (mc, ids) = sample_week();
        let loc = locate_item(&mc, ids.x).unwrap();
        assert_eq!(loc.day_id, ids.day2);
        assert_eq!(loc.day_index, 1);
        assert_eq!(loc.phase, Phase::Warmup);
        assert_eq!(loc.index, 0);
    }

    #[test]
    fn test_day_lookups() {
        let (mc, ids) = sample_week();
        assert_eq!(day_index(&mc, ids.day3).unwrap(), 2);
        assert_eq!(find_day(&mc, ids.day2).unwrap().day_number, 2);
        assert_eq!(find_day_by_number(&mc, 3).unwrap().id, ids.day3);
        assert!(find_day_by_number(&mc, 9).is_none());
        assert!(day_index(&mc, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_items_in_container_sorted_by_position() {
        let (mut mc, ids) = sample_week();
        // Swap storage order without touching positions
        mc.days[0].main.swap(0, 2);

        let ordered = ids_in_container(&mc, ids.day1, Phase::Main).unwrap();
        assert_eq!(ordered, vec![ids.a, ids.b, ids.c]);
    }
}
