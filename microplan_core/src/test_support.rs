//! Shared fixtures for unit tests.

use crate::{day_date, Day, ItemConfig, Microcycle, Phase, ScheduledItem};
use chrono::NaiveDate;
use uuid::Uuid;

pub struct SampleIds {
    pub day1: Uuid,
    pub day2: Uuid,
    pub day3: Uuid,
    pub a: Uuid,
    pub b: Uuid,
    pub c: Uuid,
    pub x: Uuid,
    pub p: Uuid,
    pub q: Uuid,
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

pub fn push_item(day: &mut Day, phase: Phase, exercise_id: &str) -> Uuid {
    let id = Uuid::new_v4();
    let position = day.items(phase).len();
    let day_id = day.id;
    day.items_mut(phase).push(ScheduledItem {
        id,
        day_id,
        exercise_id: exercise_id.into(),
        phase,
        position,
        config: ItemConfig {
            sets: 3,
            reps_min: Some(8),
            reps_max: Some(12),
            rest_seconds: 90,
            ..Default::default()
        },
    });
    id
}

/// Three days:
/// - day 1: main `[A, B, C]`
/// - day 2: warmup `[X]`, main `[P, Q]`
/// - day 3: empty
pub fn sample_week() -> (Microcycle, SampleIds) {
    let mut mc = Microcycle::new("Week 1", start_date());

    let mut day1 = Day::new("Lower");
    let a = push_item(&mut day1, Phase::Main, "back_squat");
    let b = push_item(&mut day1, Phase::Main, "romanian_deadlift");
    let c = push_item(&mut day1, Phase::Main, "walking_lunge");

    let mut day2 = Day::new("Upper");
    let x = push_item(&mut day2, Phase::Warmup, "band_pull_apart");
    let p = push_item(&mut day2, Phase::Main, "bench_press");
    let q = push_item(&mut day2, Phase::Main, "pullup");

    let day3 = Day::new("Conditioning");

    let ids = SampleIds {
        day1: day1.id,
        day2: day2.id,
        day3: day3.id,
        a,
        b,
        c,
        x,
        p,
        q,
    };

    mc.days = vec![day1, day2, day3];
    for (index, day) in mc.days.iter_mut().enumerate() {
        day.day_number = index as u32 + 1;
        day.date = day_date(start_date(), day.day_number);
    }

    (mc, ids)
}

/// Assert every structural invariant holds
pub fn assert_consistent(mc: &Microcycle) {
    let errors = mc.validate();
    assert!(errors.is_empty(), "invariant violations: {:?}", errors);
}
