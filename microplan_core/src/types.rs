//! Core domain types for the training plan board.
//!
//! This module defines the container model the engines operate on:
//! - Phases and per-item exercise configuration
//! - Scheduled items placed on a day
//! - Training days and the microcycle that owns them

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Phases
// ============================================================================

/// Sub-list of a training day an item belongs to
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Warmup,
    #[default]
    Main,
    Cooldown,
}

impl Phase {
    /// All phases in display order
    pub const ALL: [Phase; 3] = [Phase::Warmup, Phase::Main, Phase::Cooldown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Warmup => "warmup",
            Phase::Main => "main",
            Phase::Cooldown => "cooldown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "warmup" | "warm-up" | "warm_up" => Ok(Phase::Warmup),
            "main" => Ok(Phase::Main),
            "cooldown" | "cool-down" | "cool_down" => Ok(Phase::Cooldown),
            other => Err(crate::Error::Config(format!("Unknown phase: {}", other))),
        }
    }
}

// ============================================================================
// Scheduled Items
// ============================================================================

/// Exercise prescription carried by a scheduled item.
///
/// The engines never interpret these fields; they are copied verbatim when
/// an item is moved or cloned.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ItemConfig {
    pub sets: u32,
    pub reps_min: Option<u32>,
    pub reps_max: Option<u32>,
    pub rest_seconds: u32,
    pub duration_seconds: Option<u32>,
    pub tempo: Option<String>,
    pub notes: Option<String>,
}

impl ItemConfig {
    /// Short human summary, e.g. "3x8-12" or "20 min"
    pub fn summary(&self) -> String {
        match (self.reps_min, self.reps_max, self.duration_seconds) {
            (Some(min), Some(max), _) if min != max => format!("{}x{}-{}", self.sets, min, max),
            (Some(reps), _, _) | (None, Some(reps), _) => format!("{}x{}", self.sets, reps),
            (None, None, Some(secs)) if secs % 60 == 0 => format!("{} min", secs / 60),
            (None, None, Some(secs)) => format!("{} s", secs),
            (None, None, None) => format!("{} sets", self.sets),
        }
    }
}

/// One exercise placed on a specific day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduledItem {
    pub id: Uuid,
    pub day_id: Uuid,
    pub exercise_id: String,
    pub phase: Phase,
    pub position: usize,
    pub config: ItemConfig,
}

// ============================================================================
// Days and Microcycles
// ============================================================================

/// An ordered unit within a microcycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Day {
    pub id: Uuid,
    pub day_number: u32,
    pub date: NaiveDate,
    pub name: String,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rest_day: bool,
    #[serde(default)]
    pub warmup: Vec<ScheduledItem>,
    #[serde(default)]
    pub main: Vec<ScheduledItem>,
    #[serde(default)]
    pub cooldown: Vec<ScheduledItem>,
}

impl Day {
    /// Create an empty day. Numbering and date are assigned on insertion.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            day_number: 0,
            date: NaiveDate::MIN,
            name: name.into(),
            focus: None,
            notes: None,
            rest_day: false,
            warmup: Vec::new(),
            main: Vec::new(),
            cooldown: Vec::new(),
        }
    }

    /// Create an empty rest day
    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            rest_day: true,
            ..Self::new(name)
        }
    }

    /// Items of one phase in stored order
    pub fn items(&self, phase: Phase) -> &[ScheduledItem] {
        match phase {
            Phase::Warmup => &self.warmup,
            Phase::Main => &self.main,
            Phase::Cooldown => &self.cooldown,
        }
    }

    pub(crate) fn items_mut(&mut self, phase: Phase) -> &mut Vec<ScheduledItem> {
        match phase {
            Phase::Warmup => &mut self.warmup,
            Phase::Main => &mut self.main,
            Phase::Cooldown => &mut self.cooldown,
        }
    }

    /// Iterate every item on the day, phase by phase
    pub fn all_items(&self) -> impl Iterator<Item = &ScheduledItem> {
        self.warmup
            .iter()
            .chain(self.main.iter())
            .chain(self.cooldown.iter())
    }

    pub fn item_count(&self) -> usize {
        self.warmup.len() + self.main.len() + self.cooldown.len()
    }
}

/// Container of days, usually one training week
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Microcycle {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub days: Vec<Day>,
}

/// Calendar date of a day number relative to the microcycle start
pub fn day_date(start_date: NaiveDate, day_number: u32) -> NaiveDate {
    start_date + Duration::days(i64::from(day_number.max(1)) - 1)
}

impl Microcycle {
    /// Create a microcycle with no days
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date,
            days: Vec::new(),
        }
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Date a day with the given number falls on
    pub fn date_for(&self, day_number: u32) -> NaiveDate {
        day_date(self.start_date, day_number)
    }

    /// Check the container invariants.
    ///
    /// Returns a list of violations, or an empty Vec if the microcycle is
    /// consistent.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (index, day) in self.days.iter().enumerate() {
            let expected_number = index as u32 + 1;
            if day.day_number != expected_number {
                errors.push(format!(
                    "Day {} has day_number {} (expected {})",
                    day.id, day.day_number, expected_number
                ));
            }

            let expected_date = self.date_for(day.day_number);
            if day.date != expected_date {
                errors.push(format!(
                    "Day {} is dated {} (expected {})",
                    day.id, day.date, expected_date
                ));
            }

            if day.rest_day && day.item_count() > 0 {
                errors.push(format!(
                    "Rest day {} holds {} exercises",
                    day.id,
                    day.item_count()
                ));
            }

            for phase in Phase::ALL {
                for (position, item) in day.items(phase).iter().enumerate() {
                    if item.position != position {
                        errors.push(format!(
                            "Item {} in {} of day {} has position {} (expected {})",
                            item.id, phase, day.day_number, item.position, position
                        ));
                    }
                    if item.day_id != day.id {
                        errors.push(format!(
                            "Item {} is stored on day {} but points at {}",
                            item.id, day.id, item.day_id
                        ));
                    }
                    if item.phase != phase {
                        errors.push(format!(
                            "Item {} is stored in {} but tagged {}",
                            item.id, phase, item.phase
                        ));
                    }
                }
            }
        }

        errors
    }

    /// Repair ordering corruption in place.
    ///
    /// Days are stably sorted by `day_number` and renumbered `1..=N` with
    /// dates recomputed; every bucket is stably sorted by `position` and
    /// renumbered from zero. Rest days holding items are reported by
    /// [`Microcycle::validate`] but left alone. Returns true if anything
    /// changed.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();

        self.days.sort_by_key(|d| d.day_number);
        let start = self.start_date;
        for (index, day) in self.days.iter_mut().enumerate() {
            day.day_number = index as u32 + 1;
            day.date = day_date(start, day.day_number);

            let day_id = day.id;
            for phase in Phase::ALL {
                let bucket = day.items_mut(phase);
                bucket.sort_by_key(|item| item.position);
                for (position, item) in bucket.iter_mut().enumerate() {
                    item.position = position;
                    item.day_id = day_id;
                    item.phase = phase;
                }
            }
        }

        *self != before
    }
}
