//! Exercise library shown in the side panel.
//!
//! Library exercises are the source of every "drag from library" gesture.
//! A built-in set is provided and can be extended from the config file.

use crate::config::CustomExercise;
use crate::ItemConfig;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Broad classification of an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseClass {
    Strength,
    Cardio,
    Mobility,
}

/// An exercise available for scheduling
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LibraryExercise {
    pub id: String,
    pub name: String,
    pub class: ExerciseClass,
    /// Prescription offered when the exercise is first dropped on a day
    pub default_config: ItemConfig,
}

/// All exercises that can be dragged onto the board
#[derive(Clone, Debug, Default)]
pub struct ExerciseLibrary {
    pub exercises: HashMap<String, LibraryExercise>,
}

impl ExerciseLibrary {
    pub fn get(&self, id: &str) -> Option<&LibraryExercise> {
        self.exercises.get(id)
    }

    /// Display name, falling back to the id for unknown exercises
    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |ex| ex.name.as_str())
    }

    pub fn insert(&mut self, exercise: LibraryExercise) {
        self.exercises.insert(exercise.id.clone(), exercise);
    }

    /// Exercises sorted by id, for stable listings
    pub fn sorted(&self) -> Vec<&LibraryExercise> {
        let mut all: Vec<_> = self.exercises.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Built-in library plus the exercises declared in the config file
    pub fn with_custom(custom: &[CustomExercise]) -> Self {
        let mut library = default_library().clone();
        library.extend_with_custom(custom);
        library
    }

    /// Add exercises declared in the config file.
    ///
    /// Custom entries replace built-ins with the same id.
    pub fn extend_with_custom(&mut self, custom: &[CustomExercise]) {
        for entry in custom {
            let default_config = default_config_for(entry.class);
            self.insert(LibraryExercise {
                id: entry.id.clone(),
                name: entry.name.clone(),
                class: entry.class,
                default_config,
            });
        }
    }

    /// Validate the library.
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (key, exercise) in &self.exercises {
            if exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            } else if key != &exercise.id {
                errors.push(format!(
                    "Exercise key '{}' does not match ID '{}'",
                    key, exercise.id
                ));
            }
            if exercise.name.trim().is_empty() {
                errors.push(format!("Exercise '{}' has empty name", key));
            }
            if exercise.id.chars().any(char::is_whitespace) {
                errors.push(format!("Exercise ID '{}' contains whitespace", exercise.id));
            }
        }

        errors
    }
}

fn default_config_for(class: ExerciseClass) -> ItemConfig {
    match class {
        ExerciseClass::Strength => strength(3, 8, 12, 90),
        ExerciseClass::Cardio => cardio(1200),
        ExerciseClass::Mobility => ItemConfig {
            sets: 2,
            reps_min: Some(8),
            reps_max: Some(8),
            rest_seconds: 0,
            ..Default::default()
        },
    }
}

fn strength(sets: u32, reps_min: u32, reps_max: u32, rest_seconds: u32) -> ItemConfig {
    ItemConfig {
        sets,
        reps_min: Some(reps_min),
        reps_max: Some(reps_max),
        rest_seconds,
        ..Default::default()
    }
}

fn cardio(duration_seconds: u32) -> ItemConfig {
    ItemConfig {
        sets: 1,
        duration_seconds: Some(duration_seconds),
        ..Default::default()
    }
}

/// Cached built-in library
static DEFAULT_LIBRARY: Lazy<ExerciseLibrary> = Lazy::new(build_default_library);

/// Reference to the cached built-in library
pub fn default_library() -> &'static ExerciseLibrary {
    &DEFAULT_LIBRARY
}

/// Build the built-in library
pub fn build_default_library() -> ExerciseLibrary {
    let mut library = ExerciseLibrary::default();

    let entries: [(&str, &str, ExerciseClass, ItemConfig); 14] = [
        ("back_squat", "Back Squat", ExerciseClass::Strength, strength(4, 5, 8, 150)),
        ("romanian_deadlift", "Romanian Deadlift", ExerciseClass::Strength, strength(3, 8, 10, 120)),
        ("walking_lunge", "Walking Lunge", ExerciseClass::Strength, strength(3, 10, 12, 90)),
        ("bench_press", "Bench Press", ExerciseClass::Strength, strength(4, 6, 8, 150)),
        ("pullup", "Pull-up", ExerciseClass::Strength, strength(3, 6, 10, 120)),
        ("overhead_press", "Overhead Press", ExerciseClass::Strength, strength(3, 6, 8, 120)),
        ("kb_swing", "Kettlebell Swing", ExerciseClass::Strength, strength(3, 15, 20, 60)),
        ("easy_run", "Easy Run (Zone 2)", ExerciseClass::Cardio, cardio(1800)),
        ("rower_intervals", "Rower Intervals", ExerciseClass::Cardio, cardio(900)),
        ("bike_flush", "Bike Flush", ExerciseClass::Cardio, cardio(600)),
        ("band_pull_apart", "Band Pull-Apart", ExerciseClass::Mobility, default_config_for(ExerciseClass::Mobility)),
        ("hip_cars", "Hip CARs", ExerciseClass::Mobility, default_config_for(ExerciseClass::Mobility)),
        ("worlds_greatest_stretch", "World's Greatest Stretch", ExerciseClass::Mobility, default_config_for(ExerciseClass::Mobility)),
        ("couch_stretch", "Couch Stretch", ExerciseClass::Mobility, default_config_for(ExerciseClass::Mobility)),
    ];

    for (id, name, class, default_config) in entries {
        library.insert(LibraryExercise {
            id: id.into(),
            name: name.into(),
            class,
            default_config,
        });
    }

    library
}
