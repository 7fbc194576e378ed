//! CSV export of a microcycle, one row per scheduled exercise.

use crate::library::ExerciseLibrary;
use crate::{Microcycle, Phase, Result};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    day_number: u32,
    date: String,
    day_name: &'a str,
    rest_day: bool,
    phase: Option<Phase>,
    position: Option<usize>,
    exercise_id: &'a str,
    exercise_name: &'a str,
    sets: Option<u32>,
    reps_min: Option<u32>,
    reps_max: Option<u32>,
    rest_seconds: Option<u32>,
    duration_seconds: Option<u32>,
    tempo: Option<&'a str>,
    notes: Option<&'a str>,
}

/// Write the microcycle to `path`, replacing any existing file.
///
/// Days with no exercises still get a single row so the calendar is
/// complete. Returns the number of rows written.
pub fn export_csv(mc: &Microcycle, library: &ExerciseLibrary, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0;

    for day in &mc.days {
        let date = day.date.format("%Y-%m-%d").to_string();

        if day.item_count() == 0 {
            writer.serialize(CsvRow {
                day_number: day.day_number,
                date: date.clone(),
                day_name: &day.name,
                rest_day: day.rest_day,
                phase: None,
                position: None,
                exercise_id: "",
                exercise_name: "",
                sets: None,
                reps_min: None,
                reps_max: None,
                rest_seconds: None,
                duration_seconds: None,
                tempo: None,
                notes: day.notes.as_deref(),
            })?;
            rows += 1;
            continue;
        }

        for phase in Phase::ALL {
            let mut items: Vec<_> = day.items(phase).iter().collect();
            items.sort_by_key(|item| item.position);

            for item in items {
                writer.serialize(CsvRow {
                    day_number: day.day_number,
                    date: date.clone(),
                    day_name: &day.name,
                    rest_day: day.rest_day,
                    phase: Some(phase),
                    position: Some(item.position),
                    exercise_id: &item.exercise_id,
                    exercise_name: library.name_of(&item.exercise_id),
                    sets: Some(item.config.sets),
                    reps_min: item.config.reps_min,
                    reps_max: item.config.reps_max,
                    rest_seconds: Some(item.config.rest_seconds),
                    duration_seconds: item.config.duration_seconds,
                    tempo: item.config.tempo.as_deref(),
                    notes: item.config.notes.as_deref(),
                })?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    tracing::info!("Exported {} rows to {:?}", rows, path);
    Ok(rows)
}
