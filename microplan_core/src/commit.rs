//! Persistence commits for board mutations.
//!
//! Engines never perform I/O. After a mutation succeeds locally the board
//! hands a [`Commit`] describing the already-applied state to a
//! [`CommitSink`]. Commits are appended to a JSONL (JSON Lines) log with
//! file locking so a separate process can replay them into a backend.

use crate::days::DayShift;
use crate::{Day, Phase, Result, ScheduledItem};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One locally applied mutation, ready to persist
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Commit {
    Reorder {
        day_id: Uuid,
        phase: Phase,
        ordered_ids: Vec<Uuid>,
    },
    Move {
        item_id: Uuid,
        from_day_id: Uuid,
        to_day_id: Uuid,
        to_phase: Phase,
        to_index: usize,
    },
    DayInsert {
        insertion_index: usize,
        /// Apply in listed order: highest day number first
        shifts: Vec<DayShift>,
        days: Vec<Day>,
    },
    ItemCreate {
        item: ScheduledItem,
    },
    ItemRemove {
        item_id: Uuid,
        day_id: Uuid,
        phase: Phase,
    },
    DayRemove {
        day_id: Uuid,
        /// Apply in listed order: lowest day number first
        shifts: Vec<DayShift>,
    },
}

impl Commit {
    pub fn kind(&self) -> &'static str {
        match self {
            Commit::Reorder { .. } => "reorder",
            Commit::Move { .. } => "move",
            Commit::DayInsert { .. } => "day_insert",
            Commit::ItemCreate { .. } => "item_create",
            Commit::ItemRemove { .. } => "item_remove",
            Commit::DayRemove { .. } => "day_remove",
        }
    }
}

/// Persistence collaborator for board mutations
pub trait CommitSink {
    fn append(&mut self, commit: &Commit) -> Result<()>;

    fn commit_reorder(&mut self, day_id: Uuid, phase: Phase, ordered_ids: &[Uuid]) -> Result<()> {
        self.append(&Commit::Reorder {
            day_id,
            phase,
            ordered_ids: ordered_ids.to_vec(),
        })
    }

    fn commit_move(
        &mut self,
        item_id: Uuid,
        from_day_id: Uuid,
        to_day_id: Uuid,
        to_phase: Phase,
        to_index: usize,
    ) -> Result<()> {
        self.append(&Commit::Move {
            item_id,
            from_day_id,
            to_day_id,
            to_phase,
            to_index,
        })
    }

    fn commit_day_insert(
        &mut self,
        days: &[Day],
        insertion_index: usize,
        shifts: &[DayShift],
    ) -> Result<()> {
        self.append(&Commit::DayInsert {
            insertion_index,
            shifts: shifts.to_vec(),
            days: days.to_vec(),
        })
    }

    fn commit_create(&mut self, item: &ScheduledItem) -> Result<()> {
        self.append(&Commit::ItemCreate { item: item.clone() })
    }

    fn commit_remove(&mut self, item: &ScheduledItem) -> Result<()> {
        self.append(&Commit::ItemRemove {
            item_id: item.id,
            day_id: item.day_id,
            phase: item.phase,
        })
    }

    fn commit_day_remove(&mut self, day_id: Uuid, shifts: &[DayShift]) -> Result<()> {
        self.append(&Commit::DayRemove {
            day_id,
            shifts: shifts.to_vec(),
        })
    }
}

/// A commit as stored in the log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: Uuid,
    pub microcycle_id: Uuid,
    pub committed_at: DateTime<Utc>,
    pub commit: Commit,
}

/// JSONL-based commit sink with file locking
pub struct JsonlCommitLog {
    path: PathBuf,
    microcycle_id: Uuid,
}

impl JsonlCommitLog {
    /// Create a new commit log for the given path
    pub fn new(path: impl Into<PathBuf>, microcycle_id: Uuid) -> Self {
        Self {
            path: path.into(),
            microcycle_id,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CommitSink for JsonlCommitLog {
    fn append(&mut self, commit: &Commit) -> Result<()> {
        self.ensure_parent_dir()?;

        let record = CommitRecord {
            id: Uuid::new_v4(),
            microcycle_id: self.microcycle_id,
            committed_at: Utc::now(),
            commit: commit.clone(),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(&record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended {} commit {} to log", commit.kind(), record.id);
        Ok(())
    }
}

/// Read all commits from a log file
pub fn read_commits(path: &Path) -> Result<Vec<CommitRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CommitRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse commit at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} commits from log", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_append_and_read_commits() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("commits.jsonl");
        let (mc, ids) = sample_week();

        let mut log = JsonlCommitLog::new(&log_path, mc.id);
        log.commit_reorder(ids.day1, Phase::Main, &[ids.c, ids.b, ids.a])
            .unwrap();
        log.commit_move(ids.x, ids.day2, ids.day1, Phase::Main, 0)
            .unwrap();

        let records = read_commits(&log_path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].microcycle_id, mc.id);
        assert_eq!(
            records[0].commit,
            Commit::Reorder {
                day_id: ids.day1,
                phase: Phase::Main,
                ordered_ids: vec![ids.c, ids.b, ids.a],
            }
        );
        assert_eq!(records[1].commit.kind(), "move");
    }

    #[test]
    fn test_day_insert_commit_carries_days() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("nested").join("commits.jsonl");
        let (mc, _) = sample_week();

        let mut log = JsonlCommitLog::new(&log_path, mc.id);
        log.commit_day_insert(&mc.days[..1], 3, &[]).unwrap();

        let records = read_commits(&log_path).unwrap();
        match &records[0].commit {
            Commit::DayInsert { days, insertion_index, .. } => {
                assert_eq!(*insertion_index, 3);
                assert_eq!(days[0].main.len(), 3);
            }
            other => panic!("unexpected commit {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("commits.jsonl");
        let (mc, ids) = sample_week();

        let mut log = JsonlCommitLog::new(&log_path, mc.id);
        log.commit_remove(&mc.days[0].main[0]).unwrap();

        let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
        writeln!(file, "{{ not json").unwrap();
        log.commit_day_remove(ids.day3, &[]).unwrap();

        let records = read_commits(&log_path).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let records = read_commits(&temp_dir.path().join("missing.jsonl")).unwrap();
        assert!(records.is_empty());
    }
}
