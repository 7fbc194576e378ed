//! Board snapshot persistence with file locking.
//!
//! The whole microcycle is stored as one JSON document. Writes go through
//! a temp file in the same directory and are renamed into place.

use crate::{Error, Microcycle, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl Microcycle {
    /// Load a microcycle snapshot with shared locking.
    ///
    /// A snapshot that violates the ordering invariants is repaired with
    /// [`Microcycle::normalize`] and a warning is logged.
    pub fn load(path: &Path) -> Result<Self> {
        let mut mc = Self::read(path)?;

        let problems = mc.validate();
        if !problems.is_empty() {
            for problem in &problems {
                tracing::warn!("Board snapshot {:?}: {}", path, problem);
            }
            mc.normalize();
            tracing::warn!("Repaired {} ordering problem(s) on load", problems.len());
        }

        tracing::debug!("Loaded board {} from {:?}", mc.id, path);
        Ok(mc)
    }

    /// Read a snapshot as stored, without repairing it
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::State(format!(
                "No board found at {:?}; run `mplan init` first",
                path
            )));
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        Ok(serde_json::from_str(&contents)?)
    }

    /// Save a microcycle snapshot with exclusive locking
    ///
    /// Atomically writes the snapshot by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("Board path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved board {} to {:?}", self.id, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("board.json");
        let (mc, ids) = sample_week();

        mc.save(&path).unwrap();
        let loaded = Microcycle::load(&path).unwrap();

        assert_eq!(loaded, mc);
        assert_eq!(loaded.days[0].main[1].id, ids.b);
    }

    #[test]
    fn test_load_missing_board() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = Microcycle::load(&temp_dir.path().join("board.json")).unwrap_err();
        assert!(matches!(err, Error::State(_)));
    }

    #[test]
    fn test_corrupted_board_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("board.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        assert!(matches!(Microcycle::load(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_repairs_gaps() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("board.json");
        let (mut mc, _) = sample_week();
        mc.days[0].main[2].position = 10;
        mc.days[2].day_number = 7;
        mc.save(&path).unwrap();

        assert!(!Microcycle::read(&path).unwrap().validate().is_empty());

        let loaded = Microcycle::load(&path).unwrap();
        assert_consistent(&loaded);
        assert_eq!(loaded.days[2].day_number, 3);
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("board.json");
        let (mc, _) = sample_week();
        mc.save(&path).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "board.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only board.json, found extras: {:?}",
            extras
        );
    }
}
