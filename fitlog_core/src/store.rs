//! Record store for workouts, meals and the profile.
//!
//! Workouts and meals are kept as JSON Lines files; the profile is a single
//! JSON document. Every operation holds an advisory lock on a lock file in
//! the store directory (shared for reads, exclusive for writes), and files
//! are replaced atomically when records are updated or deleted.

use crate::{Error, MealRecord, Profile, Result, WorkoutRecord};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

const WORKOUTS_FILE: &str = "workouts.jsonl";
const MEALS_FILE: &str = "meals.jsonl";
const PROFILE_FILE: &str = "profile.json";
const LOCK_FILE: &str = ".fitlog.lock";

/// Create/read/update/delete access to a user's records
pub trait RecordStore {
    fn workouts(&self) -> Result<Vec<WorkoutRecord>>;
    fn meals(&self) -> Result<Vec<MealRecord>>;
    /// `None` when no profile has been saved yet
    fn profile(&self) -> Result<Option<Profile>>;

    fn add_workout(&mut self, workout: &WorkoutRecord) -> Result<()>;
    fn update_workout(&mut self, workout: &WorkoutRecord) -> Result<()>;
    fn delete_workout(&mut self, id: Uuid) -> Result<()>;

    fn add_meal(&mut self, meal: &MealRecord) -> Result<()>;
    fn update_meal(&mut self, meal: &MealRecord) -> Result<()>;
    fn delete_meal(&mut self, id: Uuid) -> Result<()>;

    fn save_profile(&mut self, profile: &Profile) -> Result<()>;
}

/// Turn a failed fetch into an empty collection, logging the failure
///
/// Aggregation expects in-memory sequences; storage trouble is reported
/// here rather than inside the calculations.
pub fn load_or_empty<T>(what: &str, result: Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Failed to load {}: {}. Treating as empty.", what, e);
            Vec::new()
        }
    }
}

/// Records that can be located by id
trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for WorkoutRecord {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for MealRecord {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// File-backed store rooted at a data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store for the given directory (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn workouts_path(&self) -> PathBuf {
        self.dir.join(WORKOUTS_FILE)
    }

    pub fn meals_path(&self) -> PathBuf {
        self.dir.join(MEALS_FILE)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    /// Open the lock file, creating the directory when `create` is set
    ///
    /// Returns `None` for reads against a directory that does not exist yet.
    fn open_lock(&self, create: bool) -> Result<Option<File>> {
        if create {
            std::fs::create_dir_all(&self.dir)?;
        } else if !self.dir.exists() {
            return Ok(None);
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        Ok(Some(file))
    }

    fn with_shared<T>(&self, f: impl FnOnce() -> Result<T>, empty: T) -> Result<T> {
        let Some(lock) = self.open_lock(false)? else {
            return Ok(empty);
        };
        lock.lock_shared()?;
        let result = f();
        lock.unlock()?;
        result
    }

    fn with_exclusive<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self
            .open_lock(true)?
            .ok_or_else(|| Error::Store(format!("cannot lock {:?}", self.dir)))?;
        lock.lock_exclusive()?;
        let result = f();
        lock.unlock()?;
        result
    }

    /// Swap the stored line carrying `record`'s id for the new record
    ///
    /// Lines that do not parse as the record type are written back verbatim.
    fn replace<T>(&self, path: &Path, record: &T) -> Result<()>
    where
        T: Keyed + Serialize,
    {
        self.with_exclusive(|| {
            let mut lines = read_raw_lines(path)?;
            let slot = lines
                .iter_mut()
                .find(|line| line_key(line) == Some(record.key()))
                .ok_or_else(|| Error::NotFound(record.key().to_string()))?;
            *slot = serde_json::to_string(record)?;
            rewrite(path, &lines)
        })
    }

    fn remove(&self, path: &Path, id: Uuid) -> Result<()> {
        self.with_exclusive(|| {
            let mut lines = read_raw_lines(path)?;
            let before = lines.len();
            lines.retain(|line| line_key(line) != Some(id));
            if lines.len() == before {
                return Err(Error::NotFound(id.to_string()));
            }
            rewrite(path, &lines)
        })
    }
}

impl RecordStore for FileStore {
    fn workouts(&self) -> Result<Vec<WorkoutRecord>> {
        let path = self.workouts_path();
        self.with_shared(|| read_lines(&path), Vec::new())
    }

    fn meals(&self) -> Result<Vec<MealRecord>> {
        let path = self.meals_path();
        self.with_shared(|| read_lines(&path), Vec::new())
    }

    fn profile(&self) -> Result<Option<Profile>> {
        let path = self.profile_path();
        self.with_shared(|| read_profile(&path), None)
    }

    fn add_workout(&mut self, workout: &WorkoutRecord) -> Result<()> {
        workout.validate()?;
        let path = self.workouts_path();
        self.with_exclusive(|| append_line(&path, workout))?;
        tracing::debug!("Appended workout {} to store", workout.id);
        Ok(())
    }

    fn update_workout(&mut self, workout: &WorkoutRecord) -> Result<()> {
        workout.validate()?;
        self.replace(&self.workouts_path(), workout)?;
        tracing::debug!("Updated workout {}", workout.id);
        Ok(())
    }

    fn delete_workout(&mut self, id: Uuid) -> Result<()> {
        self.remove(&self.workouts_path(), id)?;
        tracing::info!("Deleted workout {}", id);
        Ok(())
    }

    fn add_meal(&mut self, meal: &MealRecord) -> Result<()> {
        meal.validate()?;
        let path = self.meals_path();
        self.with_exclusive(|| append_line(&path, meal))?;
        tracing::debug!("Appended meal {} to store", meal.id);
        Ok(())
    }

    fn update_meal(&mut self, meal: &MealRecord) -> Result<()> {
        meal.validate()?;
        self.replace(&self.meals_path(), meal)?;
        tracing::debug!("Updated meal {}", meal.id);
        Ok(())
    }

    fn delete_meal(&mut self, id: Uuid) -> Result<()> {
        self.remove(&self.meals_path(), id)?;
        tracing::info!("Deleted meal {}", id);
        Ok(())
    }

    fn save_profile(&mut self, profile: &Profile) -> Result<()> {
        profile.validate()?;
        let path = self.profile_path();
        self.with_exclusive(|| {
            let contents = serde_json::to_string_pretty(profile)?;
            write_atomic(&path, contents.as_bytes())
        })?;
        tracing::debug!("Saved profile to {:?}", path);
        Ok(())
    }
}

fn append_line<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = std::io::BufWriter::new(&file);
    let line = serde_json::to_string(record)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read every parseable record; corrupt lines are skipped with a warning
fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse record at {:?} line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    tracing::debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

/// Non-empty lines of a record file, untouched
fn read_raw_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for line_result in reader.lines() {
        let line = line_result?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

#[derive(serde::Deserialize)]
struct RecordId {
    id: Uuid,
}

/// Id of the record on `line`, if the line has one
///
/// Only the id is read, so records this build cannot fully parse can still
/// be located.
fn line_key(line: &str) -> Option<Uuid> {
    serde_json::from_str::<RecordId>(line).ok().map(|r| r.id)
}

fn rewrite(path: &Path, lines: &[String]) -> Result<()> {
    let mut contents = Vec::new();
    for line in lines {
        contents.extend_from_slice(line.as_bytes());
        contents.push(b'\n');
    }
    write_atomic(path, &contents)
}

/// Write to a temp file in the same directory, sync, then rename over `path`
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Store(format!("{:?} has no parent directory", path)))?;
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents)?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// A missing profile is `None`; an unreadable one is logged and treated as missing
fn read_profile(path: &Path) -> Result<Option<Profile>> {
    if !path.exists() {
        tracing::info!("No profile found at {:?}", path);
        return Ok(None);
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("Unable to read profile {:?}: {}. Ignoring it.", path, e);
            return Ok(None);
        }
    };

    match serde_json::from_str::<Profile>(&contents) {
        Ok(profile) => Ok(Some(profile)),
        Err(e) => {
            tracing::warn!("Failed to parse profile {:?}: {}. Ignoring it.", path, e);
            Ok(None)
        }
    }
}
