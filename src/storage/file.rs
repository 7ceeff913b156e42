use super::types::{latest_of, NewSubmission, Partition, StoredPartition, Submission, SurveyInstanceId};
use super::{GroupingStore, SubmissionSource};
use crate::error::GroupingError;
use atomic_write_file::AtomicWriteFile;
use chrono::Utc;
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const STATE_VERSION: u32 = 1;

/// Get the platform-appropriate data file path for group-former
pub fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("group-former").join("data.json"))
        .unwrap_or_else(|| crate::config::get_config_dir().join("data.json"))
}

/// On-disk document holding every submission and stored partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreState {
    pub version: u32,
    #[serde(default)]
    pub next_submission_id: i64,
    #[serde(default)]
    pub next_partition_id: u64,
    #[serde(default)]
    pub submissions: Vec<Submission>,
    #[serde(default)]
    pub partitions: Vec<StoredPartition>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreState {
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            next_submission_id: 0,
            next_partition_id: 0,
            submissions: Vec::new(),
            partitions: Vec::new(),
        }
    }
}

/// Load store state from a JSON file
///
/// If the file doesn't exist, returns a new empty state.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_store_state(path: &Path) -> Result<StoreState, GroupingError> {
    if !path.exists() {
        return Ok(StoreState::new());
    }

    let file = File::open(path).map_err(|e| {
        GroupingError::storage(format!("Failed to open data file at {}: {}", path.display(), e))
    })?;

    let state: StoreState = serde_json::from_reader(file)?;

    if state.version != STATE_VERSION {
        return Err(GroupingError::storage(format!(
            "Unsupported data file version: {}",
            state.version
        )));
    }

    Ok(state)
}

fn ensure_parent_dir(path: &Path) -> Result<(), GroupingError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                GroupingError::storage(format!(
                    "Failed to create data directory at {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// Sidecar lock file next to the data file (`data.json` -> `data.json.lock`)
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Save store state to a JSON file atomically
///
/// The file is either fully replaced or left untouched.
/// Creates the parent directory if it doesn't exist.
pub fn save_store_state(path: &Path, state: &StoreState) -> Result<(), GroupingError> {
    ensure_parent_dir(path)?;

    let mut file = AtomicWriteFile::open(path).map_err(|e| {
        GroupingError::storage(format!(
            "Failed to open atomic write file at {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::to_writer_pretty(&mut file, state)?;

    file.commit()
        .map_err(|e| GroupingError::storage(format!("Failed to save data file: {}", e)))?;

    Ok(())
}

/// Durable store keeping everything in one JSON document.
///
/// Every write re-reads the file, applies the change and commits atomically
/// while holding an exclusive OS lock on the sidecar `.lock` file, so writers
/// in other handles or processes are serialized too. `write_lock` orders
/// callers sharing this instance. Reads take no OS lock: commits replace the
/// data file atomically.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, GroupingError> {
        self.write_lock
            .lock()
            .map_err(|_| GroupingError::storage("data file lock poisoned"))
    }

    fn update<T>(&self, apply: impl FnOnce(&mut StoreState) -> T) -> Result<T, GroupingError> {
        let _guard = self.lock()?;
        ensure_parent_dir(&self.path)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(lock_path(&self.path))
            .map_err(|e| {
                GroupingError::storage(format!(
                    "Failed to open lock file for {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        let mut file_lock = RwLock::new(lock_file);
        let _held = file_lock.write().map_err(|e| {
            GroupingError::storage(format!("Failed to lock {}: {}", self.path.display(), e))
        })?;

        let mut state = load_store_state(&self.path)?;
        let out = apply(&mut state);
        save_store_state(&self.path, &state)?;
        Ok(out)
    }

    fn read(&self) -> Result<StoreState, GroupingError> {
        let _guard = self.lock()?;
        load_store_state(&self.path)
    }

    /// Record a finished submission and return it with its assigned id
    pub fn record_submission(&self, new: NewSubmission) -> Result<Submission, GroupingError> {
        let submission = self.update(|state| {
            state.next_submission_id += 1;
            let submission = new.into_submission(state.next_submission_id);
            state.submissions.push(submission.clone());
            submission
        })?;
        log::debug!(
            "Recorded submission {} for participant {} on survey {}",
            submission.submission_id,
            submission.participant_id,
            submission.survey_id
        );
        Ok(submission)
    }
}

impl SubmissionSource for JsonFileStore {
    fn submissions_for(&self, survey_id: SurveyInstanceId) -> Result<Vec<Submission>, GroupingError> {
        let state = self.read()?;
        Ok(state
            .submissions
            .into_iter()
            .filter(|s| s.survey_id == survey_id)
            .collect())
    }
}

impl GroupingStore for JsonFileStore {
    fn store(
        &self,
        survey_id: SurveyInstanceId,
        partition: &Partition,
    ) -> Result<StoredPartition, GroupingError> {
        let row = self.update(|state| {
            state.next_partition_id += 1;
            let row = StoredPartition {
                id: state.next_partition_id,
                survey_id,
                groups: partition.clone(),
                created_at: Utc::now(),
            };
            state.partitions.push(row.clone());
            row
        })?;
        log::info!(
            "Stored partition {} for survey {} ({} groups)",
            row.id,
            survey_id,
            row.groups.len()
        );
        Ok(row)
    }

    fn fetch_latest(&self, survey_id: SurveyInstanceId) -> Result<Partition, GroupingError> {
        let state = self.read()?;
        latest_of(state.partitions.iter().filter(|p| p.survey_id == survey_id))
            .map(|row| row.groups.clone())
            .ok_or(GroupingError::NotFound { survey_id })
    }

    fn history(&self, survey_id: SurveyInstanceId) -> Result<Vec<StoredPartition>, GroupingError> {
        let state = self.read()?;
        Ok(state
            .partitions
            .into_iter()
            .filter(|p| p.survey_id == survey_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = load_store_state(&dir.path().join("missing.json")).unwrap();
        assert_eq!(state.version, 1);
        assert!(state.submissions.is_empty());
        assert!(state.partitions.is_empty());
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"version": 9}"#).unwrap();

        let err = load_store_state(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported data file version: 9"));
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_store_state(&path).unwrap_err();
        assert!(matches!(err, GroupingError::Serialization(_)));
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("data.json");
        save_store_state(&path, &StoreState::new()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_reopen_sees_previous_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        {
            let store = JsonFileStore::open(&path);
            store.record_submission(NewSubmission::new(3, 301, ["4", "5"])).unwrap();
            store.store(3, &Partition::new(vec![vec![301]])).unwrap();
        }

        let reopened = JsonFileStore::open(&path);
        let subs = reopened.submissions_for(3).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].answers, vec!["4".to_string(), "5".to_string()]);
        assert_eq!(reopened.fetch_latest(3).unwrap().groups, vec![vec![301]]);
    }

    #[test]
    fn test_fetch_latest_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("data.json"));
        let err = store.fetch_latest(999).unwrap_err();
        assert!(matches!(err, GroupingError::NotFound { survey_id: 999 }));
    }

    #[test]
    fn test_history_is_append_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("data.json"));
        let first = Partition::new(vec![vec![1], vec![2]]);
        let second = Partition::new(vec![vec![1, 2]]);
        store.store(5, &first).unwrap();
        store.store(5, &second).unwrap();

        let history = store.history(5).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].groups, first);
        assert_eq!(history[1].groups, second);
        assert_eq!(store.fetch_latest(5).unwrap(), second);
    }

    #[test]
    fn test_lock_path_is_sidecar() {
        assert_eq!(
            lock_path(Path::new("/tmp/groups/data.json")),
            PathBuf::from("/tmp/groups/data.json.lock")
        );
    }

    #[test]
    fn test_separate_handles_keep_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let threads = 8;
        let rounds = 20;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let path = path.clone();
                thread::spawn(move || {
                    let store = JsonFileStore::open(&path);
                    for r in 0..rounds {
                        let participant = (t * 100 + r) as i64;
                        store
                            .record_submission(NewSubmission::new(1, participant, ["3"]))
                            .unwrap();
                        store.store(1, &Partition::new(vec![vec![participant]])).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = JsonFileStore::open(&path);
        let subs = store.submissions_for(1).unwrap();
        let history = store.history(1).unwrap();
        assert_eq!(subs.len(), threads * rounds);
        assert_eq!(history.len(), threads * rounds);

        let mut ids: Vec<_> = subs.iter().map(|s| s.submission_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), threads * rounds);
    }

    #[test]
    fn test_concurrent_writers_share_one_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::open(dir.path().join("data.json")));
        let handles: Vec<_> = (0..6)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.store(1, &Partition::new(vec![vec![i]])).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.history(1).unwrap().len(), 6);
    }
}
