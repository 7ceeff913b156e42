use super::types::{latest_of, NewSubmission, Partition, StoredPartition, Submission, SurveyInstanceId};
use super::{GroupingStore, SubmissionSource};
use crate::error::GroupingError;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

/// In-process store backed by vectors behind a single mutex.
///
/// Useful as a test double and for embedding the engine where durability is
/// handled elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryData>,
}

#[derive(Default)]
struct MemoryData {
    submissions: Vec<Submission>,
    partitions: Vec<StoredPartition>,
    next_submission_id: i64,
    next_partition_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryData>, GroupingError> {
        self.inner
            .lock()
            .map_err(|_| GroupingError::storage("memory store lock poisoned"))
    }

    /// Record a finished submission and return it with its assigned id
    pub fn record_submission(&self, new: NewSubmission) -> Result<Submission, GroupingError> {
        let mut data = self.lock()?;
        data.next_submission_id += 1;
        let submission = new.into_submission(data.next_submission_id);
        data.submissions.push(submission.clone());
        Ok(submission)
    }
}

impl SubmissionSource for MemoryStore {
    fn submissions_for(&self, survey_id: SurveyInstanceId) -> Result<Vec<Submission>, GroupingError> {
        let data = self.lock()?;
        Ok(data
            .submissions
            .iter()
            .filter(|s| s.survey_id == survey_id)
            .cloned()
            .collect())
    }
}

impl GroupingStore for MemoryStore {
    fn store(
        &self,
        survey_id: SurveyInstanceId,
        partition: &Partition,
    ) -> Result<StoredPartition, GroupingError> {
        let mut data = self.lock()?;
        data.next_partition_id += 1;
        let row = StoredPartition {
            id: data.next_partition_id,
            survey_id,
            groups: partition.clone(),
            created_at: Utc::now(),
        };
        data.partitions.push(row.clone());
        Ok(row)
    }

    fn fetch_latest(&self, survey_id: SurveyInstanceId) -> Result<Partition, GroupingError> {
        let data = self.lock()?;
        latest_of(data.partitions.iter().filter(|p| p.survey_id == survey_id))
            .map(|row| row.groups.clone())
            .ok_or(GroupingError::NotFound { survey_id })
    }

    fn history(&self, survey_id: SurveyInstanceId) -> Result<Vec<StoredPartition>, GroupingError> {
        let data = self.lock()?;
        Ok(data
            .partitions
            .iter()
            .filter(|p| p.survey_id == survey_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.record_submission(NewSubmission::new(1, 10, ["5"])).unwrap();
        let b = store.record_submission(NewSubmission::new(1, 11, ["3"])).unwrap();
        assert!(b.submission_id > a.submission_id);
        assert_eq!(a.status, "submitted");
    }

    #[test]
    fn test_submissions_filtered_by_survey() {
        let store = MemoryStore::new();
        store.record_submission(NewSubmission::new(1, 10, ["5"])).unwrap();
        store.record_submission(NewSubmission::new(2, 20, ["4"])).unwrap();
        store.record_submission(NewSubmission::new(1, 11, ["3"])).unwrap();

        let subs = store.submissions_for(1).unwrap();
        let participants: Vec<_> = subs.iter().map(|s| s.participant_id).collect();
        assert_eq!(participants, vec![10, 11]);
    }

    #[test]
    fn test_fetch_latest_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.fetch_latest(7).unwrap_err();
        assert!(matches!(err, GroupingError::NotFound { survey_id: 7 }));
    }

    #[test]
    fn test_store_appends_and_latest_wins() {
        let store = MemoryStore::new();
        let first = Partition::new(vec![vec![1], vec![2]]);
        let second = Partition::new(vec![vec![2, 1]]);
        store.store(1, &first).unwrap();
        store.store(1, &second).unwrap();
        store.store(2, &first).unwrap();

        assert_eq!(store.fetch_latest(1).unwrap(), second);
        assert_eq!(store.history(1).unwrap().len(), 2);
        assert_eq!(store.history(2).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_stores_keep_every_row() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.store(1, &Partition::new(vec![vec![i]])).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let history = store.history(1).unwrap();
        assert_eq!(history.len(), 8);
        let mut ids: Vec<_> = history.iter().map(|r| r.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }
}
