pub mod file;
pub mod memory;
pub mod types;

pub use file::{default_data_path, JsonFileStore};
pub use memory::MemoryStore;
pub use types::{
    NewSubmission, Partition, ParticipantId, StoredPartition, Submission, SubmissionId,
    SurveyInstanceId,
};

use crate::error::GroupingError;
use std::sync::Arc;

/// Read access to the submissions recorded for a survey instance
pub trait SubmissionSource: Send + Sync {
    /// All submissions for `survey_id`, in the order they were recorded
    fn submissions_for(&self, survey_id: SurveyInstanceId) -> Result<Vec<Submission>, GroupingError>;
}

/// Append-only history of computed partitions
pub trait GroupingStore: Send + Sync {
    /// Append a new row stamped with the current time. Prior rows are never touched.
    fn store(
        &self,
        survey_id: SurveyInstanceId,
        partition: &Partition,
    ) -> Result<StoredPartition, GroupingError>;

    /// Partition from the most recent row for `survey_id`
    ///
    /// Fails with [`GroupingError::NotFound`] when nothing was stored yet.
    fn fetch_latest(&self, survey_id: SurveyInstanceId) -> Result<Partition, GroupingError>;

    /// Every stored row for `survey_id`, oldest first
    fn history(&self, survey_id: SurveyInstanceId) -> Result<Vec<StoredPartition>, GroupingError>;
}

impl<T: SubmissionSource + ?Sized> SubmissionSource for &T {
    fn submissions_for(&self, survey_id: SurveyInstanceId) -> Result<Vec<Submission>, GroupingError> {
        (**self).submissions_for(survey_id)
    }
}

impl<T: SubmissionSource + ?Sized> SubmissionSource for Arc<T> {
    fn submissions_for(&self, survey_id: SurveyInstanceId) -> Result<Vec<Submission>, GroupingError> {
        (**self).submissions_for(survey_id)
    }
}

impl<T: GroupingStore + ?Sized> GroupingStore for &T {
    fn store(
        &self,
        survey_id: SurveyInstanceId,
        partition: &Partition,
    ) -> Result<StoredPartition, GroupingError> {
        (**self).store(survey_id, partition)
    }

    fn fetch_latest(&self, survey_id: SurveyInstanceId) -> Result<Partition, GroupingError> {
        (**self).fetch_latest(survey_id)
    }

    fn history(&self, survey_id: SurveyInstanceId) -> Result<Vec<StoredPartition>, GroupingError> {
        (**self).history(survey_id)
    }
}

impl<T: GroupingStore + ?Sized> GroupingStore for Arc<T> {
    fn store(
        &self,
        survey_id: SurveyInstanceId,
        partition: &Partition,
    ) -> Result<StoredPartition, GroupingError> {
        (**self).store(survey_id, partition)
    }

    fn fetch_latest(&self, survey_id: SurveyInstanceId) -> Result<Partition, GroupingError> {
        (**self).fetch_latest(survey_id)
    }

    fn history(&self, survey_id: SurveyInstanceId) -> Result<Vec<StoredPartition>, GroupingError> {
        (**self).history(survey_id)
    }
}
