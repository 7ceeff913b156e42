use crate::error::GroupingError;
use crate::scoring::{balance, score_submissions, summarize, PartitionSummary, ScoredSubmission};
use crate::storage::{GroupingStore, Partition, StoredPartition, SubmissionSource, SurveyInstanceId};

/// Scores, balances and persists groupings against injected storage.
///
/// `S` supplies submissions and `G` keeps the partition history. One value
/// may serve as both by passing a reference or `Arc` twice.
pub struct GroupingEngine<S, G> {
    submissions: S,
    store: G,
}

impl<S: SubmissionSource, G: GroupingStore> GroupingEngine<S, G> {
    pub fn new(submissions: S, store: G) -> Self {
        Self { submissions, store }
    }

    fn load_scored(
        &self,
        survey_id: SurveyInstanceId,
        group_size: usize,
    ) -> Result<Vec<ScoredSubmission>, GroupingError> {
        if group_size < 1 {
            return Err(GroupingError::invalid_argument(
                "Group size must be at least 1.",
            ));
        }

        let submissions = self.submissions.submissions_for(survey_id)?;
        log::debug!(
            "Loaded {} submissions for survey {}",
            submissions.len(),
            survey_id
        );
        if submissions.is_empty() {
            return Err(GroupingError::EmptyInput { survey_id });
        }

        Ok(score_submissions(submissions))
    }

    /// Partition every participant of `survey_id` into groups of at most `group_size`
    pub fn generate_groups(
        &self,
        survey_id: SurveyInstanceId,
        group_size: usize,
    ) -> Result<Partition, GroupingError> {
        self.generate_with_summary(survey_id, group_size)
            .map(|(partition, _)| partition)
    }

    /// Same as [`generate_groups`](Self::generate_groups), also returning group score totals
    pub fn generate_with_summary(
        &self,
        survey_id: SurveyInstanceId,
        group_size: usize,
    ) -> Result<(Partition, PartitionSummary), GroupingError> {
        let scored = self.load_scored(survey_id, group_size)?;
        let partition = balance(survey_id, &scored, group_size)?;
        let summary = summarize(&partition, &scored);

        log::info!(
            "Survey {}: {} participants in {} groups of up to {} (spread {:.2})",
            survey_id,
            scored.len(),
            partition.len(),
            group_size,
            summary.spread
        );

        Ok((partition, summary))
    }

    /// Generate groups and append them to the store's history
    pub fn generate_and_store_groups(
        &self,
        survey_id: SurveyInstanceId,
        group_size: usize,
    ) -> Result<Partition, GroupingError> {
        let partition = self.generate_groups(survey_id, group_size)?;
        self.persist(survey_id, &partition)?;
        Ok(partition)
    }

    /// Append an already computed partition to the history
    pub fn persist(
        &self,
        survey_id: SurveyInstanceId,
        partition: &Partition,
    ) -> Result<StoredPartition, GroupingError> {
        self.store.store(survey_id, partition)
    }

    /// Most recently stored partition for `survey_id`
    pub fn get_stored_groups(&self, survey_id: SurveyInstanceId) -> Result<Partition, GroupingError> {
        self.store.fetch_latest(survey_id)
    }

    /// Every stored partition for `survey_id`, oldest first
    pub fn partition_history(
        &self,
        survey_id: SurveyInstanceId,
    ) -> Result<Vec<StoredPartition>, GroupingError> {
        self.store.history(survey_id)
    }
}
