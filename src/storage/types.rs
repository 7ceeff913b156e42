use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type SurveyInstanceId = i64;
pub type ParticipantId = i64;
pub type SubmissionId = i64;

pub const DEFAULT_STATUS: &str = "submitted";

/// One participant's finished response to one survey instance.
///
/// Answers are kept as the raw text the participant sent; they are only
/// turned into numbers when a grouping is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: SubmissionId,
    pub survey_id: SurveyInstanceId,
    pub participant_id: ParticipantId,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub submitted_at: DateTime<Utc>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// Submission data supplied by a caller before the store assigns an id
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub survey_id: SurveyInstanceId,
    pub participant_id: ParticipantId,
    pub answers: Vec<String>,
}

impl NewSubmission {
    pub fn new<I, S>(survey_id: SurveyInstanceId, participant_id: ParticipantId, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            survey_id,
            participant_id,
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn into_submission(self, submission_id: SubmissionId) -> Submission {
        Submission {
            submission_id,
            survey_id: self.survey_id,
            participant_id: self.participant_id,
            answers: self.answers,
            status: default_status(),
            submitted_at: Utc::now(),
        }
    }
}

/// A full division of participants into groups.
///
/// Serializes as a bare array of arrays of participant ids, e.g. `[[1,2],[3]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition {
    pub groups: Vec<Vec<ParticipantId>>,
}

impl Partition {
    pub fn new(groups: Vec<Vec<ParticipantId>>) -> Self {
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every participant id in group order
    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.groups.iter().flatten().copied()
    }

    pub fn into_groups(self) -> Vec<Vec<ParticipantId>> {
        self.groups
    }
}

/// One persisted grouping for a survey instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPartition {
    pub id: u64,
    pub survey_id: SurveyInstanceId,
    pub groups: Partition,
    pub created_at: DateTime<Utc>,
}

/// Pick the most recent row; equal timestamps resolve to the later-appended row.
pub(crate) fn latest_of<'a, I>(rows: I) -> Option<&'a StoredPartition>
where
    I: IntoIterator<Item = &'a StoredPartition>,
{
    rows.into_iter()
        .fold(None, |best: Option<&StoredPartition>, row| match best {
            Some(b) if b.created_at > row.created_at => Some(b),
            _ => Some(row),
        })
}
