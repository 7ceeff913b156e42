use super::aggregate::ScoredSubmission;
use crate::storage::{Partition, ParticipantId};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub members: Vec<ParticipantId>,
    pub score_sum: f64,
    pub mean_score: f64,
}

/// Per-group score totals for a partition, for reporting only
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSummary {
    pub groups: Vec<GroupSummary>,
    /// Highest group sum minus lowest group sum
    pub spread: f64,
}

/// Attach score sums and means to each group of `partition`.
///
/// Participants missing from `scored` count as 0. A participant that
/// submitted more than once contributes each of its scores, consumed in
/// input order as the id reappears across groups.
pub fn summarize(partition: &Partition, scored: &[ScoredSubmission]) -> PartitionSummary {
    let mut scores: HashMap<ParticipantId, Vec<f64>> = HashMap::new();
    for sub in scored.iter().rev() {
        scores.entry(sub.participant_id()).or_default().push(sub.score);
    }

    let groups: Vec<GroupSummary> = partition
        .groups
        .iter()
        .map(|members| {
            let score_sum: f64 = members
                .iter()
                .map(|id| scores.get_mut(id).and_then(|s| s.pop()).unwrap_or(0.0))
                .sum();
            let mean_score = if members.is_empty() {
                0.0
            } else {
                score_sum / members.len() as f64
            };
            GroupSummary {
                members: members.clone(),
                score_sum,
                mean_score,
            }
        })
        .collect();

    let max = groups.iter().map(|g| g.score_sum).fold(f64::NEG_INFINITY, f64::max);
    let min = groups.iter().map(|g| g.score_sum).fold(f64::INFINITY, f64::min);
    let spread = if groups.is_empty() { 0.0 } else { max - min };

    PartitionSummary { groups, spread }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::balance;
    use crate::storage::Submission;
    use chrono::Utc;

    fn scored(pairs: &[(i64, f64)]) -> Vec<ScoredSubmission> {
        pairs
            .iter()
            .map(|&(participant_id, score)| ScoredSubmission {
                submission: Submission {
                    submission_id: participant_id,
                    survey_id: 1,
                    participant_id,
                    answers: vec![],
                    status: "submitted".to_string(),
                    submitted_at: Utc::now(),
                },
                score,
            })
            .collect()
    }

    #[test]
    fn test_summary_of_balanced_pairs() {
        let input = scored(&[(101, 5.0), (102, 3.0), (103, 4.0), (104, 2.0), (105, 1.0)]);
        let partition = balance(1, &input, 2).unwrap();
        let summary = summarize(&partition, &input);

        let sums: Vec<_> = summary.groups.iter().map(|g| g.score_sum).collect();
        assert_eq!(sums, vec![5.0, 5.0, 5.0]);
        assert_eq!(summary.spread, 0.0);
        assert_eq!(summary.groups[1].mean_score, 2.5);
    }

    #[test]
    fn test_spread_reports_imbalance() {
        let input = scored(&[(1, 5.0), (2, 1.0)]);
        let partition = Partition::new(vec![vec![1], vec![2]]);
        let summary = summarize(&partition, &input);
        assert_eq!(summary.spread, 4.0);
    }

    #[test]
    fn test_unknown_participant_counts_as_zero() {
        let partition = Partition::new(vec![vec![42]]);
        let summary = summarize(&partition, &[]);
        assert_eq!(summary.groups[0].score_sum, 0.0);
        assert_eq!(summary.spread, 0.0);
    }

    #[test]
    fn test_repeat_participant_scores_used_once_each() {
        let input = scored(&[(7, 4.0), (7, 2.0)]);
        let partition = Partition::new(vec![vec![7], vec![7]]);
        let summary = summarize(&partition, &input);
        assert_eq!(summary.groups[0].score_sum, 4.0);
        assert_eq!(summary.groups[1].score_sum, 2.0);
    }
}
