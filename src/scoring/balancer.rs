use super::aggregate::ScoredSubmission;
use crate::error::GroupingError;
use crate::storage::{Partition, ParticipantId, SurveyInstanceId};

/// Convert a caller-supplied signed group size, rejecting anything below 1
pub fn group_size_from(raw: i64) -> Result<usize, GroupingError> {
    if raw < 1 {
        return Err(GroupingError::invalid_argument(format!(
            "Group size must be at least 1, got {}",
            raw
        )));
    }
    usize::try_from(raw)
        .map_err(|_| GroupingError::invalid_argument(format!("Group size {} is too large", raw)))
}

struct GroupSlot {
    members: Vec<ParticipantId>,
    sum: f64,
}

/// Index of the group with room whose running sum is strictly lowest.
/// The first such group wins ties. `None` when every group is full.
fn lightest_open_group(groups: &[GroupSlot], group_size: usize) -> Option<usize> {
    let mut target: Option<usize> = None;
    let mut min_sum = f64::INFINITY;
    for (i, group) in groups.iter().enumerate() {
        if group.members.len() < group_size && group.sum < min_sum {
            min_sum = group.sum;
            target = Some(i);
        }
    }
    target
}

/// Split scored submissions into `ceil(n / group_size)` groups with close score sums.
///
/// Submissions are taken highest score first (stable for equal scores) and
/// each goes to the group with room whose running sum is lowest, preferring
/// the lowest index on ties. The result is a greedy approximation, not an
/// optimal partition.
///
/// `survey_id` only labels the `EmptyInput` error.
pub fn balance(
    survey_id: SurveyInstanceId,
    scored: &[ScoredSubmission],
    group_size: usize,
) -> Result<Partition, GroupingError> {
    if group_size < 1 {
        return Err(GroupingError::invalid_argument(
            "Group size must be at least 1.",
        ));
    }
    if scored.is_empty() {
        return Err(GroupingError::EmptyInput { survey_id });
    }

    let num_groups = scored.len().div_ceil(group_size);

    // sort_by is stable, equal scores keep their input order
    let mut ordered: Vec<&ScoredSubmission> = scored.iter().collect();
    ordered.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut groups: Vec<GroupSlot> = (0..num_groups)
        .map(|_| GroupSlot {
            members: Vec::new(),
            sum: 0.0,
        })
        .collect();

    for sub in ordered {
        let Some(index) = lightest_open_group(&groups, group_size) else {
            log::error!(
                "All {} groups full while placing participant {} (survey {}, size {})",
                num_groups,
                sub.participant_id(),
                survey_id,
                group_size
            );
            return Err(GroupingError::invariant("All groups are full unexpectedly."));
        };

        let group = &mut groups[index];
        group.members.push(sub.participant_id());
        group.sum += sub.score;
    }

    Ok(Partition::new(
        groups.into_iter().map(|g| g.members).collect(),
    ))
}
