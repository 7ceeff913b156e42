use crate::storage::Submission;

/// A submission together with the score used as its balancing key
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSubmission {
    pub submission: Submission,
    pub score: f64,
}

impl ScoredSubmission {
    pub fn from_submission(submission: Submission) -> Self {
        let score = average_score(&submission.answers);
        Self { submission, score }
    }

    pub fn participant_id(&self) -> i64 {
        self.submission.participant_id
    }
}

/// Best-effort integer parse of a raw answer.
///
/// Surrounding whitespace is ignored and the leading integer is taken, so
/// `"4.7"` reads as 4 and `"3 stars"` as 3. Returns `None` when the text does
/// not start with digits (after an optional sign) or the value overflows.
pub fn parse_answer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Arithmetic mean of the answers that parse.
///
/// Unparsable answers are left out of the mean entirely. No usable answers
/// gives 0.0.
pub fn average_score<S: AsRef<str>>(answers: &[S]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;

    for answer in answers {
        match parse_answer(answer.as_ref()) {
            Some(value) => {
                sum += value as f64;
                count += 1;
            }
            None => log::warn!("Ignoring non-numeric answer '{}'", answer.as_ref()),
        }
    }

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Score every submission, keeping input order
pub fn score_submissions(submissions: Vec<Submission>) -> Vec<ScoredSubmission> {
    submissions
        .into_iter()
        .map(ScoredSubmission::from_submission)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn submission(participant_id: i64, answers: &[&str]) -> Submission {
        Submission {
            submission_id: participant_id,
            survey_id: 1,
            participant_id,
            answers: answers.iter().map(|a| a.to_string()).collect(),
            status: "submitted".to_string(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_of_equal_answers() {
        assert_eq!(average_score(&["5", "5"]), 5.0);
        assert_eq!(average_score(&["3", "3"]), 3.0);
    }

    #[test]
    fn test_average_of_no_answers_is_zero() {
        let empty: [&str; 0] = [];
        assert_eq!(average_score(&empty), 0.0);
    }

    #[test]
    fn test_average_mixed_values() {
        assert_eq!(average_score(&["1", "2", "4", "5"]), 3.0);
        assert_eq!(average_score(&["4", "5"]), 4.5);
    }

    #[test]
    fn test_unparsable_answers_are_excluded() {
        assert_eq!(average_score(&["4", "abc"]), 4.0);
        assert_eq!(average_score(&["", "2", "n/a"]), 2.0);
    }

    #[test]
    fn test_all_unparsable_is_zero() {
        assert_eq!(average_score(&["abc", "?"]), 0.0);
    }

    #[test]
    fn test_parse_answer_plain() {
        assert_eq!(parse_answer("5"), Some(5));
        assert_eq!(parse_answer(" 3 "), Some(3));
        assert_eq!(parse_answer("+2"), Some(2));
        assert_eq!(parse_answer("-1"), Some(-1));
    }

    #[test]
    fn test_parse_answer_takes_leading_integer() {
        assert_eq!(parse_answer("4.7"), Some(4));
        assert_eq!(parse_answer("3 stars"), Some(3));
        assert_eq!(parse_answer("007"), Some(7));
    }

    #[test]
    fn test_parse_answer_rejects_non_numeric() {
        assert_eq!(parse_answer("abc"), None);
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("-"), None);
        assert_eq!(parse_answer("x5"), None);
        assert_eq!(parse_answer(".5"), None);
    }

    #[test]
    fn test_parse_answer_overflow() {
        assert_eq!(parse_answer("99999999999999999999999"), None);
    }

    #[test]
    fn test_score_submissions_keeps_order() {
        let scored = score_submissions(vec![
            submission(101, &["5", "5"]),
            submission(102, &["3", "3"]),
            submission(103, &[]),
        ]);
        let pairs: Vec<_> = scored.iter().map(|s| (s.participant_id(), s.score)).collect();
        assert_eq!(pairs, vec![(101, 5.0), (102, 3.0), (103, 0.0)]);
    }
}
