use crate::error::GroupingError;
use crate::scoring::parse_answer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings read from `~/.config/group-former/config.yaml`.
///
/// Example YAML:
/// ```yaml
/// data_path: /var/lib/group-former/data.json
/// group_size: 4
/// answer_scale:
///   min: 1
///   max: 5
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Data file holding submissions and stored groups (default: platform data dir)
    #[serde(default)]
    pub data_path: Option<PathBuf>,

    /// Group size used when `--size` is not given
    #[serde(default)]
    pub group_size: Option<i64>,

    /// Accepted answer range when recording submissions (default: 1-5)
    #[serde(default)]
    pub answer_scale: Option<AnswerScale>,
}

impl Config {
    pub fn effective_scale(&self) -> AnswerScale {
        self.answer_scale.clone().unwrap_or_default()
    }
}

/// Closed integer range answers must fall into
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnswerScale {
    pub min: i64,
    pub max: i64,
}

impl Default for AnswerScale {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

impl AnswerScale {
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Accept only answers written as a plain whole number inside the scale.
    ///
    /// Stricter than the scoring parse: `"+3"`, `"03"` and `"4.7"` are refused
    /// here even though scoring would read a leading integer from them.
    pub fn validate_answers<S: AsRef<str>>(&self, answers: &[S]) -> Result<(), GroupingError> {
        for answer in answers {
            let raw = answer.as_ref();
            match parse_answer(raw) {
                Some(value) if self.contains(value) && raw.trim() == value.to_string() => {}
                _ => {
                    return Err(GroupingError::invalid_argument(format!(
                        "Answer '{}' is not a whole number between {} and {}",
                        raw, self.min, self.max
                    )))
                }
            }
        }
        Ok(())
    }
}
