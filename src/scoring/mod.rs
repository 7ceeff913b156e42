pub mod aggregate;
pub mod balancer;
pub mod summary;

pub use aggregate::{average_score, parse_answer, score_submissions, ScoredSubmission};
pub use balancer::{balance, group_size_from};
pub use summary::{summarize, GroupSummary, PartitionSummary};
