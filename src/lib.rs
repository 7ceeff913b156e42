pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod scoring;
pub mod storage;

pub use engine::GroupingEngine;
pub use error::GroupingError;
pub use storage::{
    GroupingStore, JsonFileStore, MemoryStore, NewSubmission, Partition, StoredPartition,
    Submission, SubmissionSource,
};
