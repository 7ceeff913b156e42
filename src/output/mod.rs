pub mod formatter;

pub use formatter::{
    format_age, format_history, format_json, format_partition_table, format_score, format_tsv,
    should_use_colors,
};
