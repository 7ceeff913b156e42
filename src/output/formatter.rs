use std::io::IsTerminal;
use chrono::{Duration, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::error::GroupingError;
use crate::scoring::PartitionSummary;
use crate::storage::{Partition, StoredPartition};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with two decimals, trimming trailing zeros ("4.50" -> "4.5", "5.00" -> "5")
pub fn format_score(score: f64) -> String {
    let formatted = format!("{:.2}", score);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn join_ids(members: &[i64]) -> String {
    members
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a partition as one line per group: index, optional sum/mean, members.
///
/// Index column: 3 chars (fits "99."), right-aligned.
pub fn format_partition_table(
    partition: &Partition,
    summary: Option<&PartitionSummary>,
    use_colors: bool,
) -> String {
    if partition.is_empty() {
        return "No groups.".to_string();
    }

    let mut lines: Vec<String> = partition
        .groups
        .iter()
        .enumerate()
        .map(|(idx, members)| {
            let index_str = format!("{:>2}.", idx + 1);
            let members_str = join_ids(members);
            let totals = summary.and_then(|s| s.groups.get(idx)).map(|g| {
                format!(
                    "sum {:>6}  mean {:>5}",
                    format_score(g.score_sum),
                    format_score(g.mean_score)
                )
            });

            match (totals, use_colors) {
                (Some(t), true) => format!("{} {}  {}", index_str.dimmed(), t.bold(), members_str.cyan()),
                (Some(t), false) => format!("{} {}  {}", index_str, t, members_str),
                (None, true) => format!("{} {}", index_str.dimmed(), members_str.cyan()),
                (None, false) => format!("{} {}", index_str, members_str),
            }
        })
        .collect();

    if let Some(s) = summary {
        let footer = format!("spread {}", format_score(s.spread));
        lines.push(if use_colors {
            footer.yellow().to_string()
        } else {
            footer
        });
    }

    lines.join("\n")
}

/// Format a partition as tab-separated values for scripting.
/// One line per group, members separated by tabs (no headers, no colors)
pub fn format_tsv(partition: &Partition) -> String {
    partition
        .groups
        .iter()
        .map(|members| {
            members
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize any partition-shaped value as compact JSON
pub fn format_json<T: Serialize>(value: &T) -> Result<String, GroupingError> {
    Ok(serde_json::to_string(value)?)
}

/// Format stored partitions as one line each: id, age, group count, groups
pub fn format_history(rows: &[StoredPartition], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No stored groups.".to_string();
    }

    let now = Utc::now();
    rows.iter()
        .map(|row| {
            let id_str = format!("#{}", row.id);
            let age = format_age(now - row.created_at);
            let groups = row
                .groups
                .groups
                .iter()
                .map(|g| format!("[{}]", join_ids(g)))
                .collect::<Vec<_>>()
                .join(" ");

            if use_colors {
                format!(
                    "{} {:>8}  {} groups  {}",
                    id_str.bold(),
                    age.dimmed(),
                    row.groups.len(),
                    groups.cyan()
                )
            } else {
                format!("{} {:>8}  {} groups  {}", id_str, age, row.groups.len(), groups)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const AGE_UNITS: [(&str, i64); 4] = [("w", 604_800), ("d", 86_400), ("h", 3_600), ("m", 60)];

/// Age of a stored grouping in its largest whole unit ("5h ago", "2w ago").
/// Anything under a minute, or in the future, reads "just now".
pub fn format_age(duration: Duration) -> String {
    let secs = duration.num_seconds();
    AGE_UNITS
        .iter()
        .find(|(_, unit_secs)| secs >= *unit_secs)
        .map(|(label, unit_secs)| format!("{}{} ago", secs / unit_secs, label))
        .unwrap_or_else(|| "just now".to_string())
}
