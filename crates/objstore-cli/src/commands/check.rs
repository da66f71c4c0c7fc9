//! `objstore check`

use crate::error::Result;
use colored::Colorize;
use objstore_core::{CheckIssue, ObjectStorage};

fn describe(issue: &CheckIssue) -> String {
    match issue {
        CheckIssue::OrphanObject(uuid) => format!("{uuid}: object file with no meta sidecar"),
        CheckIssue::OrphanMeta(uuid) => format!("{uuid}: meta file with no object"),
        CheckIssue::ChecksumMismatch(uuid) => format!("{uuid}: checksum mismatch"),
        CheckIssue::MissingChild { parent, child } => {
            format!("{parent}: references missing child {child}")
        }
        CheckIssue::Expired(uuid) => format!("{uuid}: expired"),
    }
}

fn kind(issue: &CheckIssue) -> &'static str {
    match issue {
        CheckIssue::OrphanObject(_) => "orphan_object",
        CheckIssue::OrphanMeta(_) => "orphan_meta",
        CheckIssue::ChecksumMismatch(_) => "checksum_mismatch",
        CheckIssue::MissingChild { .. } => "missing_child",
        CheckIssue::Expired(_) => "expired",
    }
}

pub fn run(storage: &ObjectStorage, json: bool) -> Result<()> {
    let issues = storage.check()?;

    if json {
        let value: Vec<_> = issues
            .iter()
            .map(|issue| serde_json::json!({ "kind": kind(issue), "detail": describe(issue) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if issues.is_empty() {
        println!("{}", "no issues found".green());
        return Ok(());
    }
    for issue in &issues {
        println!("{} {}", "issue:".yellow().bold(), describe(issue));
    }
    Ok(())
}
