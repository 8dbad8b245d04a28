// src/report.rs
//! Run summary and the persisted link-metadata artifact.

use anyhow::{Context, Result};
use std::path::Path;

use crate::commit::{CommitStats, ItemResult, Outcome};
use crate::dedup::DedupStats;
use crate::reconcile::ReconcileResult;
use crate::types::LinkRecord;

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub source: String,
    pub messages: usize,
    pub dedup: DedupStats,
    pub already_present: usize,
    pub excluded: usize,
    pub commit: CommitStats,
}

impl RunSummary {
    /// Skips never fail a run; any `error:*` outcome does.
    pub fn exit_code(&self) -> i32 {
        if self.commit.has_errors() {
            1
        } else {
            0
        }
    }

    pub fn log(&self) {
        tracing::info!(
            source = %self.source,
            messages = self.messages,
            links = self.dedup.input,
            unique_links = self.dedup.kept,
            already_present = self.already_present,
            excluded = self.excluded,
            added = self.commit.added,
            skipped = self.commit.skipped(),
            errors = self.commit.errors_permission + self.commit.errors_other,
            "run finished"
        );
    }
}

/// Per-item outcomes as a human-readable block for the console.
pub fn format_outcomes(results: &[ItemResult]) -> String {
    let mut out = String::new();
    for r in results {
        let line = match &r.outcome {
            Outcome::Added { title } => format!("added    {}  {}", r.identifier, title),
            Outcome::SkippedExcluded => format!("skipped  {}  (blacklisted)", r.identifier),
            Outcome::SkippedNotFound => format!("skipped  {}  (not found)", r.identifier),
            Outcome::SkippedDuplicate => format!("skipped  {}  (already in playlist)", r.identifier),
            Outcome::ErrorPermission(msg) => format!("ERROR    {}  permission: {}", r.identifier, msg),
            Outcome::ErrorOther(msg) => format!("ERROR    {}  {}", r.identifier, msg),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn apply_reconcile(summary: &mut RunSummary, reconcile: &ReconcileResult) {
    summary.already_present = reconcile.already_present;
    summary.excluded = reconcile.excluded;
}

/// Write the deduplicated link records as a JSON array of
/// `{identifier, timestampMs, senderId}` objects. Field names and order are
/// consumed downstream by anonymization tooling; the serde layout on
/// `LinkRecord` guarantees them.
pub fn write_link_metadata(path: &Path, records: &[LinkRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("serializing link metadata")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing link metadata to {}", path.display()))?;
    tracing::info!(path = %path.display(), count = records.len(), "wrote link metadata");
    Ok(())
}
