// src/pipeline.rs
//! One synchronization run, end to end.
//!
//! Normalizer → Extractor → Aggregator → Deduplicator → Reconciler →
//! Committer, strictly forward. Everything is rebuilt from scratch each run;
//! the remote snapshot is fetched fresh and never updated in place, so a run
//! killed mid-commit just leaves work for the next one to reconcile.

use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::aggregate::collect_links;
use crate::commit::{Committer, ItemResult, PlaylistClient};
use crate::dedup::dedup_links;
use crate::reconcile::reconcile;
use crate::report::{self, RunSummary};
use crate::source::{MessageSource, ParseMode};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: Option<ParseMode>,
    /// Stop after reconciliation; report what would be added, write nothing.
    pub dry_run: bool,
    /// Where to persist the deduplicated link records, if anywhere.
    pub metadata_out: Option<PathBuf>,
}

pub async fn run_sync<S, C>(
    source: &S,
    client: &C,
    excluded: &HashSet<String>,
    options: &RunOptions,
) -> Result<(RunSummary, Vec<ItemResult>)>
where
    S: MessageSource + ?Sized,
    C: PlaylistClient,
{
    let mode = options.mode.unwrap_or(ParseMode::Lenient);

    let messages = source.read_messages(mode).await?;
    tracing::info!(source = source.name(), count = messages.len(), "read messages");

    let links = collect_links(&messages);
    let (unique, dedup_stats) = dedup_links(&links, source.key_policy());

    let mut summary = RunSummary {
        source: source.name().to_string(),
        messages: messages.len(),
        dedup: dedup_stats,
        ..Default::default()
    };

    if let Some(path) = &options.metadata_out {
        report::write_link_metadata(path, &unique)?;
    }

    let local_ids: Vec<String> = unique.into_iter().map(|r| r.identifier).collect();

    // Fetching the snapshot is the one remote failure that aborts the run.
    let remote = client
        .list_identifiers()
        .await
        .map_err(|e| anyhow!("fetching playlist contents: {e}"))?;

    let reconciled = reconcile(&local_ids, &remote, excluded);
    report::apply_reconcile(&mut summary, &reconciled);

    if options.dry_run {
        tracing::info!(would_add = reconciled.to_add.len(), "dry run, not committing");
        return Ok((summary, Vec::new()));
    }
    if reconciled.is_noop() {
        tracing::info!("nothing to add");
        return Ok((summary, Vec::new()));
    }

    let committer = Committer::new(client, excluded);
    let (results, commit_stats) = committer.commit_all(&reconciled.to_add).await;
    summary.commit = commit_stats;

    Ok((summary, results))
}
