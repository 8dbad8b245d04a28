// src/commit.rs
//! Applies the reconciled additions against the remote playlist.
//!
//! Strictly sequential: one lookup/insert in flight at a time, with a fixed
//! pause between items. The target API's rate budget assumes this pacing;
//! parallel dispatch is disallowed. Per-item failures become result records
//! and never abort the loop — every candidate gets attempted.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::types::VideoInfo;

/// Pause between consecutive remote items.
pub const INTER_CALL_DELAY: Duration = Duration::from_millis(1000);

/// Capability surface of the remote playlist, as the pipeline sees it.
#[async_trait]
pub trait PlaylistClient {
    /// Snapshot of the video ids currently on the playlist.
    async fn list_identifiers(&self) -> Result<HashSet<String>, RemoteError>;
    /// `None` when the id is unknown to the remote catalog.
    async fn lookup(&self, identifier: &str) -> Result<Option<VideoInfo>, RemoteError>;
    async fn insert(&self, identifier: &str) -> Result<VideoInfo, RemoteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added { title: String },
    SkippedExcluded,
    SkippedNotFound,
    SkippedDuplicate,
    ErrorPermission(String),
    ErrorOther(String),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::ErrorPermission(_) | Outcome::ErrorOther(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub identifier: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitStats {
    pub attempted: usize,
    pub added: usize,
    pub skipped_excluded: usize,
    pub skipped_not_found: usize,
    pub skipped_duplicate: usize,
    pub errors_permission: usize,
    pub errors_other: usize,
}

impl CommitStats {
    pub fn skipped(&self) -> usize {
        self.skipped_excluded + self.skipped_not_found + self.skipped_duplicate
    }

    /// Skips are not failures; only `error:*` outcomes fail the run.
    pub fn has_errors(&self) -> bool {
        self.errors_permission > 0 || self.errors_other > 0
    }

    fn record(&mut self, outcome: &Outcome) {
        self.attempted += 1;
        match outcome {
            Outcome::Added { .. } => self.added += 1,
            Outcome::SkippedExcluded => self.skipped_excluded += 1,
            Outcome::SkippedNotFound => self.skipped_not_found += 1,
            Outcome::SkippedDuplicate => self.skipped_duplicate += 1,
            Outcome::ErrorPermission(_) => self.errors_permission += 1,
            Outcome::ErrorOther(_) => self.errors_other += 1,
        }
    }
}

pub struct Committer<'a, C: PlaylistClient> {
    client: &'a C,
    excluded: &'a HashSet<String>,
    delay: Duration,
}

impl<'a, C: PlaylistClient> Committer<'a, C> {
    pub fn new(client: &'a C, excluded: &'a HashSet<String>) -> Self {
        Self {
            client,
            excluded,
            delay: INTER_CALL_DELAY,
        }
    }

    /// Test hook; production code keeps the fixed delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Processes every identifier in order, pausing between items (never after
    /// the last). Callers must not invoke this with an empty reconcile result;
    /// the no-op report belongs to the caller.
    pub async fn commit_all(&self, identifiers: &[String]) -> (Vec<ItemResult>, CommitStats) {
        let mut results = Vec::with_capacity(identifiers.len());
        let mut stats = CommitStats::default();

        for (i, id) in identifiers.iter().enumerate() {
            let outcome = self.commit_one(id).await;
            match &outcome {
                Outcome::Added { title } => {
                    tracing::info!(id = %id, title = %title, "added to playlist")
                }
                Outcome::ErrorPermission(msg) | Outcome::ErrorOther(msg) => {
                    tracing::error!(id = %id, error = %msg, "insert failed")
                }
                other => tracing::info!(id = %id, outcome = ?other, "skipped"),
            }
            stats.record(&outcome);
            results.push(ItemResult {
                identifier: id.clone(),
                outcome,
            });

            if i + 1 < identifiers.len() {
                tokio::time::sleep(self.delay).await;
            }
        }

        (results, stats)
    }

    async fn commit_one(&self, id: &str) -> Outcome {
        // Defensive re-check; reconciliation already filtered these.
        if self.excluded.contains(id) {
            return Outcome::SkippedExcluded;
        }

        match self.client.lookup(id).await {
            Ok(Some(_)) => {}
            Ok(None) | Err(RemoteError::NotFound) => return Outcome::SkippedNotFound,
            Err(RemoteError::Permission(msg)) => return Outcome::ErrorPermission(msg),
            Err(e) => return Outcome::ErrorOther(e.to_string()),
        }

        match self.client.insert(id).await {
            Ok(info) => Outcome::Added { title: info.title },
            Err(RemoteError::Conflict) => Outcome::SkippedDuplicate,
            Err(RemoteError::Permission(msg)) => Outcome::ErrorPermission(msg),
            Err(e) => Outcome::ErrorOther(e.to_string()),
        }
    }
}
