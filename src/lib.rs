// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod commit;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod source;
pub mod types;
pub mod youtube;

// ---- Re-exports for stable public API ----
pub use crate::commit::{CommitStats, Committer, ItemResult, Outcome, PlaylistClient};
pub use crate::dedup::KeyPolicy;
pub use crate::error::{ParseError, RemoteError};
pub use crate::pipeline::{run_sync, RunOptions};
pub use crate::source::{MessageSource, ParseMode};
pub use crate::types::{LinkRecord, NormalizedMessage, VideoInfo};
