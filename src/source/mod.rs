// src/source/mod.rs
pub mod signal;
pub mod whatsapp;

use anyhow::Result;
use async_trait::async_trait;

use crate::dedup::KeyPolicy;
use crate::types::NormalizedMessage;

/// How a source reacts to an isolated malformed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Abort the batch on the first malformed record.
    Strict,
    /// Log the malformed record and continue. Already-collected messages are
    /// never discarded.
    Lenient,
}

/// A finite chat transcript, normalized into `{text, timestamp, sender}` records.
#[async_trait]
pub trait MessageSource {
    async fn read_messages(&self, mode: ParseMode) -> Result<Vec<NormalizedMessage>>;

    fn name(&self) -> &'static str;

    /// Deduplication key policy appropriate for this source's timestamp
    /// precision (see dedup module docs).
    fn key_policy(&self) -> KeyPolicy;
}
