// src/types.rs
use serde::{Deserialize, Serialize};

/// One chat message after source-specific normalization.
///
/// `sender_id` is `None` for outgoing messages (sent by the account owner)
/// and for unattributable system messages — a policy, not a parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub text: String,
    pub timestamp_ms: i64, // epoch millis
    pub sender_id: Option<String>,
}

/// One extracted video link. A message with two links yields two records.
///
/// Serialized shape is `{identifier, timestampMs, senderId}` — field names and
/// order are load-bearing for the anonymization tooling that consumes the
/// metadata artifact; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub identifier: String,
    pub timestamp_ms: i64,
    pub sender_id: Option<String>,
}

/// Remote catalog entry as returned by lookup/insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub identifier: String,
    pub title: String,
}
