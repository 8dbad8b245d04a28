// src/dedup.rs
//! Collapses a link stream to one record per deduplication key.
//!
//! Two key policies exist because the two chat sources disagree on timestamp
//! quality: Signal's database carries exact millisecond send times, so the
//! same video re-shared later is a distinct event and time belongs in the key.
//! The WhatsApp export only has minute granularity and re-exports can shift
//! it, so repeats from the same sender collapse to the earliest occurrence.

use std::collections::HashMap;

use crate::types::LinkRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// `identifier:sender:timestamp` — same link at a different time is a new event.
    IdentifierSenderTime,
    /// `identifier:sender` — repeats collapse, earliest timestamp survives.
    IdentifierSender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupStats {
    pub input: usize,
    pub kept: usize,
    pub removed: usize,
}

fn key_of(record: &LinkRecord, policy: KeyPolicy) -> String {
    let sender = record.sender_id.as_deref().unwrap_or("-");
    match policy {
        KeyPolicy::IdentifierSenderTime => {
            format!("{}:{}:{}", record.identifier, sender, record.timestamp_ms)
        }
        KeyPolicy::IdentifierSender => format!("{}:{}", record.identifier, sender),
    }
}

/// One survivor per distinct key, in first-seen key order.
///
/// With `IdentifierSender` the survivor is the colliding record with the
/// minimum timestamp, which requires seeing the whole input before emitting —
/// this is deliberately not a streaming one-pass filter.
pub fn dedup_links(records: &[LinkRecord], policy: KeyPolicy) -> (Vec<LinkRecord>, DedupStats) {
    let mut kept: Vec<LinkRecord> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();
    let mut removed = 0usize;

    for record in records {
        let key = key_of(record, policy);
        match slot_by_key.get(&key) {
            None => {
                slot_by_key.insert(key, kept.len());
                kept.push(record.clone());
            }
            Some(&slot) => {
                removed += 1;
                // earliest wins; first-seen position is retained either way
                if record.timestamp_ms < kept[slot].timestamp_ms {
                    kept[slot] = record.clone();
                }
            }
        }
    }

    let stats = DedupStats {
        input: records.len(),
        kept: kept.len(),
        removed,
    };
    tracing::info!(
        input = stats.input,
        kept = stats.kept,
        removed = stats.removed,
        "deduplicated link records"
    );
    (kept, stats)
}
