// src/aggregate.rs
use crate::extract::extract_links;
use crate::types::{LinkRecord, NormalizedMessage};

/// Flat-map messages into link records: message order preserved, within a
/// message pattern order then match order. No filtering, no dedup — this stage
/// is associative, so batched sources can concatenate per-batch outputs.
pub fn collect_links(messages: &[NormalizedMessage]) -> Vec<LinkRecord> {
    let mut out = Vec::new();
    for msg in messages {
        for m in extract_links(&msg.text) {
            out.push(LinkRecord {
                identifier: m.identifier,
                timestamp_ms: msg.timestamp_ms,
                sender_id: msg.sender_id.clone(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str, ts: i64, sender: Option<&str>) -> NormalizedMessage {
        NormalizedMessage {
            text: text.to_string(),
            timestamp_ms: ts,
            sender_id: sender.map(str::to_string),
        }
    }

    #[test]
    fn one_record_per_match_with_message_metadata() {
        let msgs = vec![
            msg("https://youtu.be/abc12345678", 100, Some("+4367761413")),
            msg("no link", 200, None),
            msg(
                "https://youtu.be/AAAAAAAAAAA and https://youtu.be/BBBBBBBBBBB",
                300,
                None,
            ),
        ];
        let out = collect_links(&msgs);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].identifier, "abc12345678");
        assert_eq!(out[0].timestamp_ms, 100);
        assert_eq!(out[0].sender_id.as_deref(), Some("+4367761413"));
        assert_eq!(out[1].identifier, "AAAAAAAAAAA");
        assert_eq!(out[2].identifier, "BBBBBBBBBBB");
        assert_eq!(out[2].timestamp_ms, 300);
    }

    #[test]
    fn concatenation_is_associative() {
        let a = vec![msg("https://youtu.be/abc12345678", 1, None)];
        let b = vec![
            msg("plain", 2, None),
            msg("https://youtu.be/xyz98765432", 3, Some("p")),
        ];
        let whole: Vec<_> = a.iter().chain(b.iter()).cloned().collect();

        let mut parts = collect_links(&a);
        parts.extend(collect_links(&b));
        assert_eq!(parts, collect_links(&whole));
    }
}
