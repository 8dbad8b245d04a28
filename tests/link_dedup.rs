// tests/link_dedup.rs
use playlist_courier::dedup::{dedup_links, KeyPolicy};
use playlist_courier::LinkRecord;

fn rec(id: &str, ts: i64, sender: Option<&str>) -> LinkRecord {
    LinkRecord {
        identifier: id.to_string(),
        timestamp_ms: ts,
        sender_id: sender.map(str::to_string),
    }
}

#[test]
fn same_sender_repeats_collapse_to_earliest() {
    // identifier+sender policy: timestamps 100 and 200 collapse to 100
    let input = vec![rec("abc12345678", 100, Some("+431")), rec("abc12345678", 200, Some("+431"))];
    let (kept, stats) = dedup_links(&input, KeyPolicy::IdentifierSender);
    assert_eq!(kept, vec![rec("abc12345678", 100, Some("+431"))]);
    assert_eq!(stats.input, 2);
    assert_eq!(stats.kept, 1);
    assert_eq!(stats.removed, 1);
}

#[test]
fn time_in_key_treats_reshares_as_distinct_events() {
    let input = vec![rec("abc12345678", 100, Some("+431")), rec("abc12345678", 200, Some("+431"))];
    let (kept, _) = dedup_links(&input, KeyPolicy::IdentifierSenderTime);
    assert_eq!(kept.len(), 2);
}

#[test]
fn earliest_can_arrive_last_without_reordering_keys() {
    let input = vec![
        rec("b", 900, None),
        rec("a", 500, None),
        rec("b", 100, None),
    ];
    let (kept, _) = dedup_links(&input, KeyPolicy::IdentifierSender);
    // key order is first-seen, but b's survivor carries the minimum timestamp
    assert_eq!(kept, vec![rec("b", 100, None), rec("a", 500, None)]);
}

#[test]
fn dedup_twice_changes_nothing() {
    let input = vec![
        rec("a", 3, Some("x")),
        rec("a", 1, Some("x")),
        rec("a", 1, Some("y")),
        rec("c", 9, None),
    ];
    for policy in [KeyPolicy::IdentifierSender, KeyPolicy::IdentifierSenderTime] {
        let (once, _) = dedup_links(&input, policy);
        let (twice, stats) = dedup_links(&once, policy);
        assert_eq!(once, twice);
        assert_eq!(stats.removed, 0);
    }
}
