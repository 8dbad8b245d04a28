// tests/reconcile_sets.rs
use playlist_courier::reconcile::reconcile;
use std::collections::HashSet;

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn set(v: &[&str]) -> HashSet<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn new_videos_are_the_set_difference() {
    let out = reconcile(&ids(&["a", "b", "c"]), &set(&["b"]), &set(&["c"]));
    assert_eq!(out.to_add, ids(&["a"]));
    assert_eq!(out.already_present, 1);
    assert_eq!(out.excluded, 1);
}

#[test]
fn output_is_disjoint_from_both_sets_and_order_preserving() {
    let local = ids(&["e", "a", "d", "b", "c", "f"]);
    let remote = set(&["a", "c"]);
    let excluded = set(&["d"]);

    let out = reconcile(&local, &remote, &excluded);

    for id in &out.to_add {
        assert!(!remote.contains(id));
        assert!(!excluded.contains(id));
    }
    // relative order of survivors must match the local sequence
    assert_eq!(out.to_add, ids(&["e", "b", "f"]));
}

#[test]
fn empty_local_means_noop() {
    let out = reconcile(&[], &set(&["a"]), &set(&["b"]));
    assert!(out.is_noop());
    assert_eq!(out.already_present, 0);
    assert_eq!(out.excluded, 0);
}

#[test]
fn repeats_in_local_appear_at_most_once() {
    let out = reconcile(&ids(&["a", "a", "b", "a"]), &set(&[]), &set(&[]));
    assert_eq!(out.to_add, ids(&["a", "b"]));
}
