// src/reconcile.rs
use std::collections::HashSet;

/// Identifiers to add, plus why the rest were dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcileResult {
    /// Subsequence of the local input: not on the playlist, not excluded.
    pub to_add: Vec<String>,
    pub already_present: usize,
    pub excluded: usize,
}

impl ReconcileResult {
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty()
    }
}

/// Set-difference of the local identifiers against the remote playlist
/// snapshot and the exclusion list, preserving local order.
///
/// Upstream dedup already guarantees unique identifiers in practice, but the
/// input is re-deduplicated here anyway so each identifier appears at most
/// once in the output.
pub fn reconcile(
    local: &[String],
    remote: &HashSet<String>,
    excluded: &HashSet<String>,
) -> ReconcileResult {
    let mut result = ReconcileResult::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(local.len());

    for id in local {
        if !seen.insert(id.as_str()) {
            continue;
        }
        if excluded.contains(id) {
            result.excluded += 1;
        } else if remote.contains(id) {
            result.already_present += 1;
        } else {
            result.to_add.push(id.clone());
        }
    }

    tracing::info!(
        candidates = local.len(),
        to_add = result.to_add.len(),
        already_present = result.already_present,
        excluded = result.excluded,
        "reconciled against remote playlist"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn set(v: &[&str]) -> HashSet<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn removes_remote_and_excluded() {
        let out = reconcile(&ids(&["a", "b", "c"]), &set(&["b"]), &set(&["c"]));
        assert_eq!(out.to_add, ids(&["a"]));
        assert_eq!(out.already_present, 1);
        assert_eq!(out.excluded, 1);
    }

    #[test]
    fn preserves_local_order_and_dedupes_defensively() {
        let out = reconcile(&ids(&["c", "a", "c", "b"]), &set(&[]), &set(&[]));
        assert_eq!(out.to_add, ids(&["c", "a", "b"]));
    }

    #[test]
    fn exclusion_beats_remote_membership_in_counting() {
        let out = reconcile(&ids(&["x"]), &set(&["x"]), &set(&["x"]));
        assert!(out.is_noop());
        assert_eq!(out.excluded, 1);
        assert_eq!(out.already_present, 0);
    }
}
