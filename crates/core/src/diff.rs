//! Diff Engine - order-preserving set difference over candidates
//!
//! Pure logic with no I/O: given the candidate sequence and the ledger's
//! membership set, keep exactly the candidates whose name is absent, in the
//! candidates' own relative order.

use std::collections::HashSet;

use crate::definitions::MigrationEntry;

/// Candidates not yet present in the ledger, preserving candidate order.
///
/// An empty result is the normal steady state, not an error.
pub fn unapplied(
    candidates: Vec<MigrationEntry>,
    applied: &HashSet<String>,
) -> Vec<MigrationEntry> {
    candidates
        .into_iter()
        .filter(|entry| !applied.contains(&entry.name))
        .collect()
}
