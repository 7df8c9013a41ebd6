//! Reciprocal Rank Fusion: fused score = Σ 1/(k + rank) over every list the
//! chunk appears in, ranks 1-based.
//!
//! RRF needs no score normalization between heterogeneous scales (cosine
//! similarity vs. BM25) and rewards chunks both retrieval methods agree on.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Fuses ranked id lists into `(chunk_id, fused_score)` pairs, descending.
///
/// Output is deduplicated: each id appears once with the summed contribution
/// of all lists containing it. Ties are broken by first-seen order across the
/// input lists (stable sort).
pub fn fuse(ranked_lists: &[Vec<String>], k: f64) -> Vec<(String, f64)> {
    let mut scores: HashMap<&str, f64> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for list in ranked_lists {
        for (idx, chunk_id) in list.iter().enumerate() {
            let contribution = 1.0 / (k + (idx + 1) as f64);
            match scores.entry(chunk_id.as_str()) {
                Entry::Occupied(mut entry) => *entry.get_mut() += contribution,
                Entry::Vacant(entry) => {
                    entry.insert(contribution);
                    first_seen.push(chunk_id.as_str());
                }
            }
        }
    }

    let mut fused: Vec<(String, f64)> = first_seen
        .into_iter()
        .map(|id| (id.to_string(), scores[id]))
        .collect();

    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    fused
}
