use crate::index::{QueryVector, SparseVector, TermWeightingIndex};
use serde::Serialize;

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub corpus_index: usize,
    pub score: f32,
}

/// Cosine similarity, defined as 0 when either vector has zero magnitude.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f32 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(0.0, 1.0)
}

/// Score every row against `query` and keep the best `k`. Equal scores keep
/// corpus order.
pub fn rank_top_k(index: &TermWeightingIndex, query: &QueryVector, k: usize) -> Vec<RankedCandidate> {
    let mut scored: Vec<RankedCandidate> = index
        .rows()
        .iter()
        .enumerate()
        .map(|(corpus_index, row)| RankedCandidate { corpus_index, score: cosine(query, row) })
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    scored
}
