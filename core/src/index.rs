use crate::error::{Error, Result};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TermId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdfMode {
    /// ln((1 + N) / (1 + df)) + 1; every term keeps a positive weight.
    #[default]
    Smooth,
    /// ln(N / df); terms present in every row weigh zero.
    Plain,
}

/// Weighting parameters. Frozen at fit time and persisted with the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Weighting {
    /// Use 1 + ln(tf) instead of the raw term count.
    pub sublinear_tf: bool,
    pub idf: IdfMode,
}

impl Weighting {
    fn tf(&self, count: u32) -> f32 {
        if count == 0 {
            0.0
        } else if self.sublinear_tf {
            1.0 + (count as f32).ln()
        } else {
            count as f32
        }
    }

    fn idf(&self, num_docs: u32, df: u32) -> f32 {
        let n = num_docs as f32;
        let df = df.max(1) as f32;
        match self.idf {
            IdfMode::Smooth => ((1.0 + n) / (1.0 + df)).ln() + 1.0,
            IdfMode::Plain => (n / df).ln(),
        }
    }
}

/// Sparse weight vector over the index vocabulary, sorted by term id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(TermId, f32)>,
}

/// A query mapped into the index vocabulary space.
pub type QueryVector = SparseVector;

impl SparseVector {
    fn from_weights(weights: HashMap<TermId, f32>) -> Self {
        let mut entries: Vec<(TermId, f32)> = weights.into_iter().filter(|(_, w)| *w != 0.0).collect();
        entries.sort_by_key(|(tid, _)| *tid);
        Self { entries }
    }

    pub fn entries(&self) -> &[(TermId, f32)] { &self.entries }

    pub fn is_zero(&self) -> bool { self.entries.is_empty() }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0f32);
        while i < self.entries.len() && j < other.entries.len() {
            let (ta, wa) = self.entries[i];
            let (tb, wb) = other.entries[j];
            if ta == tb {
                sum += wa * wb;
                i += 1;
                j += 1;
            } else if ta < tb {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm == 0.0 { return; }
        for (_, w) in self.entries.iter_mut() { *w /= norm; }
    }
}

/// Fixed vocabulary plus one normalized weight vector per corpus row, in
/// corpus order. Never refit in place: a corpus change builds a new index.
#[derive(Debug, Clone, PartialEq)]
pub struct TermWeightingIndex {
    vocabulary: HashMap<String, TermId>,
    idf: Vec<f32>,
    weighting: Weighting,
    rows: Vec<SparseVector>,
}

impl TermWeightingIndex {
    /// Fit over the complete ordered corpus in one pass.
    pub fn fit<S: AsRef<str>>(docs: &[S], weighting: Weighting) -> Result<Self> {
        if docs.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let mut vocabulary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut row_counts: Vec<HashMap<TermId, u32>> = Vec::with_capacity(docs.len());

        for doc in docs {
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for term in tokenize(doc.as_ref()) {
                let next_id = vocabulary.len() as TermId;
                let tid = *vocabulary.entry(term).or_insert(next_id);
                if tid as usize == df.len() { df.push(0); }
                let count = tf_counts.entry(tid).or_insert(0);
                if *count == 0 { df[tid as usize] += 1; }
                *count += 1;
            }
            row_counts.push(tf_counts);
        }

        if vocabulary.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let num_docs = docs.len() as u32;
        let idf: Vec<f32> = df.iter().map(|&d| weighting.idf(num_docs, d)).collect();
        let rows: Vec<SparseVector> = row_counts
            .into_iter()
            .map(|counts| weigh(&counts, &idf, weighting))
            .collect();

        tracing::info!(num_docs, num_terms = vocabulary.len(), ?weighting, "fitted term-weighting index");
        Ok(Self { vocabulary, idf, weighting, rows })
    }

    /// Reassemble a persisted index, checking that its parts agree.
    pub fn from_parts(
        vocabulary: HashMap<String, TermId>,
        idf: Vec<f32>,
        weighting: Weighting,
        rows: Vec<SparseVector>,
    ) -> Result<Self> {
        if vocabulary.is_empty() || rows.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        if idf.len() != vocabulary.len() {
            return Err(Error::CorruptIndex(format!(
                "vocabulary has {} terms but {} idf weights",
                vocabulary.len(),
                idf.len()
            )));
        }
        let dims = idf.len() as TermId;
        if vocabulary.values().any(|&tid| tid >= dims) {
            return Err(Error::CorruptIndex("term id outside vocabulary".into()));
        }
        for (row, vec) in rows.iter().enumerate() {
            let sorted = vec.entries.windows(2).all(|w| w[0].0 < w[1].0);
            if !sorted || vec.entries.iter().any(|(tid, _)| *tid >= dims) {
                return Err(Error::CorruptIndex(format!("row {row} has invalid term ids")));
            }
        }
        Ok(Self { vocabulary, idf, weighting, rows })
    }

    /// Map a free-text query into the index space. Unknown terms are dropped;
    /// an empty or all-unknown query yields the zero vector.
    pub fn vectorize(&self, query: &str) -> QueryVector {
        let mut counts: HashMap<TermId, u32> = HashMap::new();
        for term in tokenize(query) {
            if let Some(&tid) = self.vocabulary.get(&term) {
                *counts.entry(tid).or_insert(0) += 1;
            }
        }
        weigh(&counts, &self.idf, self.weighting)
    }

    pub fn vocabulary(&self) -> &HashMap<String, TermId> { &self.vocabulary }
    pub fn idf(&self) -> &[f32] { &self.idf }
    pub fn weighting(&self) -> Weighting { self.weighting }
    pub fn rows(&self) -> &[SparseVector] { &self.rows }
    pub fn num_docs(&self) -> usize { self.rows.len() }
    pub fn num_terms(&self) -> usize { self.vocabulary.len() }
}

fn weigh(counts: &HashMap<TermId, u32>, idf: &[f32], weighting: Weighting) -> SparseVector {
    let weights: HashMap<TermId, f32> = counts
        .iter()
        .map(|(&tid, &count)| (tid, weighting.tf(count) * idf[tid as usize]))
        .collect();
    let mut vec = SparseVector::from_weights(weights);
    vec.normalize();
    vec
}
