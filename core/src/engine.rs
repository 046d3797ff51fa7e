use crate::audit::{audit_corpus, CorpusReport};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::index::{TermWeightingIndex, Weighting};
use crate::persist::{load_bundle, IndexPaths};
use crate::rank::{rank_top_k, RankedCandidate};
use crate::recipe::{normalize_title, DietaryTag, Instructions, RecipeRecord};
use crate::resolve::{resolve_candidates, ImageLibrary, Retrieval};
use parking_lot::RwLock;
use std::sync::Arc;

/// Returned by `lookup_instructions` when no title matches.
pub const RECIPE_NOT_FOUND: &str = "No instructions available for this recipe.";
/// Returned by `lookup_instructions` when the recipe has no stored steps.
pub const NO_INSTRUCTIONS: &str = "No instructions available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

/// Corpus, fitted index and image library. Immutable once built; share it
/// through an [`EngineHandle`].
#[derive(Debug)]
pub struct RecipeEngine {
    corpus: Vec<RecipeRecord>,
    index: TermWeightingIndex,
    images: ImageLibrary,
    top_k: usize,
}

impl RecipeEngine {
    /// Fit a fresh index over `corpus`.
    pub fn build(corpus: Vec<RecipeRecord>, weighting: Weighting, config: &EngineConfig) -> Result<Self> {
        let texts: Vec<&str> = corpus.iter().map(|r| r.ingredients.as_str()).collect();
        let index = TermWeightingIndex::fit(&texts, weighting)?;
        Self::from_parts(corpus, index, config)
    }

    pub fn from_parts(corpus: Vec<RecipeRecord>, index: TermWeightingIndex, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        if corpus.len() != index.num_docs() {
            return Err(Error::CorruptIndex(format!(
                "corpus has {} rows but index has {}",
                corpus.len(),
                index.num_docs()
            )));
        }
        Ok(Self { corpus, index, images: ImageLibrary::new(&config.image_root), top_k: config.top_k })
    }

    /// Load a persisted bundle.
    pub fn open(paths: &IndexPaths, config: &EngineConfig) -> Result<Self> {
        let (corpus, index, _meta) = load_bundle(paths)?;
        Self::from_parts(corpus, index, config)
    }

    /// Top-K candidates by textual similarity alone.
    pub fn rank(&self, query: &str) -> Vec<RankedCandidate> {
        let qv = self.index.vectorize(query);
        if qv.is_zero() {
            tracing::warn!(query, "degraded query: no recognized ingredient terms");
        }
        let ranked = rank_top_k(&self.index, &qv, self.top_k);
        tracing::debug!(query, ?ranked, "ranked candidates");
        ranked
    }

    /// Rank, then filter by `diet` (blank or "all" keeps everything) and
    /// resolve images. The filter never widens the candidate pool.
    pub fn retrieve(&self, query: &str, diet: &str) -> Retrieval {
        let filter = DietaryTag::parse(diet);
        let ranked = self.rank(query);
        let retrieval = resolve_candidates(&ranked, &self.corpus, &filter, &self.images);
        if retrieval.is_empty() {
            tracing::info!(query, diet = %filter, "no matching recipes");
        }
        retrieval
    }

    /// First record whose normalized title matches.
    pub fn find_recipe(&self, title: &str) -> Lookup<&RecipeRecord> {
        let wanted = normalize_title(title);
        match self.corpus.iter().find(|r| normalize_title(&r.title) == wanted) {
            Some(rec) => Lookup::Found(rec),
            None => Lookup::NotFound,
        }
    }

    /// Cooking steps for `title`, or a single-element sentinel.
    pub fn lookup_instructions(&self, title: &str) -> Vec<String> {
        match self.find_recipe(title) {
            Lookup::Found(RecipeRecord { instructions: Instructions::Steps(steps), .. }) => steps.clone(),
            Lookup::Found(_) => vec![NO_INSTRUCTIONS.to_string()],
            Lookup::NotFound => {
                tracing::info!(title, "no recipe found for instructions lookup");
                vec![RECIPE_NOT_FOUND.to_string()]
            }
        }
    }

    /// Rows without instructions and rows falling back to the default image.
    pub fn audit(&self) -> CorpusReport {
        audit_corpus(&self.corpus, &self.images)
    }

    pub fn corpus(&self) -> &[RecipeRecord] { &self.corpus }
    pub fn index(&self) -> &TermWeightingIndex { &self.index }
    pub fn images(&self) -> &ImageLibrary { &self.images }
    pub fn top_k(&self) -> usize { self.top_k }
}

/// Read-only shared handle. Readers take a snapshot `Arc`; `replace` swaps in
/// a fully built engine without touching the one readers hold.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    inner: Arc<RwLock<Arc<RecipeEngine>>>,
}

impl EngineHandle {
    pub fn new(engine: RecipeEngine) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(engine))) }
    }

    pub fn current(&self) -> Arc<RecipeEngine> {
        self.inner.read().clone()
    }

    /// Install `engine` and return the previous one.
    pub fn replace(&self, engine: RecipeEngine) -> Arc<RecipeEngine> {
        let next = Arc::new(engine);
        std::mem::replace(&mut *self.inner.write(), next)
    }
}
