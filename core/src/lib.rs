pub mod audit;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod persist;
pub mod rank;
pub mod recipe;
pub mod resolve;
pub mod tokenizer;

pub use audit::{audit_corpus, CorpusReport};
pub use config::EngineConfig;
pub use engine::{EngineHandle, Lookup, RecipeEngine, NO_INSTRUCTIONS, RECIPE_NOT_FOUND};
pub use error::{Error, Result};
pub use index::{IdfMode, QueryVector, SparseVector, TermId, TermWeightingIndex, Weighting};
pub use rank::{RankedCandidate, DEFAULT_TOP_K};
pub use recipe::{DietaryTag, Instructions, RecipeRecord};
pub use resolve::{ImageLibrary, ResolvedImage, ResolvedResult, Retrieval};
