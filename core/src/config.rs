use crate::error::{Error, Result};
use crate::rank::DEFAULT_TOP_K;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Candidates kept by the ranker before dietary filtering.
    pub top_k: usize,
    /// Directory holding `<category>/<filename>` images.
    pub image_root: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K, image_root: PathBuf::from("./dataset/food-101/images") }
    }
}

impl EngineConfig {
    /// Defaults overridden by `RECIPE_TOP_K` and `RECIPE_IMAGE_ROOT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(val) = lookup("RECIPE_TOP_K") {
            config.top_k = val
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid RECIPE_TOP_K value {val:?}")))?;
        }
        if let Some(val) = lookup("RECIPE_IMAGE_ROOT") {
            config.image_root = PathBuf::from(val);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".into()));
        }
        Ok(())
    }
}
