use crate::recipe::{Instructions, RecipeRecord};
use crate::resolve::{split_reference, ImageLibrary};
use serde::Serialize;

/// Data-quality summary of a corpus against an image dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusReport {
    pub rows: usize,
    /// Titles whose instructions are unavailable, in corpus order.
    pub missing_instructions: Vec<String>,
    /// Rows whose image reference resolves to the default image. Counted
    /// without the per-row warning `ImageLibrary::resolve` logs.
    pub default_images: usize,
}

impl CorpusReport {
    pub fn is_clean(&self) -> bool {
        self.missing_instructions.is_empty() && self.default_images == 0
    }
}

pub fn audit_corpus(corpus: &[RecipeRecord], images: &ImageLibrary) -> CorpusReport {
    let missing_instructions = corpus
        .iter()
        .filter(|r| r.instructions == Instructions::Unavailable)
        .map(|r| r.title.clone())
        .collect();
    let default_images = corpus
        .iter()
        .filter(|r| match r.image_reference.as_deref().and_then(split_reference) {
            Some((category, filename)) => !images.contains(&category, &filename),
            None => true,
        })
        .count();
    CorpusReport { rows: corpus.len(), missing_instructions, default_images }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reports_missing_instructions_and_default_images() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pasta")).unwrap();
        fs::write(dir.path().join("pasta/1.jpg"), b"jpg").unwrap();
        let corpus = vec![
            RecipeRecord::new("pasta", "tomato").with_steps(["Boil"]).with_image("images/pasta/1.jpg"),
            RecipeRecord::new("ramen", "noodles").with_image("images/ramen/9.jpg"),
            RecipeRecord::new("salad", "lettuce"),
        ];
        let report = audit_corpus(&corpus, &ImageLibrary::new(dir.path()));
        assert_eq!(report.rows, 3);
        assert_eq!(report.missing_instructions, vec!["ramen", "salad"]);
        assert_eq!(report.default_images, 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn complete_corpus_is_clean() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("soup")).unwrap();
        fs::write(dir.path().join("soup/2.jpg"), b"jpg").unwrap();
        let corpus = vec![RecipeRecord::new("soup", "leek").with_steps(["Simmer"]).with_image("soup/2.jpg")];
        assert!(audit_corpus(&corpus, &ImageLibrary::new(dir.path())).is_clean());
    }
}
