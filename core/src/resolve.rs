use crate::rank::RankedCandidate;
use crate::recipe::{DietaryTag, RecipeRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Image for a result: a verified `(category, filename)` pair under the image
/// root, or the default image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedImage {
    Dataset { category: String, filename: String },
    Default,
}

impl ResolvedImage {
    /// Web path for this image given the dataset URL prefix and default URL.
    pub fn url(&self, prefix: &str, default_url: &str) -> String {
        match self {
            ResolvedImage::Dataset { category, filename } => {
                format!("{}/{}/{}", prefix.trim_end_matches('/'), category, filename)
            }
            ResolvedImage::Default => default_url.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedResult {
    pub title: String,
    pub image: ResolvedImage,
    pub ingredients: String,
    pub dietary_tag: DietaryTag,
}

/// Outcome of one retrieval; `NoMatches` is the explicit empty signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    Matches(Vec<ResolvedResult>),
    NoMatches,
}

impl Retrieval {
    pub fn results(&self) -> &[ResolvedResult] {
        match self {
            Retrieval::Matches(results) => results,
            Retrieval::NoMatches => &[],
        }
    }

    pub fn is_empty(&self) -> bool { matches!(self, Retrieval::NoMatches) }
}

/// Whether a path component is safe to join under the image root.
pub fn is_safe_component(component: &str) -> bool {
    !component.is_empty()
        && component != "."
        && component != ".."
        && component.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Split an image reference into its last two path components. References
/// containing a `..` component anywhere are refused.
pub fn split_reference(reference: &str) -> Option<(String, String)> {
    let normalized = reference.replace('\\', "/");
    if normalized.split('/').any(|p| p == "..") {
        return None;
    }
    let mut parts = normalized.split('/').filter(|p| !p.is_empty()).rev();
    let filename = parts.next()?;
    let category = parts.next()?;
    if is_safe_component(category) && is_safe_component(filename) {
        Some((category.to_string(), filename.to_string()))
    } else {
        None
    }
}

/// Existence checks against the on-disk image dataset.
#[derive(Debug, Clone)]
pub struct ImageLibrary {
    root: PathBuf,
}

impl ImageLibrary {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Local path of a `(category, filename)` pair, if both parts are safe.
    pub fn path_of(&self, category: &str, filename: &str) -> Option<PathBuf> {
        if is_safe_component(category) && is_safe_component(filename) {
            Some(self.root.join(category).join(filename))
        } else {
            None
        }
    }

    /// A metadata error counts as missing.
    pub fn contains(&self, category: &str, filename: &str) -> bool {
        self.path_of(category, filename)
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    pub fn resolve(&self, reference: Option<&str>) -> ResolvedImage {
        let Some(reference) = reference else {
            return ResolvedImage::Default;
        };
        match split_reference(reference) {
            Some((category, filename)) if self.contains(&category, &filename) => {
                ResolvedImage::Dataset { category, filename }
            }
            _ => {
                tracing::warn!(reference, "image unresolved, using default image");
                ResolvedImage::Default
            }
        }
    }
}

/// Apply the dietary filter to ranked candidates and resolve each survivor,
/// keeping ranked order.
pub fn resolve_candidates(
    candidates: &[RankedCandidate],
    corpus: &[RecipeRecord],
    diet: &DietaryTag,
    images: &ImageLibrary,
) -> Retrieval {
    let mut results = Vec::with_capacity(candidates.len());
    for cand in candidates {
        let Some(rec) = corpus.get(cand.corpus_index) else { continue };
        if !diet.admits(&rec.dietary_tag) {
            tracing::debug!(title = %rec.title, tag = %rec.dietary_tag, filter = %diet, "dropping candidate on dietary mismatch");
            continue;
        }
        results.push(ResolvedResult {
            title: rec.title.clone(),
            image: images.resolve(rec.image_reference.as_deref()),
            ingredients: rec.ingredients.clone(),
            dietary_tag: rec.dietary_tag.clone(),
        });
    }
    if results.is_empty() { Retrieval::NoMatches } else { Retrieval::Matches(results) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reference_keeps_last_two_components() {
        assert_eq!(
            split_reference("/dataset/food-101/images/apple_pie/1005649.jpg"),
            Some(("apple_pie".into(), "1005649.jpg".into()))
        );
        assert_eq!(
            split_reference(r"images\ramen\12.jpg"),
            Some(("ramen".into(), "12.jpg".into()))
        );
    }

    #[test]
    fn unsafe_references_are_refused() {
        assert_eq!(split_reference("../../etc/passwd"), None);
        assert_eq!(split_reference("images/../secret"), None);
        assert_eq!(split_reference("lonely.jpg"), None);
        assert_eq!(split_reference("a/b c.jpg"), None);
    }

    #[test]
    fn existing_image_resolves_to_dataset_pair() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pasta")).unwrap();
        fs::write(dir.path().join("pasta/1.jpg"), b"jpg").unwrap();
        let lib = ImageLibrary::new(dir.path());
        assert_eq!(
            lib.resolve(Some("/dataset/food-101/images/pasta/1.jpg")),
            ResolvedImage::Dataset { category: "pasta".into(), filename: "1.jpg".into() }
        );
        assert_eq!(lib.resolve(Some("/dataset/food-101/images/pasta/2.jpg")), ResolvedImage::Default);
        assert_eq!(lib.resolve(None), ResolvedImage::Default);
    }

    #[test]
    fn directories_are_not_images() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pasta/1.jpg")).unwrap();
        assert!(!ImageLibrary::new(dir.path()).contains("pasta", "1.jpg"));
    }

    #[test]
    fn image_urls() {
        let img = ResolvedImage::Dataset { category: "pasta".into(), filename: "1.jpg".into() };
        assert_eq!(img.url("/images/", "/static/images/default.jpg"), "/images/pasta/1.jpg");
        assert_eq!(ResolvedImage::Default.url("/images", "/static/images/default.jpg"), "/static/images/default.jpg");
    }

    #[test]
    fn filter_drops_without_replacement() {
        let corpus = vec![
            RecipeRecord::new("pasta", "tomato").with_dietary(DietaryTag::Vegetarian),
            RecipeRecord::new("curry", "chicken").with_dietary(DietaryTag::NonVeg),
        ];
        let cands = vec![
            RankedCandidate { corpus_index: 0, score: 0.9 },
            RankedCandidate { corpus_index: 1, score: 0.1 },
        ];
        let lib = ImageLibrary::new("/nonexistent");
        let out = resolve_candidates(&cands, &corpus, &DietaryTag::NonVeg, &lib);
        assert_eq!(out.results().len(), 1);
        assert_eq!(out.results()[0].title, "curry");
        let none = resolve_candidates(&cands, &corpus, &DietaryTag::GlutenFree, &lib);
        assert_eq!(none, Retrieval::NoMatches);
    }
}
