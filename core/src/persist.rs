use crate::corpus::corpus_digest;
use crate::error::{Error, Result};
use crate::index::{SparseVector, TermId, TermWeightingIndex, Weighting};
use crate::recipe::RecipeRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;

pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub corpus_digest: String,
    pub created_at: String,
    pub version: u32,
}

type VocabularyFile = (HashMap<String, TermId>, Vec<f32>, Weighting);

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn vocabulary(&self) -> PathBuf { self.root.join("vocabulary.bin") }
    fn rows(&self) -> PathBuf { self.root.join("rows.bin") }
    fn corpus(&self) -> PathBuf { self.root.join("corpus.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn write_bin<T: Serialize>(path: PathBuf, value: &T) -> Result<()> {
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bin<T: for<'de> Deserialize<'de>>(path: PathBuf) -> Result<T> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Persist corpus and index together. Meta is written last so a partially
/// written bundle fails validation on load.
pub fn save_bundle(paths: &IndexPaths, corpus: &[RecipeRecord], index: &TermWeightingIndex) -> Result<MetaFile> {
    if corpus.len() != index.num_docs() {
        return Err(Error::CorruptIndex(format!(
            "corpus has {} rows but index has {}",
            corpus.len(),
            index.num_docs()
        )));
    }
    create_dir_all(&paths.root)?;
    let vocab: VocabularyFile = (index.vocabulary().clone(), index.idf().to_vec(), index.weighting());
    write_bin(paths.vocabulary(), &vocab)?;
    write_bin(paths.rows(), &index.rows())?;
    write_bin(paths.corpus(), &corpus)?;
    let meta = MetaFile {
        num_docs: corpus.len() as u32,
        num_terms: index.num_terms() as u32,
        corpus_digest: corpus_digest(corpus),
        created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        version: INDEX_VERSION,
    };
    save_meta(paths, &meta)?;
    Ok(meta)
}

/// Load a bundle and refuse it unless corpus, vocabulary and rows agree with
/// the meta file.
pub fn load_bundle(paths: &IndexPaths) -> Result<(Vec<RecipeRecord>, TermWeightingIndex, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != INDEX_VERSION {
        return Err(Error::CorruptIndex(format!("unsupported index version {}", meta.version)));
    }
    let (vocabulary, idf, weighting): VocabularyFile = read_bin(paths.vocabulary())?;
    let rows: Vec<SparseVector> = read_bin(paths.rows())?;
    let corpus: Vec<RecipeRecord> = read_bin(paths.corpus())?;

    if corpus.len() != meta.num_docs as usize || rows.len() != corpus.len() {
        return Err(Error::CorruptIndex(format!(
            "meta expects {} rows, found {} corpus rows and {} vectors",
            meta.num_docs,
            corpus.len(),
            rows.len()
        )));
    }
    if vocabulary.len() != meta.num_terms as usize {
        return Err(Error::CorruptIndex(format!(
            "meta expects {} terms, found {}",
            meta.num_terms,
            vocabulary.len()
        )));
    }
    if corpus_digest(&corpus) != meta.corpus_digest {
        return Err(Error::CorruptIndex("corpus digest mismatch".into()));
    }
    let index = TermWeightingIndex::from_parts(vocabulary, idf, weighting, rows)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "loaded index bundle");
    Ok((corpus, index, meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> (Vec<RecipeRecord>, TermWeightingIndex) {
        let corpus = vec![
            RecipeRecord::new("pasta", "tomato garlic basil").with_steps(["Boil", "Toss"]),
            RecipeRecord::new("curry", "chicken onion spice"),
        ];
        let texts: Vec<&str> = corpus.iter().map(|r| r.ingredients.as_str()).collect();
        let index = TermWeightingIndex::fit(&texts, Weighting::default()).unwrap();
        (corpus, index)
    }

    #[test]
    fn bundle_round_trip() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let (corpus, index) = sample();
        let saved = save_bundle(&paths, &corpus, &index).unwrap();
        let (corpus2, index2, meta) = load_bundle(&paths).unwrap();
        assert_eq!(corpus2, corpus);
        assert_eq!(index2, index);
        assert_eq!(meta, saved);
    }

    #[test]
    fn tampered_corpus_is_refused() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let (mut corpus, index) = sample();
        save_bundle(&paths, &corpus, &index).unwrap();
        corpus.swap(0, 1);
        write_bin(paths.corpus(), &corpus).unwrap();
        assert!(matches!(load_bundle(&paths), Err(Error::CorruptIndex(_))));
    }

    #[test]
    fn missing_bundle_is_an_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(load_bundle(&IndexPaths::new(dir.path())), Err(Error::Io(_))));
    }
}
