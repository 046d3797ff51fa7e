use crate::error::{Error, Result};
use crate::recipe::{RawRecipe, RecipeRecord};
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Load a recipe corpus from `.csv`, `.json` or `.jsonl`. Rows that lack a
/// title or ingredients are logged and skipped; corpus order is preserved.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<RecipeRecord>> {
    let path = path.as_ref();
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default().to_ascii_lowercase();
    let file = File::open(path)?;
    let raws = match ext.as_str() {
        "csv" => read_csv(file)?,
        "jsonl" => read_jsonl(file)?,
        "json" => read_json(file)?,
        other => {
            return Err(Error::CorpusFormat {
                path: path.to_path_buf(),
                reason: format!("unsupported extension {other:?}"),
            })
        }
    };
    let records = into_records(raws);
    tracing::info!(path = %path.display(), rows = records.len(), "loaded corpus");
    Ok(records)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRecipe>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::Headers).from_reader(reader);
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

pub fn read_jsonl<R: Read>(reader: R) -> Result<Vec<RawRecipe>> {
    let mut rows = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        rows.push(serde_json::from_str(&line)?);
    }
    Ok(rows)
}

pub fn read_json<R: Read>(reader: R) -> Result<Vec<RawRecipe>> {
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(reader))?;
    let rows = match json {
        serde_json::Value::Array(arr) => arr.into_iter().map(serde_json::from_value).collect::<std::result::Result<Vec<_>, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => Vec::new(),
    };
    Ok(rows)
}

/// Convert raw rows into fully-defaulted records, dropping invalid rows.
pub fn into_records(raws: Vec<RawRecipe>) -> Vec<RecipeRecord> {
    let mut records = Vec::with_capacity(raws.len());
    for (row, raw) in raws.into_iter().enumerate() {
        match RecipeRecord::try_from(raw) {
            Ok(rec) => records.push(rec),
            Err(reason) => tracing::warn!(row = row + 1, %reason, "skipping corpus row"),
        }
    }
    records
}

/// SHA-1 over every row's title and ingredients, in corpus order. Ties a
/// persisted index to the exact row order it was fit against.
pub fn corpus_digest(records: &[RecipeRecord]) -> String {
    let mut hasher = Sha1::new();
    for rec in records {
        hasher.update(rec.title.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(rec.ingredients.as_bytes());
        hasher.update(b"\x1e");
    }
    format!("{:x}", hasher.finalize())
}
