//! Build sparse TF-IDF vectors from a directory of text files.

use crate::error::{KMeansError, Result};
use crate::point::SparsePoint;
use crate::vector_store::{Points, VectorStore};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Term counts of one document.
type Catalog = HashMap<String, usize>;

/// Every regular file under `dir`, in sorted order.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Lowercased runs of alphanumeric characters.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

fn catalog(path: &Path) -> Result<Catalog> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let mut counts = Catalog::new();
    for word in tokenize(&text) {
        *counts.entry(word).or_insert(0) += 1;
    }
    Ok(counts)
}

/// One sparse point per file under `dir`, weighted by `tf * ln(N / df)`.
/// Attributes are the sorted vocabulary; terms present in every document get
/// weight zero and are not stored.
pub fn load_directory(dir: &Path) -> Result<VectorStore> {
    let files = list_files(dir)?;
    if files.is_empty() {
        return Err(KMeansError::EmptyInput);
    }

    let catalogs = files
        .par_iter()
        .map(|path| catalog(path))
        .collect::<Result<Vec<_>>>()?;
    debug!(documents = catalogs.len(), "tokenized documents");

    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for counts in &catalogs {
        for word in counts.keys() {
            *document_frequency.entry(word.as_str()).or_insert(0) += 1;
        }
    }
    let columns: HashMap<&str, usize> = document_frequency
        .keys()
        .enumerate()
        .map(|(i, &word)| (word, i))
        .collect();

    let num_documents = catalogs.len() as f64;
    let points = catalogs
        .par_iter()
        .map(|counts| {
            let entries = counts
                .iter()
                .filter_map(|(word, &tf)| {
                    let df = document_frequency[word.as_str()] as f64;
                    let weight = tf as f64 * (num_documents / df).ln();
                    (weight != 0.0).then(|| (columns[word.as_str()], weight))
                })
                .collect();
            SparsePoint::from_unsorted(entries)
        })
        .collect::<Result<Vec<_>>>()?;

    let attributes: Vec<String> = document_frequency.keys().map(|w| w.to_string()).collect();
    let relation = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());

    info!(
        documents = points.len(),
        terms = attributes.len(),
        "built TF-IDF vectors"
    );
    Ok(VectorStore::new(relation, attributes, Points::Sparse(points)))
}
