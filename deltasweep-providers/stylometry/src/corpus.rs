//! Corpus loading and relative word frequencies.
//!
//! A corpus is a folder of UTF-8 `.txt` files. Each file is one document,
//! named after its file stem. Tokens are maximal runs of alphabetic
//! characters.

use std::{
    cmp::Ordering,
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use deltasweep_core::{CaseSensitivity, FrequencyTable};
use tracing::debug;

use crate::errors::StylometryError;

/// Splits `text` into word tokens, lower-casing them for case-insensitive runs.
///
/// # Examples
/// ```
/// use deltasweep_core::CaseSensitivity;
/// use deltasweep_providers_stylometry::tokenize;
///
/// let tokens: Vec<String> = tokenize("The cat's hat, THE end.", CaseSensitivity::Insensitive).collect();
/// assert_eq!(tokens, ["the", "cat", "s", "hat", "the", "end"]);
/// ```
pub fn tokenize(text: &str, case: CaseSensitivity) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|token| !token.is_empty())
        .map(move |token| {
            if case.is_insensitive() {
                token.to_lowercase()
            } else {
                token.to_owned()
            }
        })
}

/// Lists the `.txt` documents of `dir` sorted by file name.
///
/// # Errors
/// Returns [`StylometryError::Io`] when the folder cannot be listed.
pub fn corpus_files(dir: &Path) -> Result<Vec<PathBuf>, StylometryError> {
    let io_error = |source| StylometryError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_text = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_text && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Builds the relative frequency table of the corpus in `dir`.
///
/// # Errors
/// Returns [`StylometryError`] when the folder cannot be read, holds no
/// documents, or a document holds no tokens.
pub fn load_corpus(dir: &Path, case: CaseSensitivity) -> Result<FrequencyTable, StylometryError> {
    let files = corpus_files(dir)?;
    if files.is_empty() {
        return Err(StylometryError::EmptyCorpus {
            path: dir.to_path_buf(),
        });
    }
    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let text = fs::read_to_string(path).map_err(|source| StylometryError::Io {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut counts = HashMap::new();
        for token in tokenize(&text, case) {
            *counts.entry(token).or_insert(0_usize) += 1;
        }
        documents.push((name, counts));
    }
    debug!(
        corpus = %dir.display(),
        %case,
        documents = documents.len(),
        "corpus tokenized"
    );
    frequency_table(documents)
}

/// Turns per-document token counts into a table of relative frequencies.
///
/// # Errors
/// Returns [`StylometryError::EmptyDocument`] when a document has no tokens.
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "relative frequencies are ratios of token counts."
)]
pub fn frequency_table(
    documents: Vec<(String, HashMap<String, usize>)>,
) -> Result<FrequencyTable, StylometryError> {
    let mut relative = Vec::with_capacity(documents.len());
    for (name, counts) in documents {
        let tokens: usize = counts.values().sum();
        if tokens == 0 {
            return Err(StylometryError::EmptyDocument { document: name });
        }
        let frequencies = counts
            .into_iter()
            .map(|(word, count)| (word, count as f64 / tokens as f64))
            .collect();
        relative.push((name, frequencies));
    }
    frequency_table_from_relative(relative)
}

/// Assembles a table from per-document relative frequencies.
///
/// Features are ordered by summed relative frequency, most frequent first,
/// with ties broken by feature name. Words a document lacks count as zero.
///
/// # Errors
/// Returns [`StylometryError::Shape`] when the table cannot be assembled.
#[expect(
    clippy::float_arithmetic,
    reason = "feature ranking sums relative frequencies."
)]
pub fn frequency_table_from_relative(
    documents: Vec<(String, HashMap<String, f64>)>,
) -> Result<FrequencyTable, StylometryError> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for (_, frequencies) in &documents {
        for (word, &value) in frequencies {
            *totals.entry(word.as_str()).or_insert(0.0) += value;
        }
    }
    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|(a_word, a_total), (b_word, b_total)| {
        b_total
            .partial_cmp(a_total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a_word.cmp(b_word))
    });
    let features: Vec<String> = ranked.into_iter().map(|(word, _)| word.to_owned()).collect();

    let rows = documents
        .iter()
        .map(|(_, frequencies)| {
            features
                .iter()
                .map(|word| frequencies.get(word).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();
    let names = documents.into_iter().map(|(name, _)| name).collect();
    Ok(FrequencyTable::new(names, features, rows)?)
}
