//! Deterministic artifact and summary naming.
//!
//! Every sweep cell maps to exactly one file name of the form
//! `<Name>.<words>.<case>.csv`; the word count is zero-padded to at least four
//! digits so lexical and numeric order agree for typical sweeps.

use std::path::{Path, PathBuf};

use crate::cell::CaseSensitivity;

const OUTPUT_DIR_SUFFIX: &str = "_deltas";
const SUMMARY_SUFFIX: &str = "_scores.csv";

/// Converts `name` to title case.
///
/// The first letter of every run of alphabetic characters is upper-cased and
/// the remaining letters are lower-cased; everything else is kept as-is.
///
/// # Examples
/// ```
/// use deltasweep_core::title_case;
///
/// assert_eq!(title_case("cosine_eder"), "Cosine_Eder");
/// assert_eq!(title_case("ROTATED_DELTA"), "Rotated_Delta");
/// ```
#[must_use]
pub fn title_case(name: &str) -> String {
    let mut titled = String::with_capacity(name.len());
    let mut inside_word = false;
    for ch in name.chars() {
        if ch.is_alphabetic() {
            if inside_word {
                titled.extend(ch.to_lowercase());
            } else {
                titled.extend(ch.to_uppercase());
            }
            inside_word = true;
        } else {
            titled.push(ch);
            inside_word = false;
        }
    }
    titled
}

/// Returns the artifact file name for one sweep cell.
///
/// # Examples
/// ```
/// use deltasweep_core::{CaseSensitivity, artifact_file_name};
///
/// assert_eq!(
///     artifact_file_name("cosine_eder", 500, CaseSensitivity::Sensitive),
///     "Cosine_Eder.0500.case_sensitive.csv",
/// );
/// assert_eq!(
///     artifact_file_name("cosine_eder", 500, CaseSensitivity::Insensitive),
///     "Cosine_Eder.0500.case_insensitive.csv",
/// );
/// ```
#[must_use]
pub fn artifact_file_name(name: &str, words: usize, case: CaseSensitivity) -> String {
    format!("{}.{words:04}.{}.csv", title_case(name), case.label())
}

/// Output directory used when none is configured: `<corpus_dir>_deltas`.
#[must_use]
pub fn default_output_dir(corpus_dir: &Path) -> PathBuf {
    with_suffix(corpus_dir, OUTPUT_DIR_SUFFIX)
}

/// Summary file for an output directory: `<output_dir>_scores.csv`.
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use deltasweep_core::summary_path;
///
/// assert_eq!(summary_path(Path::new("runs/corpus_deltas/")), PathBuf::from("runs/corpus_deltas_scores.csv"));
/// ```
#[must_use]
pub fn summary_path(output_dir: &Path) -> PathBuf {
    with_suffix(output_dir, SUMMARY_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    // Collecting the components drops trailing separators.
    let normalised: PathBuf = path.components().collect();
    let mut raw = normalised.into_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}
