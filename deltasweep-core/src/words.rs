//! Parsing of the compact most-frequent-word specification.
//!
//! A specification is a comma-separated list of items. Each item is either a
//! bare word count (`500`) or a `min:max:step` range whose upper bound is
//! exclusive (`500:3001:500` yields `500, 1000, …, 3000`). Expansion keeps the
//! order of the items and preserves duplicates.

use thiserror::Error;

use crate::error::define_error_codes;

/// Word-count specification used when the caller supplies none.
pub const DEFAULT_WORD_SPEC: &str = "100,500:3001:500,5000";

/// Largest number of word counts a specification may expand to.
pub const MAX_WORD_COUNTS: usize = 10_000;

/// Canonical string form of a word-count specification.
///
/// Callers holding a list of items normalise it with [`WordSpec::from_items`]
/// so the expander only ever sees one representation.
///
/// # Examples
/// ```
/// use deltasweep_core::WordSpec;
///
/// let spec = WordSpec::from_items(["100", "200:401:100"]);
/// assert_eq!(spec.as_str(), "100,200:401:100");
/// assert_eq!(spec.expand()?, vec![100, 200, 300, 400]);
/// # Ok::<(), deltasweep_core::WordSpecError>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WordSpec(String);

impl WordSpec {
    /// Wraps a raw specification string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Joins individual items with `,` into a single specification.
    #[must_use]
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = items
            .into_iter()
            .map(|item| item.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(",");
        Self(joined)
    }

    /// Returns the raw specification.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expands the items into explicit word counts.
    ///
    /// # Errors
    /// Returns [`WordSpecError`] when any item is malformed.
    pub fn expand(&self) -> Result<Vec<usize>, WordSpecError> {
        expand_word_spec(&self.0)
    }
}

impl Default for WordSpec {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_SPEC)
    }
}

/// Errors raised while expanding a word-count specification.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum WordSpecError {
    /// Two commas with nothing between them, or a trailing comma.
    #[error("word specification item {position} is empty")]
    EmptyItem {
        /// Zero-based position of the empty item.
        position: usize,
    },
    /// A token could not be parsed as a non-negative integer.
    #[error("invalid number `{token}` in word specification item `{item}`")]
    InvalidNumber {
        /// Item containing the token.
        item: String,
        /// Token that failed to parse.
        token: String,
    },
    /// A range item did not have exactly three `:`-separated parts.
    #[error("range `{item}` must have the form min:max:step (got {parts} parts)")]
    MalformedRange {
        /// Offending item.
        item: String,
        /// Number of parts found.
        parts: usize,
    },
    /// A range item used a step of zero.
    #[error("range `{item}` has a zero step")]
    ZeroStep {
        /// Offending item.
        item: String,
    },
    /// An item produced a word count of zero.
    #[error("word specification item `{item}` yields a word count of zero")]
    ZeroCount {
        /// Offending item.
        item: String,
    },
    /// Expanding an item pushed the total past [`MAX_WORD_COUNTS`].
    #[error("word specification item `{item}` expands past the limit of {limit} word counts")]
    TooManyCounts {
        /// Offending item.
        item: String,
        /// Maximum number of counts.
        limit: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`WordSpecError`] variants.
    enum WordSpecErrorCode for WordSpecError {
        /// An item was empty.
        EmptyItem => EmptyItem { .. } => "WORD_SPEC_EMPTY_ITEM",
        /// A token was not a number.
        InvalidNumber => InvalidNumber { .. } => "WORD_SPEC_INVALID_NUMBER",
        /// A range did not have three parts.
        MalformedRange => MalformedRange { .. } => "WORD_SPEC_MALFORMED_RANGE",
        /// A range had a zero step.
        ZeroStep => ZeroStep { .. } => "WORD_SPEC_ZERO_STEP",
        /// An item produced a zero count.
        ZeroCount => ZeroCount { .. } => "WORD_SPEC_ZERO_COUNT",
        /// An item expanded to too many counts.
        TooManyCounts => TooManyCounts { .. } => "WORD_SPEC_TOO_MANY_COUNTS",
    }
}

/// Expands a word-count specification into an ordered list of counts.
///
/// An empty or all-whitespace specification yields an empty list.
///
/// # Errors
/// Returns [`WordSpecError`] naming the first malformed item.
///
/// # Examples
/// ```
/// use deltasweep_core::expand_word_spec;
///
/// let counts = expand_word_spec("100,500:3001:500,5000")?;
/// assert_eq!(counts, vec![100, 500, 1000, 1500, 2000, 2500, 3000, 5000]);
/// assert!(expand_word_spec("")?.is_empty());
/// # Ok::<(), deltasweep_core::WordSpecError>(())
/// ```
pub fn expand_word_spec(spec: &str) -> Result<Vec<usize>, WordSpecError> {
    let mut counts = Vec::new();
    if spec.trim().is_empty() {
        return Ok(counts);
    }

    for (position, raw_item) in spec.split(',').enumerate() {
        let item = raw_item.trim();
        if item.is_empty() {
            return Err(WordSpecError::EmptyItem { position });
        }
        if item.contains(':') {
            expand_range(item, &mut counts)?;
        } else {
            let count = parse_number(item, item)?;
            if count == 0 {
                return Err(WordSpecError::ZeroCount {
                    item: item.to_owned(),
                });
            }
            reserve(item, &counts, 1)?;
            counts.push(count);
        }
    }
    Ok(counts)
}

fn expand_range(item: &str, counts: &mut Vec<usize>) -> Result<(), WordSpecError> {
    let parts: Vec<&str> = item.split(':').collect();
    let [start, stop, step] = parts.as_slice() else {
        return Err(WordSpecError::MalformedRange {
            item: item.to_owned(),
            parts: parts.len(),
        });
    };
    let start = parse_number(item, start)?;
    let stop = parse_number(item, stop)?;
    let step = parse_number(item, step)?;
    if step == 0 {
        return Err(WordSpecError::ZeroStep {
            item: item.to_owned(),
        });
    }
    if start == 0 && stop > 0 {
        return Err(WordSpecError::ZeroCount {
            item: item.to_owned(),
        });
    }

    reserve(item, counts, stop.saturating_sub(start).div_ceil(step))?;
    let mut value = start;
    while value < stop {
        counts.push(value);
        match value.checked_add(step) {
            Some(next) => value = next,
            None => break,
        }
    }
    Ok(())
}

fn reserve(item: &str, counts: &[usize], additional: usize) -> Result<(), WordSpecError> {
    if counts.len().saturating_add(additional) > MAX_WORD_COUNTS {
        return Err(WordSpecError::TooManyCounts {
            item: item.to_owned(),
            limit: MAX_WORD_COUNTS,
        });
    }
    Ok(())
}

fn parse_number(item: &str, token: &str) -> Result<usize, WordSpecError> {
    token
        .trim()
        .parse::<usize>()
        .map_err(|_| WordSpecError::InvalidNumber {
            item: item.to_owned(),
            token: token.trim().to_owned(),
        })
}
