//! Import of word frequency tables exported by stylo.
//!
//! The file is whitespace-delimited. The header names the documents, optionally
//! preceded by a label for the word column. Every following line holds a word
//! and one value per document in percent. Double quotes around names are
//! stripped.
//!
//! The header carries a word-column label exactly when it has one more name
//! than the widest row has values, matching a table read with the first
//! column as index. After that decision, `NA` and values missing from the end
//! of a shorter row count as zero.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use deltasweep_core::FrequencyTable;

use crate::{corpus::frequency_table_from_relative, errors::StylometryError};

const PERCENT: f64 = 100.0;

fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(field)
}

fn parse_value(raw: &str, line: usize) -> Result<f64, StylometryError> {
    let value = unquote(raw);
    if value.eq_ignore_ascii_case("na") {
        return Ok(0.0);
    }
    value
        .parse::<f64>()
        .map_err(|err| StylometryError::TableFormat {
            line,
            reason: format!("invalid value `{value}`: {err}"),
        })
}

/// Parses a stylo frequency table, scaling percentages to fractions.
///
/// # Errors
/// Returns [`StylometryError::TableFormat`] when a line cannot be parsed and
/// [`StylometryError::Io`] when reading fails.
///
/// # Examples
/// ```
/// use deltasweep_providers_stylometry::parse_stylo_table;
///
/// let text = "\"a_one\" \"b_two\"\n\"the\" 5.0 4.0\n\"of\" 2.0 NA\n";
/// let table = parse_stylo_table(text.as_bytes(), "inline".as_ref())?;
/// assert_eq!(table.documents(), ["a_one", "b_two"]);
/// assert_eq!(table.features(), ["the", "of"]);
/// assert_eq!(table.row(1), Some([0.04, 0.0].as_slice()));
/// # Ok::<(), deltasweep_providers_stylometry::StylometryError>(())
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "stylo stores frequencies in percent."
)]
pub fn parse_stylo_table<R: BufRead>(
    reader: R,
    origin: &Path,
) -> Result<FrequencyTable, StylometryError> {
    let mut lines = reader.lines().enumerate().filter_map(|(index, line)| match line {
        Ok(text) if text.trim().is_empty() => None,
        other => Some((index + 1, other)),
    });
    let io_error = |source| StylometryError::Io {
        path: origin.to_path_buf(),
        source,
    };

    let Some((_, header)) = lines.next() else {
        return Err(StylometryError::TableFormat {
            line: 1,
            reason: "missing header".to_owned(),
        });
    };
    let mut documents: Vec<String> = header
        .map_err(io_error)?
        .split_whitespace()
        .map(|name| unquote(name).to_owned())
        .collect();

    let mut rows: Vec<(usize, String, Vec<f64>)> = Vec::new();
    for (line_number, line) in lines {
        let line = line.map_err(io_error)?;
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            continue;
        };
        let values = fields
            .map(|raw| parse_value(raw, line_number).map(|v| v / PERCENT))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((line_number, unquote(word).to_owned(), values));
    }

    // A header with one more name than the widest row labels the word column.
    let widest = rows.iter().map(|(_, _, values)| values.len()).max().unwrap_or(0);
    if widest + 1 == documents.len() {
        documents.remove(0);
    }
    if let Some((line, word, values)) = rows
        .iter()
        .find(|(_, _, values)| values.len() > documents.len())
    {
        return Err(StylometryError::TableFormat {
            line: *line,
            reason: format!(
                "row `{word}` has {} values for {} documents",
                values.len(),
                documents.len()
            ),
        });
    }
    if documents.is_empty() {
        return Err(StylometryError::TableFormat {
            line: 1,
            reason: "header names no documents".to_owned(),
        });
    }

    let relative = documents
        .iter()
        .enumerate()
        .map(|(column, name)| {
            let frequencies: HashMap<String, f64> = rows
                .iter()
                .map(|(_, word, values)| {
                    (word.clone(), values.get(column).copied().unwrap_or(0.0))
                })
                .collect();
            (name.clone(), frequencies)
        })
        .collect();
    frequency_table_from_relative(relative)
}

/// Loads the stylo table at `path`.
///
/// # Errors
/// Returns [`StylometryError`] when the file cannot be opened or parsed.
pub fn load_stylo_table(path: &Path) -> Result<FrequencyTable, StylometryError> {
    let file = File::open(path).map_err(|source| StylometryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_stylo_table(BufReader::new(file), path)
}
