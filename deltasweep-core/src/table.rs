//! Tables exchanged with the analysis collaborators.
//!
//! [`FrequencyTable`] carries relative feature frequencies per document with
//! features ordered by descending corpus-wide frequency, so truncating to the
//! `n` most frequent words is a prefix operation. [`DistanceTable`] is the
//! square matrix produced per sweep cell and persisted as CSV.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use thiserror::Error;

/// Raised when table dimensions are inconsistent.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TableShapeError {
    /// The number of rows differs from the number of documents.
    #[error("expected {expected} rows but found {actual}")]
    RowCount {
        /// Number of documents.
        expected: usize,
        /// Number of rows supplied.
        actual: usize,
    },
    /// A row has the wrong number of columns.
    #[error("row {row} has {actual} columns but {expected} were expected")]
    RowWidth {
        /// Offending row index.
        row: usize,
        /// Expected number of columns.
        expected: usize,
        /// Actual number of columns.
        actual: usize,
    },
}

/// Relative feature frequencies for a set of documents.
///
/// # Examples
/// ```
/// use deltasweep_core::FrequencyTable;
///
/// let table = FrequencyTable::new(
///     vec!["a_one".into(), "b_two".into()],
///     vec!["the".into(), "and".into(), "of".into()],
///     vec![vec![0.5, 0.3, 0.2], vec![0.4, 0.4, 0.2]],
/// )?;
/// let top = table.most_frequent(2);
/// assert_eq!(top.features(), ["the", "and"]);
/// assert_eq!(top.row(1), Some([0.4, 0.4].as_slice()));
/// # Ok::<(), deltasweep_core::TableShapeError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyTable {
    documents: Vec<String>,
    features: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FrequencyTable {
    /// Creates a table from document names, ordered features, and one row of
    /// relative frequencies per document.
    ///
    /// # Errors
    /// Returns [`TableShapeError`] when the rows do not match the documents and
    /// features.
    pub fn new(
        documents: Vec<String>,
        features: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, TableShapeError> {
        check_shape(documents.len(), features.len(), &rows)?;
        Ok(Self {
            documents,
            features,
            rows,
        })
    }

    /// Returns the document names in row order.
    #[must_use]
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Returns the feature names in column order.
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Returns every row.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Returns one document's frequencies.
    #[must_use]
    pub fn row(&self, document: usize) -> Option<&[f64]> {
        self.rows.get(document).map(Vec::as_slice)
    }

    /// Number of documents.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of features.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Keeps the first `words` features.
    ///
    /// Asking for more features than the table holds returns the full table.
    #[must_use]
    pub fn most_frequent(&self, words: usize) -> Self {
        let width = words.min(self.features.len());
        Self {
            documents: self.documents.clone(),
            features: self.features.iter().take(width).cloned().collect(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().take(width).copied().collect())
                .collect(),
        }
    }

    /// Re-orders the columns to `features`, filling unknown features with zero.
    ///
    /// # Examples
    /// ```
    /// use deltasweep_core::FrequencyTable;
    ///
    /// let table = FrequencyTable::new(
    ///     vec!["doc".into()],
    ///     vec!["a".into(), "b".into()],
    ///     vec![vec![0.7, 0.3]],
    /// )?;
    /// let aligned = table.aligned_to(&["b".to_owned(), "z".to_owned()]);
    /// assert_eq!(aligned.row(0), Some([0.3, 0.0].as_slice()));
    /// # Ok::<(), deltasweep_core::TableShapeError>(())
    /// ```
    #[must_use]
    pub fn aligned_to(&self, features: &[String]) -> Self {
        let positions: HashMap<&str, usize> = self
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| (feature.as_str(), index))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                features
                    .iter()
                    .map(|feature| {
                        positions
                            .get(feature.as_str())
                            .and_then(|&index| row.get(index))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();
        Self {
            documents: self.documents.clone(),
            features: features.to_vec(),
            rows,
        }
    }
}

/// Square matrix of pairwise document distances.
///
/// # Examples
/// ```
/// use deltasweep_core::DistanceTable;
///
/// let table = DistanceTable::new(
///     vec!["a".into(), "b".into()],
///     vec![vec![0.0, 0.25], vec![0.25, 0.0]],
/// )?;
/// let mut buffer = Vec::new();
/// table.write_csv_to(&mut buffer).expect("in-memory write succeeds");
/// assert_eq!(String::from_utf8(buffer).expect("utf-8"), ",a,b\na,0,0.25\nb,0.25,0\n");
/// # Ok::<(), deltasweep_core::TableShapeError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceTable {
    documents: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl DistanceTable {
    /// Creates a distance table; `values` must be `n × n` for `n` documents.
    ///
    /// # Errors
    /// Returns [`TableShapeError`] when the matrix is not square.
    pub fn new(documents: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self, TableShapeError> {
        check_shape(documents.len(), documents.len(), &values)?;
        Ok(Self { documents, values })
    }

    /// Returns the document names.
    #[must_use]
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the table holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the distance between documents `i` and `j`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Iterates over the upper triangle as `(i, j, distance)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.values.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .skip(i + 1)
                .map(move |(j, &value)| (i, j, value))
        })
    }

    /// Writes the table as CSV to `writer`.
    ///
    /// # Errors
    /// Returns [`csv::Error`] when writing fails.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut header = Vec::with_capacity(self.documents.len() + 1);
        header.push(String::new());
        header.extend(self.documents.iter().cloned());
        csv_writer.write_record(&header)?;
        for (document, row) in self.documents.iter().zip(&self.values) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(document.clone());
            record.extend(row.iter().map(f64::to_string));
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Writes the table as CSV to `path`, replacing any existing file.
    ///
    /// # Errors
    /// Returns [`csv::Error`] when the file cannot be created or written.
    pub fn write_csv(&self, path: &Path) -> Result<(), csv::Error> {
        let file = File::create(path)?;
        self.write_csv_to(BufWriter::new(file))
    }
}

fn check_shape(rows: usize, columns: usize, values: &[Vec<f64>]) -> Result<(), TableShapeError> {
    if values.len() != rows {
        return Err(TableShapeError::RowCount {
            expected: rows,
            actual: values.len(),
        });
    }
    for (row, cells) in values.iter().enumerate() {
        if cells.len() != columns {
            return Err(TableShapeError::RowWidth {
                row,
                expected: columns,
                actual: cells.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn sample() -> FrequencyTable {
        FrequencyTable::new(
            vec!["x".into(), "y".into()],
            vec!["the".into(), "of".into(), "and".into()],
            vec![vec![0.5, 0.3, 0.2], vec![0.6, 0.1, 0.3]],
        )
        .expect("sample table is well formed")
    }

    #[rstest]
    #[case(0, 0)]
    #[case(2, 2)]
    #[case(3, 3)]
    #[case(50, 3)]
    fn most_frequent_keeps_a_prefix(#[case] words: usize, #[case] expected_width: usize) {
        let truncated = sample().most_frequent(words);
        assert_eq!(truncated.feature_count(), expected_width);
        assert!(truncated.rows().iter().all(|row| row.len() == expected_width));
        assert_eq!(truncated.documents(), sample().documents());
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = FrequencyTable::new(
            vec!["x".into()],
            vec!["the".into(), "of".into()],
            vec![vec![0.5]],
        )
        .expect_err("ragged rows must fail");
        assert_eq!(
            err,
            TableShapeError::RowWidth {
                row: 0,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn rejects_non_square_distances() {
        let err = DistanceTable::new(vec!["x".into(), "y".into()], vec![vec![0.0, 1.0]])
            .expect_err("missing row must fail");
        assert_eq!(
            err,
            TableShapeError::RowCount {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn pairs_walk_the_upper_triangle() {
        let table = DistanceTable::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![0.0, 1.0, 2.0],
                vec![1.0, 0.0, 3.0],
                vec![2.0, 3.0, 0.0],
            ],
        )
        .expect("square table");
        let pairs: Vec<_> = table.pairs().collect();
        assert_eq!(pairs, vec![(0, 1, 1.0), (0, 2, 2.0), (1, 2, 3.0)]);
    }

    #[test]
    fn csv_quotes_awkward_document_names() {
        let table = DistanceTable::new(
            vec!["smith, j_a".into(), "b".into()],
            vec![vec![0.0, 0.5], vec![0.5, 0.0]],
        )
        .expect("square table");
        let mut buffer = Vec::new();
        table.write_csv_to(&mut buffer).expect("write succeeds");
        let text = String::from_utf8(buffer).expect("utf-8");
        assert!(text.starts_with(",\"smith, j_a\",b\n"));
    }
}
