//! Accumulator for per-cell scores and its CSV persistence.
//!
//! The table is created over every planned cell so the summary always lists
//! the whole sweep; cells without a score serialise with a blank `Score`
//! column. Flushing goes through a temporary file in the destination
//! directory followed by a rename, so readers never observe a half-written
//! summary.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::cell::{CaseSensitivity, SweepCell};

const HEADER: [&str; 5] = ["Algorithm", "Words", "Case Insensitive", "Score", "Status"];

/// Progress of a single cell.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CellStatus {
    /// Not yet visited in this run.
    Pending,
    /// Computed and scored in this run.
    Computed,
    /// Skipped because its artifact already existed.
    Skipped,
    /// Failed under the isolate policy.
    Failed,
}

impl CellStatus {
    /// Label written to the summary.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Computed => "computed",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellStatus {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "pending" => Ok(Self::Pending),
            "computed" => Ok(Self::Computed),
            "skipped" => Ok(Self::Skipped),
            "failed" => Ok(Self::Failed),
            _ => Err(()),
        }
    }
}

/// Errors raised while updating or persisting a [`ScoreTable`].
#[derive(Debug, Error)]
pub enum ScoreTableError {
    /// The cell is not part of the table.
    #[error("cell {cell} is not part of the score table")]
    UnknownCell {
        /// Display form of the cell.
        cell: String,
    },
    /// Reading or writing CSV failed.
    #[error("score table CSV error at `{}`: {source}", path.display())]
    Csv {
        /// File being read or written.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// Creating or renaming the summary file failed.
    #[error("failed to persist score table to `{}`: {source}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A summary row could not be interpreted.
    #[error("malformed score table row {row}: {reason}")]
    Malformed {
        /// One-based data row number.
        row: usize,
        /// What was wrong with the row.
        reason: String,
    },
}

type CellKey = (String, usize, CaseSensitivity);

#[derive(Clone, Debug, PartialEq)]
struct ScoreRow {
    algorithm: String,
    words: usize,
    case: CaseSensitivity,
    score: Option<f64>,
    status: CellStatus,
}

/// Read-only view of one score table row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreEntry<'a> {
    /// Title-cased algorithm name.
    pub algorithm: &'a str,
    /// Word count.
    pub words: usize,
    /// Case setting.
    pub case: CaseSensitivity,
    /// Score, if one is known.
    pub score: Option<f64>,
    /// Cell progress.
    pub status: CellStatus,
}

/// Scores keyed by (algorithm, word count, case setting).
///
/// # Examples
/// ```
/// use deltasweep_core::{
///     AlgorithmVariant, CaseSensitivity, CellStatus, DistanceMeasure, ScoreTable, SweepCell,
/// };
///
/// let cell = SweepCell::new(
///     AlgorithmVariant::from(DistanceMeasure::CosineEder),
///     500,
///     CaseSensitivity::Sensitive,
/// );
/// let mut table = ScoreTable::over([cell.clone()]);
/// assert_eq!(table.get(&cell), None);
/// table.set(&cell, 0.75)?;
/// assert_eq!(table.get(&cell), Some(0.75));
/// assert_eq!(table.status(&cell), Some(CellStatus::Computed));
///
/// let mut buffer = Vec::new();
/// table.write_csv_to(&mut buffer)?;
/// let text = String::from_utf8(buffer).expect("utf-8");
/// assert_eq!(
///     text,
///     "Algorithm,Words,Case Insensitive,Score,Status\nCosine_Eder,500,False,0.75,computed\n",
/// );
/// # Ok::<(), deltasweep_core::ScoreTableError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScoreTable {
    rows: Vec<ScoreRow>,
    index: HashMap<CellKey, usize>,
}

impl ScoreTable {
    /// Creates a table with one pending, score-less row per distinct cell.
    ///
    /// Rows are grouped by algorithm in order of first appearance; within an
    /// algorithm they keep the order in which `cells` yields them.
    #[must_use]
    pub fn over(cells: impl IntoIterator<Item = SweepCell>) -> Self {
        let mut seen = HashSet::new();
        let mut algorithms: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        for cell in cells {
            if !seen.insert(key_of(&cell)) {
                continue;
            }
            let algorithm = cell.variant().display_name();
            if !algorithms.contains(&algorithm) {
                algorithms.push(algorithm.clone());
            }
            rows.push(ScoreRow {
                algorithm,
                words: cell.words(),
                case: cell.case(),
                score: None,
                status: CellStatus::Pending,
            });
        }
        rows.sort_by_key(|row| {
            algorithms
                .iter()
                .position(|name| *name == row.algorithm)
                .unwrap_or(usize::MAX)
        });
        let index = rows
            .iter()
            .enumerate()
            .map(|(position, row)| ((row.algorithm.clone(), row.words, row.case), position))
            .collect();
        Self { rows, index }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records a computed score for `cell`.
    ///
    /// # Errors
    /// Returns [`ScoreTableError::UnknownCell`] when `cell` is not in the table.
    pub fn set(&mut self, cell: &SweepCell, score: f64) -> Result<(), ScoreTableError> {
        let row = self.row_mut(cell)?;
        row.score = Some(score);
        row.status = CellStatus::Computed;
        Ok(())
    }

    /// Marks `cell` as skipped, keeping any score it already holds.
    ///
    /// A cell computed earlier in the same run stays computed.
    ///
    /// # Errors
    /// Returns [`ScoreTableError::UnknownCell`] when `cell` is not in the table.
    pub fn mark_skipped(&mut self, cell: &SweepCell) -> Result<(), ScoreTableError> {
        let row = self.row_mut(cell)?;
        if row.status != CellStatus::Computed {
            row.status = CellStatus::Skipped;
        }
        Ok(())
    }

    /// Marks `cell` as failed and clears its score.
    ///
    /// # Errors
    /// Returns [`ScoreTableError::UnknownCell`] when `cell` is not in the table.
    pub fn mark_failed(&mut self, cell: &SweepCell) -> Result<(), ScoreTableError> {
        let row = self.row_mut(cell)?;
        row.score = None;
        row.status = CellStatus::Failed;
        Ok(())
    }

    /// Returns the score of `cell`, if known.
    #[must_use]
    pub fn get(&self, cell: &SweepCell) -> Option<f64> {
        self.row(cell).and_then(|row| row.score)
    }

    /// Returns the progress of `cell`, or `None` when it is not in the table.
    #[must_use]
    pub fn status(&self, cell: &SweepCell) -> Option<CellStatus> {
        self.row(cell).map(|row| row.status)
    }

    /// Number of rows still pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status == CellStatus::Pending)
            .count()
    }

    /// Iterates over the rows in serialisation order.
    pub fn entries(&self) -> impl Iterator<Item = ScoreEntry<'_>> + '_ {
        self.rows.iter().map(|row| ScoreEntry {
            algorithm: &row.algorithm,
            words: row.words,
            case: row.case,
            score: row.score,
            status: row.status,
        })
    }

    /// Serialises the table as CSV to `writer`.
    ///
    /// # Errors
    /// Returns [`ScoreTableError::Csv`] when writing fails.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<(), ScoreTableError> {
        let wrap = |source| ScoreTableError::Csv {
            path: PathBuf::from("<writer>"),
            source,
        };
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(HEADER).map_err(wrap)?;
        for row in &self.rows {
            let score = row.score.map(|value| value.to_string()).unwrap_or_default();
            let case = if row.case.is_insensitive() {
                "True"
            } else {
                "False"
            };
            csv_writer
                .write_record([
                    row.algorithm.as_str(),
                    &row.words.to_string(),
                    case,
                    &score,
                    row.status.as_str(),
                ])
                .map_err(wrap)?;
        }
        csv_writer.flush().map_err(|source| wrap(source.into()))?;
        Ok(())
    }

    /// Atomically replaces the summary at `path` with the current table.
    ///
    /// # Errors
    /// Returns [`ScoreTableError`] when the temporary file cannot be created,
    /// written, or renamed into place.
    pub fn write_csv(&self, path: &Path) -> Result<(), ScoreTableError> {
        let io_error = |source| ScoreTableError::Io {
            path: path.to_path_buf(),
            source,
        };
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(parent).map_err(io_error)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            self.write_csv_to(&mut writer).map_err(|err| match err {
                ScoreTableError::Csv { source, .. } => ScoreTableError::Csv {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })?;
            writer.flush().map_err(io_error)?;
        }
        temp.persist(path).map_err(|err| io_error(err.error))?;
        Ok(())
    }

    /// Seeds scores from a summary written by an earlier run.
    ///
    /// Only pending rows are updated, and only from rows that carry a score.
    /// Rows naming cells outside this table are ignored. Returns the number of
    /// rows seeded.
    ///
    /// # Errors
    /// Returns [`ScoreTableError::Malformed`] when a row cannot be parsed and
    /// [`ScoreTableError::Csv`] when the input is not valid CSV.
    pub fn seed_from_reader<R: Read>(&mut self, reader: R) -> Result<usize, ScoreTableError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut seeded = 0;
        for (index, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|source| ScoreTableError::Csv {
                path: PathBuf::from("<reader>"),
                source,
            })?;
            let row_number = index + 1;
            let Some(parsed) = parse_row(&record, row_number)? else {
                continue;
            };
            let (key, score) = parsed;
            let Some(&position) = self.index.get(&key) else {
                continue;
            };
            let Some(row) = self.rows.get_mut(position) else {
                continue;
            };
            if row.status == CellStatus::Pending {
                row.score = Some(score);
                seeded += 1;
            }
        }
        Ok(seeded)
    }

    /// Seeds scores from the summary file at `path`.
    ///
    /// # Errors
    /// Returns [`ScoreTableError`] when the file cannot be opened or parsed.
    pub fn seed_from_csv(&mut self, path: &Path) -> Result<usize, ScoreTableError> {
        let file = File::open(path).map_err(|source| ScoreTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.seed_from_reader(BufReader::new(file))
            .map_err(|err| match err {
                ScoreTableError::Csv { source, .. } => ScoreTableError::Csv {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })
    }

    fn row(&self, cell: &SweepCell) -> Option<&ScoreRow> {
        self.index
            .get(&key_of(cell))
            .and_then(|&position| self.rows.get(position))
    }

    fn row_mut(&mut self, cell: &SweepCell) -> Result<&mut ScoreRow, ScoreTableError> {
        let unknown = || ScoreTableError::UnknownCell {
            cell: cell.to_string(),
        };
        let position = *self.index.get(&key_of(cell)).ok_or_else(unknown)?;
        self.rows.get_mut(position).ok_or_else(unknown)
    }
}

fn key_of(cell: &SweepCell) -> CellKey {
    (cell.variant().display_name(), cell.words(), cell.case())
}

fn parse_row(
    record: &csv::StringRecord,
    row: usize,
) -> Result<Option<(CellKey, f64)>, ScoreTableError> {
    let malformed = |reason: String| ScoreTableError::Malformed { row, reason };
    let field = |position: usize, name: &str| {
        record
            .get(position)
            .map(str::trim)
            .ok_or_else(|| malformed(format!("missing `{name}` column")))
    };

    let algorithm = field(0, "Algorithm")?;
    let words = field(1, "Words")?
        .parse::<usize>()
        .map_err(|err| malformed(format!("invalid word count: {err}")))?;
    let case = match field(2, "Case Insensitive")? {
        "True" | "true" => CaseSensitivity::Insensitive,
        "False" | "false" => CaseSensitivity::Sensitive,
        other => return Err(malformed(format!("invalid case flag `{other}`"))),
    };
    let raw_score = record.get(3).map(str::trim).unwrap_or_default();
    if raw_score.is_empty() {
        return Ok(None);
    }
    let score = raw_score
        .parse::<f64>()
        .map_err(|err| malformed(format!("invalid score `{raw_score}`: {err}")))?;
    if let Some(raw_status) = record.get(4) {
        if raw_status.trim().parse::<CellStatus>() == Ok(CellStatus::Failed) {
            return Ok(None);
        }
    }
    Ok(Some(((algorithm.to_owned(), words, case), score)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::{fixture, rstest};

    use crate::measure::{AlgorithmVariant, DistanceMeasure};

    fn cell(measure: DistanceMeasure, words: usize, case: CaseSensitivity) -> SweepCell {
        SweepCell::new(AlgorithmVariant::from(measure), words, case)
    }

    #[fixture]
    fn cells() -> Vec<SweepCell> {
        vec![
            cell(DistanceMeasure::CosineEder, 100, CaseSensitivity::Sensitive),
            cell(DistanceMeasure::CosineEder, 100, CaseSensitivity::Insensitive),
            cell(DistanceMeasure::CosineBinary, 100, CaseSensitivity::Sensitive),
            cell(DistanceMeasure::CosineBinary, 100, CaseSensitivity::Insensitive),
        ]
    }

    fn render(table: &ScoreTable) -> String {
        let mut buffer = Vec::new();
        table.write_csv_to(&mut buffer).expect("write succeeds");
        String::from_utf8(buffer).expect("utf-8")
    }

    #[rstest]
    fn new_tables_are_pending_and_blank(cells: Vec<SweepCell>) {
        let table = ScoreTable::over(cells.clone());
        assert_eq!(table.len(), 4);
        assert_eq!(table.pending_count(), 4);
        assert!(cells.iter().all(|cell| table.get(cell).is_none()));
        let text = render(&table);
        assert!(text.contains("Cosine_Binary,100,True,,pending\n"));
    }

    #[test]
    fn rows_are_grouped_by_algorithm() {
        let plan_order = [100, 200].into_iter().flat_map(|words| {
            [DistanceMeasure::CosineEder, DistanceMeasure::CosineBinary]
                .into_iter()
                .map(move |measure| cell(measure, words, CaseSensitivity::Insensitive))
        });
        let table = ScoreTable::over(plan_order);
        let order: Vec<(&str, usize)> = table
            .entries()
            .map(|entry| (entry.algorithm, entry.words))
            .collect();
        assert_eq!(
            order,
            [
                ("Cosine_Eder", 100),
                ("Cosine_Eder", 200),
                ("Cosine_Binary", 100),
                ("Cosine_Binary", 200),
            ]
        );
        let moved = cell(DistanceMeasure::CosineBinary, 100, CaseSensitivity::Insensitive);
        assert_eq!(table.status(&moved), Some(CellStatus::Pending));
    }

    #[rstest]
    fn duplicate_cells_share_one_row(cells: Vec<SweepCell>) {
        let mut doubled = cells.clone();
        doubled.extend(cells);
        assert_eq!(ScoreTable::over(doubled).len(), 4);
    }

    #[rstest]
    fn skip_keeps_computed_status(cells: Vec<SweepCell>) -> Result<(), ScoreTableError> {
        let mut table = ScoreTable::over(cells.clone());
        let first = cells.first().expect("fixture has cells");
        table.set(first, 1.5)?;
        table.mark_skipped(first)?;
        assert_eq!(table.status(first), Some(CellStatus::Computed));
        assert_eq!(table.get(first), Some(1.5));
        Ok(())
    }

    #[rstest]
    fn failures_clear_scores(cells: Vec<SweepCell>) -> Result<(), ScoreTableError> {
        let mut table = ScoreTable::over(cells.clone());
        let first = cells.first().expect("fixture has cells");
        table.set(first, 1.5)?;
        table.mark_failed(first)?;
        assert_eq!(table.get(first), None);
        assert!(render(&table).contains("Cosine_Eder,100,False,,failed\n"));
        Ok(())
    }

    #[test]
    fn unknown_cells_are_rejected() {
        let mut table = ScoreTable::over(Vec::new());
        let err = table
            .set(&cell(DistanceMeasure::Eder, 5, CaseSensitivity::Sensitive), 1.0)
            .expect_err("unknown cell must fail");
        assert!(matches!(err, ScoreTableError::UnknownCell { .. }));
    }

    #[rstest]
    fn seeding_restores_prior_scores(cells: Vec<SweepCell>) -> Result<(), ScoreTableError> {
        let mut previous = ScoreTable::over(cells.clone());
        let first = cells.first().expect("fixture has cells");
        let last = cells.last().expect("fixture has cells");
        previous.set(first, 2.25)?;
        previous.set(last, -0.5)?;
        previous.mark_failed(last)?;

        let mut next = ScoreTable::over(cells.clone());
        let seeded = next.seed_from_reader(render(&previous).as_bytes())?;
        assert_eq!(seeded, 1);
        assert_eq!(next.get(first), Some(2.25));
        assert_eq!(next.status(first), Some(CellStatus::Pending));
        assert_eq!(next.get(last), None);
        Ok(())
    }

    #[test]
    fn seeding_ignores_rows_outside_the_table() -> Result<(), ScoreTableError> {
        let mut table = ScoreTable::over([cell(
            DistanceMeasure::Burrows,
            100,
            CaseSensitivity::Sensitive,
        )]);
        let csv = "Algorithm,Words,Case Insensitive,Score,Status\nEder,100,False,3.0,computed\n";
        assert_eq!(table.seed_from_reader(csv.as_bytes())?, 0);
        Ok(())
    }

    #[rstest]
    #[case::bad_words("Eder,many,False,1.0,computed\n")]
    #[case::bad_case("Eder,100,maybe,1.0,computed\n")]
    #[case::bad_score("Eder,100,False,high,computed\n")]
    fn seeding_rejects_malformed_rows(#[case] row: &str) {
        let mut table = ScoreTable::over(Vec::new());
        let csv = format!("Algorithm,Words,Case Insensitive,Score,Status\n{row}");
        let err = table
            .seed_from_reader(csv.as_bytes())
            .expect_err("malformed row must fail");
        assert!(matches!(err, ScoreTableError::Malformed { row: 1, .. }));
    }

    #[rstest]
    fn flush_replaces_the_summary(cells: Vec<SweepCell>) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("run_scores.csv");
        std::fs::write(&path, "stale contents")?;
        let mut table = ScoreTable::over(cells.clone());
        table.set(cells.first().expect("fixture has cells"), 0.125)?;
        table.write_csv(&path)?;
        let written = std::fs::read_to_string(&path)?;
        assert!(written.starts_with("Algorithm,Words,Case Insensitive,Score,Status\n"));
        assert!(written.contains("Cosine_Eder,100,False,0.125,computed\n"));
        assert!(!written.contains("stale"));
        Ok(())
    }
}
