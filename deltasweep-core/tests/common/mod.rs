use std::{
    path::{Path, PathBuf},
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use deltasweep_core::{
    AnalysisError, AnalysisOperation, CaseSensitivity, ClusteringScorer, Collaborators,
    DistanceComputer, DistanceMeasure, DistanceTable, FrequencySource, FrequencyTable,
};

pub const DOCUMENTS: [&str; 4] = [
    "austen_emma",
    "austen_persuasion",
    "bronte_jane",
    "bronte_villette",
];

/// Deterministic stand-in for the analysis provider that counts every call.
#[derive(Default)]
pub struct FakeAnalysis {
    builds: AtomicUsize,
    loads: AtomicUsize,
    truncations: AtomicUsize,
    computes: AtomicUsize,
    scores: AtomicUsize,
    failing: Option<DistanceMeasure>,
    built_from: Mutex<Vec<PathBuf>>,
    references: Mutex<Vec<(DistanceMeasure, bool)>>,
}

impl FakeAnalysis {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every distance computation for `measure` fail.
    #[must_use]
    pub fn failing_on(measure: DistanceMeasure) -> Self {
        Self {
            failing: Some(measure),
            ..Self::default()
        }
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            frequencies: self,
            distances: self,
            scorer: self,
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn truncations(&self) -> usize {
        self.truncations.load(Ordering::Relaxed)
    }

    pub fn computes(&self) -> usize {
        self.computes.load(Ordering::Relaxed)
    }

    pub fn scores(&self) -> usize {
        self.scores.load(Ordering::Relaxed)
    }

    pub fn built_from(&self) -> Vec<PathBuf> {
        self.built_from
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Measures computed so far, with whether a reference table was supplied.
    pub fn references(&self) -> Vec<(DistanceMeasure, bool)> {
        self.references
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn sample_table(bias: f64) -> FrequencyTable {
    let features: Vec<String> = (0..10).map(|i| format!("w{i}")).collect();
    let rows = DOCUMENTS
        .iter()
        .enumerate()
        .map(|(doc, _)| {
            (0..10_u32)
                .map(|feature| {
                    let rank = f64::from(10 - feature);
                    let doc_weight = f64::from(u32::try_from(doc).expect("small index"));
                    (rank + doc_weight * 0.5 + bias) / 100.0
                })
                .collect()
        })
        .collect();
    FrequencyTable::new(
        DOCUMENTS.iter().map(|&name| name.to_owned()).collect(),
        features,
        rows,
    )
    .expect("sample table is well formed")
}

impl FrequencySource for FakeAnalysis {
    fn build(
        &self,
        corpus: &Path,
        case: CaseSensitivity,
    ) -> Result<FrequencyTable, AnalysisError> {
        self.builds.fetch_add(1, Ordering::Relaxed);
        self.built_from
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(corpus.to_path_buf());
        let bias = if case.is_insensitive() { 1.0 } else { 0.0 };
        Ok(sample_table(bias))
    }

    fn load_table(&self, _path: &Path) -> Result<FrequencyTable, AnalysisError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(sample_table(2.0))
    }

    fn truncate(
        &self,
        table: &FrequencyTable,
        words: usize,
    ) -> Result<FrequencyTable, AnalysisError> {
        self.truncations.fetch_add(1, Ordering::Relaxed);
        Ok(table.most_frequent(words))
    }
}

impl DistanceComputer for FakeAnalysis {
    fn compute(
        &self,
        table: &FrequencyTable,
        measure: DistanceMeasure,
        reference: Option<&FrequencyTable>,
    ) -> Result<DistanceTable, AnalysisError> {
        self.computes.fetch_add(1, Ordering::Relaxed);
        self.references
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((measure, reference.is_some()));
        if self.failing == Some(measure) {
            return Err(AnalysisError::new(
                AnalysisOperation::Distance,
                format!("{measure} cannot run on this input"),
            ));
        }
        let offset = match measure {
            DistanceMeasure::CosineEder => 0.0,
            DistanceMeasure::CosineBinary => 0.25,
            _ => 0.5,
        };
        let rows = table.rows();
        let values = rows
            .iter()
            .map(|left| {
                rows.iter()
                    .map(|right| {
                        let raw: f64 = left.iter().zip(right).map(|(a, b)| (a - b).abs()).sum();
                        if raw == 0.0 { 0.0 } else { raw + offset }
                    })
                    .collect()
            })
            .collect();
        DistanceTable::new(table.documents().to_vec(), values)
            .map_err(|err| AnalysisError::new(AnalysisOperation::Distance, err))
    }
}

impl ClusteringScorer for FakeAnalysis {
    fn score(&self, distances: &DistanceTable) -> Result<f64, AnalysisError> {
        self.scores.fetch_add(1, Ordering::Relaxed);
        Ok(distances.pairs().map(|(_, _, value)| value).sum())
    }
}
