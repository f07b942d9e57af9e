mod common;

use std::{fs, path::Path};

use common::FakeAnalysis;
use deltasweep_core::{
    AlgorithmVariant, CaseSensitivity, CellOutcome, CellStatus, DistanceMeasure, FailurePolicy,
    SweepConfigBuilder, SweepController, SweepErrorCode, SweepReport, WordSpec,
};
use deltasweep_test_support::tracing::RecordingLayer;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[fixture]
fn workspace() -> TempDir {
    tempfile::tempdir().expect("temporary directory")
}

fn builder(root: &Path, words: &str) -> SweepConfigBuilder {
    SweepConfigBuilder::new(root.join("corpus")).with_word_spec(WordSpec::new(words))
}

fn run(fake: &FakeAnalysis, builder: SweepConfigBuilder) -> deltasweep_core::Result<SweepReport> {
    let config = builder.build()?;
    SweepController::new(config, fake.collaborators()).run()
}

fn read_artifacts(report: &SweepReport) -> Vec<Vec<u8>> {
    report
        .cells()
        .iter()
        .map(|cell| fs::read(cell.path()).expect("artifact readable"))
        .collect()
}

#[rstest]
fn full_run_computes_and_persists_every_cell(workspace: TempDir) -> TestResult {
    let fake = FakeAnalysis::new();
    let report = run(&fake, builder(workspace.path(), "2,4"))?;

    assert_eq!(report.cells().len(), 8);
    assert_eq!(fake.builds(), 2, "one table per case setting");
    assert_eq!(fake.truncations(), 4, "one truncation per word count and case");
    assert_eq!(fake.computes(), 8);
    assert_eq!(fake.scores(), 8);
    for cell in report.cells() {
        assert!(cell.path().is_file(), "{} must exist", cell.path().display());
        assert!(matches!(cell.outcome(), CellOutcome::Computed { .. }));
        assert_eq!(
            report.scores().status(cell.cell()),
            Some(CellStatus::Computed)
        );
    }
    assert_eq!(report.scores().pending_count(), 0);

    let summary = fs::read_to_string(report.summary_path())?;
    let mut lines = summary.lines();
    assert_eq!(
        lines.next(),
        Some("Algorithm,Words,Case Insensitive,Score,Status")
    );
    assert_eq!(lines.filter(|line| line.ends_with(",computed")).count(), 8);
    assert_eq!(
        report.summary_path(),
        workspace.path().join("corpus_deltas_scores.csv")
    );
    Ok(())
}

#[rstest]
fn summary_rows_are_grouped_by_algorithm(workspace: TempDir) -> TestResult {
    let fake = FakeAnalysis::new();
    let report = run(&fake, builder(workspace.path(), "2,4"))?;
    let summary = fs::read_to_string(report.summary_path())?;
    let keys: Vec<String> = summary
        .lines()
        .skip(1)
        .map(|line| line.split(',').take(3).collect::<Vec<_>>().join(","))
        .collect();
    assert_eq!(
        keys,
        [
            "Cosine_Eder,2,False",
            "Cosine_Eder,2,True",
            "Cosine_Eder,4,False",
            "Cosine_Eder,4,True",
            "Cosine_Binary,2,False",
            "Cosine_Binary,2,True",
            "Cosine_Binary,4,False",
            "Cosine_Binary,4,True",
        ]
    );
    Ok(())
}

#[rstest]
fn artifacts_are_named_after_their_cell(workspace: TempDir) -> TestResult {
    let fake = FakeAnalysis::new();
    let report = run(&fake, builder(workspace.path(), "50"))?;
    let output = workspace.path().join("corpus_deltas");
    let mut names: Vec<String> = fs::read_dir(&output)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    names.sort();
    assert_eq!(
        names,
        [
            "Cosine_Binary.0050.case_insensitive.csv",
            "Cosine_Binary.0050.case_sensitive.csv",
            "Cosine_Eder.0050.case_insensitive.csv",
            "Cosine_Eder.0050.case_sensitive.csv",
        ]
    );
    let first = report.cells().first().expect("four cells");
    let artifact = fs::read_to_string(first.path())?;
    assert!(artifact.starts_with(",austen_emma,austen_persuasion,bronte_jane,bronte_villette\n"));
    Ok(())
}

#[rstest]
fn existing_output_requires_a_policy(workspace: TempDir) -> TestResult {
    fs::create_dir(workspace.path().join("corpus_deltas"))?;
    let fake = FakeAnalysis::new();
    let err = run(&fake, builder(workspace.path(), "2")).expect_err("conflict must fail");
    assert_eq!(err.code(), SweepErrorCode::OutputExists);
    assert_eq!(fake.builds(), 0);
    assert!(!workspace.path().join("corpus_deltas_scores.csv").exists());
    Ok(())
}

#[rstest]
fn continue_skips_existing_artifacts_and_keeps_scores(workspace: TempDir) -> TestResult {
    let first = FakeAnalysis::new();
    let initial = run(&first, builder(workspace.path(), "2,4"))?;
    let before = read_artifacts(&initial);

    let second = FakeAnalysis::new();
    let resumed = run(&second, builder(workspace.path(), "2,4").with_resume(true))?;

    assert_eq!(second.computes(), 0);
    assert_eq!(second.scores(), 0);
    assert_eq!(read_artifacts(&resumed), before);
    for (old, new) in initial.cells().iter().zip(resumed.cells()) {
        assert_eq!(
            new.outcome(),
            &CellOutcome::Skipped { prior: old.score() }
        );
        assert_eq!(
            resumed.scores().status(new.cell()),
            Some(CellStatus::Skipped)
        );
    }
    let summary = fs::read_to_string(resumed.summary_path())?;
    assert!(summary.lines().skip(1).all(|line| !line.contains(",,")));
    Ok(())
}

#[rstest]
fn continue_recomputes_only_missing_artifacts(workspace: TempDir) -> TestResult {
    let fake = FakeAnalysis::new();
    let initial = run(&fake, builder(workspace.path(), "2,4"))?;
    let removed = initial.cells().get(5).expect("eight cells");
    fs::remove_file(removed.path())?;

    let second = FakeAnalysis::new();
    let resumed = run(&second, builder(workspace.path(), "2,4").with_resume(true))?;
    assert_eq!(second.computes(), 1);
    let recomputed = resumed.cells().get(5).expect("eight cells");
    assert_eq!(recomputed.cell(), removed.cell());
    assert!(matches!(recomputed.outcome(), CellOutcome::Computed { .. }));
    assert!(recomputed.path().is_file());
    Ok(())
}

#[rstest]
fn overwrite_recomputes_byte_identical_artifacts(workspace: TempDir) -> TestResult {
    let first = FakeAnalysis::new();
    let initial = run(&first, builder(workspace.path(), "3"))?;
    let before = read_artifacts(&initial);
    let summary_before = fs::read(initial.summary_path())?;

    let second = FakeAnalysis::new();
    let rerun = run(&second, builder(workspace.path(), "3").with_overwrite(true))?;
    assert_eq!(second.computes(), 4);
    assert_eq!(read_artifacts(&rerun), before);
    assert_eq!(fs::read(rerun.summary_path())?, summary_before);
    Ok(())
}

#[rstest]
fn abort_policy_stops_and_keeps_flushed_scores(workspace: TempDir) -> TestResult {
    let fake = FakeAnalysis::failing_on(DistanceMeasure::CosineBinary);
    let err = run(&fake, builder(workspace.path(), "2,4")).expect_err("failure must abort");
    assert_eq!(err.code(), SweepErrorCode::Cell);
    assert!(err.to_string().contains("Cosine_Binary/2/case_sensitive"));
    assert_eq!(fake.computes(), 3);

    let summary = fs::read_to_string(workspace.path().join("corpus_deltas_scores.csv"))?;
    let computed: Vec<&str> = summary
        .lines()
        .filter(|line| line.ends_with(",computed"))
        .collect();
    assert_eq!(computed.len(), 2);
    assert!(computed.iter().all(|line| line.starts_with("Cosine_Eder,2,")));
    assert_eq!(
        summary.lines().filter(|line| line.ends_with(",pending")).count(),
        6
    );
    Ok(())
}

#[rstest]
fn isolate_policy_marks_failures_and_continues(workspace: TempDir) -> TestResult {
    let fake = FakeAnalysis::failing_on(DistanceMeasure::CosineBinary);
    let report = run(
        &fake,
        builder(workspace.path(), "2,4").with_failure_policy(FailurePolicy::Isolate),
    )?;
    assert_eq!(fake.computes(), 8);
    assert_eq!(
        report.count_where(|outcome| matches!(outcome, CellOutcome::Failed { .. })),
        4
    );
    for cell in report.cells() {
        if cell.cell().variant().measure() == DistanceMeasure::CosineBinary {
            assert!(!cell.path().exists());
            assert_eq!(report.scores().get(cell.cell()), None);
            assert_eq!(report.scores().status(cell.cell()), Some(CellStatus::Failed));
        } else {
            assert!(cell.path().is_file());
        }
    }
    let summary = fs::read_to_string(report.summary_path())?;
    assert_eq!(
        summary.lines().filter(|line| line.ends_with(",,failed")).count(),
        4
    );
    Ok(())
}

#[rstest]
fn precomputed_table_sweeps_only_case_insensitive_cells(workspace: TempDir) -> TestResult {
    let fake = FakeAnalysis::new();
    let report = run(
        &fake,
        builder(workspace.path(), "2,4")
            .with_frequency_table(Some(workspace.path().join("table.txt"))),
    )?;
    assert_eq!(fake.loads(), 1);
    assert_eq!(fake.builds(), 0);
    assert_eq!(report.cells().len(), 4);
    assert!(
        report
            .cells()
            .iter()
            .all(|cell| cell.cell().case() == CaseSensitivity::Insensitive)
    );
    Ok(())
}

#[rstest]
#[case::self_reference(None, true, 1, 2)]
#[case::configured_reference(Some("reference"), true, 1, 4)]
#[case::configured_without_self_reference(Some("reference"), false, 1, 4)]
#[case::excluded(None, false, 0, 2)]
fn rotated_delta_resolves_its_reference(
    workspace: TempDir,
    #[case] reference: Option<&str>,
    #[case] self_reference: bool,
    #[case] rotated_cells: usize,
    #[case] builds: usize,
) -> TestResult {
    let fake = FakeAnalysis::new();
    let report = run(
        &fake,
        builder(workspace.path(), "5")
            .with_reference_dir(reference.map(|dir| workspace.path().join(dir)))
            .with_self_reference(self_reference)
            .with_variants([
                AlgorithmVariant::from(DistanceMeasure::Burrows),
                AlgorithmVariant::from(DistanceMeasure::RotatedDelta),
            ]),
    )?;
    assert_eq!(fake.builds(), builds);
    assert_eq!(report.excluded().len(), 1 - rotated_cells);
    let calls = fake.references();
    assert_eq!(calls.len(), 2 + 2 * rotated_cells);
    for (measure, had_reference) in calls {
        assert_eq!(had_reference, measure == DistanceMeasure::RotatedDelta);
    }
    if reference.is_some() {
        assert!(
            fake.built_from()
                .iter()
                .any(|path| path.ends_with("reference"))
        );
    }
    Ok(())
}

#[rstest]
fn empty_word_spec_writes_an_empty_summary(workspace: TempDir) -> TestResult {
    let fake = FakeAnalysis::new();
    let report = run(&fake, builder(workspace.path(), ""))?;
    assert!(report.cells().is_empty());
    assert_eq!(fake.builds(), 0);
    assert_eq!(
        fs::read_to_string(report.summary_path())?,
        "Algorithm,Words,Case Insensitive,Score,Status\n"
    );
    Ok(())
}

#[rstest]
fn sweep_emits_spans_and_progress_events(workspace: TempDir) -> TestResult {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let fake = FakeAnalysis::new();

    let report = tracing::subscriber::with_default(subscriber, || {
        run(&fake, builder(workspace.path(), "7"))
    })?;
    assert_eq!(report.cells().len(), 4);

    let run_span = layer.span("sweep.run").expect("sweep.run span must exist");
    assert_eq!(run_span.field("cells"), Some("4"));
    assert_eq!(run_span.field("policy"), Some("Abort"));
    assert!(layer.span("sweep.prepare").is_some());

    let cells = layer.spans_named("sweep.cell");
    assert_eq!(cells.len(), 4);
    let first = cells.first().expect("cell spans recorded");
    assert_eq!(first.field("algorithm"), Some("Cosine_Eder"));
    assert_eq!(first.field("words"), Some("7"));
    assert_eq!(first.field("case"), Some("case_sensitive"));

    let scored = layer.events_with_message("cell scored");
    assert_eq!(scored.len(), 4);
    assert!(scored.iter().all(|event| event.level == Level::INFO));
    assert_eq!(layer.events_with_message("sweep finished").len(), 1);
    Ok(())
}

#[rstest]
fn excluded_variants_are_logged(workspace: TempDir) -> TestResult {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let fake = FakeAnalysis::new();

    tracing::subscriber::with_default(subscriber, || {
        run(
            &fake,
            builder(workspace.path(), "7")
                .with_self_reference(false)
                .with_variants([
                    AlgorithmVariant::from(DistanceMeasure::CosineDelta),
                    AlgorithmVariant::from(DistanceMeasure::RotatedDelta),
                ]),
        )
    })?;

    let warnings: Vec<_> = layer
        .events()
        .into_iter()
        .filter(|event| event.level == Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    let warning = warnings.first().expect("one warning");
    assert_eq!(warning.field("variant"), Some("Rotated_Delta"));
    Ok(())
}
