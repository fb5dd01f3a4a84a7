use std::fs;
use std::path::Path;

use revdrift::{
    run_pipeline, EngineConfig, RevdriftConfig, SimilarityRecord, SketchSize,
};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn words(range: std::ops::Range<usize>) -> String {
    range.map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
}

/// Austin_TX: current plus two older versions.
/// Boise_ID: labels in another naming scheme, so no versions are recognized.
/// Cary_NC: no bare marker, offset 0 is the reference.
/// Dover_DE: nested directory left behind by extraction.
fn corpus() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "Austin_TX/Austin_TX_C.txt", &words(0..40));
    write(root, "Austin_TX/Austin_TX_C-1.txt", &words(0..40));
    write(root, "Austin_TX/Austin_TX_C-2.txt", &words(20..60));
    write(root, "Austin_TX/README.md", "not a version");
    write(root, "Boise_ID/Boise_ID_current.txt", &words(0..10));
    write(root, "Boise_ID/Boise_ID_old-5.txt", &words(0..10));
    write(root, "Cary_NC/Cary_NC_C-0.txt", &words(0..30));
    write(root, "Cary_NC/Cary_NC_C-3.txt", &words(100..130));
    write(root, "Dover_DE/Dover_DE/Dover_DE_C.txt", &words(0..12));
    write(root, "Dover_DE/Dover_DE/Dover_DE_C-4.txt", &words(0..12));
    tmp
}

fn config(root: &Path, out: &Path) -> RevdriftConfig {
    let mut config = RevdriftConfig {
        engine: EngineConfig::new()
            .with_shingle_widths([3, 5])
            .with_sketch_sizes([SketchSize::Bounded(4), SketchSize::Unbounded])
            .with_batch_size(2)
            .with_workers(2),
        ..RevdriftConfig::default()
    };
    config.corpus.root = Some(root.to_path_buf());
    config.output.records = Some(out.join("records.jsonl"));
    config.output.skipped = Some(out.join("logs/skipped.log"));
    config
}

fn read_records(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn directory_run_writes_records_and_skip_list() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();
    let config = config(corpus.path(), out.path());

    let report = run_pipeline(&config).unwrap();

    // Austin 2 others, Cary 1, Dover 1; each over 2 widths and 2 sizes.
    assert_eq!(report.records.len(), (2 + 1 + 1) * 4);
    assert_eq!(report.skipped_entities(), vec!["Boise_ID"]);
    assert!(report.failures.is_empty());
    assert_eq!(report.batches, 2);

    let rows = read_records(&out.path().join("records.jsonl"));
    assert_eq!(rows.len(), report.records.len());
    assert_eq!(rows[0]["entity"], "Austin_TX");
    assert_eq!(rows[0]["referenceVersion"], "C");

    let skipped = fs::read_to_string(out.path().join("logs/skipped.log")).unwrap();
    let lines: Vec<&str> = skipped.lines().collect();
    assert_eq!(lines[0], revdrift::output::SKIP_LIST_HEADER);
    assert_eq!(&lines[1..], ["Boise_ID\tno_versions"]);
}

#[test]
fn identical_and_disjoint_versions_score_extremes() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();
    let report = run_pipeline(&config(corpus.path(), out.path())).unwrap();

    let austin_c1: Vec<&SimilarityRecord> = report
        .records_for("Austin_TX")
        .filter(|r| r.other_version.as_str() == "C-1")
        .collect();
    assert_eq!(austin_c1.len(), 4);
    assert!(austin_c1.iter().all(|r| r.jaccard_value == 1.0));

    let cary: Vec<&SimilarityRecord> = report.records_for("Cary_NC").collect();
    assert!(cary.iter().all(|r| r.reference_version.as_str() == "C-0"));
    assert!(cary.iter().all(|r| r.jaccard_value == 0.0));

    let dover: Vec<&SimilarityRecord> = report.records_for("Dover_DE").collect();
    assert_eq!(dover.len(), 4);
    assert!(dover.iter().all(|r| r.jaccard_value == 1.0));
}

#[test]
fn partial_overlap_is_strictly_between_bounds() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();
    let report = run_pipeline(&config(corpus.path(), out.path())).unwrap();

    // C and C-2 share words 20..40.
    let exact = report
        .records_for("Austin_TX")
        .find(|r| {
            r.other_version.as_str() == "C-2"
                && r.shingle_width == 3
                && r.sketch_size == SketchSize::Unbounded
        })
        .unwrap();
    // 18 shared shingles out of 38 + 38 - 18 distinct.
    assert!((exact.jaccard_value - 18.0 / 58.0).abs() < 1e-12);
}

#[test]
fn yaml_config_drives_a_run() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();
    let yaml = format!(
        r#"
version: "1"
engine:
  shingle_widths: [3]
  sketch_sizes: [-1]
  batch_size: 1
  workers: 1
corpus:
  root: {}
output:
  records: {}
"#,
        corpus.path().display(),
        out.path().join("r.jsonl").display()
    );
    let config = RevdriftConfig::from_yaml(&yaml).unwrap();
    let report = run_pipeline(&config).unwrap();
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.batches, 4);
    assert_eq!(read_records(&out.path().join("r.jsonl")).len(), 4);
}
