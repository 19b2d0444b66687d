//! End-to-end runs over a labeled directory tree and a predictions file.

use std::path::Path;

use curate_core::config::Config;
use curate_core::ranking::{Presort, Strategy};
use curate_core::report::{metrics_text, OrderWriter, OutputFormat};
use curate_core::source::{DirectoryLabels, PredictionSet};
use curate_core::ActiveLearningRun;

/// Lay out `<root>/<label>/<file>` and write matching predictions.
fn fixture(root: &Path) -> std::path::PathBuf {
    let cases: [(&str, &str, &str); 6] = [
        ("Cat", "c1.jpg", r#"{"cat": 0.9, "dog": 0.1}"#),
        ("Cat", "c2.jpg", r#"{"dog": 0.5, "cat": 0.45}"#),
        ("Cat", "c3.jpg", r#"{"cat": 0.6, "fox": 0.3}"#),
        ("Dog", "d1.jpg", r#"{"dog": 0.8, "cat": 0.2}"#),
        ("Dog", "d2.jpg", r#"{"cat": 0.55, "dog": 0.4}"#),
        ("Dog", "notes.txt", r#"{"dog": 1.0}"#),
    ];

    let mut lines = String::new();
    for (label, file, scores) in cases {
        let dir = root.join("data").join(label);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file);
        std::fs::write(&path, b"").unwrap();
        let item = serde_json::to_string(&path.to_string_lossy()).unwrap();
        lines.push_str(&format!("{{\"item\": {item}, \"scores\": {scores}}}\n"));
    }
    std::fs::create_dir_all(root.join("data").join("Empty_Label")).unwrap();

    let preds = root.join("predictions.jsonl");
    std::fs::write(&preds, lines).unwrap();
    preds
}

fn run_once(root: &Path, config: &Config) -> (String, String) {
    let preds = fixture(root);
    let labels = DirectoryLabels::scan(&root.join("data")).unwrap();
    let oracle = PredictionSet::load(&preds, &config.input).unwrap();
    let items: Vec<String> = labels.items().map(String::from).collect();

    let outcome = ActiveLearningRun::new(config, &oracle, Some(&labels))
        .unwrap()
        .run(items)
        .unwrap();

    let mut buffer = Vec::new();
    OrderWriter::new(&mut buffer, OutputFormat::Text, false)
        .write_order(&outcome.records)
        .unwrap();
    let metrics = metrics_text(outcome.metrics.as_ref().unwrap());
    (String::from_utf8(buffer).unwrap(), metrics)
}

#[test]
fn test_directory_corpus_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();
    let preds = fixture(dir.path());
    let labels = DirectoryLabels::scan(&dir.path().join("data")).unwrap();
    let oracle = PredictionSet::load(&preds, &config.input).unwrap();
    let items: Vec<String> = labels.items().map(String::from).collect();

    let outcome = ActiveLearningRun::new(&config, &oracle, Some(&labels))
        .unwrap()
        .run(items)
        .unwrap();

    // notes.txt is not a JPEG
    assert_eq!(outcome.stats.not_applicable, 1);
    assert_eq!(outcome.stats.evaluated, 5);

    let metrics = outcome.metrics.as_ref().unwrap();
    assert_eq!(metrics.total_items, 5);
    // cat, dog and the empty label directory
    assert_eq!(metrics.total_labels, 3);

    // cat: tp 2, fn 1, fp 1 (d2); dog: tp 1, fn 1, fp 1 (c2)
    let cat = &metrics.labels["cat"];
    assert!((cat.f_score - 2.0 / 3.0).abs() < 1e-9);
    let dog = &metrics.labels["dog"];
    assert!((dog.f_score - 0.5).abs() < 1e-9);
    assert_eq!(metrics.labels["empty label"].f_score, 0.0);

    let expected_micro = (2.0 / 3.0 * 3.0 + 0.5 * 2.0) / 5.0;
    let expected_macro = (2.0 / 3.0 + 0.5 + 0.0) / 3.0;
    assert!((metrics.micro_f - expected_micro).abs() < 1e-9);
    assert!((metrics.macro_f - expected_macro).abs() < 1e-9);

    // Least confident first: c2 (0.5), d2 (0.55), c3 (0.6), d1 (0.8), c1 (0.9)
    let order: Vec<&str> = outcome
        .order()
        .into_iter()
        .map(|p| Path::new(p).file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(order, ["c2.jpg", "d2.jpg", "c3.jpg", "d1.jpg", "c1.jpg"]);
}

#[test]
fn test_runs_are_deterministic() {
    let mut config = Config::default();
    config.prioritization.strategy = Strategy::LabelPairStratified;
    config.prioritization.presort = Presort::ClosestRatio;
    config.sampling.fraction = Some(0.7);
    config.sampling.seed = 11;

    let dir = tempfile::tempdir().unwrap();
    let first = run_once(dir.path(), &config);
    let second = run_once(dir.path(), &config);
    assert_eq!(first, second);
}

#[test]
fn test_every_strategy_orders_all_scored_items() {
    for strategy in [
        Strategy::LeastConfidentFirst,
        Strategy::ClosestRatioFirst,
        Strategy::LabelStratified,
        Strategy::LabelPairStratified,
    ] {
        let mut config = Config::default();
        config.prioritization.strategy = strategy;
        let dir = tempfile::tempdir().unwrap();
        let (order, _) = run_once(dir.path(), &config);
        assert_eq!(order.lines().count(), 5, "strategy {strategy}");
    }
}

#[test]
fn test_label_stratified_alternates_predicted_labels() {
    let mut config = Config::default();
    config.prioritization.strategy = Strategy::LabelStratified;
    let dir = tempfile::tempdir().unwrap();
    let preds = fixture(dir.path());
    let labels = DirectoryLabels::scan(&dir.path().join("data")).unwrap();
    let oracle = PredictionSet::load(&preds, &config.input).unwrap();
    let items: Vec<String> = labels.items().map(String::from).collect();

    let outcome = ActiveLearningRun::new(&config, &oracle, None)
        .unwrap()
        .run(items)
        .unwrap();

    // Predicted labels in input order: cat, dog, cat, dog, cat
    let predicted: Vec<&str> = outcome.records.iter().map(|r| r.top_label()).collect();
    assert_eq!(predicted, ["cat", "dog", "cat", "dog", "cat"]);
    assert!(outcome.metrics.is_none());
}
