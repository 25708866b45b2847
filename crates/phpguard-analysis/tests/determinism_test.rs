//! Same inputs, same rule set: same ordered violations, cached or not.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use phpguard_analysis::RuleRunner;
use phpguard_core::EngineConfig;

fn fixtures() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/php");
    [
        "MongoUserController.php",
        "PostController.php",
        "naming.php",
        "helpers.php",
        "broken.php",
        "Clean.php",
    ]
    .iter()
    .map(|f| dir.join(f))
    .collect()
}

fn loaded(config: EngineConfig) -> RuleRunner {
    let mut runner = RuleRunner::new(config).unwrap();
    let rules: Vec<String> = ["best_practices", "architecture", "style"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    runner.load_rules(&rules, &BTreeMap::new());
    runner
}

#[test]
fn three_independent_runs_are_identical() {
    let files = fixtures();
    let runs: Vec<_> = (0..3)
        .map(|_| loaded(EngineConfig::default()).run(&files))
        .collect();
    assert!(!runs[0].is_empty());
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[1], runs[2]);
}

#[test]
fn warm_cache_does_not_change_results() {
    let files = fixtures();
    let runner = loaded(EngineConfig::default());
    let cold = runner.run(&files);
    let warm = runner.run(&files);
    assert_eq!(cold, warm);
    assert!(runner.context().cache().stats().hits > 0);
}

#[test]
fn disabled_cache_gives_same_results() {
    let files = fixtures();
    let cached = loaded(EngineConfig::default()).run(&files);

    let mut config = EngineConfig::default();
    config.cache.enabled = Some(false);
    let uncached_runner = loaded(config);
    assert_eq!(uncached_runner.run(&files), cached);
    assert_eq!(uncached_runner.context().cache().stats().hits, 0);
}

#[test]
fn serialized_output_is_stable() {
    let files = fixtures();
    let a = serde_json::to_string(&loaded(EngineConfig::default()).run(&files)).unwrap();
    let b = serde_json::to_string(&loaded(EngineConfig::default()).run(&files)).unwrap();
    assert_eq!(a, b);
}
