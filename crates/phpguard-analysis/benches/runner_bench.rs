//! Benchmark for a full rule run over generated controllers.
//!
//! Compares a cold run (fresh runner, every file parsed) with a warm run
//! (same runner, every lookup served by the AST cache).

use std::collections::BTreeMap;
use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use phpguard_analysis::RuleRunner;
use phpguard_core::EngineConfig;

fn controller(i: usize) -> String {
    format!(
        "<?php\n\
         namespace App\\Http\\Controllers;\n\n\
         use Illuminate\\Http\\Request;\n\
         use MongoDB\\Client;\n\n\
         class Item{i}Controller\n\
         {{\n\
             const pageSize = 20;\n\n\
             public function index()\n\
             {{\n\
                 return (new Client())->items->find();\n\
             }}\n\n\
             public function Store(Request $request)\n\
             {{\n\
                 dump($request);\n\
                 return $request->all();\n\
             }}\n\
         }}\n"
    )
}

fn runner() -> RuleRunner {
    let mut runner = RuleRunner::new(EngineConfig::default()).unwrap();
    let rules: Vec<String> = ["best_practices", "architecture", "style"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    runner.load_rules(&rules, &BTreeMap::new());
    runner
}

fn bench_runner(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<PathBuf> = (0..50)
        .map(|i| {
            let path = dir.path().join(format!("Item{i}Controller.php"));
            std::fs::write(&path, controller(i)).unwrap();
            path
        })
        .collect();

    c.bench_function("run_50_files_cold_cache", |b| {
        b.iter(|| {
            let runner = runner();
            black_box(runner.run(black_box(&files)))
        })
    });

    let warm = runner();
    warm.run(&files);
    c.bench_function("run_50_files_warm_cache", |b| {
        b.iter(|| black_box(warm.run(black_box(&files))))
    });
}

criterion_group!(benches, bench_runner);
criterion_main!(benches);
