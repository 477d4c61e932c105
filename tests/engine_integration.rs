//! End-to-end tests running the engine over fixture repositories.

use std::fs;
use std::path::PathBuf;

use repo_analyzer::engine::{Engine, EngineOptions};
use repo_analyzer::graph::minimal_rotation;
use repo_analyzer::{analyze_path, AnalyzeError, HistoricalBaseline, MetricsResult, Severity};
use tempfile::TempDir;

fn testdata_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

#[test]
fn test_python_ring_reports_one_cycle() {
    let report = analyze_path(&testdata_path("ring"), EngineOptions::default())
        .expect("ring should analyse");

    assert_eq!(report.files.len(), 3);
    assert_eq!(report.graph.cycles.len(), 1, "cycles: {:?}", report.graph.cycles);
    assert_eq!(
        minimal_rotation(&report.graph.cycles[0]),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
    assert_eq!(report.graph.external_packages(), vec!["os"]);
    assert!(report
        .metrics
        .recommendations
        .iter()
        .any(|r| r.contains("circular")));

    let start = report.files[0]
        .functions
        .iter()
        .find(|f| f.name == "start")
        .expect("start function");
    assert_eq!(start.cyclomatic_complexity, 3);
    assert!(start.cognitive_complexity >= start.cyclomatic_complexity);
}

#[test]
fn test_mixed_repository() {
    let report = analyze_path(&testdata_path("mixed"), EngineOptions::default())
        .expect("mixed should analyse");

    let paths: Vec<&str> = report.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "cmd/server/main.go",
            "lib/com/acme/Greeter.java",
            "native/mathx.c",
            "native/mathx.h",
            "src/lib.rs",
            "src/parser.rs",
            "web/app.js",
            "web/util.js",
        ]
    );
    assert_eq!(report.unsupported_files, 1);
    assert_eq!(report.unreadable_files, 0);
    assert_eq!(report.structure.unsupported_files, 1);
    assert_eq!(report.structure.languages.len(), 5);

    // Source order inside a file.
    let java = &report.files[1];
    let names: Vec<&str> = java.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Greeter", "greet"]);
    assert_eq!(java.types[0].name, "Greeter");

    let graph = &report.graph;
    assert_eq!(graph.dependencies_of("web/app"), vec!["web/util", "fs"]);
    assert!(graph.dependencies_of("crate").contains(&"crate::parser"));
    assert!(graph.dependencies_of("native/mathx.c").contains(&"native/mathx.h"));
    let externals = graph.external_packages();
    for name in ["fmt", "fs", "os", "std", "stdlib.h"] {
        assert!(externals.contains(&name), "missing external {}", name);
    }
    assert!(!graph.has_cycles());

    for file in &report.files {
        for import in &file.imports {
            assert_eq!(import.source_module, file.module);
        }
        for unit in &file.functions {
            assert!(unit.start_line <= unit.end_line);
            assert!(unit.cognitive_complexity >= unit.cyclomatic_complexity);
        }
    }

    let metrics = &report.metrics;
    assert!((0.0..=100.0).contains(&metrics.maintainability_index));
    assert!((0.0..=1.0).contains(&metrics.technical_debt_ratio));
    assert!((0.0..=10.0).contains(&metrics.overall_score));
}

#[test]
fn test_include_tests_option() {
    let mut options = EngineOptions::default();
    options.discovery.include_tests = true;
    let report = analyze_path(&testdata_path("mixed"), options).expect("mixed should analyse");
    assert!(report.files.iter().any(|f| f.path == "tests/smoke.rs"));
}

#[test]
fn test_unbalanced_input_degrades() {
    let report = analyze_path(&testdata_path("unbalanced"), EngineOptions::default())
        .expect("malformed input is not fatal");
    let file = &report.files[0];
    assert!(!file.functions.is_empty());
    assert!(file
        .issues
        .iter()
        .any(|i| i.severity == Severity::Warning && i.message.contains("unclosed")));
    assert!(report.metrics.technical_debt_ratio > 0.0);
}

#[test]
fn test_baseline_regression_from_saved_file() {
    let dir = TempDir::new().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let strong = HistoricalBaseline::new(
        "main@abc123",
        MetricsResult {
            overall_score: 10.0,
            ..Default::default()
        },
    );
    fs::write(&baseline_path, strong.to_json().unwrap()).unwrap();
    let baseline = HistoricalBaseline::from_file(&baseline_path).unwrap();

    // Complexity threshold 1 flags every branching function.
    let options = EngineOptions {
        complexity_threshold: 1,
        ..Default::default()
    };
    let report = Engine::new(options)
        .analyze_path(&testdata_path("ring"), Some(&baseline))
        .unwrap();

    assert!(report.metrics.has_regression);
    assert_eq!(report.baseline_reference.as_deref(), Some("main@abc123"));
    assert!(report
        .metrics
        .recommendations
        .last()
        .map_or(false, |r| r.contains("main@abc123")));
}

#[test]
fn test_empty_repository() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "nothing to see").unwrap();
    let report = analyze_path(dir.path(), EngineOptions::default()).unwrap();
    assert!(report.files.is_empty());
    assert_eq!(report.metrics.average_complexity, 0.0);
    assert_eq!(report.metrics.technical_debt_ratio, 0.0);
    assert!(!report.metrics.has_regression);
}

#[cfg(unix)]
#[test]
fn test_no_readable_files_is_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locked.py");
    fs::write(&path, "x = 1\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; only assert when the permission took effect.
    if fs::read(&path).is_ok() {
        return;
    }
    let err = analyze_path(dir.path(), EngineOptions::default()).unwrap_err();
    assert!(matches!(err, AnalyzeError::NoReadableFiles { attempted: 1 }));
}

#[test]
fn test_runs_are_deterministic() {
    let first = analyze_path(&testdata_path("mixed"), EngineOptions::default()).unwrap();
    let mut options = EngineOptions::default();
    options.parallelism = Some(1);
    let second = analyze_path(&testdata_path("mixed"), options).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
