//! Test harness for the yamlet parser against fixture files.
//!
//! Every `test/yaml/*.yaml` document is parsed and compared with the JSON
//! in `test/json/<name>.json`. Every `test/nay/*.yaml` document must fail
//! with the error kind named in `test/nay/<name>.error`.

use std::fs;
use std::path::{Path, PathBuf};

use libyamlet::{from_str, parse, parse_with_filename, ErrorKind, Value};
use serde::Deserialize;

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// Get all .yaml files from a subdirectory of test/.
fn fixtures(subdir: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(subdir).join("*.yaml");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    files
}

/// Read a sibling file of a fixture, found by stem in `subdir`.
fn companion(path: &Path, subdir: &str, ext: &str) -> String {
    let stem = path.file_stem().unwrap().to_string_lossy();
    let companion = test_root().join(subdir).join(format!("{}.{}", stem, ext));
    fs::read_to_string(&companion)
        .unwrap_or_else(|err| panic!("cannot read {}: {}", companion.display(), err))
}

fn error_kind_name(kind: ErrorKind) -> String {
    format!("{:?}", kind)
}

#[test]
fn test_yaml_fixtures() {
    let files = fixtures("yaml");
    assert!(!files.is_empty(), "no fixtures found");

    let mut failures = Vec::new();
    for path in &files {
        let source = fs::read_to_string(path).unwrap();
        let expected: Value = serde_json::from_str(&companion(path, "json", "json")).unwrap();
        match parse_with_filename(&source, Some(&path.to_string_lossy())) {
            Ok(actual) if actual == expected => {}
            Ok(actual) => failures.push(format!(
                "{}:\n  expected {}\n  actual   {}",
                path.display(),
                expected,
                actual
            )),
            Err(err) => failures.push(format!("{}: {}", path.display(), err)),
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn test_nay_fixtures() {
    let files = fixtures("nay");
    assert!(!files.is_empty(), "no fixtures found");

    let mut failures = Vec::new();
    for path in &files {
        let source = fs::read_to_string(path).unwrap();
        let expected = companion(path, "nay", "error").trim().to_string();
        match parse(&source) {
            Ok(value) => failures.push(format!(
                "{}: expected {}, parsed {}",
                path.display(),
                expected,
                value
            )),
            Err(err) if error_kind_name(err.kind) == expected => {
                assert!(err.line > 0, "{}: error has no line", path.display());
            }
            Err(err) => failures.push(format!(
                "{}: expected {}, got {:?} ({})",
                path.display(),
                expected,
                err.kind,
                err
            )),
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn test_map_order_follows_source() {
    let value = parse("zeta: 1\nalpha: 2\nmid: 3").unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"]);
}

#[test]
fn test_error_mentions_filename() {
    let err = parse_with_filename("ok: 1\nbad: 'x", Some("app.yaml")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnterminatedString);
    assert_eq!(err.line, 2);
    assert_eq!(err.line_text, "bad: 'x");
    assert_eq!(
        err.to_string(),
        "Unterminated string at line 2 of <app.yaml>: bad: 'x"
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Database {
    host: String,
    port: u16,
    replicas: Vec<String>,
    tls: bool,
}

#[test]
fn test_from_str() {
    let doc = "host: db.local\nport: 5432\nreplicas:\n  - r1\n  - r2\ntls: on\n";
    let db: Database = from_str(doc).unwrap();
    assert_eq!(
        db,
        Database {
            host: "db.local".into(),
            port: 5432,
            replicas: vec!["r1".into(), "r2".into()],
            tls: true,
        }
    );
}

#[test]
fn test_from_str_type_mismatch() {
    let err = from_str::<Database>("host: db.local\nport: many").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Deserialize);
    assert_eq!(err.line, 0);
}
