//! File-backed decoding tests for `DockerfileValues`.
//!
//! Each case writes into its own temp directory.

use assert_fs::prelude::*;
use dockergen_core::{DecodeError, DockerfileValues};
use predicates::prelude::predicate;
use rstest::rstest;

// ---------------------------------------------------------------------------
// 1. Load from disk
// ---------------------------------------------------------------------------

#[test]
fn load_reads_values_from_file() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("values.yaml");
    file.write_str("appName: api\nmainPackage: ./cmd/server\n").expect("write");

    let values = DockerfileValues::load(file.path()).expect("load");
    assert_eq!(values.app_name, "api");
    assert_eq!(values.main_package, "./cmd/server");
}

#[test]
fn load_missing_file_reports_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let missing = dir.child("nope.yaml");
    missing.assert(predicate::path::missing());

    let err = DockerfileValues::load(missing.path()).unwrap_err();
    assert!(matches!(err, DecodeError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("nope.yaml"), "got: {err}");
}

#[test]
fn load_corrupt_yaml_reports_path_and_cause() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("values.yaml");
    file.write_str("appName: [unclosed\n").expect("write");

    let err = DockerfileValues::load(file.path()).unwrap_err();
    assert!(matches!(err, DecodeError::Yaml { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("values.yaml"), "must contain file path, got: {msg}");
}

// ---------------------------------------------------------------------------
// 2. Permissive decoding
// ---------------------------------------------------------------------------

#[rstest]
#[case("appName: api\n", "api", "")]
#[case("appName: api\nappVersion: \"1.10\"\n", "api", "1.10")]
#[case("appVersion: v2\nunknownKey: 42\n", "", "v2")]
#[case("# nothing set\n", "", "")]
fn partial_documents_decode(#[case] doc: &str, #[case] name: &str, #[case] version: &str) {
    let values = DockerfileValues::from_yaml_str(doc, "values.yaml").expect("decode");
    assert_eq!(values.app_name, name);
    assert_eq!(values.app_version, version);
    assert!(values.builder_image.is_empty());
}

#[rstest]
#[case("- a\n- b\n")]
#[case("just a string\n")]
#[case("appName: {nested: map}\n")]
fn malformed_documents_fail(#[case] doc: &str) {
    let err = DockerfileValues::from_yaml_str(doc, "<stdin>").unwrap_err();
    assert_eq!(err.source_name(), "<stdin>");
}
