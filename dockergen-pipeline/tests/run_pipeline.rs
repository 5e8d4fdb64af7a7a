//! End-to-end runs of the pipeline against temp directories and in-memory
//! streams.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use dockergen_core::BuildInfo;
use dockergen_pipeline::{
    run_with, PipelineError, RoutingError, RoutingSignals, RunRequest, Sink, ValidationScope,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const GO_TEMPLATE: &str = "\
FROM {{ BuilderImage }} AS builder
WORKDIR /src
COPY . .
RUN go build -o /out/{{ AppName }} {{ MainPackage }}

FROM {{ RuntimeImage }}
COPY --from=builder /out/{{ AppName }} /usr/local/bin/{{ AppName }}
ENTRYPOINT [\"/usr/local/bin/{{ AppName }}\"]";

const VALUES: &str = "\
appName: api
appVersion: 1.0.0
mainPackage: ./cmd/server
builderImage: golang:1.22
runtimeImage: alpine:3.19
";

struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new(templates: &[(&str, &str)]) -> Self {
        let root = TempDir::new().expect("tempdir");
        let tpl = root.path().join("templates");
        fs::create_dir(&tpl).unwrap();
        for (name, src) in templates {
            fs::write(tpl.join(name), src).unwrap();
        }
        fs::write(root.path().join("values.yaml"), VALUES).unwrap();
        Fixture { root }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    fn request(&self, templates: &[&str], signals: RoutingSignals, force: bool) -> RunRequest {
        RunRequest {
            template_dir: self.path("templates"),
            templates: templates.iter().map(|s| s.to_string()).collect(),
            signals,
            force,
            scope: ValidationScope::Section,
        }
    }
}

fn file_signals(data_file: &Path) -> RoutingSignals {
    RoutingSignals {
        data_file: Some(data_file.to_path_buf()),
        ..Default::default()
    }
}

fn build() -> BuildInfo {
    BuildInfo::new("0.1.0", "abc123")
}

fn run(req: &RunRequest, stdin: &str) -> (Result<dockergen_pipeline::RunReport, PipelineError>, Vec<u8>) {
    let mut input = Cursor::new(stdin.as_bytes().to_vec());
    let mut out = Vec::new();
    let result = run_with(req, &build(), &mut input, &mut out);
    (result, out)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn data_file_run_writes_dockerfile_next_to_values() {
    let fx = Fixture::new(&[("go.Dockerfile", GO_TEMPLATE)]);
    let req = fx.request(&["go"], file_signals(&fx.path("values.yaml")), false);

    let (result, out) = run(&req, "");
    let report = result.expect("run");

    let dockerfile = fx.path("Dockerfile");
    assert_eq!(report.written, vec![Sink::File(dockerfile.clone())]);
    assert!(out.is_empty(), "stdout is not a sink here");
    let written = fs::read_to_string(&dockerfile).unwrap();
    assert_eq!(written, report.artifact.text());
    assert!(written.starts_with("# Generated by dockergen version 0.1.0, build abc123\n# At: "));
    assert!(written.contains("RUN go build -o /out/api ./cmd/server\n"));
    assert!(written.ends_with("ENTRYPOINT [\"/usr/local/bin/api\"]\n"));
}

#[test]
fn piped_stdin_to_stdout_only() {
    let fx = Fixture::new(&[("go.Dockerfile", GO_TEMPLATE)]);
    let signals = RoutingSignals {
        stdin_redirected: true,
        stdout_redirected: true,
        ..Default::default()
    };
    let req = fx.request(&["go"], signals, false);

    let (result, out) = run(&req, VALUES);
    let report = result.expect("run");
    assert_eq!(report.written, vec![Sink::Stdout]);
    assert_eq!(out, report.artifact.text().as_bytes());
    assert!(!fx.path("Dockerfile").exists());
}

#[test]
fn piped_stdin_overrides_data_file() {
    let fx = Fixture::new(&[("app.Dockerfile", "FROM alpine\nRUN echo {{ AppName }}")]);
    let signals = RoutingSignals {
        data_file: Some(fx.path("values.yaml")),
        stdin_redirected: true,
        stdout_flag: true,
        ..Default::default()
    };
    let req = fx.request(&["app"], signals, false);

    let (result, out) = run(&req, "appName: from-stdin\n");
    result.expect("run");
    assert!(String::from_utf8(out).unwrap().contains("RUN echo from-stdin\n"));
}

#[test]
fn file_and_stdout_are_byte_identical() {
    let fx = Fixture::new(&[("go.Dockerfile", GO_TEMPLATE)]);
    let signals = RoutingSignals {
        data_file: Some(fx.path("values.yaml")),
        output_dir: Some(fx.path("out")),
        stdout_flag: true,
        ..Default::default()
    };
    let req = fx.request(&["go"], signals, false);

    let (result, out) = run(&req, "");
    let report = result.expect("run");
    assert_eq!(report.written.len(), 2);
    assert_eq!(fs::read(fx.path("out/Dockerfile")).unwrap(), out);
}

#[test]
fn missing_sink_fails_before_anything_is_written() {
    let fx = Fixture::new(&[("go.Dockerfile", GO_TEMPLATE)]);
    let signals = RoutingSignals {
        stdin_redirected: true,
        ..Default::default()
    };
    let req = fx.request(&["go"], signals, false);

    let (result, out) = run(&req, VALUES);
    let err = result.expect_err("no sink");
    assert!(matches!(err, PipelineError::Routing(RoutingError::OutputSink)), "got: {err}");
    assert!(out.is_empty());
    assert!(!fx.path("Dockerfile").exists());
    assert!(!fx.path("templates/Dockerfile").exists());
}

#[test]
fn validation_failure_writes_nothing() {
    let fx = Fixture::new(&[
        ("a.Dockerfile", "FROM alpine"),
        ("b.Dockerfile", "FROM alpine\nCOPY only-one-arg"),
    ]);
    let req = fx.request(&["a", "b"], file_signals(&fx.path("values.yaml")), false);

    let (result, _) = run(&req, "");
    let err = result.expect_err("invalid b");
    assert!(err.to_string().starts_with("failed to validate Dockerfile b, "), "got: {err}");
    assert!(!fx.path("Dockerfile").exists());
}

#[test]
fn force_writes_full_artifact_and_reports_one_warning() {
    let fx = Fixture::new(&[
        ("a.Dockerfile", "FROM alpine"),
        ("b.Dockerfile", "FROM alpine\nCOPY only-one-arg"),
    ]);
    let req = fx.request(&["a", "b"], file_signals(&fx.path("values.yaml")), true);

    let (result, _) = run(&req, "");
    let report = result.expect("forced run");
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].template, "b");
    let written = fs::read_to_string(fx.path("Dockerfile")).unwrap();
    assert_eq!(written.matches("# Generated by dockergen").count(), 2);
    assert!(written.contains("COPY only-one-arg\n"));
}

#[test]
fn unknown_template_names_the_request() {
    let fx = Fixture::new(&[("go.Dockerfile", GO_TEMPLATE)]);
    let req = fx.request(&["go", "./rust"], file_signals(&fx.path("values.yaml")), true);

    let (result, _) = run(&req, "");
    let err = result.expect_err("unknown template");
    assert_eq!(err.to_string(), "template ./rust not found");
    assert!(!fx.path("Dockerfile").exists());
}

#[test]
fn malformed_values_name_their_source() {
    let fx = Fixture::new(&[("go.Dockerfile", GO_TEMPLATE)]);
    fs::write(fx.path("values.yaml"), "appName: [unclosed\n").unwrap();
    let req = fx.request(&["go"], file_signals(&fx.path("values.yaml")), false);

    let (result, _) = run(&req, "");
    let err = result.expect_err("bad yaml");
    assert!(matches!(err, PipelineError::Decode(_)), "got: {err}");
    assert!(err.to_string().contains("values.yaml"), "got: {err}");
}

#[test]
fn empty_template_dir_is_a_load_error() {
    let fx = Fixture::new(&[]);
    let req = fx.request(&["go"], file_signals(&fx.path("values.yaml")), false);

    let (result, _) = run(&req, "");
    let err = result.expect_err("no templates");
    assert!(matches!(err, PipelineError::Load(_)), "got: {err}");
    let message = err.to_string();
    assert!(message.starts_with("failed to read template(s), no *.Dockerfile templates"), "got: {message}");
    assert_eq!(message.matches("failed to read template(s)").count(), 1, "got: {message}");
}
