//! One `dockergen run`: route, load, decode, render and validate each
//! requested template, then deliver.
//!
//! Nothing reaches a sink until every requested template has rendered and
//! passed validation (or had its failure downgraded by `force`).

use std::io::{Read, Write};
use std::ops::Range;
use std::path::PathBuf;

use dockergen_core::{BuildInfo, DockerfileValues};
use dockergen_dockerfile::ValidationError;
use dockergen_renderer::{Renderer, TemplateRegistry};

use crate::error::PipelineError;
use crate::routing::{self, DataSource, RoutingSignals};
use crate::writer::{self, Sink};

/// Label used for data read from stdin in error messages.
pub const STDIN_SOURCE: &str = "<stdin>";

// ---------------------------------------------------------------------------
// Request / report
// ---------------------------------------------------------------------------

/// What each validation pass looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationScope {
    /// Only the section just rendered.
    #[default]
    Section,
    /// Everything rendered so far, newest section included.
    Cumulative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub template_dir: PathBuf,
    /// Requested names, rendered in this order.
    pub templates: Vec<String>,
    pub signals: RoutingSignals,
    /// Downgrade validation failures to warnings.
    pub force: bool,
    pub scope: ValidationScope,
}

/// A validation failure that `force` let through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Name as requested on the command line.
    pub template: String,
    pub error: ValidationError,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to validate Dockerfile {}: {}",
            self.template, self.error
        )
    }
}

/// One rendered template inside an [`Artifact`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub template: String,
    range: Range<usize>,
}

/// Rendered sections concatenated in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifact {
    text: String,
    sections: Vec<Section>,
}

impl Artifact {
    /// Append a section and return its text.
    pub fn push(&mut self, template: impl Into<String>, section: &str) -> &str {
        let start = self.text.len();
        self.text.push_str(section);
        let range = start..self.text.len();
        self.sections.push(Section {
            template: template.into(),
            range: range.clone(),
        });
        &self.text[range]
    }

    /// The whole artifact, exactly as written to every sink.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_text(&self, section: &Section) -> &str {
        &self.text[section.range.clone()]
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub artifact: Artifact,
    pub warnings: Vec<ValidationWarning>,
    /// Sinks that received the artifact, in write order.
    pub written: Vec<Sink>,
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Run against the process's stdin and stdout.
pub fn run(request: &RunRequest, build: &BuildInfo) -> Result<RunReport, PipelineError> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_with(request, build, &mut stdin.lock(), &mut stdout.lock())
}

/// Run with explicit streams. `stdin` is only read when routing selects it;
/// `stdout` is only written when it is a sink.
pub fn run_with(
    request: &RunRequest,
    build: &BuildInfo,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
) -> Result<RunReport, PipelineError> {
    if request.templates.is_empty() {
        return Err(PipelineError::NoTemplates);
    }

    let decision = routing::resolve(&request.signals)?;
    tracing::debug!("routing: {:?}", decision);

    let registry = TemplateRegistry::load(&request.template_dir)?;
    let renderer = Renderer::new(registry, build.clone());

    let values = match &decision.source {
        DataSource::Stdin => DockerfileValues::from_reader(stdin, STDIN_SOURCE)?,
        DataSource::File(path) => DockerfileValues::load(path)?,
    };

    let (artifact, warnings) = render_all(&renderer, &values, request)?;

    let mut written = Vec::new();
    if let Some(dir) = &decision.sinks.output_dir {
        let path = writer::write_dockerfile(dir, artifact.text())?;
        written.push(Sink::File(path));
    }
    if decision.sinks.stdout {
        writer::write_stdout(stdout, artifact.text())?;
        written.push(Sink::Stdout);
    }

    Ok(RunReport {
        artifact,
        warnings,
        written,
    })
}

/// Render, append and validate every requested template in order.
pub fn render_all(
    renderer: &Renderer,
    values: &DockerfileValues,
    request: &RunRequest,
) -> Result<(Artifact, Vec<ValidationWarning>), PipelineError> {
    let mut artifact = Artifact::default();
    let mut warnings = Vec::new();

    for name in &request.templates {
        let section = renderer.render(name, values)?;
        artifact.push(name.as_str(), &section);
        let checked = match request.scope {
            ValidationScope::Section => section.as_str(),
            ValidationScope::Cumulative => artifact.text(),
        };

        match dockergen_dockerfile::validate(checked) {
            Ok(dockerfile) => {
                tracing::debug!("{}: valid, {} stage(s)", name, dockerfile.stages.len());
            }
            Err(error) if request.force => {
                tracing::debug!("{}: validation failed, continuing: {}", name, error);
                warnings.push(ValidationWarning {
                    template: name.clone(),
                    error,
                });
            }
            Err(source) => {
                return Err(PipelineError::Validation {
                    template: name.clone(),
                    source,
                })
            }
        }
    }

    Ok((artifact, warnings))
}
