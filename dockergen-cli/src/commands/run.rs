//! `dockergen run` — render, validate and write the requested templates.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use dockergen_core::BuildInfo;
use dockergen_pipeline::{pipeline, RoutingSignals, RunRequest, Sink, ValidationScope};

use crate::streams;

/// Arguments for `dockergen run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory containing `*.Dockerfile` templates.
    #[arg(short = 't', long, env = "DOCKERGEN_TEMPLATE_DIR")]
    pub template_dir: PathBuf,

    /// YAML file with template values (ignored when values are piped in).
    #[arg(short = 'd', long, env = "DOCKERGEN_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Directory to write the rendered Dockerfile to. Defaults to the data
    /// file's directory unless output is piped elsewhere.
    #[arg(short = 'o', long, env = "DOCKERGEN_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write the rendered Dockerfile to stdout.
    #[arg(short = 's', long)]
    pub stdout: bool,

    /// Write output even if validation fails; failures become warnings.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Validate everything rendered so far after each template, instead of
    /// only the newest section.
    #[arg(long)]
    pub validate_cumulative: bool,

    /// Template names, with or without the `.Dockerfile` suffix.
    #[arg(required = true, value_name = "TEMPLATE")]
    pub templates: Vec<String>,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let signals = RoutingSignals {
            data_file: self.data_file,
            stdin_redirected: streams::stdin_redirected(),
            output_dir: self.output_dir,
            stdout_flag: self.stdout,
            stdout_redirected: streams::stdout_redirected(),
        };
        let scope = if self.validate_cumulative {
            ValidationScope::Cumulative
        } else {
            ValidationScope::Section
        };
        let request = RunRequest {
            template_dir: self.template_dir,
            templates: self.templates,
            signals,
            force: self.force,
            scope,
        };

        let report = pipeline::run(&request, &BuildInfo::current())
            .with_context(|| format!("dockergen run {} failed", request.templates.join(" ")))?;

        for warning in &report.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        for sink in &report.written {
            if let Sink::File(path) = sink {
                tracing::info!("wrote {}", path.display());
            }
        }
        Ok(())
    }
}
