//! Error types for dockergen-pipeline.

use std::path::PathBuf;

use thiserror::Error;

use dockergen_core::DecodeError;
use dockergen_dockerfile::ValidationError;
use dockergen_renderer::{LoadError, RenderError};

/// The invocation does not say where data comes from or where output goes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("data-file is required, or data must be piped through stdin")]
    DataSource,

    #[error("output-dir is required if data is piped in and it's not piped out")]
    OutputSink,
}

/// All errors that can end a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("no template names given")]
    NoTemplates,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// A rendered section failed validation and `force` was not set.
    #[error("failed to validate Dockerfile {template}, {source}")]
    Validation {
        template: String,
        #[source]
        source: ValidationError,
    },

    #[error("failed to write Dockerfile to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}

/// Convenience constructor for [`PipelineError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.into(),
        source,
    }
}
