//! Error types for dockergen-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading the template directory.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Filesystem error while reading the directory or a template file.
    #[error("failed to read template(s) at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template failed to parse.
    #[error("failed to read template(s), {message}")]
    Parse { message: String },

    /// The directory holds no `*.Dockerfile` file.
    #[error("failed to read template(s), no *.Dockerfile templates in {dir}")]
    NoTemplates { dir: PathBuf },
}

/// Errors from rendering one requested template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested template is not in the registry. Carries the name as the
    /// caller wrote it, before suffix normalisation.
    #[error("template {requested} not found")]
    NotFound { requested: String },

    /// The template failed while executing against the values.
    #[error("failed to render template {template}: {message}")]
    Execution { template: String, message: String },

    /// The values could not be turned into a template context.
    #[error("context serialization error: {message}")]
    Context { message: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.into(),
        source,
    }
}

/// Flatten a Tera error and its cause chain into one line.
///
/// Tera's top-level message only names the template; the useful part
/// (undefined variable, unknown filter, ...) lives in the sources.
pub(crate) fn describe(err: &tera::Error) -> String {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
