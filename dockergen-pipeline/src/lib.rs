//! # dockergen-pipeline
//!
//! Routing, orchestration and output for one `dockergen run`.
//!
//! Build a [`RunRequest`] and call [`run`] (process streams) or [`run_with`]
//! (explicit streams). [`routing::resolve`] is exposed separately so callers
//! can check an invocation before doing any work.

pub mod error;
pub mod pipeline;
pub mod routing;
pub mod writer;

pub use error::{PipelineError, RoutingError};
pub use pipeline::{
    render_all, run, run_with, Artifact, RunReport, RunRequest, Section, ValidationScope,
    ValidationWarning, STDIN_SOURCE,
};
pub use routing::{DataSource, RoutingDecision, RoutingSignals, Sinks};
pub use writer::{write_dockerfile, write_stdout, Sink, DOCKERFILE_NAME};
