//! dockergen core library — value model, build information, errors.
//!
//! - [`values`] — [`DockerfileValues`], decoded from a YAML data document
//! - [`build`] — [`BuildInfo`], the version/commit pair stamped into output
//! - [`error`] — [`DecodeError`]

pub mod build;
pub mod error;
pub mod values;

pub use build::BuildInfo;
pub use error::DecodeError;
pub use values::DockerfileValues;
