//! Error types for dockergen-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while decoding a values document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The data source could not be read.
    #[error("failed to read data from {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML, or is not a mapping of values.
    #[error("failed to unmarshal yaml from {source_name}: {source}")]
    Yaml {
        source_name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl DecodeError {
    /// Label of the data source the error refers to (a path or `<stdin>`).
    pub fn source_name(&self) -> &str {
        match self {
            DecodeError::Io { source_name, .. } | DecodeError::Yaml { source_name, .. } => {
                source_name
            }
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DecodeError {
    DecodeError::Io {
        source_name: path.into().display().to_string(),
        source,
    }
}
