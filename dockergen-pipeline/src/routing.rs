//! Where data comes from and where output goes, decided from how the tool
//! was invoked.
//!
//! [`resolve`] is pure: stream detection happens in the CLI and arrives here
//! as booleans.
//!
//! | stdin piped | `-d` | `-o` | `-s` | stdout piped | source | sinks |
//! |---|---|---|---|---|---|---|
//! | yes | any | set | any | any | stdin | dir (+ stdout if `-s`/piped) |
//! | yes | any | unset | no | no | error | `OutputSink` |
//! | no | set | unset | no | no | file | file's dir |
//! | no | set | unset | any | yes | file | stdout |
//! | no | unset | any | any | any | error | `DataSource` |

use std::path::{Path, PathBuf};

use crate::error::RoutingError;

/// Facts about one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingSignals {
    pub data_file: Option<PathBuf>,
    pub stdin_redirected: bool,
    pub output_dir: Option<PathBuf>,
    /// `-s/--stdout` was passed.
    pub stdout_flag: bool,
    pub stdout_redirected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Stdin,
    File(PathBuf),
}

/// Every sink that receives the artifact. Both may be active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sinks {
    /// Directory that receives a file named `Dockerfile`.
    pub output_dir: Option<PathBuf>,
    pub stdout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    pub source: DataSource,
    pub sinks: Sinks,
}

fn non_empty(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}

/// Directory containing `file`; `.` for a bare file name.
pub fn parent_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Decide the data source and sinks.
pub fn resolve(signals: &RoutingSignals) -> Result<RoutingDecision, RoutingError> {
    let data_file = non_empty(&signals.data_file);
    let source = if signals.stdin_redirected {
        if let Some(file) = data_file {
            tracing::debug!("stdin is piped; ignoring data file {}", file.display());
        }
        DataSource::Stdin
    } else {
        match data_file {
            Some(file) => DataSource::File(file.to_path_buf()),
            None => return Err(RoutingError::DataSource),
        }
    };

    let stdout = signals.stdout_flag || signals.stdout_redirected;
    let output_dir = match (non_empty(&signals.output_dir), &source) {
        (Some(dir), _) => Some(dir.to_path_buf()),
        (None, DataSource::File(file)) if !signals.stdout_redirected => Some(parent_dir(file)),
        (None, _) => None,
    };

    if output_dir.is_none() && !stdout {
        return Err(RoutingError::OutputSink);
    }

    Ok(RoutingDecision {
        source,
        sinks: Sinks { output_dir, stdout },
    })
}
