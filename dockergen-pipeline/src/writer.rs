//! Sinks for the rendered artifact.
//!
//! ## `write_dockerfile` protocol
//!
//! 1. Create the output directory if needed.
//! 2. Write to `<dir>/.Dockerfile.dockergen.tmp`.
//! 3. Rename to `<dir>/Dockerfile` (atomic on POSIX).
//! 4. On rename failure remove the temp file; any existing `Dockerfile` is
//!    left untouched.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{io_err, PipelineError};

/// File name written inside the output directory.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

const TMP_NAME: &str = ".Dockerfile.dockergen.tmp";

/// Where an artifact was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    File(PathBuf),
    Stdout,
}

/// Atomically write `content` to `<dir>/Dockerfile` and return the path.
pub fn write_dockerfile(dir: &Path, content: &str) -> Result<PathBuf, PipelineError> {
    let path = dir.join(DOCKERFILE_NAME);
    let tmp = dir.join(TMP_NAME);
    write_with_tmp(&path, content, &tmp)?;
    Ok(path)
}

fn write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(())
}

/// Write `content` verbatim to `out` and flush.
pub fn write_stdout(out: &mut dyn Write, content: &str) -> Result<(), PipelineError> {
    out.write_all(content.as_bytes())
        .and_then(|_| out.flush())
        .map_err(PipelineError::Stdout)
}
