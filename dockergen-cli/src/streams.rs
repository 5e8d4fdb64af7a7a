//! Redirection checks for stdin and stdout.
//!
//! A stream counts as redirected when it is neither a terminal nor a
//! character device, so `</dev/null` and `>/dev/null` look interactive while
//! pipes and regular files do not.

use std::io::IsTerminal;

pub fn stdin_redirected() -> bool {
    !std::io::stdin().is_terminal() && !is_char_device("/dev/stdin")
}

pub fn stdout_redirected() -> bool {
    !std::io::stdout().is_terminal() && !is_char_device("/dev/stdout")
}

#[cfg(unix)]
fn is_char_device(path: &str) -> bool {
    use std::os::unix::fs::FileTypeExt;

    std::fs::metadata(path)
        .map(|m| m.file_type().is_char_device())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_char_device(_path: &str) -> bool {
    false
}
