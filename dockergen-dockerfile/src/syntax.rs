//! Stage one: Dockerfile text → syntax nodes.
//!
//! One [`Node`] per logical line. A logical line is a physical line plus any
//! lines joined to it by a trailing escape character, plus the bodies of any
//! heredocs it opens. Comments and blank lines are dropped, including those
//! in the middle of a continuation.
//!
//! Parser directives (`# escape=`, `# syntax=`, `# check=`) are recognised
//! only at the very top of the file, before any blank line, other comment or
//! instruction.

use crate::error::{parse_err, ParseError};

pub const DEFAULT_ESCAPE: char = '\\';

// ---------------------------------------------------------------------------
// Syntax types
// ---------------------------------------------------------------------------

/// Parser directives found at the top of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directives {
    pub escape: char,
    pub syntax: Option<String>,
    pub check: Option<String>,
}

impl Default for Directives {
    fn default() -> Self {
        Directives {
            escape: DEFAULT_ESCAPE,
            syntax: None,
            check: None,
        }
    }
}

/// A leading `--name[=value]` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub name: String,
    pub value: Option<String>,
}

/// Heredoc body attached to a `RUN`, `COPY` or `ADD` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heredoc {
    pub name: String,
    pub content: String,
    /// `<<-EOF`: leading tabs are stripped from body and terminator.
    pub chomp: bool,
    /// False when the delimiter was quoted, which disables expansion.
    pub expand: bool,
}

/// Arguments after the keyword and flags, split the way the keyword expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    /// JSON array form: `["a", "b"]`.
    Exec(Vec<String>),
    /// Raw text, kept verbatim (shell form, or single-string instructions).
    Shell(String),
    /// Whitespace-separated words with quotes and escapes removed.
    Words(Vec<String>),
    /// The trigger of an `ONBUILD`.
    OnBuild(Box<Node>),
}

impl Args {
    pub fn is_empty(&self) -> bool {
        match self {
            Args::Exec(v) | Args::Words(v) => v.is_empty(),
            Args::Shell(s) => s.trim().is_empty(),
            Args::OnBuild(_) => false,
        }
    }
}

/// One logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// 1-based line of the keyword.
    pub line: usize,
    /// 1-based last physical line consumed, heredoc bodies included.
    pub end_line: usize,
    /// Keyword, lower-cased.
    pub keyword: String,
    pub flags: Vec<Flag>,
    pub args: Args,
    pub heredocs: Vec<Heredoc>,
    /// The logical line with continuations joined.
    pub original: String,
}

/// Output of [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub directives: Directives,
    pub nodes: Vec<Node>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse Dockerfile text into a [`SyntaxTree`].
pub fn parse(text: &str) -> Result<SyntaxTree, ParseError> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    let (directives, mut i) = parse_directives(&lines)?;
    let escape = directives.escape;
    let mut nodes = Vec::new();

    while i < lines.len() {
        let line_no = i + 1;
        let raw = lines[i];
        i += 1;
        if is_blank_or_comment(raw) {
            continue;
        }

        let (chunk, mut continued) = strip_continuation(raw, escape);
        let mut logical = chunk.to_owned();
        while continued {
            let Some(next) = lines.get(i) else {
                return Err(parse_err(
                    line_no,
                    "unexpected end of file: line continuation is not followed by a line",
                ));
            };
            i += 1;
            if is_blank_or_comment(next) {
                continue;
            }
            let (chunk, more) = strip_continuation(next, escape);
            logical.push_str(chunk);
            continued = more;
        }

        if logical.trim().is_empty() {
            continue;
        }
        let mut node = parse_line(&logical, line_no, escape)?;
        if matches!(node.keyword.as_str(), "run" | "copy" | "add") {
            for (name, chomp, expand) in heredoc_markers(&logical, escape) {
                let (content, next_i) = read_heredoc(&lines, i, &name, chomp)
                    .ok_or_else(|| parse_err(line_no, format!("unterminated heredoc {name}")))?;
                i = next_i;
                node.heredocs.push(Heredoc {
                    name,
                    content,
                    chomp,
                    expand,
                });
            }
        }
        node.end_line = i.max(line_no);
        nodes.push(node);
    }

    if nodes.is_empty() {
        return Err(parse_err(lines.len().max(1), "file with no instructions"));
    }
    Ok(SyntaxTree { directives, nodes })
}

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

fn parse_directives(lines: &[&str]) -> Result<(Directives, usize), ParseError> {
    let mut directives = Directives::default();
    let mut seen: Vec<String> = Vec::new();
    let mut i = 0;
    while let Some(line) = lines.get(i) {
        let Some((key, value)) = directive(line) else {
            break;
        };
        if seen.contains(&key) {
            return Err(parse_err(
                i + 1,
                format!("only one {key} parser directive can be used"),
            ));
        }
        match key.as_str() {
            "escape" => {
                directives.escape = match value.as_str() {
                    "\\" => '\\',
                    "`" => '`',
                    other => {
                        return Err(parse_err(
                            i + 1,
                            format!("invalid escape token '{other}' does not match ` or \\"),
                        ))
                    }
                };
            }
            "syntax" => directives.syntax = Some(value),
            "check" => directives.check = Some(value),
            _ => break,
        }
        seen.push(key);
        i += 1;
    }
    Ok((directives, i))
}

/// `# key=value` → `(key, value)` with the key lower-cased.
fn directive(line: &str) -> Option<(String, String)> {
    let body = line.trim().strip_prefix('#')?.trim_start();
    let (key, value) = body.split_once('=')?;
    let key = key.trim_end();
    let mut chars = key.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() || !chars.all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((key.to_ascii_lowercase(), value.to_owned()))
}

// ---------------------------------------------------------------------------
// Physical line helpers
// ---------------------------------------------------------------------------

fn is_blank_or_comment(line: &str) -> bool {
    let t = line.trim_start();
    t.is_empty() || t.starts_with('#')
}

/// Strip a trailing escape character. Returns the remaining text and whether
/// the line continues.
fn strip_continuation(line: &str, escape: char) -> (&str, bool) {
    let trimmed = line.trim_end();
    match trimmed.strip_suffix(escape) {
        Some(rest) => (rest, true),
        None => (line, false),
    }
}

/// Heredoc openers on a line, in order: `(name, chomp, expand)`.
///
/// Only a shell word that begins with `<<` opens a heredoc; `<<` inside
/// quotes, after an escape or in the middle of a word is plain text.
fn heredoc_markers(line: &str, escape: char) -> Vec<(String, bool, bool)> {
    raw_words(line, escape)
        .iter()
        .filter_map(|word| heredoc_marker(word))
        .collect()
}

/// `<<NAME`, `<<-NAME`, `<<"NAME"` or `<<'NAME'` at the start of `word`.
fn heredoc_marker(word: &str) -> Option<(String, bool, bool)> {
    let rest = word.strip_prefix("<<")?;
    // `<<<` is a here-string
    if rest.starts_with('<') {
        return None;
    }
    let (chomp, rest) = match rest.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, rest),
    };
    let (quote, rest) = match rest.chars().next() {
        Some(q @ ('"' | '\'')) => (Some(q), &rest[1..]),
        _ => (None, rest),
    };
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return None;
    }
    if let Some(q) = quote {
        if !rest[end..].starts_with(q) {
            return None;
        }
    }
    Some((name.to_owned(), chomp, quote.is_none()))
}

/// Split on unquoted whitespace, keeping quotes and escape characters in the
/// words. An unterminated quote runs to the end of the line.
fn raw_words(text: &str, escape: char) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some('"') if c == escape => {
                current.push(c);
                if let Some(n) = chars.next() {
                    current.push(n);
                }
            }
            Some(_) => current.push(c),
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            None => {
                current.push(c);
                if c == '"' || c == '\'' {
                    quote = Some(c);
                } else if c == escape {
                    if let Some(n) = chars.next() {
                        current.push(n);
                    }
                }
            }
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Collect heredoc body lines starting at `start` up to the `name` terminator.
/// Returns the body and the index of the line after the terminator.
fn read_heredoc(lines: &[&str], start: usize, name: &str, chomp: bool) -> Option<(String, usize)> {
    let mut content = String::new();
    for (offset, line) in lines[start.min(lines.len())..].iter().enumerate() {
        let candidate = if chomp { line.trim_start_matches('\t') } else { line };
        if candidate == name {
            return Some((content, start + offset + 1));
        }
        content.push_str(candidate);
        content.push('\n');
    }
    None
}

// ---------------------------------------------------------------------------
// Logical line → Node
// ---------------------------------------------------------------------------

fn parse_line(logical: &str, line: usize, escape: char) -> Result<Node, ParseError> {
    let text = logical.trim();
    let (keyword, rest) = match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], text[pos..].trim_start()),
        None => (text, ""),
    };
    if keyword.is_empty() || !keyword.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(parse_err(
            line,
            format!("dockerfile line has no instruction: {text}"),
        ));
    }
    let keyword = keyword.to_ascii_lowercase();

    let (flags, rest) = if keyword == "onbuild" {
        (Vec::new(), rest)
    } else {
        extract_flags(rest)
    };

    let args = match keyword.as_str() {
        "run" | "cmd" | "entrypoint" | "shell" => maybe_json(rest),
        "copy" | "add" | "volume" => match parse_json_array(rest) {
            Some(list) => Args::Exec(list),
            None => Args::Words(words_at(rest, escape, line)?),
        },
        "from" | "arg" | "env" | "label" | "expose" => Args::Words(words_at(rest, escape, line)?),
        "onbuild" => {
            if rest.is_empty() {
                Args::Shell(String::new())
            } else {
                Args::OnBuild(Box::new(parse_line(rest, line, escape)?))
            }
        }
        // workdir, user, stopsignal, maintainer, healthcheck and unknown
        // keywords keep their raw text.
        _ => Args::Shell(rest.to_owned()),
    };

    Ok(Node {
        line,
        end_line: line,
        keyword,
        flags,
        args,
        heredocs: Vec::new(),
        original: logical.to_owned(),
    })
}

/// Split leading `--flag[=value]` tokens off `rest`. A bare `--` ends the flags.
fn extract_flags(mut rest: &str) -> (Vec<Flag>, &str) {
    let mut flags = Vec::new();
    loop {
        rest = rest.trim_start();
        if !rest.starts_with("--") {
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[2..end];
        rest = &rest[end..];
        if token.is_empty() {
            break;
        }
        let flag = match token.split_once('=') {
            Some((name, value)) => Flag {
                name: name.to_ascii_lowercase(),
                value: Some(value.to_owned()),
            },
            None => Flag {
                name: token.to_ascii_lowercase(),
                value: None,
            },
        };
        flags.push(flag);
    }
    (flags, rest.trim_start())
}

/// JSON array of strings, or `None` when `text` is not one.
pub(crate) fn parse_json_array(text: &str) -> Option<Vec<String>> {
    let text = text.trim();
    if !text.starts_with('[') {
        return None;
    }
    serde_json::from_str::<Vec<String>>(text).ok()
}

/// Exec form when `text` is a JSON string array, shell form otherwise.
pub(crate) fn maybe_json(text: &str) -> Args {
    match parse_json_array(text) {
        Some(list) => Args::Exec(list),
        None => Args::Shell(text.trim().to_owned()),
    }
}

fn words_at(text: &str, escape: char, line: usize) -> Result<Vec<String>, ParseError> {
    split_words(text, escape).map_err(|message| parse_err(line, message))
}

/// Split on unquoted whitespace, removing quotes and escape characters.
///
/// Inside double quotes the escape character only escapes `"` and itself;
/// inside single quotes nothing is special.
pub fn split_words(text: &str, escape: char) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some('"') if c == escape => match chars.next() {
                Some(n) if n == '"' || n == escape => current.push(n),
                Some(n) => {
                    current.push(c);
                    current.push(n);
                }
                None => current.push(c),
            },
            Some(_) => current.push(c),
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                in_word = true;
                if c == '"' || c == '\'' {
                    quote = Some(c);
                } else if c == escape {
                    current.push(chars.next().unwrap_or(c));
                } else {
                    current.push(c);
                }
            }
        }
    }

    if let Some(q) = quote {
        let which = if q == '"' { "double-quote" } else { "single-quote" };
        return Err(format!(
            "unexpected end of statement while looking for matching {which}"
        ));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(text: &str) -> Vec<Node> {
        parse(text).expect("parse").nodes
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let n = nodes("# comment\n\nFROM alpine\n   # indented comment\nRUN true\n");
        assert_eq!(n.len(), 2);
        assert_eq!(n[0].keyword, "from");
        assert_eq!(n[0].line, 3);
        assert_eq!(n[1].line, 5);
    }

    #[test]
    fn continuation_joins_lines() {
        let n = nodes("FROM alpine\nRUN apk add \\\n    curl \\\n    git\nCMD [\"sh\"]\n");
        assert_eq!(n.len(), 3);
        assert_eq!(n[1].args, Args::Shell("apk add     curl     git".into()));
        assert_eq!(n[1].line, 2);
        assert_eq!(n[2].line, 5);
    }

    #[test]
    fn comments_inside_continuation_are_dropped() {
        let n = nodes("FROM alpine\nRUN a \\\n# note\n  && b\n");
        assert_eq!(n[1].args, Args::Shell("a   && b".into()));
    }

    #[test]
    fn dangling_continuation_is_an_error() {
        let err = parse("FROM alpine\nRUN echo \\").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("line continuation"));
    }

    #[test]
    fn escape_directive_changes_continuation_char() {
        let tree = parse("# escape=`\nFROM mcr.microsoft.com/windows\nRUN dir `\n  c:\\\n").unwrap();
        assert_eq!(tree.directives.escape, '`');
        assert_eq!(tree.nodes[1].args, Args::Shell("dir   c:\\".into()));
    }

    #[test]
    fn invalid_escape_directive() {
        let err = parse("# escape=x\nFROM alpine\n").unwrap_err();
        assert!(err.message.contains("invalid escape token"));
    }

    #[test]
    fn directives_after_first_instruction_are_comments() {
        let tree = parse("FROM alpine\n# escape=`\nRUN a \\\n b\n").unwrap();
        assert_eq!(tree.directives.escape, '\\');
        assert_eq!(tree.nodes.len(), 2);
    }

    #[test]
    fn duplicate_directive_is_an_error() {
        let err = parse("# syntax=a\n# syntax=b\nFROM alpine\n").unwrap_err();
        assert!(err.message.contains("only one syntax"));
    }

    #[test]
    fn flags_are_extracted() {
        let n = nodes("FROM alpine\nCOPY --from=builder --link /out /app\n");
        assert_eq!(
            n[1].flags,
            vec![
                Flag { name: "from".into(), value: Some("builder".into()) },
                Flag { name: "link".into(), value: None },
            ]
        );
        assert_eq!(n[1].args, Args::Words(vec!["/out".into(), "/app".into()]));
    }

    #[test]
    fn json_form_is_detected() {
        let n = nodes("FROM alpine\nENTRYPOINT [\"/app\", \"--serve\"]\nCMD [not json\n");
        assert_eq!(n[1].args, Args::Exec(vec!["/app".into(), "--serve".into()]));
        assert_eq!(n[2].args, Args::Shell("[not json".into()));
    }

    #[test]
    fn words_handle_quotes_and_escapes() {
        let words = split_words(r#"A="hello world" B='x y' C=a\ b D="q\"q""#, '\\').unwrap();
        assert_eq!(words, vec!["A=hello world", "B=x y", "C=a b", "D=q\"q"]);
    }

    #[test]
    fn unterminated_quote_is_a_parse_error() {
        let err = parse("FROM alpine\nENV A=\"open\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("double-quote"));
    }

    #[test]
    fn heredoc_body_is_attached() {
        let n = nodes("FROM alpine\nRUN <<EOF\necho hi\necho there\nEOF\nCMD [\"sh\"]\n");
        assert_eq!(n.len(), 3);
        assert_eq!(n[1].heredocs.len(), 1);
        assert_eq!(n[1].heredocs[0].name, "EOF");
        assert_eq!(n[1].heredocs[0].content, "echo hi\necho there\n");
        assert_eq!(n[1].end_line, 5);
    }

    #[test]
    fn chomped_quoted_heredoc() {
        let n = nodes("FROM alpine\nCOPY <<-'END' /etc/motd\n\thello\n\tEND\n");
        let doc = &n[1].heredocs[0];
        assert!(doc.chomp);
        assert!(!doc.expand);
        assert_eq!(doc.content, "hello\n");
    }

    #[test]
    fn unterminated_heredoc_is_an_error() {
        let err = parse("FROM alpine\nRUN <<EOF\necho hi\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("unterminated heredoc EOF"));
    }

    #[test]
    fn shift_operator_is_not_a_heredoc() {
        let n = nodes("FROM alpine\nRUN echo $((1<<2))\n");
        assert!(n[1].heredocs.is_empty());
    }

    #[test]
    fn quoted_or_embedded_markers_are_text() {
        let n = nodes("FROM alpine\nRUN echo \"<<EOF\" '<<-END' a<<B \\<<C --f='<<D>>'\n");
        assert!(n[1].heredocs.is_empty());
    }

    #[test]
    fn several_heredocs_on_one_line() {
        let n = nodes("FROM alpine\nRUN <<A cat - <<\"B\"\none\nA\ntwo\nB\n");
        let names: Vec<_> = n[1].heredocs.iter().map(|h| (h.name.as_str(), h.expand)).collect();
        assert_eq!(names, vec![("A", true), ("B", false)]);
        assert_eq!(n[1].heredocs[1].content, "two\n");
    }

    #[test]
    fn backtick_escape_marker_is_text() {
        let n = nodes("# escape=`\nFROM alpine\nRUN echo `<<EOF\n");
        assert!(n[1].heredocs.is_empty());
    }

    #[test]
    fn onbuild_parses_its_trigger() {
        let n = nodes("FROM alpine\nONBUILD RUN make\n");
        match &n[1].args {
            Args::OnBuild(inner) => {
                assert_eq!(inner.keyword, "run");
                assert_eq!(inner.args, Args::Shell("make".into()));
            }
            other => panic!("expected ONBUILD trigger, got {other:?}"),
        }
    }

    #[test]
    fn line_without_keyword_is_an_error() {
        let err = parse("FROM alpine\n--link /a /b\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("no instruction"));
    }

    #[test]
    fn empty_file_has_no_instructions() {
        let err = parse("# just a comment\n\n").unwrap_err();
        assert_eq!(err.message, "file with no instructions");
    }

    #[test]
    fn crlf_line_endings() {
        let n = nodes("FROM alpine\r\nRUN a \\\r\n  b\r\n");
        assert_eq!(n[1].args, Args::Shell("a   b".into()));
    }
}
