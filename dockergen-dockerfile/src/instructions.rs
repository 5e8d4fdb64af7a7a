//! Stage two: syntax nodes → typed instructions grouped into build stages.
//!
//! Every check here works on a single node plus the stages declared before
//! it. Nothing is expanded: `$VAR` references are kept verbatim and skip the
//! format checks that would otherwise apply (ports, modes).

use std::time::Duration;

use crate::error::InstructionError;
use crate::syntax::{maybe_json, split_words, Args, Directives, Flag, Heredoc, Node, SyntaxTree};

// ---------------------------------------------------------------------------
// Instruction model
// ---------------------------------------------------------------------------

/// `KEY=value` pair from `ARG`, `ENV` or `LABEL`. `ARG` may omit the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<String>,
}

/// Exec (`["a", "b"]`) or shell form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exec(Vec<String>),
    Shell(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInstruction {
    pub command: Command,
    pub mounts: Vec<String>,
    pub network: Option<String>,
    pub security: Option<String>,
    pub heredocs: Vec<Heredoc>,
}

/// Where `COPY --from` reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageRef {
    /// An earlier stage by position.
    Index(usize),
    /// An earlier stage by (lower-cased) name.
    Name(String),
    /// Anything else is taken to be an image reference.
    Image(String),
}

/// `COPY` and `ADD`. Flags that only one of them accepts stay at their
/// defaults for the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyInstruction {
    pub sources: Vec<String>,
    pub destination: String,
    pub from: Option<StageRef>,
    pub chown: Option<String>,
    pub chmod: Option<String>,
    pub link: bool,
    pub parents: bool,
    pub exclude: Vec<String>,
    pub checksum: Option<String>,
    pub keep_git_dir: bool,
    pub heredocs: Vec<Heredoc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthcheckConfig {
    pub command: Command,
    pub interval: Option<Duration>,
    pub timeout: Option<Duration>,
    pub start_period: Option<Duration>,
    pub start_interval: Option<Duration>,
    pub retries: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Healthcheck {
    /// `HEALTHCHECK NONE` disables any inherited check.
    None,
    Check(HealthcheckConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Arg(Vec<KeyValue>),
    Env(Vec<KeyValue>),
    Label(Vec<KeyValue>),
    Run(RunInstruction),
    Cmd(Command),
    Entrypoint(Command),
    Shell(Vec<String>),
    Copy(CopyInstruction),
    Add(CopyInstruction),
    Workdir(String),
    User(String),
    Expose(Vec<String>),
    Volume(Vec<String>),
    StopSignal(String),
    Healthcheck(Healthcheck),
    OnBuild(Box<Instruction>),
    Maintainer(String),
}

impl Instruction {
    /// Upper-case keyword as written in a Dockerfile.
    pub fn keyword(&self) -> &'static str {
        match self {
            Instruction::Arg(_) => "ARG",
            Instruction::Env(_) => "ENV",
            Instruction::Label(_) => "LABEL",
            Instruction::Run(_) => "RUN",
            Instruction::Cmd(_) => "CMD",
            Instruction::Entrypoint(_) => "ENTRYPOINT",
            Instruction::Shell(_) => "SHELL",
            Instruction::Copy(_) => "COPY",
            Instruction::Add(_) => "ADD",
            Instruction::Workdir(_) => "WORKDIR",
            Instruction::User(_) => "USER",
            Instruction::Expose(_) => "EXPOSE",
            Instruction::Volume(_) => "VOLUME",
            Instruction::StopSignal(_) => "STOPSIGNAL",
            Instruction::Healthcheck(_) => "HEALTHCHECK",
            Instruction::OnBuild(_) => "ONBUILD",
            Instruction::Maintainer(_) => "MAINTAINER",
        }
    }
}

/// One `FROM` and everything up to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub index: usize,
    /// Lower-cased `AS` name.
    pub name: Option<String>,
    pub base: String,
    pub platform: Option<String>,
    /// Line of the `FROM`.
    pub line: usize,
    pub instructions: Vec<Instruction>,
}

/// A fully resolved Dockerfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dockerfile {
    pub directives: Directives,
    /// `ARG`s declared before the first `FROM`.
    pub meta_args: Vec<KeyValue>,
    pub stages: Vec<Stage>,
}

impl Dockerfile {
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        let name = name.to_ascii_lowercase();
        self.stages
            .iter()
            .find(|s| s.name.as_deref() == Some(name.as_str()))
    }

    /// The stage a plain `docker build` produces.
    pub fn final_stage(&self) -> Option<&Stage> {
        self.stages.last()
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

const KNOWN: &[&str] = &[
    "add", "arg", "cmd", "copy", "entrypoint", "env", "expose", "from", "healthcheck", "label",
    "maintainer", "onbuild", "run", "shell", "stopsignal", "user", "volume", "workdir",
];

/// Resolve a [`SyntaxTree`] into a [`Dockerfile`].
pub fn resolve(tree: &SyntaxTree) -> Result<Dockerfile, InstructionError> {
    let mut meta_args = Vec::new();
    let mut stages: Vec<Stage> = Vec::new();

    for node in &tree.nodes {
        if node.keyword == "from" {
            let stage = parse_from(node, &stages)?;
            stages.push(stage);
            continue;
        }
        if stages.is_empty() && node.keyword != "arg" && KNOWN.contains(&node.keyword.as_str()) {
            return Err(instr_err(node, "no build stage in current context"));
        }
        let instruction = parse_instruction(node, &stages)?;
        match (stages.last_mut(), instruction) {
            (Some(stage), instruction) => stage.instructions.push(instruction),
            (None, Instruction::Arg(args)) => meta_args.extend(args),
            (None, _) => return Err(instr_err(node, "no build stage in current context")),
        }
    }

    if stages.is_empty() {
        let line = tree.nodes.last().map_or(1, |n| n.line);
        return Err(InstructionError {
            line,
            instruction: String::new(),
            message: "no FROM instruction: a Dockerfile needs at least one build stage".into(),
        });
    }

    Ok(Dockerfile {
        directives: tree.directives.clone(),
        meta_args,
        stages,
    })
}

fn instr_err(node: &Node, message: impl Into<String>) -> InstructionError {
    InstructionError {
        line: node.line,
        instruction: node.keyword.to_ascii_uppercase(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagKind {
    Value,
    Bool,
    Repeat,
}

type FlagSpec = &'static [(&'static str, FlagKind)];

const FROM_FLAGS: FlagSpec = &[("platform", FlagKind::Value)];
const RUN_FLAGS: FlagSpec = &[
    ("mount", FlagKind::Repeat),
    ("network", FlagKind::Value),
    ("security", FlagKind::Value),
];
const COPY_FLAGS: FlagSpec = &[
    ("from", FlagKind::Value),
    ("chown", FlagKind::Value),
    ("chmod", FlagKind::Value),
    ("link", FlagKind::Bool),
    ("parents", FlagKind::Bool),
    ("exclude", FlagKind::Repeat),
];
const ADD_FLAGS: FlagSpec = &[
    ("chown", FlagKind::Value),
    ("chmod", FlagKind::Value),
    ("link", FlagKind::Bool),
    ("checksum", FlagKind::Value),
    ("keep-git-dir", FlagKind::Bool),
    ("exclude", FlagKind::Repeat),
];
const HEALTHCHECK_FLAGS: FlagSpec = &[
    ("interval", FlagKind::Value),
    ("timeout", FlagKind::Value),
    ("start-period", FlagKind::Value),
    ("start-interval", FlagKind::Value),
    ("retries", FlagKind::Value),
];
const NO_FLAGS: FlagSpec = &[];

/// Flags checked against the accepted set. Bool flags hold `"true"`/`"false"`.
#[derive(Debug, Default)]
struct FlagSet {
    values: Vec<(&'static str, String)>,
}

impl FlagSet {
    fn parse(node: &Node, spec: FlagSpec) -> Result<Self, InstructionError> {
        let mut set = FlagSet::default();
        for Flag { name, value } in &node.flags {
            let Some(&(key, kind)) = spec.iter().find(|(n, _)| *n == name.as_str()) else {
                return Err(instr_err(node, format!("unknown flag: {name}")));
            };
            if kind != FlagKind::Repeat && set.values.iter().any(|(k, _)| *k == key) {
                return Err(instr_err(node, format!("duplicate flag specified: {name}")));
            }
            let value = match (kind, value.as_deref()) {
                (FlagKind::Bool, None) => "true".to_owned(),
                (FlagKind::Bool, Some(v)) => match v.to_ascii_lowercase().as_str() {
                    "true" | "false" => v.to_ascii_lowercase(),
                    _ => {
                        return Err(instr_err(
                            node,
                            format!("expecting boolean value for flag {name}, not: {v}"),
                        ))
                    }
                },
                (_, None) => return Err(instr_err(node, format!("missing a value on flag: {name}"))),
                (_, Some(v)) => v.to_owned(),
            };
            set.values.push((key, value));
        }
        Ok(set)
    }

    fn value(&self, key: &str) -> Option<String> {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    }

    fn flag(&self, key: &str) -> bool {
        self.value(key).is_some_and(|v| v == "true")
    }

    fn all(&self, key: &str) -> Vec<String> {
        self.values
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FROM
// ---------------------------------------------------------------------------

fn parse_from(node: &Node, earlier: &[Stage]) -> Result<Stage, InstructionError> {
    let flags = FlagSet::parse(node, FROM_FLAGS)?;
    let words = words(node);
    let name = match words.as_slice() {
        [_] => None,
        [_, kw, name] if kw.eq_ignore_ascii_case("as") => Some(name.to_ascii_lowercase()),
        _ => {
            return Err(instr_err(
                node,
                "FROM requires either one or three arguments",
            ))
        }
    };

    if let Some(name) = &name {
        if !is_valid_stage_name(name) {
            return Err(instr_err(
                node,
                format!(
                    "invalid name for build stage: {name:?}, name can't start with a number or contain symbols"
                ),
            ));
        }
        if earlier.iter().any(|s| s.name.as_ref() == Some(name)) {
            return Err(instr_err(node, format!("duplicate name {name}")));
        }
    }

    Ok(Stage {
        index: earlier.len(),
        name,
        base: words[0].clone(),
        platform: flags.value("platform"),
        line: node.line,
        instructions: Vec::new(),
    })
}

/// `^[a-z][a-z0-9-_.]*$`
fn is_valid_stage_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}

// ---------------------------------------------------------------------------
// Everything else
// ---------------------------------------------------------------------------

fn parse_instruction(node: &Node, stages: &[Stage]) -> Result<Instruction, InstructionError> {
    match node.keyword.as_str() {
        "arg" => no_flags(node).and_then(|_| parse_arg(node)),
        "env" => no_flags(node).and_then(|_| parse_pairs(node).map(Instruction::Env)),
        "label" => no_flags(node).and_then(|_| parse_pairs(node).map(Instruction::Label)),
        "run" => parse_run(node),
        "cmd" => no_flags(node).and_then(|_| command(node).map(Instruction::Cmd)),
        "entrypoint" => no_flags(node).and_then(|_| command(node).map(Instruction::Entrypoint)),
        "shell" => no_flags(node).and_then(|_| parse_shell(node)),
        "copy" => parse_copy(node, stages, COPY_FLAGS).map(Instruction::Copy),
        "add" => parse_copy(node, stages, ADD_FLAGS).map(Instruction::Add),
        "workdir" => no_flags(node).and_then(|_| single(node).map(Instruction::Workdir)),
        "user" => no_flags(node).and_then(|_| single(node).map(Instruction::User)),
        "stopsignal" => no_flags(node).and_then(|_| single(node).map(Instruction::StopSignal)),
        "maintainer" => no_flags(node).and_then(|_| single(node).map(Instruction::Maintainer)),
        "expose" => no_flags(node).and_then(|_| parse_expose(node)),
        "volume" => no_flags(node).and_then(|_| parse_volume(node)),
        "healthcheck" => parse_healthcheck(node),
        "onbuild" => parse_onbuild(node, stages),
        other => Err(instr_err(
            node,
            format!("unknown instruction: {}", other.to_ascii_uppercase()),
        )),
    }
}

fn no_flags(node: &Node) -> Result<(), InstructionError> {
    FlagSet::parse(node, NO_FLAGS).map(|_| ())
}

fn keyword(node: &Node) -> String {
    node.keyword.to_ascii_uppercase()
}

fn words(node: &Node) -> Vec<String> {
    match &node.args {
        Args::Exec(v) | Args::Words(v) => v.clone(),
        Args::Shell(s) => split_words(s, '\\').unwrap_or_else(|_| vec![s.clone()]),
        Args::OnBuild(_) => Vec::new(),
    }
}

fn at_least_one(node: &Node, args: &[String]) -> Result<(), InstructionError> {
    if args.is_empty() {
        return Err(instr_err(
            node,
            format!("{} requires at least one argument", keyword(node)),
        ));
    }
    Ok(())
}

fn single(node: &Node) -> Result<String, InstructionError> {
    match &node.args {
        Args::Shell(s) if !s.trim().is_empty() => Ok(s.trim().to_owned()),
        _ => Err(instr_err(
            node,
            format!("{} requires exactly one argument", keyword(node)),
        )),
    }
}

fn command(node: &Node) -> Result<Command, InstructionError> {
    match &node.args {
        Args::Exec(list) => Ok(Command::Exec(list.clone())),
        Args::Shell(s) if !s.is_empty() => Ok(Command::Shell(s.clone())),
        _ => Err(instr_err(
            node,
            format!("{} requires at least one argument", keyword(node)),
        )),
    }
}

fn parse_arg(node: &Node) -> Result<Instruction, InstructionError> {
    let words = words(node);
    at_least_one(node, &words)?;
    let mut args = Vec::with_capacity(words.len());
    for word in words {
        let (key, value) = match word.split_once('=') {
            Some((k, v)) => (k.to_owned(), Some(v.to_owned())),
            None => (word, None),
        };
        if key.is_empty() {
            return Err(instr_err(node, "ARG names can not be blank"));
        }
        args.push(KeyValue { key, value });
    }
    Ok(Instruction::Arg(args))
}

/// `ENV`/`LABEL`: either `KEY value with spaces` or `K1=v1 K2=v2 ...`.
fn parse_pairs(node: &Node) -> Result<Vec<KeyValue>, InstructionError> {
    let kw = keyword(node);
    let words = words(node);
    at_least_one(node, &words)?;

    if !words[0].contains('=') {
        if words.len() < 2 {
            return Err(instr_err(node, format!("{kw} must have two arguments")));
        }
        return Ok(vec![KeyValue {
            key: words[0].clone(),
            value: Some(words[1..].join(" ")),
        }]);
    }

    let mut pairs = Vec::with_capacity(words.len());
    for word in &words {
        let Some((key, value)) = word.split_once('=') else {
            return Err(instr_err(
                node,
                format!(
                    "{kw} syntax error - can't find = in {word:?}. Must be of the form: name=value"
                ),
            ));
        };
        if key.is_empty() {
            return Err(instr_err(node, format!("{kw} names can not be blank")));
        }
        pairs.push(KeyValue {
            key: key.to_owned(),
            value: Some(value.to_owned()),
        });
    }
    Ok(pairs)
}

fn parse_run(node: &Node) -> Result<Instruction, InstructionError> {
    let flags = FlagSet::parse(node, RUN_FLAGS)?;
    let command = command(node)?;

    let network = flags.value("network");
    if let Some(mode) = &network {
        if !matches!(mode.as_str(), "default" | "none" | "host") {
            return Err(instr_err(node, format!("unsupported network mode: {mode}")));
        }
    }
    let security = flags.value("security");
    if let Some(mode) = &security {
        if !matches!(mode.as_str(), "sandbox" | "insecure") {
            return Err(instr_err(node, format!("unsupported security mode: {mode}")));
        }
    }
    let mounts = flags.all("mount");
    if mounts.iter().any(|m| m.trim().is_empty()) {
        return Err(instr_err(node, "--mount requires a value"));
    }

    Ok(Instruction::Run(RunInstruction {
        command,
        mounts,
        network,
        security,
        heredocs: node.heredocs.clone(),
    }))
}

fn parse_shell(node: &Node) -> Result<Instruction, InstructionError> {
    match &node.args {
        Args::Exec(list) if list.is_empty() => {
            Err(instr_err(node, "SHELL requires at least one argument"))
        }
        Args::Exec(list) => Ok(Instruction::Shell(list.clone())),
        _ => Err(instr_err(
            node,
            "SHELL requires the arguments to be in JSON form",
        )),
    }
}

fn parse_copy(
    node: &Node,
    stages: &[Stage],
    spec: FlagSpec,
) -> Result<CopyInstruction, InstructionError> {
    let flags = FlagSet::parse(node, spec)?;
    let mut args = words(node);
    if args.len() < 2 {
        return Err(instr_err(
            node,
            format!(
                "{} requires at least two arguments, but only one was provided. Destination could not be determined",
                keyword(node)
            ),
        ));
    }
    let destination = args.pop().unwrap_or_default();

    let from = match flags.value("from") {
        Some(v) => Some(resolve_stage_ref(node, &v, stages)?),
        None => None,
    };
    let chmod = flags.value("chmod");
    if let Some(mode) = &chmod {
        let literal = !mode.contains('$');
        if literal && (mode.is_empty() || mode.len() > 4 || !mode.chars().all(|c| ('0'..='7').contains(&c))) {
            return Err(instr_err(node, format!("invalid chmod parameter: {mode}")));
        }
    }

    Ok(CopyInstruction {
        sources: args,
        destination,
        from,
        chown: flags.value("chown"),
        chmod,
        link: flags.flag("link"),
        parents: flags.flag("parents"),
        exclude: flags.all("exclude"),
        checksum: flags.value("checksum"),
        keep_git_dir: flags.flag("keep-git-dir"),
        heredocs: node.heredocs.clone(),
    })
}

/// Resolve a `--from` value against the stages declared so far. The last
/// entry of `stages` is the stage being built.
fn resolve_stage_ref(node: &Node, value: &str, stages: &[Stage]) -> Result<StageRef, InstructionError> {
    if value.is_empty() {
        return Err(instr_err(node, "invalid from flag value: empty"));
    }
    let current = stages.len().saturating_sub(1);
    if let Ok(index) = value.parse::<usize>() {
        if index >= current {
            return Err(instr_err(
                node,
                format!("invalid from flag value {index}: refers to current or future build stage"),
            ));
        }
        return Ok(StageRef::Index(index));
    }

    let lowered = value.to_ascii_lowercase();
    if stages.last().and_then(|s| s.name.as_ref()) == Some(&lowered) {
        return Err(instr_err(
            node,
            format!("circular dependency detected on stage: {lowered}"),
        ));
    }
    if stages[..current].iter().any(|s| s.name.as_ref() == Some(&lowered)) {
        return Ok(StageRef::Name(lowered));
    }
    Ok(StageRef::Image(value.to_owned()))
}

fn parse_expose(node: &Node) -> Result<Instruction, InstructionError> {
    let ports = words(node);
    at_least_one(node, &ports)?;
    for port in &ports {
        if !port.contains('$') && !is_valid_port_spec(port) {
            return Err(instr_err(node, format!("invalid containerPort: {port}")));
        }
    }
    Ok(Instruction::Expose(ports))
}

/// `80`, `8000-8010`, `53/udp`, `9000/TCP`.
fn is_valid_port_spec(spec: &str) -> bool {
    let (range, proto) = match spec.split_once('/') {
        Some((r, p)) => (r, Some(p)),
        None => (spec, None),
    };
    if let Some(proto) = proto {
        if !matches!(proto.to_ascii_lowercase().as_str(), "tcp" | "udp" | "sctp") {
            return false;
        }
    }
    let is_port = |s: &str| !s.is_empty() && s.parse::<u16>().is_ok();
    match range.split_once('-') {
        Some((lo, hi)) => {
            is_port(lo) && is_port(hi) && lo.parse::<u16>().ok() <= hi.parse::<u16>().ok()
        }
        None => is_port(range),
    }
}

fn parse_volume(node: &Node) -> Result<Instruction, InstructionError> {
    let paths = words(node);
    at_least_one(node, &paths)?;
    if paths.iter().any(|p| p.trim().is_empty()) {
        return Err(instr_err(node, "VOLUME specified can not be an empty string"));
    }
    Ok(Instruction::Volume(paths))
}

fn parse_healthcheck(node: &Node) -> Result<Instruction, InstructionError> {
    let raw = match &node.args {
        Args::Shell(s) => s.trim().to_owned(),
        _ => String::new(),
    };
    if raw.is_empty() {
        return Err(instr_err(node, "HEALTHCHECK requires at least one argument"));
    }
    let (kind, rest) = match raw.find(char::is_whitespace) {
        Some(pos) => (&raw[..pos], raw[pos..].trim_start()),
        None => (raw.as_str(), ""),
    };

    match kind.to_ascii_uppercase().as_str() {
        "NONE" => {
            if !rest.is_empty() || !node.flags.is_empty() {
                return Err(instr_err(node, "HEALTHCHECK NONE takes no arguments"));
            }
            Ok(Instruction::Healthcheck(Healthcheck::None))
        }
        "CMD" => {
            let flags = FlagSet::parse(node, HEALTHCHECK_FLAGS)?;
            let command = match maybe_json(rest) {
                Args::Exec(list) if !list.is_empty() => Command::Exec(list),
                Args::Shell(s) if !s.is_empty() => Command::Shell(s),
                _ => return Err(instr_err(node, "Missing command after HEALTHCHECK CMD")),
            };
            let retries = match flags.value("retries") {
                Some(v) => {
                    let n: i64 = v.parse().map_err(|_| {
                        instr_err(node, format!("invalid retries value: {v}"))
                    })?;
                    if n < 0 {
                        return Err(instr_err(node, format!("--retries cannot be negative ({n})")));
                    }
                    Some(u32::try_from(n).map_err(|_| {
                        instr_err(node, format!("invalid retries value: {v}"))
                    })?)
                }
                None => None,
            };
            Ok(Instruction::Healthcheck(Healthcheck::Check(HealthcheckConfig {
                command,
                interval: duration_flag(node, &flags, "interval")?,
                timeout: duration_flag(node, &flags, "timeout")?,
                start_period: duration_flag(node, &flags, "start-period")?,
                start_interval: duration_flag(node, &flags, "start-interval")?,
                retries,
            })))
        }
        other => Err(instr_err(
            node,
            format!("Unknown type {other:?} in HEALTHCHECK (try CMD)"),
        )),
    }
}

fn duration_flag(node: &Node, flags: &FlagSet, key: &str) -> Result<Option<Duration>, InstructionError> {
    let Some(raw) = flags.value(key) else {
        return Ok(None);
    };
    let d = parse_duration(&raw)
        .ok_or_else(|| instr_err(node, format!("invalid duration for --{key}: {raw}")))?;
    if !d.is_zero() && d < Duration::from_millis(1) {
        return Err(instr_err(
            node,
            format!("Interval {key:?} cannot be less than 1ms"),
        ));
    }
    Ok(Some(d))
}

/// Longest duration accepted: `i64::MAX` nanoseconds, about 292 years.
const MAX_DURATION_SECS: f64 = i64::MAX as f64 / 1e9;

/// Duration literal such as `30s`, `1m30s`, `1.5h` or `0`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    if s == "0" {
        return Some(Duration::ZERO);
    }
    let mut rest = s;
    let mut total = 0f64;
    if rest.is_empty() {
        return None;
    }
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_end == 0 {
            return None;
        }
        let number: f64 = rest[..num_end].parse().ok()?;
        rest = &rest[num_end..];
        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds = match &rest[..unit_end] {
            "ns" => 1e-9,
            "us" | "µs" | "μs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        total += number * seconds;
        rest = &rest[unit_end..];
    }
    if total > MAX_DURATION_SECS {
        return None;
    }
    Duration::try_from_secs_f64(total).ok()
}

fn parse_onbuild(node: &Node, stages: &[Stage]) -> Result<Instruction, InstructionError> {
    let Args::OnBuild(trigger) = &node.args else {
        return Err(instr_err(node, "ONBUILD requires at least one argument"));
    };
    match trigger.keyword.as_str() {
        "onbuild" => Err(instr_err(
            node,
            "Chaining ONBUILD via `ONBUILD ONBUILD` isn't allowed",
        )),
        "from" | "maintainer" => Err(instr_err(
            node,
            format!("{} isn't allowed as an ONBUILD trigger", keyword(trigger)),
        )),
        _ => parse_instruction(trigger, stages).map(|i| Instruction::OnBuild(Box::new(i))),
    }
}
