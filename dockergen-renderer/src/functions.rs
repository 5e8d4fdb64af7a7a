//! Shared function library installed into every template.
//!
//! Tera's built-in filters (`upper`, `lower`, `replace`, `split`, `join`,
//! `default`, `trim`, ...) cover most string/list/map needs. The additions
//! below fill the gaps Dockerfile templates tend to hit.

use std::collections::HashMap;
use std::path::Path;

use tera::{Error, Result, Tera, Value};

/// Register every filter and function of the library on `tera`.
pub fn register(tera: &mut Tera) {
    tera.register_filter("quote", quote);
    tera.register_filter("squote", squote);
    tera.register_filter("trim_prefix", trim_prefix);
    tera.register_filter("trim_suffix", trim_suffix);
    tera.register_filter("nospace", nospace);
    tera.register_filter("kebabcase", kebabcase);
    tera.register_filter("snakecase", snakecase);
    tera.register_filter("or_default", or_default);
    tera.register_filter("basename", basename);
    tera.register_filter("dirname", dirname);
    tera.register_function("required", required);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Render a scalar as text; `null` becomes the empty string.
fn as_text(filter: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::msg(format!(
            "filter `{filter}` expects a scalar, got {other}"
        ))),
    }
}

fn str_arg(filter: &str, args: &HashMap<String, Value>, name: &str) -> Result<String> {
    match args.get(name) {
        Some(v) => as_text(filter, v),
        None => Err(Error::msg(format!(
            "filter `{filter}` requires a `{name}` argument"
        ))),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(_) => false,
    }
}

fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in s.chars() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// `{{ AppName | quote }}` → `"api"`
pub fn quote(value: &Value, _: &HashMap<String, Value>) -> Result<Value> {
    let s = as_text("quote", value)?;
    Ok(Value::String(format!(
        "\"{}\"",
        s.replace('\\', "\\\\").replace('"', "\\\"")
    )))
}

/// `{{ AppName | squote }}` → `'api'`
pub fn squote(value: &Value, _: &HashMap<String, Value>) -> Result<Value> {
    let s = as_text("squote", value)?;
    Ok(Value::String(format!("'{s}'")))
}

/// Remove `prefix` once from the start of the value.
pub fn trim_prefix(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let s = as_text("trim_prefix", value)?;
    let prefix = str_arg("trim_prefix", args, "prefix")?;
    Ok(Value::String(
        s.strip_prefix(prefix.as_str()).unwrap_or(&s).to_owned(),
    ))
}

/// Remove `suffix` once from the end of the value.
pub fn trim_suffix(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let s = as_text("trim_suffix", value)?;
    let suffix = str_arg("trim_suffix", args, "suffix")?;
    Ok(Value::String(
        s.strip_suffix(suffix.as_str()).unwrap_or(&s).to_owned(),
    ))
}

pub fn nospace(value: &Value, _: &HashMap<String, Value>) -> Result<Value> {
    let s = as_text("nospace", value)?;
    Ok(Value::String(s.chars().filter(|c| !c.is_whitespace()).collect()))
}

/// `MyApp_server` → `my-app-server`
pub fn kebabcase(value: &Value, _: &HashMap<String, Value>) -> Result<Value> {
    let s = as_text("kebabcase", value)?;
    Ok(Value::String(split_words(&s).join("-")))
}

/// `MyApp-server` → `my_app_server`
pub fn snakecase(value: &Value, _: &HashMap<String, Value>) -> Result<Value> {
    let s = as_text("snakecase", value)?;
    Ok(Value::String(split_words(&s).join("_")))
}

/// Like Tera's `default`, but also replaces defined-yet-empty values.
///
/// Every value-model field is always defined, so `default` alone never fires
/// for an unset field.
pub fn or_default(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let fallback = args
        .get("value")
        .ok_or_else(|| Error::msg("filter `or_default` requires a `value` argument"))?;
    if is_empty(value) {
        Ok(fallback.clone())
    } else {
        Ok(value.clone())
    }
}

/// Last path element; `.` for an empty path.
pub fn basename(value: &Value, _: &HashMap<String, Value>) -> Result<Value> {
    let s = as_text("basename", value)?;
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(Value::String(if s.is_empty() { ".".into() } else { "/".into() }));
    }
    let base = Path::new(trimmed)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| trimmed.to_owned());
    Ok(Value::String(base))
}

/// Everything but the last path element; `.` when there is no parent.
pub fn dirname(value: &Value, _: &HashMap<String, Value>) -> Result<Value> {
    let s = as_text("dirname", value)?;
    let dir = match Path::new(&s).parent() {
        Some(p) if p.as_os_str().is_empty() => ".".to_owned(),
        Some(p) => p.to_string_lossy().into_owned(),
        None if s.starts_with('/') => "/".to_owned(),
        None => ".".to_owned(),
    };
    Ok(Value::String(dir))
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

/// `{{ required(value=RuntimeImage, message="runtimeImage must be set") }}`
///
/// Fails rendering with `message` when `value` is missing or empty.
pub fn required(args: &HashMap<String, Value>) -> Result<Value> {
    let message = match args.get("message") {
        Some(m) => as_text("required", m)?,
        None => "a required value is missing".to_owned(),
    };
    match args.get("value") {
        Some(v) if !is_empty(v) => Ok(v.clone()),
        _ => Err(Error::msg(message)),
    }
}
