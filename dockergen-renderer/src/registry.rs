//! Template registry — every `*.Dockerfile` in a directory, parsed once.
//!
//! Names are bare file names (`app.Dockerfile`). Templates may refer to one
//! another with `{% include "base.Dockerfile" %}` or `{% extends %}` because
//! the whole directory is added to one Tera instance in a single batch.

use std::path::{Path, PathBuf};

use tera::Tera;

use crate::error::{describe, io_err, LoadError};
use crate::functions;

/// File-name suffix that marks a template.
pub const TEMPLATE_SUFFIX: &str = ".Dockerfile";

// ---------------------------------------------------------------------------
// Loading helpers
// ---------------------------------------------------------------------------

fn is_template_name(name: &str) -> bool {
    name.len() > TEMPLATE_SUFFIX.len() && name.ends_with(TEMPLATE_SUFFIX)
}

/// Template files directly inside `dir`, sorted by name.
fn collect_template_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_template_name(&name) {
            continue;
        }
        // follows symlinks
        let meta = std::fs::metadata(&path).map_err(|e| io_err(&path, e))?;
        if meta.is_file() {
            files.push((name, path));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn build_tera(templates: Vec<(String, String)>) -> Result<Tera, LoadError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    functions::register(&mut tera);
    tera.add_raw_templates(templates)
        .map_err(|e| LoadError::Parse { message: describe(&e) })?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateRegistry
// ---------------------------------------------------------------------------

/// Parsed templates keyed by file name. Immutable once loaded.
pub struct TemplateRegistry {
    tera: Tera,
    names: Vec<String>,
}

impl TemplateRegistry {
    /// Load every `*.Dockerfile` file in `dir` (not recursive).
    ///
    /// Fails if the directory cannot be read, any template has a syntax
    /// error, or no template file exists.
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let files = collect_template_files(dir)?;
        if files.is_empty() {
            return Err(LoadError::NoTemplates {
                dir: dir.to_path_buf(),
            });
        }
        let mut templates = Vec::with_capacity(files.len());
        for (name, path) in files {
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            templates.push((name, contents));
        }
        let registry = Self::from_sources(templates)?;
        tracing::debug!(
            "loaded {} template(s) from {}",
            registry.names.len(),
            dir.display()
        );
        Ok(registry)
    }

    /// Build a registry from in-memory `(name, source)` pairs.
    ///
    /// Names lacking the `.Dockerfile` suffix are skipped, so the registry
    /// invariant holds whatever the caller passes.
    pub fn from_sources<I, N, S>(sources: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let templates: Vec<(String, String)> = sources
            .into_iter()
            .map(|(n, s)| (n.into(), s.into()))
            .filter(|(n, _)| is_template_name(n))
            .collect();
        let mut names: Vec<String> = templates.iter().map(|(n, _)| n.clone()).collect();
        names.sort();
        names.dedup();
        let tera = build_tera(templates)?;
        Ok(TemplateRegistry { tera, names })
    }

    /// True if a template named exactly `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    /// Registered template names, sorted.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Engine holding the template registered as `name`, or `None`.
    pub(crate) fn lookup(&self, name: &str) -> Option<&Tera> {
        self.contains(name).then_some(&self.tera)
    }
}
