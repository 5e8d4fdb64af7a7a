//! [`Renderer`] — one requested template name in, one Dockerfile section out.
//!
//! # Section layout
//!
//! ```text
//! # Generated by dockergen version 0.1.0, build 1a2b3c
//! # At: 2024-05-01T12:00:00+02:00
//!
//! <template output>
//! <blank line>
//! ```

use std::path::{Component, Path};

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

use dockergen_core::{BuildInfo, DockerfileValues};

use crate::context::TemplateContext;
use crate::error::{describe, RenderError};
use crate::registry::{TemplateRegistry, TEMPLATE_SUFFIX};

// ---------------------------------------------------------------------------
// Name normalisation and provenance header
// ---------------------------------------------------------------------------

/// Map a requested name onto a registry key.
///
/// The name is cleaned lexically (`.` dropped, `a/../b` → `b`, repeated
/// separators collapsed), then given the `.Dockerfile` suffix unless it
/// already has it: `./app` → `app.Dockerfile`.
pub fn normalize_template_name(requested: &str) -> String {
    let cleaned = clean_path(requested);
    let has_suffix = Path::new(&cleaned)
        .extension()
        .is_some_and(|ext| ext == &TEMPLATE_SUFFIX[1..]);
    if has_suffix {
        cleaned
    } else {
        format!("{cleaned}{TEMPLATE_SUFFIX}")
    }
}

/// Lexical path cleaning; `..` above the root is dropped, above a relative
/// start it is kept.
fn clean_path(path: &str) -> String {
    let mut rooted = false;
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => match parts.last().map(String::as_str) {
                Some("..") | None if !rooted => parts.push("..".into()),
                Some("..") | None => {}
                Some(_) => {
                    parts.pop();
                }
            },
            Component::Prefix(_) | Component::Normal(_) => {
                parts.push(component.as_os_str().to_string_lossy().into_owned())
            }
        }
    }
    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".into(),
        (false, false) => joined,
    }
}

/// Comment block written at the top of every rendered section.
pub fn provenance_header(build: &BuildInfo, at: &DateTime<FixedOffset>) -> String {
    format!(
        "# Generated by dockergen version {}, build {}\n# At: {}\n\n",
        build.version,
        build.commit,
        at.to_rfc3339_opts(SecondsFormat::Secs, false)
    )
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders named templates from a [`TemplateRegistry`].
///
/// Holds no mutable state; create once per invocation and reuse for every
/// requested name.
pub struct Renderer {
    registry: TemplateRegistry,
    build: BuildInfo,
}

impl Renderer {
    pub fn new(registry: TemplateRegistry, build: BuildInfo) -> Self {
        Renderer { registry, build }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn build_info(&self) -> &BuildInfo {
        &self.build
    }

    /// Render `requested` with the current local time in the header.
    pub fn render(&self, requested: &str, values: &DockerfileValues) -> Result<String, RenderError> {
        self.render_at(requested, values, Local::now().fixed_offset())
    }

    /// Render `requested` with an explicit header timestamp.
    ///
    /// Output is a pure function of the arguments.
    pub fn render_at(
        &self,
        requested: &str,
        values: &DockerfileValues,
        at: DateTime<FixedOffset>,
    ) -> Result<String, RenderError> {
        let name = normalize_template_name(requested);
        let tera = self
            .registry
            .lookup(&name)
            .ok_or_else(|| RenderError::NotFound {
                requested: requested.to_owned(),
            })?;

        let ctx = TemplateContext::from_values(values).to_tera_context()?;
        let body = tera.render(&name, &ctx).map_err(|e| RenderError::Execution {
            template: name.clone(),
            message: describe(&e),
        })?;

        let mut out = provenance_header(&self.build, &at);
        out.push_str(&body);
        out.push('\n');
        tracing::debug!("rendered {} ({} bytes)", name, out.len());
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
