//! # dockergen-renderer
//!
//! Tera-based rendering of `*.Dockerfile` templates from a
//! [`DockerfileValues`](dockergen_core::DockerfileValues) document.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dockergen_core::{BuildInfo, DockerfileValues};
//! use dockergen_renderer::{Renderer, TemplateRegistry};
//!
//! fn render_app(values: &DockerfileValues) {
//!     if let Ok(registry) = TemplateRegistry::load(Path::new("templates")) {
//!         let renderer = Renderer::new(registry, BuildInfo::current());
//!         if let Ok(section) = renderer.render("app", values) {
//!             print!("{section}");
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod functions;
pub mod registry;

pub use context::TemplateContext;
pub use engine::{normalize_template_name, provenance_header, Renderer};
pub use error::{LoadError, RenderError};
pub use registry::{TemplateRegistry, TEMPLATE_SUFFIX};
