//! Template loading and rendering backends.
//!
//! - [`TemplateSource`]: resolves template names to content from inline
//!   templates and search directories, applying the path policy
//! - [`TemplateEngine`]: backend seam used by the manager
//! - [`MiniJinjaEngine`]: the default backend
//!
//! Supported extensions: `.jinja`, `.jinja2`, `.j2`, `.html`, `.txt` (in
//! priority order) unless the manager sets a default extension.

pub mod engine;
pub mod registry;

pub use engine::{MiniJinjaEngine, TemplateEngine};
pub use registry::{check_name, TemplateSource, TEMPLATE_EXTENSIONS};
